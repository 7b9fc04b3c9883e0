//! Task types persisted by Taskdeck.
//!
//! A [`Task`] is one user-visible work item. Callers never build tasks
//! directly; they submit a [`TaskDraft`] and the task store assigns the
//! identity, status and timestamps.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a task.
///
/// Stored as an opaque string so task lists written with other id schemes
/// keep loading. Fresh identifiers are UUID v7 strings, which sort by
/// creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Wraps an existing identifier string.
    #[must_use]
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::from_string(id)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Completion state of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task is still open.
    #[default]
    Pending,
    /// Task has been completed.
    Completed,
}

impl TaskStatus {
    /// Returns the opposite status.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Pending => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// A task in the user's personal list.
///
/// Field names serialize in camelCase (`createdAt`, `updatedAt`, `dueDate`)
/// and absent optionals are omitted, matching the stored list format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Store-assigned identifier, immutable after creation.
    pub id: TaskId,
    /// Display name, trimmed and non-empty.
    pub name: String,
    /// Optional free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Completion state.
    #[serde(default)]
    pub status: TaskStatus,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task was last changed. Never earlier than `created_at`.
    pub updated_at: DateTime<Utc>,
    /// Optional caller-supplied due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl Task {
    /// Returns `true` if the task is completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Returns the name cut to `max_chars` characters, with `...` appended
    /// when anything was cut.
    #[must_use]
    pub fn name_preview(&self, max_chars: usize) -> Cow<'_, str> {
        match self.name.char_indices().nth(max_chars) {
            Some((cut, _)) => Cow::Owned(format!("{}...", &self.name[..cut])),
            None => Cow::Borrowed(&self.name),
        }
    }
}

/// The caller-editable subset of a task.
///
/// Has no identity, status or timestamps and is never persisted on its own.
/// For updates, `None` fields mean "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    /// Desired display name.
    pub name: String,
    /// Desired description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Desired due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskDraft {
    /// Creates a draft with only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            due_date: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}
