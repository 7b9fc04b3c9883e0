//! Task store: the sole owner and mutator of the task list.
//!
//! The list is kept newest-first. Every mutation that changes the list is
//! followed by a full re-write of the list to durable storage under
//! [`TASKS_KEY`]; there are no partial writes.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use taskdeck_model::task::{Task, TaskDraft, TaskId, TaskStatus};

use super::TaskError;
use super::filter::search;
use super::stats::{TaskStats, latest};
use crate::clock::{Clock, SystemClock};
use crate::storage::{DurableStore, KeyValueBackend, TASKS_KEY};

/// Owns the in-memory task list and mirrors it to storage.
///
/// Until [`load`](Self::load) has run, mutations only touch memory. `load`
/// then keeps those early tasks in front of the stored ones, so a late load
/// never discards work done before it.
pub struct TaskStore<B> {
    storage: DurableStore<B>,
    clock: Box<dyn Clock>,
    /// Newest first.
    tasks: Vec<Task>,
    loaded: bool,
}

impl<B: KeyValueBackend> TaskStore<B> {
    /// Creates an unloaded store using the system clock.
    #[must_use]
    pub fn new(storage: DurableStore<B>) -> Self {
        Self::with_clock(storage, SystemClock)
    }

    /// Creates an unloaded store using the given clock.
    #[must_use]
    pub fn with_clock(storage: DurableStore<B>, clock: impl Clock + 'static) -> Self {
        Self {
            storage,
            clock: Box::new(clock),
            tasks: Vec::new(),
            loaded: false,
        }
    }

    /// Reads the stored list. Runs once; later calls do nothing.
    ///
    /// A missing or malformed list loads as empty. Tasks created before the
    /// load stay in front, stored tasks with a colliding id are dropped, and
    /// the merged list is written back.
    pub fn load(&mut self) {
        if self.loaded {
            return;
        }
        let stored: Vec<Task> = self.storage.read(TASKS_KEY, Vec::new());
        self.loaded = true;

        let early = std::mem::take(&mut self.tasks);
        let had_early = !early.is_empty();
        let mut seen = HashSet::new();
        self.tasks = early
            .into_iter()
            .chain(stored)
            .filter(|t| seen.insert(t.id.clone()))
            .collect();

        tracing::debug!(count = self.tasks.len(), "task list loaded");
        if had_early {
            self.persist();
        }
    }

    /// Returns `true` until [`load`](Self::load) has run.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        !self.loaded
    }

    /// All tasks, newest first.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Current aggregate counts.
    #[must_use]
    pub fn stats(&self) -> TaskStats {
        TaskStats::compute(&self.tasks)
    }

    /// The `n` most recently created tasks.
    #[must_use]
    pub fn latest(&self, n: usize) -> Vec<&Task> {
        latest(&self.tasks, n)
    }

    /// Tasks whose name matches `query` (case-insensitive substring).
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Task> {
        search(&self.tasks, query)
    }

    /// Creates a pending task from `draft` at the front of the list.
    ///
    /// The name is trimmed and a blank description is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NameEmpty`] if the trimmed name is empty; the
    /// list is unchanged.
    pub fn create(&mut self, draft: TaskDraft) -> Result<Task, TaskError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(TaskError::NameEmpty);
        }

        let now = self.clock.now();
        let task = Task {
            id: self.fresh_id(),
            name: name.to_string(),
            description: non_blank(draft.description),
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
            due_date: draft.due_date,
        };
        self.tasks.insert(0, task.clone());
        self.persist();

        tracing::debug!(task_id = %task.id, "task created");
        Ok(task)
    }

    /// Merges `draft` onto the task with `id`.
    ///
    /// A blank name keeps the current one. `description` and `due_date` are
    /// replaced when present in the draft and kept when absent; a blank
    /// description clears it. `id`, `status` and `created_at` never change.
    ///
    /// Returns the updated task, or `None` (and changes nothing) if no task
    /// has that id.
    pub fn update(&mut self, id: &TaskId, draft: TaskDraft) -> Option<Task> {
        let now = self.clock.now();
        let Some(task) = self.tasks.iter_mut().find(|t| &t.id == id) else {
            tracing::debug!(task_id = %id, "update ignored, no such task");
            return None;
        };

        let name = draft.name.trim();
        if !name.is_empty() {
            task.name = name.to_string();
        }
        if let Some(description) = draft.description {
            task.description = non_blank(Some(description));
        }
        if let Some(due_date) = draft.due_date {
            task.due_date = Some(due_date);
        }
        touch(task, now);

        let updated = task.clone();
        self.persist();
        Some(updated)
    }

    /// Flips the task between pending and completed.
    ///
    /// Returns the updated task, or `None` if no task has that id.
    pub fn toggle_completion(&mut self, id: &TaskId) -> Option<Task> {
        let now = self.clock.now();
        let Some(task) = self.tasks.iter_mut().find(|t| &t.id == id) else {
            tracing::debug!(task_id = %id, "toggle ignored, no such task");
            return None;
        };

        task.status = task.status.toggled();
        touch(task, now);

        let updated = task.clone();
        self.persist();
        tracing::debug!(task_id = %id, status = %updated.status, "task toggled");
        Some(updated)
    }

    /// Permanently removes the task with `id`.
    ///
    /// Returns the removed task, or `None` if no task has that id.
    pub fn delete(&mut self, id: &TaskId) -> Option<Task> {
        let Some(index) = self.tasks.iter().position(|t| &t.id == id) else {
            tracing::debug!(task_id = %id, "delete ignored, no such task");
            return None;
        };

        let removed = self.tasks.remove(index);
        self.persist();
        tracing::debug!(task_id = %id, "task deleted");
        Some(removed)
    }

    /// Allocates an id not used by any live task.
    fn fresh_id(&self) -> TaskId {
        loop {
            let id = TaskId::new();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Writes the full list, once the stored list has been loaded.
    fn persist(&self) {
        if self.loaded {
            self.storage.write(TASKS_KEY, &self.tasks);
        }
    }
}

/// Stamps `updated_at`, never moving it backwards.
fn touch(task: &mut Task, now: DateTime<Utc>) {
    task.updated_at = now.max(task.updated_at);
}

/// `None` for absent or whitespace-only text.
fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}
