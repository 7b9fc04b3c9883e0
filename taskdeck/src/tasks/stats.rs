//! Aggregates derived from a task list.
//!
//! Everything here is a pure function of the list it is given and is
//! recomputed on every call.

use serde::Serialize;
use taskdeck_model::task::Task;

/// Summary counts for a task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    /// Number of tasks.
    pub total: usize,
    /// Number of completed tasks.
    pub completed: usize,
    /// Number of pending tasks (`total - completed`).
    pub pending: usize,
    /// Completed share in percent, `0..=100`.
    pub completion_rate: u8,
}

impl TaskStats {
    /// Computes the stats for `tasks`.
    #[must_use]
    pub fn compute(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.is_completed()).count();
        Self {
            total,
            completed,
            pending: total - completed,
            completion_rate: completion_rate(completed, total),
        }
    }
}

/// `completed / total` as a percentage rounded half up, or 0 for an empty
/// list.
///
/// Integer arithmetic keeps halves exact: 1 of 8 is 12.5% and rounds to 13.
#[must_use]
pub fn completion_rate(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    let rate = (completed * 200 + total) / (total * 2);
    u8::try_from(rate).unwrap_or(100)
}

/// The `n` most recently created tasks, newest first.
///
/// Ties on `created_at` keep list order, which for a store-owned list is
/// insertion order (newest first).
#[must_use]
pub fn latest(tasks: &[Task], n: usize) -> Vec<&Task> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(n);
    sorted
}
