//! Display-only filtering of a task list.

use taskdeck_model::task::Task;

/// Tasks whose name contains `query`, ignoring case and surrounding
/// whitespace in the query. A blank query matches everything.
#[must_use]
pub fn search<'a>(tasks: &'a [Task], query: &str) -> Vec<&'a Task> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return tasks.iter().collect();
    }
    tasks
        .iter()
        .filter(|t| t.name.to_lowercase().contains(&needle))
        .collect()
}
