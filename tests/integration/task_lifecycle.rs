//! Integration tests for the task lifecycle.
//!
//! Drives the task store through create, edit, toggle and delete over a
//! shared in-memory backend and checks both the live list and what a fresh
//! store reads back from storage.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::similar_names)]

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use taskdeck::clock::ManualClock;
use taskdeck::storage::{DurableStore, KeyValueBackend, MemoryBackend, TASKS_KEY};
use taskdeck::tasks::{TaskError, TaskStats, TaskStore};
use taskdeck_model::task::{Task, TaskDraft, TaskId, TaskStatus};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn start() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
}

/// Opens and loads a store over `backend`, ticking `clock` by hand.
fn open_store(
    backend: &Arc<MemoryBackend>,
    clock: &ManualClock,
) -> TaskStore<Arc<MemoryBackend>> {
    let mut store = TaskStore::with_clock(DurableStore::new(Arc::clone(backend)), clock.clone());
    store.load();
    store
}

fn stored_tasks(backend: &Arc<MemoryBackend>) -> Vec<Task> {
    DurableStore::new(Arc::clone(backend)).read(TASKS_KEY, Vec::new())
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn create_two_toggle_one_gives_half_complete() {
    let backend = Arc::new(MemoryBackend::new());
    let clock = ManualClock::new(start());
    let mut store = open_store(&backend, &clock);

    store.create(TaskDraft::new("A")).unwrap();
    clock.advance(Duration::seconds(1));
    let b = store.create(TaskDraft::new("B")).unwrap();
    clock.advance(Duration::seconds(1));
    store.toggle_completion(&b.id).unwrap();

    assert_eq!(
        store.stats(),
        TaskStats {
            total: 2,
            completed: 1,
            pending: 1,
            completion_rate: 50,
        }
    );
    let latest = store.latest(1);
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].name, "B");
}

#[test]
fn delete_unknown_id_leaves_list_unchanged() {
    let backend = Arc::new(MemoryBackend::new());
    let clock = ManualClock::new(start());
    let mut store = open_store(&backend, &clock);
    store.create(TaskDraft::new("A")).unwrap();
    store.create(TaskDraft::new("B")).unwrap();

    let before_list = store.tasks().to_vec();
    let before_raw = backend.get(TASKS_KEY).unwrap();

    assert!(store.delete(&TaskId::from("no-such-task")).is_none());

    assert_eq!(store.tasks(), before_list.as_slice());
    assert_eq!(backend.get(TASKS_KEY).unwrap(), before_raw);
}

#[test]
fn every_mutation_is_visible_to_a_fresh_store() {
    let backend = Arc::new(MemoryBackend::new());
    let clock = ManualClock::new(start());
    let mut store = open_store(&backend, &clock);

    let task = store
        .create(TaskDraft::new("  Write report ").with_description("Q2 numbers"))
        .unwrap();
    assert_eq!(task.name, "Write report");
    assert_eq!(stored_tasks(&backend), store.tasks());

    clock.advance(Duration::minutes(5));
    store
        .update(&task.id, TaskDraft::new("Write Q2 report"))
        .unwrap();
    assert_eq!(stored_tasks(&backend), store.tasks());

    clock.advance(Duration::minutes(5));
    store.toggle_completion(&task.id).unwrap();
    assert_eq!(stored_tasks(&backend), store.tasks());

    let reopened = open_store(&backend, &clock);
    let reloaded = reopened.get(&task.id).unwrap();
    assert_eq!(reloaded.name, "Write Q2 report");
    assert_eq!(reloaded.description.as_deref(), Some("Q2 numbers"));
    assert_eq!(reloaded.status, TaskStatus::Completed);
    assert_eq!(reloaded.created_at, start());
    assert_eq!(reloaded.updated_at, start() + Duration::minutes(10));

    store.delete(&task.id).unwrap();
    assert!(stored_tasks(&backend).is_empty());
}

#[test]
fn update_preserves_identity_and_creation_time() {
    let backend = Arc::new(MemoryBackend::new());
    let clock = ManualClock::new(start());
    let mut store = open_store(&backend, &clock);
    let task = store.create(TaskDraft::new("A")).unwrap();
    store.toggle_completion(&task.id).unwrap();

    clock.advance(Duration::hours(1));
    let due = start() + Duration::days(7);
    let updated = store
        .update(
            &task.id,
            TaskDraft {
                name: "A2".to_string(),
                description: Some("more".to_string()),
                due_date: Some(due),
            },
        )
        .unwrap();

    assert_eq!(updated.id, task.id);
    assert_eq!(updated.created_at, task.created_at);
    assert_eq!(updated.status, TaskStatus::Completed);
    assert_eq!(updated.due_date, Some(due));
    assert!(updated.updated_at > task.updated_at);
}

#[test]
fn blank_name_is_rejected_without_side_effects() {
    let backend = Arc::new(MemoryBackend::new());
    let clock = ManualClock::new(start());
    let mut store = open_store(&backend, &clock);

    assert_eq!(store.create(TaskDraft::new(" \t ")), Err(TaskError::NameEmpty));
    assert!(store.tasks().is_empty());
    assert!(backend.get(TASKS_KEY).unwrap().is_none());
}

#[test]
fn toggle_twice_restores_status() {
    let backend = Arc::new(MemoryBackend::new());
    let clock = ManualClock::new(start());
    let mut store = open_store(&backend, &clock);
    let task = store.create(TaskDraft::new("A")).unwrap();

    store.toggle_completion(&task.id).unwrap();
    let back = store.toggle_completion(&task.id).unwrap();
    assert_eq!(back.status, TaskStatus::Pending);
    assert_eq!(store.stats().completion_rate, 0);
}

#[test]
fn stats_round_half_up() {
    let backend = Arc::new(MemoryBackend::new());
    let clock = ManualClock::new(start());
    let mut store = open_store(&backend, &clock);
    let ids: Vec<TaskId> = (0..3)
        .map(|i| store.create(TaskDraft::new(format!("T{i}"))).unwrap().id)
        .collect();

    store.toggle_completion(&ids[0]).unwrap();
    assert_eq!(store.stats().completion_rate, 33);
    store.toggle_completion(&ids[1]).unwrap();
    assert_eq!(store.stats().completion_rate, 67);
}

#[test]
fn search_matches_case_insensitively() {
    let backend = Arc::new(MemoryBackend::new());
    let clock = ManualClock::new(start());
    let mut store = open_store(&backend, &clock);
    store.create(TaskDraft::new("Buy Milk")).unwrap();
    store.create(TaskDraft::new("Walk dog")).unwrap();

    let found: Vec<&str> = store.search("  milk").iter().map(|t| t.name.as_str()).collect();
    assert_eq!(found, ["Buy Milk"]);
    assert_eq!(store.search("").len(), 2);
}

#[test]
fn mutations_before_load_survive_the_load() {
    let backend = Arc::new(MemoryBackend::new());
    let clock = ManualClock::new(start());
    {
        let mut first = open_store(&backend, &clock);
        first.create(TaskDraft::new("stored")).unwrap();
    }

    let mut store = TaskStore::with_clock(DurableStore::new(Arc::clone(&backend)), clock.clone());
    assert!(store.is_loading());
    store.create(TaskDraft::new("early")).unwrap();
    // Nothing is written before the load.
    assert_eq!(stored_tasks(&backend).len(), 1);

    store.load();
    let names: Vec<&str> = store.tasks().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["early", "stored"]);
    assert_eq!(stored_tasks(&backend).len(), 2);
}
