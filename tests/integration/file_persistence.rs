//! Integration tests for the file-backed store.
//!
//! Each test uses its own temporary directory as the data directory.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::Utc;
use taskdeck::app::App;
use taskdeck::clock::SystemClock;
use taskdeck::config::ClientConfig;
use taskdeck::storage::{DurableStore, FileBackend, KeyValueBackend, SESSION_KEY, TASKS_KEY};
use taskdeck::tasks::TaskStore;
use taskdeck_model::task::{Task, TaskDraft};

fn open_app(dir: &std::path::Path) -> App<FileBackend> {
    let config = ClientConfig {
        data_dir: dir.to_path_buf(),
        ..ClientConfig::default()
    };
    App::open(
        DurableStore::new(FileBackend::new(config.data_dir.clone())),
        SystemClock,
        &config,
    )
}

#[test]
fn documents_are_written_per_key() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = open_app(dir.path());
    app.session_mut().login("Ali", "ali@x.com");
    app.dashboard()
        .unwrap()
        .create(TaskDraft::new("on disk"))
        .unwrap();

    let marker = std::fs::read_to_string(dir.path().join(format!("{SESSION_KEY}.json"))).unwrap();
    assert_eq!(marker, "\"active\"");

    let raw = std::fs::read_to_string(dir.path().join(format!("{TASKS_KEY}.json"))).unwrap();
    let tasks: Vec<Task> = serde_json::from_str(&raw).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].name, "on disk");
    assert!(raw.contains("\"createdAt\""));
    assert!(raw.contains("\"status\":\"pending\""));
}

#[test]
fn state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let id = {
        let mut app = open_app(dir.path());
        app.session_mut().login("Ali", "ali@x.com");
        let task = app
            .dashboard()
            .unwrap()
            .create(TaskDraft::new("persist me"))
            .unwrap();
        app.dashboard().unwrap().toggle_completion(&task.id).unwrap();
        task.id
    };

    let mut app = open_app(dir.path());
    assert!(app.session().is_authenticated());
    let tasks = app.dashboard().unwrap();
    assert!(tasks.get(&id).unwrap().is_completed());
    assert_eq!(tasks.stats().completion_rate, 100);
}

#[test]
fn corrupt_task_file_loads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(format!("{TASKS_KEY}.json")), "[{broken").unwrap();

    let mut store = TaskStore::new(DurableStore::new(FileBackend::new(dir.path())));
    store.load();
    assert!(store.tasks().is_empty());

    // The next mutation replaces the corrupt document.
    store.create(TaskDraft::new("fresh")).unwrap();
    let raw = std::fs::read_to_string(dir.path().join(format!("{TASKS_KEY}.json"))).unwrap();
    let tasks: Vec<Task> = serde_json::from_str(&raw).unwrap();
    assert_eq!(tasks.len(), 1);
}

#[test]
fn missing_data_dir_is_created_on_first_write() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let backend = FileBackend::new(&nested);

    assert!(backend.get(TASKS_KEY).unwrap().is_none());
    backend.set(TASKS_KEY, "[]").unwrap();
    assert_eq!(backend.get(TASKS_KEY).unwrap().as_deref(), Some("[]"));
}

#[test]
fn logout_removes_session_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = open_app(dir.path());
    app.session_mut().login("Ali", "ali@x.com");
    app.session_mut().logout();

    assert!(!dir.path().join(format!("{SESSION_KEY}.json")).exists());
    let reopened = open_app(dir.path());
    assert!(!reopened.session().is_authenticated());
}

#[test]
fn tasks_written_by_older_clients_still_load() {
    let dir = tempfile::tempdir().unwrap();
    let created = Utc::now().to_rfc3339();
    let legacy = format!(
        r#"[{{"id":"V1StGXR8_Z5jdHi6B-myT","name":"legacy","status":"completed","createdAt":"{created}","updatedAt":"{created}"}}]"#
    );
    std::fs::write(dir.path().join(format!("{TASKS_KEY}.json")), legacy).unwrap();

    let mut store = TaskStore::new(DurableStore::new(FileBackend::new(dir.path())));
    store.load();
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0].id.as_str(), "V1StGXR8_Z5jdHi6B-myT");
    assert!(store.tasks()[0].is_completed());
}
