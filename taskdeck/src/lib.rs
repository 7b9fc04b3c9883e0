//! `Taskdeck`: personal task list with local sessions and durable storage.

pub mod app;
pub mod cli;
pub mod clock;
pub mod config;
pub mod session;
pub mod storage;
pub mod tasks;
