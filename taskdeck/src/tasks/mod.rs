//! The personal task list.
//!
//! [`TaskStore`] owns the authoritative list, mirrors it to durable storage
//! after every mutation and answers queries. [`stats`] holds the pure
//! aggregate computations over a list.

pub mod filter;
pub mod stats;
pub mod store;

pub use filter::search;
pub use stats::{TaskStats, completion_rate, latest};
pub use store::TaskStore;

use thiserror::Error;

/// Errors that can occur during task operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    /// Task name is empty after trimming.
    #[error("task name cannot be empty")]
    NameEmpty,
}
