//! Shared data model for `Taskdeck`: tasks, drafts, the cached user profile
//! and the JSON codec used for durable storage.

pub mod codec;
pub mod task;
pub mod user;
