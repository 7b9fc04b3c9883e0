//! Application state: the session gate in front of the task store.
//!
//! [`App`] cannot be built without a [`SessionStore`], so every path to the
//! task list goes through the access gate.

use crate::clock::Clock;
use crate::config::ClientConfig;
use crate::session::{Access, Page, SessionStore};
use crate::storage::{DurableStore, KeyValueBackend};
use crate::tasks::TaskStore;

/// Session and task stores sharing one storage backend.
pub struct App<B> {
    session: SessionStore<B>,
    tasks: TaskStore<B>,
}

impl<B: KeyValueBackend> App<B> {
    /// Wires already constructed stores together.
    #[must_use]
    pub const fn new(session: SessionStore<B>, tasks: TaskStore<B>) -> Self {
        Self { session, tasks }
    }

    /// Opens both stores over `storage` and restores the session.
    ///
    /// The task list is loaded lazily, on first access to the dashboard.
    #[must_use]
    pub fn open(storage: DurableStore<B>, clock: impl Clock + 'static, config: &ClientConfig) -> Self
    where
        B: Clone,
    {
        let session = SessionStore::new(storage.clone())
            .with_avatar_base(config.avatar_base_url.clone());
        let tasks = TaskStore::with_clock(storage, clock);
        let mut app = Self::new(session, tasks);
        app.session.restore();
        app
    }

    /// The session store.
    #[must_use]
    pub const fn session(&self) -> &SessionStore<B> {
        &self.session
    }

    /// The session store, for login and logout.
    pub const fn session_mut(&mut self) -> &mut SessionStore<B> {
        &mut self.session
    }

    /// The task store, loaded, if the dashboard is reachable.
    ///
    /// # Errors
    ///
    /// Returns the gate's decision ([`Access::Loading`] or a redirect) when
    /// the dashboard may not be shown.
    pub fn dashboard(&mut self) -> Result<&mut TaskStore<B>, Access> {
        match self.session.access(Page::Dashboard) {
            Access::Allowed => {
                self.tasks.load();
                Ok(&mut self.tasks)
            }
            denied => Err(denied),
        }
    }
}
