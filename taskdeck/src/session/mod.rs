//! Local session and identity bookkeeping.
//!
//! A session is a presence-only marker plus a cached [`UserProfile`]. Both
//! are written at login and removed at logout. The marker alone decides
//! whether the user is authenticated: a missing or malformed profile does
//! not log the user out, and a profile without a marker is ignored.
//!
//! No credentials are checked. Login is identity bookkeeping, not security.

pub mod access;

pub use access::{Access, Page};

use taskdeck_model::user::UserProfile;
use url::Url;

use crate::storage::{DurableStore, KeyValueBackend, SESSION_KEY, USER_KEY};

/// Value stored under the session marker key.
pub const SESSION_MARKER: &str = "active";

/// Display name used when nobody is logged in.
pub const GUEST_NAME: &str = "Guest";

/// Initials used when there is no profile.
pub const DEFAULT_INITIALS: &str = "Me";

/// Lifecycle of a [`SessionStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Initial state, before the stored session has been checked.
    Restoring,
    /// No active session.
    Unauthenticated,
    /// Session marker present.
    Authenticated,
}

/// Tracks who is logged in.
pub struct SessionStore<B> {
    storage: DurableStore<B>,
    state: SessionState,
    user: Option<UserProfile>,
    avatar_base: Option<Url>,
}

impl<B: KeyValueBackend> SessionStore<B> {
    /// Creates a store in [`SessionState::Restoring`].
    #[must_use]
    pub const fn new(storage: DurableStore<B>) -> Self {
        Self {
            storage,
            state: SessionState::Restoring,
            user: None,
            avatar_base: None,
        }
    }

    /// Sets the base URL used to build avatar URLs at login.
    #[must_use]
    pub fn with_avatar_base(mut self, base: Option<Url>) -> Self {
        self.avatar_base = base;
        self
    }

    /// Checks storage for an existing session. Runs once; this is the only
    /// way out of [`SessionState::Restoring`].
    pub fn restore(&mut self) {
        if self.state != SessionState::Restoring {
            return;
        }

        let marker: Option<serde_json::Value> = self.storage.read(SESSION_KEY, None);
        if marker.as_ref().is_some_and(marker_is_set) {
            self.user = self.storage.read(USER_KEY, None);
            self.state = SessionState::Authenticated;
            tracing::info!(has_profile = self.user.is_some(), "session restored");
        } else {
            self.user = None;
            self.state = SessionState::Unauthenticated;
            tracing::debug!("no stored session");
        }
    }

    /// Starts a session for `name` / `email`, replacing any current one.
    ///
    /// Returns the cached profile.
    pub fn login(&mut self, name: &str, email: &str) -> &UserProfile {
        self.restore();

        let profile = UserProfile::new(name, email, self.avatar_base.as_ref());
        self.storage.write(SESSION_KEY, SESSION_MARKER);
        self.storage.write(USER_KEY, &profile);
        self.state = SessionState::Authenticated;
        tracing::info!(email = %profile.email, "logged in");

        self.user.insert(profile)
    }

    /// Ends the session. Succeeds even if there was none.
    pub fn logout(&mut self) {
        self.restore();

        self.storage.clear(SESSION_KEY);
        self.storage.clear(USER_KEY);
        self.user = None;
        self.state = SessionState::Unauthenticated;
        tracing::info!("logged out");
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// `true` only in [`SessionState::Authenticated`].
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// `true` only in [`SessionState::Restoring`].
    #[must_use]
    pub fn is_session_loading(&self) -> bool {
        self.state == SessionState::Restoring
    }

    /// The cached profile, if authenticated and one was stored.
    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        if self.is_authenticated() {
            self.user.as_ref()
        } else {
            None
        }
    }

    /// The user's name, or [`GUEST_NAME`].
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.user().map_or(GUEST_NAME, |u| u.name.as_str())
    }

    /// The user's initials, or [`DEFAULT_INITIALS`].
    #[must_use]
    pub fn initials(&self) -> String {
        self.user()
            .map_or_else(|| DEFAULT_INITIALS.to_string(), UserProfile::initials)
    }

    /// Decides what the presentation layer may show for `page`.
    #[must_use]
    pub fn access(&self, page: Page) -> Access {
        access::decide(self.state, page)
    }
}

/// A marker counts unless it is `null`, `false`, `0` or `""`.
fn marker_is_set(marker: &serde_json::Value) -> bool {
    use serde_json::Value;

    match marker {
        Value::Null => false,
        Value::Bool(set) => *set,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
