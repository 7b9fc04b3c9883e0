//! Which pages the presentation layer may show for a session state.

use super::SessionState;

/// Pages the presentation layer can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Login form. Only for signed-out users.
    Login,
    /// Task dashboard. Only for signed-in users.
    Dashboard,
}

impl Page {
    /// Maps a route path to a page. Unknown paths (and `/`) go to login.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/dashboard" => Self::Dashboard,
            _ => Self::Login,
        }
    }

    /// Canonical route path.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
        }
    }
}

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The session is still being restored; show a placeholder.
    Loading,
    /// Show the requested page.
    Allowed,
    /// Show this page instead.
    Redirect(Page),
}

/// Guards both pages: the dashboard needs a session, the login page needs
/// its absence.
#[must_use]
pub const fn decide(state: SessionState, page: Page) -> Access {
    match (state, page) {
        (SessionState::Restoring, _) => Access::Loading,
        (SessionState::Authenticated, Page::Dashboard)
        | (SessionState::Unauthenticated, Page::Login) => Access::Allowed,
        (SessionState::Authenticated, Page::Login) => Access::Redirect(Page::Dashboard),
        (SessionState::Unauthenticated, Page::Dashboard) => Access::Redirect(Page::Login),
    }
}
