//! Session lifecycle state and navigation targets.

use urlencoding::encode;

/// Where the auth controller currently stands.
///
/// `Anonymous -> Verifying -> Authenticated -> Anonymous`, with registration
/// jumping straight from `Anonymous` to `Authenticated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No token held.
    #[default]
    Anonymous,
    /// Token presented, waiting for the backend to confirm it.
    Verifying,
    /// Token confirmed and identity cached.
    Authenticated,
}

impl SessionState {
    pub fn label(&self) -> &str {
        match self {
            SessionState::Anonymous => "Anonymous",
            SessionState::Verifying => "Verifying...",
            SessionState::Authenticated => "Authenticated",
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated)
    }
}

/// Navigation side effect requested by an auth flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Public landing page.
    Home,
    /// "Save your link" page shown right after registration.
    SaveLink { token: String, handle: String },
    /// Private inbox.
    Inbox { token: String },
    /// Public profile where others send messages.
    PublicProfile { handle: String },
}

impl Route {
    /// App-relative path for this route.
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::SaveLink { token, handle } => {
                format!("/save?token={}&handle={}", encode(token), encode(handle))
            }
            Route::Inbox { token } => format!("/inbox/{}", encode(token)),
            Route::PublicProfile { handle } => format!("/u/{}", encode(handle)),
        }
    }
}

/// Receives navigation requests from the auth controller.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that ignores every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, route: Route) {
        log::debug!("Navigation to {} ignored", route.path());
    }
}
