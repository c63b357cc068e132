//! Session-aware auth flows.
//!
//! [`AuthController`] is the only place where registration, token login,
//! silent verification and logout happen. Each flow makes one API call,
//! updates the stored and in-memory session on success, and asks the
//! [`Navigator`] to move on. Failures leave a human-readable message in
//! `error` and are returned to the caller.

pub mod state;

use std::sync::Arc;

use zeroize::Zeroizing;

pub use state::{Navigator, NoopNavigator, Route, SessionState};

use crate::api::types::User;
use crate::api::{ApiClient, ApiError};
use crate::session::Session;

const REGISTER_FAILED: &str = "An error occurred while creating your profile.";
const LOGIN_FAILED: &str = "Invalid or expired token.";
const REGENERATE_FAILED: &str = "Unable to generate a new private link.";

/// Identity cached for the active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub handle: String,
    pub display_name: String,
}

/// Result of a successful registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: User,
    pub private_token: String,
    /// App-relative path of the private inbox.
    pub inbox_path: String,
}

/// Result of a successful token verification.
#[derive(Debug, Clone)]
pub struct VerifiedSession {
    pub user: User,
    pub unread_count: u64,
}

pub struct AuthController {
    api: Arc<ApiClient>,
    navigator: Arc<dyn Navigator>,
    identity: Option<Identity>,
    private_token: Option<Zeroizing<String>>,
    state: SessionState,
    is_loading: bool,
    error: Option<String>,
}

impl AuthController {
    pub fn new(api: Arc<ApiClient>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            api,
            navigator,
            identity: None,
            private_token: None,
            state: SessionState::Anonymous,
            is_loading: false,
            error: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn private_token(&self) -> Option<&str> {
        self.private_token.as_ref().map(|t| t.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.private_token.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Message from the last failed flow, cleared when a new flow starts.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Restore the cached identity from storage.
    ///
    /// Needs both a token and a handle; anything less leaves the controller
    /// anonymous. Returns the resulting state.
    pub fn restore(&mut self) -> SessionState {
        match self.api.session().get_stored_session().into_session() {
            Some(session) => {
                log::info!("Restored stored session for {}", session.handle);
                self.set_authenticated(session);
            }
            None => self.drop_identity(),
        }
        self.is_loading = false;
        self.state
    }

    /// Reconcile with storage after a call that may have hit a 401.
    ///
    /// Returns `false` if the stored token disappeared and the controller
    /// went back to `Anonymous`.
    pub fn sync_with_store(&mut self) -> bool {
        if self.private_token.is_some() && self.api.session().private_token().is_none() {
            log::info!("Stored session was cleared, dropping cached identity");
            self.drop_identity();
            return false;
        }
        true
    }

    /// Create a profile and keep its session.
    ///
    /// Navigates to the "save your link" page on success.
    pub async fn register(&mut self, display_name: &str) -> Result<Registration, ApiError> {
        self.begin(SessionState::Anonymous);

        let resp = match self.api.create_user(display_name).await {
            Ok(resp) => resp,
            Err(e) => {
                self.fail(&e, REGISTER_FAILED, SessionState::Anonymous);
                return Err(e);
            }
        };

        if let Some(warning) = &resp.warning {
            log::info!("Registration warning from backend: {}", warning);
        }

        let mut user = resp.data;
        if user.display_name.is_empty() {
            user.display_name = display_name.to_string();
        }
        let session = Session {
            private_token: resp.private_token.clone(),
            handle: user.handle.clone(),
            display_name: user.display_name.clone(),
        };
        self.persist(&session);
        self.set_authenticated(session);
        self.is_loading = false;

        log::info!("Registered new profile {}", user.handle);
        self.navigator.navigate(Route::SaveLink {
            token: resp.private_token.clone(),
            handle: user.handle.clone(),
        });

        Ok(Registration {
            inbox_path: Route::Inbox {
                token: resp.private_token.clone(),
            }
            .path(),
            user,
            private_token: resp.private_token,
        })
    }

    /// Log in with a private token (opening a private link).
    ///
    /// Navigates to the inbox on success; stays anonymous on failure.
    pub async fn login_with_token(&mut self, token: &str) -> Result<User, ApiError> {
        let verified = self.verify(token).await;
        match verified {
            Ok(v) => {
                self.navigator.navigate(Route::Inbox {
                    token: token.to_string(),
                });
                Ok(v.user)
            }
            Err(e) => {
                // A 401 has already wiped storage; any other failure keeps a prior session.
                self.sync_with_store();
                let state = if self.private_token.is_some() {
                    SessionState::Authenticated
                } else {
                    SessionState::Anonymous
                };
                self.fail(&e, LOGIN_FAILED, state);
                Err(e)
            }
        }
    }

    /// Silent guard for private pages.
    ///
    /// On failure the stored session is wiped and the user is sent home.
    pub async fn verify_session(&mut self, token: &str) -> Result<VerifiedSession, ApiError> {
        match self.verify(token).await {
            Ok(v) => Ok(v),
            Err(e) => {
                log::info!("Session verification failed ({}), logging out", e.code());
                self.clear_stored();
                self.drop_identity();
                self.fail(&e, LOGIN_FAILED, SessionState::Anonymous);
                self.navigator.navigate(Route::Home);
                Err(e)
            }
        }
    }

    /// Local logout. The token stays valid server-side.
    pub fn logout(&mut self) {
        log::info!("Logging out");
        self.clear_stored();
        self.drop_identity();
        self.error = None;
        self.is_loading = false;
        self.navigator.navigate(Route::Home);
    }

    /// Swap the private token for a new one and keep the new session.
    pub async fn regenerate_token(&mut self) -> Result<String, ApiError> {
        let identity = self.identity.clone();
        self.begin(self.state);

        let resp = match self.api.regenerate_token().await {
            Ok(resp) => resp,
            Err(e) => {
                self.sync_with_store();
                let state = self.state;
                self.fail(&e, REGENERATE_FAILED, state);
                return Err(e);
            }
        };

        let identity = identity.unwrap_or_else(|| Identity {
            handle: self.api.session().get_stored_session().handle.unwrap_or_default(),
            display_name: String::new(),
        });
        let session = Session {
            private_token: resp.new_private_token.clone(),
            handle: identity.handle.clone(),
            display_name: identity.display_name,
        };
        self.persist(&session);
        self.set_authenticated(session);
        self.is_loading = false;

        log::info!("Private token regenerated for {}", identity.handle);
        self.navigator.navigate(Route::SaveLink {
            token: resp.new_private_token.clone(),
            handle: identity.handle,
        });
        Ok(resp.new_private_token)
    }

    // ── Internals ────────────────────────────────────────────────────────

    async fn verify(&mut self, token: &str) -> Result<VerifiedSession, ApiError> {
        self.begin(SessionState::Verifying);

        let resp = self.api.verify_token(token).await?;
        let session = Session {
            private_token: token.to_string(),
            handle: resp.data.handle.clone(),
            display_name: resp.data.display_name.clone(),
        };
        self.persist(&session);
        self.set_authenticated(session);
        self.is_loading = false;

        Ok(VerifiedSession {
            user: resp.data,
            unread_count: resp.unread_count,
        })
    }

    fn begin(&mut self, state: SessionState) {
        self.is_loading = true;
        self.error = None;
        self.state = state;
    }

    fn fail(&mut self, err: &ApiError, fallback: &str, state: SessionState) {
        let message = if err.message().is_empty() {
            fallback.to_string()
        } else {
            err.message().to_string()
        };
        log::warn!("Auth flow failed: {} ({})", message, err.code());
        self.error = Some(message);
        self.is_loading = false;
        self.state = state;
    }

    fn persist(&self, session: &Session) {
        if let Err(e) = self.api.session().persist_session(session) {
            log::warn!("Session not persisted, it will not survive a restart: {}", e);
        }
    }

    fn clear_stored(&self) {
        if let Err(e) = self.api.session().clear_session() {
            log::warn!("Failed to clear stored session: {}", e);
        }
    }

    fn set_authenticated(&mut self, session: Session) {
        self.identity = Some(Identity {
            handle: session.handle,
            display_name: session.display_name,
        });
        self.private_token = Some(Zeroizing::new(session.private_token));
        self.state = SessionState::Authenticated;
    }

    /// `Zeroizing` wipes the token when it is dropped here.
    fn drop_identity(&mut self) {
        self.identity = None;
        self.private_token = None;
        self.state = SessionState::Anonymous;
    }
}
