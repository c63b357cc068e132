//! Application state for the AnonBox client.
//!
//! Bundles the configuration, the shared API client and the auth controller.
//! The session store is shared between the client (401 handling, token
//! header) and the controller (persist / restore / clear).

use std::sync::Arc;

use crate::api::ApiClient;
use crate::auth::{AuthController, Navigator};
use crate::config::ClientConfig;
use crate::session::SessionStore;

pub struct AppState {
    pub config: ClientConfig,
    /// HTTP client for AnonBox API communication.
    pub api: Arc<ApiClient>,
    pub auth: AuthController,
}

impl AppState {
    /// Build state over the production transport and restore any stored session.
    pub fn new(config: ClientConfig, session: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        let api = Arc::new(ApiClient::new(&config, Arc::new(session)));
        Self::with_client(config, api, navigator)
    }

    pub fn with_client(config: ClientConfig, api: Arc<ApiClient>, navigator: Arc<dyn Navigator>) -> Self {
        let mut auth = AuthController::new(api.clone(), navigator);
        auth.restore();
        Self { config, api, auth }
    }

    pub fn session(&self) -> &SessionStore {
        self.api.session()
    }

    /// Absolute link to a public profile.
    pub fn public_link(&self, handle: &str) -> String {
        self.config
            .app_link(&crate::auth::Route::PublicProfile { handle: handle.to_string() }.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::mock_client;
    use crate::auth::{NoopNavigator, SessionState};
    use crate::session::Session;

    #[test]
    fn test_with_client_restores_stored_session() {
        let (client, _, store) = mock_client();
        store
            .persist_session(&Session {
                private_token: "tok_x".into(),
                handle: "ab123".into(),
                display_name: "ab".into(),
            })
            .unwrap();

        let state = AppState::with_client(ClientConfig::default(), Arc::new(client), Arc::new(NoopNavigator));
        assert_eq!(state.auth.state(), SessionState::Authenticated);
        assert_eq!(state.public_link("ab123"), "http://localhost:3000/u/ab123");
    }

    #[test]
    fn test_unavailable_storage_starts_anonymous() {
        let state = AppState::new(
            ClientConfig::default(),
            SessionStore::unavailable(),
            Arc::new(NoopNavigator),
        );
        assert_eq!(state.auth.state(), SessionState::Anonymous);
        assert!(!state.session().is_available());
    }
}
