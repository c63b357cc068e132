//! Client library for AnonBox, an anonymous-messaging service.
//!
//! Users create a handle, receive a private access link (an opaque private
//! token), and read messages others send them anonymously. All business logic
//! lives in the backend; this crate wraps its HTTP API, keeps the session,
//! and drives the auth flows.

pub mod api;
pub mod auth;
pub mod config;
pub mod services;
pub mod session;
pub mod state;
pub mod validation;

pub use api::{ApiClient, ApiError, ErrorCode};
pub use auth::{AuthController, Navigator, Route, SessionState};
pub use config::ClientConfig;
pub use session::{Session, SessionStore, StoredSession};
pub use state::AppState;
