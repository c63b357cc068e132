//! API client module for AnonBox.
//!
//! Provides the HTTP client with private-token header injection, the error
//! taxonomy, the transport seam, and request/response types matching the
//! AnonBox backend API.

pub mod client;
pub mod endpoints;
pub mod error;
#[cfg(test)]
pub(crate) mod mock;
pub mod transport;
pub mod types;

pub use client::{ApiClient, ResponseBody, PRIVATE_TOKEN_HEADER};
pub use error::{ApiError, ErrorCode, FieldErrors};
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport, TransportError};
