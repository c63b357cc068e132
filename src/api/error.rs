//! Error taxonomy for AnonBox API calls.
//!
//! Every non-2xx response and every transport failure is turned into an
//! [`ApiError`]. Each variant carries only the fields relevant to it so
//! callers can match exhaustively instead of probing optional fields.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// User-facing message texts.
pub mod messages {
    pub const NETWORK: &str = "Connection error. Check your internet connection.";
    pub const SERVER: &str = "Server error. Please try again later.";
    pub const UNAUTHORIZED: &str = "Invalid or expired token. Please create a new account.";
    pub const FORBIDDEN: &str = "You do not have access to this resource.";
    pub const NOT_FOUND: &str = "Resource not found.";
    pub const VALIDATION: &str = "The submitted data is invalid.";
    pub const RATE_LIMIT: &str = "Too many requests. Please wait a moment.";
    pub const DOWNLOAD_FAILED: &str = "File download failed.";
    pub const INVALID_RESPONSE: &str = "Unexpected response from the server.";
}

/// Field name -> list of validation messages, as returned in a 422 body.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Classification code attached to every [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    ValidationError,
    RateLimit,
    ServerError,
    NetworkError,
    Unknown,
    InvalidResponse,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::RateLimit => "RATE_LIMIT",
            ErrorCode::ServerError => "SERVER_ERROR",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::Unknown => "UNKNOWN",
            ErrorCode::InvalidResponse => "INVALID_RESPONSE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error returned by every [`ApiClient`](super::client::ApiClient) call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// No response was received (offline, DNS failure, refused, timed out).
    #[error("{message}")]
    Network { message: String },

    /// 401. The stored session has already been cleared when this is returned.
    #[error("{message}")]
    Unauthorized { message: String },

    /// 403.
    #[error("{message}")]
    Forbidden { message: String },

    /// 404.
    #[error("{message}")]
    NotFound { message: String },

    /// 422 with per-field validation messages from the response body.
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: FieldErrors,
    },

    /// 429.
    #[error("{message}")]
    RateLimited { message: String },

    /// 500.
    #[error("{message}")]
    Server { message: String },

    /// Any other non-2xx status.
    #[error("{message} ({status})")]
    Unexpected { status: u16, message: String },

    /// A 2xx response whose body did not match the expected shape.
    #[error("{message}")]
    InvalidResponse { message: String },
}

impl ApiError {
    /// Build the error for a non-2xx `status`.
    ///
    /// `body_message` is the `message` field of a JSON error body, if any. It
    /// only survives for statuses without a fixed message.
    pub fn from_status(status: u16, body_message: Option<String>, field_errors: FieldErrors) -> Self {
        match status {
            401 => ApiError::Unauthorized {
                message: messages::UNAUTHORIZED.to_string(),
            },
            403 => ApiError::Forbidden {
                message: messages::FORBIDDEN.to_string(),
            },
            404 => ApiError::NotFound {
                message: messages::NOT_FOUND.to_string(),
            },
            422 => ApiError::Validation {
                message: messages::VALIDATION.to_string(),
                field_errors,
            },
            429 => ApiError::RateLimited {
                message: messages::RATE_LIMIT.to_string(),
            },
            500 => ApiError::Server {
                message: messages::SERVER.to_string(),
            },
            _ => ApiError::Unexpected {
                status,
                message: body_message.unwrap_or_else(|| messages::SERVER.to_string()),
            },
        }
    }

    /// Connection-level failure with the standard message.
    pub fn network() -> Self {
        ApiError::Network {
            message: messages::NETWORK.to_string(),
        }
    }

    pub fn invalid_response(detail: impl fmt::Display) -> Self {
        log::warn!("Response body did not match expected shape: {}", detail);
        ApiError::InvalidResponse {
            message: messages::INVALID_RESPONSE.to_string(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::Network { .. } => ErrorCode::NetworkError,
            ApiError::Unauthorized { .. } => ErrorCode::Unauthorized,
            ApiError::Forbidden { .. } => ErrorCode::Forbidden,
            ApiError::NotFound { .. } => ErrorCode::NotFound,
            ApiError::Validation { .. } => ErrorCode::ValidationError,
            ApiError::RateLimited { .. } => ErrorCode::RateLimit,
            ApiError::Server { .. } => ErrorCode::ServerError,
            ApiError::Unexpected { .. } => ErrorCode::Unknown,
            ApiError::InvalidResponse { .. } => ErrorCode::InvalidResponse,
        }
    }

    /// HTTP status of the rejected response, `None` when no response arrived.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Network { .. } | ApiError::InvalidResponse { .. } => None,
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Forbidden { .. } => Some(403),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Validation { .. } => Some(422),
            ApiError::RateLimited { .. } => Some(429),
            ApiError::Server { .. } => Some(500),
            ApiError::Unexpected { status, .. } => Some(*status),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Network { message }
            | ApiError::Unauthorized { message }
            | ApiError::Forbidden { message }
            | ApiError::NotFound { message }
            | ApiError::Validation { message, .. }
            | ApiError::RateLimited { message }
            | ApiError::Server { message }
            | ApiError::Unexpected { message, .. }
            | ApiError::InvalidResponse { message } => message,
        }
    }

    /// Replace the human-readable message, keeping the classification.
    pub(crate) fn with_message(mut self, text: String) -> Self {
        match &mut self {
            ApiError::Network { message }
            | ApiError::Unauthorized { message }
            | ApiError::Forbidden { message }
            | ApiError::NotFound { message }
            | ApiError::Validation { message, .. }
            | ApiError::RateLimited { message }
            | ApiError::Server { message }
            | ApiError::Unexpected { message, .. }
            | ApiError::InvalidResponse { message } => *message = text,
        }
        self
    }

    /// Per-field validation messages. Empty for everything but 422.
    pub fn field_errors(&self) -> &FieldErrors {
        static EMPTY: FieldErrors = BTreeMap::new();
        match self {
            ApiError::Validation { field_errors, .. } => field_errors,
            _ => &EMPTY,
        }
    }

    pub fn is_network_error(&self) -> bool {
        matches!(self, ApiError::Network { .. })
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}
