//! Client error types.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure before any HTTP response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned a non-2xx response.
    #[error("API error ({status}): {}", api_message(.data))]
    Api {
        /// HTTP status code.
        status: u16,
        /// Parsed JSON error body, when the body was JSON.
        data: Option<Value>,
    },

    /// The access-token refresh failed; stored tokens have been cleared.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(Arc<Error>),

    /// The refresh task went away without reporting an outcome.
    #[error("Token refresh was aborted")]
    RefreshAborted,

    /// An operation did not complete in time.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Reading or writing persisted tokens failed.
    #[error("Token storage error: {0}")]
    Storage(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status carried by this error, looking through refresh failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            Error::RefreshFailed(inner) => inner.status(),
            _ => None,
        }
    }

    /// Parsed JSON error payload, if the server sent one.
    pub fn data(&self) -> Option<&Value> {
        match self {
            Error::Api { data, .. } => data.as_ref(),
            Error::RefreshFailed(inner) => inner.data(),
            _ => None,
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api { status: 404, .. })
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Api { status: 401, .. }) || self.is_session_ended()
    }

    /// True when the session is gone and the caller should log in again.
    pub fn is_session_ended(&self) -> bool {
        matches!(self, Error::RefreshFailed(_) | Error::RefreshAborted)
    }

    /// Check if this is a validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Api { status: 400 | 422, .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status >= 500)
    }

    /// Check if the request or refresh timed out.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout(_) => true,
            Error::Http(e) => e.is_timeout(),
            Error::RefreshFailed(inner) => inner.is_timeout(),
            _ => false,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Human-readable message from an error payload.
///
/// Understands `{"detail": "..."}`, `{"message": "..."}` and
/// `{"error": "..."}` bodies; anything else renders generically.
fn api_message(data: &Option<Value>) -> String {
    let Some(data) = data else {
        return "no error details".to_string();
    };

    ["detail", "message", "error"]
        .iter()
        .find_map(|key| data.get(key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| data.to_string())
}
