//! Error types for NocoDB API calls.

use thiserror::Error;

/// Errors that can occur while talking to a NocoDB server.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The server answered with a status outside the accepted set.
    #[error("{method} {endpoint} -> {status}: {body}")]
    Status {
        method: String,
        endpoint: String,
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("{method} {endpoint} failed: {message}")]
    Transport {
        method: String,
        endpoint: String,
        message: String,
    },

    /// The response body was not the JSON shape we expected.
    #[error("could not decode response of {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// The HTTP client could not be built from the given settings.
    #[error("invalid client configuration: {0}")]
    Client(String),
}

impl ApiError {
    /// HTTP status, when the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Endpoint path (without the base URL) the failing call was made to.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Status { endpoint, .. }
            | Self::Transport { endpoint, .. }
            | Self::Decode { endpoint, .. } => Some(endpoint),
            Self::Client(_) => None,
        }
    }
}

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
