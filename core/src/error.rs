//! Error types for the Pushwoosh client.
//!
//! # Design
//! Every failure a call can hit maps onto one `ApiError` variant, in the order
//! a call encounters them: configuration, request encoding, transport, HTTP
//! status, response decoding. Transport failures keep their own enum so
//! callers can tell a cancelled call from a broken network without matching
//! on strings.

use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by `PushwooshClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing configuration or an endpoint that is not a usable base URL.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request envelope could not be built from the call parameters.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// The HTTP exchange did not complete.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The provider answered with a status other than 200 OK.
    #[error("pushwoosh {method} {path} responded with HTTP status {status} {status_text}")]
    HttpStatus {
        method: String,
        path: String,
        status: u16,
        status_text: String,
    },

    /// The response body does not match the expected shape.
    #[error("decoding failed: {0}")]
    Decoding(String),
}

impl ApiError {
    /// True when the call was aborted through its `Context`.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Cancelled))
    }

    /// True for both the transport timeout and an expired context deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Transport(TransportError::Timeout | TransportError::DeadlineExceeded)
        )
    }

    /// HTTP status of an `HttpStatus` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failures of the HTTP round trip itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The call's context was cancelled before a response arrived.
    #[error("request cancelled")]
    Cancelled,

    /// The call's context deadline passed before a response arrived.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// The transport's own timeout fired.
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS, or I/O failure.
    #[error("network error: {0}")]
    Network(String),
}
