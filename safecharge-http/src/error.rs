//! Error types for the HTTP client.
//!
//! [`GatewayError`] carries full internal detail and is only ever logged.
//! Callers see [`SendError`], which keeps the category and drops the detail.

use safecharge::{RequestError, ResponseError};

/// The request could not be delivered or its response could not be read.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// No response within the configured timeout.
    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// Connection, TLS or protocol failure.
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// Failure reported by a custom transport.
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        // The URL carries the unmasked query string.
        let err = err.without_url();
        if err.is_timeout() {
            Self::Timeout(err)
        } else {
            Self::Request(err)
        }
    }
}

/// Any failure inside one `send` call, before coarsening.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request was rejected locally; nothing was sent.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The transport failed.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// The response body was unusable.
    #[error(transparent)]
    Response(#[from] ResponseError),
}

impl GatewayError {
    /// Short category name used in log records.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Request(RequestError::Internal(_)) => "internal",
            Self::Request(RequestError::Validation(_)) => "validation",
            Self::Request(RequestError::CardNumber(_)) => "card_number",
            Self::Network(_) => "network",
            Self::Response(_) => "response",
        }
    }
}

/// Caller-facing failure of [`GatewayClient::send`](crate::client::GatewayClient::send).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// The gateway could not be reached or did not answer in time.
    #[error("Gateway communications error. Please try again later.")]
    Communications,

    /// Something the caller cannot fix went wrong.
    #[error("Internal server error. Please try again later.")]
    Internal,

    /// The caller's data is invalid; the reason names the field.
    #[error("Validation error: {0}. Please correct your data and try again.")]
    Validation(String),

    /// The card number failed its checks.
    #[error("Credit card number is invalid. Please correct and try again.")]
    InvalidCardNumber,
}

impl SendError {
    /// Returns whether repeating the same call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Communications)
    }
}

impl From<&GatewayError> for SendError {
    fn from(err: &GatewayError) -> Self {
        match err {
            GatewayError::Network(_) => Self::Communications,
            GatewayError::Request(RequestError::Validation(err)) => Self::Validation(err.to_string()),
            GatewayError::Request(RequestError::CardNumber(_)) => Self::InvalidCardNumber,
            GatewayError::Request(RequestError::Internal(_)) | GatewayError::Response(_) => {
                Self::Internal
            }
        }
    }
}

impl From<GatewayError> for SendError {
    fn from(err: GatewayError) -> Self {
        Self::from(&err)
    }
}

/// A [`GatewayClient`](crate::client::GatewayClient) could not be created.
#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    /// The log file could not be opened for appending.
    #[error("Failed to open log file: {0}")]
    LogFile(#[from] std::io::Error),

    /// A zero timeout would fail every request.
    #[error("Timeout must be at least one second")]
    InvalidTimeout,
}
