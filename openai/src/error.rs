use std::fmt;
use std::time::Duration;

/// Errors that can arise when calling an OpenAI-compatible API.
#[derive(Debug)]
pub enum OpenAIError {
    /// Transport failures: connection, TLS, or reading the response body.
    Http(reqwest::Error),
    /// The response body was not the expected JSON.
    Json(serde_json::Error),
    /// HTTP 429. `retry_after` carries the server's `Retry-After` hint.
    RateLimit {
        /// Error message from the response body.
        message: String,
        /// Delay requested by the server.
        retry_after: Option<Duration>,
    },
    /// HTTP 5xx.
    ServerError {
        /// Response status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },
    /// Any other non-success status, such as a bad request or invalid key.
    Status {
        /// Response status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },
    /// A single attempt exceeded the configured request timeout.
    Timeout(Duration),
    /// The response was well-formed JSON but violated the API contract.
    Api(String),
}

impl OpenAIError {
    /// Whether another attempt may succeed.
    ///
    /// Transport failures, timeouts, rate limits and server errors are retryable.
    /// Client errors and undecodable responses are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout(_) | Self::RateLimit { .. } | Self::ServerError { .. } => {
                true
            }
            Self::Json(_) | Self::Status { .. } | Self::Api(_) => false,
        }
    }
}

impl fmt::Display for OpenAIError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(err) => write!(f, "HTTP error: {err}"),
            Self::Json(err) => write!(f, "JSON error: {err}"),
            Self::RateLimit { message, .. } => write!(f, "rate limited: {message}"),
            Self::ServerError { status, message } => {
                write!(f, "server error ({status}): {message}")
            }
            Self::Status { status, message } => write!(f, "request rejected ({status}): {message}"),
            Self::Timeout(after) => write!(f, "request timed out after {after:?}"),
            Self::Api(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for OpenAIError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for OpenAIError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

impl From<serde_json::Error> for OpenAIError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
