//! Error types for the marketplace API client.

use thiserror::Error;

/// API client error type.
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// Request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// An id cannot be used as a single URL path segment.
    #[error("invalid path segment: {0:?}")]
    InvalidPathSegment(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend rejected the bearer token. The local session has been cleared.
    #[error("session rejected by the server")]
    Unauthorized,

    /// Backend answered, but not with what the portal needs.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Http(e)
        }
    }
}

impl ApiError {
    /// Message suitable for showing next to a form.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Api { message, .. } if !message.trim().is_empty() => message.clone(),
            ApiError::Api { status, .. } if *status >= 500 => {
                "The server had a problem. Please try again shortly.".to_string()
            }
            ApiError::Api { .. } => "The request was rejected.".to_string(),
            ApiError::Timeout => "The server took too long to respond. Please try again.".to_string(),
            ApiError::Unauthorized => "Please sign in again.".to_string(),
            ApiError::InvalidPathSegment(_) => "That item could not be found.".to_string(),
            ApiError::Http(_) => "Could not reach the server. Check your connection.".to_string(),
            ApiError::InvalidUrl(_) | ApiError::Json(_) | ApiError::InvalidResponse(_) => {
                "The server sent an unexpected response.".to_string()
            }
        }
    }
}

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
