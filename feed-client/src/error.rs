use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by `feed-client`.
pub enum FeedClientError {
    /// Transport-level failure (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server base URL cannot be used to build request URLs.
    #[error("invalid base url: {0}")]
    InvalidUrl(String),

    /// Missing or rejected session token.
    #[error("unauthorized")]
    Unauthorized,

    /// The requested post or profile does not exist.
    #[error("not found")]
    NotFound,

    /// The author exceeded the post creation rate limit.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The server rejected the input. `fields` maps field names to messages.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Top-level error message.
        message: String,
        /// Per-field validation messages.
        fields: BTreeMap<String, Vec<String>>,
    },

    /// The server failed to handle the request.
    #[error("server error: {0}")]
    Server(String),
}

/// Result alias for `feed-client` operations.
pub type FeedClientResult<T> = Result<T, FeedClientError>;

impl FeedClientError {
    pub(crate) fn from_http_status(
        status: reqwest::StatusCode,
        message: Option<String>,
        fields: BTreeMap<String, Vec<String>>,
    ) -> Self {
        let message = message.unwrap_or_else(|| format!("http status {status}"));
        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Self::Unauthorized
            }
            reqwest::StatusCode::NOT_FOUND => Self::NotFound,
            reqwest::StatusCode::TOO_MANY_REQUESTS => Self::RateLimited(message),
            status if status.is_client_error() => Self::InvalidRequest { message, fields },
            _ => Self::Server(message),
        }
    }

    /// First validation message for `field`, if the server sent one.
    pub fn field_message(&self, field: &str) -> Option<&str> {
        match self {
            Self::InvalidRequest { fields, .. } => fields
                .get(field)
                .and_then(|messages| messages.first())
                .map(String::as_str),
            _ => None,
        }
    }
}
