//! Error types for the Trakt API client.
//!
//! Every public operation returns [`Result`], so callers always receive either
//! a typed value or exactly one [`Error`].

use serde_json::Value;
use thiserror::Error;

use crate::models::MediaType;

/// A specialized `Result` type for Trakt operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error used to carry the cause of a transport failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for all Trakt API operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No HTTP response was received (connection refused, DNS, TLS, ...).
    #[error("Transport failure: {0}")]
    Transport(#[source] BoxError),

    /// Request timed out before a response arrived
    #[error("Request timeout")]
    Timeout,

    /// The route needs a user token and none is present
    #[error("Authorization required for {route}")]
    AuthorizationRequired {
        /// Name of the route that was refused
        route: &'static str,
    },

    /// API returned a non-2xx response
    #[error("API error: status={status}, message={message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Human-readable error message
        message: String,
        /// Raw response body for debugging
        body: Value,
    },

    /// Rate limited by the API
    #[error("Rate limited; retry after {retry_after_secs} seconds")]
    RateLimited {
        /// Number of seconds to wait before retrying
        retry_after_secs: u64,
    },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response is valid JSON but not the shape the endpoint promises
    #[error("Unexpected response shape: {0}")]
    Decode(String),

    /// A mutation was accepted but reported zero affected items
    #[error("{action} affected no {media_type}")]
    NoEffect {
        /// The sync action that was attempted
        action: &'static str,
        /// The media type whose counter was zero
        media_type: MediaType,
    },

    /// Authentication failed (token exchange, device polling, ...)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Invalid input provided to a function
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Token store could not be read or written
    #[error("Token storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns `true` if this error is potentially transient and the
    /// operation could be retried.
    ///
    /// # Example
    ///
    /// ```
    /// use trakt_rs::Error;
    ///
    /// assert!(Error::Timeout.is_retryable());
    /// assert!(!Error::InvalidInput("bad".into()).is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(_) | Error::Timeout | Error::RateLimited { .. } => true,
            Error::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is an authentication-related error.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Error::Authentication(_) | Error::AuthorizationRequired { .. } => true,
            Error::Api { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }

    /// Returns `true` if this error indicates a client-side issue
    /// (invalid input, bad request, etc.).
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::Api { status, .. } => *status >= 400 && *status < 500,
            Error::InvalidInput(_) | Error::Config(_) | Error::RateLimited { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if this error indicates a server-side issue.
    pub fn is_server_error(&self) -> bool {
        match self {
            Error::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Create an API error from a response.
    ///
    /// Trakt reports OAuth failures as `{"error", "error_description"}` and
    /// most other failures with an empty or plain-text body.
    pub(crate) fn from_api_response(status: u16, body: Value) -> Self {
        let message = body
            .get("error_description")
            .or_else(|| body.get("error"))
            .or_else(|| body.get("message"))
            .and_then(|m| m.as_str())
            .or_else(|| body.as_str().filter(|s| !s.is_empty()))
            .map(String::from)
            .unwrap_or_else(|| default_status_message(status).to_string());

        Error::Api {
            status,
            message,
            body,
        }
    }
}

fn default_status_message(status: u16) -> &'static str {
    match status {
        400 => "Bad request",
        401 => "OAuth token missing or invalid",
        403 => "Invalid API key or unapproved app",
        404 => "Resource not found",
        405 => "Method not allowed",
        409 => "Resource already created",
        412 => "Content type must be application/json",
        422 => "Validation errors",
        _ => "Unknown API error",
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else {
            Error::Transport(Box::new(err))
        }
    }
}
