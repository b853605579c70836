//! Error types for the CUPI client
//!
//! Every public operation returns [`Result`]. Caller misuse is reported as
//! [`Error::InvalidInput`] before any request is made; a response with a
//! non-success status carries the full [`WebCallResult`].

use thiserror::Error;

use crate::result::WebCallResult;

/// Result type alias for CUPI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the CUPI client
#[derive(Error, Debug)]
pub enum Error {
    /// Caller misuse: missing server handle, blank required argument,
    /// empty change list. No request was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The transport could not complete the request
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("HTTP {}: {}", .0.status_code, .0.error_text)]
    Http(Box<WebCallResult>),

    /// A lookup by name or key matched nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response was well-formed JSON but not the expected shape
    #[error("Unexpected response: {0}")]
    Parse(String),

    /// Local file errors (audio uploads)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a response parsing error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Wrap a failed call
    pub fn http(result: WebCallResult) -> Self {
        Self::Http(Box::new(result))
    }

    /// The failed call, when the server answered
    pub fn web_call(&self) -> Option<&WebCallResult> {
        match self {
            Self::Http(result) => Some(result),
            _ => None,
        }
    }

    /// True for name lookups that matched nothing and for 404 responses
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Http(result) => result.status_code == 404,
            _ => false,
        }
    }

    /// True when the error was raised before any request was sent
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::HttpMethod;

    #[test]
    fn test_http_error_exposes_web_call() {
        let mut result = WebCallResult::new(HttpMethod::Get, "https://cuc/vmrest/ports/abc");
        result.status_code = 404;
        result.error_text = "Not Found".to_string();

        let err = Error::http(result);
        assert!(err.is_not_found());
        assert!(!err.is_caller_error());
        assert_eq!(err.web_call().map(|r| r.status_code), Some(404));
        assert_eq!(err.to_string(), "HTTP 404: Not Found");
    }

    #[test]
    fn test_invalid_input_is_caller_error() {
        let err = Error::invalid_input("empty change list");
        assert!(err.is_caller_error());
        assert!(err.web_call().is_none());
        assert!(!err.is_not_found());
    }
}
