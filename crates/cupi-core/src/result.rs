//! Flat result of a single call against the server
//!
//! Successful writes hand this back to the caller; failed calls travel
//! inside [`Error::Http`](crate::Error::Http).

use std::fmt;

use crate::traits::HttpMethod;

/// Outcome of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebCallResult {
    /// True for 2xx responses
    pub success: bool,
    /// HTTP status code (0 until a response arrives)
    pub status_code: u16,
    /// Request method
    pub method: HttpMethod,
    /// Full request URL
    pub url: String,
    /// Raw response body
    pub response_text: String,
    /// Human-readable failure description, empty on success
    pub error_text: String,
    /// Object id parsed from a create response, empty otherwise
    pub returned_object_id: String,
    /// `@total` from list responses
    pub total_object_count: usize,
}

impl WebCallResult {
    /// Create an empty result for a request about to be sent
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code: 0,
            method,
            url: url.into(),
            response_text: String::new(),
            error_text: String::new(),
            returned_object_id: String::new(),
            total_object_count: 0,
        }
    }
}

impl fmt::Display for WebCallResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} (success={})",
            self.method, self.url, self.status_code, self.success
        )?;
        if !self.error_text.is_empty() {
            write!(f, ": {}", self.error_text)?;
        }
        if !self.returned_object_id.is_empty() {
            write!(f, " [object {}]", self.returned_object_id)?;
        }
        Ok(())
    }
}
