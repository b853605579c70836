// # Transport Trait
//
// Defines the single seam between the resource layer and the network.
//
// ## Implementations
//
// - reqwest: `cupi-transport-http` crate
// - Tests: a recording mock in `tests/common`
//
// ## Usage
//
// ```rust,ignore
// use cupi_core::traits::{HttpMethod, HttpRequest, Transport};
//
// let response = transport
//     .execute(HttpRequest::get("https://cuc:8443/vmrest/phonesystems"))
//     .await?;
// assert_eq!(response.status, 200);
// ```

use async_trait::async_trait;
use std::fmt;

/// HTTP verbs used by the provisioning API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// No body
    Empty,
    /// XML document (`application/xml`)
    Xml(String),
    /// Raw WAV bytes (`audio/wav`)
    Audio(Vec<u8>),
}

impl RequestBody {
    /// Content type header value, if the body has one
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Xml(_) => Some("application/xml"),
            RequestBody::Audio(_) => Some("audio/wav"),
        }
    }

    /// Body as text, for XML bodies only
    pub fn as_xml(&self) -> Option<&str> {
        match self {
            RequestBody::Xml(xml) => Some(xml),
            _ => None,
        }
    }
}

/// One request against the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>, body: RequestBody) -> Self {
        Self {
            method,
            url: url.into(),
            body,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url, RequestBody::Empty)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url, RequestBody::Empty)
    }
}

/// Raw response as returned by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body decoded as text
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for transport implementations
///
/// A transport sends exactly one request per call and reports what the
/// server said. It does not interpret status codes, retry, or cache.
///
/// # Thread Safety
///
/// Implementations must be thread-safe; the server handle shares one
/// transport between every entity fetched through it.
///
/// # Errors
///
/// Return `Error::Transport` only when no response was received (DNS,
/// TLS, connect, timeout). Any response, including 4xx/5xx, is `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return the server's answer
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, crate::Error>;

    /// Transport name (for logging/debugging)
    fn transport_name(&self) -> &'static str;
}
