// # HTTP Transport
//
// reqwest implementation of `cupi_core::Transport`.
//
// - Basic authentication with the configured administrator login
// - `Accept: application/json` on every request
// - Client timeout from `ServerConfig::timeout_secs`
// - Optional acceptance of self-signed certificates
// - Cookie store, so the server's session cookie is reused and the login
//   is not re-validated on every call
//
// Status codes are handed back untouched; classifying them is the server
// handle's job. Nothing is retried.
//
// ## Security Requirements
//
// - The password NEVER appears in logs or `Debug` output
// - Request bodies are never logged

use async_trait::async_trait;
use cupi_core::traits::{HttpMethod, HttpRequest, HttpResponse, RequestBody, Transport};
use cupi_core::{Error, Result, ServerConfig};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use std::time::Duration;

const ACCEPT_JSON: &str = "application/json";

/// reqwest-backed transport
pub struct HttpTransport {
    client: reqwest::Client,

    login_name: String,

    /// ⚠️ NEVER log this value
    login_password: String,
}

// Custom Debug implementation that hides the password
impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("login_name", &self.login_name)
            .field("login_password", &"<REDACTED>")
            .finish()
    }
}

impl HttpTransport {
    /// Build a transport for `config`
    ///
    /// Fails with `Error::Config` if the configuration is invalid or the
    /// TLS backend cannot be initialised.
    pub fn new(config: &ServerConfig) -> Result<Self> {
        config.validate()?;

        let mut default_headers = reqwest::header::HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .cookie_store(true)
            .default_headers(default_headers)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        if config.accept_invalid_certs {
            tracing::warn!(
                "Certificate validation disabled for {}",
                config.server_name
            );
        }

        Ok(Self {
            client,
            login_name: config.login_name.clone(),
            login_password: config.login_password.clone(),
        })
    }

    fn method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }

    fn build(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let content_type = request.body.content_type();
        let mut builder = self
            .client
            .request(Self::method(request.method), &request.url)
            .basic_auth(&self.login_name, Some(&self.login_password));

        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }

        match request.body {
            RequestBody::Empty => builder,
            RequestBody::Xml(xml) => builder.body(xml),
            RequestBody::Audio(bytes) => builder.body(bytes),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = request.method;
        let url = request.url.clone();

        let response = self
            .build(request)
            .send()
            .await
            .map_err(|e| Error::transport(format!("{} {} failed: {}", method, url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response body: {}", e)))?;

        tracing::debug!("{} {} -> {}", method, url, status);
        Ok(HttpResponse::new(status, body))
    }

    fn transport_name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ServerConfig {
        ServerConfig::new("cuc.example.com", "admin", "hunter2_secret")
    }

    #[test]
    fn test_builds_from_valid_config() {
        let transport = HttpTransport::new(&config().with_accept_invalid_certs(true));
        assert!(transport.is_ok());
        assert_eq!(transport.unwrap().transport_name(), "reqwest");
    }

    #[test]
    fn test_rejects_invalid_config() {
        let err = HttpTransport::new(&ServerConfig::new("cuc", "admin", "")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_password_not_exposed_in_debug() {
        let transport = HttpTransport::new(&config()).unwrap();
        let debug_str = format!("{:?}", transport);
        assert!(!debug_str.contains("hunter2_secret"));
        assert!(debug_str.contains("<REDACTED>"));
    }

    #[test]
    fn test_request_headers() {
        let transport = HttpTransport::new(&config()).unwrap();
        let request = transport
            .build(HttpRequest::new(
                HttpMethod::Put,
                "https://cuc.example.com:8443/vmrest/tenants/abc",
                RequestBody::Xml("<Tenant><Description>x</Description></Tenant>".to_string()),
            ))
            .build()
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::PUT);
        assert_eq!(
            request.headers().get(CONTENT_TYPE).unwrap(),
            "application/xml"
        );
        let auth = request
            .headers()
            .get(reqwest::header::AUTHORIZATION)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(auth.starts_with("Basic "));
    }

    #[test]
    fn test_get_has_no_content_type() {
        let transport = HttpTransport::new(&config()).unwrap();
        let request = transport
            .build(HttpRequest::get("https://cuc.example.com:8443/vmrest/ports"))
            .build()
            .unwrap();
        assert!(request.headers().get(CONTENT_TYPE).is_none());
        assert!(request.body().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let config = ServerConfig::new("127.0.0.1", "admin", "pw")
            .with_port(1)
            .with_timeout_secs(2);
        let transport = HttpTransport::new(&config).unwrap();

        let err = transport
            .execute(HttpRequest::get(format!("{}phonesystems", config.base_url())))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
