// # Connection Server
//
// The shared handle every entity is fetched through. Holds the validated
// configuration and the transport, and turns one logical operation (fetch,
// list, create, update, delete, upload) into exactly one request.
//
// ## Status handling
//
// - 2xx → `Ok(WebCallResult)`
// - anything else → `Err(Error::Http(result))` with the flat result attached
// - no response at all → whatever the transport returned (`Error::Transport`)
//
// Nothing is retried.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::changes::{PropertyList, xml_element};
use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::query::{ListQuery, QueryClause, append_params, extract_object_id};
use crate::result::WebCallResult;
use crate::traits::{HttpMethod, HttpRequest, RequestBody, Resource, Transport};
use crate::wire;

/// Shared handle to one Connection server
///
/// Cheap to clone; every clone talks through the same transport.
#[derive(Clone)]
pub struct ConnectionServer {
    inner: Arc<ServerInner>,
}

struct ServerInner {
    config: ServerConfig,
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for ConnectionServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionServer")
            .field("base_url", &self.inner.base_url)
            .field("login_name", &self.inner.config.login_name)
            .field("transport", &self.inner.transport.transport_name())
            .finish()
    }
}

impl fmt::Display for ConnectionServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}",
            self.inner.config.login_name, self.inner.config.server_name
        )
    }
}

impl ConnectionServer {
    /// Create a handle after validating `config`
    pub fn new(config: ServerConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let base_url = config.base_url();
        tracing::debug!(
            "Connection server handle created for {} via {}",
            base_url,
            transport.transport_name()
        );
        Ok(Self {
            inner: Arc::new(ServerInner {
                config,
                base_url,
                transport,
            }),
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// `https://{server}:{port}/vmrest/`
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Absolute URL for a path relative to the base
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path.trim_start_matches('/'))
    }

    /// Page size for list calls of `T`
    pub fn rows_per_page<T: Resource>(&self) -> u32 {
        self.inner
            .config
            .rows_per_page
            .unwrap_or(T::DEFAULT_ROWS_PER_PAGE)
    }

    /// Send one request and classify the answer
    pub async fn send(
        &self,
        method: HttpMethod,
        url: String,
        body: RequestBody,
    ) -> Result<WebCallResult> {
        tracing::debug!("{} {}", method, url);

        let mut result = WebCallResult::new(method, url.clone());
        let response = match self
            .inner
            .transport
            .execute(HttpRequest::new(method, url, body))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("{} {} failed before a response: {}", method, result.url, e);
                return Err(e);
            }
        };

        result.status_code = response.status;
        result.success = response.is_success();
        result.response_text = response.body;

        if !result.success {
            result.error_text = describe_failure(result.status_code, &result.response_text);
            tracing::warn!(
                "{} {} failed: {} - {}",
                method,
                result.url,
                result.status_code,
                result.error_text
            );
            return Err(Error::http(result));
        }

        Ok(result)
    }

    /// GET one object
    pub async fn get_object<T: Resource>(&self, path: &str) -> Result<T> {
        let result = self
            .send(HttpMethod::Get, self.url(path), RequestBody::Empty)
            .await?;
        let mut object: T = wire::parse_object(&result.response_text)?;
        object.state_mut().attach(self);
        Ok(object)
    }

    /// GET a page of objects. Zero matches is an empty vec, not an error.
    pub async fn get_objects<T: Resource>(
        &self,
        collection: &str,
        query: &ListQuery,
    ) -> Result<Vec<T>> {
        let (items, _) = self.get_page(collection, query).await?;
        Ok(items)
    }

    /// Like [`get_objects`](Self::get_objects), also returning the call
    /// result with `total_object_count` set from the server's `@total`
    pub async fn get_page<T: Resource>(
        &self,
        collection: &str,
        query: &ListQuery,
    ) -> Result<(Vec<T>, WebCallResult)> {
        let url = query.to_url(self.base_url(), collection, self.rows_per_page::<T>());
        let mut result = self
            .send(HttpMethod::Get, url, RequestBody::Empty)
            .await?;
        let (mut items, total) = wire::parse_list::<T>(&result.response_text, T::ELEMENT)?;
        tracing::debug!(
            "Fetched {} of {} {} object(s)",
            items.len(),
            total,
            T::ELEMENT
        );
        for item in &mut items {
            item.state_mut().attach(self);
        }
        result.total_object_count = total;
        Ok((items, result))
    }

    /// First object in `collection` whose `field` equals `value`
    pub async fn find_object<T: Resource>(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<T> {
        require(value, field)?;
        let query = ListQuery::new().where_is(field, value);
        self.get_objects::<T>(collection, &query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::not_found(format!("{} with {} = {}", T::ELEMENT, field, value))
            })
    }

    /// POST a new object; `returned_object_id` is parsed from the response
    pub async fn create_object(
        &self,
        collection: &str,
        params: &[QueryClause],
        element: &str,
        properties: &PropertyList,
    ) -> Result<WebCallResult> {
        let params: Vec<String> = params.iter().map(QueryClause::encoded).collect();
        let url = append_params(&self.url(collection), &params);
        let body = RequestBody::Xml(properties.to_xml_body(element));

        let mut result = self.send(HttpMethod::Post, url, body).await?;
        result.returned_object_id = extract_object_id(&result.response_text, collection);
        tracing::info!("Created {} {}", element, result.returned_object_id);
        Ok(result)
    }

    /// PUT the given changes. An empty list is a caller error.
    pub async fn update_object(
        &self,
        path: &str,
        element: &str,
        properties: &PropertyList,
    ) -> Result<WebCallResult> {
        if properties.is_empty() {
            return Err(Error::invalid_input(format!(
                "No pending changes to send for {}",
                element
            )));
        }
        let body = RequestBody::Xml(properties.to_xml_body(element));
        self.send(HttpMethod::Put, self.url(path), body).await
    }

    /// DELETE one object
    pub async fn delete_object(&self, path: &str) -> Result<WebCallResult> {
        let result = self
            .send(HttpMethod::Delete, self.url(path), RequestBody::Empty)
            .await?;
        tracing::info!("Deleted {}", path);
        Ok(result)
    }

    /// PUT a local WAV file to an audio endpoint
    pub async fn upload_wav(&self, path: &str, file: &Path) -> Result<WebCallResult> {
        let bytes = match tokio::fs::read(file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::invalid_input(format!(
                    "Audio file not found: {}",
                    file.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };
        if !is_wav(&bytes) {
            return Err(Error::invalid_input(format!(
                "Not a RIFF/WAVE file: {}",
                file.display()
            )));
        }

        tracing::debug!("Uploading {} ({} bytes)", file.display(), bytes.len());
        self.send(HttpMethod::Put, self.url(path), RequestBody::Audio(bytes))
            .await
    }

    /// Point an audio endpoint at a stream already recorded on the server
    pub async fn set_audio_from_stream(
        &self,
        path: &str,
        stream_id: &str,
    ) -> Result<WebCallResult> {
        require(stream_id, "stream id")?;
        let body = RequestBody::Xml(call_control_body(stream_id));
        self.send(HttpMethod::Put, self.url(path), body).await
    }
}

/// Fail with a caller error when a required argument is blank
pub(crate) fn require(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_input(format!("{} is required", what)));
    }
    Ok(())
}

/// Fixed parameter set that tells the server to use a recorded stream
fn call_control_body(stream_id: &str) -> String {
    let fields = [
        xml_element("op", "RECORD"),
        xml_element("resourceType", "STREAM"),
        xml_element("resourceId", stream_id),
        xml_element("lastResult", "0"),
        xml_element("speed", "100"),
        xml_element("volume", "100"),
        xml_element("startPosition", "0"),
    ];
    format!("<CallControl>{}</CallControl>", fields.concat())
}

fn is_wav(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

/// Human-readable failure text for a non-success response
fn describe_failure(status: u16, body: &str) -> String {
    let detail = server_message(body).unwrap_or_else(|| body.trim().to_string());
    let summary = match status {
        400 => "Bad request",
        401 => "Authentication failed: invalid credentials",
        403 => "Permission denied",
        404 => "Not found",
        405 => "Method not allowed",
        409 => "Conflict",
        500..=599 => "Server error",
        _ => "Request failed",
    };
    if detail.is_empty() {
        summary.to_string()
    } else {
        format!("{}: {}", summary, detail)
    }
}

/// The server wraps failures as `{"errors":{"code":"...","message":"..."}}`
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body.trim()).ok()?;
    let errors = value.get("errors")?;
    let errors = match errors {
        serde_json::Value::Array(items) => items.first()?,
        other => other,
    };
    let message = errors.get("message")?.as_str()?;
    match errors.get("code").and_then(|c| c.as_str()) {
        Some(code) => Some(format!("{} ({})", message, code)),
        None => Some(message.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_control_body() {
        assert_eq!(
            call_control_body("abc-123"),
            "<CallControl><op>RECORD</op><resourceType>STREAM</resourceType>\
             <resourceId>abc-123</resourceId><lastResult>0</lastResult><speed>100</speed>\
             <volume>100</volume><startPosition>0</startPosition></CallControl>"
        );
    }

    #[test]
    fn test_describe_failure_uses_server_message() {
        let body = r#"{"errors":{"code":"DATA_EXCEPTION","message":"DtmfAccessId already in use"}}"#;
        assert_eq!(
            describe_failure(400, body),
            "Bad request: DtmfAccessId already in use (DATA_EXCEPTION)"
        );
        assert_eq!(describe_failure(404, ""), "Not found");
        assert_eq!(describe_failure(502, "gateway"), "Server error: gateway");
    }

    #[test]
    fn test_is_wav() {
        assert!(is_wav(b"RIFF\x24\x00\x00\x00WAVEfmt "));
        assert!(!is_wav(b"ID3\x03\x00\x00\x00\x00\x00\x00\x00\x00"));
        assert!(!is_wav(b"RIFF"));
    }

    #[test]
    fn test_require() {
        assert!(require("abc", "id").is_ok());
        assert!(require("  ", "id").unwrap_err().is_caller_error());
    }
}
