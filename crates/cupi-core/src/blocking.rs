// # Blocking Facade
//
// Synchronous entry point over the async API. A `BlockingServer` owns a
// current-thread tokio runtime and drives each operation to completion on
// the calling thread, so every call blocks until its single request has
// been answered and parsed.
//
// ## Usage
//
// ```ignore
// let server = BlockingServer::new(config, Arc::new(transport))?;
// let mut handler = server.block_on(CallHandler::get(server.server(), id))?;
// handler.set_display_name("Sales");
// server.update(&mut handler)?;
// ```
//
// ## Constraints
//
// - Must not be called from inside an async runtime; tokio panics when
//   `block_on` is nested. Async callers use `ConnectionServer` directly.
// - Nothing is spawned; the runtime is idle between calls.

use crate::config::ServerConfig;
use crate::error::Result;
use crate::query::ListQuery;
use crate::result::WebCallResult;
use crate::server::ConnectionServer;
use crate::traits::{Resource, Transport};
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// A [`ConnectionServer`] whose operations block the calling thread
pub struct BlockingServer {
    server: ConnectionServer,
    runtime: Runtime,
}

impl std::fmt::Debug for BlockingServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingServer")
            .field("base_url", &self.server.base_url())
            .finish()
    }
}

impl BlockingServer {
    /// Validate `config` and build a blocking handle around `transport`
    pub fn new(config: ServerConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Self::from_server(ConnectionServer::new(config, transport)?)
    }

    /// Wrap an existing handle. Fails with `Error::Io` if the runtime
    /// cannot be created.
    pub fn from_server(server: ConnectionServer) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self { server, runtime })
    }

    /// The async handle, for building the futures passed to [`block_on`](Self::block_on)
    pub fn server(&self) -> &ConnectionServer {
        &self.server
    }

    /// Run any operation of the async API to completion
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn get_object<T: Resource>(&self, path: &str) -> Result<T> {
        self.block_on(self.server.get_object(path))
    }

    /// One page of `collection`; zero matches is an empty vec
    pub fn get_objects<T: Resource>(&self, collection: &str, query: &ListQuery) -> Result<Vec<T>> {
        self.block_on(self.server.get_objects(collection, query))
    }

    /// Send the pending changes of `object`; clears them on success
    pub fn update<T: Resource>(&self, object: &mut T) -> Result<WebCallResult> {
        self.block_on(object.update())
    }

    pub fn delete<T: Resource>(&self, object: &T) -> Result<WebCallResult> {
        self.block_on(object.delete())
    }

    /// Reload `object` from the server, discarding pending changes
    pub fn refetch<T: Resource>(&self, object: &mut T) -> Result<()> {
        self.block_on(object.refetch())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::traits::{HttpRequest, HttpResponse};

    struct FixedTransport(u16, &'static str);

    #[async_trait::async_trait]
    impl Transport for FixedTransport {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse> {
            Ok(HttpResponse::new(self.0, self.1))
        }

        fn transport_name(&self) -> &'static str {
            "fixed"
        }
    }

    fn blocking(status: u16, body: &'static str) -> BlockingServer {
        let config = ServerConfig::new("cuc.example.com", "admin", "secret");
        BlockingServer::new(config, Arc::new(FixedTransport(status, body))).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ServerConfig::new("cuc.example.com", "admin", "");
        let err = BlockingServer::new(config, Arc::new(FixedTransport(200, "{}"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_send_blocks_until_answered() {
        let server = blocking(204, "");
        let result = server
            .block_on(server.server().delete_object("tenants/abc"))
            .unwrap();
        assert!(result.success);
        assert_eq!(result.status_code, 204);
    }

    #[test]
    fn test_debug_shows_base_url() {
        let server = blocking(200, "{}");
        let debug_str = format!("{:?}", server);
        assert!(debug_str.contains("https://cuc.example.com:8443/vmrest/"));
        assert!(!debug_str.contains("secret"));
    }
}
