//! Connection configuration
//!
//! Values usually come from the CLI flags / `CUPI_*` environment variables,
//! or from a serialized config file.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Path prefix of every provisioning endpoint
pub const VMREST_PREFIX: &str = "/vmrest/";

/// Settings needed to reach one Connection server
#[derive(Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host name or IP address of the server
    pub server_name: String,

    /// HTTPS port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Administrator login
    pub login_name: String,

    /// Administrator password
    /// ⚠️ NEVER log this value
    pub login_password: String,

    /// Per-request timeout (in seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Accept self-signed certificates
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// Overrides every resource's default page size when set
    #[serde(default)]
    pub rows_per_page: Option<u32>,
}

// Custom Debug implementation that hides the password
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("server_name", &self.server_name)
            .field("port", &self.port)
            .field("login_name", &self.login_name)
            .field("login_password", &"<REDACTED>")
            .field("timeout_secs", &self.timeout_secs)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("rows_per_page", &self.rows_per_page)
            .finish()
    }
}

impl ServerConfig {
    /// Create a configuration with default port and timeout
    pub fn new(
        server_name: impl Into<String>,
        login_name: impl Into<String>,
        login_password: impl Into<String>,
    ) -> Self {
        Self {
            server_name: server_name.into(),
            port: default_port(),
            login_name: login_name.into(),
            login_password: login_password.into(),
            timeout_secs: default_timeout_secs(),
            accept_invalid_certs: false,
            rows_per_page: None,
        }
    }

    /// Set the HTTPS port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Accept or reject self-signed certificates
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Force a page size for every list call
    pub fn with_rows_per_page(mut self, rows: u32) -> Self {
        self.rows_per_page = Some(rows);
        self
    }

    /// Base URL of the provisioning API, always ending in `/`
    pub fn base_url(&self) -> String {
        format!("https://{}:{}{}", self.server_name, self.port, VMREST_PREFIX)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.server_name.trim().is_empty() {
            return Err(crate::Error::config("Server name cannot be empty"));
        }
        if self.server_name.contains('/') || self.server_name.contains(' ') {
            return Err(crate::Error::config(format!(
                "Server name must be a bare host name or address: {}",
                self.server_name
            )));
        }
        if self.port == 0 {
            return Err(crate::Error::config("Port must be > 0"));
        }
        if self.login_name.is_empty() {
            return Err(crate::Error::config("Login name cannot be empty"));
        }
        if self.login_password.is_empty() {
            return Err(crate::Error::config("Login password cannot be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Timeout must be > 0"));
        }
        if self.rows_per_page == Some(0) {
            return Err(crate::Error::config("Rows per page must be > 0"));
        }
        Ok(())
    }
}

fn default_port() -> u16 {
    8443
}

fn default_timeout_secs() -> u64 {
    30
}
