//! Test doubles and common utilities for contract tests
//!
//! `MockTransport` records every request and answers from a queue of
//! canned responses, so tests can assert exactly what went over the wire.

#![allow(dead_code)]

use cupi_core::error::{Error, Result};
use cupi_core::traits::{HttpRequest, HttpResponse, Transport};
use cupi_core::{ConnectionServer, ServerConfig};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const BASE_URL: &str = "https://cuc.example.com:8443/vmrest/";

/// A transport that replays queued responses and records requests
pub struct MockTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
    call_count: AtomicUsize,
    /// When set, every call fails as if the network were down
    fail_with: Option<String>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
            fail_with: None,
        }
    }

    /// A transport whose every call fails before a response
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new()
        }
    }

    /// Queue a response for the next call
    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(HttpResponse::new(status, body));
        self
    }

    /// Number of requests sent so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Copies of every request sent so far
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request
    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("at least one request was sent")
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);

        if let Some(message) = &self.fail_with {
            return Err(Error::transport(message.clone()));
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::transport("no response queued"))
    }

    fn transport_name(&self) -> &'static str {
        "mock"
    }
}

/// Config pointing at a fake server
pub fn test_config() -> ServerConfig {
    ServerConfig::new("cuc.example.com", "admin", "secret")
}

/// A server handle backed by `transport`
pub fn server_with(transport: &Arc<MockTransport>) -> ConnectionServer {
    let shared: Arc<dyn Transport> = transport.clone();
    ConnectionServer::new(test_config(), shared).expect("test config is valid")
}

/// A fresh mock and a server handle using it
pub fn mock_server() -> (Arc<MockTransport>, ConnectionServer) {
    let transport = Arc::new(MockTransport::new());
    let server = server_with(&transport);
    (transport, server)
}

/// Call handler fixture used across tests
pub const CALL_HANDLER_JSON: &str = r#"{
    "URI": "/vmrest/handlers/callhandlers/ABC123",
    "ObjectId": "ABC123",
    "DisplayName": "Sales",
    "DtmfAccessId": "100",
    "IsPrimary": "false",
    "Language": "1033",
    "ScheduleSetObjectId": "SCHED1",
    "MaxMsgLen": "300",
    "AfterMessageAction": "2",
    "EditMsg": "true"
}"#;

/// Minimal valid WAV header followed by a few bytes of silence
pub fn wav_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&[0u8; 32]);
    bytes
}
