//! Contract Test: Blocking Calls
//!
//! Verifies that the synchronous facade gives plain callers the same
//! one-request-per-operation behaviour as the async API.
//!
//! Constraints verified:
//! - Fetch, update, refetch and delete each return once their request is answered
//! - A fetched object is clean and an update sends only the changed field
//! - `update()` with no pending changes fails without a request
//! - An empty list is `Ok(vec![])`
//! - Transport failures surface as errors

mod common;

use common::*;
use cupi_core::resources::CallHandler;
use cupi_core::traits::{HttpMethod, RequestBody, Transport};
use cupi_core::{BlockingServer, Error, ListQuery, Resource};
use std::sync::Arc;

fn blocking_server() -> (Arc<MockTransport>, BlockingServer) {
    let transport = Arc::new(MockTransport::new());
    let shared: Arc<dyn Transport> = transport.clone();
    let server = BlockingServer::new(test_config(), shared).unwrap();
    (transport, server)
}

#[test]
fn fetch_and_update_block_until_answered() {
    let (transport, server) = blocking_server();
    transport.respond(200, CALL_HANDLER_JSON);
    transport.respond(204, "");

    let mut handler: CallHandler = server
        .get_object("handlers/callhandlers/ABC123")
        .unwrap();
    assert_eq!(handler.display_name, "Sales");
    assert!(!handler.has_pending_changes());

    handler.set_display_name("Support");
    let result = server.update(&mut handler).unwrap();

    assert!(result.success);
    assert!(!handler.has_pending_changes());
    assert_eq!(transport.call_count(), 2);

    let request = transport.last_request();
    assert_eq!(request.method, HttpMethod::Put);
    assert_eq!(request.url, format!("{}handlers/callhandlers/ABC123", BASE_URL));
    assert_eq!(
        request.body,
        RequestBody::Xml("<Callhandler><DisplayName>Support</DisplayName></Callhandler>".to_string())
    );
}

#[test]
fn resource_operations_run_through_block_on() {
    let (transport, server) = blocking_server();
    transport.respond(200, CALL_HANDLER_JSON);

    let handler = server
        .block_on(CallHandler::get(server.server(), "ABC123"))
        .unwrap();

    assert_eq!(handler.dtmf_access_id, "100");
    assert_eq!(transport.call_count(), 1);
}

#[test]
fn update_without_changes_sends_nothing() {
    let (transport, server) = blocking_server();
    transport.respond(200, CALL_HANDLER_JSON);
    let mut handler: CallHandler = server
        .get_object("handlers/callhandlers/ABC123")
        .unwrap();

    let err = server.update(&mut handler).unwrap_err();

    assert!(err.is_caller_error());
    assert_eq!(transport.call_count(), 1);
}

#[test]
fn refetch_discards_pending_changes() {
    let (transport, server) = blocking_server();
    transport.respond(200, CALL_HANDLER_JSON);
    transport.respond(200, CALL_HANDLER_JSON);
    let mut handler: CallHandler = server
        .get_object("handlers/callhandlers/ABC123")
        .unwrap();

    handler.set_display_name("Support");
    server.refetch(&mut handler).unwrap();

    assert_eq!(handler.display_name, "Sales");
    assert!(!handler.has_pending_changes());
}

#[test]
fn delete_sends_one_request() {
    let (transport, server) = blocking_server();
    transport.respond(200, CALL_HANDLER_JSON);
    transport.respond(204, "");
    let handler: CallHandler = server
        .get_object("handlers/callhandlers/ABC123")
        .unwrap();

    let result = server.delete(&handler).unwrap();

    assert!(result.success);
    let request = transport.last_request();
    assert_eq!(request.method, HttpMethod::Delete);
    assert_eq!(request.url, format!("{}handlers/callhandlers/ABC123", BASE_URL));
}

#[test]
fn empty_list_is_not_an_error() {
    let (transport, server) = blocking_server();
    transport.respond(200, r#"{"@total":"0"}"#);

    let handlers: Vec<CallHandler> = server
        .get_objects("handlers/callhandlers", &ListQuery::new())
        .unwrap();

    assert!(handlers.is_empty());
}

#[test]
fn transport_failure_is_an_error() {
    let transport = Arc::new(MockTransport::failing("connection refused"));
    let shared: Arc<dyn Transport> = transport.clone();
    let server = BlockingServer::new(test_config(), shared).unwrap();

    let err = server
        .get_object::<CallHandler>("handlers/callhandlers/ABC123")
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
}
