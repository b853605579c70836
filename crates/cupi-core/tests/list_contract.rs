//! Contract Test: Listing and Lookup
//!
//! Verifies URL construction for list calls and the empty-result policy.
//!
//! Constraints verified:
//! - No clauses and default paging give exactly `pageNumber=1&rowsPerPage=<default>`
//! - Zero matches is `Ok(vec![])` for every list call
//! - A transport failure is an error, never an empty list
//! - A single match returned as a bare object is still one row
//! - A name lookup that matches nothing is `NotFound`

mod common;

use common::*;
use cupi_core::resources::{CallHandler, PhoneSystem, Tenant};
use cupi_core::{ConnectionServer, Error, ListQuery, Resource, SortOrder};
use std::sync::Arc;

#[tokio::test]
async fn default_paging_url() {
    let (transport, server) = mock_server();
    transport.respond(200, r#"{"@total":"0"}"#);

    CallHandler::list(&server, &ListQuery::new()).await.unwrap();

    assert_eq!(
        transport.last_request().url,
        format!("{}handlers/callhandlers?pageNumber=1&rowsPerPage=20", BASE_URL)
    );
}

#[tokio::test]
async fn resource_default_page_size_applies() {
    let (transport, server) = mock_server();
    transport.respond(200, r#"{"@total":"0"}"#);

    PhoneSystem::list(&server, &ListQuery::new()).await.unwrap();

    assert_eq!(
        transport.last_request().url,
        format!("{}phonesystems?pageNumber=1&rowsPerPage=100", BASE_URL)
    );
}

#[tokio::test]
async fn config_page_size_overrides_resource_default() {
    let transport = Arc::new(MockTransport::new());
    transport.respond(200, r#"{"@total":"0"}"#);
    let shared: Arc<dyn cupi_core::Transport> = transport.clone();
    let server =
        ConnectionServer::new(test_config().with_rows_per_page(50), shared).unwrap();

    CallHandler::list(&server, &ListQuery::new()).await.unwrap();

    assert!(transport.last_request().url.ends_with("pageNumber=1&rowsPerPage=50"));
}

#[tokio::test]
async fn filters_and_sorting_come_before_paging() {
    let (transport, server) = mock_server();
    transport.respond(200, r#"{"@total":"0"}"#);

    let query = ListQuery::new()
        .where_is("DtmfAccessId", "100")
        .sort("DisplayName", SortOrder::Asc)
        .page(3)
        .rows(10);
    CallHandler::list(&server, &query).await.unwrap();

    assert_eq!(
        transport.last_request().url,
        format!(
            "{}handlers/callhandlers?query=%28DtmfAccessId%20is%20100%29\
             &sort=%28DisplayName%20asc%29&pageNumber=3&rowsPerPage=10",
            BASE_URL
        )
    );
}

#[tokio::test]
async fn zero_matches_is_empty_ok() {
    let (transport, server) = mock_server();
    transport.respond(200, r#"{"@total":"0"}"#);
    transport.respond(200, "");

    let handlers = CallHandler::list(&server, &ListQuery::new()).await.unwrap();
    assert!(handlers.is_empty());

    let tenants = Tenant::list(&server, &ListQuery::new()).await.unwrap();
    assert!(tenants.is_empty());
}

#[tokio::test]
async fn transport_failure_is_error() {
    let transport = Arc::new(MockTransport::failing("connection refused"));
    let server = server_with(&transport);

    let err = CallHandler::list(&server, &ListQuery::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn server_error_is_error() {
    let (transport, server) = mock_server();
    transport.respond(500, "Internal Server Error");

    let err = CallHandler::list(&server, &ListQuery::new())
        .await
        .unwrap_err();

    let call = err.web_call().expect("server answered");
    assert_eq!(call.status_code, 500);
    assert!(!call.success);
}

#[tokio::test]
async fn single_row_object_shape() {
    let (transport, server) = mock_server();
    transport.respond(
        200,
        &format!(r#"{{"@total":"1","Callhandler":{}}}"#, CALL_HANDLER_JSON),
    );

    let handlers = CallHandler::list(&server, &ListQuery::new()).await.unwrap();

    assert_eq!(handlers.len(), 1);
    assert_eq!(handlers[0].object_id, "ABC123");
    assert!(!handlers[0].has_pending_changes());
    assert!(handlers[0].server().is_ok(), "listed objects are bound");
}

#[tokio::test]
async fn page_reports_total() {
    let (transport, server) = mock_server();
    transport.respond(
        200,
        r#"{"@total":"42","PhoneSystem":[{"ObjectId":"a","DisplayName":"PhoneSystem"},
                                          {"ObjectId":"b","DisplayName":"Lab"}]}"#,
    );

    let (systems, result) = server
        .get_page::<PhoneSystem>("phonesystems", &ListQuery::new().rows(2))
        .await
        .unwrap();

    assert_eq!(systems.len(), 2);
    assert_eq!(result.total_object_count, 42);
}

#[tokio::test]
async fn name_lookup_without_match_is_not_found() {
    let (transport, server) = mock_server();
    transport.respond(200, r#"{"@total":"0"}"#);

    let err = CallHandler::get_by_name(&server, "Nobody").await.unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert!(err.is_not_found());
    assert!(
        transport
            .last_request()
            .url
            .contains("query=%28DisplayName%20is%20Nobody%29")
    );
}

#[tokio::test]
async fn constructor_fetches_by_name_when_no_id() {
    let (transport, server) = mock_server();
    transport.respond(
        200,
        &format!(r#"{{"@total":"1","Callhandler":[{}]}}"#, CALL_HANDLER_JSON),
    );

    let handler = CallHandler::new(&server, None, Some("Sales")).await.unwrap();

    assert_eq!(handler.object_id, "ABC123");
}

#[tokio::test]
async fn constructor_without_id_or_name_is_empty() {
    let (transport, server) = mock_server();

    let handler = CallHandler::new(&server, None, Some("  ")).await.unwrap();

    assert!(handler.object_id.is_empty());
    assert!(handler.server().is_ok());
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn missing_object_is_404() {
    let (transport, server) = mock_server();
    transport.respond(404, "");

    let err = CallHandler::get(&server, "missing").await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.web_call().map(|c| c.error_text.as_str()), Some("Not found"));
}
