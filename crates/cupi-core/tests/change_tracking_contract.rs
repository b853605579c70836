//! Contract Test: Change Tracking
//!
//! Verifies that only explicitly changed fields are sent and that the
//! change list is empty whenever the object mirrors the server.
//!
//! Constraints verified:
//! - An object fresh from the server has no pending changes
//! - `update()` with no pending changes fails without a request
//! - A successful `update()` clears the change list
//! - A failed `update()` keeps the change list
//! - The update body holds exactly the changed fields

mod common;

use common::*;
use cupi_core::resources::{CallHandler, GreetingType, TransferOptionType};
use cupi_core::traits::{HttpMethod, RequestBody};
use cupi_core::{PropertyList, Resource};

#[tokio::test]
async fn fetched_object_is_clean() {
    let (transport, server) = mock_server();
    transport.respond(200, CALL_HANDLER_JSON);

    let handler = CallHandler::get(&server, "ABC123").await.unwrap();

    assert_eq!(handler.display_name, "Sales");
    assert_eq!(handler.dtmf_access_id, "100");
    assert!(!handler.has_pending_changes());
    assert_eq!(handler.to_string(), "Sales x100");

    let request = transport.last_request();
    assert_eq!(request.method, HttpMethod::Get);
    assert_eq!(request.url, format!("{}handlers/callhandlers/ABC123", BASE_URL));
}

#[tokio::test]
async fn update_without_changes_sends_nothing() {
    let (transport, server) = mock_server();
    transport.respond(200, CALL_HANDLER_JSON);
    let mut handler = CallHandler::get(&server, "ABC123").await.unwrap();

    let err = handler.update().await.unwrap_err();

    assert!(err.is_caller_error());
    assert_eq!(transport.call_count(), 1, "only the initial fetch was sent");
}

#[tokio::test]
async fn update_sends_exactly_the_changed_field() {
    let (transport, server) = mock_server();
    transport.respond(200, CALL_HANDLER_JSON);
    transport.respond(204, "");
    let mut handler = CallHandler::get(&server, "ABC123").await.unwrap();

    handler.set_display_name("Sales & Support");
    let result = handler.update().await.unwrap();

    assert!(result.success);
    assert_eq!(result.status_code, 204);
    assert!(!handler.has_pending_changes());

    let request = transport.last_request();
    assert_eq!(request.method, HttpMethod::Put);
    assert_eq!(request.url, format!("{}handlers/callhandlers/ABC123", BASE_URL));
    assert_eq!(
        request.body,
        RequestBody::Xml(
            "<Callhandler><DisplayName>Sales &amp; Support</DisplayName></Callhandler>".to_string()
        )
    );
}

#[tokio::test]
async fn failed_update_keeps_changes() {
    let (transport, server) = mock_server();
    transport.respond(200, CALL_HANDLER_JSON);
    transport.respond(
        400,
        r#"{"errors":{"code":"DATA_EXCEPTION","message":"DtmfAccessId already in use"}}"#,
    );
    let mut handler = CallHandler::get(&server, "ABC123").await.unwrap();

    handler.set_dtmf_access_id("200");
    let err = handler.update().await.unwrap_err();

    let call = err.web_call().expect("server answered");
    assert_eq!(call.status_code, 400);
    assert!(call.error_text.contains("DtmfAccessId already in use"));
    assert!(handler.has_pending_changes());
}

#[tokio::test]
async fn refetch_discards_pending_changes() {
    let (transport, server) = mock_server();
    transport.respond(200, CALL_HANDLER_JSON);
    transport.respond(200, CALL_HANDLER_JSON);
    let mut handler = CallHandler::get(&server, "ABC123").await.unwrap();

    handler.set_display_name("Changed locally");
    handler.refetch().await.unwrap();

    assert_eq!(handler.display_name, "Sales");
    assert!(!handler.has_pending_changes());
}

#[tokio::test]
async fn update_by_id_with_empty_list_sends_nothing() {
    let (transport, server) = mock_server();

    let err = CallHandler::update_by_id(&server, "ABC123", &PropertyList::new())
        .await
        .unwrap_err();

    assert!(err.is_caller_error());
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn keyed_child_update_uses_encoded_key() {
    let (transport, server) = mock_server();
    transport.respond(
        200,
        r#"{"CallHandlerObjectId":"ABC123","TransferOptionType":"Off Hours","Action":"0"}"#,
    );
    transport.respond(204, "");

    let mut option = cupi_core::resources::TransferOption::get(
        &server,
        "ABC123",
        TransferOptionType::OffHours,
    )
    .await
    .unwrap();
    option.disable().unwrap();
    option.update().await.unwrap();

    let request = transport.last_request();
    assert_eq!(
        request.url,
        format!("{}handlers/callhandlers/ABC123/transferoptions/Off%20Hours", BASE_URL)
    );
    assert_eq!(
        request.body.as_xml(),
        Some("<TransferOption><TimeExpires>1972-01-01 00:00:00</TimeExpires></TransferOption>")
    );
}

#[tokio::test]
async fn greeting_update_by_key() {
    let (transport, server) = mock_server();
    transport.respond(204, "");

    let props = PropertyList::new().with("PlayWhat", 1);
    cupi_core::resources::Greeting::update_by_key(&server, "ABC123", GreetingType::Alternate, &props)
        .await
        .unwrap();

    let request = transport.last_request();
    assert_eq!(
        request.url,
        format!("{}handlers/callhandlers/ABC123/greetings/Alternate", BASE_URL)
    );
    assert_eq!(
        request.body.as_xml(),
        Some("<Greeting><PlayWhat>1</PlayWhat></Greeting>")
    );
}
