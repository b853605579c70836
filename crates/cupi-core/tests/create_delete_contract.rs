//! Contract Test: Create and Delete
//!
//! Constraints verified:
//! - The created object's id is parsed from the `/vmrest/<collection>/<id>` body
//! - Required fields are validated before any request is sent
//! - Template ids travel as a query parameter, not in the body
//! - Objects the server cannot delete fail locally

mod common;

use common::*;
use cupi_core::resources::{
    AlternateExtension, CallHandler, Greeting, MenuEntry, Port, ScheduleSet, Tenant,
};
use cupi_core::traits::HttpMethod;
use cupi_core::{PropertyList, Resource};

const GUID: &str = "d1b8f2a0-5c6e-4e6b-9a55-1f0c2d3e4f50";

#[tokio::test]
async fn add_returns_new_object_id() {
    let (transport, server) = mock_server();
    transport.respond(201, &format!("/vmrest/tenants/{}", GUID));

    let result = Tenant::add(&server, "acme", "acme.example.com", "Acme Corp", None)
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.returned_object_id, GUID);

    let request = transport.last_request();
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.url, format!("{}tenants", BASE_URL));
    assert_eq!(
        request.body.as_xml(),
        Some(
            "<Tenant><Alias>acme</Alias><SmtpDomain>acme.example.com</SmtpDomain>\
             <Description>Acme Corp</Description></Tenant>"
        )
    );
}

#[tokio::test]
async fn call_handler_template_is_query_parameter() {
    let (transport, server) = mock_server();
    transport.respond(201, &format!("/vmrest/handlers/callhandlers/{}", GUID));

    let extra = PropertyList::new().with("Language", 1033);
    let result = CallHandler::add(&server, "TEMPLATE1", "Sales", "100", Some(&extra))
        .await
        .unwrap();

    assert_eq!(result.returned_object_id, GUID);
    let request = transport.last_request();
    assert_eq!(
        request.url,
        format!("{}handlers/callhandlers?templateObjectId=TEMPLATE1", BASE_URL)
    );
    assert_eq!(
        request.body.as_xml(),
        Some(
            "<Callhandler><DisplayName>Sales</DisplayName><DtmfAccessId>100</DtmfAccessId>\
             <Language>1033</Language></Callhandler>"
        )
    );
}

#[tokio::test]
async fn add_and_fetch_returns_clean_object() {
    let (transport, server) = mock_server();
    transport.respond(201, "/vmrest/handlers/callhandlers/ABC123");
    transport.respond(200, CALL_HANDLER_JSON);

    let handler = CallHandler::add_and_fetch(&server, "TEMPLATE1", "Sales", "100", None)
        .await
        .unwrap();

    assert_eq!(handler.object_id, "ABC123");
    assert!(!handler.has_pending_changes());
    assert_eq!(
        transport.last_request().url,
        format!("{}handlers/callhandlers/ABC123", BASE_URL)
    );
}

#[tokio::test]
async fn missing_required_fields_send_nothing() {
    let (transport, server) = mock_server();

    assert!(CallHandler::add(&server, "", "Sales", "100", None)
        .await
        .unwrap_err()
        .is_caller_error());
    assert!(Tenant::add(&server, "bad alias", "x.com", "d", None)
        .await
        .unwrap_err()
        .is_caller_error());
    assert!(AlternateExtension::add(&server, "USER1", 21, "5551212", None)
        .await
        .unwrap_err()
        .is_caller_error());
    assert!(Port::add(&server, "PG1", 0, None)
        .await
        .unwrap_err()
        .is_caller_error());
    assert!(ScheduleSet::add(&server, "Hours", Some("LOC1"), Some("USER1"), None)
        .await
        .unwrap_err()
        .is_caller_error());

    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn nested_add_uses_parent_collection() {
    let (transport, server) = mock_server();
    transport.respond(201, &format!("/vmrest/users/USER1/alternateextensions/{}", GUID));

    let result = AlternateExtension::add(&server, "USER1", 3, "5551212", None)
        .await
        .unwrap();

    assert_eq!(result.returned_object_id, GUID);
    assert_eq!(
        transport.last_request().url,
        format!("{}users/USER1/alternateextensions", BASE_URL)
    );
}

#[tokio::test]
async fn delete_by_id_and_instance_delete() {
    let (transport, server) = mock_server();
    transport.respond(204, "");
    transport.respond(200, CALL_HANDLER_JSON);
    transport.respond(204, "");

    CallHandler::delete_by_id(&server, "XYZ").await.unwrap();
    assert_eq!(transport.last_request().method, HttpMethod::Delete);
    assert_eq!(
        transport.last_request().url,
        format!("{}handlers/callhandlers/XYZ", BASE_URL)
    );

    let handler = CallHandler::get(&server, "ABC123").await.unwrap();
    handler.delete().await.unwrap();
    assert_eq!(
        transport.last_request().url,
        format!("{}handlers/callhandlers/ABC123", BASE_URL)
    );
    // Local state is untouched by a server-side delete
    assert_eq!(handler.display_name, "Sales");
}

#[tokio::test]
async fn keyed_children_cannot_be_deleted() {
    let (transport, server) = mock_server();
    transport.respond(
        200,
        r#"{"CallHandlerObjectId":"ABC123","TouchtoneKey":"5","Action":"0"}"#,
    );
    let entry = MenuEntry::get(&server, "ABC123", "5").await.unwrap();

    assert!(entry.delete().await.unwrap_err().is_caller_error());
    assert!(Greeting::default().delete().await.unwrap_err().is_caller_error());
    assert_eq!(transport.call_count(), 1);
}
