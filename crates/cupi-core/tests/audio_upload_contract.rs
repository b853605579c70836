//! Contract Test: Audio Uploads
//!
//! Constraints verified:
//! - A WAV file is sent as-is in one PUT with an audio body
//! - Files that are missing or not RIFF/WAVE fail before any request
//! - Pointing at a recorded stream sends the CallControl body

mod common;

use common::*;
use cupi_core::resources::{CallHandler, DirectoryHandler, GreetingType};
use cupi_core::traits::{HttpMethod, RequestBody};
use std::io::Write;

#[tokio::test]
async fn voice_name_upload_sends_wav_bytes() {
    let (transport, server) = mock_server();
    transport.respond(200, CALL_HANDLER_JSON);
    transport.respond(204, "");
    let handler = CallHandler::get(&server, "ABC123").await.unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&wav_bytes()).unwrap();

    handler.upload_voice_name(file.path()).await.unwrap();

    let request = transport.last_request();
    assert_eq!(request.method, HttpMethod::Put);
    assert_eq!(
        request.url,
        format!("{}handlers/callhandlers/ABC123/voicename", BASE_URL)
    );
    assert_eq!(request.body, RequestBody::Audio(wav_bytes()));
    assert_eq!(request.body.content_type(), Some("audio/wav"));
}

#[tokio::test]
async fn non_wav_file_is_rejected_locally() {
    let (transport, server) = mock_server();
    transport.respond(200, CALL_HANDLER_JSON);
    let handler = CallHandler::get(&server, "ABC123").await.unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"ID3\x03\x00\x00\x00\x00\x00\x00mp3 data").unwrap();

    let err = handler.upload_voice_name(file.path()).await.unwrap_err();
    assert!(err.is_caller_error());

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.wav");
    let err = handler.upload_voice_name(&missing).await.unwrap_err();
    assert!(err.is_caller_error());

    assert_eq!(transport.call_count(), 1, "only the handler fetch was sent");
}

#[tokio::test]
async fn greeting_recording_per_language() {
    let (transport, server) = mock_server();
    transport.respond(
        200,
        r#"{"CallHandlerObjectId":"ABC123","GreetingType":"Alternate","PlayWhat":"1"}"#,
    );
    transport.respond(204, "");
    let greeting = cupi_core::resources::Greeting::get(&server, "ABC123", GreetingType::Alternate)
        .await
        .unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&wav_bytes()).unwrap();
    greeting.upload_wav(1033, file.path()).await.unwrap();

    assert_eq!(
        transport.last_request().url,
        format!(
            "{}handlers/callhandlers/ABC123/greetings/Alternate/greetingstreamfiles/1033/audio",
            BASE_URL
        )
    );
}

#[tokio::test]
async fn set_voice_name_from_stream() {
    let (transport, server) = mock_server();
    transport.respond(
        200,
        r#"{"ObjectId":"DH1","DisplayName":"Company Directory","DtmfAccessId":"411"}"#,
    );
    transport.respond(204, "");
    let handler = DirectoryHandler::get(&server, "DH1").await.unwrap();

    handler.set_voice_name_from_stream("stream-77").await.unwrap();

    let request = transport.last_request();
    assert_eq!(
        request.url,
        format!("{}handlers/directoryhandlers/DH1/voicename", BASE_URL)
    );
    let body = request.body.as_xml().unwrap();
    assert!(body.starts_with("<CallControl><op>RECORD</op>"));
    assert!(body.contains("<resourceId>stream-77</resourceId>"));
}
