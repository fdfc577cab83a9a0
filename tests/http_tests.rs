//! HTTP tests against a WireMock server.
//!
//! The manager uses a blocking client, so every call runs on a blocking
//! thread while the mock server runs on the test runtime.

use std::time::Duration;

use tgcore::{Configuration, Error, InputFile, Manager, ReturnFormat, Target};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Configuration {
    let mut config = Configuration::new("123:ABC");
    config.set_base_url(format!("{}/bot", server.uri()));
    config.set_timeout(Duration::from_secs(2));
    config
}

#[tokio::test(flavor = "multi_thread")]
async fn test_send_message_form_post() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bot123:ABC/sendMessage"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("chat_id=42&text=hi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "result": {"message_id": 7, "date": 1700000000, "chat": {"id": 42, "type": "private"}, "text": "hi"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let message_id = tokio::task::spawn_blocking(move || {
        let mut manager = Manager::new(config).unwrap();
        manager
            .send_message(Some(Target::from("42")), "hi", None, ReturnFormat::DomainObject)
            .unwrap()
            .into_domain()
            .unwrap()
            .message_id
    })
    .await
    .unwrap();

    assert_eq!(message_id, 7);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_request_uses_query_string() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bot123:ABC/getFile"))
        .and(query_param("file_id", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "result": {"file_id": "abc", "file_unique_id": "u", "file_path": "photos/1.jpg"}
        })))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let file = tokio::task::spawn_blocking(move || {
        let mut manager = Manager::new(config).unwrap();
        manager.get_file("abc", ReturnFormat::DomainObject).unwrap()
    })
    .await
    .unwrap();

    assert_eq!(
        file.into_domain().unwrap().file_path.as_deref(),
        Some("photos/1.jpg")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_http_error_status_surfaces_api_error() {
    let server = MockServer::start().await;
    let body = r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#;

    Mock::given(method("POST"))
        .and(path("/bot123:ABC/sendMessage"))
        .respond_with(ResponseTemplate::new(400).set_body_string(body))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let (result, last_body) = tokio::task::spawn_blocking(move || {
        let mut manager = Manager::new(config).unwrap();
        let result = manager.send_message(Some(Target::Id(1)), "hi", None, ReturnFormat::JsonStructure);
        (result.map(|_| ()), manager.last_error_body().to_string())
    })
    .await
    .unwrap();

    match result {
        Err(Error::Api { code, description }) => {
            assert_eq!(code, Some(400));
            assert_eq!(description, "Bad Request: chat not found");
        }
        other => panic!("expected API error, got {:?}", other),
    }
    assert_eq!(last_body, body);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_photo_upload_is_multipart() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bot123:ABC/sendPhoto"))
        .and(body_string_contains("name=\"photo\"; filename=\"cat.jpg\""))
        .and(body_string_contains("name=\"chat_id\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "result": {"message_id": 8, "date": 0, "chat": {"id": 42, "type": "private"}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let raw = tokio::task::spawn_blocking(move || {
        let mut manager = Manager::new(config).unwrap();
        manager
            .send_photo(
                Some(Target::Id(42)),
                InputFile::bytes("cat.jpg", b"JPEGDATA".to_vec()),
                None,
                ReturnFormat::RawString,
            )
            .unwrap()
            .into_raw()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(raw.contains("\"message_id\":8"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_timeout_is_transport_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bot123:ABC/getMe"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.set_timeout(Duration::from_millis(200));
    let (is_transport, last_body) = tokio::task::spawn_blocking(move || {
        let mut manager = Manager::new(config).unwrap();
        let result = manager.get_me(ReturnFormat::RawString);
        (
            result.err().map(|e| e.is_transport()),
            manager.last_error_body().to_string(),
        )
    })
    .await
    .unwrap();

    assert_eq!(is_transport, Some(true));
    assert_eq!(last_body, "No error");
}

#[test]
fn test_connection_failure_does_not_expose_token() {
    let mut config = Configuration::new("123456:SECRETTOKEN");
    config.set_base_url("http://127.0.0.1:1/bot");
    config.set_timeout(Duration::from_secs(2));

    let mut manager = Manager::new(config).unwrap();
    let err = manager.get_me(ReturnFormat::RawString).unwrap_err();

    assert!(err.is_transport());
    assert!(!err.to_string().contains("SECRETTOKEN"));
    assert!(!manager.last_error_description().contains("SECRETTOKEN"));
    assert!(manager.last_error_description().starts_with("HTTP error"));
}
