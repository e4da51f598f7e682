//! Integration tests for the inference client against a mock endpoint
//!
//! Covers reply normalization, status-to-message mapping, transport
//! failures, and the exchange log.

mod common;

use chatpad::config::InferenceConfig;
use chatpad::inference::{
    InferenceClient, AUTH_FAILED, MODEL_LOADING, NETWORK_ERROR, NO_RESPONSE_GENERATED,
    TOO_MANY_REQUESTS, UNEXPECTED_ERROR,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_reply(server: &MockServer, status: u16, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/models/test"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_reply_is_returned_verbatim_when_not_echoed() {
    let server = MockServer::start().await;
    mount_reply(&server, 200, json!([{"generated_text": "Hello there"}])).await;

    let client = common::client_for(&server);
    assert_eq!(client.send_message("Hello").await, "Hello there");
}

#[tokio::test]
async fn test_echoed_prompt_is_stripped() {
    let server = MockServer::start().await;
    mount_reply(&server, 200, json!([{"generated_text": "HiI am fine"}])).await;

    let client = common::client_for(&server);
    assert_eq!(client.send_message("Hi").await, "I am fine");
}

#[tokio::test]
async fn test_empty_array_yields_no_response_message() {
    let server = MockServer::start().await;
    mount_reply(&server, 200, json!([])).await;

    let client = common::client_for(&server);
    assert_eq!(client.send_message("Hello").await, NO_RESPONSE_GENERATED);
}

#[tokio::test]
async fn test_model_loading_status() {
    let server = MockServer::start().await;
    mount_reply(&server, 503, json!({"error": "Model is currently loading"})).await;

    let client = common::client_for(&server);
    assert_eq!(client.send_message("Hello").await, MODEL_LOADING);
}

#[tokio::test]
async fn test_rate_limit_and_auth_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "Bearer bad_key"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid token"})))
        .mount(&server)
        .await;
    mount_reply(&server, 429, json!({"error": "Rate limit reached"})).await;

    let anonymous = common::client_for(&server);
    assert_eq!(anonymous.send_message("Hello").await, TOO_MANY_REQUESTS);

    let config = InferenceConfig {
        api_url: format!("{}/models/test", server.uri()),
        api_key: Some("bad_key".to_string()),
        ..Default::default()
    };
    let authenticated = InferenceClient::new(config).unwrap();
    assert_eq!(authenticated.send_message("Hello").await, AUTH_FAILED);
}

#[tokio::test]
async fn test_other_status_uses_endpoint_error_detail() {
    let server = MockServer::start().await;
    mount_reply(&server, 400, json!({"error": "Input is too long"})).await;

    let client = common::client_for(&server);
    assert_eq!(client.send_message("Hello").await, "Error: Input is too long");
}

#[tokio::test]
async fn test_other_status_without_detail_uses_generic_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let client = common::client_for(&server);
    assert_eq!(
        client.send_message("Hello").await,
        "Error: Failed to get response from AI"
    );
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    // Reserve a free port, then release it so nothing is listening there
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let config = InferenceConfig {
        api_url: format!("http://127.0.0.1:{}/models/test", port),
        ..Default::default()
    };
    let client = InferenceClient::new(config).unwrap();

    assert_eq!(client.send_message("Hello").await, NETWORK_ERROR);
}

#[tokio::test]
async fn test_timeout_is_unexpected_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"generated_text": "too late"}]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = InferenceConfig {
        api_url: format!("{}/models/test", server.uri()),
        timeout_seconds: 1,
        ..Default::default()
    };
    let client = InferenceClient::new(config).unwrap();

    assert_eq!(client.send_message("Hello").await, UNEXPECTED_ERROR);
}

#[tokio::test]
async fn test_history_records_exchange_and_clears() {
    let server = MockServer::start().await;
    mount_reply(&server, 200, json!([{"generated_text": "Hello there"}])).await;

    let client = common::client_for(&server);
    client.clear_history();
    assert!(client.history().is_empty());

    client.send_message("Hello").await;
    assert_eq!(
        client.history(),
        vec!["Hello".to_string(), "Hello there".to_string()]
    );

    client.clear_history();
    assert!(client.history().is_empty());
}

#[tokio::test]
async fn test_each_call_is_an_independent_prompt() {
    let server = MockServer::start().await;
    mount_reply(&server, 200, json!([{"generated_text": "ok"}])).await;

    let client = common::client_for(&server);
    client.send_message("first").await;
    client.send_message("second").await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let body: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(body["inputs"], "second");
}
