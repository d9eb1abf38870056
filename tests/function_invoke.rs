//! One-shot function adapter over the shared relay.

use std::collections::BTreeMap;
use std::time::Duration;

use anthropic_relay::config::RelayConfig;
use anthropic_relay::function::{FunctionEvent, FunctionHandler};
use anthropic_relay::relay::HttpUpstream;
use anthropic_relay::security::CorsPolicy;
use base64::{engine::general_purpose, Engine as _};
use serde_json::json;
use wiremock::matchers::{body_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

fn event(method: &str, api_key: Option<&str>, body: &str) -> FunctionEvent {
    let mut headers = BTreeMap::new();
    headers.insert("content-type".to_string(), "application/json".to_string());
    if let Some(key) = api_key {
        headers.insert("x-api-key".to_string(), key.to_string());
    }
    FunctionEvent {
        method: method.to_string(),
        headers,
        body: body.to_string(),
        is_base64_encoded: false,
    }
}

fn handler_for(upstream: &MockServer) -> FunctionHandler<HttpUpstream> {
    FunctionHandler::new(common::relay_to(
        &common::messages_url(&upstream.uri()),
        None,
        CorsPolicy::relay(),
    ))
}

#[tokio::test]
async fn options_is_answered_without_upstream() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;
    let handler = handler_for(&upstream);

    let result = handler.invoke(event("OPTIONS", None, "")).await;

    assert_eq!(result.status, 200);
    assert!(result.body.is_empty());
    assert_eq!(result.headers["access-control-allow-origin"], "*");
    assert_eq!(result.headers["access-control-allow-methods"], "POST, OPTIONS");
    assert_eq!(
        result.headers["access-control-allow-headers"],
        "Content-Type, x-api-key, anthropic-version"
    );
}

#[tokio::test]
async fn non_post_methods_are_405() {
    let upstream = MockServer::start().await;
    let handler = handler_for(&upstream);

    for verb in ["GET", "PUT", "DELETE", "NOT A METHOD"] {
        let result = handler.invoke(event(verb, Some("k"), "{}")).await;
        assert_eq!(result.status, 405, "method {verb}");
        assert_eq!(result.body, r#"{"error":{"message":"Method not allowed"}}"#);
        assert_eq!(result.headers["access-control-allow-origin"], "*");
    }
}

#[tokio::test]
async fn missing_key_and_bad_body_are_400() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;
    let handler = handler_for(&upstream);

    let result = handler.invoke(event("POST", None, r#"{"model":"m"}"#)).await;
    assert_eq!(result.status, 400);
    assert_eq!(common::error_message(result.body.as_bytes()), "Missing x-api-key header");

    let result = handler.invoke(event("POST", Some("k"), "not json")).await;
    assert_eq!(result.status, 400);
    assert_eq!(common::error_message(result.body.as_bytes()), "Invalid request body");
}

#[tokio::test]
async fn forwards_and_relays_upstream_answer() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-api-key", "sk-fn"))
        .and(body_json(json!({"model": "m", "max_tokens": 64, "messages": []})))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_raw(r#"{"type":"error","error":{"type":"authentication_error"}}"#, "application/json"),
        )
        .expect(1)
        .mount(&upstream)
        .await;
    let handler = handler_for(&upstream);

    let result = handler
        .invoke(event(
            "POST",
            Some("sk-fn"),
            r#"{"model":"m","max_tokens":64,"messages":[],"tools":[]}"#,
        ))
        .await;

    assert_eq!(result.status, 401);
    assert_eq!(
        result.body,
        r#"{"type":"error","error":{"type":"authentication_error"}}"#
    );
    assert_eq!(result.headers["content-type"], "application/json");
}

#[tokio::test]
async fn configured_ceiling_still_applies() {
    let (addr, _closed) = common::start_hanging_upstream().await;
    let handler = FunctionHandler::new(common::relay_to(
        &common::messages_url(&format!("http://{addr}")),
        Some(Duration::from_millis(200)),
        CorsPolicy::relay(),
    ));

    let result = handler.invoke(event("POST", Some("k"), r#"{"model":"m"}"#)).await;
    assert_eq!(result.status, 504);
}

#[tokio::test]
async fn non_utf8_upstream_body_survives_as_base64() {
    let upstream_body: &'static [u8] = b"\xff\xfe{\"partial\":\"\xe9\"}";
    let addr = common::start_programmable_upstream(move |_| async move {
        (502, Some("application/octet-stream"), upstream_body.to_vec())
    })
    .await;
    let handler = FunctionHandler::new(common::relay_to(
        &common::messages_url(&format!("http://{addr}")),
        None,
        CorsPolicy::relay(),
    ));

    let result = handler.invoke(event("POST", Some("k"), r#"{"model":"m"}"#)).await;

    assert_eq!(result.status, 502);
    assert!(result.is_base64_encoded);
    assert_eq!(
        general_purpose::STANDARD.decode(&result.body).unwrap(),
        upstream_body
    );
    assert_eq!(result.headers["content-type"], "application/octet-stream");
}

#[tokio::test]
async fn base64_event_body_is_forwarded_decoded() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({"model": "m", "max_tokens": 8})))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .expect(1)
        .mount(&upstream)
        .await;
    let handler = handler_for(&upstream);

    let mut encoded = event(
        "POST",
        Some("k"),
        &general_purpose::STANDARD.encode(r#"{"model":"m","max_tokens":8}"#),
    );
    encoded.is_base64_encoded = true;
    let result = handler.invoke(encoded).await;

    assert_eq!(result.status, 200);
    assert!(!result.is_base64_encoded);
    assert_eq!(result.body, "{}");
}

#[test]
fn handler_builds_from_function_defaults() {
    assert!(FunctionHandler::from_config(&RelayConfig::function_defaults()).is_ok());
}

#[test]
fn event_parses_from_host_json() {
    let raw = r#"{"method":"POST","headers":{"x-api-key":"k"},"body":"{}"}"#;
    let parsed: FunctionEvent = serde_json::from_str(raw).unwrap();
    assert_eq!(parsed.headers["x-api-key"], "k");
    assert!(!parsed.is_base64_encoded);

    let raw = r#"{"body":"e30=","isBase64Encoded":true}"#;
    let parsed: FunctionEvent = serde_json::from_str(raw).unwrap();
    assert!(parsed.is_base64_encoded);
}
