// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Route-level tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use wagate_core::{InstanceId, SendReceipt};
use wagate_dispatch::DispatchPipeline;
use wagate_gateway::{router, AuthConfig, GatewayState, HealthState};
use wagate_registry::InstanceRegistry;
use wagate_test_utils::{MockSession, MockStore};

const TOKEN: &str = "test-token";

struct TestGateway {
    app: Router,
    session: Arc<MockSession>,
    store: Arc<MockStore>,
}

fn gateway_with(bearer_token: Option<&str>) -> TestGateway {
    let session = Arc::new(MockSession::acknowledging(
        "abc",
        "5511999990000",
        SendReceipt {
            message_id: "MSG1".into(),
            timestamp: 1_700_000_000,
        },
    ));
    let store = Arc::new(MockStore::new());
    let registry = Arc::new(InstanceRegistry::new());
    registry.authenticate(session.clone());
    registry.register_pending(InstanceId::from("pending"));

    let pipeline = Arc::new(DispatchPipeline::new(
        registry.clone(),
        store.clone(),
        Duration::from_secs(30),
    ));
    let state = GatewayState {
        pipeline,
        registry,
        store: store.clone(),
        auth: AuthConfig {
            bearer_token: bearer_token.map(str::to_string),
        },
        health: HealthState {
            start_time: std::time::Instant::now(),
        },
        cancel: CancellationToken::new(),
    };
    TestGateway {
        app: router(state),
        session,
        store,
    }
}

fn gateway() -> TestGateway {
    gateway_with(Some(TOKEN))
}

fn send_request(instance: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/{instance}/chat/send/text"))
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(Body::empty())
        .unwrap()
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn send_text_returns_the_stored_record() {
    let gw = gateway();
    let (status, body) = call(
        &gw.app,
        send_request("abc", r#"{"Phone": "5511888880000", "Text": "hello"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "Message": {
                "Chat": "5511888880000",
                "Sender": "5511999990000",
                "InstanceID": "abc",
                "Body": "hello",
                "Timestamp": 1_700_000_000,
                "FromMe": true,
                "MessageID": "MSG1"
            }
        })
    );
    assert_eq!(gw.store.create_count(), 1);
}

#[tokio::test]
async fn invalid_phone_is_a_bad_request() {
    let gw = gateway();
    let (status, body) = call(
        &gw.app,
        send_request("abc", r#"{"Phone": "not-a-number", "Text": "hello"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid phone", "code": "bad_request" }));
    assert_eq!(gw.session.send_count(), 0);
    assert_eq!(gw.store.create_count(), 0);
}

#[tokio::test]
async fn unparsable_body_is_a_bad_request() {
    let gw = gateway();
    let (status, body) = call(&gw.app, send_request("abc", "{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Body data is invalid");
    assert_eq!(gw.session.send_count(), 0);
}

#[tokio::test]
async fn unknown_instance_is_not_found() {
    let gw = gateway();
    let (status, body) = call(
        &gw.app,
        send_request("ghost", r#"{"Phone": "5511888880000", "Text": "hello"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "instance_not_found");
    assert_eq!(gw.session.send_count(), 0);
    assert_eq!(gw.store.create_count(), 0);
}

#[tokio::test]
async fn pending_instance_is_unavailable() {
    let gw = gateway();
    let (status, body) = call(
        &gw.app,
        send_request("pending", r#"{"Phone": "5511888880000", "Text": "hello"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "instance_not_authenticated");
}

#[tokio::test]
async fn persistence_failure_reports_delivered_message_id() {
    let gw = gateway();
    gw.store.fail_writes(true);
    let (status, body) = call(
        &gw.app,
        send_request("abc", r#"{"Phone": "5511888880000", "Text": "hello"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "persistence_failed");
    assert_eq!(body["message_id"], "MSG1");
    assert_eq!(gw.session.send_count(), 1);
}

#[tokio::test]
async fn chat_messages_lists_sent_records() {
    let gw = gateway();
    call(
        &gw.app,
        send_request("abc", r#"{"Phone": "5511888880000", "Text": "hello"}"#),
    )
    .await;

    let (status, body) = call(
        &gw.app,
        get_request("/abc/chat/messages?phone=%2B5511888880000"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["Messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["MessageID"], "MSG1");
}

#[tokio::test]
async fn chat_messages_rejects_invalid_phone() {
    let gw = gateway();
    let (status, _) = call(&gw.app, get_request("/abc/chat/messages?phone=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_reports_each_instance() {
    let gw = gateway();
    let (status, body) = call(&gw.app, get_request("/abc/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "Status": "authenticated" }));

    let (_, body) = call(&gw.app, get_request("/pending/status")).await;
    assert_eq!(body, json!({ "Status": "pending" }));

    let (status, _) = call(&gw.app, get_request("/ghost/status")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_routes_require_the_bearer_token() {
    let gw = gateway();
    let request = Request::builder()
        .uri("/abc/status")
        .header(header::AUTHORIZATION, "Bearer wrong")
        .body(Body::empty())
        .unwrap();
    let (status, _) = call(&gw.app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/abc/status")
        .body(Body::empty())
        .unwrap();
    let (status, _) = call(&gw.app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_token_configuration_fails_closed() {
    let gw = gateway_with(None);
    let (status, _) = call(
        &gw.app,
        send_request("abc", r#"{"Phone": "5511888880000", "Text": "hello"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(gw.session.send_count(), 0);
}

#[tokio::test]
async fn health_is_public() {
    let gw = gateway_with(None);
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = call(&gw.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["authenticated_instances"], 1);
    assert_eq!(body["pending_instances"], 1);
}
