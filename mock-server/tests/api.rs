use std::time::Duration;

use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, router, MockState, Settings, DEFAULT_ACCESS_TOKEN, DEFAULT_APPLICATION};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

/// Envelope with the mock's default credentials around `params`.
fn envelope(operation: &str, mut params: Value) -> Request<String> {
    params["application"] = json!(DEFAULT_APPLICATION);
    params["auth"] = json!(DEFAULT_ACCESS_TOKEN);
    json_request(
        &format!("/json/1.3/{operation}"),
        &json!({ "request": params }).to_string(),
    )
}

// --- credentials ---

#[tokio::test]
async fn wrong_auth_returns_401() {
    let resp = app()
        .oneshot(json_request(
            "/json/1.3/registerDevice",
            &json!({"request": {"application": DEFAULT_APPLICATION, "auth": "nope", "hwid": "h"}})
                .to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_application_is_status_210() {
    let resp = app()
        .oneshot(json_request(
            "/json/1.3/registerDevice",
            &json!({"request": {"application": "OTHER", "auth": DEFAULT_ACCESS_TOKEN}}).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status_code"], 210);
    assert_eq!(body["status_message"], "Application not found");
}

#[tokio::test]
async fn body_without_envelope_is_rejected() {
    let resp = app()
        .oneshot(json_request("/json/1.3/registerDevice", r#"{"hwid":"h"}"#))
        .await
        .unwrap();

    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn unknown_operation_returns_404() {
    let resp = app().oneshot(envelope("createMessage", json!({}))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- registerDevice ---

#[tokio::test]
async fn register_device_stores_device() {
    let state = MockState::default();
    let resp = router(state.clone())
        .oneshot(envelope(
            "registerDevice",
            json!({"device_type": 3, "push_token": "tok", "hwid": "hw-1", "language": "en"}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status_code"], 200);
    assert!(body["response"].is_null());

    let device = state.device("hw-1").await.unwrap();
    assert_eq!(device.push_token, "tok");
    assert_eq!(device.language.as_deref(), Some("en"));

    let received = state.received().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].operation, "registerDevice");
    assert_eq!(received[0].request["auth"], DEFAULT_ACCESS_TOKEN);
}

#[tokio::test]
async fn register_device_rejects_unknown_type() {
    let resp = app()
        .oneshot(envelope(
            "registerDevice",
            json!({"device_type": 4, "push_token": "tok", "hwid": "hw-1"}),
        ))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["status_code"], 210);
}

#[tokio::test]
async fn register_device_missing_hwid_returns_400() {
    let resp = app()
        .oneshot(envelope("registerDevice", json!({"device_type": 3, "push_token": "tok"})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- forced behaviour ---

#[tokio::test]
async fn forced_failure_status_is_returned() {
    let state = MockState::new(Settings {
        failure: Some(StatusCode::INTERNAL_SERVER_ERROR),
        ..Settings::default()
    });
    let resp = router(state)
        .oneshot(envelope("getMsgStats", json!({"message": "M"})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_bytes(resp).await, "mock failure");
}

#[tokio::test(start_paused = true)]
async fn latency_delays_the_reply() {
    let state = MockState::new(Settings {
        latency: Duration::from_secs(3),
        ..Settings::default()
    });
    let started = tokio::time::Instant::now();
    let resp = router(state)
        .oneshot(envelope("getMsgStats", json!({"message": "M"})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(started.elapsed() >= Duration::from_secs(3));
}

// --- device and statistics lifecycle ---

#[tokio::test]
async fn stats_lifecycle() {
    let state = MockState::default();

    for hwid in ["hw-1", "hw-2"] {
        let resp = router(state.clone())
            .oneshot(envelope(
                "registerDevice",
                json!({"device_type": 1, "push_token": "tok", "hwid": hwid}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    // unregister one
    let resp = router(state.clone())
        .oneshot(envelope("unregisterDevice", json!({"hwid": "hw-2"})))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["status_code"], 200);
    assert_eq!(state.device_count().await, 1);

    // start statistics
    let resp = router(state.clone())
        .oneshot(envelope("getMsgStats", json!({"message": "MSG-1"})))
        .await
        .unwrap();
    let body = body_json(resp).await;
    let request_id = body["response"]["request_id"].as_str().unwrap().to_string();
    assert_eq!(request_id.len(), 32);

    // fetch results: quoted and bare counts side by side
    let resp = router(state.clone())
        .oneshot(envelope("getResults", json!({"request_id": request_id})))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["response"]["formatter"], "hourly");
    let rows = body["response"]["rows"].as_array().unwrap();
    assert_eq!(rows[0]["count"], "1");
    assert_eq!(rows[1]["count"], 0);
    assert_eq!(rows[2]["count"], 1);

    // unknown request id
    let resp = router(state)
        .oneshot(envelope("getResults", json!({"request_id": "missing"})))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["status_code"], 210);
    assert_eq!(body["status_message"], "Request not found");
}
