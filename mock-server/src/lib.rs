//! In-memory stand-in for the Pushwoosh Remote API.
//!
//! Serves `POST /json/1.3/{operation}` for the device and statistics
//! operations, checks the credential envelope, and keeps registered devices
//! and statistics requests in memory. `Settings` can force an HTTP status or
//! add latency so clients can exercise their error and cancellation paths.

use std::{collections::HashMap, sync::Arc, time::Duration};

pub use axum::http::StatusCode;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_APPLICATION: &str = "MOCK-APP";
pub const DEFAULT_ACCESS_TOKEN: &str = "mock-token";

/// Status code the provider uses for application-level failures.
pub const STATUS_FAILED: i64 = 210;

const DEVICE_TYPES: [i64; 10] = [1, 2, 3, 5, 7, 8, 9, 10, 11, 12];

#[derive(Clone, Debug)]
pub struct Settings {
    pub application: String,
    pub auth: String,
    /// Answer every call with this status instead of handling it.
    pub failure: Option<StatusCode>,
    /// Delay before each call is handled.
    pub latency: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            application: DEFAULT_APPLICATION.to_string(),
            auth: DEFAULT_ACCESS_TOKEN.to_string(),
            failure: None,
            latency: Duration::ZERO,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub device_type: i64,
    pub push_token: String,
    pub hwid: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub timezone: Option<i64>,
}

#[derive(Deserialize)]
struct Hwid {
    hwid: String,
}

#[derive(Deserialize)]
struct MsgStats {
    message: String,
}

#[derive(Deserialize)]
struct Results {
    request_id: String,
}

#[derive(Deserialize)]
pub struct Envelope {
    pub request: Map<String, Value>,
}

/// An envelope as received, before any validation.
#[derive(Clone, Debug)]
pub struct Received {
    pub operation: String,
    pub request: Map<String, Value>,
}

#[derive(Clone)]
pub struct MockState {
    settings: Arc<Settings>,
    devices: Arc<RwLock<HashMap<String, Device>>>,
    stats: Arc<RwLock<HashMap<String, String>>>,
    received: Arc<RwLock<Vec<Received>>>,
}

impl MockState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
            devices: Arc::default(),
            stats: Arc::default(),
            received: Arc::default(),
        }
    }

    pub async fn device(&self, hwid: &str) -> Option<Device> {
        self.devices.read().await.get(hwid).cloned()
    }

    pub async fn device_count(&self) -> usize {
        self.devices.read().await.len()
    }

    pub async fn received(&self) -> Vec<Received> {
        self.received.read().await.clone()
    }
}

impl Default for MockState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

pub fn app() -> Router {
    router(MockState::default())
}

pub fn router(state: MockState) -> Router {
    Router::new()
        .route("/json/1.3/{operation}", post(dispatch))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, router(state)).await
}

fn reply(status_code: i64, status_message: &str, response: Value) -> Response {
    Json(json!({
        "status_code": status_code,
        "status_message": status_message,
        "response": response,
    }))
    .into_response()
}

fn failed(status_message: &str) -> Response {
    reply(STATUS_FAILED, status_message, Value::Null)
}

fn params<T: for<'de> Deserialize<'de>>(request: &Map<String, Value>) -> Result<T, Response> {
    serde_json::from_value(Value::Object(request.clone())).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "status_code": 400,
                "status_message": format!("Invalid arguments: {e}"),
                "response": null,
            })),
        )
            .into_response()
    })
}

async fn dispatch(
    State(state): State<MockState>,
    Path(operation): Path<String>,
    Json(envelope): Json<Envelope>,
) -> Response {
    debug!(%operation, "mock pushwoosh request");
    state.received.write().await.push(Received {
        operation: operation.clone(),
        request: envelope.request.clone(),
    });

    if !state.settings.latency.is_zero() {
        tokio::time::sleep(state.settings.latency).await;
    }
    if let Some(status) = state.settings.failure {
        return (status, "mock failure").into_response();
    }

    let request = envelope.request;
    if request.get("auth").and_then(Value::as_str) != Some(state.settings.auth.as_str()) {
        return (StatusCode::UNAUTHORIZED, Json(json!({
            "status_code": 401,
            "status_message": "Access denied or application not found",
            "response": null,
        })))
            .into_response();
    }
    if request.get("application").and_then(Value::as_str) != Some(state.settings.application.as_str()) {
        return failed("Application not found");
    }

    let handled = match operation.as_str() {
        "registerDevice" => register_device(&state, &request).await,
        "unregisterDevice" => unregister_device(&state, &request).await,
        "getMsgStats" => get_msg_stats(&state, &request).await,
        "getResults" => get_results(&state, &request).await,
        _ => Err((StatusCode::NOT_FOUND, "unknown operation").into_response()),
    };
    handled.unwrap_or_else(|rejection| rejection)
}

async fn register_device(state: &MockState, request: &Map<String, Value>) -> Result<Response, Response> {
    let device: Device = params(request)?;
    if !DEVICE_TYPES.contains(&device.device_type) {
        return Ok(failed("Invalid device type"));
    }
    state.devices.write().await.insert(device.hwid.clone(), device);
    Ok(reply(200, "OK", Value::Null))
}

async fn unregister_device(state: &MockState, request: &Map<String, Value>) -> Result<Response, Response> {
    let Hwid { hwid } = params(request)?;
    state.devices.write().await.remove(&hwid);
    Ok(reply(200, "OK", Value::Null))
}

async fn get_msg_stats(state: &MockState, request: &Map<String, Value>) -> Result<Response, Response> {
    let MsgStats { message } = params(request)?;
    let request_id = Uuid::new_v4().simple().to_string();
    state.stats.write().await.insert(request_id.clone(), message);
    Ok(reply(200, "OK", json!({ "request_id": request_id })))
}

/// Rows mix quoted and bare counts the way the provider does.
async fn get_results(state: &MockState, request: &Map<String, Value>) -> Result<Response, Response> {
    let Results { request_id } = params(request)?;
    if !state.stats.read().await.contains_key(&request_id) {
        return Ok(failed("Request not found"));
    }
    let sent = state.device_count().await;
    Ok(reply(
        200,
        "OK",
        json!({
            "formatter": "hourly",
            "rows": [
                { "datetime": "2026-10-17 10:00:00", "action": "send", "count": sent.to_string() },
                { "datetime": "2026-10-17 10:00:00", "action": "open", "count": 0 },
                { "datetime": "2026-10-17 10:00:00", "action": "deliver", "count": sent },
            ],
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_accepts_optional_fields() {
        let device: Device =
            serde_json::from_str(r#"{"device_type":3,"push_token":"t","hwid":"h"}"#).unwrap();
        assert_eq!(device.device_type, 3);
        assert!(device.language.is_none());
        assert!(device.timezone.is_none());
    }

    #[test]
    fn device_rejects_missing_hwid() {
        let result: Result<Device, _> = serde_json::from_str(r#"{"device_type":3,"push_token":"t"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn params_reject_wrong_shape() {
        let mut request = Map::new();
        request.insert("hwid".to_string(), json!(17));
        let rejection = params::<Hwid>(&request).err().unwrap();
        assert_eq!(rejection.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn default_settings_use_mock_credentials() {
        let settings = Settings::default();
        assert_eq!(settings.application, DEFAULT_APPLICATION);
        assert_eq!(settings.auth, DEFAULT_ACCESS_TOKEN);
        assert!(settings.failure.is_none());
    }
}
