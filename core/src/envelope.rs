//! Request envelope sent as the body of every Remote API call.
//!
//! The provider expects `{"request": {...}}` where the inner object carries the
//! operation parameters plus the `application` code and `auth` token.
//! Credentials always win over caller keys with the same name.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, Result};

/// The JSON body of a Remote API call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub request: Map<String, Value>,
}

impl Envelope {
    pub fn application(&self) -> Option<&str> {
        self.request.get("application").and_then(Value::as_str)
    }

    pub fn auth(&self) -> Option<&str> {
        self.request.get("auth").and_then(Value::as_str)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ApiError::Encoding(e.to_string()))
    }
}

/// Merge `params` with the application credentials and wrap the result.
///
/// `params` must serialize to a JSON object; arrays, scalars and `null` are
/// rejected with `ApiError::Encoding`.
pub fn build_envelope<P>(application: &str, auth: &str, params: &P) -> Result<Envelope>
where
    P: Serialize + ?Sized,
{
    let value = serde_json::to_value(params).map_err(|e| ApiError::Encoding(e.to_string()))?;
    let mut request = match value {
        Value::Object(map) => map,
        other => {
            return Err(ApiError::Encoding(format!(
                "request parameters must be a JSON object, got {}",
                json_kind(&other)
            )))
        }
    };
    request.insert("application".to_string(), Value::String(application.to_string()));
    request.insert("auth".to_string(), Value::String(auth.to_string()));
    Ok(Envelope { request })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
