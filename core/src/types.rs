//! Parameter and result shapes for the Remote API operations.
//!
//! # Design
//! Parameter types are plain `Serialize` structs that the envelope builder
//! merges with the credentials. Result types mirror the provider's response
//! envelope (`status_code`, `status_message`, `response`) and are lenient in
//! the ways the provider is inconsistent: `response` and its collections may
//! be `null` or missing, unknown fields are ignored, and statistics counts may
//! arrive quoted (see `Count`).

use std::collections::HashMap;
use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Device platforms understood by `registerDevice`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Ios,
    BlackBerry,
    Android,
    WindowsPhone,
    Osx,
    Windows,
    Amazon,
    Safari,
    Chrome,
    Firefox,
}

impl DeviceType {
    /// Numeric constant used on the wire.
    pub fn code(self) -> i64 {
        match self {
            DeviceType::Ios => 1,
            DeviceType::BlackBerry => 2,
            DeviceType::Android => 3,
            DeviceType::WindowsPhone => 5,
            DeviceType::Osx => 7,
            DeviceType::Windows => 8,
            DeviceType::Amazon => 9,
            DeviceType::Safari => 10,
            DeviceType::Chrome => 11,
            DeviceType::Firefox => 12,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            1 => DeviceType::Ios,
            2 => DeviceType::BlackBerry,
            3 => DeviceType::Android,
            5 => DeviceType::WindowsPhone,
            7 => DeviceType::Osx,
            8 => DeviceType::Windows,
            9 => DeviceType::Amazon,
            10 => DeviceType::Safari,
            11 => DeviceType::Chrome,
            12 => DeviceType::Firefox,
            _ => return None,
        })
    }
}

impl Serialize for DeviceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for DeviceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i64::deserialize(deserializer)?;
        DeviceType::from_code(code)
            .ok_or_else(|| de::Error::custom(format!("unknown device type {code}")))
    }
}

/// Parameters for `registerDevice`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub device_type: DeviceType,
    pub push_token: String,
    pub hwid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Offset from UTC in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<i64>,
}

impl Device {
    pub fn new(device_type: DeviceType, push_token: impl Into<String>, hwid: impl Into<String>) -> Self {
        Self {
            device_type,
            push_token: push_token.into(),
            hwid: hwid.into(),
            language: None,
            timezone: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_timezone(mut self, offset_seconds: i64) -> Self {
        self.timezone = Some(offset_seconds);
        self
    }
}

/// Parameters for `unregisterDevice`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeregisterDevice {
    pub hwid: String,
}

/// Parameters for `getMsgStats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgStatsRequest {
    pub message: String,
}

/// Parameters for `getResults`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsRequest {
    pub request_id: String,
}

/// Generic response of the device operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiResult {
    pub status_code: i64,
    pub status_message: String,
    pub response: Option<ResponseMessages>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseMessages {
    #[serde(rename = "Messages", alias = "messages", deserialize_with = "null_as_default")]
    pub messages: Vec<String>,
    /// Device id to the identifiers the provider did not recognise.
    #[serde(
        rename = "UnknownDevices",
        alias = "unknown_devices",
        deserialize_with = "null_as_default"
    )]
    pub unknown_devices: HashMap<String, Vec<String>>,
}

/// Response of `getMsgStats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetMsgStatsResult {
    pub status_code: i64,
    pub status_message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub response: MsgStatsResponse,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MsgStatsResponse {
    /// Identifier to pass to `getResults`.
    pub request_id: String,
}

/// Response of `getResults`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetResultsResult {
    pub status_code: i64,
    pub status_message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub response: GetResultsResponse,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetResultsResponse {
    pub formatter: String,
    #[serde(deserialize_with = "null_as_default")]
    pub rows: Vec<GetResultsRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetResultsRow {
    pub datetime: String,
    pub action: String,
    pub count: Count,
}

/// An event count the provider encodes either as `17` or as `"17"`.
///
/// Decodes a bare integer as-is and a quoted string by parsing its contents as
/// a base-10 `i64`. Anything else (fractions, non-digits, out-of-range values)
/// is a decode error. Serializes as a bare number.
///
/// The string contents are read after JSON unescaping, so `"\u0034\u0032"`
/// decodes as 42 just like `"42"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Count(pub i64);

impl Count {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for Count {
    fn from(value: i64) -> Self {
        Count(value)
    }
}

impl From<Count> for i64 {
    fn from(count: Count) -> Self {
        count.0
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for Count {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for Count {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CountVisitor)
    }
}

struct CountVisitor;

impl<'de> Visitor<'de> for CountVisitor {
    type Value = Count;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or a string containing a base-10 integer")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Count, E> {
        Ok(Count(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Count, E> {
        i64::try_from(v)
            .map(Count)
            .map_err(|_| E::custom(format!("count {v} out of range")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Count, E> {
        v.parse::<i64>()
            .map(Count)
            .map_err(|e| E::custom(format!("invalid count {v:?}: {e}")))
    }
}

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
