//! Client configuration.

use std::fmt;

use tracing::Dispatch;

use crate::error::{ApiError, Result};

/// Base URL of the hosted Remote API.
pub const DEFAULT_ENDPOINT: &str = "https://cp.pushwoosh.com/json";

pub const ENV_ENDPOINT: &str = "PUSHWOOSH_ENDPOINT";
pub const ENV_APPLICATION_CODE: &str = "PUSHWOOSH_APPLICATION_CODE";
pub const ENV_ACCESS_TOKEN: &str = "PUSHWOOSH_ACCESS_TOKEN";

/// Endpoint and credentials for one Pushwoosh application.
///
/// `logger`, when set, receives the client's `tracing` events for the
/// duration of each call instead of the ambient subscriber.
#[derive(Clone)]
pub struct Config {
    pub endpoint: String,
    pub application_code: String,
    pub access_token: String,
    pub logger: Option<Dispatch>,
}

impl Config {
    pub fn new(
        endpoint: impl Into<String>,
        application_code: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            application_code: application_code.into(),
            access_token: access_token.into(),
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: Dispatch) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Read the configuration from `PUSHWOOSH_*` environment variables.
    ///
    /// The endpoint falls back to `DEFAULT_ENDPOINT`; the application code and
    /// access token are required.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ApiError::Configuration(format!("{key} is not set")))
        };
        Ok(Self::new(
            lookup(ENV_ENDPOINT).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            required(ENV_APPLICATION_CODE)?,
            required(ENV_ACCESS_TOKEN)?,
        ))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("application_code", &self.application_code)
            .field("access_token", &"<redacted>")
            .field("logger", &self.logger.is_some())
            .finish()
    }
}
