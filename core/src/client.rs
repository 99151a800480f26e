//! Pushwoosh Remote API client.
//!
//! # Design
//! `PushwooshClient` holds its `Config` and a shared `Transport` and carries no
//! mutable state between calls. Each operation has a `build_*` method that
//! produces the `HttpRequest` without touching the network, and an executing
//! method that sends it through the transport and decodes the reply.
//!
//! Calls block the calling thread. The transport receives the caller's
//! `Context` and abandons the exchange, connection included, as soon as the
//! context is cancelled or its deadline passes.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::context::Context;
use crate::envelope::build_envelope;
use crate::error::{ApiError, Result, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{default_transport, Transport};
use crate::types::{
    ApiResult, DeregisterDevice, Device, GetMsgStatsResult, GetResultsResult, MsgStatsRequest,
    ResultsRequest,
};

/// Remote API version segment placed between the endpoint and the operation.
pub const API_VERSION: &str = "1.3";

pub const REGISTER_DEVICE: &str = "registerDevice";
pub const UNREGISTER_DEVICE: &str = "unregisterDevice";
pub const GET_MSG_STATS: &str = "getMsgStats";
pub const GET_RESULTS: &str = "getResults";

/// Synchronous client for one Pushwoosh application.
#[derive(Clone)]
pub struct PushwooshClient {
    config: Arc<Config>,
    transport: Arc<dyn Transport>,
}

impl PushwooshClient {
    /// Client using the process-wide default transport.
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            config: Arc::new(config),
            transport: default_transport()?,
        })
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve `{endpoint}/1.3/{operation}`.
    pub fn endpoint_url(&self, operation: &str) -> Result<Url> {
        let endpoint = &self.config.endpoint;
        let mut url = Url::parse(endpoint)
            .map_err(|e| ApiError::Configuration(format!("invalid endpoint {endpoint:?}: {e}")))?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ApiError::Configuration(format!("endpoint {endpoint:?} cannot be a base URL"))
            })?;
            segments.pop_if_empty().push(API_VERSION).push(operation);
        }
        Ok(url)
    }

    /// Build the request for `operation` with `params` wrapped in the
    /// credential envelope.
    pub fn build_request<P>(&self, method: HttpMethod, operation: &str, params: &P) -> Result<HttpRequest>
    where
        P: Serialize + ?Sized,
    {
        let url = self.endpoint_url(operation)?;
        let envelope = build_envelope(
            &self.config.application_code,
            &self.config.access_token,
            params,
        )?;
        Ok(HttpRequest {
            method,
            url,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(envelope.to_json()?),
        })
    }

    pub fn build_register_device(&self, device: &Device) -> Result<HttpRequest> {
        self.build_request(HttpMethod::Post, REGISTER_DEVICE, device)
    }

    pub fn build_deregister_device(&self, hwid: &str) -> Result<HttpRequest> {
        let params = DeregisterDevice {
            hwid: hwid.to_string(),
        };
        self.build_request(HttpMethod::Post, UNREGISTER_DEVICE, &params)
    }

    pub fn build_get_msg_stats(&self, message: &str) -> Result<HttpRequest> {
        let params = MsgStatsRequest {
            message: message.to_string(),
        };
        self.build_request(HttpMethod::Post, GET_MSG_STATS, &params)
    }

    pub fn build_get_results(&self, request_id: &str) -> Result<HttpRequest> {
        let params = ResultsRequest {
            request_id: request_id.to_string(),
        };
        self.build_request(HttpMethod::Post, GET_RESULTS, &params)
    }

    /// Register a device for the application.
    pub fn register_device(&self, ctx: &Context, device: &Device) -> Result<ApiResult> {
        self.call(ctx, HttpMethod::Post, REGISTER_DEVICE, device)
    }

    /// Remove a device from the application.
    pub fn deregister_device(&self, ctx: &Context, hwid: &str) -> Result<ApiResult> {
        let params = DeregisterDevice {
            hwid: hwid.to_string(),
        };
        self.call(ctx, HttpMethod::Post, UNREGISTER_DEVICE, &params)
    }

    /// Start collecting statistics for a message. The returned request id is
    /// polled with `get_results`; the provider may need time before results
    /// are ready.
    pub fn get_msg_stats(&self, ctx: &Context, message: &str) -> Result<GetMsgStatsResult> {
        let params = MsgStatsRequest {
            message: message.to_string(),
        };
        self.call(ctx, HttpMethod::Post, GET_MSG_STATS, &params)
    }

    /// Fetch the statistics prepared for a `get_msg_stats` request id.
    pub fn get_results(&self, ctx: &Context, request_id: &str) -> Result<GetResultsResult> {
        let params = ResultsRequest {
            request_id: request_id.to_string(),
        };
        self.call(ctx, HttpMethod::Post, GET_RESULTS, &params)
    }

    /// Send `params` to `operation` and decode a 200 OK body into `T`.
    ///
    /// Any other status is an `ApiError::HttpStatus` and the body is not parsed.
    pub fn call<P, T>(&self, ctx: &Context, method: HttpMethod, operation: &str, params: &P) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.with_logger(|| {
            let (request, response) = self.round_trip(ctx, method, operation, params)?;
            parse_response(&request, &response)
        })
    }

    /// Send `params` to `operation` without looking at the reply. Succeeds
    /// once the exchange completes, whatever the HTTP status.
    pub fn call_ignoring_response<P>(
        &self,
        ctx: &Context,
        method: HttpMethod,
        operation: &str,
        params: &P,
    ) -> Result<()>
    where
        P: Serialize + ?Sized,
    {
        self.with_logger(|| self.round_trip(ctx, method, operation, params).map(|_| ()))
    }

    fn round_trip<P>(
        &self,
        ctx: &Context,
        method: HttpMethod,
        operation: &str,
        params: &P,
    ) -> Result<(HttpRequest, HttpResponse)>
    where
        P: Serialize + ?Sized,
    {
        let request = self.build_request(method, operation, params)?;
        debug!(
            method = %request.method,
            path = request.path(),
            body = request.body.as_deref().unwrap_or_default(),
            "pushwoosh API request"
        );

        let response = self.execute(ctx, &request)?;
        debug!(
            method = %request.method,
            path = request.path(),
            status = response.status,
            body = %response.body,
            "pushwoosh API response"
        );
        Ok((request, response))
    }

    fn execute(&self, ctx: &Context, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        ctx.check()?;
        self.transport.execute(ctx, request)
    }

    fn with_logger<R>(&self, f: impl FnOnce() -> R) -> R {
        match &self.config.logger {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }
}

/// Builder for a `PushwooshClient` with an explicit transport.
#[derive(Default)]
pub struct ClientBuilder {
    config: Option<Config>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Fails with `ApiError::Configuration` when no config was given. Without a
    /// transport the process-wide default is used, which fails the same way
    /// when it cannot be created.
    pub fn build(self) -> Result<PushwooshClient> {
        let config = self
            .config
            .ok_or_else(|| ApiError::Configuration("config is required".to_string()))?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport()?,
        };
        Ok(PushwooshClient {
            config: Arc::new(config),
            transport,
        })
    }
}

/// Decode a 200 OK response body into `T`.
pub fn parse_response<T: DeserializeOwned>(request: &HttpRequest, response: &HttpResponse) -> Result<T> {
    check_status(request, response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Decoding(e.to_string()))
}

/// Anything but 200 OK is an error; the body is left untouched.
fn check_status(request: &HttpRequest, response: &HttpResponse) -> Result<()> {
    if response.status == 200 {
        return Ok(());
    }
    Err(ApiError::HttpStatus {
        method: request.method.to_string(),
        path: request.path().to_string(),
        status: response.status,
        status_text: response.status_text().to_string(),
    })
}
