//! Blocking HTTP transports.
//!
//! # Design
//! `Transport` is the seam between the client and the network: it executes
//! one `HttpRequest` under a `Context` and returns the full `HttpResponse`,
//! whatever its status. Status interpretation stays in the client. Transports
//! are shared between clients and threads, so implementations must be
//! `Send + Sync`, and they must stop the exchange when the context finishes.
//!
//! A process-wide default transport backs `PushwooshClient::new`. It can be
//! replaced once, before any client asks for it, with
//! `set_default_transport`; clients that need something else take a
//! transport explicitly through `ClientBuilder::transport`.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::runtime::Runtime;
use tracing::warn;

use crate::context::Context;
use crate::error::{ApiError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Overall limit for one HTTP exchange, including reading the body.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// Executes HTTP requests.
pub trait Transport: Send + Sync {
    /// Perform `request` and read the whole response body. Returns
    /// `Cancelled` or `DeadlineExceeded` as soon as `ctx` finishes, without
    /// letting the exchange complete.
    fn execute(&self, ctx: &Context, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `Transport` backed by an async `reqwest::Client` driven on a private
/// tokio runtime.
///
/// The calling thread blocks on the exchange raced against its `Context`.
/// When the context wins, the request future is dropped and its connection
/// closed. Non-2xx statuses are returned as data, not errors, and the body is
/// always read so the connection can go back to the pool.
///
/// `execute` must not be called from inside an async runtime.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    runtime: Arc<Runtime>,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, ApiError> {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Configuration(format!("failed to build HTTP client: {e}")))?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("pushwoosh-http")
            .enable_all()
            .build()
            .map_err(|e| ApiError::Configuration(format!("failed to start HTTP runtime: {e}")))?;
        Ok(Self {
            client,
            runtime: Arc::new(runtime),
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self.client.request(method, request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(map_reqwest_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, ctx: &Context, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.runtime.block_on(ctx.run(self.send(request)))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(err.to_string())
    }
}

static DEFAULT_TRANSPORT: OnceLock<Arc<dyn Transport>> = OnceLock::new();

/// The process-wide transport used by `PushwooshClient::new`.
///
/// Initialised with a `ReqwestTransport` on first use unless
/// `set_default_transport` ran earlier. Fails with `Configuration` when the
/// HTTP client or its runtime cannot be created.
pub fn default_transport() -> Result<Arc<dyn Transport>, ApiError> {
    if let Some(transport) = DEFAULT_TRANSPORT.get() {
        return Ok(Arc::clone(transport));
    }
    let created: Arc<dyn Transport> = Arc::new(ReqwestTransport::new()?);
    Ok(Arc::clone(DEFAULT_TRANSPORT.get_or_init(|| created)))
}

/// Replace the process-wide default transport.
///
/// Only effective before the default is first used; afterwards the call is
/// rejected and the rejected transport handed back.
pub fn set_default_transport(transport: Arc<dyn Transport>) -> Result<(), Arc<dyn Transport>> {
    DEFAULT_TRANSPORT.set(transport).inspect_err(|_| {
        warn!("default pushwoosh transport already initialised; override ignored");
    })
}
