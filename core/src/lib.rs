//! Synchronous client for the Pushwoosh Remote API.
//!
//! # Overview
//! Wraps the provider's JSON-over-HTTP operations (device registration,
//! deregistration, message statistics) in typed calls. Every call wraps its
//! parameters in a credential envelope, POSTs it to
//! `{endpoint}/1.3/{operation}`, and decodes the typed reply.
//!
//! # Design
//! - `PushwooshClient` is stateless apart from its `Config` and a shared
//!   `Transport`; clones are cheap and safe to use from many threads.
//! - Each operation has a pure `build_*` step producing an `HttpRequest`, so
//!   request shapes are testable without a network.
//! - Every call takes a `Context` for cancellation and deadlines. There are no
//!   retries; each call is sent at most once.
//! - Statistics counts arrive either quoted or bare and decode through the
//!   dedicated `Count` type.

pub mod client;
pub mod config;
pub mod context;
pub mod envelope;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{parse_response, ClientBuilder, PushwooshClient, API_VERSION};
pub use config::Config;
pub use context::Context;
pub use envelope::{build_envelope, Envelope};
pub use error::{ApiError, Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{
    default_transport, set_default_transport, ReqwestTransport, Transport, DEFAULT_HTTP_TIMEOUT,
};
pub use types::{
    ApiResult, Count, DeregisterDevice, Device, DeviceType, GetMsgStatsResult, GetResultsResult,
    GetResultsRow, MsgStatsRequest, ResponseMessages, ResultsRequest,
};
