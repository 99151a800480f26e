//! HTTP request and response values exchanged with a `Transport`.
//!
//! # Design
//! Requests and responses are plain owned data. The client builds an
//! `HttpRequest` without touching the network, hands it to a transport, and
//! interprets the returned `HttpResponse`. Keeping the exchange as data lets
//! tests inspect exactly what would be sent and feed canned responses back.

use std::fmt;

use url::Url;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// Built by `PushwooshClient::build_*` methods and executed by a `Transport`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Path component of the target URL, as used in logs and errors.
    pub fn path(&self) -> &str {
        self.url.path()
    }
}

/// An HTTP response described as plain data. The body is always read in full.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Canonical reason phrase for the status code, or an empty string.
    pub fn status_text(&self) -> &'static str {
        reqwest::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_are_uppercase() {
        assert_eq!(HttpMethod::Post.as_str(), "POST");
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn status_text_uses_canonical_reason() {
        let response = HttpResponse {
            status: 503,
            headers: Vec::new(),
            body: String::new(),
        };
        assert_eq!(response.status_text(), "Service Unavailable");

        let unknown = HttpResponse { status: 599, ..response };
        assert_eq!(unknown.status_text(), "");
    }
}
