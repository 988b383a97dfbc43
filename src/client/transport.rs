//! The transport seam between [`TraktClient`](super::TraktClient) and the
//! network.
//!
//! The client never talks to reqwest directly; it hands a
//! [`PreparedRequest`] to a [`Transport`] and gets an [`HttpResponse`] back.
//! [`ReqwestTransport`] is the production implementation. Tests substitute
//! their own.

use std::future::Future;
use std::pin::Pin;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use crate::route::PreparedRequest;
use crate::Result;

/// Boxed future returned by object-safe async traits in this crate.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A raw HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Response with an empty header map.
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Add a header. Invalid names or values are ignored.
    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = value.parse() {
            self.headers.insert(name, value);
        }
        self
    }

    /// Header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Executes prepared requests.
pub trait Transport: Send + Sync {
    /// Send one request. Only connection-level failures are errors; any
    /// HTTP status comes back as a response.
    fn execute(&self, request: PreparedRequest) -> BoxFuture<'_, Result<HttpResponse>>;
}

/// [`Transport`] backed by a [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap an existing reqwest client.
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: PreparedRequest) -> BoxFuture<'_, Result<HttpResponse>> {
        Box::pin(async move {
            let (method, url, headers, body) = request.into_parts();
            let mut builder = self.http.request(method, url).headers(headers);
            if let Some(body) = body {
                builder = builder.body(body);
            }

            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?.to_vec();

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        })
    }
}
