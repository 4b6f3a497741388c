//! HTTP transport seam
//!
//! The rotation core talks to the API through the `Transport` trait so unit
//! tests can script status sequences without a network. `HttpTransport` is
//! the real implementation over a shared `reqwest::Client`.
//!
//! Request URLs carry the credential as a query parameter. Error strings from
//! reqwest embed the URL, so every error is stripped of it before it can
//! reach a log line.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::TransportFailure;
use crate::protocol::GenerateRequest;

/// An HTTP reply, success or not. Status classification is the caller's job.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// Abstraction over the outbound HTTP call.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility
/// (`Arc<dyn Transport>`).
pub trait Transport: Send + Sync {
    /// POST `body` as JSON to `url` with the given timeout.
    fn execute<'a>(
        &'a self,
        url: &'a str,
        body: &'a GenerateRequest,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<HttpReply, TransportFailure>> + Send + 'a>>;
}

/// Transport over a shared reqwest client.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

/// Map a reqwest error to a transport failure, dropping the URL (it carries
/// the credential).
fn map_error(e: reqwest::Error) -> TransportFailure {
    if e.is_timeout() {
        TransportFailure::TimedOut
    } else {
        TransportFailure::Network(e.without_url().to_string())
    }
}

impl Transport for HttpTransport {
    fn execute<'a>(
        &'a self,
        url: &'a str,
        body: &'a GenerateRequest,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<HttpReply, TransportFailure>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .json(body)
                .timeout(timeout)
                .send()
                .await
                .map_err(map_error)?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(map_error)?;
            Ok(HttpReply { status, body })
        })
    }
}
