//! I/O seams used by adapters: an HTTP transport and a sleep primitive.
//!
//! Both are traits so that delivery policy (retries, backoff) can be tested
//! without a network or a wall clock.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::debug;

use crate::error::Result;

/// Boxed future used by the seams in this module.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A received HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

/// Something that can POST a JSON document.
pub trait AlertTransport: Send + Sync + fmt::Debug {
    /// POSTs `body` to `url` with `Content-Type: application/json`.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::Transport` when no response was received.
    fn post_json<'a>(&'a self, url: &'a str, body: Vec<u8>)
        -> BoxFuture<'a, Result<TransportResponse>>;
}

/// [`AlertTransport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport reusing an existing client (and its pool).
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl AlertTransport for ReqwestTransport {
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        body: Vec<u8>,
    ) -> BoxFuture<'a, Result<TransportResponse>> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .await?;

            let status = response.status().as_u16();
            let body = response.text().await?;
            debug!(url = %url, status, "alert transport response");

            Ok(TransportResponse { status, body })
        })
    }
}

/// Suspends the current task.
pub trait Sleeper: Send + Sync + fmt::Debug {
    /// Sleeps for `duration`.
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()>;
}

/// [`Sleeper`] backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}
