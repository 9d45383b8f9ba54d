//! JSON-over-HTTPS transport used by NLU adapters.
//!
//! Adapters build an [`HttpRequest`] and hand it to an [`HttpClient`]; tests
//! swap in [`StaticHttpClient`] to stay offline.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

const DEFAULT_TIMEOUT_MS: u64 = 3_000;

/// A JSON `POST` with lower-cased header names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn post_json(url: impl Into<String>, body: impl Into<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(String::from("content-type"), String::from("application/json"));
        headers.insert(String::from("accept"), String::from("application/json"));
        Self {
            url: url.into(),
            headers,
            body: body.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// `Authorization: Basic base64(username:password)`.
    pub fn basic_auth(mut self, username: &str, password: &str) -> Self {
        let credentials = STANDARD.encode(format!("{username}:{password}"));
        self.headers
            .insert(String::from("authorization"), format!("Basic {credentials}"));
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok_json(body: impl Into<String>) -> Self {
        Self::with_status(200, body)
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }
}

/// Failure before a status line was received.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpError {
    #[error("request timed out after {0} ms")]
    Timeout(u64),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Async transport contract.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;
}

/// Offline transport that answers every request with one canned outcome and
/// records what it was asked.
#[derive(Debug)]
pub struct StaticHttpClient {
    outcome: Result<HttpResponse, HttpError>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StaticHttpClient {
    pub fn responding(response: HttpResponse) -> Self {
        Self::with_outcome(Ok(response))
    }

    pub fn failing(error: HttpError) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<HttpResponse, HttpError>) -> Self {
        Self {
            outcome,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HttpClient for StaticHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        let outcome = self.outcome.clone();
        Box::pin(async move { outcome })
    }
}

/// reqwest-backed transport.
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self, HttpError> {
        reqwest::Client::builder()
            .user_agent(concat!("stockask/", env!("CARGO_PKG_VERSION")))
            .build()
            .map(|client| Self { client })
            .map_err(|e| HttpError::Transport(format!("failed to build http client: {e}")))
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let timeout = request.timeout();
        let timeout_ms = request.timeout_ms;

        let mut builder = self.client.post(&request.url).timeout(timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.body(request.body).send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout(timeout_ms)
            } else if e.is_connect() {
                HttpError::Connect(e.to_string())
            } else {
                HttpError::Transport(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| HttpError::Transport(format!("failed to read response body: {e}")))?;

        Ok(HttpResponse { status, body })
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(self.send(request))
    }
}
