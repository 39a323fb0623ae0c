//! HTTP transport used by the hub client.
//!
//! The client builds fully-resolved [`HubRequest`]s and hands them to a
//! [`HubTransport`]. Production uses [`ReqwestTransport`]; tests substitute
//! a recording mock.

use std::fmt;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use nbgrader_core::config::hub::HubConfig;
use nbgrader_core::error::AppError;

use super::error::HubError;

/// A single authenticated request against the hub API.
#[derive(Clone, PartialEq)]
pub struct HubRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the API base, placeholders already substituted.
    pub path: String,
    /// Absolute request URL.
    pub url: String,
    /// API token for the `Authorization: token <..>` header.
    pub token: String,
    /// Optional JSON body.
    pub body: Option<Value>,
}

impl HubRequest {
    /// Value of the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("token {}", self.token)
    }
}

impl fmt::Debug for HubRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("url", &self.url)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

/// Raw response from the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body text (may be empty).
    pub body: String,
}

impl HubResponse {
    /// Build a response from a status and JSON body.
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and returns the raw response.
///
/// Implementations perform exactly one bounded network exchange per call and
/// never retry. Only connection-level failures are errors; any HTTP status
/// is returned as a [`HubResponse`].
#[async_trait]
pub trait HubTransport: Send + Sync + fmt::Debug {
    /// Send the request.
    async fn send(&self, request: HubRequest) -> Result<HubResponse, HubError>;
}

/// [`HubTransport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with the configured timeouts.
    pub fn new(config: &HubConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HubTransport for ReqwestTransport {
    async fn send(&self, request: HubRequest) -> Result<HubResponse, HubError> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .header(reqwest::header::AUTHORIZATION, request.authorization());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let transport_error = |e: reqwest::Error| HubError::Transport {
            path: request.path.clone(),
            message: e.to_string(),
        };

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        debug!(method = %request.method, path = %request.path, status, "Hub API call");

        Ok(HubResponse { status, body })
    }
}
