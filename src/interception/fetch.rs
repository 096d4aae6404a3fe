// src/interception/fetch.rs
//! Resilient HTTP client
//!
//! Wraps an HTTP transport so that, from the caller's perspective, requests
//! never surface as failures: transport errors and non-2xx statuses are
//! rewritten into synthetic successes per the shared policy. The only
//! exceptions are login-flagged URLs, whose failures must stay real.

use crate::interception::payloads::MockPayloadProvider;
use crate::interception::policy::{self, Decision, FailureKind, UrlPolicy};
use crate::interception::response::{ClientResponse, SyntheticResponse};
use crate::utils::config::ShimConfig;
use crate::utils::errors::{Result, ShimError};
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::CONTENT_TYPE;
use hyper::{Method, Request};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// A completed round trip, owned
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl From<RawResponse> for ClientResponse {
    fn from(raw: RawResponse) -> Self {
        ClientResponse {
            status: raw.status,
            status_text: raw.status_text,
            content_type: raw.content_type,
            body: raw.body,
            synthetic: false,
        }
    }
}

/// Transport seam; the production implementation speaks HTTP via hyper
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, method: Method, url: &str, body: Option<Bytes>) -> Result<RawResponse>;
}

/// hyper-util backed transport
pub struct HyperTransport {
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HyperTransport {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();
        Self { client }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HyperTransport {
    async fn send(&self, method: Method, url: &str, body: Option<Bytes>) -> Result<RawResponse> {
        let uri: hyper::Uri = url.parse()?;

        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(body.unwrap_or_default()))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| ShimError::Transport(e.to_string()))?;

        let (parts, body) = response.into_parts();
        let content_type = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = body
            .collect()
            .await
            .map_err(|e| ShimError::Transport(e.to_string()))?
            .to_bytes();

        Ok(RawResponse {
            status: parts.status.as_u16(),
            status_text: parts
                .status
                .canonical_reason()
                .unwrap_or_default()
                .to_string(),
            content_type,
            body,
        })
    }
}

/// HTTP client that absorbs failures
///
/// Callers opt in by constructing the wrapped client; nothing global is
/// patched. Concurrent requests are fully independent.
pub struct ResilientClient {
    transport: Arc<dyn Transport>,
    payloads: MockPayloadProvider,
    policy: UrlPolicy,
    base_url: String,
    timeout: Duration,
}

impl ResilientClient {
    /// Client over the production hyper transport
    pub fn new(config: &ShimConfig) -> Self {
        Self::with_transport(config, Arc::new(HyperTransport::new()))
    }

    /// Client over a caller-supplied transport
    pub fn with_transport(config: &ShimConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            payloads: MockPayloadProvider::new(),
            policy: UrlPolicy::from_config(config),
            base_url: config.base_url.clone(),
            timeout: config.request_timeout(),
        }
    }

    /// Issue a request
    ///
    /// Resolves to a 2xx `ClientResponse` for every URL except login-flagged
    /// ones, whose transport errors propagate verbatim and whose completed
    /// failures raise [`ShimError::LoginHandoff`].
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<Bytes>,
    ) -> Result<ClientResponse> {
        let target = self.resolve(url);
        debug!(%method, url = %target, "dispatching request");
        metrics::counter!("netshim_requests_total").increment(1);

        let outcome = tokio::time::timeout(
            self.timeout,
            self.transport.send(method, &target, body),
        )
        .await;

        let raw = match outcome {
            // Timeout drops the in-flight request, aborting it
            Err(_elapsed) => {
                let timeout_ms = self.timeout.as_millis() as u64;
                warn!(url = %target, timeout_ms, "request timed out");
                return self.on_transport_failure(&target, ShimError::Timeout(timeout_ms));
            }
            Ok(Err(err)) => return self.on_transport_failure(&target, err),
            Ok(Ok(raw)) => raw,
        };

        if (200..300).contains(&raw.status) {
            return Ok(ClientResponse::from(raw));
        }
        self.on_http_failure(&target, raw)
    }

    /// GET convenience wrapper
    pub async fn get(&self, url: &str) -> Result<ClientResponse> {
        self.execute(Method::GET, url, None).await
    }

    /// POST convenience wrapper
    pub async fn post(&self, url: &str, body: Bytes) -> Result<ClientResponse> {
        self.execute(Method::POST, url, Some(body)).await
    }

    fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}{}", self.base_url.trim_end_matches('/'), url)
        }
    }

    fn on_transport_failure(&self, url: &str, err: ShimError) -> Result<ClientResponse> {
        let class = self.policy.classify(url);
        match policy::decide(class, FailureKind::Transport) {
            Decision::SynthesizeModule => {
                debug!(url, "replacing failed module asset with empty module");
                metrics::counter!("netshim_synthetic_responses_total").increment(1);
                Ok(ClientResponse::from_synthetic(SyntheticResponse::empty_module()))
            }
            Decision::SynthesizeJson => {
                warn!(url, error = %err, "transport failure rewritten to synthetic success");
                metrics::counter!("netshim_synthetic_responses_total").increment(1);
                let payload = self.payloads.payload_for(url);
                Ok(ClientResponse::from_synthetic(SyntheticResponse::json(&payload)))
            }
            Decision::PropagateError | Decision::LoginHandoff => {
                debug!(url, "login request failure passes through");
                metrics::counter!("netshim_login_passthrough_total").increment(1);
                Err(err)
            }
        }
    }

    fn on_http_failure(&self, url: &str, raw: RawResponse) -> Result<ClientResponse> {
        let class = self.policy.classify(url);
        match policy::decide(class, FailureKind::HttpStatus(raw.status)) {
            Decision::LoginHandoff => {
                debug!(url, status = raw.status, "login failure handed to mock auth");
                metrics::counter!("netshim_login_passthrough_total").increment(1);
                Err(ShimError::LoginHandoff { status: raw.status })
            }
            _ => {
                warn!(url, status = raw.status, "failure status rewritten to synthetic success");
                metrics::counter!("netshim_synthetic_responses_total").increment(1);
                let payload = self.payloads.payload_for(url);
                Ok(ClientResponse::from_synthetic(SyntheticResponse::json(&payload)))
            }
        }
    }
}
