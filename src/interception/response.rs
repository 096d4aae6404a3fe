// src/interception/response.rs
//! Response value types
//!
//! Synthesized replacements are modeled as immutable values constructed
//! fresh per intercepted failure, never as mutations of a live response.

use bytes::Bytes;
use serde_json::Value;

pub const EMPTY_MODULE_BODY: &str = "export default {};\n";

/// A fabricated success-shaped response
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticResponse {
    pub status: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: Bytes,
}

impl SyntheticResponse {
    /// JSON success carrying the given payload
    pub fn json(payload: &Value) -> Self {
        let body = serde_json::to_vec(payload).unwrap_or_else(|_| b"{}".to_vec());
        Self {
            status: 200,
            status_text: "OK",
            content_type: "application/json",
            body: Bytes::from(body),
        }
    }

    /// Empty, syntactically valid script module
    pub fn empty_module() -> Self {
        Self {
            status: 200,
            status_text: "OK",
            content_type: "application/javascript",
            body: Bytes::from_static(EMPTY_MODULE_BODY.as_bytes()),
        }
    }
}

/// What callers of the wrapped client observe
///
/// Either a genuine 2xx round trip (`synthetic == false`) or a fabricated
/// success (`synthetic == true`); the flag is the only way to tell them
/// apart.
#[derive(Debug, Clone)]
pub struct ClientResponse {
    pub status: u16,
    pub status_text: String,
    pub content_type: Option<String>,
    pub body: Bytes,
    pub synthetic: bool,
}

impl ClientResponse {
    pub fn from_synthetic(synth: SyntheticResponse) -> Self {
        Self {
            status: synth.status,
            status_text: synth.status_text.to_string(),
            content_type: Some(synth.content_type.to_string()),
            body: synth.body,
            synthetic: true,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, lossily
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON, if it is JSON
    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }
}
