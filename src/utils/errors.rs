// src/utils/errors.rs
//! Error types for the resilience layer

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, ShimError>;

/// Errors surfaced by the resilience layer
///
/// Only `LoginHandoff` and `Transport`/`Timeout` on login-flagged URLs are
/// ever visible to callers of the wrapped client; every other failure is
/// absorbed and rewritten into a synthetic success.
#[derive(Debug, Error)]
pub enum ShimError {
    /// The request never completed (DNS failure, connection refused, abort)
    #[error("transport failure: {0}")]
    Transport(String),

    /// The per-request timeout expired and the in-flight request was aborted
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// A login request completed with a failure status; handled by the
    /// mock authentication service, not by this layer
    #[error("login request returned {status} - pass to MockAuthService")]
    LoginHandoff { status: u16 },

    /// Configuration loading or validation failed
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Subscriber or runtime bootstrap failed
    #[error("runtime error: {0}")]
    RuntimeError(String),

    /// Request construction failed
    #[error("http error: {0}")]
    Http(#[from] hyper::http::Error),

    /// The request URL could not be parsed
    #[error("invalid uri: {0}")]
    InvalidUri(#[from] hyper::http::uri::InvalidUri),
}

impl ShimError {
    /// True for failures that never reached the server
    pub fn is_transport(&self) -> bool {
        matches!(self, ShimError::Transport(_) | ShimError::Timeout(_))
    }

    /// True for the login carve-out raised on completed failure responses
    pub fn is_login_handoff(&self) -> bool {
        matches!(self, ShimError::LoginHandoff { .. })
    }
}
