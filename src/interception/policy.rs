// src/interception/policy.rs
//! Shared failure-handling policy
//!
//! Every intercepted transport funnels its failures through the same two
//! steps: classify the URL, then map (class, failure kind) to a single
//! decision. The per-transport adapters only differ in how they apply the
//! decision, never in what the decision is.

use crate::utils::config::ShimConfig;

/// What kind of endpoint a URL addresses, for rewrite purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Bundler-served script asset (`.js`/`.jsx`/`.mjs` or cache-busted)
    ModuleAsset,

    /// Authentication endpoint; exempt from rewriting
    Login,

    /// Any other API endpoint
    Api,
}

/// How a request failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request never completed (DNS, refused, abort, timeout)
    Transport,

    /// The round trip completed with a non-2xx status
    HttpStatus(u16),
}

/// What an adapter must do with a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Replace with an empty, syntactically valid script module
    SynthesizeModule,

    /// Replace with a canned JSON success selected by the payload rules
    SynthesizeJson,

    /// Let the original transport error reach the caller unmodified
    PropagateError,

    /// Raise the distinct login handoff error for the mock auth service
    LoginHandoff,
}

/// URL classifier
///
/// The module-asset test runs before the login test: a login URL that is
/// also a script asset is treated as an asset.
#[derive(Debug, Clone)]
pub struct UrlPolicy {
    cache_bust_markers: Vec<String>,
    login_marker: String,
}

const MODULE_SUFFIXES: [&str; 3] = [".js", ".jsx", ".mjs"];

impl Default for UrlPolicy {
    fn default() -> Self {
        Self {
            cache_bust_markers: vec!["?t=".to_string(), "&t=".to_string()],
            login_marker: "login".to_string(),
        }
    }
}

impl UrlPolicy {
    /// Build a policy honoring the configured cache-bust marker
    pub fn from_config(config: &ShimConfig) -> Self {
        let mut policy = Self::default();
        if !config.cache_bust_marker.is_empty()
            && !policy
                .cache_bust_markers
                .contains(&config.cache_bust_marker)
        {
            policy.cache_bust_markers.push(config.cache_bust_marker.clone());
        }
        policy
    }

    /// Classify a URL; total and panic-free for any input string
    pub fn classify(&self, url: &str) -> RequestClass {
        if self.is_module_asset(url) {
            RequestClass::ModuleAsset
        } else if url.contains(&self.login_marker) {
            RequestClass::Login
        } else {
            RequestClass::Api
        }
    }

    /// Whether the URL looks like a bundler-served script asset
    pub fn is_module_asset(&self, url: &str) -> bool {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        MODULE_SUFFIXES.iter().any(|s| path.ends_with(s))
            || self.cache_bust_markers.iter().any(|m| url.contains(m.as_str()))
    }
}

/// Map a classified failure to a decision
///
/// 2xx responses never reach this function; adapters consult it only after
/// a transport error or a completed non-2xx round trip.
pub fn decide(class: RequestClass, failure: FailureKind) -> Decision {
    match (class, failure) {
        (RequestClass::ModuleAsset, FailureKind::Transport) => Decision::SynthesizeModule,
        (RequestClass::Login, FailureKind::Transport) => Decision::PropagateError,
        (RequestClass::Login, FailureKind::HttpStatus(_)) => Decision::LoginHandoff,
        (RequestClass::ModuleAsset, FailureKind::HttpStatus(_))
        | (RequestClass::Api, _) => Decision::SynthesizeJson,
    }
}
