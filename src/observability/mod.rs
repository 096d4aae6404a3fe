// src/observability/mod.rs
//! Tracing bootstrap
//!
//! Wires the global subscriber: an env-filter for verbosity, a fmt layer
//! for output, and the noise filter attached to the fmt layer so known
//! network-failure noise never reaches the operator. Counters recorded
//! across the crate:
//!
//! - `netshim_requests_total`
//! - `netshim_synthetic_responses_total`
//! - `netshim_login_passthrough_total`
//! - `netshim_noise_suppressed_total`

use crate::suppression::filter::NoiseFilter;
use crate::suppression::rules::SuppressionRules;
use crate::utils::config::ShimConfig;
use crate::utils::errors::{Result, ShimError};
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Initialize the global subscriber
///
/// Honors `RUST_LOG`; when noise suppression is disabled in the
/// configuration, the filter is installed with an empty rule set so the
/// layer composition stays identical.
pub fn init_tracing(config: &ShimConfig) -> Result<Arc<SuppressionRules>> {
    let rules = if config.suppress_noise {
        Arc::new(SuppressionRules::new())
    } else {
        Arc::new(SuppressionRules::empty())
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_filter(NoiseFilter::with_rules(Arc::clone(&rules)));

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ShimError::RuntimeError(e.to_string()))?;

    Ok(rules)
}
