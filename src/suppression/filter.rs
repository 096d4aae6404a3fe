// src/suppression/filter.rs
//! Log noise filter
//!
//! A per-layer `tracing_subscriber` filter that drops WARN/ERROR events
//! whose message matches the suppression rules. Unrelated messages and all
//! lower-severity events pass through unchanged. The filter itself never
//! panics: events without a message are passed through.

use crate::suppression::rules::SuppressionRules;
use crate::suppression::visitor::MessageVisitor;
use std::sync::Arc;
use tracing::{Level, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Filter};

/// Filter dropping known-noise WARN/ERROR events
#[derive(Clone)]
pub struct NoiseFilter {
    rules: Arc<SuppressionRules>,
}

impl NoiseFilter {
    /// Filter over the built-in rule tables
    pub fn new() -> Self {
        Self {
            rules: Arc::new(SuppressionRules::new()),
        }
    }

    /// Filter over a shared rule set
    pub fn with_rules(rules: Arc<SuppressionRules>) -> Self {
        Self { rules }
    }

    /// The shared rule set, for runtime marker registration
    pub fn rules(&self) -> &Arc<SuppressionRules> {
        &self.rules
    }
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Subscriber> Filter<S> for NoiseFilter {
    fn enabled(&self, _meta: &Metadata<'_>, _cx: &Context<'_, S>) -> bool {
        // Per-event decisions happen in event_enabled
        true
    }

    fn event_enabled(&self, event: &tracing::Event<'_>, _cx: &Context<'_, S>) -> bool {
        let level = *event.metadata().level();
        if level > Level::WARN {
            return true;
        }

        let mut visitor = MessageVisitor::new();
        event.record(&mut visitor);

        let suppress = self
            .rules
            .should_suppress(visitor.message(), Some(event.metadata().target()));
        if suppress {
            metrics::counter!("netshim_noise_suppressed_total").increment(1);
        }
        !suppress
    }
}
