// src/interception/install.rs
//! One-time shim installation
//!
//! The resilience layer is a process-wide singleton built once at
//! application bootstrap and never torn down. Installation is idempotent:
//! later calls, including ones with a different configuration, return the
//! first handle unchanged.

use crate::events::EventBus;
use crate::interception::fetch::{HyperTransport, ResilientClient, Transport};
use crate::interception::xhr::CallbackRequest;
use crate::suppression::rules::SuppressionRules;
use crate::utils::config::ShimConfig;
use hyper::Method;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::info;

static SHIM: OnceCell<Shim> = OnceCell::new();

/// The installed resilience layer
pub struct Shim {
    config: ShimConfig,
    transport: Arc<dyn Transport>,
    client: ResilientClient,
    rules: Arc<SuppressionRules>,
    bus: EventBus,
}

impl Shim {
    fn build(config: ShimConfig) -> Self {
        let rules = if config.suppress_noise {
            Arc::new(SuppressionRules::new())
        } else {
            Arc::new(SuppressionRules::empty())
        };
        Self::build_with_rules(config, rules)
    }

    fn build_with_rules(config: ShimConfig, rules: Arc<SuppressionRules>) -> Self {
        let transport: Arc<dyn Transport> = Arc::new(HyperTransport::new());
        let client = ResilientClient::with_transport(&config, Arc::clone(&transport));
        let bus = EventBus::with_rules(config.event_bus_capacity, Arc::clone(&rules));

        Self {
            config,
            transport,
            client,
            rules,
            bus,
        }
    }

    /// The wrapped HTTP client
    pub fn client(&self) -> &ResilientClient {
        &self.client
    }

    /// The dashboard event bus
    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    /// The shared suppression rules
    pub fn rules(&self) -> &Arc<SuppressionRules> {
        &self.rules
    }

    /// The effective configuration
    pub fn config(&self) -> &ShimConfig {
        &self.config
    }

    /// Prepare a callback-style request over the shared transport
    pub fn open_request(&self, method: Method, url: impl Into<String>) -> CallbackRequest {
        CallbackRequest::open(Arc::clone(&self.transport), &self.config, method, url)
    }
}

/// Install the resilience layer, or return the already-installed handle
///
/// Builds its own rule set from `suppress_noise`; when the log filter is
/// already up, prefer [`install_with_rules`] with the set returned by
/// `observability::init_tracing` so markers registered on either side are
/// seen by both.
pub fn install(config: ShimConfig) -> &'static Shim {
    SHIM.get_or_init(|| {
        info!(
            base_url = %config.base_url,
            timeout_ms = config.request_timeout_ms,
            "installing network resilience layer"
        );
        Shim::build(config)
    })
}

/// Install the resilience layer over an existing suppression rule set
pub fn install_with_rules(config: ShimConfig, rules: Arc<SuppressionRules>) -> &'static Shim {
    SHIM.get_or_init(|| {
        info!(
            base_url = %config.base_url,
            timeout_ms = config.request_timeout_ms,
            "installing network resilience layer"
        );
        Shim::build_with_rules(config, rules)
    })
}

/// The installed handle, if any
pub fn installed() -> Option<&'static Shim> {
    SHIM.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{DashboardEvent, ErrorDetail};

    #[tokio::test]
    async fn test_disabled_suppression_delivers_noise_events() {
        let shim = Shim::build(ShimConfig {
            suppress_noise: false,
            ..ShimConfig::default()
        });
        let mut sub = shim.events().subscribe();

        let delivered = shim
            .events()
            .publish(DashboardEvent::NetworkError(Some(ErrorDetail {
                message: Some("Failed to fetch".to_string()),
                url: Some("/api/patients".to_string()),
                status: None,
            })));
        assert!(delivered);
        assert_eq!(sub.recv().await.unwrap().event.name(), "network-error");
    }

    #[tokio::test]
    async fn test_shared_rules_reach_the_bus() {
        let rules = Arc::new(SuppressionRules::empty());
        let shim = Shim::build_with_rules(ShimConfig::default(), Arc::clone(&rules));
        assert!(Arc::ptr_eq(shim.rules(), &rules));

        // A marker registered on the shared set is honored by the bus
        rules.add_marker("flaky poller");
        let delivered = shim
            .events()
            .publish(DashboardEvent::ServerError(Some(ErrorDetail {
                message: Some("flaky poller gave up".to_string()),
                url: None,
                status: None,
            })));
        assert!(!delivered);
    }

    #[test]
    fn test_install_is_idempotent() {
        let first = install(ShimConfig::default());
        let again = install(ShimConfig {
            request_timeout_ms: 1,
            ..ShimConfig::default()
        });

        assert!(std::ptr::eq(first, again));
        // The second configuration was not applied
        assert_eq!(again.config().request_timeout_ms, first.config().request_timeout_ms);
        assert!(installed().is_some());
    }

    #[tokio::test]
    async fn test_installed_handle_serves_requests() {
        let shim = install(ShimConfig::default());
        // Whether or not anything listens on the default base URL, a
        // non-login request must resolve to a success.
        let response = shim.client().get("/api/patients").await.unwrap();
        assert!(response.is_success());
    }
}
