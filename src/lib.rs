// src/lib.rs
//! Clinic dashboard network resilience layer
//!
//! Keeps the clinic administration dashboard usable when its REST backend
//! is flaky or absent: failed API calls are rewritten into synthetic
//! successful responses before application code observes them, known
//! network-failure noise is dropped from the logs, and cross-component
//! signaling goes through a typed event bus.
//!
//! # Architecture
//!
//! - **interception**: wrapped HTTP client + callback adapter, shared
//!   rewrite policy, canned payload rules, idempotent installation
//! - **suppression**: log noise rules and the tracing filter built on them
//! - **events**: typed publish/subscribe bus for dashboard events
//! - **observability**: tracing bootstrap and counter names
//! - **utils**: configuration and error types
//!
//! The one deliberate hole in the "everything succeeds" illusion is login:
//! transport failures on login-flagged URLs propagate verbatim, and
//! completed login failures raise a distinct handoff error for the mock
//! authentication service.

// Public module exports
pub mod events;
pub mod interception;
pub mod observability;
pub mod suppression;
pub mod utils;

// Re-export commonly used types
pub use events::{DashboardEvent, EventBus};
pub use interception::{
    install, install_with_rules, installed, CallbackRequest, ClientResponse, ResilientClient,
};
pub use suppression::{NoiseFilter, SuppressionRules};
pub use utils::config::ShimConfig;
pub use utils::errors::{Result, ShimError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
