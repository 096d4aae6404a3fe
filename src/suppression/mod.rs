// src/suppression/mod.rs
//! Diagnostic noise suppression
//!
//! Hides known network-failure noise from operator-visible logs without
//! affecting program behavior:
//!
//! - **Rules**: substring tables for server errors, transport errors, and
//!   dev-server asset markers
//! - **Filter**: a `tracing_subscriber` per-layer filter dropping matching
//!   WARN/ERROR events
//!
//! The same rules are consulted by the event bus before fanning out
//! error-class dashboard events.

pub mod filter;
pub mod rules;
pub(crate) mod visitor;

pub use filter::NoiseFilter;
pub use rules::SuppressionRules;
