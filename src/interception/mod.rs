// src/interception/mod.rs
//! Request interception layer
//!
//! Guarantees that HTTP calls made through the wrapped transports never
//! surface as failures to callers, with a deliberate carve-out for login
//! requests:
//!
//! - **Policy**: shared URL classification and failure-to-decision mapping
//! - **Fetch**: async client wrapper with timeout and rewrite-on-failure
//! - **Xhr**: callback-style adapter rewriting snapshots before `on_load`
//! - **Payloads**: ordered substring rules selecting canned JSON bodies
//! - **Response**: immutable synthetic/client response value types
//! - **Install**: idempotent process-wide bootstrap
//!
//! # Architecture
//!
//! ```text
//! Dashboard Code
//!     │
//!     ├─ async call ──→ ResilientClient ──┐
//!     │                                   ├─→ policy::classify + decide
//!     └─ callbacks ───→ CallbackRequest ──┘        │
//!                                   ┌──────────────┼──────────────┐
//!                              2xx: genuine   synthetic 200   login: real
//!                              response      (payload rules)    failure
//! ```

pub mod fetch;
pub mod install;
pub mod payloads;
pub mod policy;
pub mod response;
pub mod xhr;

// Re-export commonly used types
pub use fetch::{HyperTransport, RawResponse, ResilientClient, Transport};
pub use install::{install, install_with_rules, installed, Shim};
pub use payloads::MockPayloadProvider;
pub use policy::{Decision, FailureKind, RequestClass, UrlPolicy};
pub use response::{ClientResponse, SyntheticResponse};
pub use xhr::{CallbackRequest, XhrSnapshot};
