// src/events/mod.rs
//! Cross-component event signaling
//!
//! A typed publish/subscribe bus for the dashboard events
//! (`patientUpdated`, `appointmentCreated`, `server-error`,
//! `network-error`) with optional, leniently parsed detail payloads.

pub mod bus;
pub mod detail;

pub use bus::{DashboardEvent, Envelope, EventBus, Subscription};
pub use detail::{AppointmentDetail, ErrorDetail, PatientDetail};
