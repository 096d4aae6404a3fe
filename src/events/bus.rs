// src/events/bus.rs
//! Typed dashboard event bus
//!
//! Publish/subscribe channel for cross-component signaling, replacing the
//! unstructured ambient event dispatch of the original dashboard with a
//! typed schema per event name and an explicit subscription lifecycle.
//! Error-class events are checked against the suppression rules before
//! fanout.

use crate::events::detail::{
    parse_detail, AppointmentDetail, ErrorDetail, PatientDetail,
};
use crate::suppression::rules::SuppressionRules;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;
use ulid::Ulid;

/// Dashboard events and their optional detail payloads
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    PatientUpdated(Option<PatientDetail>),
    AppointmentCreated(Option<AppointmentDetail>),
    ServerError(Option<ErrorDetail>),
    NetworkError(Option<ErrorDetail>),
}

impl DashboardEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            DashboardEvent::PatientUpdated(_) => "patientUpdated",
            DashboardEvent::AppointmentCreated(_) => "appointmentCreated",
            DashboardEvent::ServerError(_) => "server-error",
            DashboardEvent::NetworkError(_) => "network-error",
        }
    }

    /// Build an event from a wire name and a raw detail value
    ///
    /// Unknown names yield `None`; a malformed detail yields the event with
    /// an absent detail, never an error.
    pub fn from_raw(name: &str, detail: Option<Value>) -> Option<Self> {
        match name {
            "patientUpdated" => Some(DashboardEvent::PatientUpdated(parse_detail(detail))),
            "appointmentCreated" => {
                Some(DashboardEvent::AppointmentCreated(parse_detail(detail)))
            }
            "server-error" => Some(DashboardEvent::ServerError(parse_detail(detail))),
            "network-error" => Some(DashboardEvent::NetworkError(parse_detail(detail))),
            _ => None,
        }
    }

    fn error_detail(&self) -> Option<&ErrorDetail> {
        match self {
            DashboardEvent::ServerError(Some(d)) | DashboardEvent::NetworkError(Some(d)) => {
                Some(d)
            }
            _ => None,
        }
    }
}

/// A published event with identity and time
#[derive(Debug, Clone)]
pub struct Envelope {
    pub id: String,
    pub at: DateTime<Utc>,
    pub event: DashboardEvent,
}

/// Broadcast bus for dashboard events
pub struct EventBus {
    sender: broadcast::Sender<Envelope>,
    rules: Arc<SuppressionRules>,
}

impl EventBus {
    /// Bus with the built-in suppression rules
    pub fn new(capacity: usize) -> Self {
        Self::with_rules(capacity, Arc::new(SuppressionRules::new()))
    }

    /// Bus over a shared rule set
    pub fn with_rules(capacity: usize, rules: Arc<SuppressionRules>) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender, rules }
    }

    /// Publish an event; returns false when it was suppressed as noise
    ///
    /// Suppression applies only to error-class events whose detail matches
    /// the noise rules. Publishing with no live subscribers is not an error.
    pub fn publish(&self, event: DashboardEvent) -> bool {
        if let Some(detail) = event.error_detail() {
            if self
                .rules
                .should_suppress(detail.message.as_deref(), detail.url.as_deref())
            {
                debug!(event = event.name(), "suppressed noise event before fanout");
                metrics::counter!("netshim_noise_suppressed_total").increment(1);
                return false;
            }
        }

        let envelope = Envelope {
            id: Ulid::new().to_string(),
            at: Utc::now(),
            event,
        };
        debug!(event = envelope.event.name(), id = %envelope.id, "publishing event");
        let _ = self.sender.send(envelope);
        true
    }

    /// Subscribe; dropping the returned handle unsubscribes
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A live subscription to the bus
pub struct Subscription {
    receiver: broadcast::Receiver<Envelope>,
}

impl Subscription {
    /// Next event; `None` once the bus is gone
    ///
    /// A slow subscriber that missed events skips to the oldest retained
    /// one rather than erroring.
    pub async fn recv(&mut self) -> Option<Envelope> {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) => return Some(envelope),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "subscriber lagged, skipping missed events");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv)
    pub fn try_recv(&mut self) -> Option<Envelope> {
        loop {
            match self.receiver.try_recv() {
                Ok(envelope) => return Some(envelope),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}
