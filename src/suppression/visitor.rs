// src/suppression/visitor.rs
//! Message extraction for log events
//!
//! A `tracing::field::Visit` implementation that captures only the event's
//! `message` field, which is all the suppression rules look at.

use std::fmt;
use tracing::field::{Field, Visit};

/// Visitor capturing the formatted `message` field of an event
#[derive(Debug, Default)]
pub(crate) struct MessageVisitor {
    message: Option<String>,
}

impl MessageVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        }
    }
}
