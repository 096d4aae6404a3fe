// src/events/detail.rs
//! Event detail payloads
//!
//! Detail payloads are optional and leniently parsed: publishers may attach
//! arbitrary JSON, and anything that does not fit the schema degrades to
//! `None` instead of failing. Subscribers must tolerate an absent detail.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Detail for `patientUpdated`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientDetail {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Detail for `appointmentCreated`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDetail {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub patient_id: Option<i64>,
    #[serde(default)]
    pub doctor_id: Option<i64>,
    #[serde(default)]
    pub scheduled_for: Option<DateTime<Utc>>,
}

/// Detail for `server-error` and `network-error`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
}

/// Parse a raw detail value, degrading to `None` on any mismatch
pub fn parse_detail<T: DeserializeOwned>(value: Option<Value>) -> Option<T> {
    value.and_then(|v| serde_json::from_value(v).ok())
}
