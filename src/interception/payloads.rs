// src/interception/payloads.rs
//! Canned payload selection for synthesized responses
//!
//! Maps a URL to a JSON payload by ordered substring rules; the first
//! matching rule wins and a generic success envelope is the fallback.
//! Pure and deterministic: the same URL always yields the same payload.

use serde_json::{json, Value};
use tracing::debug;

type PayloadFactory = fn() -> Value;

/// One substring rule
struct PayloadRule {
    pattern: &'static str,
    factory: PayloadFactory,
}

/// Ordered substring-to-payload table
pub struct MockPayloadProvider {
    rules: Vec<PayloadRule>,
}

impl MockPayloadProvider {
    /// Build the table in its fixed priority order
    pub fn new() -> Self {
        Self {
            rules: vec![
                PayloadRule { pattern: "register", factory: register_payload },
                PayloadRule { pattern: "patient", factory: patients_payload },
                PayloadRule { pattern: "doctor", factory: doctors_payload },
                PayloadRule { pattern: "appointment", factory: appointments_payload },
                PayloadRule { pattern: "medicine", factory: medicines_payload },
                PayloadRule { pattern: "inventory", factory: medicines_payload },
            ],
        }
    }

    /// Select the payload for a URL; never fails
    pub fn payload_for(&self, url: &str) -> Value {
        for rule in &self.rules {
            if url.contains(rule.pattern) {
                debug!(pattern = rule.pattern, url, "selected canned payload");
                return (rule.factory)();
            }
        }
        debug!(url, "no payload rule matched, using default envelope");
        default_payload()
    }

    /// The pattern that would be used for a URL, if any
    pub fn matched_pattern(&self, url: &str) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|rule| url.contains(rule.pattern))
            .map(|rule| rule.pattern)
    }
}

impl Default for MockPayloadProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Fallback envelope for unmatched URLs
pub fn default_payload() -> Value {
    json!({ "success": true, "data": [], "intercepted": true })
}

/// Fixed body used when the callback-style adapter rewrites a failure
pub fn xhr_intercepted_payload() -> Value {
    json!({
        "success": true,
        "data": [],
        "message": "Mock response - XHR error intercepted"
    })
}

fn patients_payload() -> Value {
    json!({
        "success": true,
        "data": [
            {
                "id": 1,
                "name": "John Doe",
                "age": 45,
                "gender": "male",
                "phone": "555-0101",
                "blood_group": "O+",
                "admitted": false
            },
            {
                "id": 2,
                "name": "Jane Smith",
                "age": 38,
                "gender": "female",
                "phone": "555-0102",
                "blood_group": "A-",
                "admitted": true
            },
            {
                "id": 3,
                "name": "Robert Miles",
                "age": 61,
                "gender": "male",
                "phone": "555-0103",
                "blood_group": "B+",
                "admitted": false
            }
        ]
    })
}

fn doctors_payload() -> Value {
    json!({
        "success": true,
        "data": [
            {
                "id": 1,
                "name": "Dr. Sarah Chen",
                "specialty": "Cardiology",
                "phone": "555-0201",
                "available": true
            },
            {
                "id": 2,
                "name": "Dr. Amit Verma",
                "specialty": "Pediatrics",
                "phone": "555-0202",
                "available": false
            }
        ]
    })
}

fn appointments_payload() -> Value {
    json!({
        "success": true,
        "data": [
            {
                "id": 1,
                "patient_id": 1,
                "doctor_id": 2,
                "scheduled_for": "2025-01-15T09:30:00Z",
                "status": "confirmed"
            },
            {
                "id": 2,
                "patient_id": 3,
                "doctor_id": 1,
                "scheduled_for": "2025-01-15T11:00:00Z",
                "status": "pending"
            }
        ]
    })
}

fn medicines_payload() -> Value {
    json!({
        "success": true,
        "data": [
            { "id": 1, "name": "Amoxicillin 500mg", "stock": 320, "unit": "capsule" },
            { "id": 2, "name": "Ibuprofen 200mg", "stock": 940, "unit": "tablet" },
            { "id": 3, "name": "Saline 0.9%", "stock": 85, "unit": "bag" }
        ]
    })
}

fn register_payload() -> Value {
    json!({
        "success": true,
        "message": "Registration successful",
        "data": {
            "user": {
                "id": 1001,
                "name": "Demo User",
                "email": "demo.user@clinic.local",
                "role": "staff"
            },
            "token": "mock-session-token"
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_rule() {
        let provider = MockPayloadProvider::new();
        let payload = provider.payload_for("/api/patients");

        assert_eq!(payload["success"], json!(true));
        assert_eq!(payload["data"][0]["id"], json!(1));
        assert_eq!(payload["data"][0]["name"], json!("John Doe"));
    }

    #[test]
    fn test_doctor_rule() {
        let provider = MockPayloadProvider::new();
        let payload = provider.payload_for("http://localhost:8000/doctors?available=1");

        assert_eq!(payload["success"], json!(true));
        assert!(payload["data"].as_array().is_some_and(|d| !d.is_empty()));
    }

    #[test]
    fn test_register_rule_has_fabricated_user() {
        let provider = MockPayloadProvider::new();
        let payload = provider.payload_for("/auth/register");

        assert_eq!(payload["data"]["user"]["name"], json!("Demo User"));
        assert_eq!(payload["data"]["token"], json!("mock-session-token"));
    }

    #[test]
    fn test_default_envelope() {
        let provider = MockPayloadProvider::new();
        let payload = provider.payload_for("/api/billing/summary");

        assert_eq!(payload, default_payload());
        assert_eq!(payload["intercepted"], json!(true));
    }

    #[test]
    fn test_first_match_wins() {
        let provider = MockPayloadProvider::new();
        // "register" outranks "patient" in the rule order
        let url = "/api/patient/register";
        assert_eq!(provider.matched_pattern(url), Some("register"));
        assert_eq!(
            provider.payload_for(url)["message"],
            json!("Registration successful")
        );
    }

    #[test]
    fn test_inventory_aliases_medicines() {
        let provider = MockPayloadProvider::new();
        assert_eq!(
            provider.payload_for("/api/inventory"),
            provider.payload_for("/api/medicines")
        );
    }

    #[test]
    fn test_deterministic() {
        let provider = MockPayloadProvider::new();
        assert_eq!(
            provider.payload_for("/api/appointments"),
            provider.payload_for("/api/appointments")
        );
    }
}
