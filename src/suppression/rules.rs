// src/suppression/rules.rs
//! Noise classification rules
//!
//! Substring tables identifying known network-failure noise: server error
//! indicators, fetch/transport error indicators, and dev-server asset
//! markers. Matching is defensive: absent text never panics and defaults
//! to pass-through.

use parking_lot::RwLock;

/// Server-side failure indicators
pub const SERVER_ERROR_MARKERS: &[&str] = &[
    "500 (Internal Server Error)",
    "Internal Server Error",
    "502 (Bad Gateway)",
    "503 (Service Unavailable)",
];

/// Transport failure indicators
pub const NETWORK_ERROR_MARKERS: &[&str] = &[
    "ERR_CONNECTION_REFUSED",
    "ECONNREFUSED",
    "Failed to fetch",
    "NetworkError when attempting to fetch resource",
    "fetch failed",
    "net::ERR",
    "Network Error",
];

/// Dev-server asset markers
pub const DEV_ASSET_MARKERS: &[&str] = &[
    "hot-update",
    "@vite",
    "@react-refresh",
    ".jsx?t=",
];

/// Message/origin substring rules deciding suppress vs. pass through
pub struct SuppressionRules {
    markers: RwLock<Vec<String>>,
}

impl SuppressionRules {
    /// Rules preloaded with the built-in marker tables
    pub fn new() -> Self {
        let markers = SERVER_ERROR_MARKERS
            .iter()
            .chain(NETWORK_ERROR_MARKERS)
            .chain(DEV_ASSET_MARKERS)
            .map(|m| m.to_string())
            .collect();
        Self {
            markers: RwLock::new(markers),
        }
    }

    /// Empty rule set; everything passes through
    pub fn empty() -> Self {
        Self {
            markers: RwLock::new(Vec::new()),
        }
    }

    /// Register an additional marker at runtime
    pub fn add_marker(&self, marker: impl Into<String>) {
        let marker = marker.into();
        if marker.is_empty() {
            return;
        }
        let mut markers = self.markers.write();
        if !markers.contains(&marker) {
            markers.push(marker);
        }
    }

    /// Whether a message (and/or its origin) matches any marker
    pub fn should_suppress(&self, message: Option<&str>, origin: Option<&str>) -> bool {
        let markers = self.markers.read();
        let matches = |text: Option<&str>| {
            text.map(|t| markers.iter().any(|m| t.contains(m.as_str())))
                .unwrap_or(false)
        };
        matches(message) || matches(origin)
    }

    /// Number of registered markers
    pub fn len(&self) -> usize {
        self.markers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.read().is_empty()
    }
}

impl Default for SuppressionRules {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_refused_is_noise() {
        let rules = SuppressionRules::new();
        assert!(rules.should_suppress(
            Some("GET http://localhost:8000/api/patients net::ERR_CONNECTION_REFUSED"),
            None
        ));
    }

    #[test]
    fn test_unrelated_message_passes() {
        let rules = SuppressionRules::new();
        assert!(!rules.should_suppress(Some("TypeError: x is not a function"), None));
    }

    #[test]
    fn test_absent_fields_pass() {
        let rules = SuppressionRules::new();
        assert!(!rules.should_suppress(None, None));
    }

    #[test]
    fn test_origin_alone_matches() {
        let rules = SuppressionRules::new();
        assert!(rules.should_suppress(None, Some("/src/App.jsx?t=1699999999")));
    }

    #[test]
    fn test_runtime_marker() {
        let rules = SuppressionRules::new();
        assert!(!rules.should_suppress(Some("legacy poller gave up"), None));

        rules.add_marker("legacy poller");
        assert!(rules.should_suppress(Some("legacy poller gave up"), None));
    }

    #[test]
    fn test_add_marker_dedups_and_ignores_empty() {
        let rules = SuppressionRules::empty();
        rules.add_marker("");
        assert!(rules.is_empty());

        rules.add_marker("boom");
        rules.add_marker("boom");
        assert_eq!(rules.len(), 1);
    }
}
