//! Hydra administrative API configuration.

use serde::{Deserialize, Serialize};

/// Settings for talking to Hydra's administrative API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HydraConfig {
    /// Base URL of the administrative API.
    pub admin_url: String,
    /// Per-request timeout; zero disables it.
    pub http_timeout_seconds: u64,
    /// How long Hydra remembers a completed login.
    pub login_remember_for_seconds: i64,
    /// How long Hydra remembers a granted consent.
    pub consent_remember_for_seconds: i64,
}

impl Default for HydraConfig {
    fn default() -> Self {
        Self {
            admin_url: "http://localhost:4445".to_string(),
            http_timeout_seconds: 30,
            login_remember_for_seconds: 30,
            consent_remember_for_seconds: 3600,
        }
    }
}

impl HydraConfig {
    pub fn new(admin_url: impl Into<String>) -> Self {
        Self {
            admin_url: admin_url.into(),
            ..Self::default()
        }
    }

    pub fn with_http_timeout(mut self, seconds: u64) -> Self {
        self.http_timeout_seconds = seconds;
        self
    }

    pub fn with_login_remember_for(mut self, seconds: i64) -> Self {
        self.login_remember_for_seconds = seconds;
        self
    }

    pub fn with_consent_remember_for(mut self, seconds: i64) -> Self {
        self.consent_remember_for_seconds = seconds;
        self
    }
}
