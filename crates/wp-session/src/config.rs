//! Session configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! records_endpoint   = "https://example.invalid/coldata"
//! fetch_timeout_ms   = 10000
//! geocode_timeout_ms = 5000
//! platform           = "ios"
//! navigation_label   = "Pickup"
//! subscribe_heading  = true
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::{Platform, SessionError, SessionResult};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// URL the address records are fetched from.  `None` for offline
    /// sessions that are handed a record source directly.
    pub records_endpoint: Option<String>,

    /// Upper bound on the record fetch.  `None` uses the HTTP client default.
    pub fetch_timeout_ms: Option<u64>,

    /// Upper bound on one geocoding call.  `None` waits indefinitely.
    pub geocode_timeout_ms: Option<u64>,

    /// Map URL scheme used for the navigation hand-off.
    pub platform: Platform,

    /// Label shown on the pin in the external map app.
    pub navigation_label: String,

    /// Subscribe to the heading sensor when the session is built.
    pub subscribe_heading: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            records_endpoint:   None,
            fetch_timeout_ms:   None,
            geocode_timeout_ms: None,
            platform:           Platform::default(),
            navigation_label:   "Destination".to_owned(),
            subscribe_heading:  true,
        }
    }
}

impl SessionConfig {
    pub fn from_toml_str(s: &str) -> SessionResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| SessionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> SessionResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SessionError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> SessionResult<()> {
        if let Some(endpoint) = &self.records_endpoint {
            if endpoint.trim().is_empty() {
                return Err(SessionError::Config("records_endpoint is empty".into()));
            }
        }
        if self.fetch_timeout_ms == Some(0) {
            return Err(SessionError::Config("fetch_timeout_ms must be positive".into()));
        }
        if self.geocode_timeout_ms == Some(0) {
            return Err(SessionError::Config("geocode_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    pub fn geocode_timeout(&self) -> Option<Duration> {
        self.geocode_timeout_ms.map(Duration::from_millis)
    }
}
