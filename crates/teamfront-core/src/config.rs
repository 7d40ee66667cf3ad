#![forbid(unsafe_code)]

//! Serializable watcher settings.
//!
//! Lets a host keep lazy-load tuning in JSON next to the rest of its page
//! configuration:
//!
//! ```json
//! { "enabled": true, "root_margin": "200px 0px", "threshold": 0.25 }
//! ```
//!
//! Every key is optional; unknown keys are rejected.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::visibility::{ObservationRequest, OnIntersect, RootMargin, Threshold};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    pub enabled: bool,
    pub root_margin: RootMargin,
    pub threshold: Threshold,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            root_margin: RootMargin::default(),
            threshold: Threshold::ZERO,
        }
    }
}

impl WatchConfig {
    /// Parse and validate settings from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Build a request carrying these settings and `on_intersect`.
    #[must_use]
    pub fn request(&self, on_intersect: OnIntersect) -> ObservationRequest {
        ObservationRequest::from_callback(on_intersect)
            .with_enabled(self.enabled)
            .with_root_margin(self.root_margin)
            .with_threshold(self.threshold)
    }
}
