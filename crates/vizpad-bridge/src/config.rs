//! Bridge configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::routes::EventRoutes;

fn default_host_origin() -> String {
    "app://vizpad".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

/// Bridge construction parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Origin the host page runs on; always trusted
    #[serde(default = "default_host_origin")]
    pub host_origin: String,
    /// Origins trusted from the start; more can be added at runtime
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Request timeout when the caller does not pass one
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
    /// Event route tables
    #[serde(default)]
    pub routes: EventRoutes,
}

impl BridgeConfig {
    /// Default request timeout as a `Duration`
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host_origin: default_host_origin(),
            allowed_origins: Vec::new(),
            default_timeout_ms: default_timeout_ms(),
            routes: EventRoutes::default(),
        }
    }
}
