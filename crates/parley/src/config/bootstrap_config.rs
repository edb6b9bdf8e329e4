use crate::config::{default_max_attempts, default_retry_delay_ms};

use std::time::Duration;

use parley_core::BootstrapSettings;
use serde::{Deserialize, Serialize};

/// Connection retry policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Connection attempts before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Pause between attempts.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl BootstrapConfig {
    /// Retry policy for the session bootstrap.
    pub fn settings(&self) -> BootstrapSettings {
        BootstrapSettings {
            max_attempts: self.max_attempts,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}
