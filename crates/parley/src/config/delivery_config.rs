use crate::config::{DEFAULT_AUTO_SEND, default_auto_send};

use serde::{Deserialize, Serialize};

/// Voice message delivery behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Send as soon as the record key is released instead of keeping a preview.
    #[serde(default = "default_auto_send")]
    pub auto_send: bool,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            auto_send: DEFAULT_AUTO_SEND,
        }
    }
}
