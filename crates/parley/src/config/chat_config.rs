use crate::config::default_web_origin;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Conversation this client joins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// User id of the other participant.
    pub peer_id: String,
    /// Origin of the web client, used for call links.
    #[serde(default = "default_web_origin")]
    pub web_origin: String,
    /// Directory the local outbox writes channels into.
    pub outbox_dir: PathBuf,
}
