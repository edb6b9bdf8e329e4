use parley_core::UserProfile;

use serde::{Deserialize, Serialize};

/// Local user identity presented when connecting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Platform user id.
    pub user_id: String,
    /// Display name shown to peers.
    pub display_name: String,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Platform API key.
    pub api_key: String,
    /// Token authenticating `user_id`.
    pub token: String,
}

impl IdentityConfig {
    /// Profile sent with the connect request.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.user_id.clone(),
            name: self.display_name.clone(),
            image: self.image.clone(),
        }
    }
}
