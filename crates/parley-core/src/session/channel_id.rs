/// Separator between the two participant ids of a channel id.
pub const CHANNEL_ID_SEPARATOR: &str = "-";

/// Deterministic channel id for a one-to-one conversation.
///
/// Both participants derive the same id regardless of who opens the chat.
pub fn derive_channel_id(self_id: &str, peer_id: &str) -> String {
    let mut pair = [self_id, peer_id];
    pair.sort_unstable();
    pair.join(CHANNEL_ID_SEPARATOR)
}
