use crate::{
    ChatError, CoreResult,
    channel::{CALL_ROUTE_PREFIX, ChannelHandle, MessagePayload},
};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{info, instrument};

/// Kind of call to start from a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Camera and microphone.
    Video,
    /// Microphone only.
    Voice,
}

impl CallKind {
    fn label(self) -> &'static str {
        match self {
            CallKind::Video => "video",
            CallKind::Voice => "voice",
        }
    }
}

/// URL of the call screen for a channel.
///
/// The call screen uses the chat channel id as its call id; voice calls add
/// `?audio=true` so the camera stays off.
pub fn call_url(origin: &str, channel_id: &str, kind: CallKind) -> String {
    let origin = origin.trim_end_matches('/');

    match kind {
        CallKind::Video => format!("{}{}{}", origin, CALL_ROUTE_PREFIX, channel_id),
        CallKind::Voice => format!("{}{}{}?audio=true", origin, CALL_ROUTE_PREFIX, channel_id),
    }
}

/// Post a call invitation to the channel and return the call URL.
///
/// # Errors
///
/// Returns [`ChatError::Send`] if the channel cannot send messages or the send
/// fails.
#[instrument(skip(channel), fields(channel_id = %channel.id()))]
pub async fn send_call_invite(
    channel: &ChannelHandle,
    origin: &str,
    kind: CallKind,
) -> CoreResult<String> {
    if !channel.can_send_message() {
        return Err(ChatError::Send {
            reason: "channel cannot send messages".to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let url = call_url(origin, channel.id(), kind);
    let text = format!("I've started a {} call. Join me here: {}", kind.label(), url);

    channel
        .channel()
        .send_message(MessagePayload::text(text))
        .await
        .map_err(|e| ChatError::Send {
            reason: format!("Failed to send call invite: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!(url = %url, kind = kind.label(), "Call invite sent");

    Ok(url)
}
