use crate::{
    CallKind, ChannelHandle, ChatError, call_url, send_call_invite,
    tests::support::MockChannel,
};

use std::sync::Arc;

/// WHAT: Call URLs reuse the chat channel id and flag voice-only calls
/// WHY: The call screen joins the call named after the conversation
#[test]
fn given_channel_id_when_building_call_urls_then_kind_selects_query() {
    // Given
    let origin = "https://parley.example/";

    // When
    let video = call_url(origin, "alice-bob", CallKind::Video);
    let voice = call_url(origin, "alice-bob", CallKind::Voice);

    // Then
    assert_eq!(video, "https://parley.example/call/alice-bob");
    assert_eq!(voice, "https://parley.example/call/alice-bob?audio=true");
}

/// WHAT: Inviting posts the join link into the channel
/// WHY: The peer joins from the chat message
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_full_channel_when_inviting_then_link_message_is_sent() {
    // Given
    let channel = MockChannel::full("alice-bob");
    let handle = ChannelHandle::classify(channel.clone()).unwrap();

    // When
    let url = send_call_invite(&handle, "https://parley.example", CallKind::Video)
        .await
        .unwrap();

    // Then
    assert_eq!(url, "https://parley.example/call/alice-bob");
    let sent = channel.sent();
    assert_eq!(
        sent[0].text,
        "I've started a video call. Join me here: https://parley.example/call/alice-bob"
    );
}

/// WHAT: A failing send surfaces as a send error
/// WHY: The host must not open a call nobody was told about
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_failing_channel_when_inviting_then_send_error_is_returned() {
    // Given
    let channel = Arc::new(MockChannel::new("alice-bob").failing_message("offline"));
    let handle = ChannelHandle::classify(channel).unwrap();

    // When
    let result = send_call_invite(&handle, "https://parley.example", CallKind::Voice).await;

    // Then
    assert!(matches!(result, Err(ChatError::Send { .. })));
}
