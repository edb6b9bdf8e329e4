use crate::{
    Capabilities, ChannelRef, ChannelResolver, ChatError, ConnectionState, MessageComposer,
    TEXT_GRACE_WINDOW, TextRoute, TextSender,
    tests::support::{MockChannel, MockComposer, RecordingNotifier, as_channel_ref},
};

use std::sync::{Arc, atomic::Ordering};

fn sender(state: Arc<ConnectionState>) -> (TextSender, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    (
        TextSender::new(ChannelResolver::new(state), notifier.clone()),
        notifier,
    )
}

/// WHAT: Whitespace-only drafts are rejected before any send
/// WHY: Empty chat bubbles are never useful
#[tokio::test]
async fn given_blank_draft_when_sending_then_empty_message_error() {
    // Given
    let channel = MockChannel::full("alice-bob");
    let composer = MockComposer::new("   ");
    let (sender, notifier) = sender(Arc::new(ConnectionState::new()));

    // When
    let result = sender.send(&composer, Some(as_channel_ref(&channel))).await;

    // Then
    assert!(matches!(result, Err(ChatError::EmptyMessage { .. })));
    assert_eq!(notifier.errors(), vec!["Please enter a message".to_string()]);
    assert_eq!(composer.submit_calls.load(Ordering::SeqCst), 0);
}

/// WHAT: A submit handler that clears the draft needs no direct send
/// WHY: Sending twice would duplicate the message
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_working_submit_when_sending_then_submitted_without_direct_send() {
    // Given
    let channel = MockChannel::full("alice-bob");
    let composer = MockComposer::new("hola");
    let (sender, _) = sender(Arc::new(ConnectionState::new()));

    // When
    let route = sender
        .send(&composer, Some(as_channel_ref(&channel)))
        .await
        .unwrap();

    // Then
    assert_eq!(route, TextRoute::Submitted);
    assert_eq!(channel.message_calls.load(Ordering::SeqCst), 0);
}

/// WHAT: A draft still present after the grace window is sent directly
/// WHY: Silent submit failures must not lose the message
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_stuck_submit_when_grace_window_passes_then_direct_send_clears_draft() {
    // Given
    let channel = MockChannel::full("alice-bob");
    let composer = MockComposer::new("hola").stuck();
    let (sender, _) = sender(Arc::new(ConnectionState::new()));
    let started = tokio::time::Instant::now();

    // When
    let route = sender
        .send(&composer, Some(as_channel_ref(&channel)))
        .await
        .unwrap();

    // Then
    assert_eq!(route, TextRoute::Direct);
    assert!(started.elapsed() >= TEXT_GRACE_WINDOW);
    assert_eq!(channel.sent()[0].text, "hola");
    assert!(composer.text().is_empty());
}

/// WHAT: A throwing submit handler falls back to a direct send immediately
/// WHY: There is no point waiting for a handler that already failed
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_failing_submit_when_sending_then_direct_send_without_grace() {
    // Given
    let channel = MockChannel::full("alice-bob");
    let composer = MockComposer::new("hola").failing_submit("handler threw");
    let (sender, _) = sender(Arc::new(ConnectionState::new()));
    let started = tokio::time::Instant::now();

    // When
    let route = sender
        .send(&composer, Some(as_channel_ref(&channel)))
        .await
        .unwrap();

    // Then
    assert_eq!(route, TextRoute::Direct);
    assert!(started.elapsed() < TEXT_GRACE_WINDOW);
    assert_eq!(channel.sent().len(), 1);
}

/// WHAT: Without a context channel a discovered message-capable channel is used
/// WHY: The composer can mount before the channel context is ready
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_no_context_channel_when_sending_then_shared_channel_is_used() {
    // Given
    let shared = Arc::new(MockChannel::new("alice-bob").with_capabilities(Capabilities {
        send_message: true,
        send_file: false,
        send_image: false,
    }));
    let state = Arc::new(ConnectionState::new());
    let shared_ref: ChannelRef = shared.clone();
    state.write(|slots| slots.direct_channel = Some(shared_ref));
    let composer = MockComposer::new("hola");
    let (sender, _) = sender(state);

    // When
    let route = sender.send(&composer, None).await.unwrap();

    // Then
    assert_eq!(route, TextRoute::Direct);
    assert_eq!(shared.sent()[0].text, "hola");
    assert_eq!(composer.submit_calls.load(Ordering::SeqCst), 0);
    assert!(composer.text().is_empty());
}

/// WHAT: No channel anywhere reports the connection as unavailable
/// WHY: The user needs to know a refresh is required
#[tokio::test]
async fn given_no_channel_anywhere_when_sending_then_channel_unavailable() {
    // Given
    let composer = MockComposer::new("hola");
    let (sender, notifier) = sender(Arc::new(ConnectionState::new()));

    // When
    let result = sender.send(&composer, None).await;

    // Then
    assert!(matches!(result, Err(ChatError::ChannelUnavailable { .. })));
    assert_eq!(
        notifier.errors(),
        vec!["Chat connection unavailable. Please refresh the page.".to_string()]
    );
    assert_eq!(composer.text(), "hola");
}

/// WHAT: A failing direct send keeps the draft and notifies
/// WHY: The user can retry without retyping
#[tokio::test]
async fn given_failing_direct_send_when_sending_then_send_error_and_draft_kept() {
    // Given
    let channel = Arc::new(MockChannel::new("alice-bob").failing_message("socket closed"));
    let composer = MockComposer::new("hola").failing_submit("handler threw");
    let (sender, notifier) = sender(Arc::new(ConnectionState::new()));

    // When
    let result = sender.send(&composer, Some(as_channel_ref(&channel))).await;

    // Then
    assert!(matches!(result, Err(ChatError::Send { .. })));
    assert_eq!(notifier.errors(), vec!["Failed to send message".to_string()]);
    assert_eq!(composer.text(), "hola");
}
