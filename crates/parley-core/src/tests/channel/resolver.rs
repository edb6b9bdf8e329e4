use crate::{
    Capabilities, ChannelRef, ChannelResolver, ClientRef, ConnectionState,
    tests::support::{MockChannel, MockClient, as_channel_ref},
};

use std::sync::Arc;

fn message_only(id: &str) -> Arc<MockChannel> {
    Arc::new(MockChannel::new(id).with_capabilities(Capabilities {
        send_message: true,
        send_file: false,
        send_image: false,
    }))
}

fn state_with(direct: Option<ChannelRef>, scoped: Option<ChannelRef>) -> Arc<ConnectionState> {
    let state = Arc::new(ConnectionState::new());
    state.write(|slots| {
        slots.direct_channel = direct;
        slots.client_active_channel = scoped;
    });
    state
}

/// WHAT: A capability-invalid explicit channel falls through to the direct slot
/// WHY: Partially initialized channel objects must not block delivery
#[test]
#[allow(clippy::unwrap_used)]
fn given_invalid_explicit_and_valid_direct_when_resolving_then_direct_is_returned() {
    // Given
    let explicit = message_only("explicit");
    let direct = MockChannel::full("direct");
    let resolver = ChannelResolver::new(state_with(Some(as_channel_ref(&direct)), None));

    // When
    let handle = resolver.resolve(Some(as_channel_ref(&explicit))).unwrap();

    // Then
    assert_eq!(handle.id(), "direct");
    assert!(handle.is_full());
}

/// WHAT: A valid explicit channel wins over discovered ones
/// WHY: The host's own channel is the most specific candidate
#[test]
#[allow(clippy::unwrap_used)]
fn given_valid_explicit_when_resolving_then_explicit_is_returned() {
    // Given
    let explicit = MockChannel::full("explicit");
    let direct = MockChannel::full("direct");
    let resolver = ChannelResolver::new(state_with(Some(as_channel_ref(&direct)), None));

    // When
    let handle = resolver.resolve(Some(as_channel_ref(&explicit))).unwrap();

    // Then
    assert_eq!(handle.id(), "explicit");
}

/// WHAT: The client-scoped slot is used when the direct slot is invalid
/// WHY: Either discovery slot may hold the only usable reference
#[test]
#[allow(clippy::unwrap_used)]
fn given_invalid_direct_and_valid_scoped_when_resolving_then_scoped_is_returned() {
    // Given
    let direct = message_only("direct");
    let scoped = MockChannel::full("scoped");
    let resolver = ChannelResolver::new(state_with(
        Some(as_channel_ref(&direct)),
        Some(as_channel_ref(&scoped)),
    ));

    // When
    let handle = resolver.resolve(None).unwrap();

    // Then
    assert_eq!(handle.id(), "scoped");
}

/// WHAT: The route's channel id is rebuilt against the cached client
/// WHY: A reload can lose every reference except the URL
#[test]
#[allow(clippy::unwrap_used)]
fn given_only_route_and_client_when_resolving_then_channel_is_rebuilt() {
    // Given
    let client = Arc::new(MockClient::new());
    let state = Arc::new(ConnectionState::new());
    let client_ref: ClientRef = client.clone();
    state.write(|slots| slots.client = Some(client_ref));
    let resolver = ChannelResolver::new(state).with_route("/chat/alice-bob");

    // When
    let handle = resolver.resolve(None).unwrap();

    // Then
    assert_eq!(handle.id(), "alice-bob");
    let requests = client.channel_requests.lock().unwrap();
    assert_eq!(requests[0].0, "messaging");
    assert_eq!(requests[0].1, "alice-bob");
}

/// WHAT: Without a client the route is not enough
/// WHY: Rebuilding needs a live connection; callers must see "no channel"
#[test]
fn given_route_without_client_when_resolving_then_none_is_returned() {
    // Given
    let resolver =
        ChannelResolver::new(Arc::new(ConnectionState::new())).with_route("/chat/alice-bob");

    // When
    let handle = resolver.resolve(None);

    // Then
    assert!(handle.is_none());
}

/// WHAT: Text resolution accepts message-only channels that voice rejects
/// WHY: Text needs only message send
#[test]
#[allow(clippy::unwrap_used)]
fn given_message_only_direct_when_resolving_for_text_then_it_is_accepted() {
    // Given
    let direct = message_only("direct");
    let resolver = ChannelResolver::new(state_with(Some(as_channel_ref(&direct)), None));

    // When
    let voice = resolver.resolve(None);
    let text = resolver.resolve_for_text(None).unwrap();

    // Then
    assert!(voice.is_none());
    assert_eq!(text.id(), "direct");
}
