use crate::{
    Capabilities, ChannelHandle, SdkError,
    tests::support::{MockChannel, URI_SPLIT_ERROR},
};

use std::sync::Arc;

/// WHAT: Capability sets map onto the typed handle variants
/// WHY: Call sites rely on the variant instead of probing for operations
#[test]
fn given_capability_sets_when_classifying_then_matching_variant_is_returned() {
    // Given
    let full = MockChannel::full("full");
    let upload_only = Arc::new(MockChannel::new("upload").with_capabilities(Capabilities {
        send_message: false,
        send_file: true,
        send_image: false,
    }));
    let message_only = Arc::new(MockChannel::new("message").with_capabilities(Capabilities {
        send_message: true,
        send_file: false,
        send_image: false,
    }));
    let inert = Arc::new(MockChannel::new("inert").with_capabilities(Capabilities::default()));

    // When
    let full = ChannelHandle::classify(full);
    let upload_only = ChannelHandle::classify(upload_only);
    let message_only = ChannelHandle::classify(message_only);
    let inert = ChannelHandle::classify(inert);

    // Then
    assert!(matches!(full, Some(ChannelHandle::Full(_))));
    assert!(matches!(upload_only, Some(ChannelHandle::UploadOnly(_))));
    assert!(matches!(message_only, Some(ChannelHandle::MessageOnly(_))));
    assert!(inert.is_none());
}

/// WHAT: Capability helpers reflect the variant and the image flag
/// WHY: Delivery tiers decide applicability from these helpers alone
#[test]
#[allow(clippy::unwrap_used)]
fn given_full_channel_with_image_upload_when_querying_then_all_capabilities_reported() {
    // Given
    let channel = Arc::new(MockChannel::new("c").with_capabilities(Capabilities {
        send_message: true,
        send_file: true,
        send_image: true,
    }));

    // When
    let handle = ChannelHandle::classify(channel).unwrap();

    // Then
    assert!(handle.is_full());
    assert!(handle.can_send_message());
    assert!(handle.can_upload_file());
    assert!(handle.can_upload_image());
    assert_eq!(handle.id(), "c");
    assert_eq!(format!("{:?}", handle), "Full(\"c\")");
}

/// WHAT: Every broken URI signature is recognised, other failures are not
/// WHY: Only the signature unlocks the image upload tier
#[test]
fn given_sdk_errors_when_checking_uri_signature_then_only_split_failures_match() {
    // Given
    let matching = [
        SdkError::failed(URI_SPLIT_ERROR),
        SdkError::failed("split is not a function"),
        SdkError::failed("e.split is not a function at upload"),
    ];
    let other = [
        SdkError::failed("network error"),
        SdkError::Unsupported {
            operation: "send_file",
        },
    ];

    // When / Then
    assert!(matching.iter().all(SdkError::has_uri_split_signature));
    assert!(!other.iter().any(SdkError::has_uri_split_signature));
}
