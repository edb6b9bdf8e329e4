use crate::{Attachment, AudioBlob, FileUpload, MessagePayload, extension_for_mime};

/// WHAT: MIME types map to the expected file extensions
/// WHY: Uploaded voice messages must play back with the right container
#[test]
fn given_container_mime_types_when_mapping_then_extensions_match() {
    // Given
    let cases = [
        ("audio/webm;codecs=opus", "webm"),
        ("audio/mp4", "mp4"),
        ("audio/mpeg", "mp3"),
        ("audio/mp3", "mp3"),
        ("audio/ogg;codecs=opus", "ogg"),
        ("audio/wav", "wav"),
        ("application/octet-stream", "webm"),
    ];

    // When / Then
    for (mime_type, expected) in cases {
        assert_eq!(extension_for_mime(mime_type), expected, "{}", mime_type);
    }
}

/// WHAT: Voice message uploads are named from the timestamp and extension
/// WHY: File names are the only ordering hint the platform shows
#[test]
fn given_blob_when_packaging_upload_then_name_and_metadata_follow_blob() {
    // Given
    let blob = AudioBlob::new(vec![0; 10], "audio/ogg");

    // When
    let upload = FileUpload::voice_message(&blob, 1_700_000_000_123);

    // Then
    assert_eq!(upload.file_name, "voice-message-1700000000123.ogg");
    assert_eq!(upload.mime_type, "audio/ogg");
    assert_eq!(upload.bytes.len(), 10);
}

/// WHAT: Attachment payload serializes with the platform's field names
/// WHY: The platform renders audio players from `type: "audio"`
#[test]
#[allow(clippy::unwrap_used)]
fn given_audio_attachment_when_serializing_then_platform_fields_are_used() {
    // Given
    let upload = FileUpload::voice_message(&AudioBlob::new(vec![0; 42], "audio/webm"), 1);
    let payload = MessagePayload::text("🎤 Voice message")
        .with_attachment(Attachment::audio("https://cdn/x.webm", &upload));

    // When
    let json = serde_json::to_value(&payload).unwrap();

    // Then
    let attachment = &json["attachments"][0];
    assert_eq!(json["text"], "🎤 Voice message");
    assert_eq!(attachment["type"], "audio");
    assert_eq!(attachment["asset_url"], "https://cdn/x.webm");
    assert_eq!(attachment["title"], "Voice Message");
    assert_eq!(attachment["mime_type"], "audio/webm");
    assert_eq!(attachment["file_size"], 42);
}

/// WHAT: Text-only payloads omit the attachments field
/// WHY: Plain messages must look like ordinary chat text
#[test]
#[allow(clippy::unwrap_used)]
fn given_text_payload_when_serializing_then_attachments_are_omitted() {
    // Given
    let payload = MessagePayload::text("hello");

    // When
    let json = serde_json::to_value(&payload).unwrap();

    // Then
    assert!(json.get("attachments").is_none());
}
