use crate::media::AudioBlob;

use serde::{Deserialize, Serialize};

/// Message body sent to a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePayload {
    /// Message text.
    pub text: String,
    /// Attached assets.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl MessagePayload {
    /// Plain text message.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    /// Add an attachment.
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// Attachment metadata referencing an uploaded asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Attachment kind (`audio`, `image`, `video`, `file`).
    #[serde(rename = "type")]
    pub kind: String,
    /// URL of the uploaded asset.
    pub asset_url: String,
    /// Display title.
    pub title: String,
    /// MIME type of the asset.
    pub mime_type: String,
    /// Size in bytes.
    pub file_size: u64,
}

impl Attachment {
    /// Audio attachment for an uploaded voice message.
    pub fn audio(asset_url: impl Into<String>, upload: &FileUpload) -> Self {
        Self {
            kind: "audio".to_string(),
            asset_url: asset_url.into(),
            title: "Voice Message".to_string(),
            mime_type: upload.mime_type.clone(),
            file_size: upload.bytes.len() as u64,
        }
    }
}

/// A named file handed to an upload operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// File name presented to the platform.
    pub file_name: String,
    /// MIME type of the content.
    pub mime_type: String,
    /// File content.
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Package a recorded blob as `voice-message-<millis>.<ext>`.
    pub fn voice_message(blob: &AudioBlob, timestamp_millis: i64) -> Self {
        let mime_type = blob.mime_type().to_string();
        let extension = extension_for_mime(&mime_type);

        Self {
            file_name: format!("voice-message-{}.{}", timestamp_millis, extension),
            mime_type,
            bytes: blob.bytes().to_vec(),
        }
    }
}

/// File extension for an audio container MIME type. Unknown types map to `webm`.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    if mime_type.contains("mp4") {
        "mp4"
    } else if mime_type.contains("mp3") || mime_type.contains("mpeg") {
        "mp3"
    } else if mime_type.contains("ogg") {
        "ogg"
    } else if mime_type.contains("wav") {
        "wav"
    } else {
        "webm"
    }
}

/// Response of an upload operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// URL of the stored asset.
    pub file: String,
}

/// Acknowledgement of a sent message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReceipt {
    /// Platform message identifier.
    pub message_id: String,
}
