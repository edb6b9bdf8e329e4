use crate::{
    ChatError, CoreResult,
    channel::{Attachment, ChannelHandle, FileUpload, MessagePayload, SdkError, UploadResponse},
};

use std::panic::Location;

use async_trait::async_trait;
use error_location::ErrorLocation;
use tracing::{debug, instrument};

/// Text sent alongside an attached voice message.
pub const VOICE_MESSAGE_TEXT: &str = "🎤 Voice message";

/// Text sent when no tier could attach the audio.
pub const VOICE_MESSAGE_FALLBACK_TEXT: &str = "🎤 Voice message (failed to attach audio file)";

/// Delivery tier, in fallback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryTier {
    /// Standard file upload then attachment message.
    Primary,
    /// Image upload path, used when file upload trips over URI handling.
    Direct,
    /// Text notice without the audio.
    TextOnly,
}

/// Result of one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Message delivered.
    Success,
    /// Failed; a later tier may still succeed.
    Retryable,
    /// Failed with no tier left to try.
    Fatal,
}

/// Record of one tier attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryAttempt {
    /// Channel the attempt targeted.
    pub channel_id: Option<String>,
    /// Tier that ran.
    pub strategy: DeliveryTier,
    /// What happened.
    pub outcome: AttemptOutcome,
}

/// What reached the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Tier that delivered.
    pub tier: DeliveryTier,
    /// Uploaded asset, absent for the text-only tier.
    pub asset_url: Option<String>,
    /// Platform message id.
    pub message_id: String,
}

/// One way of getting a voice message into a channel.
#[async_trait]
pub trait DeliveryStrategy: Send + Sync {
    /// Tier this strategy implements.
    fn tier(&self) -> DeliveryTier;

    /// Whether to run given the channel and the previous tier's failure.
    fn applies_to(&self, channel: &ChannelHandle, previous: Option<&ChatError>) -> bool;

    /// Deliver `upload` through `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Upload`] or [`ChatError::Send`] on failure.
    async fn deliver(&self, upload: &FileUpload, channel: &ChannelHandle)
    -> CoreResult<DeliveryReceipt>;
}

/// Tiers in fallback order.
pub fn default_strategies() -> Vec<Box<dyn DeliveryStrategy>> {
    vec![
        Box::new(PrimaryUpload),
        Box::new(DirectUpload),
        Box::new(TextOnlyNotice),
    ]
}

/// Upload through `send_file`, then post the attachment.
#[derive(Debug, Default)]
pub struct PrimaryUpload;

#[async_trait]
impl DeliveryStrategy for PrimaryUpload {
    fn tier(&self) -> DeliveryTier {
        DeliveryTier::Primary
    }

    fn applies_to(&self, channel: &ChannelHandle, _previous: Option<&ChatError>) -> bool {
        channel.can_upload_file()
    }

    #[instrument(skip_all, fields(channel_id = %channel.id(), file_name = %upload.file_name))]
    async fn deliver(
        &self,
        upload: &FileUpload,
        channel: &ChannelHandle,
    ) -> CoreResult<DeliveryReceipt> {
        let response = channel.channel().send_file(upload.clone()).await;
        let asset_url = uploaded_url(response)?;

        debug!(asset_url = %asset_url, "File uploaded");

        send_attachment(channel, upload, asset_url, DeliveryTier::Primary).await
    }
}

/// Upload through `send_image`, for channels whose file upload path is broken.
#[derive(Debug, Default)]
pub struct DirectUpload;

#[async_trait]
impl DeliveryStrategy for DirectUpload {
    fn tier(&self) -> DeliveryTier {
        DeliveryTier::Direct
    }

    fn applies_to(&self, _channel: &ChannelHandle, previous: Option<&ChatError>) -> bool {
        previous.is_some_and(ChatError::is_incompatible_uri)
    }

    #[instrument(skip_all, fields(channel_id = %channel.id(), file_name = %upload.file_name))]
    async fn deliver(
        &self,
        upload: &FileUpload,
        channel: &ChannelHandle,
    ) -> CoreResult<DeliveryReceipt> {
        if !channel.can_upload_image() {
            return Err(ChatError::Upload {
                reason: "Cannot upload audio: incompatible channel object".to_string(),
                incompatible_uri: false,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let response = channel.channel().send_image(upload.clone()).await;
        let asset_url = uploaded_url(response)?;

        debug!(asset_url = %asset_url, "Audio uploaded through image path");

        send_attachment(channel, upload, asset_url, DeliveryTier::Direct).await
    }
}

/// Post a text notice when the audio could not be attached.
#[derive(Debug, Default)]
pub struct TextOnlyNotice;

#[async_trait]
impl DeliveryStrategy for TextOnlyNotice {
    fn tier(&self) -> DeliveryTier {
        DeliveryTier::TextOnly
    }

    fn applies_to(&self, channel: &ChannelHandle, _previous: Option<&ChatError>) -> bool {
        channel.can_send_message()
    }

    #[instrument(skip_all, fields(channel_id = %channel.id()))]
    async fn deliver(
        &self,
        _upload: &FileUpload,
        channel: &ChannelHandle,
    ) -> CoreResult<DeliveryReceipt> {
        let receipt = channel
            .channel()
            .send_message(MessagePayload::text(VOICE_MESSAGE_FALLBACK_TEXT))
            .await
            .map_err(send_error)?;

        Ok(DeliveryReceipt {
            tier: DeliveryTier::TextOnly,
            asset_url: None,
            message_id: receipt.message_id,
        })
    }
}

#[track_caller]
fn uploaded_url(response: Result<UploadResponse, SdkError>) -> CoreResult<String> {
    match response {
        Ok(UploadResponse { file }) if !file.is_empty() => Ok(file),
        Ok(_) => Err(ChatError::Upload {
            reason: "Upload returned no file URL".to_string(),
            incompatible_uri: false,
            location: ErrorLocation::from(Location::caller()),
        }),
        Err(e) => Err(ChatError::Upload {
            incompatible_uri: e.has_uri_split_signature(),
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}

async fn send_attachment(
    channel: &ChannelHandle,
    upload: &FileUpload,
    asset_url: String,
    tier: DeliveryTier,
) -> CoreResult<DeliveryReceipt> {
    let payload = MessagePayload::text(VOICE_MESSAGE_TEXT)
        .with_attachment(Attachment::audio(asset_url.clone(), upload));

    let receipt = channel
        .channel()
        .send_message(payload)
        .await
        .map_err(send_error)?;

    Ok(DeliveryReceipt {
        tier,
        asset_url: Some(asset_url),
        message_id: receipt.message_id,
    })
}

#[track_caller]
fn send_error(e: SdkError) -> ChatError {
    ChatError::Send {
        reason: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}
