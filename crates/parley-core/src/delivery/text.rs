use crate::{
    ChatError, CoreResult,
    channel::{ChannelHandle, ChannelRef, ChannelResolver, MessagePayload, SdkError},
    notify::Notifier,
};

use std::{panic::Location, sync::Arc, time::Duration};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// How long the composer gets to clear itself before a direct send.
pub const TEXT_GRACE_WINDOW: Duration = Duration::from_millis(300);

const EMPTY_MESSAGE: &str = "Please enter a message";
const UNAVAILABLE_MESSAGE: &str = "Chat connection unavailable. Please refresh the page.";
const SEND_FAILED_MESSAGE: &str = "Failed to send message";

/// Text input owned by the chat UI.
#[async_trait]
pub trait MessageComposer: Send + Sync {
    /// Current draft.
    fn text(&self) -> String;

    /// Clear the draft.
    fn clear(&self);

    /// Hand the draft to the UI's own submit handler, which clears the draft
    /// once it has sent it.
    async fn submit(&self) -> Result<(), SdkError>;
}

/// Path that delivered a text message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRoute {
    /// The composer's submit handler sent it.
    Submitted,
    /// Sent directly through the channel.
    Direct,
}

/// Two-tier text sending: composer submit first, then a direct channel send.
pub struct TextSender {
    resolver: ChannelResolver,
    notifier: Arc<dyn Notifier>,
    grace: Duration,
}

impl TextSender {
    /// Create a sender with the default grace window.
    pub fn new(resolver: ChannelResolver, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            resolver,
            notifier,
            grace: TEXT_GRACE_WINDOW,
        }
    }

    /// Override the grace window.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Send the composer's draft.
    ///
    /// Without a `channel`, falls back to any discovered channel that can send
    /// messages and sends directly through it.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::EmptyMessage`], [`ChatError::ChannelUnavailable`]
    /// or [`ChatError::Send`]; each is reported to the user.
    #[instrument(skip_all)]
    pub async fn send(
        &self,
        composer: &dyn MessageComposer,
        channel: Option<ChannelRef>,
    ) -> CoreResult<TextRoute> {
        let text = composer.text();

        if text.trim().is_empty() {
            self.notifier.error(EMPTY_MESSAGE);
            return Err(ChatError::EmptyMessage {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let Some(channel) = channel else {
            warn!("No channel in context, resolving shared channel");

            let Some(handle) = self.resolver.resolve_for_text(None) else {
                self.notifier.error(UNAVAILABLE_MESSAGE);
                return Err(ChatError::ChannelUnavailable {
                    location: ErrorLocation::from(Location::caller()),
                });
            };

            return self.send_direct(composer, &handle, text).await;
        };

        let Some(handle) = ChannelHandle::classify(channel).filter(ChannelHandle::can_send_message)
        else {
            self.notifier.error(UNAVAILABLE_MESSAGE);
            return Err(ChatError::ChannelUnavailable {
                location: ErrorLocation::from(Location::caller()),
            });
        };

        if let Err(e) = composer.submit().await {
            warn!(error = %e, "Composer submit failed, sending directly");
            return self.send_direct(composer, &handle, text).await;
        }

        tokio::time::sleep(self.grace).await;

        if composer.text().is_empty() {
            debug!("Composer cleared by submit handler");
            return Ok(TextRoute::Submitted);
        }

        info!("Composer still holds text after grace window, sending directly");
        self.send_direct(composer, &handle, text).await
    }

    async fn send_direct(
        &self,
        composer: &dyn MessageComposer,
        handle: &ChannelHandle,
        text: String,
    ) -> CoreResult<TextRoute> {
        match handle.channel().send_message(MessagePayload::text(text)).await {
            Ok(receipt) => {
                composer.clear();
                debug!(message_id = %receipt.message_id, "Message sent directly");
                Ok(TextRoute::Direct)
            }
            Err(e) => {
                error!(channel_id = %handle.id(), error = %e, "Direct send failed");
                self.notifier.error(SEND_FAILED_MESSAGE);
                Err(ChatError::Send {
                    reason: e.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }
}
