//! Voice message delivery with tiered fallback.
//!
//! Strategies run in order against a single resolved channel. Each failure is
//! handed to the next strategy so it can decide whether it applies; only the
//! failure of the last applicable tier reaches the caller.

use crate::{
    ChatError, CoreResult,
    channel::{ChannelHandle, FileUpload},
    delivery::{
        AttemptOutcome, DeliveryAttempt, DeliveryReceipt, DeliveryStrategy, default_strategies,
    },
    media::AudioBlob,
    notify::{LoadingGuard, Notifier},
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tracing::{error, info, instrument, warn};

const SENDING_MESSAGE: &str = "Sending voice message...";
const SENT_MESSAGE: &str = "Voice message sent!";
const CHANNEL_UNAVAILABLE_MESSAGE: &str = "Cannot send voice message. Please try again later.";

/// Successful delivery plus the tiers tried along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    /// What was delivered.
    pub receipt: DeliveryReceipt,
    /// Every tier that ran, in order.
    pub attempts: Vec<DeliveryAttempt>,
}

/// Ordered delivery strategies over one channel.
pub struct DeliveryPipeline {
    strategies: Vec<Box<dyn DeliveryStrategy>>,
    notifier: Arc<dyn Notifier>,
}

impl DeliveryPipeline {
    /// Pipeline with the primary, direct and text-only tiers.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self::with_strategies(default_strategies(), notifier)
    }

    /// Pipeline with custom tiers, tried in the given order.
    pub fn with_strategies(
        strategies: Vec<Box<dyn DeliveryStrategy>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            strategies,
            notifier,
        }
    }

    /// Deliver `blob` through `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::ChannelUnavailable`] without a channel and
    /// [`ChatError::Send`] once every applicable tier has failed. Both are
    /// reported to the user.
    #[instrument(skip_all, fields(size = blob.len(), mime_type = %blob.mime_type()))]
    pub async fn send(
        &self,
        blob: &AudioBlob,
        channel: Option<&ChannelHandle>,
    ) -> CoreResult<DeliveryOutcome> {
        let Some(channel) = channel else {
            error!("No channel available for voice message");
            self.notifier.error(CHANNEL_UNAVAILABLE_MESSAGE);
            return Err(ChatError::ChannelUnavailable {
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let loading = LoadingGuard::show(&self.notifier, SENDING_MESSAGE);
        let upload = FileUpload::voice_message(blob, chrono::Utc::now().timestamp_millis());

        match self.run_tiers(&upload, channel).await {
            Ok(outcome) => {
                info!(
                    channel_id = %channel.id(),
                    tier = ?outcome.receipt.tier,
                    attempts = outcome.attempts.len(),
                    "Voice message delivered"
                );
                loading.finish_success(SENT_MESSAGE);
                Ok(outcome)
            }
            Err(e) => {
                let reason = failure_reason(&e);
                error!(channel_id = %channel.id(), error = %e, "Voice message delivery failed");
                loading.finish_error(&format!("Failed to send voice message: {}", reason));

                Err(ChatError::Send {
                    reason,
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }

    async fn run_tiers(
        &self,
        upload: &FileUpload,
        channel: &ChannelHandle,
    ) -> CoreResult<DeliveryOutcome> {
        let mut attempts: Vec<DeliveryAttempt> = Vec::new();
        let mut last_error: Option<ChatError> = None;

        for strategy in &self.strategies {
            let tier = strategy.tier();

            if !strategy.applies_to(channel, last_error.as_ref()) {
                continue;
            }

            match strategy.deliver(upload, channel).await {
                Ok(receipt) => {
                    attempts.push(DeliveryAttempt {
                        channel_id: Some(channel.id().to_string()),
                        strategy: tier,
                        outcome: AttemptOutcome::Success,
                    });
                    return Ok(DeliveryOutcome { receipt, attempts });
                }
                Err(e) => {
                    warn!(?tier, error = %e, "Delivery tier failed");
                    attempts.push(DeliveryAttempt {
                        channel_id: Some(channel.id().to_string()),
                        strategy: tier,
                        outcome: AttemptOutcome::Retryable,
                    });
                    last_error = Some(e);
                }
            }
        }

        if let Some(last) = attempts.last_mut() {
            last.outcome = AttemptOutcome::Fatal;
        }

        Err(last_error.unwrap_or_else(|| ChatError::Send {
            reason: "no delivery tier applies to this channel".to_string(),
            location: ErrorLocation::from(Location::caller()),
        }))
    }
}

fn failure_reason(e: &ChatError) -> String {
    match e {
        ChatError::Upload { reason, .. } | ChatError::Send { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}
