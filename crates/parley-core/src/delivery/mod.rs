mod pipeline;
mod strategy;
mod text;

pub use {
    pipeline::{DeliveryOutcome, DeliveryPipeline},
    strategy::{
        AttemptOutcome, DeliveryAttempt, DeliveryReceipt, DeliveryStrategy, DeliveryTier,
        DirectUpload, PrimaryUpload, TextOnlyNotice, VOICE_MESSAGE_FALLBACK_TEXT,
        VOICE_MESSAGE_TEXT, default_strategies,
    },
    text::{MessageComposer, TEXT_GRACE_WINDOW, TextRoute, TextSender},
};
