//! Parley Core Library
//!
//! Realtime chat session bootstrap and voice message pipeline: a gesture
//! driven recorder, live level visualization, channel discovery, and tiered
//! delivery that tolerates partially initialized channel objects.
//!
//! # Example
//!
//! ```no_run
//! use parley_core::{
//!     ChannelResolver, ConnectionState, CoreResult, CpalCapture, DeliveryPipeline,
//!     GestureController, LogNotifier, Notifier, RecordingStateMachine, VoiceRecorder,
//! };
//!
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier::new());
//!     let state = Arc::new(ConnectionState::new());
//!
//!     let mut recorder = VoiceRecorder::new(
//!         GestureController::default(),
//!         RecordingStateMachine::new(Arc::new(CpalCapture::new()), Arc::clone(&notifier)),
//!         ChannelResolver::new(state),
//!         DeliveryPipeline::new(Arc::clone(&notifier)),
//!         notifier,
//!     );
//!
//!     recorder.discard();
//!     Ok(())
//! }
//! ```

mod channel;
mod delivery;
mod error;
mod media;
mod notify;
mod recorder;
mod session;

pub use {
    channel::{
        Attachment, CALL_ROUTE_PREFIX, CHAT_ROUTE_PREFIX, Capabilities, ChannelHandle,
        ChannelRef, ChannelResolver, ChannelSource, ClientProvider, ClientRef, FileUpload,
        MESSAGING_CHANNEL_KIND, MessagePayload, MessageReceipt, MessagingChannel,
        MessagingClient, SdkError, URI_SPLIT_SIGNATURES, UploadResponse, UserProfile,
        channel_id_from_route, extension_for_mime,
    },
    delivery::{
        AttemptOutcome, DeliveryAttempt, DeliveryOutcome, DeliveryPipeline, DeliveryReceipt,
        DeliveryStrategy, DeliveryTier, DirectUpload, MessageComposer, PrimaryUpload,
        TEXT_GRACE_WINDOW, TextOnlyNotice, TextRoute, TextSender, VOICE_MESSAGE_FALLBACK_TEXT,
        VOICE_MESSAGE_TEXT, default_strategies,
    },
    error::{ChatError, Result as CoreResult},
    media::{
        ActiveCapture, AudioBlob, AudioConstraints, CpalCapture, IDLE_LEVELS, LevelAnalyzer,
        Levels, MediaCapture, PREFERRED_MIME_TYPES, SampleTap, WAV_MIME_TYPE,
        negotiate_mime_type,
    },
    notify::{LoadingGuard, LoadingToken, LogNotifier, Notifier},
    recorder::{
        ClickTarget, ELAPSED_TICK, FRAME_INTERVAL, GestureCommand, GestureController,
        GestureSettings, HOLD_THRESHOLD, PointerEvent, RecorderInput, RecordingSession,
        RecordingState, RecordingStateMachine, SWIPE_CANCEL_DISTANCE, VoiceRecorder,
        format_elapsed,
    },
    session::{
        BootstrapSettings, CHANNEL_ID_SEPARATOR, CONNECT_RETRY_DELAY, CallKind,
        ConnectionParams, ConnectionSnapshot, ConnectionState, MAX_CONNECT_ATTEMPTS,
        SessionBootstrap, call_url, derive_channel_id, send_call_invite,
    },
};

#[cfg(test)]
mod tests;
