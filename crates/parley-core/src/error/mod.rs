use error_location::ErrorLocation;
use thiserror::Error;

/// Chat session and voice pipeline errors with source location tracking.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Microphone access was denied or no input device is available.
    #[error("Microphone unavailable: {reason} {location}")]
    Permission {
        /// Description of the capture failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Session bootstrap gave up after exhausting its retry budget.
    #[error("Could not connect after {attempts} attempts: {reason} {location}")]
    Connection {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// Failure reported by the last attempt.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No capability-valid channel could be resolved.
    #[error("Chat channel unavailable {location}")]
    ChannelUnavailable {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Attachment upload failed for one delivery tier.
    #[error("Upload failed: {reason} {location}")]
    Upload {
        /// Description of the upload failure.
        reason: String,
        /// Whether the failure carries the broken URI handling signature.
        incompatible_uri: bool,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Sending the message itself failed.
    #[error("Send failed: {reason} {location}")]
    Send {
        /// Description of the send failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Recording finished without any audio data.
    #[error("No audio captured {location}")]
    NoAudioCaptured {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Operation not valid in the current recorder state.
    #[error("Invalid recorder state: {reason} {location}")]
    InvalidState {
        /// Description of the rejected transition.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Text message was empty after trimming.
    #[error("Message is empty {location}")]
    EmptyMessage {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed after the stream was acquired.
    #[error("Audio device error: {reason} {location}")]
    Device {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl ChatError {
    /// Whether the error is an upload failure caused by broken URI handling.
    pub fn is_incompatible_uri(&self) -> bool {
        matches!(
            self,
            ChatError::Upload {
                incompatible_uri: true,
                ..
            }
        )
    }
}

/// Result type alias using [`ChatError`].
pub type Result<T> = std::result::Result<T, ChatError>;
