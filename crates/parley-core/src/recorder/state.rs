use crate::media::{AudioBlob, IDLE_LEVELS, Levels};

use uuid::Uuid;

/// Lifecycle state of a voice recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    /// No recording in progress.
    #[default]
    Idle,
    /// Microphone held and audio being captured.
    Recording,
    /// Recording finished; blob awaiting send or discard.
    Previewing,
}

/// The single live recording of a recorder instance.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSession {
    pub(crate) state: RecordingState,
    pub(crate) session_id: Option<Uuid>,
    pub(crate) elapsed_seconds: u64,
    pub(crate) audio_blob: Option<AudioBlob>,
    pub(crate) amplitude_levels: Levels,
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self {
            state: RecordingState::Idle,
            session_id: None,
            elapsed_seconds: 0,
            audio_blob: None,
            amplitude_levels: IDLE_LEVELS,
        }
    }
}

impl RecordingSession {
    /// Current lifecycle state.
    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// Log correlation id, present from start until reset.
    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    /// Whole seconds recorded so far.
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Finished recording, present while previewing.
    pub fn audio_blob(&self) -> Option<&AudioBlob> {
        self.audio_blob.as_ref()
    }

    /// Latest bar levels.
    pub fn amplitude_levels(&self) -> Levels {
        self.amplitude_levels
    }

    /// Elapsed time as `m:ss`.
    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed_seconds)
    }

    pub(crate) fn begin(&mut self, session_id: Uuid) {
        *self = Self {
            state: RecordingState::Recording,
            session_id: Some(session_id),
            ..Self::default()
        };
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether `session_id` is the live recording.
    pub(crate) fn is_recording(&self, session_id: Uuid) -> bool {
        self.state == RecordingState::Recording && self.session_id == Some(session_id)
    }
}

/// Format whole seconds as `m:ss`.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
