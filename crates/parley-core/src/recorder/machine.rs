//! Recording lifecycle: `Idle -> Recording -> Previewing -> Idle`, plus
//! `Recording -> Idle` on cancel.
//!
//! While recording, two background tasks run: a one-second elapsed counter
//! and a frame-rate visualization loop feeding [`RecordingSession`] levels.
//! Both are aborted on every exit from `Recording`, including drop.

use crate::{
    ChatError, CoreResult,
    media::{
        ActiveCapture, AudioBlob, AudioConstraints, LevelAnalyzer, MediaCapture, SampleTap,
        levels::FFT_SIZE, negotiate_mime_type,
    },
    notify::Notifier,
    recorder::{GestureCommand, RecordingSession, RecordingState},
};

use std::{
    panic::Location,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use error_location::ErrorLocation;
use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Elapsed counter resolution.
pub const ELAPSED_TICK: Duration = Duration::from_secs(1);

/// Visualization cadence (one animation frame).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

const PERMISSION_DENIED_MESSAGE: &str = "Could not access microphone. Please check permissions.";
const NO_AUDIO_MESSAGE: &str = "No audio was recorded. Please try again.";

struct ActiveRecording {
    session_id: Uuid,
    mime_type: String,
    capture: Box<dyn ActiveCapture>,
    ticker: JoinHandle<()>,
    visualizer: JoinHandle<()>,
}

impl ActiveRecording {
    fn stop_loops(&self) {
        self.ticker.abort();
        self.visualizer.abort();
    }
}

/// Owns the microphone and the single [`RecordingSession`] of a recorder.
pub struct RecordingStateMachine {
    capture: Arc<dyn MediaCapture>,
    notifier: Arc<dyn Notifier>,
    constraints: AudioConstraints,
    session: Arc<Mutex<RecordingSession>>,
    active: Option<ActiveRecording>,
}

impl RecordingStateMachine {
    /// Create an idle machine.
    pub fn new(capture: Arc<dyn MediaCapture>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            capture,
            notifier,
            constraints: AudioConstraints::default(),
            session: Arc::new(Mutex::new(RecordingSession::default())),
            active: None,
        }
    }

    /// Override the processing requested from the microphone.
    pub fn with_constraints(mut self, constraints: AudioConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RecordingState {
        self.lock_session().state
    }

    /// Snapshot of the live session.
    pub fn session(&self) -> RecordingSession {
        self.lock_session().clone()
    }

    /// The finished recording while previewing.
    pub fn preview_blob(&self) -> Option<AudioBlob> {
        let session = self.lock_session();

        match session.state {
            RecordingState::Previewing => session.audio_blob.clone(),
            _ => None,
        }
    }

    /// Dispatch a gesture command.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Self::start`] and [`Self::stop`].
    pub async fn apply(&mut self, command: GestureCommand) -> CoreResult<()> {
        match command {
            GestureCommand::RequestStart => self.start().await,
            GestureCommand::RequestStop => self.stop(),
            GestureCommand::RequestCancel => {
                self.cancel();
                Ok(())
            }
        }
    }

    /// Acquire the microphone and begin recording. No-op unless idle.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Permission`] if the microphone cannot be acquired;
    /// the state stays `Idle`.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> CoreResult<()> {
        if self.state() != RecordingState::Idle {
            debug!(state = ?self.state(), "Start ignored, recorder busy");
            return Ok(());
        }

        let mime_type = negotiate_mime_type(self.capture.as_ref());

        let capture = match self.capture.acquire(&self.constraints, &mime_type).await {
            Ok(capture) => capture,
            Err(e) => {
                error!(error = %e, "Microphone acquisition failed");
                self.notifier.error(PERMISSION_DENIED_MESSAGE);
                return Err(e);
            }
        };

        let session_id = Uuid::new_v4();
        self.lock_session().begin(session_id);

        let ticker = spawn_elapsed_counter(Arc::clone(&self.session), session_id);
        let visualizer = spawn_visualizer(Arc::clone(&self.session), session_id, capture.tap());

        self.active = Some(ActiveRecording {
            session_id,
            mime_type,
            capture,
            ticker,
            visualizer,
        });

        info!(session_id = %session_id, "Recording started");

        Ok(())
    }

    /// Finalize the recording and move to preview. No-op unless recording.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::NoAudioCaptured`] if nothing was recorded, or the
    /// capture's encoding error. Either way the machine returns to `Idle`.
    #[instrument(skip(self))]
    pub fn stop(&mut self) -> CoreResult<()> {
        let Some(mut active) = self.take_active() else {
            debug!("Stop ignored, not recording");
            return Ok(());
        };

        let finished = active.capture.finish();
        active.capture.release();

        match finished {
            Ok(Some(blob)) if !blob.is_empty() => {
                let blob = AudioBlob::new(blob.into_bytes(), active.mime_type);
                let size = blob.len();

                let mut session = self.lock_session();
                session.state = RecordingState::Previewing;
                session.audio_blob = Some(blob);
                session.amplitude_levels = crate::media::IDLE_LEVELS;

                info!(
                    session_id = %active.session_id,
                    elapsed_seconds = session.elapsed_seconds,
                    size,
                    "Recording ready for preview"
                );

                Ok(())
            }
            Ok(_) => {
                warn!(session_id = %active.session_id, "Recording produced no audio");
                self.lock_session().reset();
                self.notifier.error(NO_AUDIO_MESSAGE);

                Err(ChatError::NoAudioCaptured {
                    location: ErrorLocation::from(Location::caller()),
                })
            }
            Err(e) => {
                error!(session_id = %active.session_id, error = %e, "Failed to finalize recording");
                self.lock_session().reset();
                self.notifier.error(NO_AUDIO_MESSAGE);

                Err(e)
            }
        }
    }

    /// Abandon the recording. No-op unless recording.
    #[instrument(skip(self))]
    pub fn cancel(&mut self) {
        let Some(mut active) = self.take_active() else {
            debug!("Cancel ignored, not recording");
            return;
        };

        active.capture.release();
        self.lock_session().reset();

        info!(session_id = %active.session_id, "Recording cancelled");
    }

    /// Drop the previewed recording, or cancel one in progress.
    #[instrument(skip(self))]
    pub fn discard(&mut self) {
        match self.state() {
            RecordingState::Recording => self.cancel(),
            RecordingState::Previewing => {
                self.lock_session().reset();
                info!("Preview discarded");
            }
            RecordingState::Idle => {}
        }
    }

    /// Return to `Idle` once a send has completed, whatever its outcome.
    pub fn complete_send(&mut self) {
        let mut session = self.lock_session();

        if session.state == RecordingState::Previewing {
            session.reset();
        }
    }

    /// Detach the active recording and stop its loops. Returns `None` when
    /// there is nothing to tear down.
    fn take_active(&mut self) -> Option<ActiveRecording> {
        let active = self.active.take()?;
        active.stop_loops();
        Some(active)
    }

    fn lock_session(&self) -> MutexGuard<'_, RecordingSession> {
        self.session.lock().unwrap_or_else(|e| {
            error!("Recording session lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}

impl Drop for RecordingStateMachine {
    fn drop(&mut self) {
        if let Some(mut active) = self.take_active() {
            active.capture.release();
            debug!(session_id = %active.session_id, "Recording torn down on drop");
        }
    }
}

fn spawn_elapsed_counter(session: Arc<Mutex<RecordingSession>>, session_id: Uuid) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + ELAPSED_TICK, ELAPSED_TICK);

        loop {
            interval.tick().await;

            let mut session = session.lock().unwrap_or_else(|e| e.into_inner());
            if !session.is_recording(session_id) {
                break;
            }
            session.elapsed_seconds += 1;
        }
    })
}

fn spawn_visualizer(
    session: Arc<Mutex<RecordingSession>>,
    session_id: Uuid,
    tap: SampleTap,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut analyzer = LevelAnalyzer::new();
        let mut interval = tokio::time::interval(FRAME_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;

            let levels = analyzer.levels(&tap.recent(FFT_SIZE));

            let mut session = session.lock().unwrap_or_else(|e| e.into_inner());
            if !session.is_recording(session_id) {
                break;
            }
            session.amplitude_levels = levels;
        }
    })
}
