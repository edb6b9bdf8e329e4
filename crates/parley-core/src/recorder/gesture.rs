//! Pointer gesture interpretation for the microphone control.
//!
//! Press and hold starts a recording once the hold threshold elapses, release
//! stops it, and an upward swipe cancels it. Time is passed in by the caller,
//! so the controller never reads the clock itself.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Hold duration before a press becomes a recording.
pub const HOLD_THRESHOLD: Duration = Duration::from_millis(300);

/// Upward travel, in logical pixels, that cancels a held recording.
pub const SWIPE_CANCEL_DISTANCE: f32 = 50.0;

/// Gesture tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSettings {
    /// Hold duration before recording starts.
    pub hold_threshold: Duration,
    /// Upward travel that cancels.
    pub swipe_cancel_distance: f32,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            hold_threshold: HOLD_THRESHOLD,
            swipe_cancel_distance: SWIPE_CANCEL_DISTANCE,
        }
    }
}

/// Discrete controls of the click-driven variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// Microphone button.
    Microphone,
    /// Stop button.
    Stop,
    /// Cancel button.
    Cancel,
}

/// Raw pointer input. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer pressed on the microphone control.
    Press {
        /// Vertical position of the press.
        y: f32,
    },
    /// Pointer moved while pressed.
    Move {
        /// Current vertical position.
        y: f32,
    },
    /// Pointer released.
    Release,
    /// Discrete click.
    Click(ClickTarget),
}

/// Commands emitted to the recording state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureCommand {
    /// Begin recording.
    RequestStart,
    /// Finish recording and preview.
    RequestStop,
    /// Abandon the recording.
    RequestCancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Released,
    Pressed { origin_y: f32, deadline: Instant },
    Holding { origin_y: f32 },
    Clicked,
}

/// Timed press/hold/release state machine.
#[derive(Debug)]
pub struct GestureController {
    phase: Phase,
    settings: GestureSettings,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(GestureSettings::default())
    }
}

impl GestureController {
    /// Create a released controller.
    pub fn new(settings: GestureSettings) -> Self {
        Self {
            phase: Phase::Released,
            settings,
        }
    }

    /// Feed one input event observed at `now`.
    pub fn handle(&mut self, event: PointerEvent, now: Instant) -> Vec<GestureCommand> {
        let mut commands = self.poll(now).into_iter().collect::<Vec<_>>();

        let command = match (self.phase, event) {
            (_, PointerEvent::Click(target)) => self.click(target),

            (Phase::Released, PointerEvent::Press { y }) => {
                self.phase = Phase::Pressed {
                    origin_y: y,
                    deadline: now + self.settings.hold_threshold,
                };
                None
            }

            (Phase::Pressed { .. }, PointerEvent::Release) => {
                self.phase = Phase::Released;
                Some(GestureCommand::RequestCancel)
            }

            (Phase::Holding { .. }, PointerEvent::Release) => {
                self.phase = Phase::Released;
                Some(GestureCommand::RequestStop)
            }

            (Phase::Holding { origin_y }, PointerEvent::Move { y })
                if origin_y - y > self.settings.swipe_cancel_distance =>
            {
                self.phase = Phase::Released;
                Some(GestureCommand::RequestCancel)
            }

            _ => None,
        };

        if let Some(command) = command {
            debug!(?event, ?command, "Gesture command");
            commands.push(command);
        }

        commands
    }

    /// Promote a press whose hold deadline has elapsed by `now`.
    pub fn poll(&mut self, now: Instant) -> Option<GestureCommand> {
        match self.phase {
            Phase::Pressed { origin_y, deadline } if now >= deadline => {
                self.phase = Phase::Holding { origin_y };
                debug!("Hold threshold reached");
                Some(GestureCommand::RequestStart)
            }
            _ => None,
        }
    }

    /// When [`GestureController::poll`] next has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::Pressed { deadline, .. } => Some(deadline),
            _ => None,
        }
    }

    /// Whether a gesture currently owns the recording.
    pub fn is_active(&self) -> bool {
        !matches!(self.phase, Phase::Released)
    }

    /// Return to released without emitting anything.
    pub fn reset(&mut self) {
        self.phase = Phase::Released;
    }

    fn click(&mut self, target: ClickTarget) -> Option<GestureCommand> {
        match target {
            ClickTarget::Microphone => {
                self.phase = Phase::Clicked;
                Some(GestureCommand::RequestStart)
            }
            ClickTarget::Stop => {
                self.phase = Phase::Released;
                Some(GestureCommand::RequestStop)
            }
            ClickTarget::Cancel => {
                self.phase = Phase::Released;
                Some(GestureCommand::RequestCancel)
            }
        }
    }
}
