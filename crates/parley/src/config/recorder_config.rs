use crate::config::{default_hold_threshold_ms, default_swipe_cancel_distance};

use std::time::Duration;

use parley_core::GestureSettings;
use serde::{Deserialize, Serialize};

/// Hold-to-record gesture tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// How long the key must be held before recording starts.
    #[serde(default = "default_hold_threshold_ms")]
    pub hold_threshold_ms: u64,
    /// Upward drag distance that cancels a held recording.
    #[serde(default = "default_swipe_cancel_distance")]
    pub swipe_cancel_distance: f32,
}

impl RecorderConfig {
    /// Gesture settings for the recorder.
    pub fn gesture_settings(&self) -> GestureSettings {
        GestureSettings {
            hold_threshold: Duration::from_millis(self.hold_threshold_ms),
            swipe_cancel_distance: self.swipe_cancel_distance,
        }
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            hold_threshold_ms: default_hold_threshold_ms(),
            swipe_cancel_distance: default_swipe_cancel_distance(),
        }
    }
}
