mod gesture;
mod machine;
mod state;
mod voice_recorder;

pub use {
    gesture::{
        ClickTarget, GestureCommand, GestureController, GestureSettings, HOLD_THRESHOLD,
        PointerEvent, SWIPE_CANCEL_DISTANCE,
    },
    machine::{ELAPSED_TICK, FRAME_INTERVAL, RecordingStateMachine},
    state::{RecordingSession, RecordingState, format_elapsed},
    voice_recorder::{RecorderInput, VoiceRecorder},
};
