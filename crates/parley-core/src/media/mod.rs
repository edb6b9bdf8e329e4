mod capture;
mod cpal_capture;
pub mod levels;

pub use {
    capture::{
        ActiveCapture, AudioBlob, AudioConstraints, MediaCapture, PREFERRED_MIME_TYPES,
        SampleTap, negotiate_mime_type,
    },
    cpal_capture::{CpalCapture, WAV_MIME_TYPE},
    levels::{IDLE_LEVELS, LevelAnalyzer, Levels},
};

#[cfg(test)]
pub(crate) use cpal_capture::{encode_wav, join_capture_thread};
