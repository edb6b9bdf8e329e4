use crate::CoreResult;

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use tracing::{debug, error};

/// Container MIME types in order of preference for voice messages.
pub const PREFERRED_MIME_TYPES: [&str; 3] = ["audio/webm", "audio/mp4", "audio/ogg"];

/// Processing requested when acquiring the microphone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioConstraints {
    /// Cancel speaker echo.
    pub echo_cancellation: bool,
    /// Suppress background noise.
    pub noise_suppression: bool,
    /// Normalize input gain.
    pub auto_gain_control: bool,
}

impl Default for AudioConstraints {
    fn default() -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
        }
    }
}

/// A finished recording tagged with its container MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBlob {
    bytes: Vec<u8>,
    mime_type: String,
}

impl AudioBlob {
    /// Wrap encoded audio.
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Encoded audio.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Container MIME type.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// No audio data.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Take the encoded audio.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Bounded window of the most recent live samples, shared between the capture
/// callback and the visualization loop.
#[derive(Clone)]
pub struct SampleTap {
    samples: Arc<Mutex<VecDeque<f32>>>,
    capacity: usize,
}

impl SampleTap {
    /// Tap keeping the latest `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Append samples, dropping the oldest beyond capacity.
    pub fn push(&self, data: &[f32]) {
        let mut buf = self.samples.lock().unwrap_or_else(|e| {
            error!("Sample tap lock poisoned, recovering: {}", e);
            e.into_inner()
        });
        buf.extend(data.iter().copied());
        while buf.len() > self.capacity {
            buf.pop_front();
        }
    }

    /// Up to `count` of the most recent samples, oldest first.
    pub fn recent(&self, count: usize) -> Vec<f32> {
        let buf = self.samples.lock().unwrap_or_else(|e| e.into_inner());
        let skip = buf.len().saturating_sub(count);
        buf.iter().skip(skip).copied().collect()
    }
}

/// Platform audio input.
#[async_trait]
pub trait MediaCapture: Send + Sync {
    /// Whether recordings can be produced in `mime_type`.
    fn is_type_supported(&self, mime_type: &str) -> bool;

    /// Container produced when no preferred type is supported.
    fn native_mime_type(&self) -> &str;

    /// Acquire the microphone and start recording.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ChatError::Permission`] if access is denied or no
    /// input device is available.
    async fn acquire(
        &self,
        constraints: &AudioConstraints,
        mime_type: &str,
    ) -> CoreResult<Box<dyn ActiveCapture>>;
}

/// A microphone stream held for one recording.
pub trait ActiveCapture: Send + Sync {
    /// Live samples for amplitude analysis.
    fn tap(&self) -> SampleTap;

    /// Stop recording and encode what was captured. `None` if nothing was.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ChatError::Device`] if encoding fails.
    fn finish(&mut self) -> CoreResult<Option<AudioBlob>>;

    /// Stop every track and release the device.
    fn release(&mut self);
}

/// Pick the first preferred container the capture supports, falling back to
/// its native container.
pub fn negotiate_mime_type(capture: &dyn MediaCapture) -> String {
    let negotiated = PREFERRED_MIME_TYPES
        .iter()
        .find(|mime_type| capture.is_type_supported(mime_type))
        .map(|mime_type| mime_type.to_string())
        .unwrap_or_else(|| capture.native_mime_type().to_string());

    debug!(mime_type = %negotiated, "Recording container negotiated");

    negotiated
}
