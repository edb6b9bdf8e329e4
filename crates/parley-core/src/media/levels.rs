//! Live amplitude levels for the recording indicator.
//!
//! Emulates a browser-style frequency analyser: a 64-point FFT over the most
//! recent samples with a Blackman window, temporal smoothing, and decibel
//! scaling into bytes. Five evenly spaced bins are then mapped onto 10..=100.

use std::sync::Arc;

use rustfft::{Fft, FftPlanner, num_complex::Complex};

/// FFT length in samples.
pub const FFT_SIZE: usize = 64;

/// Number of level bars per frame.
pub const LEVEL_BARS: usize = 5;

/// Lowest level reported for a bar.
pub const MIN_LEVEL: f32 = 10.0;

/// Highest level reported for a bar.
pub const MAX_LEVEL: f32 = 100.0;

/// One frame of bar levels, each within `MIN_LEVEL..=MAX_LEVEL`.
pub type Levels = [f32; LEVEL_BARS];

/// Levels shown when nothing is being recorded.
pub const IDLE_LEVELS: Levels = [MIN_LEVEL; LEVEL_BARS];

const BIN_COUNT: usize = FFT_SIZE / 2;
const SMOOTHING: f32 = 0.8;
const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;

/// Stateful analyser; smoothing carries over between frames.
pub struct LevelAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    smoothed: Vec<f32>,
}

impl Default for LevelAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelAnalyzer {
    /// Plan the FFT once for the analyser's lifetime.
    pub fn new() -> Self {
        let fft = FftPlanner::new().plan_fft_forward(FFT_SIZE);

        let window = (0..FFT_SIZE)
            .map(|i| {
                let phase = 2.0 * std::f32::consts::PI * i as f32 / FFT_SIZE as f32;
                0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos()
            })
            .collect();

        Self {
            fft,
            window,
            smoothed: vec![0.0; BIN_COUNT],
        }
    }

    /// Byte-scaled frequency data (0..=255 per bin) for the most recent
    /// samples. Fewer than `FFT_SIZE` samples are zero-padded at the front.
    pub fn frequency_bytes(&mut self, samples: &[f32]) -> [u8; BIN_COUNT] {
        let recent = &samples[samples.len().saturating_sub(FFT_SIZE)..];
        let pad = FFT_SIZE - recent.len();

        let mut buffer: Vec<Complex<f32>> = (0..FFT_SIZE)
            .map(|i| {
                let sample = if i < pad { 0.0 } else { recent[i - pad] };
                Complex::new(sample * self.window[i], 0.0)
            })
            .collect();

        self.fft.process(&mut buffer);

        let mut bytes = [0u8; BIN_COUNT];

        for (bin, byte) in bytes.iter_mut().enumerate() {
            let magnitude = buffer[bin].norm() / FFT_SIZE as f32;
            let smoothed = SMOOTHING * self.smoothed[bin] + (1.0 - SMOOTHING) * magnitude;
            self.smoothed[bin] = smoothed;

            *byte = decibels_to_byte(20.0 * smoothed.log10());
        }

        bytes
    }

    /// Next frame of bar levels for the given samples.
    pub fn levels(&mut self, samples: &[f32]) -> Levels {
        let bytes = self.frequency_bytes(samples);
        levels_from_bytes(&bytes)
    }

    /// Forget smoothing history.
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|value| *value = 0.0);
    }
}

/// Pick `LEVEL_BARS` evenly spaced bins and map each byte onto
/// `MIN_LEVEL..=MAX_LEVEL`.
pub fn levels_from_bytes(bytes: &[u8]) -> Levels {
    let step = bytes.len() / LEVEL_BARS;
    let mut levels = IDLE_LEVELS;

    for (bar, level) in levels.iter_mut().enumerate() {
        if let Some(&byte) = bytes.get(bar * step) {
            *level = MIN_LEVEL + f32::from(byte) / 255.0 * (MAX_LEVEL - MIN_LEVEL);
        }
    }

    levels
}

fn decibels_to_byte(decibels: f32) -> u8 {
    if !decibels.is_finite() {
        return 0;
    }

    let scaled = 255.0 * (decibels - MIN_DECIBELS) / (MAX_DECIBELS - MIN_DECIBELS);
    scaled.clamp(0.0, 255.0) as u8
}
