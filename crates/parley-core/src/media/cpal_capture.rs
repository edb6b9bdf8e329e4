use crate::{
    ChatError, CoreResult,
    media::{ActiveCapture, AudioBlob, AudioConstraints, MediaCapture, SampleTap},
};

use std::{
    io::Cursor,
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    thread::JoinHandle,
};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use error_location::ErrorLocation;
use tokio::{runtime::RuntimeFlavor, sync::oneshot};
use tracing::{debug, error, info, instrument, warn};

/// Container produced by [`CpalCapture`].
pub const WAV_MIME_TYPE: &str = "audio/wav";

/// Maximum mono samples kept per recording (5 minutes at 48kHz).
pub(crate) const MAX_BUFFER_SAMPLES: usize = 48_000 * 60 * 5;

/// Live samples retained for amplitude analysis.
const TAP_CAPACITY: usize = 4_096;

#[derive(Debug, Clone, Copy)]
struct StreamFormat {
    sample_rate: u32,
    channels: u16,
}

/// Microphone capture through the default cpal input device, encoded as
/// 16-bit mono WAV.
///
/// The cpal stream lives on a dedicated thread for the duration of one
/// recording so the returned [`ActiveCapture`] can move between tasks.
#[derive(Debug, Default)]
pub struct CpalCapture;

impl CpalCapture {
    /// Create a capture backend for the default input device.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MediaCapture for CpalCapture {
    fn is_type_supported(&self, mime_type: &str) -> bool {
        mime_type == WAV_MIME_TYPE
    }

    fn native_mime_type(&self) -> &str {
        WAV_MIME_TYPE
    }

    #[instrument(skip(self))]
    async fn acquire(
        &self,
        constraints: &AudioConstraints,
        mime_type: &str,
    ) -> CoreResult<Box<dyn ActiveCapture>> {
        // cpal exposes no input processing; the request is recorded for diagnosis.
        debug!(?constraints, "Input processing requested");

        let samples = Arc::new(Mutex::new(Vec::new()));
        let tap = SampleTap::new(TAP_CAPACITY);
        let shutdown = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = mpsc::channel();

        let worker = {
            let samples = Arc::clone(&samples);
            let tap = tap.clone();
            let shutdown = Arc::clone(&shutdown);

            std::thread::Builder::new()
                .name("parley-capture".to_string())
                .spawn(move || run_stream(samples, tap, shutdown, ready_tx, stop_rx))
                .map_err(|e| ChatError::Device {
                    reason: format!("Failed to spawn capture thread: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?
        };

        let format = match ready_rx.await {
            Ok(Ok(format)) => format,
            Ok(Err(e)) => {
                let _ = worker.join();
                return Err(e);
            }
            Err(_) => {
                let _ = worker.join();
                return Err(ChatError::Device {
                    reason: "Capture thread exited before the stream started".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        info!(
            sample_rate = format.sample_rate,
            channels = format.channels,
            mime_type,
            "Audio capture started"
        );

        Ok(Box::new(CpalActiveCapture {
            samples,
            tap,
            shutdown,
            stop_tx: Some(stop_tx),
            worker: Some(worker),
            format,
        }))
    }
}

/// Owns the cpal stream until told to stop.
fn run_stream(
    samples: Arc<Mutex<Vec<f32>>>,
    tap: SampleTap,
    shutdown: Arc<AtomicBool>,
    ready: oneshot::Sender<CoreResult<StreamFormat>>,
    stop: mpsc::Receiver<()>,
) {
    let host = cpal::default_host();

    let Some(device) = host.default_input_device() else {
        let _ = ready.send(Err(ChatError::Permission {
            reason: "No microphone found".to_string(),
            location: ErrorLocation::from(Location::caller()),
        }));
        return;
    };

    let config = match device.default_input_config() {
        Ok(config) => config,
        Err(e) => {
            let _ = ready.send(Err(ChatError::Permission {
                reason: format!("Failed to get input config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }));
            return;
        }
    };

    let format = StreamFormat {
        sample_rate: config.sample_rate(),
        channels: config.channels(),
    };
    let channels = usize::from(format.channels.max(1));

    let stream = device.build_input_stream(
        &config.into(),
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            if shutdown.load(Ordering::Acquire) {
                return;
            }

            let mono: Vec<f32> = data
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                .collect();

            tap.push(&mono);

            let mut buf = samples.lock().unwrap_or_else(|e| {
                error!("Sample buffer lock poisoned, recovering: {}", e);
                e.into_inner()
            });
            let room = MAX_BUFFER_SAMPLES.saturating_sub(buf.len());
            buf.extend(mono.iter().take(room).copied());
        },
        |err| {
            error!("Audio stream error: {}", err);
        },
        None,
    );

    let stream = match stream {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready.send(Err(ChatError::Permission {
                reason: format!("Failed to build stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready.send(Err(ChatError::Permission {
            reason: format!("Failed to start stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        }));
        return;
    }

    if ready.send(Ok(format)).is_err() {
        warn!("Capture requester went away before the stream started");
        return;
    }

    // Blocks until a stop is sent or the sender is dropped.
    let _ = stop.recv();
    drop(stream);
    debug!("Capture stream dropped");
}

struct CpalActiveCapture {
    samples: Arc<Mutex<Vec<f32>>>,
    tap: SampleTap,
    shutdown: Arc<AtomicBool>,
    stop_tx: Option<mpsc::Sender<()>>,
    worker: Option<JoinHandle<()>>,
    format: StreamFormat,
}

impl ActiveCapture for CpalActiveCapture {
    fn tap(&self) -> SampleTap {
        self.tap.clone()
    }

    #[instrument(skip(self))]
    fn finish(&mut self) -> CoreResult<Option<AudioBlob>> {
        self.release();

        let samples = std::mem::take(
            &mut *self.samples.lock().unwrap_or_else(|e| e.into_inner()),
        );

        debug!(sample_count = samples.len(), "Captured audio samples");

        if samples.is_empty() {
            return Ok(None);
        }

        encode_wav(&samples, self.format.sample_rate).map(Some)
    }

    fn release(&mut self) {
        self.shutdown.store(true, Ordering::Release);

        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(worker) = self.worker.take() {
            if join_capture_thread(worker).is_err() {
                error!("Capture thread panicked");
            }
            info!("Audio capture stopped");
        }
    }
}

/// Wait for the capture thread to drop its stream.
///
/// Inside a multi-threaded runtime the wait is handed to
/// [`tokio::task::block_in_place`] so other tasks keep running on the
/// remaining workers. A current-thread runtime cannot do that and joins
/// directly.
pub(crate) fn join_capture_thread(worker: JoinHandle<()>) -> std::thread::Result<()> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| worker.join())
        }
        _ => worker.join(),
    }
}

impl Drop for CpalActiveCapture {
    fn drop(&mut self) {
        self.release();
    }
}

#[track_caller]
pub(crate) fn encode_wav(samples: &[f32], sample_rate: u32) -> CoreResult<AudioBlob> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let encode_error = |e: hound::Error| ChatError::Device {
        reason: format!("Failed to encode WAV: {}", e),
        location: ErrorLocation::from(Location::caller()),
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec).map_err(encode_error)?;

    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        writer.write_sample(value).map_err(encode_error)?;
    }

    writer.finalize().map_err(encode_error)?;

    Ok(AudioBlob::new(cursor.into_inner(), WAV_MIME_TYPE))
}
