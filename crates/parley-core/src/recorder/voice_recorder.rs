use crate::{
    ChatError, CoreResult,
    channel::{ChannelRef, ChannelResolver},
    delivery::{DeliveryOutcome, DeliveryPipeline},
    notify::Notifier,
    recorder::{
        GestureCommand, GestureController, PointerEvent, RecordingSession, RecordingState,
        RecordingStateMachine,
    },
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tokio::{
    sync::{mpsc, watch},
    time::Instant,
};
use tracing::{debug, error, info, instrument};

const NOTHING_TO_SEND_MESSAGE: &str = "Cannot send voice message. Please try recording again.";

/// Input accepted by [`VoiceRecorder::run`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecorderInput {
    /// Pointer or click on the microphone controls.
    Pointer(PointerEvent),
    /// Send the previewed recording.
    Send,
    /// Discard the previewed recording.
    Discard,
}

/// One voice recorder: gestures in, delivered voice messages out.
pub struct VoiceRecorder {
    gesture: GestureController,
    machine: RecordingStateMachine,
    resolver: ChannelResolver,
    pipeline: DeliveryPipeline,
    notifier: Arc<dyn Notifier>,
    channel: Option<ChannelRef>,
    auto_send: bool,
}

impl VoiceRecorder {
    /// Assemble a recorder.
    pub fn new(
        gesture: GestureController,
        machine: RecordingStateMachine,
        resolver: ChannelResolver,
        pipeline: DeliveryPipeline,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            gesture,
            machine,
            resolver,
            pipeline,
            notifier,
            channel: None,
            auto_send: false,
        }
    }

    /// Channel handed to the recorder by its host, tried before any
    /// discovered channel.
    pub fn with_channel(mut self, channel: ChannelRef) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Send as soon as a recording stops instead of waiting in preview.
    pub fn with_auto_send(mut self, auto_send: bool) -> Self {
        self.auto_send = auto_send;
        self
    }

    /// Current recorder state.
    pub fn state(&self) -> RecordingState {
        self.machine.state()
    }

    /// Snapshot of the live session.
    pub fn session(&self) -> RecordingSession {
        self.machine.session()
    }

    /// Resolver used to find the delivery channel.
    pub fn resolver_mut(&mut self) -> &mut ChannelResolver {
        &mut self.resolver
    }

    /// Feed a pointer event observed at `now`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the resulting commands; the user has
    /// already been notified.
    pub async fn handle_pointer(&mut self, event: PointerEvent, now: Instant) -> CoreResult<()> {
        let commands = self.gesture.handle(event, now);
        self.apply_all(commands).await
    }

    /// Fire a hold deadline that has elapsed by `now`.
    ///
    /// # Errors
    ///
    /// Returns the start error if the microphone could not be acquired.
    pub async fn poll_gesture(&mut self, now: Instant) -> CoreResult<()> {
        let commands = self.gesture.poll(now).into_iter().collect();
        self.apply_all(commands).await
    }

    /// When [`Self::poll_gesture`] next needs to run.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.gesture.next_deadline()
    }

    /// Deliver the previewed recording. The recorder returns to `Idle`
    /// whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::InvalidState`] if nothing is being previewed, or
    /// the delivery pipeline's error.
    #[instrument(skip(self))]
    pub async fn send(&mut self) -> CoreResult<DeliveryOutcome> {
        let Some(blob) = self.machine.preview_blob() else {
            self.notifier.error(NOTHING_TO_SEND_MESSAGE);
            return Err(ChatError::InvalidState {
                reason: "no recording to send".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let channel = self.resolver.resolve(self.channel.clone());
        let result = self.pipeline.send(&blob, channel.as_ref()).await;

        self.machine.complete_send();

        result
    }

    /// Drop the previewed recording or cancel one in progress.
    pub fn discard(&mut self) {
        self.gesture.reset();
        self.machine.discard();
    }

    /// Drive the recorder from an input queue until the queue closes or
    /// shutdown is signalled.
    #[instrument(skip_all)]
    pub async fn run(
        mut self,
        mut input_rx: mpsc::Receiver<RecorderInput>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        info!("Voice recorder running");

        loop {
            let deadline = self.next_deadline();

            tokio::select! {
                _ = sleep_until_deadline(deadline) => {
                    if let Err(e) = self.poll_gesture(Instant::now()).await {
                        error!(error = %e, "Failed to start recording");
                    }
                }

                input = input_rx.recv() => {
                    let Some(input) = input else {
                        info!("Recorder input closed");
                        break;
                    };

                    if let Err(e) = self.handle_input(input).await {
                        error!(?input, error = %e, "Recorder input failed");
                    }
                }

                _ = shutdown_rx.changed() => {
                    info!("Voice recorder shutting down");
                    break;
                }
            }
        }

        self.discard();
    }

    async fn handle_input(&mut self, input: RecorderInput) -> CoreResult<()> {
        match input {
            RecorderInput::Pointer(event) => self.handle_pointer(event, Instant::now()).await,
            RecorderInput::Send => self.send().await.map(|_| ()),
            RecorderInput::Discard => {
                self.discard();
                Ok(())
            }
        }
    }

    async fn apply_all(&mut self, commands: Vec<GestureCommand>) -> CoreResult<()> {
        let mut first_error = None;

        for command in commands {
            if let Err(e) = self.apply(command).await {
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    async fn apply(&mut self, command: GestureCommand) -> CoreResult<()> {
        let result = self.machine.apply(command).await;

        // A start that left the machine anywhere but Recording must not keep
        // the gesture latched, or the next press is swallowed.
        if command == GestureCommand::RequestStart
            && self.machine.state() != RecordingState::Recording
        {
            debug!(state = ?self.machine.state(), "Recording did not start, releasing gesture");
            self.gesture.reset();
        }

        result?;

        if command == GestureCommand::RequestStop
            && self.auto_send
            && self.machine.state() == RecordingState::Previewing
        {
            debug!("Auto-sending recording");
            self.send().await?;
        }

        Ok(())
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
