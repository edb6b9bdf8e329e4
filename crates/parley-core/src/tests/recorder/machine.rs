use crate::{
    AudioConstraints, ChatError, GestureCommand, IDLE_LEVELS, RecordingState,
    RecordingStateMachine,
    tests::support::{MockCapture, RecordingNotifier},
};

use std::{sync::Arc, time::Duration};

fn machine(capture: MockCapture) -> (RecordingStateMachine, Arc<MockCapture>, Arc<RecordingNotifier>) {
    let capture = Arc::new(capture);
    let notifier = Arc::new(RecordingNotifier::default());
    let machine = RecordingStateMachine::new(capture.clone(), notifier.clone());
    (machine, capture, notifier)
}

/// WHAT: Start acquires the microphone with processing enabled and the negotiated type
/// WHY: Voice messages need echo cancellation, noise suppression and gain control
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_idle_when_starting_then_recording_with_requested_constraints() {
    // Given
    let (mut machine, capture, _) = machine(MockCapture::new());

    // When
    machine.start().await.unwrap();

    // Then
    assert_eq!(machine.state(), RecordingState::Recording);
    assert!(machine.session().session_id().is_some());
    let (constraints, mime_type) = capture.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(constraints, AudioConstraints::default());
    assert!(constraints.echo_cancellation && constraints.noise_suppression);
    assert!(constraints.auto_gain_control);
    assert_eq!(mime_type, "audio/webm");
}

/// WHAT: Permission denial notifies the user and stays idle
/// WHY: Nothing may be left half-started after a refused prompt
#[tokio::test]
async fn given_denied_microphone_when_starting_then_permission_error_and_idle() {
    // Given
    let (mut machine, _, notifier) = machine(MockCapture::new().denied());

    // When
    let result = machine.start().await;

    // Then
    assert!(matches!(result, Err(ChatError::Permission { .. })));
    assert_eq!(machine.state(), RecordingState::Idle);
    assert_eq!(
        notifier.errors(),
        vec!["Could not access microphone. Please check permissions.".to_string()]
    );
}

/// WHAT: Start while recording or previewing is a no-op
/// WHY: Exactly one recording session per recorder
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_busy_recorder_when_starting_again_then_microphone_is_not_reacquired() {
    // Given
    let (mut machine, capture, _) = machine(MockCapture::new());
    machine.start().await.unwrap();

    // When
    machine.start().await.unwrap();
    machine.stop().unwrap();
    machine.start().await.unwrap();

    // Then
    assert_eq!(capture.acquires(), 1);
    assert_eq!(machine.state(), RecordingState::Previewing);
}

/// WHAT: Stop finalizes a blob tagged with the negotiated type and releases the device
/// WHY: The preview must be sendable with a correct extension
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_stopping_then_previewing_with_tagged_blob() {
    // Given
    let (mut machine, capture, _) =
        machine(MockCapture::new().supporting(vec!["audio/ogg"]).capturing(vec![9; 16]));
    machine.start().await.unwrap();

    // When
    machine.stop().unwrap();

    // Then
    assert_eq!(machine.state(), RecordingState::Previewing);
    let blob = machine.preview_blob().unwrap();
    assert_eq!(blob.mime_type(), "audio/ogg");
    assert_eq!(blob.len(), 16);
    assert_eq!(capture.releases(), 1);
}

/// WHAT: An empty capture notifies and returns to idle
/// WHY: There is nothing to preview or send
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_empty_capture_when_stopping_then_no_audio_error_and_idle() {
    // Given
    let (mut machine, capture, notifier) = machine(MockCapture::new().capturing(vec![]));
    machine.start().await.unwrap();

    // When
    let result = machine.stop();

    // Then
    assert!(matches!(result, Err(ChatError::NoAudioCaptured { .. })));
    assert_eq!(machine.state(), RecordingState::Idle);
    assert_eq!(
        notifier.errors(),
        vec!["No audio was recorded. Please try again.".to_string()]
    );
    assert_eq!(capture.releases(), 1);
}

/// WHAT: Cancel discards, releases and zeroes elapsed time
/// WHY: A cancelled recording leaves no trace
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_cancelling_then_idle_with_elapsed_reset() {
    // Given
    let (mut machine, capture, _) = machine(MockCapture::new());
    machine.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(2_500)).await;
    assert_eq!(machine.session().elapsed_seconds(), 2);

    // When
    machine.cancel();

    // Then
    let session = machine.session();
    assert_eq!(session.state(), RecordingState::Idle);
    assert_eq!(session.elapsed_seconds(), 0);
    assert!(session.audio_blob().is_none());
    assert_eq!(capture.releases(), 1);
}

/// WHAT: Double teardown releases the device once and freezes the counter
/// WHY: Timers and tracks must be stopped exactly once on every exit
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_stopped_recording_when_stopping_and_cancelling_again_then_single_release() {
    // Given
    let (mut machine, capture, _) = machine(MockCapture::new());
    machine.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(3_500)).await;
    machine.stop().unwrap();

    // When
    machine.stop().unwrap();
    machine.cancel();
    tokio::time::sleep(Duration::from_secs(5)).await;

    // Then
    assert_eq!(capture.releases(), 1);
    let session = machine.session();
    assert_eq!(session.state(), RecordingState::Previewing);
    assert_eq!(session.elapsed_seconds(), 3);
}

/// WHAT: The visualization loop publishes levels while recording
/// WHY: The indicator reacts to the live microphone
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_recording_with_signal_when_frames_elapse_then_levels_rise() {
    // Given
    let (mut machine, _, _) = machine(MockCapture::new());
    machine.start().await.unwrap();

    // When
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Then
    assert!(machine.session().amplitude_levels()[0] > IDLE_LEVELS[0]);
}

/// WHAT: Dropping a recording machine releases the device
/// WHY: Unmounting mid-recording must not leak the microphone
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_machine_is_dropped_then_device_is_released() {
    // Given
    let (mut machine, capture, _) = machine(MockCapture::new());
    machine.start().await.unwrap();

    // When
    drop(machine);

    // Then
    assert_eq!(capture.releases(), 1);
}

/// WHAT: Cancel is ignored while previewing and discard clears the preview
/// WHY: Only Recording -> Idle is a cancel; previews leave through send or discard
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_preview_when_cancelling_then_ignored_and_discard_returns_to_idle() {
    // Given
    let (mut machine, _, _) = machine(MockCapture::new());
    machine.start().await.unwrap();
    machine.stop().unwrap();

    // When
    machine.apply(GestureCommand::RequestCancel).await.unwrap();
    let after_cancel = machine.state();
    machine.discard();

    // Then
    assert_eq!(after_cancel, RecordingState::Previewing);
    assert_eq!(machine.state(), RecordingState::Idle);
    assert!(machine.preview_blob().is_none());
}

/// WHAT: Stop and cancel from idle do nothing
/// WHY: Only the documented transitions are reachable
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_idle_when_stopping_or_cancelling_then_state_is_unchanged() {
    // Given
    let (mut machine, capture, notifier) = machine(MockCapture::new());

    // When
    machine.apply(GestureCommand::RequestStop).await.unwrap();
    machine.apply(GestureCommand::RequestCancel).await.unwrap();
    machine.complete_send();

    // Then
    assert_eq!(machine.state(), RecordingState::Idle);
    assert_eq!(capture.acquires(), 0);
    assert_eq!(capture.releases(), 0);
    assert!(notifier.events().is_empty());
}
