use crate::{IDLE_LEVELS, RecordingSession, RecordingState, format_elapsed};

/// WHAT: Elapsed time is shown as minutes and zero-padded seconds
/// WHY: Matches the recording indicator's fixed-width display
#[test]
fn given_elapsed_seconds_when_formatting_then_minutes_and_padded_seconds() {
    // Given / When / Then
    assert_eq!(format_elapsed(0), "0:00");
    assert_eq!(format_elapsed(9), "0:09");
    assert_eq!(format_elapsed(75), "1:15");
    assert_eq!(format_elapsed(600), "10:00");
}

/// WHAT: A fresh session is idle with floor levels
/// WHY: The recorder starts with nothing to preview or send
#[test]
fn given_default_session_when_inspecting_then_idle_and_empty() {
    // Given / When
    let session = RecordingSession::default();

    // Then
    assert_eq!(session.state(), RecordingState::Idle);
    assert_eq!(session.elapsed_seconds(), 0);
    assert_eq!(session.elapsed_display(), "0:00");
    assert!(session.audio_blob().is_none());
    assert!(session.session_id().is_none());
    assert_eq!(session.amplitude_levels(), IDLE_LEVELS);
}
