use crate::{
    IDLE_LEVELS, LevelAnalyzer,
    media::levels::{FFT_SIZE, MAX_LEVEL, MIN_LEVEL, levels_from_bytes},
};

/// WHAT: Byte extremes map onto the 10..=100 level range
/// WHY: Bars never disappear entirely and never overflow their track
#[test]
fn given_byte_extremes_when_mapping_levels_then_range_is_ten_to_hundred() {
    // Given
    let mut bytes = [0u8; 32];
    bytes[0] = 255;
    bytes[6] = 255;

    // When
    let levels = levels_from_bytes(&bytes);

    // Then
    assert_eq!(levels, [MAX_LEVEL, MAX_LEVEL, MIN_LEVEL, MIN_LEVEL, MIN_LEVEL]);
}

/// WHAT: Silence produces idle levels
/// WHY: The indicator rests at its floor when nobody speaks
#[test]
fn given_silence_when_analyzing_then_levels_are_idle() {
    // Given
    let mut analyzer = LevelAnalyzer::new();

    // When
    let levels = analyzer.levels(&[0.0; FFT_SIZE]);

    // Then
    assert_eq!(levels, IDLE_LEVELS);
}

/// WHAT: Loud input raises the low-frequency bar
/// WHY: Speech energy must be visible in the indicator
#[test]
fn given_loud_signal_when_analyzing_then_first_bar_rises() {
    // Given
    let mut analyzer = LevelAnalyzer::new();

    // When
    let levels = analyzer.levels(&[1.0; FFT_SIZE]);

    // Then
    assert!(levels[0] > MIN_LEVEL);
    assert!(levels.iter().all(|l| (MIN_LEVEL..=MAX_LEVEL).contains(l)));
}

/// WHAT: Smoothing carries energy into the following frame
/// WHY: Bars decay instead of flickering between frames
#[test]
fn given_loud_frame_then_silence_when_analyzing_then_energy_decays_gradually() {
    // Given
    let mut analyzer = LevelAnalyzer::new();
    analyzer.levels(&[1.0; FFT_SIZE]);

    // When
    let after = analyzer.levels(&[0.0; FFT_SIZE]);
    analyzer.reset();
    let reset = analyzer.levels(&[0.0; FFT_SIZE]);

    // Then
    assert!(after[0] > MIN_LEVEL);
    assert_eq!(reset, IDLE_LEVELS);
}

/// WHAT: Short windows are zero padded
/// WHY: The first frames after acquisition hold fewer samples than the FFT
#[test]
fn given_short_sample_window_when_analyzing_then_levels_stay_in_range() {
    // Given
    let mut analyzer = LevelAnalyzer::new();

    // When
    let levels = analyzer.levels(&[0.5; 10]);

    // Then
    assert!(levels.iter().all(|l| (MIN_LEVEL..=MAX_LEVEL).contains(l)));
}
