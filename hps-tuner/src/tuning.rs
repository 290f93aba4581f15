//! # Musical Tuning Module
//!
//! This module maps frequencies onto the equal-tempered note grid.
//! It handles note name lookups, nearest-note quantization and cent
//! deviation measurements, with A4 = 440 Hz as the reference pitch.
//!
//! ## Features
//! - Note table spanning C2 to C7
//! - Nearest-note search by frequency
//! - Note lookup by name
//! - Clamped cent deviation for tuner displays

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Reference pitch of A4 in Hz.
pub const CONCERT_A: f64 = 440.0;

/// Cent deviations are clamped to `[-CENTS_LIMIT, CENTS_LIMIT]`.
///
/// Half a semitone is the furthest a frequency can sit from its nearest note
/// inside the table; only frequencies outside the table's range reach the clamp.
pub const CENTS_LIMIT: f64 = 50.0;

/// Distance in semitones from A4 down to C2, the lowest note of the table.
const LOWEST_SEMITONE: i32 = -33;

/// Number of notes from C2 up to and including C7.
const NOTE_COUNT: usize = 61;

/// Represents a single musical note with its name and frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    /// Note name (e.g., "A4", "C#3")
    pub name: String,
    /// Frequency in Hz
    pub frequency: f64,
}

/// Notes from C2 to C7 in ascending order.
///
/// Computed once on first use with equal temperament, so frequencies are
/// strictly increasing.
static NOTES: Lazy<Vec<Note>> = Lazy::new(|| {
    const NOTE_NAMES: [&str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];

    (0..NOTE_COUNT)
        .map(|i| {
            let semitones = LOWEST_SEMITONE + i as i32;
            let frequency = CONCERT_A * 2.0_f64.powf(f64::from(semitones) / 12.0);
            let name = format!("{}{}", NOTE_NAMES[i % 12], 2 + i / 12);
            Note { name, frequency }
        })
        .collect()
});

/// Static map for note name to table index lookups.
static NOTE_MAP: Lazy<BTreeMap<&'static str, usize>> = Lazy::new(|| {
    NOTES
        .iter()
        .enumerate()
        .map(|(i, note)| (note.name.as_str(), i))
        .collect()
});

/// All notes of the table, lowest first.
pub fn notes() -> &'static [Note] {
    &NOTES
}

/// Finds the note closest to `freq` in Hz.
///
/// The table is scanned from the lowest note up and a later note only wins
/// when it is strictly closer, so an exact tie goes to the lower note.
/// Frequencies outside the table snap to C2 or C7.
pub fn find_nearest_note(freq: f64) -> &'static Note {
    let mut nearest = &NOTES[0];
    for note in NOTES.iter() {
        if (note.frequency - freq).abs() < (nearest.frequency - freq).abs() {
            nearest = note;
        }
    }
    nearest
}

/// Looks up a note by name, such as `"A4"` or `"C#3"`.
pub fn find_note(name: &str) -> Option<&'static Note> {
    NOTE_MAP.get(name).map(|&i| &NOTES[i])
}

/// Calculates the deviation of `freq` from `target_freq` in cents.
///
/// - 100 cents = 1 semitone
/// - Positive values indicate sharpness, negative values flatness
///
/// A non-positive target has no defined deviation and yields 0. The result is
/// clamped to [`CENTS_LIMIT`] either way.
pub fn cents_deviation(freq: f64, target_freq: f64) -> f64 {
    let cents = if target_freq > 0.0 {
        1200.0 * (freq / target_freq).log2()
    } else {
        0.0
    };
    cents.clamp(-CENTS_LIMIT, CENTS_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Derives the nearest note with semitone arithmetic instead of the table.
    fn semitone_oracle(freq: f64) -> (String, f64) {
        const NAMES: [&str; 12] = [
            "A", "A#", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#",
        ];
        let semitones = (12.0 * (freq / CONCERT_A).log2()).round() as i32;
        let name = NAMES[semitones.rem_euclid(12) as usize];
        let octave = 4 + (semitones + 9).div_euclid(12);
        let reference = CONCERT_A * 2.0_f64.powf(f64::from(semitones) / 12.0);
        (format!("{name}{octave}"), reference)
    }

    #[test]
    fn table_spans_c2_to_c7() {
        let notes = notes();
        assert_eq!(notes.len(), 61);
        assert_eq!(notes[0].name, "C2");
        assert!((notes[0].frequency - 65.406).abs() < 1e-3);
        assert_eq!(notes[60].name, "C7");
        assert!((notes[60].frequency - 2093.005).abs() < 1e-3);
        assert!(notes.windows(2).all(|w| w[0].frequency < w[1].frequency));
    }

    #[test]
    fn named_notes_have_standard_pitches() {
        assert_eq!(find_note("A4").map(|n| n.frequency), Some(440.0));
        assert!((find_note("A3").unwrap().frequency - 220.0).abs() < 1e-9);
        assert!((find_note("C4").unwrap().frequency - 261.626).abs() < 1e-3);
        assert!((find_note("F#5").unwrap().frequency - 739.989).abs() < 1e-3);
        assert!(find_note("H4").is_none());
        assert!(find_note("B7").is_none());
    }

    #[test]
    fn nearest_note_lookup() {
        assert_eq!(find_nearest_note(220.0).name, "A3");
        assert_eq!(find_nearest_note(225.0).name, "A3");
        assert_eq!(find_nearest_note(261.0).name, "C4");
        assert_eq!(find_nearest_note(30.0).name, "C2");
        assert_eq!(find_nearest_note(0.0).name, "C2");
        assert_eq!(find_nearest_note(5000.0).name, "C7");
    }

    #[test]
    fn table_agrees_with_semitone_arithmetic() {
        for note in notes() {
            for offset in [-40.0, -20.0, 0.0, 20.0, 40.0] {
                let freq = note.frequency * 2.0_f64.powf(offset / 1200.0);
                let nearest = find_nearest_note(freq);
                let (name, reference) = semitone_oracle(freq);
                assert_eq!(nearest.name, name, "at {freq} Hz");
                assert!((nearest.frequency - reference).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn cents_of_equal_pitches_is_zero() {
        for f in [27.5, 220.0, 440.0, 1234.5] {
            assert_eq!(cents_deviation(f, f), 0.0);
        }
    }

    #[test]
    fn cents_with_zero_reference_is_zero() {
        assert_eq!(cents_deviation(440.0, 0.0), 0.0);
        assert_eq!(cents_deviation(440.0, -1.0), 0.0);
    }

    #[test]
    fn cents_are_signed_and_clamped() {
        let sharp = cents_deviation(440.0 * 2.0_f64.powf(10.0 / 1200.0), 440.0);
        assert!((sharp - 10.0).abs() < 1e-9);
        let flat = cents_deviation(440.0 * 2.0_f64.powf(-25.0 / 1200.0), 440.0);
        assert!((flat + 25.0).abs() < 1e-9);

        assert_eq!(cents_deviation(880.0, 440.0), CENTS_LIMIT);
        assert_eq!(cents_deviation(220.0, 440.0), -CENTS_LIMIT);
    }
}
