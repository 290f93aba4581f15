// hps-tuner/src/lib.rs

//! The signal-processing core of an instrument tuner.
//! This crate turns frames of time-domain samples into a spectrum and a
//! pitch estimate using a harmonic product spectrum. It is completely
//! headless: capturing audio and drawing results are left to the caller,
//! which hands frames in and receives [`AnalysisResult`]s back.

pub mod analysis;
pub mod config;
pub mod error;
pub mod fft;
pub mod hps;
pub mod pitch;
pub mod session;
pub mod smoothing;
pub mod tuning;

use serde::{Deserialize, Serialize};

pub use analysis::{PitchDetector, PitchTracker};
pub use config::{SpectrumSource, TunerConfig};
pub use error::{Result, TunerError};
pub use session::{AnalysisSession, FrameSender};

/// A frequency quantized to the nearest note of the tuning table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchEstimate {
    /// The detected frequency in Hz.
    pub frequency: f64,
    /// The name of the nearest note.
    pub note_name: String,
    /// The deviation from the nearest note in cents, within ±50.
    pub cents_deviation: f64,
}

impl PitchEstimate {
    /// Quantizes `frequency` to the nearest note.
    pub fn from_frequency(frequency: f64) -> Self {
        let note = tuning::find_nearest_note(frequency);
        Self {
            frequency,
            note_name: note.name.clone(),
            cents_deviation: tuning::cents_deviation(frequency, note.frequency),
        }
    }
}

/// Outcome of the pitch search for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Detection {
    /// A pitch was found.
    Pitch(PitchEstimate),
    /// The frame was too quiet to carry a pitch.
    NoSignal,
}

impl Detection {
    pub fn estimate(&self) -> Option<&PitchEstimate> {
        match self {
            Detection::Pitch(estimate) => Some(estimate),
            Detection::NoSignal => None,
        }
    }
}

/// Represents the result of a single audio analysis frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Magnitude spectrum, half the window size long.
    pub spectrum: Vec<f64>,
    /// Harmonic product spectrum on the same bin scale as `spectrum`.
    pub hps: Vec<f64>,
    /// Largest value of `spectrum`, the quantity the silence gate tests.
    pub peak_magnitude: f64,
    /// The pitch found in this frame, if any.
    pub detection: Detection,
}
