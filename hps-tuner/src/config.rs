//! # Tuner Configuration
//!
//! Every tunable of the analysis pipeline lives in [`TunerConfig`]. The
//! defaults are the canonical settings; a JSON document only needs to name
//! the fields it changes.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TunerError};
use crate::smoothing::{DEFAULT_SMOOTHING_WEIGHT, DEFAULT_SNAP_THRESHOLD};

/// Which array the fundamental finder searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpectrumSource {
    /// The harmonic product spectrum. Robust against loud overtones.
    #[default]
    HarmonicProduct,
    /// The raw magnitude spectrum. Suited to near-sinusoidal input, where the
    /// product has no harmonics to reinforce.
    Magnitude,
}

/// Configuration of a [`PitchDetector`](crate::PitchDetector).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunerConfig {
    /// Samples per analysis frame. Must be a power of two.
    pub window_size: usize,
    /// Harmonic count `H` of the product spectrum; strides `1..H` are multiplied.
    pub harmonics: usize,
    /// Product spectrum entries below this frequency are zeroed.
    pub low_cut_hz: f64,
    /// Minimum peak of the raw magnitude spectrum for a frame to count as signal.
    pub silence_threshold: f64,
    /// Share of each new estimate in the smoothed pitch.
    pub smoothing_weight: f64,
    /// Relative jump above which smoothing snaps to the new estimate.
    pub snap_threshold: f64,
    /// Array handed to the fundamental finder.
    pub spectrum_source: SpectrumSource,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            window_size: 64 * 1024,
            harmonics: 5,
            low_cut_hz: 60.0,
            silence_threshold: 50.0,
            smoothing_weight: DEFAULT_SMOOTHING_WEIGHT,
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
            spectrum_source: SpectrumSource::default(),
        }
    }
}

impl TunerConfig {
    /// Parses a JSON document and validates it.
    ///
    /// # Errors
    /// * [`TunerError::ConfigFormat`] if the document is not valid JSON for this struct
    /// * [`TunerError::InvalidConfig`] if a value is out of range
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks every field against its allowed range.
    ///
    /// # Errors
    /// * [`TunerError::InvalidWindowSize`] if `window_size` is not a power of two
    /// * [`TunerError::InvalidConfig`] for any other out-of-range value
    pub fn validate(&self) -> Result<()> {
        crate::fft::check_window_size(self.window_size)?;
        if self.window_size < 4 {
            return Err(invalid(format!(
                "window_size must be at least 4, got {}",
                self.window_size
            )));
        }
        if self.harmonics < 2 {
            return Err(invalid(format!(
                "harmonics must be at least 2, got {}",
                self.harmonics
            )));
        }
        if !self.low_cut_hz.is_finite() || self.low_cut_hz < 0.0 {
            return Err(invalid(format!(
                "low_cut_hz must be a non-negative number, got {}",
                self.low_cut_hz
            )));
        }
        if !self.silence_threshold.is_finite() || self.silence_threshold < 0.0 {
            return Err(invalid(format!(
                "silence_threshold must be a non-negative number, got {}",
                self.silence_threshold
            )));
        }
        if !(self.smoothing_weight > 0.0 && self.smoothing_weight <= 1.0) {
            return Err(invalid(format!(
                "smoothing_weight must be in (0, 1], got {}",
                self.smoothing_weight
            )));
        }
        if !self.snap_threshold.is_finite() || self.snap_threshold <= 0.0 {
            return Err(invalid(format!(
                "snap_threshold must be positive, got {}",
                self.snap_threshold
            )));
        }
        Ok(())
    }
}

fn invalid(message: String) -> TunerError {
    TunerError::InvalidConfig(message)
}
