//! # Analysis Pipeline
//!
//! Runs one frame of audio through windowing, the transform, the harmonic
//! product spectrum, the fundamental finder and note quantization.
//!
//! [`PitchDetector`] is stateless between frames. [`PitchTracker`] adds the
//! temporal smoother and is the type to keep per tracked signal.

use log::{debug, trace};

use crate::config::{SpectrumSource, TunerConfig};
use crate::error::Result;
use crate::fft::{magnitude_spectrum, BinScale, Fft};
use crate::hps::harmonic_product_spectrum;
use crate::pitch::{find_fundamental, max_index};
use crate::smoothing::PitchSmoother;
use crate::{AnalysisResult, Detection, PitchEstimate};

/// Turns audio frames into pitch estimates.
#[derive(Debug, Clone)]
pub struct PitchDetector {
    config: TunerConfig,
    fft: Fft,
}

impl PitchDetector {
    /// Validates `config` and plans the transform for its window size.
    ///
    /// # Errors
    /// * Any error of [`TunerConfig::validate`]
    pub fn new(config: TunerConfig) -> Result<Self> {
        config.validate()?;
        let fft = Fft::new(config.window_size)?;
        debug!(
            "planned {}-point analysis, {} harmonics, source {:?}",
            config.window_size, config.harmonics, config.spectrum_source
        );
        Ok(Self { config, fft })
    }

    pub fn config(&self) -> &TunerConfig {
        &self.config
    }

    /// Performs a full analysis on a single frame of audio data.
    ///
    /// The frame is only read. Silence, meaning a magnitude spectrum whose
    /// peak stays below the configured threshold, is reported as
    /// [`Detection::NoSignal`] rather than as an error.
    ///
    /// # Arguments
    /// * `frame` - Exactly `window_size` samples
    /// * `sample_rate` - Sample rate of `frame` in Hz
    ///
    /// # Errors
    /// * [`TunerError::InvalidWindowSize`](crate::TunerError::InvalidWindowSize) if the frame length is not a power of two
    /// * [`TunerError::FrameLengthMismatch`](crate::TunerError::FrameLengthMismatch) if it differs from `window_size`
    pub fn analyze(&self, frame: &[f32], sample_rate: u32) -> Result<AnalysisResult> {
        let spectrum = magnitude_spectrum(&self.fft.transform(frame)?);
        let scale = BinScale::for_window(frame.len(), sample_rate);
        let peak_magnitude = spectrum.get(max_index(&spectrum)).copied().unwrap_or(0.0);

        let hps = harmonic_product_spectrum(
            &spectrum,
            self.config.harmonics,
            self.config.low_cut_hz,
            scale,
        );

        let detection = if is_silent(peak_magnitude, self.config.silence_threshold) {
            trace!("peak magnitude {peak_magnitude:.3} below threshold");
            Detection::NoSignal
        } else {
            let data = match self.config.spectrum_source {
                SpectrumSource::HarmonicProduct => &hps,
                SpectrumSource::Magnitude => &spectrum,
            };
            if data.get(max_index(data)).is_none_or(|&peak| peak <= 0.0) {
                // Everything left sits below the low cut.
                debug!("no energy above {} Hz", self.config.low_cut_hz);
                Detection::NoSignal
            } else {
                let frequency = find_fundamental(data, scale);
                Detection::Pitch(PitchEstimate::from_frequency(frequency))
            }
        };

        Ok(AnalysisResult {
            spectrum,
            hps,
            peak_magnitude,
            detection,
        })
    }
}

fn is_silent(peak_magnitude: f64, threshold: f64) -> bool {
    !peak_magnitude.is_finite() || peak_magnitude <= 0.0 || peak_magnitude < threshold
}

/// A detector plus the smoothing state of one tracked signal.
#[derive(Debug, Clone)]
pub struct PitchTracker {
    detector: PitchDetector,
    smoother: PitchSmoother,
}

impl PitchTracker {
    /// # Errors
    /// * Any error of [`PitchDetector::new`]
    pub fn new(config: TunerConfig) -> Result<Self> {
        let smoother = PitchSmoother::new(config.smoothing_weight, config.snap_threshold);
        let detector = PitchDetector::new(config)?;
        Ok(Self { detector, smoother })
    }

    pub fn detector(&self) -> &PitchDetector {
        &self.detector
    }

    pub fn smoother(&self) -> &PitchSmoother {
        &self.smoother
    }

    /// Analyzes `frame` and smooths the detected frequency.
    ///
    /// The note and cents of a detection are recomputed from the smoothed
    /// frequency. Frames without signal leave the smoothing state as it was.
    ///
    /// # Errors
    /// * Any error of [`PitchDetector::analyze`]
    pub fn process(&mut self, frame: &[f32], sample_rate: u32) -> Result<AnalysisResult> {
        let mut result = self.detector.analyze(frame, sample_rate)?;
        if let Detection::Pitch(estimate) = &mut result.detection {
            let smoothed = self.smoother.update(estimate.frequency);
            *estimate = PitchEstimate::from_frequency(smoothed);
        }
        Ok(result)
    }

    /// Forgets the smoothing history, e.g. when the input source changes.
    pub fn reset(&mut self) {
        self.smoother.reset();
    }
}
