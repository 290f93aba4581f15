//! Error types for the tuner core.

use thiserror::Error;

/// Errors that abort the analysis of a single frame or the construction of a detector.
///
/// Conditions that are a normal per-frame outcome (silence, a zero reference
/// pitch, a peak at the spectrum edge) are not errors and never show up here.
#[derive(Error, Debug)]
pub enum TunerError {
    /// The buffer length is zero or not a power of two.
    #[error("window size {len} is not a power of two")]
    InvalidWindowSize {
        /// Length of the rejected buffer.
        len: usize,
    },

    /// The buffer is a valid transform size but not the size the detector was planned for.
    #[error("frame has {actual} samples, detector expects {expected}")]
    FrameLengthMismatch {
        /// Window size the detector was built with.
        expected: usize,
        /// Length of the rejected frame.
        actual: usize,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration document could not be parsed.
    #[error("could not parse configuration: {0}")]
    ConfigFormat(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TunerError>;
