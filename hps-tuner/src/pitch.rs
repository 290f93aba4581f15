//! # Pitch Detection Module
//!
//! This module locates the fundamental frequency in a spectrum-like array,
//! either a plain magnitude spectrum or a harmonic product spectrum.
//!
//! ## Features
//! - Global peak search with deterministic tie breaking
//! - Octave error correction for the missing-fundamental case
//! - Parabolic interpolation for sub-bin accuracy
//!
//! Silence is not detected here. Given an all-zero array the finder still
//! returns a frequency; callers gate on the spectrum's energy first.

use log::trace;

use crate::fft::BinScale;

/// Half-width, in bins, of the window searched around half the peak index.
const SUBHARMONIC_SEARCH_RADIUS: usize = 10;

/// A subharmonic must reach this fraction of the peak's magnitude to replace it.
const SUBHARMONIC_MIN_RATIO: f64 = 0.5;

/// Returns the index of the largest element.
///
/// Comparison is strict, so on ties the first (lowest) index wins. An empty
/// slice yields 0.
pub fn max_index(data: &[f64]) -> usize {
    let mut max_idx = 0;
    for (i, &value) in data.iter().enumerate() {
        if value > data[max_idx] {
            max_idx = i;
        }
    }
    max_idx
}

/// Looks for an appreciable peak near half of `peak`'s index.
///
/// A harmonic can carry more energy than the fundamental, in which case the
/// global maximum sits an octave too high. Indices in
/// `[max(round(peak / 2) - 10, 1), round(peak / 2) + 10)` are scanned in order and
/// the first one that is a strict local maximum holding more than half of the
/// peak's magnitude is returned. Without such a candidate `peak` comes back
/// unchanged.
///
/// # Arguments
/// * `data` - Spectrum-like array
/// * `peak` - Index of the global maximum of `data`
pub fn find_subharmonic(data: &[f64], peak: usize) -> usize {
    let Some(&reference) = data.get(peak) else {
        return peak;
    };
    if data.len() < 3 {
        return peak;
    }

    let estimate = (peak + 1) / 2; // round(peak / 2)
    let start = estimate.saturating_sub(SUBHARMONIC_SEARCH_RADIUS).max(1);
    // Both neighbours of a candidate must exist.
    let end = (estimate + SUBHARMONIC_SEARCH_RADIUS).min(data.len() - 1);

    (start..end)
        .find(|&idx| {
            let is_peak = data[idx - 1] < data[idx] && data[idx] > data[idx + 1];
            let is_large = data[idx] > SUBHARMONIC_MIN_RATIO * reference;
            is_peak && is_large
        })
        .unwrap_or(peak)
}

/// Refines an integer peak index by fitting a parabola through it and its two
/// neighbours.
///
/// Returns the fractional index of the parabola's vertex. At either edge of
/// the array one neighbour is missing and the index is returned unrefined;
/// the same happens when the three points are collinear.
///
/// # Arguments
/// * `data` - Spectrum-like array
/// * `idx` - Index of a local maximum of `data`
pub fn interpolate_peak(data: &[f64], idx: usize) -> f64 {
    let x2 = idx as f64;
    if idx == 0 || idx + 1 >= data.len() {
        return x2;
    }

    let (x1, x3) = (x2 - 1.0, x2 + 1.0);
    let (y1, y2, y3) = (data[idx - 1], data[idx], data[idx + 1]);

    let denominator = (y1 - y2) * (x3 - x2) + (y3 - y2) * (x2 - x1);
    if denominator == 0.0 || !denominator.is_finite() {
        return x2;
    }
    let numerator = (y1 - y2) * (x3 - x2).powi(2) - (y3 - y2) * (x2 - x1).powi(2);

    let refined = x2 + 0.5 * numerator / denominator;
    if refined.is_finite() { refined } else { x2 }
}

/// Finds the fundamental frequency of a spectrum-like array.
///
/// This function:
/// 1. Finds the global maximum
/// 2. Moves to a subharmonic peak if one is strong enough
/// 3. Refines the result with parabolic interpolation
/// 4. Converts the fractional bin to Hz
///
/// # Arguments
/// * `data` - Magnitude spectrum or harmonic product spectrum
/// * `scale` - Bin to Hz mapping of the magnitude spectrum `data` derives from
pub fn find_fundamental(data: &[f64], scale: BinScale) -> f64 {
    let peak = max_index(data);
    let corrected = find_subharmonic(data, peak);
    let refined = interpolate_peak(data, corrected);
    trace!("spectral peak at bin {peak}, corrected to {corrected}, refined to {refined:.3}");
    scale.bin_to_hz(refined)
}
