//! # Fast Fourier Transform (FFT) Module
//!
//! This module turns a frame of time-domain samples into a magnitude spectrum.
//! It owns the windowing step, the radix-2 transform itself and the mapping
//! between spectrum bins and frequencies.
//!
//! ## Features
//! - Hann windowing for reduced spectral leakage
//! - Iterative in-place radix-2 transform with a precomputed plan
//! - The classic recursive Cooley-Tukey transform, kept as a reference
//! - Bin to Hz conversion shared by every spectrum-like array

use std::f64::consts::PI;

pub use rustfft::num_complex::Complex;

use crate::error::{Result, TunerError};

/// Fails with [`TunerError::InvalidWindowSize`] unless `len` is a non-zero power of two.
pub fn check_window_size(len: usize) -> Result<()> {
    if len.is_power_of_two() {
        Ok(())
    } else {
        Err(TunerError::InvalidWindowSize { len })
    }
}

/// Applies a Hann window to the input buffer to reduce spectral leakage.
///
/// Sample `i` of an `n`-sample buffer is scaled by `0.5 - 0.5 * cos(2 * pi * i / n)`,
/// which tapers the frame to zero at its start so the transform does not see
/// a discontinuity where the frame wraps around.
///
/// # Arguments
/// * `buffer` - Audio buffer to window (modified in-place)
pub fn apply_hann_window(buffer: &mut [f64]) {
    let n = buffer.len();
    if n == 0 {
        return;
    }
    for (i, sample) in buffer.iter_mut().enumerate() {
        *sample *= 0.5 - 0.5 * (2.0 * PI * i as f64 / n as f64).cos();
    }
}

/// Computes the discrete Fourier transform of a real signal with the
/// recursive decimation-in-time Cooley-Tukey algorithm.
///
/// Every recursion level allocates its own scratch vectors, so this costs
/// O(N log N) memory. Analysis goes through [`Fft`] instead; this version is
/// the readable reference the planned transform is checked against.
///
/// # Errors
/// * [`TunerError::InvalidWindowSize`] if the length is not a power of two
pub fn fft_recursive(samples: &[f64]) -> Result<Vec<Complex<f64>>> {
    check_window_size(samples.len())?;
    Ok(cooley_tukey(samples, samples.len(), 0, 1))
}

fn cooley_tukey(input: &[f64], n: usize, start: usize, stride: usize) -> Vec<Complex<f64>> {
    if n == 1 {
        return vec![Complex::new(input[start], 0.0)];
    }

    let half = n / 2;
    let even = cooley_tukey(input, half, start, 2 * stride);
    let odd = cooley_tukey(input, half, start + stride, 2 * stride);

    let mut output = vec![Complex::new(0.0, 0.0); n];
    for k in 0..half {
        let w = -2.0 * PI * k as f64 / n as f64;
        let (sin, cos) = w.sin_cos();
        let p = even[k];
        let q = Complex::new(
            odd[k].re * cos - odd[k].im * sin,
            odd[k].re * sin + odd[k].im * cos,
        );
        output[k] = p + q;
        output[k + half] = p - q;
    }
    output
}

/// A forward transform planned for one window size.
///
/// Planning precomputes the Hann window, the bit-reversal permutation and the
/// twiddle factors once, so each frame costs a single copy plus an in-place
/// O(N log N) pass with no further allocation.
#[derive(Debug, Clone)]
pub struct Fft {
    size: usize,
    window: Vec<f64>,
    bit_reverse: Vec<usize>,
    twiddles: Vec<Complex<f64>>,
}

impl Fft {
    /// Plans a transform for `size` samples.
    ///
    /// # Errors
    /// * [`TunerError::InvalidWindowSize`] if `size` is not a power of two
    pub fn new(size: usize) -> Result<Self> {
        check_window_size(size)?;

        let bits = size.trailing_zeros();
        let bit_reverse = (0..size)
            .map(|i| {
                if bits == 0 {
                    0
                } else {
                    i.reverse_bits() >> (usize::BITS - bits)
                }
            })
            .collect();

        let twiddles = (0..size / 2)
            .map(|k| Complex::from_polar(1.0, -2.0 * PI * k as f64 / size as f64))
            .collect();

        let mut window = vec![1.0; size];
        apply_hann_window(&mut window);

        Ok(Self {
            size,
            window,
            bit_reverse,
            twiddles,
        })
    }

    /// Number of samples this plan transforms.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Transforms `buffer` in place.
    ///
    /// # Errors
    /// * [`TunerError::FrameLengthMismatch`] if the buffer is not exactly [`Fft::size`] long
    pub fn process(&self, buffer: &mut [Complex<f64>]) -> Result<()> {
        if buffer.len() != self.size {
            return Err(TunerError::FrameLengthMismatch {
                expected: self.size,
                actual: buffer.len(),
            });
        }

        for (i, &j) in self.bit_reverse.iter().enumerate() {
            if i < j {
                buffer.swap(i, j);
            }
        }

        let n = self.size;
        let mut len = 2;
        while len <= n {
            let half = len / 2;
            let step = n / len;
            for start in (0..n).step_by(len) {
                for k in 0..half {
                    let even = buffer[start + k];
                    let odd = buffer[start + k + half] * self.twiddles[k * step];
                    buffer[start + k] = even + odd;
                    buffer[start + k + half] = even - odd;
                }
            }
            len *= 2;
        }
        Ok(())
    }

    /// Windows a copy of `signal` and returns its complex spectrum.
    ///
    /// The caller's buffer is only read; it is free to overwrite it with the
    /// next frame as soon as this returns.
    ///
    /// # Errors
    /// * [`TunerError::InvalidWindowSize`] if the length is not a power of two
    /// * [`TunerError::FrameLengthMismatch`] if it is, but differs from the planned size
    pub fn transform(&self, signal: &[f32]) -> Result<Vec<Complex<f64>>> {
        check_window_size(signal.len())?;
        if signal.len() != self.size {
            return Err(TunerError::FrameLengthMismatch {
                expected: self.size,
                actual: signal.len(),
            });
        }

        let mut buffer: Vec<Complex<f64>> = signal
            .iter()
            .zip(&self.window)
            .map(|(&sample, &w)| Complex::new(f64::from(sample) * w, 0.0))
            .collect();

        self.process(&mut buffer)?;
        Ok(buffer)
    }
}

/// Calculates the magnitude of each bin of a complex spectrum.
///
/// Only the first half of the spectrum is kept: for a real input the upper
/// half mirrors the lower one.
pub fn magnitude_spectrum(spectrum: &[Complex<f64>]) -> Vec<f64> {
    spectrum
        .iter()
        .take(spectrum.len() / 2)
        .map(|c| c.norm()) // .norm() is sqrt(re^2 + im^2)
        .collect()
}

/// Mapping between spectrum bin indices and frequencies.
///
/// `bin_count` is the length of the magnitude spectrum (half the window
/// size). Arrays derived from the spectrum by keeping a prefix of it, such
/// as the harmonic product spectrum, share the same scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinScale {
    bin_count: usize,
    sample_rate: f64,
}

impl BinScale {
    pub fn new(bin_count: usize, sample_rate: u32) -> Self {
        Self {
            bin_count,
            sample_rate: f64::from(sample_rate),
        }
    }

    /// Scale of the magnitude spectrum produced from a `window_size`-sample frame.
    pub fn for_window(window_size: usize, sample_rate: u32) -> Self {
        Self::new(window_size / 2, sample_rate)
    }

    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Width of one bin in Hz.
    pub fn resolution(&self) -> f64 {
        self.bin_to_hz(1.0)
    }

    /// Converts a (possibly fractional) bin index to Hz.
    pub fn bin_to_hz(&self, bin: f64) -> f64 {
        if self.bin_count == 0 {
            return 0.0;
        }
        bin / self.bin_count as f64 * (self.sample_rate / 2.0)
    }

    /// Converts a frequency in Hz to a fractional bin index.
    pub fn hz_to_bin(&self, hz: f64) -> f64 {
        if self.sample_rate <= 0.0 {
            return 0.0;
        }
        hz / (self.sample_rate / 2.0) * self.bin_count as f64
    }
}
