//! # Harmonic Product Spectrum Module
//!
//! Multiplying a magnitude spectrum by copies of itself decimated by 2, 3, ...
//! makes the energy of the harmonics `2f`, `3f`, ... land on the bin of the
//! fundamental `f`. The product therefore peaks at the fundamental even when a
//! single harmonic is louder than the fundamental in the raw spectrum.

use crate::fft::BinScale;

/// Computes the harmonic product spectrum of a magnitude spectrum.
///
/// The result has `spectrum.len() / harmonics` entries. Entry `i` is the
/// product of `spectrum[i * s]` for every stride `s` in `1..harmonics`, so
/// `harmonics` counts the decimated copies plus one. Entries whose frequency
/// falls below `low_cut_hz` are forced to zero: the product amplifies DC and
/// rumble far more than it amplifies real low notes.
///
/// Index `i` of the result maps to the same frequency as bin `i` of the
/// spectrum, so `scale` is the scale of the input spectrum.
///
/// # Arguments
/// * `spectrum` - Magnitude spectrum
/// * `harmonics` - Harmonic count `H` (at least 2 for the product to be meaningful)
/// * `low_cut_hz` - Frequencies below this are zeroed
/// * `scale` - Bin to Hz mapping of `spectrum`
pub fn harmonic_product_spectrum(
    spectrum: &[f64],
    harmonics: usize,
    low_cut_hz: f64,
    scale: BinScale,
) -> Vec<f64> {
    if harmonics == 0 {
        return Vec::new();
    }

    let len = spectrum.len() / harmonics;
    let mut hps = vec![1.0; len];

    for stride in 1..harmonics {
        for (i, value) in hps.iter_mut().enumerate() {
            *value *= spectrum[i * stride];
        }
    }

    for (i, value) in hps.iter_mut().enumerate() {
        if scale.bin_to_hz(i as f64) < low_cut_hz {
            *value = 0.0;
        }
    }

    hps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_length_is_floor_of_bins_over_harmonics() {
        let spectrum = vec![1.0; 103];
        let scale = BinScale::new(spectrum.len(), 48_000);
        assert_eq!(harmonic_product_spectrum(&spectrum, 5, 0.0, scale).len(), 20);
        assert_eq!(harmonic_product_spectrum(&spectrum, 2, 0.0, scale).len(), 51);
        assert!(harmonic_product_spectrum(&spectrum, 0, 0.0, scale).is_empty());
    }

    #[test]
    fn multiplies_decimated_copies() {
        let spectrum: Vec<f64> = (0..20).map(|i| i as f64).collect();
        // 20 bins spanning 0..1000 Hz keeps the cutoff out of the way
        let scale = BinScale::new(spectrum.len(), 2000);
        let hps = harmonic_product_spectrum(&spectrum, 4, 0.0, scale);

        assert_eq!(hps.len(), 5);
        for (i, &value) in hps.iter().enumerate() {
            let x = i as f64;
            assert_eq!(value, x * (2.0 * x) * (3.0 * x));
        }
    }

    #[test]
    fn zeroes_everything_below_cutoff() {
        let spectrum = vec![2.0; 4096];
        let scale = BinScale::new(spectrum.len(), 8192); // 1 Hz per bin
        let hps = harmonic_product_spectrum(&spectrum, 5, 60.0, scale);

        for (i, &value) in hps.iter().enumerate() {
            if scale.bin_to_hz(i as f64) < 60.0 {
                assert_eq!(value, 0.0, "bin {i} should be cut");
            } else {
                assert_eq!(value, 16.0);
            }
        }
        assert_eq!(hps[59], 0.0);
        assert_eq!(hps[60], 16.0);
    }

    #[test]
    fn fundamental_outweighs_loud_harmonic() {
        // Fundamental at bin 100 is weaker than its second harmonic.
        let mut spectrum = vec![0.01; 2000];
        for (harmonic, magnitude) in [(1, 0.5), (2, 1.0), (3, 0.6), (4, 0.4), (5, 0.3)] {
            spectrum[100 * harmonic] = magnitude;
        }
        let scale = BinScale::new(spectrum.len(), 8000);
        let hps = harmonic_product_spectrum(&spectrum, 5, 60.0, scale);

        let peak = hps
            .iter()
            .enumerate()
            .fold(0, |best, (i, &v)| if v > hps[best] { i } else { best });
        assert_eq!(peak, 100);
    }
}
