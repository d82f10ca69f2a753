//! Packing between real sample buffers and split-complex buffers
//!
//! A real buffer of `N` samples is stored as `N/2` complex values: even-indexed samples go to
//! the real part and odd-indexed samples to the imaginary part. This is a storage layout, not
//! a complex-valued signal.
//!
//! The same layout is used for the half spectrum of a real transform. Bins `1..N/2` keep their
//! complex value. Bins `0` (DC) and `N/2` (Nyquist) are purely real, so the Nyquist value is
//! carried in the imaginary slot of bin 0.

use realfft::num_complex::Complex;

/// Real and imaginary parts of complex values held in two same-length buffers
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SplitComplex {
    pub real: Vec<f32>,
    pub imag: Vec<f32>,
}

impl SplitComplex {
    pub fn zeros(len: usize) -> Self {
        Self {
            real: vec![0.0; len],
            imag: vec![0.0; len],
        }
    }

    /// Number of complex values
    pub fn len(&self) -> usize {
        self.real.len()
    }

    pub fn is_empty(&self) -> bool {
        self.real.is_empty()
    }

    /// Multiply every real and imaginary component by `factor`
    pub fn scale(&mut self, factor: f32) {
        self.real.iter_mut().for_each(|x| *x *= factor);
        self.imag.iter_mut().for_each(|x| *x *= factor);
    }
}

/// Pack real samples pairwise: `real[k] = samples[2k]`, `imag[k] = samples[2k + 1]`
///
/// A trailing odd sample has no partner and is ignored.
pub fn pack(samples: &[f32]) -> SplitComplex {
    let mut split = SplitComplex::zeros(samples.len() / 2);
    pack_into(samples, &mut split);
    split
}

/// [`pack`] into an existing buffer of `samples.len() / 2` values
pub fn pack_into(samples: &[f32], split: &mut SplitComplex) {
    debug_assert_eq!(samples.len() / 2, split.len(), "Split buffer size mismatch");
    for (k, pair) in samples.chunks_exact(2).enumerate() {
        split.real[k] = pair[0];
        split.imag[k] = pair[1];
    }
}

/// Inverse of [`pack`]: interleave the split buffers back into `2 * len` real samples
pub fn unpack(split: &SplitComplex) -> Vec<f32> {
    let mut samples = vec![0.0; split.len() * 2];
    unpack_into(split, &mut samples);
    samples
}

/// [`unpack`] into an existing buffer of exactly `2 * split.len()` samples
pub fn unpack_into(split: &SplitComplex, samples: &mut [f32]) {
    debug_assert_eq!(samples.len(), split.len() * 2, "Interleaved buffer size mismatch");
    for (k, pair) in samples.chunks_exact_mut(2).enumerate() {
        pair[0] = split.real[k];
        pair[1] = split.imag[k];
    }
}

/// Fold a real-transform half spectrum (`N/2 + 1` bins) into `N/2` packed bins
///
/// Every component is multiplied by `gain`.
pub fn pack_spectrum(bins: &[Complex<f32>], gain: f32, split: &mut SplitComplex) {
    let half = split.len();
    debug_assert_eq!(bins.len(), half + 1, "Half spectrum size mismatch");

    split.real[0] = bins[0].re * gain;
    split.imag[0] = bins[half].re * gain;
    for k in 1..half {
        split.real[k] = bins[k].re * gain;
        split.imag[k] = bins[k].im * gain;
    }
}

/// Inverse of [`pack_spectrum`] with unit gain: expand `N/2` packed bins into `N/2 + 1` bins
///
/// DC and Nyquist come out with zero imaginary parts.
pub fn unpack_spectrum(split: &SplitComplex, bins: &mut [Complex<f32>]) {
    let half = split.len();
    debug_assert_eq!(bins.len(), half + 1, "Half spectrum size mismatch");

    bins[0] = Complex::new(split.real[0], 0.0);
    bins[half] = Complex::new(split.imag[0], 0.0);
    for k in 1..half {
        bins[k] = Complex::new(split.real[k], split.imag[k]);
    }
}
