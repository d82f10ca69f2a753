//! FFT-based linear autocorrelation for 1D real-valued signals
//!
//! Uses the power-spectrum identity `autocorr(x) = IFFT(FFT(x) · conj(FFT(x)))` on a packed
//! real transform of size `N = 2^floor(log2(count))`.
//!
//! # Padding
//!
//! The FFT computes a circular autocorrelation. It equals the linear one only when the input
//! is zero-padded to at least twice its non-trivial length, which is the caller's job (see
//! [`pad_for_linear`]). Without padding, lag `k` picks up the wrapped term at lag `N - k`.
//!
//! # Output
//!
//! `N/2` lag values, index 0 = zero lag (total energy). Values are unnormalized:
//! `r[k] = Σ x[i]·x[i+k]`. Use [`normalize_to_lag_zero`] for a dimensionless result.
//!
//! # Scaling
//!
//! The forward output is divided by [`RealTransform::forward_gain`] (2 for the packed radix-2
//! convention) and the inverse output by [`RealTransform::inverse_gain`] (`N`). The DC and
//! Nyquist bins share packed bin 0 and are squared separately.

use crate::error::{AutocorrError, Result};
use crate::packing::{pack, unpack, SplitComplex};
use crate::transform::{RealTransform, TransformSetup};
use crate::PADDING_FACTOR;
use log::{debug, warn};
use realfft::RealFftPlanner;

/// Reusable autocorrelation engine
///
/// Keeps a `realfft` planner so repeated calls at the same size reuse plans. Each call still
/// acquires its own [`TransformSetup`], released before the call returns.
pub struct Autocorrelator {
    planner: RealFftPlanner<f32>,
}

impl Autocorrelator {
    pub fn new() -> Self {
        Self {
            planner: RealFftPlanner::new(),
        }
    }

    /// Linear autocorrelation of the first `count` samples (see [`compute_linear_autocorrelation`])
    pub fn compute(&mut self, samples: &[f32], count: usize) -> Result<Vec<f32>> {
        if samples.is_empty() {
            return Err(AutocorrError::InvalidInput("empty sample buffer".into()));
        }
        if count > samples.len() {
            return Err(AutocorrError::InvalidInput(format!(
                "window of {} samples exceeds buffer of {}",
                count,
                samples.len()
            )));
        }

        let log2n = window_log2(count)?;
        let n = 1usize << log2n;
        if n != count {
            warn!(
                "Window {} is not a power of two; ignoring {} trailing samples",
                count,
                count - n
            );
        }
        debug!("Autocorrelation window: count={}, N={}, lags={}", count, n, n / 2);

        let mut setup = TransformSetup::with_planner(&mut self.planner, log2n)?;
        autocorrelate_with(&mut setup, samples)
    }
}

impl Default for Autocorrelator {
    fn default() -> Self {
        Self::new()
    }
}

/// `floor(log2(count))` for a window that yields a transform of at least 2 samples
///
/// # Errors
///
/// - `AutocorrError::InvalidInput` if `count` is 0
/// - `AutocorrError::UnsupportedWindowSize` if `count` is 1
pub fn window_log2(count: usize) -> Result<u32> {
    if count == 0 {
        return Err(AutocorrError::InvalidInput("window length must be at least 1".into()));
    }
    let log2n = count.ilog2();
    if log2n == 0 {
        return Err(AutocorrError::UnsupportedWindowSize(count));
    }
    Ok(log2n)
}

/// Compute the linear autocorrelation of `samples` over a window of `count` samples
///
/// The working size is `N = 2^floor(log2(count))`; samples past `N` are ignored. Returns
/// `N/2` lag values. The input must already be zero-padded for a linear (not circular) result.
///
/// # Errors
///
/// - `AutocorrError::InvalidInput` for an empty buffer, `count == 0`, or `count` larger
///   than the buffer
/// - `AutocorrError::UnsupportedWindowSize` if `N < 2` or no transform can be set up
/// - `AutocorrError::FftError` if the transform rejects a buffer
///
/// Callers wanting the empty-sequence convention can use `.unwrap_or_default()`.
pub fn compute_linear_autocorrelation(samples: &[f32], count: usize) -> Result<Vec<f32>> {
    Autocorrelator::new().compute(samples, count)
}

/// Run the power-spectrum pipeline with an already acquired transform
///
/// Uses the first `transform.size()` samples.
pub fn autocorrelate_with<T: RealTransform + ?Sized>(
    transform: &mut T,
    samples: &[f32],
) -> Result<Vec<f32>> {
    let n = transform.size();
    if samples.len() < n {
        return Err(AutocorrError::InvalidInput(format!(
            "need {} samples for the transform, got {}",
            n,
            samples.len()
        )));
    }

    let mut buffer = pack(&samples[..n]);

    transform.forward_real(&mut buffer)?;
    buffer.scale(1.0 / transform.forward_gain());

    power_spectrum(&mut buffer);

    transform.inverse_real(&mut buffer)?;

    let mut lags = unpack(&buffer);
    lags.truncate(n / 2);
    let normalization = transform.inverse_gain();
    lags.iter_mut().for_each(|x| *x /= normalization);

    Ok(lags)
}

/// Replace each packed bin with its product with its own conjugate
///
/// Bins `1..N/2` become `re² + im²` with a zero imaginary part. Bin 0 holds two real bins
/// (DC and Nyquist), so each slot is squared on its own.
pub fn power_spectrum(spectrum: &mut SplitComplex) {
    if spectrum.is_empty() {
        return;
    }

    let dc = spectrum.real[0];
    let nyquist = spectrum.imag[0];
    spectrum.real[0] = dc * dc;
    spectrum.imag[0] = nyquist * nyquist;

    for k in 1..spectrum.len() {
        let (re, im) = (spectrum.real[k], spectrum.imag[k]);
        spectrum.real[k] = re * re + im * im;
        spectrum.imag[k] = 0.0;
    }
}

/// Copy `samples` and append zeros up to `len` (never truncates)
pub fn zero_pad(samples: &[f32], len: usize) -> Vec<f32> {
    let mut padded = samples.to_vec();
    if padded.len() < len {
        padded.resize(len, 0.0);
    }
    padded
}

/// Zero-pad to `PADDING_FACTOR` times the signal length
pub fn pad_for_linear(samples: &[f32]) -> Vec<f32> {
    zero_pad(samples, samples.len() * PADDING_FACTOR)
}

/// Divide every lag by the zero-lag value
///
/// # Errors
///
/// Returns `AutocorrError::InvalidInput` if `acf` is empty or its zero-lag value is 0.
pub fn normalize_to_lag_zero(acf: &[f32]) -> Result<Vec<f32>> {
    let lag_zero = *acf
        .first()
        .ok_or_else(|| AutocorrError::InvalidInput("empty autocorrelation".into()))?;
    if lag_zero == 0.0 {
        return Err(AutocorrError::InvalidInput(
            "zero-lag value is 0; signal has no energy".into(),
        ));
    }
    Ok(acf.iter().map(|&x| x / lag_zero).collect())
}

/// Direct O(N²) linear autocorrelation `r[k] = Σ x[i]·x[i+k]` for `k < lags`
///
/// Lags at or beyond the signal length are 0.
pub fn direct_autocorrelation(samples: &[f32], lags: usize) -> Vec<f32> {
    (0..lags)
        .map(|k| {
            samples
                .iter()
                .zip(samples.iter().skip(k))
                .map(|(a, b)| a * b)
                .sum::<f32>()
        })
        .collect()
}
