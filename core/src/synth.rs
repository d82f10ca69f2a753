//! Square-wave test signal synthesis
//!
//! Builds a truncated Fourier series of a square wave from the 1st, 3rd and 5th
//! harmonics and adds uniform noise to every sample:
//!
//! ```text
//! x[i] = sin(θ) + sin(3θ)/3 + sin(5θ)/5 + noise,   θ = 2π · (f / r) · i
//! ```
//!
//! The levels are only approximately ±1. Callers must not assume exact square-wave levels.

use crate::error::{AutocorrError, Result};
use crate::{MAX_SAMPLES, NOISE_MAGNITUDE};
use rand::Rng;
use std::f32::consts::PI;

/// Parameters of a synthesized square wave
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquareWave {
    /// Fundamental frequency in Hz
    pub frequency: f32,
    /// Samples per second
    pub sample_rate: f32,
    /// Length of the signal in seconds
    pub duration: f32,
    /// Half-width of the uniform noise interval `[-m, m]`
    pub noise_magnitude: f32,
}

impl SquareWave {
    /// Validate the parameters and use the default noise magnitude
    ///
    /// # Errors
    ///
    /// Returns `AutocorrError::InvalidInput` for a non-positive frequency or sample rate,
    /// a negative duration, any non-finite value, or more than `MAX_SAMPLES` samples.
    pub fn new(frequency: f32, sample_rate: f32, duration: f32) -> Result<Self> {
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(AutocorrError::InvalidInput(format!(
                "frequency must be positive, got {}",
                frequency
            )));
        }
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(AutocorrError::InvalidInput(format!(
                "sample rate must be positive, got {}",
                sample_rate
            )));
        }
        if !duration.is_finite() || duration < 0.0 {
            return Err(AutocorrError::InvalidInput(format!(
                "duration must not be negative, got {}",
                duration
            )));
        }
        let total = duration as f64 * sample_rate as f64;
        if !total.is_finite() || total > MAX_SAMPLES as f64 {
            return Err(AutocorrError::InvalidInput(format!(
                "{} s at {} Hz exceeds the limit of {} samples",
                duration, sample_rate, MAX_SAMPLES
            )));
        }

        Ok(Self {
            frequency,
            sample_rate,
            duration,
            noise_magnitude: NOISE_MAGNITUDE,
        })
    }

    /// Replace the noise magnitude (0 disables noise)
    pub fn with_noise(mut self, magnitude: f32) -> Result<Self> {
        if !magnitude.is_finite() || magnitude < 0.0 {
            return Err(AutocorrError::InvalidInput(format!(
                "noise magnitude must not be negative, got {}",
                magnitude
            )));
        }
        self.noise_magnitude = magnitude;
        Ok(self)
    }

    /// Number of samples produced: `floor(duration * sample_rate)`
    pub fn sample_count(&self) -> usize {
        (self.duration as f64 * self.sample_rate as f64).floor() as usize
    }

    /// Synthesize using the thread-local RNG
    pub fn synthesize(&self) -> Vec<f32> {
        self.synthesize_with(&mut rand::thread_rng())
    }

    /// Synthesize drawing noise from `rng`
    ///
    /// Seeded generators give reproducible output.
    pub fn synthesize_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f32> {
        let angle_delta = (self.frequency / self.sample_rate) * 2.0 * PI;

        (0..self.sample_count())
            .map(|i| {
                let theta = angle_delta * i as f32;
                let value = theta.sin() + (3.0 * theta).sin() / 3.0 + (5.0 * theta).sin() / 5.0;
                value + noise(rng, self.noise_magnitude)
            })
            .collect()
    }
}

/// Uniform random value in `[-magnitude, magnitude]`
pub fn noise<R: Rng + ?Sized>(rng: &mut R, magnitude: f32) -> f32 {
    if magnitude == 0.0 {
        return 0.0;
    }
    rng.gen_range(-magnitude..=magnitude)
}

/// Synthesize a noisy square wave with the default noise magnitude
///
/// # Errors
///
/// Returns `AutocorrError::InvalidInput` if the parameters are rejected by [`SquareWave::new`].
pub fn synthesize(frequency: f32, sample_rate: f32, duration: f32) -> Result<Vec<f32>> {
    Ok(SquareWave::new(frequency, sample_rate, duration)?.synthesize())
}
