//! Linear autocorrelation of real signals via the FFT power spectrum
//!
//! Synthesizes a noisy three-harmonic square wave for testing and computes its linear
//! autocorrelation with a packed real FFT (`realfft`).

pub mod error;
pub mod packing;
pub mod transform;
pub mod autocorrelation;
pub mod synth;

pub use autocorrelation::{
    autocorrelate_with, compute_linear_autocorrelation, direct_autocorrelation, normalize_to_lag_zero,
    pad_for_linear, zero_pad, Autocorrelator,
};
pub use error::{AutocorrError, Result};
pub use packing::{pack, unpack, SplitComplex};
pub use synth::{synthesize, SquareWave};
pub use transform::{RealTransform, TransformSetup};

// Signal defaults
pub const DEFAULT_SAMPLE_RATE: f32 = 1024.0; // Hz
pub const DEFAULT_FREQUENCY: f32 = 5.0; // Hz
pub const DEFAULT_DURATION: f32 = 1.0; // seconds
pub const NOISE_MAGNITUDE: f32 = 0.15;
pub const MAX_SAMPLES: usize = 1 << 28; // upper bound on synthesized signal length

// Transform configuration
pub const PADDING_FACTOR: usize = 2; // zero-padded length / signal length
pub const MAX_LOG2N: u32 = 30;
