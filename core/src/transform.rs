//! Packed real FFT capability
//!
//! [`RealTransform`] is the seam between the autocorrelation engine and an FFT library. Both
//! directions work in place on a [`SplitComplex`] buffer of `N/2` values using the layout
//! documented in [`crate::packing`]:
//!
//! - `forward_real` takes `N` packed time-domain samples and returns the packed half spectrum,
//!   scaled by [`RealTransform::forward_gain`] relative to the unnormalized DFT.
//! - `inverse_real` takes a packed half spectrum and returns `N` packed time-domain samples,
//!   scaled by [`RealTransform::inverse_gain`] relative to the normalized inverse DFT. The
//!   inverse performs its own unpacking, so no separate unpack stage follows it.
//!
//! [`TransformSetup`] implements the capability on top of `realfft` and owns every buffer and
//! plan for one transform size. It is released when dropped.

use crate::error::{AutocorrError, Result};
use crate::packing::{pack_into, pack_spectrum, unpack_into, unpack_spectrum, SplitComplex};
use crate::MAX_LOG2N;
use log::trace;
use realfft::num_complex::Complex;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use std::sync::Arc;

/// Forward and inverse real transforms over the packed split-complex layout
pub trait RealTransform {
    /// Transform size `N` in real samples
    fn size(&self) -> usize;

    /// Factor by which `forward_real` output exceeds the unnormalized DFT
    fn forward_gain(&self) -> f32;

    /// Factor by which `inverse_real` output exceeds the normalized inverse DFT
    fn inverse_gain(&self) -> f32;

    /// Real-to-complex transform in place on `N/2` packed values
    fn forward_real(&mut self, buffer: &mut SplitComplex) -> Result<()>;

    /// Complex-to-real transform in place on `N/2` packed values
    fn inverse_real(&mut self, buffer: &mut SplitComplex) -> Result<()>;
}

/// Plans and buffers for one power-of-two transform size, backed by `realfft`
///
/// Follows the radix-2 packed convention: the forward output is twice the DFT, and the
/// inverse output is `N` times the signal, so a forward/inverse round trip scales by `2N`.
pub struct TransformSetup {
    log2n: u32,
    forward: Arc<dyn RealToComplex<f32>>,
    inverse: Arc<dyn ComplexToReal<f32>>,
    time: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    forward_scratch: Vec<Complex<f32>>,
    inverse_scratch: Vec<Complex<f32>>,
}

impl TransformSetup {
    /// Acquire a setup for `N = 2^log2n` with a fresh planner
    pub fn new(log2n: u32) -> Result<Self> {
        Self::with_planner(&mut RealFftPlanner::new(), log2n)
    }

    /// Acquire a setup for `N = 2^log2n`, reusing plans cached in `planner`
    ///
    /// # Errors
    ///
    /// Returns `AutocorrError::UnsupportedWindowSize` when `log2n` is 0 (no complex pair to
    /// pack) or exceeds `MAX_LOG2N`.
    pub fn with_planner(planner: &mut RealFftPlanner<f32>, log2n: u32) -> Result<Self> {
        if log2n == 0 || log2n > MAX_LOG2N {
            return Err(AutocorrError::UnsupportedWindowSize(
                1usize.checked_shl(log2n).unwrap_or(usize::MAX),
            ));
        }

        let n = 1usize << log2n;
        let forward = planner.plan_fft_forward(n);
        let inverse = planner.plan_fft_inverse(n);
        trace!("Acquired transform setup for N={}", n);

        Ok(Self {
            log2n,
            time: forward.make_input_vec(),
            spectrum: forward.make_output_vec(),
            forward_scratch: forward.make_scratch_vec(),
            inverse_scratch: inverse.make_scratch_vec(),
            forward,
            inverse,
        })
    }

    pub fn log2n(&self) -> u32 {
        self.log2n
    }

    fn check_buffer(&self, buffer: &SplitComplex) -> Result<()> {
        let half = self.size() / 2;
        if buffer.len() != half || buffer.imag.len() != half {
            return Err(AutocorrError::FftError(format!(
                "expected {} packed values, got {} real / {} imaginary",
                half,
                buffer.real.len(),
                buffer.imag.len()
            )));
        }
        Ok(())
    }
}

impl RealTransform for TransformSetup {
    fn size(&self) -> usize {
        1 << self.log2n
    }

    fn forward_gain(&self) -> f32 {
        2.0
    }

    fn inverse_gain(&self) -> f32 {
        self.size() as f32
    }

    fn forward_real(&mut self, buffer: &mut SplitComplex) -> Result<()> {
        self.check_buffer(buffer)?;
        unpack_into(buffer, &mut self.time);

        self.forward
            .process_with_scratch(&mut self.time, &mut self.spectrum, &mut self.forward_scratch)
            .map_err(|e| AutocorrError::FftError(format!("FFT forward process failed: {:?}", e)))?;

        let gain = self.forward_gain();
        pack_spectrum(&self.spectrum, gain, buffer);
        Ok(())
    }

    fn inverse_real(&mut self, buffer: &mut SplitComplex) -> Result<()> {
        self.check_buffer(buffer)?;
        unpack_spectrum(buffer, &mut self.spectrum);

        self.inverse
            .process_with_scratch(&mut self.spectrum, &mut self.time, &mut self.inverse_scratch)
            .map_err(|e| AutocorrError::FftError(format!("FFT inverse process failed: {:?}", e)))?;

        pack_into(&self.time, buffer);
        Ok(())
    }
}

impl Drop for TransformSetup {
    fn drop(&mut self) {
        trace!("Released transform setup for N={}", self.size());
    }
}
