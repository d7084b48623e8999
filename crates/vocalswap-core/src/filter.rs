//! Biquad lowpass/highpass filters.
//!
//! Coefficients follow the Audio EQ Cookbook. Filters are cascaded into a
//! [`FilterChain`] for steeper slopes.

use std::f64::consts::PI;

use crate::buffer::AudioBuffer;
use crate::error::{VocalSwapError, VocalSwapResult};

/// Butterworth Q for a single second-order section.
pub const BUTTERWORTH_Q: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Biquad filter coefficients, normalized by `a0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoeffs {
    /// Creates lowpass filter coefficients.
    ///
    /// # Arguments
    /// * `cutoff` - Cutoff frequency in Hz, below Nyquist
    /// * `q` - Q factor, 0.707 is Butterworth
    /// * `sample_rate` - Audio sample rate in Hz
    pub fn lowpass(cutoff: f64, q: f64, sample_rate: f64) -> VocalSwapResult<Self> {
        let (cos_omega, alpha) = prewarp(cutoff, q, sample_rate)?;

        let b0 = (1.0 - cos_omega) / 2.0;
        let b1 = 1.0 - cos_omega;
        let b2 = (1.0 - cos_omega) / 2.0;

        Ok(Self::normalized(b0, b1, b2, cos_omega, alpha))
    }

    /// Creates highpass filter coefficients.
    ///
    /// # Arguments
    /// * `cutoff` - Cutoff frequency in Hz, below Nyquist
    /// * `q` - Q factor
    /// * `sample_rate` - Audio sample rate in Hz
    pub fn highpass(cutoff: f64, q: f64, sample_rate: f64) -> VocalSwapResult<Self> {
        let (cos_omega, alpha) = prewarp(cutoff, q, sample_rate)?;

        let b0 = (1.0 + cos_omega) / 2.0;
        let b1 = -(1.0 + cos_omega);
        let b2 = (1.0 + cos_omega) / 2.0;

        Ok(Self::normalized(b0, b1, b2, cos_omega, alpha))
    }

    fn normalized(b0: f64, b1: f64, b2: f64, cos_omega: f64, alpha: f64) -> Self {
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }
}

/// Returns `(cos(omega), alpha)` after validating the cutoff.
fn prewarp(cutoff: f64, q: f64, sample_rate: f64) -> VocalSwapResult<(f64, f64)> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(VocalSwapError::invalid_input(format!(
            "filter sample rate must be positive, got {}",
            sample_rate
        )));
    }
    let nyquist = sample_rate / 2.0;
    if !cutoff.is_finite() || cutoff <= 0.0 || cutoff >= nyquist {
        return Err(VocalSwapError::invalid_input(format!(
            "filter cutoff {} Hz outside (0, {}) Hz",
            cutoff, nyquist
        )));
    }

    // Clamp Q to minimum safe value to prevent division by zero
    let q = q.max(0.5);
    let omega = 2.0 * PI * cutoff / sample_rate;
    Ok((omega.cos(), omega.sin() / (2.0 * q)))
}

/// Biquad filter state.
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    coeffs: BiquadCoeffs,
    // Delay line for input samples
    x1: f64,
    x2: f64,
    // Delay line for output samples
    y1: f64,
    y2: f64,
}

impl BiquadFilter {
    /// Creates a new biquad filter with the given coefficients.
    pub fn new(coeffs: BiquadCoeffs) -> Self {
        Self {
            coeffs,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Resets the filter state.
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    /// Processes a single sample through the filter.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.coeffs.b0 * input + self.coeffs.b1 * self.x1 + self.coeffs.b2 * self.x2
            - self.coeffs.a1 * self.y1
            - self.coeffs.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }
}

/// A cascade of biquad sections applied in order.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    stages: Vec<BiquadFilter>,
}

impl FilterChain {
    /// Creates an empty chain (identity).
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `order` lowpass sections at `cutoff`.
    pub fn lowpass(mut self, cutoff: f64, order: usize, sample_rate: u32) -> VocalSwapResult<Self> {
        let coeffs = BiquadCoeffs::lowpass(cutoff, BUTTERWORTH_Q, sample_rate as f64)?;
        self.stages
            .extend(std::iter::repeat(BiquadFilter::new(coeffs)).take(order));
        Ok(self)
    }

    /// Appends `order` highpass sections at `cutoff`.
    pub fn highpass(mut self, cutoff: f64, order: usize, sample_rate: u32) -> VocalSwapResult<Self> {
        let coeffs = BiquadCoeffs::highpass(cutoff, BUTTERWORTH_Q, sample_rate as f64)?;
        self.stages
            .extend(std::iter::repeat(BiquadFilter::new(coeffs)).take(order));
        Ok(self)
    }

    /// Number of biquad sections.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if the chain has no sections.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Filters a whole buffer from a zeroed state, returning a new buffer.
    ///
    /// Fails if the output contains non-finite samples.
    pub fn apply(&self, input: &AudioBuffer) -> VocalSwapResult<AudioBuffer> {
        let mut stages = self.stages.clone();
        for stage in stages.iter_mut() {
            stage.reset();
        }

        let samples: Vec<f64> = input
            .samples()
            .iter()
            .map(|&s| stages.iter_mut().fold(s, |acc, stage| stage.process(acc)))
            .collect();

        if samples.iter().any(|s| !s.is_finite()) {
            return Err(VocalSwapError::invalid_input(
                "filter produced non-finite samples",
            ));
        }

        Ok(AudioBuffer::new(samples, input.sample_rate()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, n: usize, sample_rate: u32) -> AudioBuffer {
        AudioBuffer::new(
            (0..n)
                .map(|i| (2.0 * PI * freq * i as f64 / sample_rate as f64).sin())
                .collect(),
            sample_rate,
        )
    }

    #[test]
    fn test_lowpass_filter() {
        let mut filter = BiquadFilter::new(BiquadCoeffs::lowpass(1000.0, 0.707, 44100.0).unwrap());

        let mut output = Vec::new();
        for _ in 0..100 {
            output.push(filter.process(1.0));
        }

        // Should converge towards 1.0 for DC input (lowpass passes DC)
        assert!((output[99] - 1.0).abs() < 0.1);
    }

    #[test]
    fn test_highpass_filter() {
        let mut filter =
            BiquadFilter::new(BiquadCoeffs::highpass(1000.0, 0.707, 44100.0).unwrap());

        let mut output = Vec::new();
        for _ in 0..1000 {
            output.push(filter.process(1.0));
        }

        // Should converge towards 0.0 for DC input (highpass blocks DC)
        assert!(output[999].abs() < 0.1);
    }

    #[test]
    fn test_cutoff_above_nyquist_rejected() {
        assert!(BiquadCoeffs::lowpass(9000.0, 0.707, 16000.0).is_err());
        assert!(BiquadCoeffs::highpass(0.0, 0.707, 16000.0).is_err());
        assert!(BiquadCoeffs::lowpass(500.0, 0.707, 0.0).is_err());
    }

    #[test]
    fn test_chain_attenuates_stopband() {
        let sample_rate = 16000;
        let chain = FilterChain::new().lowpass(500.0, 2, sample_rate).unwrap();
        assert_eq!(chain.len(), 2);

        let low = sine(100.0, 16000, sample_rate);
        let high = sine(4000.0, 16000, sample_rate);

        let low_ratio = chain.apply(&low).unwrap().energy() / low.energy();
        let high_ratio = chain.apply(&high).unwrap().energy() / high.energy();

        assert!(low_ratio > 0.8, "passband kept {}", low_ratio);
        assert!(high_ratio < 0.01, "stopband kept {}", high_ratio);
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let buffer = sine(440.0, 64, 8000);
        assert_eq!(FilterChain::new().apply(&buffer).unwrap(), buffer);
    }
}
