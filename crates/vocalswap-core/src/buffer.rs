//! Mono PCM buffer with a fixed sample rate.

/// An ordered sequence of mono samples at a fixed sample rate.
///
/// Buffers are never mutated once built; every transform returns a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f64>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Creates a buffer from mono samples.
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Creates a buffer of `num_samples` zeros.
    pub fn silence(num_samples: usize, sample_rate: u32) -> Self {
        Self::new(vec![0.0; num_samples], sample_rate)
    }

    /// Creates a silent buffer lasting `seconds` (rounded to the nearest sample).
    pub fn silence_for(seconds: f64, sample_rate: u32) -> Self {
        Self::silence(seconds_to_samples(seconds, sample_rate), sample_rate)
    }

    /// Creates a mono buffer from interleaved multi-channel samples by averaging
    /// each frame.
    pub fn from_interleaved(interleaved: &[f64], channels: u16, sample_rate: u32) -> Self {
        if channels <= 1 {
            return Self::new(interleaved.to_vec(), sample_rate);
        }

        let samples = interleaved
            .chunks_exact(channels as usize)
            .map(|frame| frame.iter().sum::<f64>() / channels as f64)
            .collect();
        Self::new(samples, sample_rate)
    }

    /// Returns the samples.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Consumes the buffer, returning its samples.
    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    /// Returns the sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Returns a copy of the samples in `[start, end)`, clamped to the buffer.
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.samples.len());
        let start = start.min(end);
        Self::new(self.samples[start..end].to_vec(), self.sample_rate)
    }

    /// Returns true if every sample is exactly zero.
    pub fn is_silent(&self) -> bool {
        self.samples.iter().all(|&s| s == 0.0)
    }

    /// Sum of squared samples.
    pub fn energy(&self) -> f64 {
        self.samples.iter().map(|s| s * s).sum()
    }

    /// Resamples to `target_rate` with linear interpolation.
    ///
    /// Returns a clone when the rates already match.
    pub fn resample_linear(&self, target_rate: u32) -> Self {
        if target_rate == self.sample_rate || self.sample_rate == 0 || self.is_empty() {
            return Self::new(self.samples.clone(), target_rate);
        }

        let output_len = ((self.samples.len() as f64 * target_rate as f64
            / self.sample_rate as f64)
            .round() as usize)
            .max(1);

        if self.samples.len() == 1 {
            return Self::new(vec![self.samples[0]; output_len], target_rate);
        }

        let ratio = (self.samples.len() - 1) as f64 / (output_len - 1).max(1) as f64;
        let last = self.samples.len() - 1;
        let samples = (0..output_len)
            .map(|i| {
                let pos = i as f64 * ratio;
                let idx = pos as usize;
                let frac = pos - idx as f64;
                if idx < last {
                    self.samples[idx] * (1.0 - frac) + self.samples[idx + 1] * frac
                } else {
                    self.samples[last]
                }
            })
            .collect();

        Self::new(samples, target_rate)
    }
}

/// Converts seconds to a sample count, rounding to the nearest sample.
///
/// Negative and non-finite durations map to zero samples.
pub fn seconds_to_samples(seconds: f64, sample_rate: u32) -> usize {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * sample_rate as f64).round() as usize
}
