//! Spectral band classification of a mono signal.
//!
//! The signal is cut into fixed-size chunks. Each chunk is windowed, run
//! through an FFT and its magnitude spectrum is summed into three bands split
//! at the low and mid thresholds. The dominant band becomes the chunk label,
//! and runs of equal labels are merged into a [`TaggedSequence`].
//!
//! An incomplete trailing chunk is dropped. A signal shorter than one chunk
//! is analyzed as a single chunk so that a non-empty signal never yields an
//! empty sequence.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::buffer::AudioBuffer;
use crate::error::{VocalSwapError, VocalSwapResult};
use crate::tags::{Label, TaggedSequence};

/// Default boundary between the low and mid bands.
pub const DEFAULT_LOW_THRESH_HZ: f64 = 500.0;
/// Default boundary between the mid and high bands.
pub const DEFAULT_MID_THRESH_HZ: f64 = 2000.0;
/// Default analysis chunk length.
pub const DEFAULT_CHUNK_MS: f64 = 100.0;

/// Classifier parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierParams {
    /// Frequencies below this are in the low band (Hz).
    pub low_thresh_hz: f64,
    /// Frequencies at or above this are in the high band (Hz).
    pub mid_thresh_hz: f64,
    /// Chunk length in milliseconds.
    pub chunk_ms: f64,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            low_thresh_hz: DEFAULT_LOW_THRESH_HZ,
            mid_thresh_hz: DEFAULT_MID_THRESH_HZ,
            chunk_ms: DEFAULT_CHUNK_MS,
        }
    }
}

impl ClassifierParams {
    /// Creates parameters with explicit thresholds and chunk length.
    pub fn new(low_thresh_hz: f64, mid_thresh_hz: f64, chunk_ms: f64) -> Self {
        Self {
            low_thresh_hz,
            mid_thresh_hz,
            chunk_ms,
        }
    }

    /// Checks `0 < low < mid` and `chunk_ms > 0`.
    pub fn validate(&self) -> VocalSwapResult<()> {
        if !self.chunk_ms.is_finite() || self.chunk_ms <= 0.0 {
            return Err(VocalSwapError::invalid_input(format!(
                "chunk_ms must be positive, got {}",
                self.chunk_ms
            )));
        }
        if !self.low_thresh_hz.is_finite() || self.low_thresh_hz <= 0.0 {
            return Err(VocalSwapError::invalid_input(format!(
                "low threshold must be positive, got {} Hz",
                self.low_thresh_hz
            )));
        }
        if !self.mid_thresh_hz.is_finite() || self.mid_thresh_hz <= self.low_thresh_hz {
            return Err(VocalSwapError::invalid_input(format!(
                "mid threshold ({} Hz) must be greater than low threshold ({} Hz)",
                self.mid_thresh_hz, self.low_thresh_hz
            )));
        }
        Ok(())
    }

    /// Chunk length in samples at `sample_rate`.
    pub fn chunk_samples(&self, sample_rate: u32) -> usize {
        (self.chunk_ms / 1000.0 * sample_rate as f64).round() as usize
    }
}

/// Summed spectral magnitude per band for one chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BandEnergies {
    /// Energy below the low threshold.
    pub low: f64,
    /// Energy between the thresholds.
    pub mid: f64,
    /// Energy at or above the mid threshold.
    pub high: f64,
}

impl BandEnergies {
    /// Picks the dominant label.
    ///
    /// High wins only when strictly greater than both others; otherwise mid
    /// wins when strictly greater than low; ties fall to low.
    pub fn label(&self) -> Label {
        if self.high > self.mid && self.high > self.low {
            Label::High
        } else if self.mid > self.low {
            Label::Medium
        } else {
            Label::Low
        }
    }
}

/// Classifies `signal` into contiguous labelled intervals.
///
/// # Errors
/// Returns [`VocalSwapError::InvalidInput`] for an empty signal, a zero
/// sample rate, or parameters that violate `0 < low < mid` / `chunk_ms > 0`.
pub fn classify(signal: &AudioBuffer, params: &ClassifierParams) -> VocalSwapResult<TaggedSequence> {
    params.validate()?;

    if signal.is_empty() {
        return Err(VocalSwapError::invalid_input("cannot classify an empty signal"));
    }
    let sample_rate = signal.sample_rate();
    if sample_rate == 0 {
        return Err(VocalSwapError::invalid_input("sample rate must be non-zero"));
    }

    let chunk_samples = params.chunk_samples(sample_rate);
    if chunk_samples == 0 {
        return Err(VocalSwapError::invalid_input(format!(
            "chunk of {} ms is shorter than one sample at {} Hz",
            params.chunk_ms, sample_rate
        )));
    }

    // Short signals are analyzed whole.
    let chunk_samples = chunk_samples.min(signal.len());
    let analyzer = ChunkAnalyzer::new(chunk_samples, sample_rate, params);

    let labels = signal
        .samples()
        .chunks_exact(chunk_samples)
        .enumerate()
        .map(|(i, chunk)| {
            let energies = analyzer.band_energies(chunk);
            let label = energies.label();
            debug!(
                chunk = i,
                low = energies.low,
                mid = energies.mid,
                high = energies.high,
                label = %label,
                "classified chunk"
            );
            label
        });

    let sequence = TaggedSequence::from_chunk_labels(labels, chunk_samples, sample_rate);
    debug!(
        intervals = sequence.len(),
        span_seconds = sequence.span_seconds(),
        "classification complete"
    );
    Ok(sequence)
}

/// Reusable FFT plan, window and band boundaries for one chunk size.
struct ChunkAnalyzer {
    fft: Arc<dyn Fft<f64>>,
    window: Vec<f64>,
    low_end: usize,
    mid_end: usize,
    num_bins: usize,
}

impl ChunkAnalyzer {
    fn new(chunk_samples: usize, sample_rate: u32, params: &ClassifierParams) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(chunk_samples);

        let window = hann_window(chunk_samples);

        // Bins 0..=N/2 hold the non-negative frequencies.
        let num_bins = chunk_samples / 2 + 1;
        let freq_resolution = sample_rate as f64 / chunk_samples as f64;
        let low_end = ((params.low_thresh_hz / freq_resolution).ceil() as usize).min(num_bins);
        let mid_end = ((params.mid_thresh_hz / freq_resolution).ceil() as usize).min(num_bins);

        Self {
            fft,
            window,
            low_end,
            mid_end,
            num_bins,
        }
    }

    fn band_energies(&self, chunk: &[f64]) -> BandEnergies {
        let mut buffer: Vec<Complex<f64>> = chunk
            .iter()
            .zip(self.window.iter())
            .map(|(&s, &w)| Complex::new(s * w, 0.0))
            .collect();

        self.fft.process(&mut buffer);

        let magnitudes = buffer.iter().take(self.num_bins).map(|c| c.norm());
        magnitudes
            .enumerate()
            .fold(BandEnergies::default(), |mut acc, (bin, mag)| {
                if bin < self.low_end {
                    acc.low += mag;
                } else if bin < self.mid_end {
                    acc.mid += mag;
                } else {
                    acc.high += mag;
                }
                acc
            })
    }
}

/// Periodic Hann window.
fn hann_window(size: usize) -> Vec<f64> {
    if size == 1 {
        return vec![1.0];
    }
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / size as f64).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sine(freq: f64, seconds: f64, sample_rate: u32) -> Vec<f64> {
        let n = (seconds * sample_rate as f64).round() as usize;
        (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate as f64).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_label_rule_ties() {
        let tie = BandEnergies {
            low: 1.0,
            mid: 1.0,
            high: 0.0,
        };
        assert_eq!(tie.label(), Label::Low);

        let high_tie = BandEnergies {
            low: 0.0,
            mid: 2.0,
            high: 2.0,
        };
        assert_eq!(high_tie.label(), Label::Medium);

        assert_eq!(BandEnergies::default().label(), Label::Low);
    }

    #[test]
    fn test_validate_rejects_bad_params() {
        assert!(ClassifierParams::new(2000.0, 500.0, 100.0).validate().is_err());
        assert!(ClassifierParams::new(0.0, 500.0, 100.0).validate().is_err());
        assert!(ClassifierParams::new(500.0, 2000.0, 0.0).validate().is_err());
        assert!(ClassifierParams::new(500.0, 2000.0, -5.0).validate().is_err());
        assert!(ClassifierParams::default().validate().is_ok());
    }

    #[test]
    fn test_empty_signal_is_invalid() {
        let err = classify(&AudioBuffer::new(vec![], 16000), &ClassifierParams::default())
            .unwrap_err();
        assert!(matches!(err, VocalSwapError::InvalidInput { .. }));
    }

    #[test]
    fn test_single_band_signals() {
        let params = ClassifierParams::default();
        for (freq, expected) in [(200.0, Label::Low), (1000.0, Label::Medium), (5000.0, Label::High)] {
            let signal = AudioBuffer::new(sine(freq, 0.5, 16000), 16000);
            let seq = classify(&signal, &params).unwrap();
            assert_eq!(seq.len(), 1, "{} Hz should give one interval", freq);
            assert_eq!(seq.entries()[0].label, expected);
        }
    }

    #[test]
    fn test_trailing_partial_chunk_dropped() {
        // 0.25 s with 100 ms chunks: two full chunks, 50 ms dropped.
        let signal = AudioBuffer::new(sine(200.0, 0.25, 16000), 16000);
        let seq = classify(&signal, &ClassifierParams::default()).unwrap();
        assert_eq!(seq.entries().last().unwrap().end, 0.2);
    }

    #[test]
    fn test_short_signal_single_chunk() {
        let signal = AudioBuffer::new(sine(5000.0, 0.05, 16000), 16000);
        let seq = classify(&signal, &ClassifierParams::default()).unwrap();
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.entries()[0].start, 0.0);
        assert_eq!(seq.entries()[0].end, 0.05);
    }

    #[test]
    fn test_silence_is_low() {
        let signal = AudioBuffer::silence(16000, 16000);
        let seq = classify(&signal, &ClassifierParams::default()).unwrap();
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.entries()[0].label, Label::Low);
    }
}
