//! Coarse band matching of voice samples to the instrumental.
//!
//! The instrumental's dominant band is estimated once per run by comparing the
//! energy left after a bass lowpass against the energy left after a wider
//! lowpass. Voice samples are then filtered into that band. Matching is
//! cosmetic: any filter failure passes the voice through unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::buffer::AudioBuffer;
use crate::error::VocalSwapResult;
use crate::filter::FilterChain;

/// Default bass cutoff in Hz.
pub const DEFAULT_BASS_CUTOFF_HZ: f64 = 500.0;
/// Default mid cutoff in Hz.
pub const DEFAULT_MID_CUTOFF_HZ: f64 = 2000.0;

/// Biquad sections per filter (two sections = 24 dB/octave).
const FILTER_ORDER: usize = 2;

/// Band an instrumental is considered to sit in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    /// Bass-heavy.
    Low,
    /// Mid-range.
    Mid,
}

impl Band {
    /// Returns the string identifier for this band.
    pub fn as_str(&self) -> &'static str {
        match self {
            Band::Low => "low",
            Band::Mid => "mid",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estimates bands and reshapes voices with fixed cutoffs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyMatcher {
    /// Bass lowpass cutoff in Hz.
    pub bass_cutoff_hz: f64,
    /// Mid lowpass cutoff in Hz.
    pub mid_cutoff_hz: f64,
}

impl Default for FrequencyMatcher {
    fn default() -> Self {
        Self {
            bass_cutoff_hz: DEFAULT_BASS_CUTOFF_HZ,
            mid_cutoff_hz: DEFAULT_MID_CUTOFF_HZ,
        }
    }
}

impl FrequencyMatcher {
    /// Creates a matcher with explicit cutoffs.
    pub fn new(bass_cutoff_hz: f64, mid_cutoff_hz: f64) -> Self {
        Self {
            bass_cutoff_hz,
            mid_cutoff_hz,
        }
    }

    /// Estimates the dominant band of `instrumental`.
    ///
    /// Returns [`Band::Mid`] when the wider lowpass keeps more energy than the
    /// bass lowpass, else [`Band::Low`]. Falls back to [`Band::Low`] when the
    /// buffer is empty or the filters cannot be built for its sample rate.
    pub fn dominant_band(&self, instrumental: &AudioBuffer) -> Band {
        if instrumental.is_empty() {
            return Band::Low;
        }

        let energies = self.lowpass_energy(instrumental, self.bass_cutoff_hz).and_then(|bass| {
            self.lowpass_energy(instrumental, self.mid_cutoff_hz)
                .map(|wide| (bass, wide))
        });

        match energies {
            Ok((bass, wide)) => {
                let band = if wide > bass { Band::Mid } else { Band::Low };
                debug!(bass_energy = bass, wide_energy = wide, band = %band, "estimated dominant band");
                band
            }
            Err(e) => {
                warn!(error = %e, "band estimation failed, assuming low band");
                Band::Low
            }
        }
    }

    /// Filters `voice` into `band`, passing it through unchanged on failure.
    pub fn reshape(&self, voice: &AudioBuffer, band: Band) -> AudioBuffer {
        match self.try_reshape(voice, band) {
            Ok(shaped) => shaped,
            Err(e) => {
                warn!(error = %e, band = %band, "voice reshape failed, using unfiltered voice");
                voice.clone()
            }
        }
    }

    /// Filters `voice` into `band`.
    ///
    /// [`Band::Low`] applies the bass lowpass; [`Band::Mid`] applies a
    /// highpass at the bass cutoff followed by the mid lowpass.
    pub fn try_reshape(&self, voice: &AudioBuffer, band: Band) -> VocalSwapResult<AudioBuffer> {
        let sample_rate = voice.sample_rate();
        let chain = match band {
            Band::Low => FilterChain::new().lowpass(self.bass_cutoff_hz, FILTER_ORDER, sample_rate)?,
            Band::Mid => FilterChain::new()
                .highpass(self.bass_cutoff_hz, FILTER_ORDER, sample_rate)?
                .lowpass(self.mid_cutoff_hz, FILTER_ORDER, sample_rate)?,
        };
        chain.apply(voice)
    }

    fn lowpass_energy(&self, buffer: &AudioBuffer, cutoff: f64) -> VocalSwapResult<f64> {
        let chain = FilterChain::new().lowpass(cutoff, FILTER_ORDER, buffer.sample_rate())?;
        Ok(chain.apply(buffer)?.energy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, ClassifierParams};
    use crate::tags::Label;
    use std::f64::consts::PI;

    fn sine(freq: f64, seconds: f64, sample_rate: u32) -> AudioBuffer {
        let n = (seconds * sample_rate as f64) as usize;
        AudioBuffer::new(
            (0..n)
                .map(|i| (2.0 * PI * freq * i as f64 / sample_rate as f64).sin() * 0.5)
                .collect(),
            sample_rate,
        )
    }

    #[test]
    fn test_mid_content_is_mid() {
        let matcher = FrequencyMatcher::default();
        assert_eq!(matcher.dominant_band(&sine(1000.0, 0.5, 16000)), Band::Mid);
    }

    #[test]
    fn test_empty_is_low() {
        let matcher = FrequencyMatcher::default();
        assert_eq!(matcher.dominant_band(&AudioBuffer::new(vec![], 16000)), Band::Low);
    }

    #[test]
    fn test_invalid_rate_falls_back() {
        // 2000 Hz cutoff is above Nyquist at 3 kHz.
        let matcher = FrequencyMatcher::default();
        assert_eq!(matcher.dominant_band(&sine(100.0, 0.5, 3000)), Band::Low);
    }

    #[test]
    fn test_reshape_failure_passes_through() {
        let matcher = FrequencyMatcher::default();
        let voice = sine(100.0, 0.1, 3000);
        assert_eq!(matcher.reshape(&voice, Band::Mid), voice);
    }

    #[test]
    fn test_reshape_low_removes_highs() {
        let matcher = FrequencyMatcher::default();
        let voice = sine(4000.0, 0.5, 16000);
        let shaped = matcher.reshape(&voice, Band::Low);
        assert_eq!(shaped.len(), voice.len());
        assert!(shaped.energy() < voice.energy() * 0.01);
    }

    #[test]
    fn test_reshape_is_stable_under_reapplication() {
        let matcher = FrequencyMatcher::default();
        let voice = AudioBuffer::new(
            sine(200.0, 0.5, 16000)
                .samples()
                .iter()
                .zip(sine(1200.0, 0.5, 16000).samples())
                .zip(sine(5000.0, 0.5, 16000).samples())
                .map(|((a, b), c)| a + b + c)
                .collect(),
            16000,
        );

        let params = ClassifierParams::default();
        let labels = |buffer: &AudioBuffer| -> Vec<Label> {
            classify(buffer, &params).unwrap().iter().map(|t| t.label).collect()
        };

        for (band, expected) in [(Band::Low, Label::Low), (Band::Mid, Label::Medium)] {
            let once = matcher.reshape(&voice, band);
            let twice = matcher.reshape(&once, band);
            assert_eq!(labels(&once), vec![expected]);
            assert_eq!(labels(&twice), labels(&once));
        }
    }
}
