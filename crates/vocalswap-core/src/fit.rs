//! Segment length normalization.
//!
//! Brings a buffer to an exact length by truncating it or by repeating it
//! end to end. Loop seams are plain concatenation with no crossfade.

use tracing::debug;

use crate::buffer::{seconds_to_samples, AudioBuffer};

/// Returns a buffer of exactly `round(target_seconds * sample_rate)` samples.
///
/// Longer sources are truncated from the start, shorter ones are looped. An
/// empty source yields silence of the target length.
pub fn fit_to_duration(buffer: &AudioBuffer, target_seconds: f64) -> AudioBuffer {
    fit_to_len(buffer, seconds_to_samples(target_seconds, buffer.sample_rate()))
}

/// Returns a buffer of exactly `target_len` samples.
///
/// Same policy as [`fit_to_duration`], expressed in samples.
pub fn fit_to_len(buffer: &AudioBuffer, target_len: usize) -> AudioBuffer {
    let source = buffer.samples();
    let sample_rate = buffer.sample_rate();

    if source.is_empty() {
        if target_len > 0 {
            debug!(target_len, "empty source, substituting silence");
        }
        return AudioBuffer::silence(target_len, sample_rate);
    }

    if target_len <= source.len() {
        return AudioBuffer::new(source[..target_len].to_vec(), sample_rate);
    }

    let samples: Vec<f64> = source.iter().copied().cycle().take(target_len).collect();
    AudioBuffer::new(samples, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_truncate() {
        let buffer = AudioBuffer::new(vec![1.0, 2.0, 3.0, 4.0], 4);
        let fitted = fit_to_duration(&buffer, 0.5);
        assert_eq!(fitted.samples(), &[1.0, 2.0]);
    }

    #[test]
    fn test_loop() {
        let buffer = AudioBuffer::new(vec![1.0, 2.0, 3.0], 10);
        let fitted = fit_to_duration(&buffer, 0.8);
        assert_eq!(fitted.samples(), &[1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_exact_length_unchanged() {
        let buffer = AudioBuffer::new(vec![0.1, 0.2], 2);
        assert_eq!(fit_to_duration(&buffer, 1.0), buffer);
    }

    #[test]
    fn test_empty_source_gives_silence() {
        let buffer = AudioBuffer::new(vec![], 16000);
        let fitted = fit_to_duration(&buffer, 0.25);
        assert_eq!(fitted.len(), 4000);
        assert!(fitted.is_silent());
    }

    #[test]
    fn test_zero_and_negative_targets() {
        let buffer = AudioBuffer::new(vec![1.0; 10], 100);
        assert!(fit_to_duration(&buffer, 0.0).is_empty());
        assert!(fit_to_duration(&buffer, -1.0).is_empty());
    }

    #[test]
    fn test_length_exact_across_targets() {
        let sample_rate = 44100;
        let sources = [0usize, 1, 7, 4410, 100_000];
        let targets = [0.001, 0.0333, 0.1, 0.49999, 1.0, 2.345];

        for &len in &sources {
            let buffer = AudioBuffer::new((0..len).map(|i| i as f64).collect(), sample_rate);
            for &target in &targets {
                let expected = (target * sample_rate as f64).round() as usize;
                assert_eq!(
                    fit_to_duration(&buffer, target).len(),
                    expected,
                    "len {} target {}",
                    len,
                    target
                );
            }
        }
    }
}
