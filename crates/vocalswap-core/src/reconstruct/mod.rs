//! Reassembly of substitute voices over the instrumental.
//!
//! Every tagged interval becomes one segment: the voice for its label, fitted
//! to the interval length, mixed over the matching instrumental slice.
//! Segments are laid out in time order.
//!
//! Segment boundaries are computed in samples as `round(t * sample_rate)` on
//! the absolute interval times, so the output length is the sum of the
//! segment lengths and never drifts. Each segment's content comes from its
//! own `[start, end)` only. The instrumental layer is plain concatenation
//! of those slices, so a continuous backing stays continuous at every join.
//! Only the voice layer is crossfaded: the outgoing voice is carried on for
//! `w` samples past its boundary and fades out over the incoming voice's
//! first `w` samples.

mod crossfade;

pub use crossfade::{crossfade_into, equal_power_gains};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::buffer::{seconds_to_samples, AudioBuffer};
use crate::fit::fit_to_len;
use crate::matcher::{Band, FrequencyMatcher};
use crate::tags::{Label, RawTag, TaggedSequence};
use crate::voices::VoiceLibrary;

/// Default crossfade between segments in milliseconds.
pub const DEFAULT_CROSSFADE_MS: f64 = 50.0;
/// Upper bound for the crossfade in milliseconds.
pub const MAX_CROSSFADE_MS: f64 = 100.0;
/// Length of the silent output produced when no segment survives.
pub const DEFAULT_PLACEHOLDER_MS: f64 = 500.0;

/// Reconstruction settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconstructConfig {
    /// Crossfade between consecutive segments, at most [`MAX_CROSSFADE_MS`].
    pub crossfade_ms: f64,
    /// Filter voices into the instrumental's dominant band.
    pub frequency_match: bool,
    /// Gain applied to the voice before mixing.
    pub voice_gain: f64,
    /// Gain applied to the instrumental before mixing.
    pub instrumental_gain: f64,
    /// Duration of the placeholder silence in milliseconds.
    pub placeholder_ms: f64,
}

impl Default for ReconstructConfig {
    fn default() -> Self {
        Self {
            crossfade_ms: DEFAULT_CROSSFADE_MS,
            frequency_match: true,
            voice_gain: 1.0,
            instrumental_gain: 1.0,
            placeholder_ms: DEFAULT_PLACEHOLDER_MS,
        }
    }
}

impl ReconstructConfig {
    /// Sets the crossfade length, clamped to `[0, MAX_CROSSFADE_MS]`.
    pub fn crossfade_ms(mut self, ms: f64) -> Self {
        self.crossfade_ms = if ms.is_finite() {
            ms.clamp(0.0, MAX_CROSSFADE_MS)
        } else {
            0.0
        };
        self
    }

    /// Enables or disables frequency matching.
    pub fn frequency_match(mut self, enabled: bool) -> Self {
        self.frequency_match = enabled;
        self
    }

    /// Sets the voice gain.
    pub fn voice_gain(mut self, gain: f64) -> Self {
        self.voice_gain = gain;
        self
    }

    /// Sets the instrumental gain.
    pub fn instrumental_gain(mut self, gain: f64) -> Self {
        self.instrumental_gain = gain;
        self
    }

    /// Sets the placeholder duration.
    pub fn placeholder_ms(mut self, ms: f64) -> Self {
        self.placeholder_ms = ms;
        self
    }

    fn crossfade_samples(&self, sample_rate: u32) -> usize {
        let ms = self.crossfade_ms.clamp(0.0, MAX_CROSSFADE_MS);
        seconds_to_samples(ms / 1000.0, sample_rate)
    }
}

/// Output of a reconstruction run.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    /// The mixed track.
    pub buffer: AudioBuffer,
    /// Number of segments rendered.
    pub segments: usize,
    /// Entries skipped because of an unknown label or a bad interval.
    pub skipped: usize,
    /// Band the voices were matched to, if matching ran.
    pub band: Option<Band>,
}

impl Reconstruction {
    /// True when no segment was rendered and the buffer is placeholder
    /// silence.
    pub fn is_placeholder(&self) -> bool {
        self.segments == 0
    }
}

/// Builds the output track from tags, voices and an instrumental.
///
/// Voices are resampled to the instrumental's rate and, when enabled,
/// filtered into its dominant band once at construction. The instrumental is
/// borrowed and never modified.
#[derive(Debug)]
pub struct Reconstructor<'a> {
    voices: VoiceLibrary,
    instrumental: &'a AudioBuffer,
    config: ReconstructConfig,
    band: Option<Band>,
}

impl<'a> Reconstructor<'a> {
    /// Prepares voices for `instrumental` with the default matcher.
    pub fn new(voices: &VoiceLibrary, instrumental: &'a AudioBuffer, config: ReconstructConfig) -> Self {
        Self::with_matcher(voices, instrumental, config, &FrequencyMatcher::default())
    }

    /// Prepares voices for `instrumental` with an explicit matcher.
    pub fn with_matcher(
        voices: &VoiceLibrary,
        instrumental: &'a AudioBuffer,
        config: ReconstructConfig,
        matcher: &FrequencyMatcher,
    ) -> Self {
        let sample_rate = instrumental.sample_rate();
        let resampled = voices.resampled_to(sample_rate);

        let (voices, band) = if config.frequency_match {
            let band = matcher.dominant_band(instrumental);
            info!(band = %band, "matching voices to instrumental band");
            (resampled.map(|_, voice| matcher.reshape(voice, band)), Some(band))
        } else {
            (resampled, None)
        };

        Self {
            voices,
            instrumental,
            config,
            band,
        }
    }

    /// Returns the prepared voices.
    pub fn voices(&self) -> &VoiceLibrary {
        &self.voices
    }

    /// Reconstructs from a validated sequence.
    pub fn reconstruct(&self, tagged: &TaggedSequence) -> Reconstruction {
        self.assemble(tagged.iter().map(|t| Some((t.label, t.start, t.end))))
    }

    /// Reconstructs from unvalidated tags.
    ///
    /// Entries with an unknown label or an empty/invalid interval are skipped
    /// with a warning.
    pub fn reconstruct_raw(&self, tags: &[RawTag]) -> Reconstruction {
        self.assemble(tags.iter().map(|tag| {
            let label = match tag.label.parse::<Label>() {
                Ok(label) => label,
                Err(_) => {
                    warn!(label = %tag.label, start = tag.start, end = tag.end, "skipping unknown tag");
                    return None;
                }
            };
            if !tag.start.is_finite() || !tag.end.is_finite() || tag.start < 0.0 || tag.start >= tag.end {
                warn!(label = %tag.label, start = tag.start, end = tag.end, "skipping invalid interval");
                return None;
            }
            Some((label, tag.start, tag.end))
        }))
    }

    fn assemble<I>(&self, entries: I) -> Reconstruction
    where
        I: IntoIterator<Item = Option<(Label, f64, f64)>>,
    {
        let sample_rate = self.instrumental.sample_rate();
        let crossfade_samples = self.config.crossfade_samples(sample_rate);

        let mut voice_layer: Vec<f64> = Vec::new();
        let mut backing_layer: Vec<f64> = Vec::new();
        // Previous voice continued past its end, and that segment's length.
        let mut carried: Option<(Vec<f64>, usize)> = None;
        let mut segments = 0;
        let mut skipped = 0;

        for entry in entries {
            let Some((label, start, end)) = entry else {
                skipped += 1;
                continue;
            };

            let start_idx = seconds_to_samples(start, sample_rate);
            let end_idx = seconds_to_samples(end, sample_rate);
            let len = end_idx.saturating_sub(start_idx);
            if len == 0 {
                debug!(label = %label, start, end, "interval shorter than one sample, skipping");
                skipped += 1;
                continue;
            }

            let (mut voice, tail) = self.voice_segment(label, len, crossfade_samples);
            let overlap = match &carried {
                Some((previous, previous_len)) => {
                    let window = crossfade_samples.min(*previous_len).min(len);
                    if window == 0 && crossfade_samples > 0 {
                        debug!(label = %label, start, "segment too short to crossfade, concatenating");
                    }
                    crossfade_into(&mut voice, previous, window)
                }
                None => 0,
            };

            voice_layer.extend_from_slice(&voice);
            backing_layer.extend_from_slice(self.instrumental_slice(start_idx, end_idx).samples());
            debug!(label = %label, start, end, samples = len, overlap, "appended segment");

            carried = Some((tail, len));
            segments += 1;
        }

        let buffer = if segments == 0 {
            warn!(
                placeholder_ms = self.config.placeholder_ms,
                "no segments produced, writing placeholder silence"
            );
            AudioBuffer::silence_for(self.config.placeholder_ms / 1000.0, sample_rate)
        } else {
            overlay(
                &AudioBuffer::new(voice_layer, sample_rate),
                &AudioBuffer::new(backing_layer, sample_rate),
                self.config.voice_gain,
                self.config.instrumental_gain,
            )
        };

        info!(
            segments,
            skipped,
            seconds = buffer.duration_seconds(),
            "reconstruction complete"
        );

        Reconstruction {
            buffer,
            segments,
            skipped,
            band: self.band,
        }
    }

    /// Voice for one segment of `len` samples, plus `extra` samples of the
    /// same fitted voice continuing past the segment end.
    fn voice_segment(&self, label: Label, len: usize, extra: usize) -> (Vec<f64>, Vec<f64>) {
        let mut samples = fit_to_len(self.voices.get(label), len + extra).into_samples();
        let tail = samples.split_off(len);
        (samples, tail)
    }

    /// Instrumental for `[from, to)`, exactly `to - from` samples long.
    ///
    /// Starts past the end give silence; ranges running off the end loop the
    /// available part.
    fn instrumental_slice(&self, from: usize, to: usize) -> AudioBuffer {
        let len = to - from;
        let available = self.instrumental.len();
        let sample_rate = self.instrumental.sample_rate();

        if from >= available {
            warn!(from, available, "interval starts past instrumental end, using silence");
            return AudioBuffer::silence(len, sample_rate);
        }
        if to > available {
            warn!(to, available, "interval runs past instrumental end, looping tail");
        }

        let slice = self.instrumental.slice(from, to.min(available));
        if slice.is_empty() {
            warn!(from, to, "empty instrumental slice, using silence");
            return AudioBuffer::silence(len, sample_rate);
        }
        fit_to_len(&slice, len)
    }
}

/// Additive mix of two equal-length buffers.
///
/// The result has the length of the shorter input.
pub fn overlay(voice: &AudioBuffer, backing: &AudioBuffer, voice_gain: f64, backing_gain: f64) -> AudioBuffer {
    let samples = voice
        .samples()
        .iter()
        .zip(backing.samples())
        .map(|(&v, &b)| v * voice_gain + b * backing_gain)
        .collect();
    AudioBuffer::new(samples, backing.sample_rate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::TaggedInterval;
    use pretty_assertions::assert_eq;

    const SR: u32 = 1000;

    fn constant_library() -> VoiceLibrary {
        VoiceLibrary::new(
            AudioBuffer::new(vec![0.1; 2 * SR as usize], SR),
            AudioBuffer::new(vec![0.2; 2 * SR as usize], SR),
            AudioBuffer::new(vec![0.3; 2 * SR as usize], SR),
        )
    }

    fn silent_library() -> VoiceLibrary {
        let silence = AudioBuffer::silence(2 * SR as usize, SR);
        VoiceLibrary::new(silence.clone(), silence.clone(), silence)
    }

    fn no_match() -> ReconstructConfig {
        ReconstructConfig::default().frequency_match(false)
    }

    fn sequence(entries: &[(Label, f64, f64)]) -> TaggedSequence {
        TaggedSequence::from_entries(
            entries
                .iter()
                .map(|&(label, start, end)| TaggedInterval { label, start, end })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_crossfade_clamped() {
        assert_eq!(ReconstructConfig::default().crossfade_ms(500.0).crossfade_ms, MAX_CROSSFADE_MS);
        assert_eq!(ReconstructConfig::default().crossfade_ms(-1.0).crossfade_ms, 0.0);
        assert_eq!(ReconstructConfig::default().crossfade_ms(f64::NAN).crossfade_ms, 0.0);
    }

    #[test]
    fn test_output_length_is_sum_of_segments() {
        let instrumental = AudioBuffer::silence(SR as usize, SR);
        let r = Reconstructor::new(&constant_library(), &instrumental, no_match());
        let out = r.reconstruct(&sequence(&[
            (Label::Low, 0.0, 0.3),
            (Label::High, 0.3, 0.75),
            (Label::Medium, 0.75, 1.0),
        ]));
        assert_eq!(out.segments, 3);
        assert_eq!(out.buffer.len(), SR as usize);
    }

    #[test]
    fn test_hard_cut_without_crossfade() {
        let instrumental = AudioBuffer::silence(SR as usize, SR);
        let r = Reconstructor::new(&constant_library(), &instrumental, no_match().crossfade_ms(0.0));
        let out = r.reconstruct(&sequence(&[(Label::Low, 0.0, 0.5), (Label::High, 0.5, 1.0)]));
        let samples = out.buffer.samples();
        assert_eq!(samples[499], 0.1);
        assert_eq!(samples[500], 0.3);
    }

    #[test]
    fn test_crossfade_smooths_join() {
        let instrumental = AudioBuffer::silence(SR as usize, SR);
        let r = Reconstructor::new(&constant_library(), &instrumental, no_match().crossfade_ms(50.0));
        let out = r.reconstruct(&sequence(&[(Label::Low, 0.0, 0.5), (Label::High, 0.5, 1.0)]));
        let samples = out.buffer.samples();

        assert_eq!(samples.len(), 1000);
        // Outgoing voice untouched up to the boundary, then fades out over
        // the head of the incoming one.
        assert_eq!(samples[499], 0.1);
        assert_eq!(samples[500], 0.1);
        assert!(samples[520] > 0.1 && samples[520] < 0.45);
        assert_eq!(samples[550], 0.3);
        assert_eq!(samples[999], 0.3);
    }

    #[test]
    fn test_constant_backing_level_across_joins() {
        let instrumental = AudioBuffer::new(vec![0.5; SR as usize], SR);
        let r = Reconstructor::new(&silent_library(), &instrumental, no_match().crossfade_ms(100.0));
        let out = r.reconstruct(&sequence(&[
            (Label::Low, 0.0, 0.3),
            (Label::High, 0.3, 0.35),
            (Label::Medium, 0.35, 1.0),
        ]));
        assert_eq!(out.buffer.len(), SR as usize);
        assert!(out.buffer.samples().iter().all(|&s| s == 0.5));
    }

    #[test]
    fn test_interval_starting_at_instrumental_end_is_silent() {
        let instrumental = AudioBuffer::new(vec![0.5; 500], SR);
        let r = Reconstructor::new(&silent_library(), &instrumental, no_match());
        let out = r.reconstruct(&sequence(&[(Label::Low, 0.0, 0.5), (Label::High, 0.5, 1.0)]));
        let samples = out.buffer.samples();

        assert_eq!(samples.len(), 1000);
        assert!(samples[..500].iter().all(|&s| s == 0.5));
        assert!(samples[500..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_overrun_loops_from_interval_start() {
        let instrumental = AudioBuffer::new((0..500).map(|i| i as f64 / 1000.0).collect(), SR);
        let r = Reconstructor::new(&silent_library(), &instrumental, no_match());
        let out = r.reconstruct(&sequence(&[(Label::Low, 0.0, 0.4), (Label::High, 0.4, 1.0)]));
        let samples = out.buffer.samples();

        assert_eq!(samples[399], 0.399);
        assert_eq!(samples[400], 0.4);
        assert_eq!(samples[499], 0.499);
        // Loop restarts at the interval start, not before it.
        assert_eq!(samples[500], 0.4);
        assert_eq!(samples[999], 0.499);
    }

    #[test]
    fn test_overlay_adds_instrumental() {
        let instrumental = AudioBuffer::new(vec![0.5; SR as usize], SR);
        let r = Reconstructor::new(&constant_library(), &instrumental, no_match());
        let out = r.reconstruct(&sequence(&[(Label::Medium, 0.0, 0.2)]));
        assert!(out.buffer.samples().iter().all(|&s| (s - 0.7).abs() < 1e-12));
    }

    #[test]
    fn test_gains_applied() {
        let instrumental = AudioBuffer::new(vec![0.5; SR as usize], SR);
        let config = no_match().voice_gain(2.0).instrumental_gain(0.0);
        let r = Reconstructor::new(&constant_library(), &instrumental, config);
        let out = r.reconstruct(&sequence(&[(Label::High, 0.0, 0.1)]));
        assert!(out.buffer.samples().iter().all(|&s| (s - 0.6).abs() < 1e-12));
    }

    #[test]
    fn test_interval_past_instrumental_end_is_silent_backing() {
        let instrumental = AudioBuffer::new(vec![0.5; 100], SR);
        let r = Reconstructor::new(&constant_library(), &instrumental, no_match().crossfade_ms(0.0));
        let out = r.reconstruct(&sequence(&[(Label::Low, 0.2, 0.4)]));
        assert_eq!(out.buffer.len(), 200);
        assert!(out.buffer.samples().iter().all(|&s| (s - 0.1).abs() < 1e-12));
    }

    #[test]
    fn test_raw_tags_skip_unknown_and_invalid() {
        let instrumental = AudioBuffer::silence(SR as usize, SR);
        let r = Reconstructor::new(&constant_library(), &instrumental, no_match());
        let tags = vec![
            RawTag { label: "falsetto".into(), start: 0.0, end: 0.5 },
            RawTag { label: "low".into(), start: 0.5, end: 0.5 },
            RawTag { label: "high".into(), start: 0.5, end: 0.6 },
        ];
        let out = r.reconstruct_raw(&tags);
        assert_eq!(out.segments, 1);
        assert_eq!(out.skipped, 2);
        assert_eq!(out.buffer.len(), 100);
    }

    #[test]
    fn test_placeholder_when_nothing_rendered() {
        let instrumental = AudioBuffer::silence(SR as usize, SR);
        let r = Reconstructor::new(&constant_library(), &instrumental, no_match());

        let out = r.reconstruct(&TaggedSequence::empty());
        assert!(out.is_placeholder());
        assert_eq!(out.buffer.len(), 500);
        assert!(out.buffer.is_silent());

        let out = r.reconstruct_raw(&[RawTag { label: "x".into(), start: 0.0, end: 1.0 }]);
        assert!(out.is_placeholder());
    }

    #[test]
    fn test_voices_resampled_to_instrumental_rate() {
        let instrumental = AudioBuffer::silence(16000, 16000);
        let r = Reconstructor::new(&constant_library(), &instrumental, no_match());
        for label in Label::ALL {
            assert_eq!(r.voices().get(label).sample_rate(), 16000);
        }
    }

    #[test]
    fn test_frequency_match_records_band() {
        let instrumental = AudioBuffer::silence(16000, 16000);
        let r = Reconstructor::new(&constant_library(), &instrumental, ReconstructConfig::default());
        let out = r.reconstruct(&sequence(&[(Label::Low, 0.0, 0.1)]));
        assert!(out.band.is_some());
        assert_eq!(out.buffer.len(), 1600);
    }
}
