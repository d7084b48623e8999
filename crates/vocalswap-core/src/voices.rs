//! Reference voice samples and parallel asset loading.

use std::path::{Path, PathBuf};
use std::thread;

use tracing::{debug, info};

use crate::buffer::AudioBuffer;
use crate::codec;
use crate::error::{VocalSwapError, VocalSwapResult};
use crate::tags::Label;

/// Default directory holding `low.wav`, `medium.wav` and `high.wav`.
pub const DEFAULT_VOICES_DIR: &str = "voices";

/// One reference voice per label.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceLibrary {
    low: AudioBuffer,
    medium: AudioBuffer,
    high: AudioBuffer,
}

impl VoiceLibrary {
    /// Creates a library from already decoded buffers.
    pub fn new(low: AudioBuffer, medium: AudioBuffer, high: AudioBuffer) -> Self {
        Self { low, medium, high }
    }

    /// Returns the voice for `label`.
    pub fn get(&self, label: Label) -> &AudioBuffer {
        match label {
            Label::Low => &self.low,
            Label::Medium => &self.medium,
            Label::High => &self.high,
        }
    }

    /// Conventional path of the voice file for `label` inside `dir`.
    pub fn voice_path(dir: &Path, label: Label) -> PathBuf {
        dir.join(format!("{}.wav", label.as_str()))
    }

    /// Decodes the three voice files from `dir` sequentially.
    pub fn load(dir: &Path) -> VocalSwapResult<Self> {
        Ok(Self::new(
            load_voice(dir, Label::Low)?,
            load_voice(dir, Label::Medium)?,
            load_voice(dir, Label::High)?,
        ))
    }

    /// Returns a library with every voice transformed by `f`.
    pub fn map<F>(&self, mut f: F) -> Self
    where
        F: FnMut(Label, &AudioBuffer) -> AudioBuffer,
    {
        Self::new(
            f(Label::Low, &self.low),
            f(Label::Medium, &self.medium),
            f(Label::High, &self.high),
        )
    }

    /// Resamples every voice to `sample_rate`.
    pub fn resampled_to(&self, sample_rate: u32) -> Self {
        self.map(|label, voice| {
            if voice.sample_rate() != sample_rate {
                debug!(
                    label = %label,
                    from = voice.sample_rate(),
                    to = sample_rate,
                    "resampling voice"
                );
            }
            voice.resample_linear(sample_rate)
        })
    }
}

/// Voices plus instrumental, decoded and ready for reconstruction.
#[derive(Debug, Clone)]
pub struct LoadedAssets {
    /// Reference voices.
    pub voices: VoiceLibrary,
    /// Backing track.
    pub instrumental: AudioBuffer,
}

/// Decodes the three voices and the instrumental on four scoped threads.
///
/// All loads are joined before returning. When several fail, the first error
/// in the order low, medium, high, instrumental is returned.
pub fn load_assets(voices_dir: &Path, instrumental_path: &Path) -> VocalSwapResult<LoadedAssets> {
    let (low, medium, high, instrumental) = thread::scope(|scope| {
        let low = scope.spawn(|| load_voice(voices_dir, Label::Low));
        let medium = scope.spawn(|| load_voice(voices_dir, Label::Medium));
        let high = scope.spawn(|| load_voice(voices_dir, Label::High));
        let instrumental = scope.spawn(|| codec::decode(instrumental_path));

        (
            join_load(low, &VoiceLibrary::voice_path(voices_dir, Label::Low)),
            join_load(medium, &VoiceLibrary::voice_path(voices_dir, Label::Medium)),
            join_load(high, &VoiceLibrary::voice_path(voices_dir, Label::High)),
            join_load(instrumental, instrumental_path),
        )
    });

    let assets = LoadedAssets {
        voices: VoiceLibrary::new(low?, medium?, high?),
        instrumental: instrumental?,
    };
    info!(
        voices_dir = %voices_dir.display(),
        instrumental = %instrumental_path.display(),
        instrumental_seconds = assets.instrumental.duration_seconds(),
        "assets loaded"
    );
    Ok(assets)
}

fn load_voice(dir: &Path, label: Label) -> VocalSwapResult<AudioBuffer> {
    codec::decode(&VoiceLibrary::voice_path(dir, label))
}

fn join_load(
    handle: thread::ScopedJoinHandle<'_, VocalSwapResult<AudioBuffer>>,
    path: &Path,
) -> VocalSwapResult<AudioBuffer> {
    handle
        .join()
        .unwrap_or_else(|_| Err(VocalSwapError::decode(path, "loader thread panicked")))
}
