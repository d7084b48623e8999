//! End-to-end run: separate, classify, reconstruct, export.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classify::{classify, ClassifierParams};
use crate::codec;
use crate::error::{VocalSwapError, VocalSwapResult};
use crate::matcher::Band;
use crate::reconstruct::{ReconstructConfig, Reconstruction, Reconstructor};
use crate::separation::{ensure_stems, StemPaths, StemSeparator};
use crate::tags::{RawTag, TaggedSequence};
use crate::voices::{load_assets, DEFAULT_VOICES_DIR};

/// Environment variable overriding the voices directory.
pub const VOICES_DIR_ENV: &str = "VOCALSWAP_VOICES_DIR";
/// Default output file.
pub const DEFAULT_OUTPUT_PATH: &str = "output_audio.wav";

/// Settings for a full run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory with `low.wav`, `medium.wav` and `high.wav`.
    pub voices_dir: PathBuf,
    /// Where the reconstructed track is written.
    pub output_path: PathBuf,
    /// Classifier parameters.
    pub classifier: ClassifierParams,
    /// Reconstruction settings.
    pub reconstruct: ReconstructConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            voices_dir: PathBuf::from(DEFAULT_VOICES_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            classifier: ClassifierParams::default(),
            reconstruct: ReconstructConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Sets the voices directory.
    pub fn voices_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.voices_dir = dir.into();
        self
    }

    /// Sets the output path.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Sets the classifier parameters.
    pub fn classifier(mut self, params: ClassifierParams) -> Self {
        self.classifier = params;
        self
    }

    /// Sets the reconstruction settings.
    pub fn reconstruct(mut self, config: ReconstructConfig) -> Self {
        self.reconstruct = config;
        self
    }
}

/// Summary of a written output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputReport {
    /// Output file.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of samples.
    pub num_samples: usize,
    /// Duration in seconds.
    pub duration_seconds: f64,
    /// BLAKE3 hash of the PCM payload.
    pub pcm_hash: String,
    /// Segments rendered.
    pub segments: usize,
    /// Entries skipped.
    pub skipped: usize,
    /// Band the voices were matched to.
    pub band: Option<Band>,
    /// Output is placeholder silence.
    pub placeholder: bool,
}

/// Summary of a full run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Input track.
    pub input: PathBuf,
    /// Stem locations.
    pub stems: StemPaths,
    /// Whether separation ran (false when stems were reused).
    pub separated: bool,
    /// Classification of the vocal stem.
    pub tags: TaggedSequence,
    /// Written output.
    pub output: OutputReport,
}

/// Separation, classification and reconstruction wired together.
#[derive(Debug)]
pub struct Pipeline<S> {
    separator: S,
    config: PipelineConfig,
}

impl<S: StemSeparator> Pipeline<S> {
    /// Creates a pipeline.
    pub fn new(separator: S, config: PipelineConfig) -> Self {
        Self { separator, config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the separator.
    pub fn separator(&self) -> &S {
        &self.separator
    }

    /// Runs the whole pipeline on `input`.
    ///
    /// # Errors
    /// [`VocalSwapError::MissingAsset`] when the input, a stem or a voice file
    /// is absent; [`VocalSwapError::SeparationFailed`] when separation fails.
    pub fn run(&self, input: &Path) -> VocalSwapResult<PipelineReport> {
        if !input.is_file() {
            return Err(VocalSwapError::missing_asset(input));
        }

        let stems = ensure_stems(&self.separator, input)?;
        stems.paths.require()?;

        let tags = classify_file(&stems.paths.vocals, &self.config.classifier)?;
        info!(intervals = tags.len(), "vocals classified");

        let assets = load_assets(&self.config.voices_dir, &stems.paths.instrumental)?;
        let reconstructor = Reconstructor::new(&assets.voices, &assets.instrumental, self.config.reconstruct);
        let reconstruction = reconstructor.reconstruct(&tags);

        let output = write_output(&reconstruction, &self.config.output_path)?;

        Ok(PipelineReport {
            input: input.to_path_buf(),
            stems: stems.paths,
            separated: stems.separated,
            tags,
            output,
        })
    }
}

/// Decodes `path` and classifies it.
pub fn classify_file(path: &Path, params: &ClassifierParams) -> VocalSwapResult<TaggedSequence> {
    let signal = codec::decode(path)?;
    classify(&signal, params)
}

/// Reconstructs from a tags list against an instrumental file and a voices
/// directory, writing the result to `output_path`.
pub fn combine_tags(
    tags: &[RawTag],
    voices_dir: &Path,
    instrumental_path: &Path,
    output_path: &Path,
    config: ReconstructConfig,
) -> VocalSwapResult<OutputReport> {
    let assets = load_assets(voices_dir, instrumental_path)?;
    let reconstruction = Reconstructor::new(&assets.voices, &assets.instrumental, config).reconstruct_raw(tags);
    write_output(&reconstruction, output_path)
}

/// Encodes a reconstruction to `path`.
pub fn write_output(reconstruction: &Reconstruction, path: &Path) -> VocalSwapResult<OutputReport> {
    let result = codec::encode(&reconstruction.buffer, path)?;
    info!(
        path = %path.display(),
        seconds = result.duration_seconds(),
        hash = %result.pcm_hash,
        "output written"
    );

    Ok(OutputReport {
        path: path.to_path_buf(),
        sample_rate: result.sample_rate,
        num_samples: result.num_samples,
        duration_seconds: result.duration_seconds(),
        pcm_hash: result.pcm_hash,
        segments: reconstruction.segments,
        skipped: reconstruction.skipped,
        band: reconstruction.band,
        placeholder: reconstruction.is_placeholder(),
    })
}

/// Reads a JSON tags file: `[{"label": "low", "start": 0.0, "end": 0.4}, ...]`.
///
/// Labels are not validated here.
pub fn read_tags(path: &Path) -> VocalSwapResult<Vec<RawTag>> {
    if !path.is_file() {
        return Err(VocalSwapError::missing_asset(path));
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        VocalSwapError::invalid_input(format!("malformed tags file {}: {}", path.display(), e))
    })
}

/// Writes `tags` as pretty-printed JSON, creating parent directories.
pub fn write_tags(tags: &TaggedSequence, path: &Path) -> VocalSwapResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(tags)
        .map_err(|e| VocalSwapError::invalid_input(format!("failed to serialize tags: {}", e)))?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::{Label, TaggedInterval};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tags_file_round_trip_keeps_unknown_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tags.json");
        fs::write(
            &path,
            r#"[{"label":"low","start":0.0,"end":0.4},{"label":"alto","start":0.4,"end":1.0}]"#,
        )
        .unwrap();

        let tags = read_tags(&path).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[1].label, "alto");
    }

    #[test]
    fn test_write_tags_json_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/tags.json");
        let seq = TaggedSequence::from_entries(vec![TaggedInterval {
            label: Label::High,
            start: 0.0,
            end: 0.5,
        }])
        .unwrap();

        write_tags(&seq, &path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["label"], "high");
        assert_eq!(value[0]["end"], 0.5);
    }

    #[test]
    fn test_malformed_tags_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(read_tags(&path), Err(VocalSwapError::InvalidInput { .. })));
    }

    #[test]
    fn test_config_builders() {
        let config = PipelineConfig::default().voices_dir("v").output_path("o/out.wav");
        assert_eq!(config.voices_dir, PathBuf::from("v"));
        assert_eq!(config.output_path, PathBuf::from("o/out.wav"));
        assert_eq!(config.classifier, ClassifierParams::default());
    }
}
