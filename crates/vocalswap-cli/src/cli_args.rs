//! CLI argument definitions for the vocalswap command-line interface.
//!
//! All `#[derive(Parser)]`, `#[derive(Args)]` and `#[derive(Subcommand)]`
//! types live here, keeping `main.rs` focused on dispatch.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::time::Duration;

use vocalswap_core::classify::{DEFAULT_CHUNK_MS, DEFAULT_LOW_THRESH_HZ, DEFAULT_MID_THRESH_HZ};
use vocalswap_core::pipeline::{DEFAULT_OUTPUT_PATH, VOICES_DIR_ENV};
use vocalswap_core::reconstruct::DEFAULT_CROSSFADE_MS;
use vocalswap_core::separation::{DEFAULT_MODEL, DEFAULT_OUTPUT_ROOT};
use vocalswap_core::voices::DEFAULT_VOICES_DIR;
use vocalswap_core::{AudioFormat, ClassifierParams, ReconstructConfig};
use vocalswap_separate::{SeparatorConfig, DEFAULT_TIMEOUT_SECS};

/// vocalswap - replace a song's vocals with reference voice samples
#[derive(Debug, Parser)]
#[command(name = "vocalswap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Separate, classify and reconstruct a song in one go
    Run {
        /// Input audio file (.wav or .mp3); prompted for when omitted
        input: Option<String>,

        /// Output file (WAV)
        #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
        output: String,

        /// Directory containing low.wav, medium.wav and high.wav
        #[arg(long, env = VOICES_DIR_ENV, default_value = DEFAULT_VOICES_DIR)]
        voices_dir: String,

        /// Also write the vocal classification as JSON to this path
        #[arg(long)]
        tags_out: Option<String>,

        #[command(flatten)]
        separator: SeparatorArgs,

        #[command(flatten)]
        classifier: ClassifierArgs,

        #[command(flatten)]
        reconstruct: ReconstructArgs,

        /// Output machine-readable JSON report (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Split a song into vocals and no_vocals stems with Demucs
    Separate {
        /// Input audio file (.wav or .mp3)
        input: String,

        /// Run Demucs even when both stems already exist
        #[arg(short, long)]
        force: bool,

        #[command(flatten)]
        separator: SeparatorArgs,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Classify a vocal track into low/medium/high intervals
    Tag {
        /// Vocal audio file (.wav or .mp3)
        input: String,

        /// Write tags JSON to this file (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        #[command(flatten)]
        classifier: ClassifierArgs,
    },

    /// Reconstruct a track from a tags file, voices and an instrumental
    Combine {
        /// Tags JSON file as written by `vocalswap tag`
        #[arg(short, long)]
        tags: String,

        /// Instrumental audio file (.wav or .mp3)
        #[arg(short, long)]
        instrumental: String,

        /// Output file (WAV)
        #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
        output: String,

        /// Directory containing low.wav, medium.wav and high.wav
        #[arg(long, env = VOICES_DIR_ENV, default_value = DEFAULT_VOICES_DIR)]
        voices_dir: String,

        #[command(flatten)]
        reconstruct: ReconstructArgs,

        /// Output machine-readable JSON report (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Check that Demucs and the voice samples are available
    Doctor {
        /// Directory containing low.wav, medium.wav and high.wav
        #[arg(long, env = VOICES_DIR_ENV, default_value = DEFAULT_VOICES_DIR)]
        voices_dir: String,

        /// Path to the Demucs executable
        #[arg(long)]
        demucs: Option<String>,
    },
}

/// Separation options.
#[derive(Debug, Clone, Args)]
pub struct SeparatorArgs {
    /// Demucs model name
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Root directory for separated stems
    #[arg(long, default_value = DEFAULT_OUTPUT_ROOT)]
    pub stems_root: String,

    /// Path to the Demucs executable (default: DEMUCS_PATH, then PATH)
    #[arg(long)]
    pub demucs: Option<String>,

    /// Ask Demucs for MP3 stems instead of WAV
    #[arg(long)]
    pub mp3_stems: bool,

    /// Separation timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl SeparatorArgs {
    /// Builds the separator configuration.
    pub fn to_config(&self) -> SeparatorConfig {
        let mut config = SeparatorConfig::default()
            .model(self.model.clone())
            .output_root(&self.stems_root)
            .timeout(Duration::from_secs(self.timeout_secs))
            .stem_format(if self.mp3_stems {
                AudioFormat::Mp3
            } else {
                AudioFormat::Wav
            });
        if let Some(ref demucs) = self.demucs {
            config = config.executable(demucs);
        }
        config
    }
}

/// Classifier options.
#[derive(Debug, Clone, Args)]
pub struct ClassifierArgs {
    /// Upper edge of the low band in Hz
    #[arg(long, default_value_t = DEFAULT_LOW_THRESH_HZ)]
    pub low_thresh: f64,

    /// Upper edge of the medium band in Hz
    #[arg(long, default_value_t = DEFAULT_MID_THRESH_HZ)]
    pub mid_thresh: f64,

    /// Analysis chunk length in milliseconds
    #[arg(long, default_value_t = DEFAULT_CHUNK_MS)]
    pub chunk_ms: f64,
}

impl ClassifierArgs {
    /// Builds classifier parameters.
    pub fn to_params(&self) -> ClassifierParams {
        ClassifierParams::new(self.low_thresh, self.mid_thresh, self.chunk_ms)
    }
}

/// Reconstruction options.
#[derive(Debug, Clone, Args)]
pub struct ReconstructArgs {
    /// Crossfade between segments in milliseconds (at most 100)
    #[arg(long, default_value_t = DEFAULT_CROSSFADE_MS)]
    pub crossfade_ms: f64,

    /// Skip filtering voices into the instrumental's band
    #[arg(long)]
    pub no_freq_match: bool,

    /// Voice gain
    #[arg(long, default_value_t = 1.0)]
    pub voice_gain: f64,

    /// Instrumental gain
    #[arg(long, default_value_t = 1.0)]
    pub instrumental_gain: f64,
}

impl ReconstructArgs {
    /// Builds the reconstruction configuration.
    pub fn to_config(&self) -> ReconstructConfig {
        ReconstructConfig::default()
            .crossfade_ms(self.crossfade_ms)
            .frequency_match(!self.no_freq_match)
            .voice_gain(self.voice_gain)
            .instrumental_gain(self.instrumental_gain)
    }
}
