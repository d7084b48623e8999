//! vocalswap core
//!
//! Band classification of an isolated vocal stem and reconstruction of a new
//! track from reference voice samples laid over the instrumental.
//!
//! # Overview
//!
//! - **Classifier** - cuts the vocal stem into fixed chunks, sums FFT
//!   magnitude per band and merges equal labels into contiguous intervals
//! - **Length normalizer** - fits a buffer to an exact sample count by
//!   truncation or looping
//! - **Frequency matcher** - estimates the instrumental's dominant band and
//!   filters voices into it
//! - **Reconstructor** - renders one voice-over-instrumental segment per
//!   interval; the instrumental runs on unbroken and only the voices
//!   crossfade at joins
//!
//! # Determinism
//!
//! Classification and reconstruction involve no randomness and no threading.
//! Identical inputs give byte-identical output; the PCM payload's BLAKE3 hash
//! is reported so re-runs can be compared.
//!
//! # Example
//!
//! ```ignore
//! use vocalswap_core::{classify, ClassifierParams, Reconstructor, ReconstructConfig};
//!
//! let vocals = vocalswap_core::codec::decode(Path::new("vocals.wav"))?;
//! let tags = classify(&vocals, &ClassifierParams::default())?;
//!
//! let assets = vocalswap_core::load_assets(Path::new("voices"), Path::new("no_vocals.wav"))?;
//! let out = Reconstructor::new(&assets.voices, &assets.instrumental, ReconstructConfig::default())
//!     .reconstruct(&tags);
//! vocalswap_core::codec::encode(&out.buffer, Path::new("output_audio.wav"))?;
//! ```
//!
//! # Crate Structure
//!
//! - [`classify()`] - Spectral band classification
//! - [`fit`] - Length normalization
//! - [`matcher`] - Dominant band estimation and voice reshaping
//! - [`reconstruct`] - Segment rendering and crossfaded assembly
//! - [`codec`] - WAV/MP3 decoding, WAV encoding
//! - [`separation`] - Stem layout and the separator seam
//! - [`pipeline`] - End-to-end orchestration

pub mod buffer;
pub mod classify;
pub mod codec;
pub mod error;
pub mod filter;
pub mod fit;
pub mod matcher;
pub mod pipeline;
pub mod reconstruct;
pub mod separation;
pub mod tags;
pub mod voices;
pub mod wav;

pub use buffer::AudioBuffer;
pub use classify::{classify, BandEnergies, ClassifierParams};
pub use codec::AudioFormat;
pub use error::{VocalSwapError, VocalSwapResult};
pub use fit::{fit_to_duration, fit_to_len};
pub use matcher::{Band, FrequencyMatcher};
pub use pipeline::{
    classify_file, combine_tags, read_tags, write_output, write_tags, OutputReport, Pipeline,
    PipelineConfig, PipelineReport,
};
pub use reconstruct::{ReconstructConfig, Reconstruction, Reconstructor};
pub use separation::{ensure_stems, EnsuredStems, StemPaths, StemSeparator};
pub use tags::{Label, RawTag, TaggedInterval, TaggedSequence, TimeInterval};
pub use voices::{load_assets, LoadedAssets, VoiceLibrary};
