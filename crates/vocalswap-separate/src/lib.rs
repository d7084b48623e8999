//! vocalswap separation backend
//!
//! Splits a mixed track into `vocals` and `no_vocals` stems by running
//! [Demucs](https://github.com/facebookresearch/demucs) as a subprocess.
//!
//! # Executable lookup
//!
//! 1. [`SeparatorConfig::executable`], when set and present
//! 2. the `DEMUCS_PATH` environment variable
//! 3. `demucs` on `PATH`
//!
//! # Example
//!
//! ```ignore
//! use vocalswap_core::ensure_stems;
//! use vocalswap_separate::{DemucsSeparator, SeparatorConfig};
//!
//! let separator = DemucsSeparator::with_config(SeparatorConfig::default().timeout_secs(600));
//! let stems = ensure_stems(&separator, Path::new("song.mp3"))?;
//! println!("vocals at {}", stems.paths.vocals.display());
//! ```

pub mod demucs;
pub mod error;

pub use demucs::{DemucsSeparator, SeparatorConfig, DEFAULT_TIMEOUT_SECS, DEMUCS_PATH_ENV};
pub use error::{SeparationError, SeparationResult};
