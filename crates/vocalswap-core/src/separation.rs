//! Source separation seam.
//!
//! Separation itself runs out of process; this module only fixes where its
//! outputs live and when it has to run at all.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::codec::AudioFormat;
use crate::error::{VocalSwapError, VocalSwapResult};

/// Default separation model.
pub const DEFAULT_MODEL: &str = "mdx_extra";
/// Default root directory for separated stems.
pub const DEFAULT_OUTPUT_ROOT: &str = "separated";

/// Locations of the two stems produced for one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemPaths {
    /// Isolated vocals.
    pub vocals: PathBuf,
    /// Everything except vocals.
    pub instrumental: PathBuf,
}

impl StemPaths {
    /// Conventional layout:
    /// `<output_root>/<model>/<basename>/{vocals,no_vocals}.<ext>`, where
    /// `<basename>` is the input's file name without its final extension.
    pub fn for_input(output_root: &Path, model: &str, input: &Path, format: AudioFormat) -> Self {
        let basename = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = output_root.join(model).join(basename);
        let ext = format.extension();

        Self {
            vocals: dir.join(format!("vocals.{ext}")),
            instrumental: dir.join(format!("no_vocals.{ext}")),
        }
    }

    /// Directory holding both stems.
    pub fn dir(&self) -> Option<&Path> {
        self.vocals.parent()
    }

    /// True when both stems are present on disk.
    pub fn exist(&self) -> bool {
        self.vocals.is_file() && self.instrumental.is_file()
    }

    /// Fails with [`VocalSwapError::MissingAsset`] naming the first absent
    /// stem.
    pub fn require(&self) -> VocalSwapResult<()> {
        for path in [&self.vocals, &self.instrumental] {
            if !path.is_file() {
                return Err(VocalSwapError::missing_asset(path));
            }
        }
        Ok(())
    }
}

/// Splits a mixed track into vocal and instrumental stems.
pub trait StemSeparator {
    /// Where stems for `input` are (or will be) written.
    fn stem_paths(&self, input: &Path) -> StemPaths;

    /// Runs separation for `input`, returning the stem locations.
    ///
    /// Implementations report failures as
    /// [`VocalSwapError::SeparationFailed`].
    fn separate(&self, input: &Path) -> VocalSwapResult<StemPaths>;
}

/// Result of [`ensure_stems`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsuredStems {
    /// Stem locations.
    pub paths: StemPaths,
    /// Whether the separator was invoked.
    pub separated: bool,
}

/// Makes sure both stems for `input` exist, running `separator` only when
/// they do not.
///
/// # Errors
/// [`VocalSwapError::SeparationFailed`] when the separator fails or finishes
/// without producing both stems.
pub fn ensure_stems<S>(separator: &S, input: &Path) -> VocalSwapResult<EnsuredStems>
where
    S: StemSeparator + ?Sized,
{
    let expected = separator.stem_paths(input);
    if expected.exist() {
        info!(
            dir = %expected.dir().unwrap_or(Path::new("")).display(),
            "stems already present, skipping separation"
        );
        return Ok(EnsuredStems {
            paths: expected,
            separated: false,
        });
    }

    info!(input = %input.display(), "separating stems");
    let paths = separator.separate(input)?;
    if !paths.exist() {
        return Err(VocalSwapError::separation_failed(format!(
            "separator finished but stems are missing under {}",
            paths.dir().unwrap_or(Path::new("")).display()
        )));
    }

    Ok(EnsuredStems {
        paths,
        separated: true,
    })
}
