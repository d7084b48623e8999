//! Combine command implementation
//!
//! Rebuilds a track from a tags file, the voice samples and an
//! instrumental. Tags with unknown labels are skipped.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;

use vocalswap_core::{combine_tags, read_tags, OutputReport};

use super::json_output::{CommandOutput, JsonError};
use super::reporting;
use crate::cli_args::ReconstructArgs;

/// Run the combine command
///
/// # Arguments
/// * `tags` - Tags JSON file
/// * `instrumental` - Instrumental track
/// * `output` - Output WAV path
/// * `voices_dir` - Directory with the voice samples
/// * `reconstruct` - Reconstruction options
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run(
    tags: &str,
    instrumental: &str,
    output: &str,
    voices_dir: &str,
    reconstruct: &ReconstructArgs,
    json_output: bool,
) -> Result<ExitCode> {
    match combine(tags, instrumental, output, voices_dir, reconstruct) {
        Ok(report) if json_output => CommandOutput::ok(&report).print()?,
        Ok(report) => reporting::print_output(&report),
        Err(e) if json_output => {
            CommandOutput::<()>::failed(JsonError::from_anyhow(&e)).print()?;
            return Ok(ExitCode::from(1));
        }
        Err(e) => return Err(e),
    }
    Ok(ExitCode::SUCCESS)
}

fn combine(
    tags: &str,
    instrumental: &str,
    output: &str,
    voices_dir: &str,
    reconstruct: &ReconstructArgs,
) -> Result<OutputReport> {
    let raw = read_tags(Path::new(tags)).with_context(|| format!("Failed to read tags from {}", tags))?;

    combine_tags(
        &raw,
        Path::new(voices_dir),
        Path::new(instrumental),
        Path::new(output),
        reconstruct.to_config(),
    )
    .with_context(|| format!("Failed to combine onto {}", instrumental))
}
