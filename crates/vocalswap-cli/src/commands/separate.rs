//! Separate command implementation
//!
//! Runs Demucs on one input, reusing existing stems unless `--force` is set.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

use vocalswap_core::{ensure_stems, EnsuredStems, StemPaths};
use vocalswap_separate::DemucsSeparator;

use super::json_output::{error_codes, CommandOutput, JsonError};
use super::reporting;
use crate::cli_args::SeparatorArgs;

#[derive(Debug, Serialize)]
struct SeparateResult<'a> {
    input: &'a Path,
    stems: &'a StemPaths,
    separated: bool,
}

/// Run the separate command
///
/// # Arguments
/// * `input` - Path to the mixed track
/// * `force` - Re-run Demucs even if stems exist
/// * `separator` - Separation options
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run(input: &str, force: bool, separator: &SeparatorArgs, json_output: bool) -> Result<ExitCode> {
    let input_path = Path::new(input);
    let demucs = DemucsSeparator::with_config(separator.to_config());

    let outcome = if !input_path.is_file() {
        Err(anyhow::anyhow!("File '{}' not found.", input))
    } else {
        separate(&demucs, input_path, force)
    };

    match outcome {
        Ok(stems) if json_output => {
            CommandOutput::ok(SeparateResult {
                input: input_path,
                stems: &stems.paths,
                separated: stems.separated,
            })
            .print()?;
        }
        Ok(stems) => {
            reporting::print_stems(&stems.paths, stems.separated);
            println!("{} Separation complete", "SUCCESS".green().bold());
        }
        Err(e) if json_output => {
            let error = if input_path.is_file() {
                JsonError::from_anyhow(&e)
            } else {
                JsonError::new(error_codes::INPUT_NOT_FOUND, e.to_string())
            };
            CommandOutput::<()>::failed(error).print()?;
            return Ok(ExitCode::from(1));
        }
        Err(e) => return Err(e),
    }

    Ok(ExitCode::SUCCESS)
}

fn separate(demucs: &DemucsSeparator, input: &Path, force: bool) -> Result<EnsuredStems> {
    if force {
        let paths = demucs
            .run(input)
            .with_context(|| format!("Demucs failed on {}", input.display()))?;
        return Ok(EnsuredStems {
            paths,
            separated: true,
        });
    }

    ensure_stems(demucs, input).with_context(|| format!("Demucs failed on {}", input.display()))
}
