//! Run command implementation
//!
//! Full pipeline: separate the input, classify the vocals, rebuild the track
//! from the voice samples and write it out.

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use vocalswap_core::{write_tags, Pipeline, PipelineConfig, PipelineReport};
use vocalswap_separate::DemucsSeparator;

use super::json_output::{error_codes, CommandOutput, JsonError};
use super::reporting;
use crate::cli_args::{ClassifierArgs, ReconstructArgs, SeparatorArgs};

/// Options for the run command.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Input file; prompted for when `None`
    pub input: Option<String>,
    /// Output WAV path
    pub output: String,
    /// Voices directory
    pub voices_dir: String,
    /// Optional tags JSON path
    pub tags_out: Option<String>,
    /// Separation options
    pub separator: SeparatorArgs,
    /// Classifier options
    pub classifier: ClassifierArgs,
    /// Reconstruction options
    pub reconstruct: ReconstructArgs,
    /// Machine-readable output
    pub json: bool,
}

/// Run the run command
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run(options: RunOptions) -> Result<ExitCode> {
    let input = match options.input.clone() {
        Some(input) => input,
        None => prompt_for_input(&mut io::stdin().lock(), &mut io::stdout())?,
    };

    let input_path = PathBuf::from(&input);
    if !input_path.is_file() {
        if options.json {
            CommandOutput::<()>::failed(JsonError::new(
                error_codes::INPUT_NOT_FOUND,
                format!("File '{}' not found.", input),
            ))
            .print()?;
            return Ok(ExitCode::from(1));
        }
        anyhow::bail!("File '{}' not found.", input);
    }

    let config = PipelineConfig::default()
        .voices_dir(&options.voices_dir)
        .output_path(&options.output)
        .classifier(options.classifier.to_params())
        .reconstruct(options.reconstruct.to_config());
    let separator = DemucsSeparator::with_config(options.separator.to_config());
    let pipeline = Pipeline::new(separator, config);

    if !options.json {
        println!("{} {}", "Processing".cyan().bold(), input_path.display());
    }

    let report = match execute(&pipeline, &input_path, options.tags_out.as_deref()) {
        Ok(report) => report,
        Err(e) if options.json => {
            CommandOutput::<()>::failed(JsonError::from_anyhow(&e)).print()?;
            return Ok(ExitCode::from(1));
        }
        Err(e) => return Err(e),
    };

    if options.json {
        CommandOutput::ok(&report).print()?;
    } else {
        println!();
        reporting::print_stems(&report.stems, report.separated);
        reporting::print_tags(&report.tags);
        reporting::print_output(&report.output);
    }

    Ok(ExitCode::SUCCESS)
}

fn execute(
    pipeline: &Pipeline<DemucsSeparator>,
    input: &Path,
    tags_out: Option<&str>,
) -> Result<PipelineReport> {
    let report = pipeline
        .run(input)
        .with_context(|| format!("Failed to process {}", input.display()))?;

    if let Some(path) = tags_out {
        write_tags(&report.tags, Path::new(path))
            .with_context(|| format!("Failed to write tags to {}", path))?;
    }
    Ok(report)
}

/// Asks for the input file name on `output` and reads one line from `input`.
pub fn prompt_for_input<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<String> {
    write!(output, "Enter audio file name: ")?;
    output.flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read file name from stdin")?;

    let name = line.trim().to_string();
    if name.is_empty() {
        anyhow::bail!("No input file given");
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prompt_trims_line() {
        let mut stdin = io::Cursor::new(b"  song.mp3 \n".to_vec());
        let mut stdout = Vec::new();
        let name = prompt_for_input(&mut stdin, &mut stdout).unwrap();
        assert_eq!(name, "song.mp3");
        assert_eq!(String::from_utf8(stdout).unwrap(), "Enter audio file name: ");
    }

    #[test]
    fn test_prompt_rejects_empty() {
        let mut stdin = io::Cursor::new(b"\n".to_vec());
        let mut stdout = Vec::new();
        assert!(prompt_for_input(&mut stdin, &mut stdout).is_err());
    }
}
