//! Tag command implementation
//!
//! Classifies a vocal track and prints or writes the tags as JSON.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;

use vocalswap_core::{classify_file, write_tags};

use crate::cli_args::ClassifierArgs;

/// Run the tag command
///
/// # Arguments
/// * `input` - Vocal track to classify
/// * `output` - Tags JSON path (default: stdout)
/// * `classifier` - Classifier options
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run(input: &str, output: Option<&str>, classifier: &ClassifierArgs) -> Result<ExitCode> {
    let params = classifier.to_params();
    let tags = classify_file(Path::new(input), &params)
        .with_context(|| format!("Failed to classify {}", input))?;

    match output {
        Some(path) => {
            write_tags(&tags, Path::new(path))
                .with_context(|| format!("Failed to write tags to {}", path))?;
            println!(
                "{} {} intervals written to {}",
                "SUCCESS".green().bold(),
                tags.len(),
                path
            );
        }
        None => {
            let json = serde_json::to_string_pretty(&tags).context("Failed to serialize tags")?;
            println!("{}", json);
        }
    }

    Ok(ExitCode::SUCCESS)
}
