//! Doctor command implementation
//!
//! Checks that Demucs can be found and that the voice samples exist.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;

use vocalswap_core::{Label, VoiceLibrary};
use vocalswap_separate::{DemucsSeparator, SeparatorConfig, DEMUCS_PATH_ENV};

/// Result of one doctor check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    /// What was checked
    pub name: String,
    /// Whether it passed
    pub ok: bool,
    /// Detail line
    pub detail: String,
}

/// Run the doctor command
///
/// Checks:
/// - Demucs executable resolution
/// - low/medium/high voice samples
///
/// # Returns
/// Exit code: 0 if all checks pass, 1 if any fail
pub fn run(voices_dir: &str, demucs: Option<&str>) -> Result<ExitCode> {
    println!("{}", "vocalswap Doctor".cyan().bold());
    println!("{}", "================".cyan());
    println!();

    println!("{}", "Versions:".bold());
    println!(
        "  {} vocalswap-cli v{}",
        "->".green(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("{}", "Dependencies:".bold());
    let demucs_check = check_demucs(demucs);
    print_check(&demucs_check);
    if !demucs_check.ok {
        println!(
            "     {}",
            "Demucs is required to separate vocals from the instrumental.".dimmed()
        );
        println!(
            "     {}",
            format!("Install with `pip install demucs` or set {}.", DEMUCS_PATH_ENV).dimmed()
        );
    }
    println!();

    println!("{}", "Voice samples:".bold());
    let voice_checks = check_voices(Path::new(voices_dir));
    for check in &voice_checks {
        print_check(check);
    }
    println!();

    let all_ok = demucs_check.ok && voice_checks.iter().all(|c| c.ok);
    if all_ok {
        println!("{} All checks passed!", "SUCCESS".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{} Some checks failed. See above for details.",
            "WARNING".yellow().bold()
        );
        Ok(ExitCode::from(1))
    }
}

/// Resolves Demucs the same way separation does.
pub fn check_demucs(demucs: Option<&str>) -> Check {
    let mut config = SeparatorConfig::default();
    if let Some(path) = demucs {
        config = config.executable(path);
    }

    match DemucsSeparator::with_config(config).find_executable() {
        Ok(path) => Check {
            name: "demucs".to_string(),
            ok: true,
            detail: path.display().to_string(),
        },
        Err(e) => Check {
            name: "demucs".to_string(),
            ok: false,
            detail: e.to_string(),
        },
    }
}

/// One check per voice file.
pub fn check_voices(dir: &Path) -> Vec<Check> {
    Label::ALL
        .iter()
        .map(|&label| {
            let path = VoiceLibrary::voice_path(dir, label);
            let ok = path.is_file();
            Check {
                name: label.to_string(),
                ok,
                detail: if ok {
                    path.display().to_string()
                } else {
                    format!("{} (missing)", path.display())
                },
            }
        })
        .collect()
}

fn print_check(check: &Check) {
    let mark = if check.ok { "ok".green() } else { "!!".red() };
    println!("  {} {}: {}", mark, check.name, check.detail);
}
