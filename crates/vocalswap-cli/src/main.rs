//! vocalswap CLI - replace a song's vocals with reference voice samples
//!
//! This binary separates a song with Demucs, classifies the vocal stem into
//! low/medium/high intervals and rebuilds the track from voice samples.

use clap::Parser;
use std::process::ExitCode;

use vocalswap_cli::cli_args::{Cli, Commands};
use vocalswap_cli::commands;
use vocalswap_cli::commands::run::RunOptions;
use vocalswap_cli::logging;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            input,
            output,
            voices_dir,
            tags_out,
            separator,
            classifier,
            reconstruct,
            json,
        } => commands::run::run(RunOptions {
            input,
            output,
            voices_dir,
            tags_out,
            separator,
            classifier,
            reconstruct,
            json,
        }),
        Commands::Separate {
            input,
            force,
            separator,
            json,
        } => commands::separate::run(&input, force, &separator, json),
        Commands::Tag {
            input,
            output,
            classifier,
        } => commands::tag::run(&input, output.as_deref(), &classifier),
        Commands::Combine {
            tags,
            instrumental,
            output,
            voices_dir,
            reconstruct,
            json,
        } => commands::combine::run(&tags, &instrumental, &output, &voices_dir, &reconstruct, json),
        Commands::Doctor { voices_dir, demucs } => {
            commands::doctor::run(&voices_dir, demucs.as_deref())
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
