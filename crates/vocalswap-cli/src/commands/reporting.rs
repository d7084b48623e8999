//! Human-readable summaries shared by commands.

use colored::Colorize;
use vocalswap_core::{OutputReport, StemPaths, TaggedSequence};

/// Prints the stem locations.
pub(crate) fn print_stems(stems: &StemPaths, separated: bool) {
    let how = if separated {
        "separated".green()
    } else {
        "reused".yellow()
    };
    println!("{} ({})", "Stems:".bold(), how);
    println!("  {} {}", "vocals:".dimmed(), stems.vocals.display());
    println!("  {} {}", "no_vocals:".dimmed(), stems.instrumental.display());
}

/// Prints one line per tagged interval.
pub(crate) fn print_tags(tags: &TaggedSequence) {
    println!("{} {} intervals", "Tags:".bold(), tags.len());
    for tag in tags {
        println!(
            "  {:>8.3}s - {:>8.3}s  {}",
            tag.start,
            tag.end,
            tag.label.as_str().cyan()
        );
    }
}

/// Prints the output file summary.
pub(crate) fn print_output(report: &OutputReport) {
    println!("{}", "Output:".bold());
    println!("  {} {}", "file:".dimmed(), report.path.display());
    println!(
        "  {} {:.3}s @ {} Hz",
        "duration:".dimmed(),
        report.duration_seconds,
        report.sample_rate
    );
    println!(
        "  {} {} rendered, {} skipped",
        "segments:".dimmed(),
        report.segments,
        report.skipped
    );
    if let Some(band) = report.band {
        println!("  {} {}", "matched band:".dimmed(), band);
    }
    println!("  {} {}", "pcm blake3:".dimmed(), report.pcm_hash);

    if report.placeholder {
        println!(
            "{} no segments were produced; wrote placeholder silence",
            "WARNING".yellow().bold()
        );
    } else {
        println!("{} Final audio saved to {}", "SUCCESS".green().bold(), report.path.display());
    }
}
