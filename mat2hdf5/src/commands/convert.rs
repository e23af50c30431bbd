//! Main conversion command.

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use colored::Colorize;

use mat_h5::{convert_file, select_sources, SourceFile, TranscodeReport, Transcoder};

use crate::cli::Args;
use crate::output;

/// Run the convert command.
pub fn run(args: &Args) -> Result<()> {
    let start_time = Instant::now();

    let source = args.source_path();
    let destination = args.destination_dir();

    output::print_verbose(
        &format!("Scanning source: {}", source.display()),
        args.verbose,
    );

    let sources = select_sources(&source)
        .with_context(|| format!("Failed to read sources from {}", source.display()))?;

    output::print_verbose(
        &format!(
            "Found {}",
            output::format_count(sources.len(), "source file", "source files")
        ),
        args.verbose,
    );

    fs::create_dir_all(&destination).with_context(|| {
        format!(
            "Failed to create destination directory: {}",
            destination.display()
        )
    })?;

    let transcoder = Transcoder::default();

    for file in &sources {
        let output_path = destination.join(file.output_file_name());
        let report = convert_one(file, &output_path, &transcoder)?;

        if args.verbose {
            print_file_summary(file, &output_path, &report);
        }
    }

    output::print_verbose(
        &format!("Finished in {:.2?}", start_time.elapsed()),
        args.verbose,
    );
    output::print_info("Conversion completed successfully.", args.quiet);

    Ok(())
}

/// Convert one source into `output_path`, overwriting it.
fn convert_one(
    file: &SourceFile,
    output_path: &Path,
    transcoder: &Transcoder,
) -> Result<TranscodeReport> {
    tracing::debug!(source = %file.path.display(), output = %output_path.display(), "converting");

    convert_file(&file.container, output_path, transcoder).with_context(|| {
        format!(
            "Failed to convert {} to {}",
            file.path.display(),
            output_path.display()
        )
    })
}

/// Print the per-file summary shown with --verbose.
fn print_file_summary(file: &SourceFile, output_path: &Path, report: &TranscodeReport) {
    println!();
    println!(
        "{} {} {}",
        file.name.bold(),
        "→".dimmed(),
        output_path.display()
    );
    for line in file.description.lines() {
        println!("  {}", line);
    }
    output::print_kv("Datasets written", &report.written().to_string(), 2);
    output::print_kv("Entries skipped", &report.skipped().to_string(), 2);

    let dropped: Vec<&str> = report
        .dropped()
        .map(|entry| entry.source_key.as_str())
        .collect();
    if !dropped.is_empty() {
        output::print_warning(&format!(
            "{} not converted: {}",
            output::format_count(dropped.len(), "entry", "entries"),
            dropped.join(", ")
        ));
    }
}
