//! Convert command implementation
//!
//! Converts one image into a structure file.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use sunpixel_backend_structure::{convert_file, ConvertOptions};
use sunpixel_spec::{ConversionReport, NullProgress, Suggestion};

use super::{coded, print_json, print_warnings, ConsoleProgress, JsonError, JsonOutput};
use crate::config::PaletteLocation;

#[derive(Debug, Serialize)]
struct ConvertResultJson {
    output: PathBuf,
    report: ConversionReport,
}

/// Output path used when none is given: the input with the format extension.
pub fn default_output(input: &Path, options: &ConvertOptions) -> PathBuf {
    input.with_extension(options.format.extension())
}

/// Run the convert command
///
/// # Returns
/// Exit code: 0 on success, 1 if the conversion failed
pub fn run(
    input: &Path,
    output: Option<&Path>,
    options: &ConvertOptions,
    palettes: &PaletteLocation,
    json_output: bool,
) -> Result<ExitCode> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input, options));
    let source = palettes.source();

    if json_output {
        let result = convert_file(input, &output, options, source.as_ref(), NullProgress);
        return match result {
            Ok((path, conversion)) => {
                print_json(&JsonOutput::ok(ConvertResultJson {
                    output: path,
                    report: conversion.report,
                }))?;
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                print_json(&JsonOutput::<ConvertResultJson>::err(JsonError::from(&e)))?;
                Ok(ExitCode::from(1))
            }
        };
    }

    let start = Instant::now();
    println!("{} {}", "Converting:".cyan().bold(), input.display());
    println!(
        "{} {} ({})",
        "Palettes:".dimmed(),
        options.palettes.join(", "),
        palettes.describe()
    );

    let (path, conversion) = convert_file(
        input,
        &output,
        options,
        source.as_ref(),
        ConsoleProgress::default(),
    )
    .map_err(coded)?;
    let report = &conversion.report;

    print_warnings(&report.warnings);
    if let Suggestion::Adjust(alternative) = report.suggestion {
        println!(
            "  {} {} keeps the {} aspect ratio (use --keep-aspect)",
            "hint:".cyan(),
            alternative,
            report.source
        );
    }

    println!(
        "{} {} ({}x{}, {} blocks, {} block types) in {}ms",
        "Wrote:".green().bold(),
        path.display(),
        report.width,
        report.height,
        report.cell_count,
        report.palette_size,
        start.elapsed().as_millis()
    );
    println!("{} {}", "Hash:".dimmed(), &report.hash[..16]);
    Ok(ExitCode::SUCCESS)
}
