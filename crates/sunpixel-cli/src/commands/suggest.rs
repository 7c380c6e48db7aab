//! Suggest command implementation
//!
//! Reports whether a requested grid size keeps an image's aspect ratio.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use sunpixel_backend_structure::{decode, image_format};
use sunpixel_spec::{GridDimensions, Suggestion};

use super::{coded, print_json, JsonOutput};

#[derive(Debug, Serialize)]
struct SuggestResultJson {
    source: GridDimensions,
    requested: GridDimensions,
    suggestion: Suggestion,
}

/// Run the suggest command
pub fn run(input: &Path, width: u32, height: u32, json_output: bool) -> Result<ExitCode> {
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let format = image_format(extension).map_err(coded)?;
    let bytes =
        fs::read(input).with_context(|| format!("Failed to read image: {}", input.display()))?;
    let source = decode(&bytes, format).map_err(coded)?.dimensions();

    let requested = GridDimensions::new(width, height);
    let suggestion = GridDimensions::suggest_for(source, requested);

    if json_output {
        print_json(&JsonOutput::ok(SuggestResultJson {
            source,
            requested,
            suggestion,
        }))?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} {}", "Image:".dimmed(), source);
    match suggestion {
        Suggestion::Keep => println!("{} {} keeps the aspect ratio", "OK:".green().bold(), requested),
        Suggestion::Adjust(alternative) => println!(
            "{} {} distorts the image; {} keeps the aspect ratio",
            "Suggest:".yellow().bold(),
            requested,
            alternative.to_string().bold()
        ),
    }
    Ok(ExitCode::SUCCESS)
}
