//! Inspect command implementation
//!
//! Reads a structure file back and summarizes its blocks.

use anyhow::{Context, Result};
use colored::Colorize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use sunpixel_backend_structure::{read_structure, DecodedStructure};
use sunpixel_spec::StructureFormat;

use super::{coded, print_json, JsonOutput};

/// Format named by the file extension, unless overridden.
pub fn detect_format(path: &Path, format: Option<StructureFormat>) -> Result<StructureFormat> {
    if let Some(format) = format {
        return Ok(format);
    }
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    extension
        .parse::<StructureFormat>()
        .map_err(|e| anyhow::anyhow!("{e}; pass --format"))
}

/// Cells per block, most used first.
pub fn block_counts(structure: &DecodedStructure) -> Vec<(&str, u64)> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for block in structure.blocks() {
        *counts.entry(block).or_default() += 1;
    }
    let mut counts: Vec<(&str, u64)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    counts
}

/// Run the inspect command
pub fn run(path: &Path, format: Option<StructureFormat>, json_output: bool) -> Result<ExitCode> {
    let format = detect_format(path, format)?;
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let structure = read_structure(format, &bytes).map_err(coded)?;

    if json_output {
        print_json(&JsonOutput::ok(&structure))?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} {} ({})", "Structure:".cyan().bold(), path.display(), format);
    if let Some(name) = &structure.name {
        println!("{} {}", "Name:".dimmed(), name);
    }
    if let Some(author) = &structure.author {
        println!("{} {}", "Author:".dimmed(), author);
    }
    println!(
        "{} {} x {} x {}",
        "Size:".dimmed(),
        structure.width,
        structure.height,
        structure.length
    );
    println!(
        "{} {} placed, {} block types",
        "Blocks:".dimmed(),
        structure.placed_count(),
        structure.palette.len()
    );
    for (block, count) in block_counts(&structure) {
        println!("  {:>8}  {}", count, block);
    }
    Ok(ExitCode::SUCCESS)
}
