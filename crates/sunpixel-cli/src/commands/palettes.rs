//! Palette commands: list available palettes and install the built-in ones.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;
use sunpixel_backend_structure::{install_builtin, list_palettes, parse_definition};

use super::{coded, print_json, JsonOutput};
use crate::config::PaletteLocation;

/// List palettes with their entry counts.
pub fn list(palettes: &PaletteLocation, json_output: bool) -> Result<ExitCode> {
    let source = palettes.source();
    let infos = list_palettes(source.as_ref()).map_err(coded)?;

    if json_output {
        print_json(&JsonOutput::ok(&infos))?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} {}", "Palettes:".cyan().bold(), palettes.describe());
    if infos.is_empty() {
        println!("  (none)");
        return Ok(ExitCode::SUCCESS);
    }

    for info in &infos {
        println!(
            "  {:<16} {:<24} {}",
            info.name.bold(),
            info.display_name,
            format!("{} colors", info.entry_count).dimmed()
        );

        // Surface skipped entries so broken files are visible here too.
        if let Some(text) = source.read(&info.name).map_err(coded)? {
            for entry in parse_definition(&info.name, &text).malformed {
                println!(
                    "    {} skipped {}: {}",
                    "!".yellow(),
                    entry.key,
                    entry.reason
                );
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Write the built-in palettes into `dir`.
pub fn init(dir: &Path, force: bool) -> Result<ExitCode> {
    let written = install_builtin(dir, force)
        .with_context(|| format!("Failed to install palettes into {}", dir.display()))?;

    if written.is_empty() {
        println!(
            "{} palettes already present in {} (use --force to overwrite)",
            "Skipped:".yellow().bold(),
            dir.display()
        );
    }
    for path in &written {
        println!("{} {}", "Wrote:".green().bold(), path.display());
    }
    Ok(ExitCode::SUCCESS)
}
