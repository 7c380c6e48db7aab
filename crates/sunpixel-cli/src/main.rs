//! SunPixel CLI - Convert images into Minecraft structures
//!
//! This binary provides commands for converting images, managing block
//! palettes, and inspecting generated structure files.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use sunpixel_spec::StructureFormat;

// Use modules from the library crate
use sunpixel_cli::commands;
use sunpixel_cli::config::{resolve_palette_dir, PALETTE_DIR_ENV};
use sunpixel_cli::logging;

mod cli_args;

use cli_args::{Cli, Commands, PaletteCommands};

fn dispatch(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Convert {
            input,
            output,
            convert,
            palettes,
            json,
        } => {
            let options = convert.to_options()?;
            commands::convert::run(
                &input,
                output.as_deref(),
                &options,
                &palettes.location(),
                json,
            )
        }
        Commands::Palettes { command } => match command {
            PaletteCommands::List { palettes, json } => {
                commands::palettes::list(&palettes.location(), json)
            }
            PaletteCommands::Init { palette_dir, force } => {
                let dir = resolve_palette_dir(
                    palette_dir.as_deref(),
                    std::env::var_os(PALETTE_DIR_ENV),
                );
                commands::palettes::init(&dir, force)
            }
        },
        Commands::Suggest {
            input,
            width,
            height,
            json,
        } => commands::suggest::run(&input, width, height, json),
        Commands::Inspect { file, format, json } => {
            let format = format
                .map(|f| f.parse::<StructureFormat>())
                .transpose()
                .map_err(anyhow::Error::msg)?;
            commands::inspect::run(&file, format, json)
        }
        Commands::Batch {
            input_dir,
            output_dir,
            jobs,
            convert,
            palettes,
            json,
        } => {
            let options = convert.to_options()?;
            commands::batch::run(
                &input_dir,
                output_dir.as_deref(),
                &options,
                &palettes.location(),
                jobs,
                json,
            )
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match dispatch(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
