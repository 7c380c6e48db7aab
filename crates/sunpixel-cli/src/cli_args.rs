//! CLI argument definitions for the SunPixel command-line interface.
//!
//! All `#[derive(Parser)]` and `#[derive(Subcommand)]` types are defined here,
//! keeping `main.rs` focused on dispatch logic.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use sunpixel_backend_structure::{ConvertOptions, DEFAULT_SELECTION};
use sunpixel_spec::{SizePolicy, StructureFormat, StructureMetadata};
use sunpixel_cli::config::PaletteLocation;

/// SunPixel - Minecraft pixel art from images
#[derive(Parser)]
#[command(name = "sunpixel")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Convert an image into a structure file
    Convert {
        /// Input image (PNG or JPEG)
        #[arg(short, long)]
        input: PathBuf,

        /// Output path (default: input with the format's extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        convert: ConvertArgs,

        #[command(flatten)]
        palettes: PaletteArgs,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// List or install block palettes
    Palettes {
        #[command(subcommand)]
        command: PaletteCommands,
    },

    /// Check whether a grid size keeps an image's aspect ratio
    Suggest {
        /// Input image (PNG or JPEG)
        #[arg(short, long)]
        input: PathBuf,

        /// Requested grid width
        #[arg(long)]
        width: u32,

        /// Requested grid height
        #[arg(long)]
        height: u32,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Summarize a structure file
    Inspect {
        /// Structure file (.schem, .json, or .litematic)
        file: PathBuf,

        /// Structure format (default: from the file extension)
        #[arg(long, value_parser = ["schem", "json", "litematic"])]
        format: Option<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Convert every image under a directory
    Batch {
        /// Directory to scan recursively for PNG and JPEG files
        #[arg(long)]
        input_dir: PathBuf,

        /// Output directory (default: next to each image)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Number of conversions to run at once
        #[arg(short, long, default_value_t = 4)]
        jobs: usize,

        #[command(flatten)]
        convert: ConvertArgs,

        #[command(flatten)]
        palettes: PaletteArgs,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub(crate) enum PaletteCommands {
    /// List palettes and their color counts
    List {
        #[command(flatten)]
        palettes: PaletteArgs,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Write the built-in wool and concrete palettes into a directory
    Init {
        /// Target directory (default: $SUNPIXEL_PALETTE_DIR or ./block)
        #[arg(long)]
        palette_dir: Option<PathBuf>,

        /// Overwrite existing palette files
        #[arg(long)]
        force: bool,
    },
}

/// Where palettes are read from.
#[derive(Args, Debug, Clone)]
pub(crate) struct PaletteArgs {
    /// Palette directory (default: $SUNPIXEL_PALETTE_DIR or ./block)
    #[arg(long)]
    pub palette_dir: Option<PathBuf>,

    /// Use the built-in wool and concrete palettes
    #[arg(long, conflicts_with = "palette_dir")]
    pub builtin: bool,
}

impl PaletteArgs {
    pub fn location(&self) -> PaletteLocation {
        PaletteLocation::from_flags(self.builtin, self.palette_dir.as_deref())
    }
}

/// Conversion settings shared by `convert` and `batch`.
#[derive(Args, Debug, Clone)]
pub(crate) struct ConvertArgs {
    /// Grid width in blocks (default: image width)
    #[arg(long, requires = "height")]
    pub width: Option<u32>,

    /// Grid height in blocks (default: image height)
    #[arg(long, requires = "width")]
    pub height: Option<u32>,

    /// Palettes to use, comma separated (default: wool,concrete)
    #[arg(short, long = "palette", value_delimiter = ',')]
    pub palettes: Vec<String>,

    /// Structure format
    #[arg(short, long, default_value = "schem", value_parser = ["schem", "json", "litematic"])]
    pub format: String,

    /// Use the aspect-preserving size when the requested one distorts the image
    #[arg(long)]
    pub keep_aspect: bool,

    /// Structure name (default: output file name)
    #[arg(long)]
    pub name: Option<String>,

    /// Author written into the structure metadata
    #[arg(long)]
    pub author: Option<String>,

    /// Description written into the structure metadata
    #[arg(long)]
    pub description: Option<String>,
}

impl ConvertArgs {
    pub fn to_options(&self) -> Result<ConvertOptions> {
        let format = self
            .format
            .parse::<StructureFormat>()
            .map_err(anyhow::Error::msg)?;

        let palettes = if self.palettes.is_empty() {
            DEFAULT_SELECTION.iter().map(|s| s.to_string()).collect()
        } else {
            self.palettes.clone()
        };

        let metadata = (self.author.is_some() || self.description.is_some()).then(|| {
            StructureMetadata {
                name: self.name.clone().unwrap_or_default(),
                author: self.author.clone().unwrap_or_default(),
                description: self.description.clone().unwrap_or_default(),
                created_ms: chrono::Utc::now().timestamp_millis(),
            }
        });

        Ok(ConvertOptions {
            width: self.width,
            height: self.height,
            palettes,
            format,
            size_policy: if self.keep_aspect {
                SizePolicy::Suggested
            } else {
                SizePolicy::Requested
            },
            name: self.name.clone(),
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    #[test]
    fn test_cli_parses_convert() {
        let cli = Cli::try_parse_from([
            "sunpixel",
            "convert",
            "--input",
            "photo.png",
            "--width",
            "64",
            "--height",
            "32",
            "-p",
            "wool,concrete",
            "--format",
            "litematic",
            "--keep-aspect",
        ])
        .unwrap();
        match cli.command {
            Commands::Convert {
                input,
                output,
                convert,
                palettes,
                json,
            } => {
                assert_eq!(input, PathBuf::from("photo.png"));
                assert!(output.is_none());
                assert!(!json);
                assert!(!palettes.builtin);

                let options = convert.to_options().unwrap();
                assert_eq!(options.width, Some(64));
                assert_eq!(options.height, Some(32));
                assert_eq!(options.palettes, vec!["wool", "concrete"]);
                assert_eq!(options.format, StructureFormat::Litematic);
                assert_eq!(options.size_policy, SizePolicy::Suggested);
                assert!(options.metadata.is_none());
            }
            _ => panic!("expected convert command"),
        }
    }

    #[test]
    fn test_convert_defaults() {
        let cli = Cli::try_parse_from(["sunpixel", "convert", "-i", "photo.jpg"]).unwrap();
        let Commands::Convert { convert, .. } = cli.command else {
            panic!("expected convert command");
        };
        let options = convert.to_options().unwrap();
        assert_eq!(options.palettes, vec!["wool", "concrete"]);
        assert_eq!(options.format, StructureFormat::Schem);
        assert_eq!(options.size_policy, SizePolicy::Requested);
        assert_eq!(options.requested_size(), None);
    }

    #[test]
    fn test_width_requires_height() {
        let err = Cli::try_parse_from(["sunpixel", "convert", "-i", "a.png", "--width", "10"]);
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_unknown_format() {
        let err = Cli::try_parse_from(["sunpixel", "convert", "-i", "a.png", "-f", "nbt"]);
        assert!(err.is_err());
    }

    #[test]
    fn test_author_enables_metadata() {
        let cli = Cli::try_parse_from([
            "sunpixel",
            "convert",
            "-i",
            "a.png",
            "--author",
            "alex",
            "--name",
            "lobby",
        ])
        .unwrap();
        let Commands::Convert { convert, .. } = cli.command else {
            panic!("expected convert command");
        };
        let metadata = convert.to_options().unwrap().metadata.unwrap();
        assert_eq!(metadata.author, "alex");
        assert_eq!(metadata.name, "lobby");
        assert!(metadata.created_ms > 0);
    }

    #[test]
    fn test_builtin_conflicts_with_palette_dir() {
        let err = Cli::try_parse_from([
            "sunpixel",
            "palettes",
            "list",
            "--builtin",
            "--palette-dir",
            "block",
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn test_cli_parses_palettes_init() {
        let cli = Cli::try_parse_from([
            "sunpixel",
            "palettes",
            "init",
            "--palette-dir",
            "blocks",
            "--force",
        ])
        .unwrap();
        match cli.command {
            Commands::Palettes {
                command: PaletteCommands::Init { palette_dir, force },
            } => {
                assert_eq!(palette_dir.as_deref(), Some(Path::new("blocks")));
                assert!(force);
            }
            _ => panic!("expected palettes init"),
        }
    }

    #[test]
    fn test_cli_parses_batch_with_verbosity() {
        let cli = Cli::try_parse_from([
            "sunpixel",
            "batch",
            "--input-dir",
            "art",
            "--jobs",
            "2",
            "-vv",
            "--builtin",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Batch {
                input_dir,
                jobs,
                palettes,
                ..
            } => {
                assert_eq!(input_dir, PathBuf::from("art"));
                assert_eq!(jobs, 2);
                assert_eq!(palettes.location(), PaletteLocation::Builtin);
            }
            _ => panic!("expected batch command"),
        }
    }

    #[test]
    fn test_cli_parses_inspect() {
        let cli =
            Cli::try_parse_from(["sunpixel", "inspect", "out.dat", "--format", "json"]).unwrap();
        match cli.command {
            Commands::Inspect { file, format, json } => {
                assert_eq!(file, PathBuf::from("out.dat"));
                assert_eq!(format.as_deref(), Some("json"));
                assert!(!json);
            }
            _ => panic!("expected inspect command"),
        }
    }
}
