//! Where palettes come from.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sunpixel_backend_structure::{builtin_source, DirectorySource, PaletteSource};

/// Environment variable naming the palette directory.
pub const PALETTE_DIR_ENV: &str = "SUNPIXEL_PALETTE_DIR";

/// Palette directory used when neither the flag nor the variable is set.
pub const DEFAULT_PALETTE_DIR: &str = "block";

/// Shared, thread-safe palette source.
pub type SharedSource = Arc<dyn PaletteSource + Send + Sync>;

/// Palette location chosen on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteLocation {
    /// The embedded wool and concrete palettes.
    Builtin,
    /// A directory of `<name>.json` definitions.
    Directory(PathBuf),
}

impl PaletteLocation {
    /// Resolve from the `--builtin` and `--palette-dir` flags and the environment.
    pub fn from_flags(builtin: bool, palette_dir: Option<&Path>) -> Self {
        if builtin {
            return Self::Builtin;
        }
        Self::Directory(resolve_palette_dir(
            palette_dir,
            std::env::var_os(PALETTE_DIR_ENV),
        ))
    }

    pub fn source(&self) -> SharedSource {
        match self {
            Self::Builtin => Arc::new(builtin_source()),
            Self::Directory(dir) => Arc::new(DirectorySource::new(dir.clone())),
        }
    }

    /// Short description for console output.
    pub fn describe(&self) -> String {
        match self {
            Self::Builtin => "built-in".to_string(),
            Self::Directory(dir) => dir.display().to_string(),
        }
    }
}

/// Flag first, then the environment value, then [`DEFAULT_PALETTE_DIR`].
pub fn resolve_palette_dir(flag: Option<&Path>, env: Option<OsString>) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    match env {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => PathBuf::from(DEFAULT_PALETTE_DIR),
    }
}
