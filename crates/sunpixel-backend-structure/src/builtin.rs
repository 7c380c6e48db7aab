//! Palettes bundled with the library.

use std::fs;
use std::path::{Path, PathBuf};

use sunpixel_spec::ConvertResult;
use tracing::info;

use crate::source::{DirectorySource, MemorySource};

const WOOL: &str = include_str!("../palettes/wool.json");
const CONCRETE: &str = include_str!("../palettes/concrete.json");

/// Names of the bundled palettes.
pub const BUILTIN_NAMES: [&str; 2] = ["wool", "concrete"];

fn builtin_text(name: &str) -> Option<&'static str> {
    match name {
        "wool" => Some(WOOL),
        "concrete" => Some(CONCRETE),
        _ => None,
    }
}

/// The bundled wool and concrete palettes.
pub fn builtin_source() -> MemorySource {
    BUILTIN_NAMES
        .iter()
        .filter_map(|name| builtin_text(name).map(|text| (*name, text)))
        .fold(MemorySource::new(), |source, (name, text)| {
            source.with(name, text)
        })
}

/// Write the bundled palettes into `dir`, creating it if needed.
///
/// Existing files are left alone unless `overwrite` is set. Returns the paths
/// that were written.
pub fn install_builtin(dir: &Path, overwrite: bool) -> ConvertResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let target = DirectorySource::new(dir);

    let mut written = Vec::new();
    for (name, text) in builtin_source().iter() {
        let path = target.path_for(name);
        if path.exists() && !overwrite {
            info!(path = %path.display(), "palette exists, skipping");
            continue;
        }
        fs::write(&path, text)?;
        written.push(path);
    }
    Ok(written)
}
