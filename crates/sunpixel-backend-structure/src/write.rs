//! Atomic structure file output.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use sunpixel_spec::{ConvertResult, StructureFormat};
use tempfile::NamedTempFile;
use tracing::debug;

/// `path` with the format's extension appended if it does not already end with it.
///
/// `mural` becomes `mural.schem`; `mural.schem` is unchanged; `mural.png`
/// becomes `mural.png.schem`.
pub fn output_path(path: &Path, format: StructureFormat) -> PathBuf {
    let has_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(format.extension()));
    if has_extension {
        return path.to_path_buf();
    }

    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(format.extension());
    PathBuf::from(name)
}

/// Write `bytes` to `path` through a temporary file in the same directory.
///
/// The target only ever appears complete: on failure the temporary file is
/// removed and `path` is untouched.
pub fn write_structure(path: &Path, bytes: &[u8]) -> ConvertResult<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let mut tmp = NamedTempFile::new_in(&parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    debug!(path = %path.display(), bytes = bytes.len(), "wrote structure");
    Ok(())
}
