//! Where palette definitions come from.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sunpixel_spec::{ConvertError, ConvertResult};

/// Extension of palette definition files.
pub const PALETTE_EXTENSION: &str = "json";

/// A named collection of palette definitions.
///
/// `names` fixes the merge order: definitions are merged in the order listed,
/// so later names win on color collisions.
pub trait PaletteSource {
    /// Available palette names in merge order.
    fn names(&self) -> ConvertResult<Vec<String>>;

    /// Raw definition text for `name`, or `None` if it does not exist.
    fn read(&self, name: &str) -> ConvertResult<Option<String>>;
}

impl<T: PaletteSource + ?Sized> PaletteSource for &T {
    fn names(&self) -> ConvertResult<Vec<String>> {
        (**self).names()
    }

    fn read(&self, name: &str) -> ConvertResult<Option<String>> {
        (**self).read(name)
    }
}

/// Palettes stored as `<root>/<name>.json`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the definition file for `name`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{PALETTE_EXTENSION}"))
    }

    fn ensure_root(&self) -> ConvertResult<()> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(ConvertError::PaletteDirectoryMissing {
                path: self.root.clone(),
            })
        }
    }
}

impl PaletteSource for DirectorySource {
    fn names(&self) -> ConvertResult<Vec<String>> {
        self.ensure_root()?;

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let is_palette = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(PALETTE_EXTENSION));
            if let (true, Some(stem)) = (is_palette, path.file_stem().and_then(|s| s.to_str())) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> ConvertResult<Option<String>> {
        self.ensure_root()?;

        // Names are plain stems; anything that could leave the root is absent.
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Ok(None);
        }

        match fs::read_to_string(self.path_for(name)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Palettes held in memory, listed in name order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    definitions: BTreeMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a definition.
    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }

    /// Add or replace a definition.
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.definitions.insert(name.into(), text.into());
    }

    /// Iterate `(name, text)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.definitions
            .iter()
            .map(|(n, t)| (n.as_str(), t.as_str()))
    }
}

impl PaletteSource for MemorySource {
    fn names(&self) -> ConvertResult<Vec<String>> {
        Ok(self.definitions.keys().cloned().collect())
    }

    fn read(&self, name: &str) -> ConvertResult<Option<String>> {
        Ok(self.definitions.get(name).cloned())
    }
}
