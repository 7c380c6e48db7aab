//! Palette types: color-to-block entries, loaded definitions, and the merged table.

use std::collections::{btree_map, BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// The block a palette color maps to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaletteEntry {
    /// Namespaced block identifier, e.g. `minecraft:red_wool`.
    pub block: String,
    /// Legacy numeric variant tag.
    #[serde(default)]
    pub data: u8,
}

impl PaletteEntry {
    /// Create an entry.
    pub fn new(block: impl Into<String>, data: u8) -> Self {
        Self {
            block: block.into(),
            data,
        }
    }
}

/// A palette entry that was skipped while parsing a definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedEntry {
    /// Palette the entry belongs to.
    pub palette: String,
    /// The raw key as it appeared in the definition.
    pub key: String,
    /// Why the entry was rejected.
    pub reason: String,
}

/// One named palette after parsing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaletteDefinition {
    /// Palette name (file stem for directory sources).
    pub name: String,
    /// Human-readable name from the leading `# ` comment, if any.
    pub display_name: Option<String>,
    /// Parsed entries, ordered by key text.
    pub entries: Vec<(Rgb, PaletteEntry)>,
    /// Entries that were skipped.
    pub malformed: Vec<MalformedEntry>,
}

impl PaletteDefinition {
    /// Display name, falling back to the palette name.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

/// Summary of an available palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteInfo {
    pub name: String,
    pub display_name: String,
    pub entry_count: usize,
}

/// Merged color-to-block mapping for one conversion.
///
/// Keys are unique; inserting an existing color replaces its entry.
/// Iteration is in ascending color order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaletteTable {
    entries: BTreeMap<Rgb, PaletteEntry>,
}

impl PaletteTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the entry it replaced.
    pub fn insert(&mut self, color: Rgb, entry: PaletteEntry) -> Option<PaletteEntry> {
        self.entries.insert(color, entry)
    }

    /// Merge a definition into the table. Later merges win on color collisions.
    ///
    /// Returns the number of colors that replaced an existing entry.
    pub fn merge(&mut self, definition: &PaletteDefinition) -> usize {
        definition
            .entries
            .iter()
            .filter(|(color, entry)| self.insert(*color, entry.clone()).is_some())
            .count()
    }

    /// Entry for an exact color.
    pub fn get(&self, color: &Rgb) -> Option<&PaletteEntry> {
        self.entries.get(color)
    }

    /// Number of colors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no colors.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in ascending color order.
    pub fn iter(&self) -> btree_map::Iter<'_, Rgb, PaletteEntry> {
        self.entries.iter()
    }

    /// Distinct block identifiers referenced by the table.
    pub fn block_names(&self) -> BTreeSet<&str> {
        self.entries.values().map(|e| e.block.as_str()).collect()
    }
}

impl FromIterator<(Rgb, PaletteEntry)> for PaletteTable {
    fn from_iter<I: IntoIterator<Item = (Rgb, PaletteEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PaletteTable {
    type Item = (&'a Rgb, &'a PaletteEntry);
    type IntoIter = btree_map::Iter<'a, Rgb, PaletteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
