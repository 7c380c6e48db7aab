//! Palette definition parsing and merging.
//!
//! A definition is a JSON object mapping string-encoded colors to blocks,
//! optionally preceded by `#` comment lines:
//!
//! ```text
//! # Wool
//! {
//!   "(160, 39, 34)": ["minecraft:red_wool", 0],
//!   "233, 236, 239": {"block_name": "minecraft:white_wool", "block_data": 0}
//! }
//! ```
//!
//! Bad entries are skipped and recorded; they never abort a load.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::Value;
use sunpixel_spec::{
    ConvertError, ConvertResult, ConvertWarning, MalformedEntry, PaletteDefinition, PaletteEntry,
    PaletteInfo, PaletteTable, Rgb, WarningCode,
};
use tracing::{debug, warn};

use crate::source::PaletteSource;

/// Palette names selected when the caller names none.
pub const DEFAULT_SELECTION: [&str; 2] = ["wool", "concrete"];

/// Key used when the whole document is rejected.
const DOCUMENT_KEY: &str = "<document>";

/// Accepted shapes of an entry value.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Pair(String, i64),
    Single((String,)),
    Named {
        block_name: String,
        #[serde(default)]
        block_data: i64,
    },
    Bare(String),
}

impl RawEntry {
    fn into_parts(self) -> (String, i64) {
        match self {
            RawEntry::Pair(block, data) => (block, data),
            RawEntry::Single((block,)) => (block, 0),
            RawEntry::Named {
                block_name,
                block_data,
            } => (block_name, block_data),
            RawEntry::Bare(block) => (block, 0),
        }
    }
}

/// Split leading comment lines from the JSON body.
///
/// Returns the display name (first comment line, `#` and surrounding
/// whitespace removed) and the remaining text.
fn strip_comments(text: &str) -> (Option<String>, String) {
    let mut display_name = None;
    let mut seen_comment = false;
    let mut body = String::with_capacity(text.len());

    for line in text.lines() {
        let trimmed = line.trim_start();
        if let Some(comment) = trimmed.strip_prefix('#') {
            if !seen_comment {
                seen_comment = true;
                let name = comment.trim();
                if !name.is_empty() {
                    display_name = Some(name.to_string());
                }
            }
            continue;
        }
        body.push_str(line);
        body.push('\n');
    }

    (display_name, body)
}

fn parse_entry(key: &str, value: Value) -> Result<(Rgb, PaletteEntry), String> {
    let color: Rgb = key.parse().map_err(|e| format!("bad color key: {e}"))?;

    let raw: RawEntry = serde_json::from_value(value)
        .map_err(|_| "expected [block, data] or {\"block_name\", \"block_data\"}".to_string())?;
    let (block, data) = raw.into_parts();

    if block.trim().is_empty() {
        return Err("empty block identifier".to_string());
    }
    let data = u8::try_from(data).map_err(|_| format!("aux data {data} is out of range 0-255"))?;

    Ok((color, PaletteEntry::new(block, data)))
}

/// Parse one palette definition.
///
/// Never fails: an unreadable document yields a definition with no entries
/// and a single malformed record.
pub fn parse_definition(name: &str, text: &str) -> PaletteDefinition {
    let (display_name, body) = strip_comments(text);
    let mut definition = PaletteDefinition {
        name: name.to_string(),
        display_name,
        ..Default::default()
    };

    let malformed = |key: &str, reason: String| {
        warn!(palette = name, key, %reason, "skipping palette entry");
        MalformedEntry {
            palette: name.to_string(),
            key: key.to_string(),
            reason,
        }
    };

    if body.trim().is_empty() {
        let record = malformed(DOCUMENT_KEY, "no JSON content".to_string());
        definition.malformed.push(record);
        return definition;
    }

    let object = match serde_json::from_str::<Value>(&body) {
        Ok(Value::Object(object)) => object,
        Ok(_) => {
            let record = malformed(DOCUMENT_KEY, "expected a JSON object".to_string());
            definition.malformed.push(record);
            return definition;
        }
        Err(e) => {
            let record = malformed(DOCUMENT_KEY, format!("invalid JSON: {e}"));
            definition.malformed.push(record);
            return definition;
        }
    };

    for (key, value) in object {
        match parse_entry(&key, value) {
            Ok(entry) => definition.entries.push(entry),
            Err(reason) => {
                let record = malformed(&key, reason);
                definition.malformed.push(record);
            }
        }
    }

    definition
}

/// Result of [`load_palette`].
#[derive(Debug, Clone)]
pub struct LoadedPalette {
    /// Merged color table.
    pub table: PaletteTable,
    /// Definitions that were found, in merge order.
    pub definitions: Vec<PaletteDefinition>,
    /// Malformed entries and unresolved names.
    pub warnings: Vec<ConvertWarning>,
}

/// Load and merge the selected palettes from `source`.
///
/// Definitions merge in the source's listing order; on a color collision the
/// later definition wins.
///
/// # Errors
///
/// - [`ConvertError::PaletteDirectoryMissing`] if the source location does not exist
/// - [`ConvertError::EmptyPalette`] if the merged table has no entries
pub fn load_palette<S, N>(source: &S, selected: &[N]) -> ConvertResult<LoadedPalette>
where
    S: PaletteSource + ?Sized,
    N: AsRef<str>,
{
    let wanted: BTreeSet<&str> = selected.iter().map(|n| n.as_ref()).collect();
    let available = source.names()?;

    let mut table = PaletteTable::new();
    let mut definitions = Vec::new();
    let mut warnings = Vec::new();
    let mut resolved = BTreeSet::new();

    for name in available.iter().filter(|n| wanted.contains(n.as_str())) {
        let Some(text) = source.read(name)? else {
            continue;
        };
        let definition = parse_definition(name, &text);
        warnings.extend(definition.malformed.iter().map(|m| {
            ConvertWarning::new(
                WarningCode::MalformedPaletteEntry,
                format!("{}: skipped {}: {}", m.palette, m.key, m.reason),
            )
        }));

        let replaced = table.merge(&definition);
        debug!(
            palette = %name,
            entries = definition.entries.len(),
            replaced,
            "loaded palette"
        );
        resolved.insert(name.as_str());
        definitions.push(definition);
    }

    for name in wanted.difference(&resolved) {
        warn!(palette = %name, "selected palette not found");
        warnings.push(ConvertWarning::new(
            WarningCode::PaletteNotFound,
            format!("palette '{name}' not found"),
        ));
    }

    if table.is_empty() {
        return Err(ConvertError::EmptyPalette {
            selected: wanted.iter().map(|n| n.to_string()).collect(),
        });
    }

    debug!(colors = table.len(), "merged palette table");
    Ok(LoadedPalette {
        table,
        definitions,
        warnings,
    })
}

/// Summaries of every palette in `source`, in listing order.
pub fn list_palettes<S: PaletteSource + ?Sized>(source: &S) -> ConvertResult<Vec<PaletteInfo>> {
    let mut infos = Vec::new();
    for name in source.names()? {
        let Some(text) = source.read(&name)? else {
            continue;
        };
        let definition = parse_definition(&name, &text);
        infos.push(PaletteInfo {
            display_name: definition.display_name().to_string(),
            entry_count: definition.entries.len(),
            name,
        });
    }
    Ok(infos)
}
