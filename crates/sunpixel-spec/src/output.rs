//! Input image formats and output structure formats.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Structure file format written by the serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureFormat {
    /// Sponge schematic v2: gzip-compressed NBT.
    Schem,
    /// Flat JSON block list.
    Json,
    /// Single-region Litematica structure: gzip-compressed NBT.
    Litematic,
}

impl StructureFormat {
    /// All supported formats.
    pub const ALL: [StructureFormat; 3] = [
        StructureFormat::Schem,
        StructureFormat::Json,
        StructureFormat::Litematic,
    ];

    /// Returns the file extension for this format (without the dot).
    pub fn extension(&self) -> &'static str {
        match self {
            StructureFormat::Schem => "schem",
            StructureFormat::Json => "json",
            StructureFormat::Litematic => "litematic",
        }
    }

    /// Checks if this format is gzip-compressed NBT.
    pub fn is_nbt(&self) -> bool {
        matches!(self, StructureFormat::Schem | StructureFormat::Litematic)
    }
}

impl fmt::Display for StructureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for StructureFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_start_matches('.').to_ascii_lowercase();
        StructureFormat::ALL
            .into_iter()
            .find(|f| f.extension() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown structure format '{}' (expected schem, json, or litematic)",
                    s
                )
            })
    }
}

/// Input image format, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Detect the format from an extension such as `png`, `.JPG`, or `jpeg`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    /// Canonical extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageFormat::Png => write!(f, "png"),
            ImageFormat::Jpeg => write!(f, "jpeg"),
        }
    }
}

/// Descriptive fields written alongside a structure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StructureMetadata {
    pub name: String,
    pub author: String,
    pub description: String,
    /// Creation time in Unix milliseconds.
    pub created_ms: i64,
}

impl StructureMetadata {
    /// Author written when none is given.
    pub const DEFAULT_AUTHOR: &'static str = "SunPixel";

    /// Metadata with a name and the default author.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            author: Self::DEFAULT_AUTHOR.to_string(),
            ..Default::default()
        }
    }
}
