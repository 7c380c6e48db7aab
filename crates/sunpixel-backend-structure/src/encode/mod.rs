//! Structure encoders and readers.
//!
//! Each [`StructureFormat`] has exactly one [`StructureEncoder`], selected by
//! [`encoder_for`]. Every encoder can also read its own output back into a
//! [`DecodedStructure`] so formats can be checked against each other.

mod gzip;
mod json;
mod litematic;
mod schem;

use std::collections::BTreeSet;

use serde::Serialize;
use sunpixel_spec::{
    ConvertError, ConvertResult, GridDimensions, StructureFormat, StructureMetadata,
};

use crate::voxel::{VoxelGrid, AIR};

pub use json::JsonEncoder;
pub use litematic::LitematicEncoder;
pub use schem::SchemEncoder;

/// Minecraft data version written to NBT formats (1.19).
pub const DATA_VERSION: i32 = 3100;

/// Structure name used when the caller gives none.
pub const DEFAULT_NAME: &str = "sunpixel";

/// Largest grid, in cells, a conversion will build (4096 x 4096).
pub const MAX_CELLS: u64 = 1 << 24;

/// Encoder and reader for one structure format.
pub trait StructureEncoder: Send + Sync {
    /// The format this encoder produces.
    fn format(&self) -> StructureFormat;

    /// Largest width or length the format can store.
    fn max_extent(&self) -> u32 {
        u32::MAX
    }

    /// Encode `voxels`. `name` is used where the format names the structure
    /// and `metadata` does not.
    fn encode(
        &self,
        voxels: &VoxelGrid,
        name: &str,
        metadata: Option<&StructureMetadata>,
    ) -> ConvertResult<Vec<u8>>;

    /// Read bytes produced by [`StructureEncoder::encode`].
    fn decode(&self, bytes: &[u8]) -> ConvertResult<DecodedStructure>;
}

static SCHEM: SchemEncoder = SchemEncoder;
static JSON: JsonEncoder = JsonEncoder;
static LITEMATIC: LitematicEncoder = LitematicEncoder;

/// The encoder for `format`.
pub fn encoder_for(format: StructureFormat) -> &'static dyn StructureEncoder {
    match format {
        StructureFormat::Schem => &SCHEM,
        StructureFormat::Json => &JSON,
        StructureFormat::Litematic => &LITEMATIC,
    }
}

/// Encode `voxels` as `format`.
pub fn encode_structure(
    format: StructureFormat,
    voxels: &VoxelGrid,
    name: &str,
    metadata: Option<&StructureMetadata>,
) -> ConvertResult<Vec<u8>> {
    encoder_for(format).encode(voxels, name, metadata)
}

/// Reject grid sizes that `format` cannot store or that exceed [`MAX_CELLS`].
///
/// Runs before any pixel work so oversized requests fail without allocating.
pub fn check_size(format: StructureFormat, size: GridDimensions) -> ConvertResult<()> {
    let limit = encoder_for(format).max_extent();
    if size.width > limit || size.height > limit {
        return Err(ConvertError::serialization(
            format,
            format!("grid {size} exceeds the format limit of {limit} per side"),
        ));
    }
    if size.cell_count() > MAX_CELLS {
        return Err(ConvertError::serialization(
            format,
            format!(
                "grid {size} has {} cells; the limit is {MAX_CELLS}",
                size.cell_count()
            ),
        ));
    }
    Ok(())
}

/// Read a structure file's bytes.
pub fn read_structure(format: StructureFormat, bytes: &[u8]) -> ConvertResult<DecodedStructure> {
    encoder_for(format).decode(bytes)
}

/// A structure read back from disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedStructure {
    pub format: StructureFormat,
    /// X extent.
    pub width: u32,
    /// Y extent (always 1 for files written here).
    pub height: u32,
    /// Z extent.
    pub length: u32,
    pub palette: Vec<String>,
    /// Palette indices in `y, z, x` nesting order.
    pub indices: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl DecodedStructure {
    /// Distinct block identifiers.
    pub fn palette_set(&self) -> BTreeSet<&str> {
        self.palette.iter().map(String::as_str).collect()
    }

    /// Cells that are not air.
    pub fn placed_count(&self) -> u64 {
        self.indices
            .iter()
            .filter(|&&i| self.palette.get(i as usize).is_some_and(|b| b != AIR))
            .count() as u64
    }

    /// Block at each cell, in index order.
    pub fn blocks(&self) -> impl Iterator<Item = &str> + '_ {
        self.indices
            .iter()
            .map(|&i| self.palette.get(i as usize).map_or(AIR, String::as_str))
    }
}

/// Name, author, and description to write, with defaults applied.
pub(crate) struct Header {
    pub name: String,
    pub author: String,
    pub description: String,
    pub created_ms: i64,
}

impl Header {
    pub(crate) fn resolve(name: &str, metadata: Option<&StructureMetadata>) -> Self {
        let pick = |value: Option<&String>, fallback: &str| match value {
            Some(v) if !v.is_empty() => v.clone(),
            _ => fallback.to_string(),
        };
        let fallback_name = if name.is_empty() { DEFAULT_NAME } else { name };
        Self {
            name: pick(metadata.map(|m| &m.name), fallback_name),
            author: pick(
                metadata.map(|m| &m.author),
                StructureMetadata::DEFAULT_AUTHOR,
            ),
            description: metadata.map(|m| m.description.clone()).unwrap_or_default(),
            created_ms: metadata.map_or(0, |m| m.created_ms),
        }
    }
}

/// Convert a grid extent to the 16-bit size fields NBT formats use.
pub(crate) fn short_extent(format: StructureFormat, axis: &str, value: u32) -> ConvertResult<i16> {
    u16::try_from(value)
        .map(|v| v as i16)
        .map_err(|_| {
            ConvertError::serialization(
                format,
                format!("{axis} {value} exceeds the format limit of {}", u16::MAX),
            )
        })
}

/// Check a decoded index grid against its palette and extents.
pub(crate) fn validate_decoded(decoded: &DecodedStructure) -> ConvertResult<()> {
    let expected = decoded.width as u64 * decoded.height as u64 * decoded.length as u64;
    if decoded.indices.len() as u64 != expected {
        return Err(ConvertError::serialization(
            decoded.format,
            format!(
                "expected {expected} block indices, found {}",
                decoded.indices.len()
            ),
        ));
    }
    if let Some(&bad) = decoded
        .indices
        .iter()
        .find(|&&i| i as usize >= decoded.palette.len())
    {
        return Err(ConvertError::serialization(
            decoded.format,
            format!(
                "block index {bad} out of range for palette of {}",
                decoded.palette.len()
            ),
        ));
    }
    Ok(())
}
