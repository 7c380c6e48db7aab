//! Single-region Litematica structure (`.litematic`), simplified.
//!
//! Block states are stored as a flat int array of palette indices rather
//! than Litematica's bit-packed long array.

use std::collections::BTreeMap;

use fastnbt::IntArray;
use serde::{Deserialize, Serialize};
use sunpixel_spec::{ConvertError, ConvertResult, StructureFormat, StructureMetadata};

use super::{gzip, validate_decoded, DecodedStructure, Header, StructureEncoder, DATA_VERSION};
use crate::voxel::VoxelGrid;

const FORMAT: StructureFormat = StructureFormat::Litematic;
const LITEMATIC_VERSION: i32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Vec3 {
    x: i32,
    y: i32,
    z: i32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Litematic {
    version: i32,
    minecraft_data_version: i32,
    metadata: LitematicMetadata,
    regions: BTreeMap<String, Region>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LitematicMetadata {
    enclosing_size: Vec3,
    name: String,
    author: String,
    #[serde(default)]
    description: String,
    region_count: i32,
    #[serde(default)]
    total_blocks: i32,
    #[serde(default)]
    total_volume: i32,
    #[serde(default)]
    time_created: i64,
    #[serde(default)]
    time_modified: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Region {
    position: Vec3,
    size: Vec3,
    block_state_palette: Vec<BlockState>,
    block_states: IntArray,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BlockState {
    name: String,
    #[serde(default)]
    properties: BTreeMap<String, String>,
}

fn extent(axis: &str, value: u32) -> ConvertResult<i32> {
    i32::try_from(value).map_err(|_| {
        ConvertError::serialization(FORMAT, format!("{axis} {value} is too large"))
    })
}

/// Writes and reads simplified single-region Litematica files.
#[derive(Debug, Clone, Copy, Default)]
pub struct LitematicEncoder;

impl StructureEncoder for LitematicEncoder {
    fn format(&self) -> StructureFormat {
        FORMAT
    }

    fn max_extent(&self) -> u32 {
        i32::MAX as u32
    }

    fn encode(
        &self,
        voxels: &VoxelGrid,
        name: &str,
        metadata: Option<&StructureMetadata>,
    ) -> ConvertResult<Vec<u8>> {
        let header = Header::resolve(name, metadata);
        let size = Vec3 {
            x: extent("width", voxels.width)?,
            y: 1,
            z: extent("length", voxels.height)?,
        };

        let block_states = voxels
            .indices
            .iter()
            .map(|&i| i as i32)
            .collect::<Vec<_>>();

        let region = Region {
            position: Vec3 { x: 0, y: 0, z: 0 },
            size,
            block_state_palette: voxels
                .palette
                .iter()
                .map(|block| BlockState {
                    name: block.clone(),
                    properties: BTreeMap::new(),
                })
                .collect(),
            block_states: IntArray::new(block_states),
        };

        let volume = i32::try_from(voxels.cell_count()).unwrap_or(i32::MAX);
        let document = Litematic {
            version: LITEMATIC_VERSION,
            minecraft_data_version: DATA_VERSION,
            metadata: LitematicMetadata {
                enclosing_size: size,
                name: header.name.clone(),
                author: header.author,
                description: header.description,
                region_count: 1,
                total_blocks: i32::try_from(voxels.placed_count()).unwrap_or(i32::MAX),
                total_volume: volume,
                time_created: header.created_ms,
                time_modified: header.created_ms,
            },
            regions: BTreeMap::from([(header.name, region)]),
        };

        let nbt = fastnbt::to_bytes(&document)
            .map_err(|e| ConvertError::serialization(FORMAT, e.to_string()))?;
        Ok(gzip::compress(&nbt)?)
    }

    fn decode(&self, bytes: &[u8]) -> ConvertResult<DecodedStructure> {
        let nbt = gzip::decompress(bytes)
            .map_err(|e| ConvertError::serialization(FORMAT, format!("not gzip data: {e}")))?;
        let document: Litematic = fastnbt::from_bytes(&nbt)
            .map_err(|e| ConvertError::serialization(FORMAT, e.to_string()))?;

        let Some(region) = document.regions.into_values().next() else {
            return Err(ConvertError::serialization(FORMAT, "structure has no regions"));
        };

        let indices = region
            .block_states
            .iter()
            .map(|&i| {
                u32::try_from(i).map_err(|_| {
                    ConvertError::serialization(FORMAT, format!("negative block state {i}"))
                })
            })
            .collect::<ConvertResult<Vec<u32>>>()?;

        let decoded = DecodedStructure {
            format: FORMAT,
            // Negative sizes only mean the region extends the other way.
            width: region.size.x.unsigned_abs(),
            height: region.size.y.unsigned_abs(),
            length: region.size.z.unsigned_abs(),
            palette: region
                .block_state_palette
                .into_iter()
                .map(|state| state.name)
                .collect(),
            indices,
            name: Some(document.metadata.name),
            author: Some(document.metadata.author),
        };
        validate_decoded(&decoded)?;
        Ok(decoded)
    }
}
