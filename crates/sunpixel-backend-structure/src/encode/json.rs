//! Flat JSON block list.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sunpixel_spec::{ConvertError, ConvertResult, StructureFormat, StructureMetadata};

use super::{validate_decoded, DecodedStructure, Header, StructureEncoder};
use crate::voxel::VoxelGrid;

const FORMAT: StructureFormat = StructureFormat::Json;
const JSON_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct JsonStructure {
    name: String,
    author: String,
    version: u32,
    size: JsonSize,
    blocks: Vec<JsonBlock>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonSize {
    width: u32,
    height: u32,
    length: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonBlock {
    x: u32,
    y: u32,
    z: u32,
    block: String,
    data: u8,
}

/// Writes and reads the flat JSON block list.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl StructureEncoder for JsonEncoder {
    fn format(&self) -> StructureFormat {
        FORMAT
    }

    fn encode(
        &self,
        voxels: &VoxelGrid,
        name: &str,
        metadata: Option<&StructureMetadata>,
    ) -> ConvertResult<Vec<u8>> {
        let header = Header::resolve(name, metadata);
        let blocks = voxels
            .cells()
            .map(|(x, z, block, data)| JsonBlock {
                x,
                y: 0,
                z,
                block: block.to_string(),
                data,
            })
            .collect();

        let document = JsonStructure {
            name: header.name,
            author: header.author,
            version: JSON_VERSION,
            size: JsonSize {
                width: voxels.width,
                height: 1,
                length: voxels.height,
            },
            blocks,
        };

        serde_json::to_vec_pretty(&document)
            .map_err(|e| ConvertError::serialization(FORMAT, e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> ConvertResult<DecodedStructure> {
        let document: JsonStructure = serde_json::from_slice(bytes)
            .map_err(|e| ConvertError::serialization(FORMAT, e.to_string()))?;
        let JsonSize {
            width,
            height,
            length,
        } = document.size;

        let cells = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(length as usize))
            .ok_or_else(|| {
                ConvertError::serialization(FORMAT, format!("size {width}x{height}x{length} is too large"))
            })?;
        // Every cell is listed exactly once, so the block count bounds the allocation.
        if document.blocks.len() != cells {
            return Err(ConvertError::serialization(
                FORMAT,
                format!("expected {cells} blocks, found {}", document.blocks.len()),
            ));
        }
        let mut slots: Vec<Option<u32>> = vec![None; cells];
        let mut palette: Vec<String> = Vec::new();
        let mut positions: HashMap<String, u32> = HashMap::new();

        for block in document.blocks {
            if block.x >= width || block.y >= height || block.z >= length {
                return Err(ConvertError::serialization(
                    FORMAT,
                    format!("block at ({}, {}, {}) is outside the structure", block.x, block.y, block.z),
                ));
            }
            let index = match positions.get(&block.block) {
                Some(&index) => index,
                None => {
                    let index = palette.len() as u32;
                    positions.insert(block.block.clone(), index);
                    palette.push(block.block);
                    index
                }
            };
            let offset = (block.y as usize * length as usize + block.z as usize) * width as usize
                + block.x as usize;
            slots[offset] = Some(index);
        }

        let indices = slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.ok_or_else(|| {
                    ConvertError::serialization(FORMAT, format!("no block for cell {i}"))
                })
            })
            .collect::<ConvertResult<Vec<u32>>>()?;

        let decoded = DecodedStructure {
            format: FORMAT,
            width,
            height,
            length,
            palette,
            indices,
            name: Some(document.name),
            author: Some(document.author),
        };
        validate_decoded(&decoded)?;
        Ok(decoded)
    }
}
