//! Sponge schematic v2 (`.schem`).

use std::collections::BTreeMap;

use fastnbt::{ByteArray, IntArray};
use serde::{Deserialize, Serialize};
use sunpixel_spec::{ConvertError, ConvertResult, StructureFormat, StructureMetadata};

use super::{
    gzip, short_extent, validate_decoded, DecodedStructure, Header, StructureEncoder, DATA_VERSION,
};
use crate::voxel::VoxelGrid;

const FORMAT: StructureFormat = StructureFormat::Schem;
const SCHEM_VERSION: i32 = 2;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Schematic {
    version: i32,
    data_version: i32,
    width: i16,
    height: i16,
    length: i16,
    offset: IntArray,
    palette_max: i32,
    palette: BTreeMap<String, i32>,
    block_data: ByteArray,
    #[serde(default)]
    block_entities: Vec<fastnbt::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<SchemMetadata>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SchemMetadata {
    name: String,
    author: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    date: i64,
}

/// Append `value` as an unsigned LEB128 varint.
fn write_varint(out: &mut Vec<i8>, mut value: u32) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte as i8);
            return;
        }
        out.push((byte | 0x80) as i8);
    }
}

/// Decode a packed varint stream.
fn read_varints(data: &[i8]) -> ConvertResult<Vec<u32>> {
    let mut values = Vec::with_capacity(data.len());
    let mut value: u32 = 0;
    let mut shift = 0u32;

    for &b in data {
        let byte = b as u8;
        if shift >= 32 {
            return Err(ConvertError::serialization(FORMAT, "varint in BlockData is too long"));
        }
        value |= ((byte & 0x7f) as u32) << shift;
        if byte & 0x80 == 0 {
            values.push(value);
            value = 0;
            shift = 0;
        } else {
            shift += 7;
        }
    }

    if shift != 0 {
        return Err(ConvertError::serialization(FORMAT, "BlockData ends inside a varint"));
    }
    Ok(values)
}

/// Writes and reads Sponge schematic v2 files.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemEncoder;

impl StructureEncoder for SchemEncoder {
    fn format(&self) -> StructureFormat {
        FORMAT
    }

    fn max_extent(&self) -> u32 {
        u16::MAX as u32
    }

    fn encode(
        &self,
        voxels: &VoxelGrid,
        name: &str,
        metadata: Option<&StructureMetadata>,
    ) -> ConvertResult<Vec<u8>> {
        let palette = voxels
            .palette
            .iter()
            .enumerate()
            .map(|(i, block)| (block.clone(), i as i32))
            .collect::<BTreeMap<_, _>>();

        let mut block_data = Vec::with_capacity(voxels.indices.len());
        for &index in &voxels.indices {
            write_varint(&mut block_data, index);
        }

        // Metadata is optional in the format; only write it when given.
        let metadata = metadata.map(|m| {
            let header = Header::resolve(name, Some(m));
            SchemMetadata {
                name: header.name,
                author: header.author,
                description: header.description,
                date: header.created_ms,
            }
        });

        let schematic = Schematic {
            version: SCHEM_VERSION,
            data_version: DATA_VERSION,
            width: short_extent(FORMAT, "width", voxels.width)?,
            height: 1,
            length: short_extent(FORMAT, "length", voxels.height)?,
            offset: IntArray::new(vec![0, 0, 0]),
            palette_max: voxels.palette.len() as i32,
            palette,
            block_data: ByteArray::new(block_data),
            block_entities: Vec::new(),
            metadata,
        };

        let nbt = fastnbt::to_bytes(&schematic)
            .map_err(|e| ConvertError::serialization(FORMAT, e.to_string()))?;
        Ok(gzip::compress(&nbt)?)
    }

    fn decode(&self, bytes: &[u8]) -> ConvertResult<DecodedStructure> {
        let nbt = gzip::decompress(bytes)
            .map_err(|e| ConvertError::serialization(FORMAT, format!("not gzip data: {e}")))?;
        let schematic: Schematic = fastnbt::from_bytes(&nbt)
            .map_err(|e| ConvertError::serialization(FORMAT, e.to_string()))?;

        if schematic.version != SCHEM_VERSION {
            return Err(ConvertError::serialization(
                FORMAT,
                format!("unsupported schematic version {}", schematic.version),
            ));
        }

        let mut palette = vec![None; schematic.palette.len()];
        for (block, index) in schematic.palette {
            let slot = usize::try_from(index)
                .ok()
                .and_then(|i| palette.get_mut(i))
                .ok_or_else(|| {
                    ConvertError::serialization(FORMAT, format!("palette index {index} out of range"))
                })?;
            if slot.replace(block).is_some() {
                return Err(ConvertError::serialization(
                    FORMAT,
                    format!("palette index {index} assigned twice"),
                ));
            }
        }
        // Every slot is filled: n distinct in-range indices over n slots.
        let palette: Vec<String> = palette.into_iter().flatten().collect();

        let decoded = DecodedStructure {
            format: FORMAT,
            width: schematic.width as u16 as u32,
            height: schematic.height as u16 as u32,
            length: schematic.length as u16 as u32,
            palette,
            indices: read_varints(&schematic.block_data.iter().copied().collect::<Vec<_>>())?,
            name: schematic.metadata.as_ref().map(|m| m.name.clone()),
            author: schematic.metadata.map(|m| m.author),
        };
        validate_decoded(&decoded)?;
        Ok(decoded)
    }
}
