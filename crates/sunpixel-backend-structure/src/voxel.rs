//! Palette-indexed single-layer voxel grid.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sunpixel_spec::{ConvertError, ConvertResult, GridDimensions, PaletteEntry, PaletteTable};

use crate::buffer::PixelBuffer;
use crate::matcher::ColorMatcher;

/// Block identifier that does not count as a placed block.
pub const AIR: &str = "minecraft:air";

/// One matched layer of blocks.
///
/// `indices` and `aux` are row-major with y (structure length) outer and x
/// inner. Every index is `< palette.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoxelGrid {
    pub width: u32,
    pub height: u32,
    /// Distinct block identifiers in first-use order.
    pub palette: Vec<String>,
    pub indices: Vec<u32>,
    pub aux: Vec<u8>,
}

impl VoxelGrid {
    pub fn dimensions(&self) -> GridDimensions {
        GridDimensions::new(self.width, self.height)
    }

    pub fn cell_count(&self) -> u64 {
        self.indices.len() as u64
    }

    #[inline]
    fn offset(&self, x: u32, z: u32) -> usize {
        z as usize * self.width as usize + x as usize
    }

    /// Palette index at column `x`, row `z`.
    pub fn index_at(&self, x: u32, z: u32) -> u32 {
        self.indices[self.offset(x, z)]
    }

    /// Aux data at column `x`, row `z`.
    pub fn aux_at(&self, x: u32, z: u32) -> u8 {
        self.aux[self.offset(x, z)]
    }

    /// Block identifier at column `x`, row `z`.
    pub fn block_at(&self, x: u32, z: u32) -> &str {
        &self.palette[self.index_at(x, z) as usize]
    }

    /// Iterate `(x, z, block, aux)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32, &str, u8)> + '_ {
        let width = self.width.max(1);
        self.indices
            .iter()
            .zip(&self.aux)
            .enumerate()
            .map(move |(i, (&index, &aux))| {
                let i = i as u32;
                (i % width, i / width, self.palette[index as usize].as_str(), aux)
            })
    }

    /// Cells whose block is not air.
    pub fn placed_count(&self) -> u64 {
        let air = self.palette.iter().position(|b| b == AIR);
        match air {
            Some(air) => self.indices.iter().filter(|&&i| i as usize != air).count() as u64,
            None => self.cell_count(),
        }
    }
}

/// Match every cell of `grid` against `table`.
///
/// # Errors
///
/// [`ConvertError::EmptyPalette`] if `table` has no entries.
pub fn build(grid: &PixelBuffer, table: &PaletteTable) -> ConvertResult<VoxelGrid> {
    build_with_progress(grid, table, |_, _| {})
}

/// Like [`build`], calling `on_row(done, total)` after each matched row.
pub fn build_with_progress<F>(
    grid: &PixelBuffer,
    table: &PaletteTable,
    mut on_row: F,
) -> ConvertResult<VoxelGrid>
where
    F: FnMut(u32, u32),
{
    if table.is_empty() {
        return Err(ConvertError::EmptyPalette {
            selected: Vec::new(),
        });
    }

    let mut matcher = ColorMatcher::new(table);
    let mut matched: Vec<&PaletteEntry> = Vec::with_capacity(grid.data.len());
    let mut palette: Vec<String> = Vec::new();
    let mut positions: HashMap<&str, u32> = HashMap::new();

    for (row_index, row) in grid.rows().enumerate() {
        for &color in row {
            let Some(entry) = matcher.closest(color) else {
                continue;
            };
            if !positions.contains_key(entry.block.as_str()) {
                positions.insert(entry.block.as_str(), palette.len() as u32);
                palette.push(entry.block.clone());
            }
            matched.push(entry);
        }
        on_row(row_index as u32 + 1, grid.height);
    }

    // Lookups cannot miss; index 0 is the fallback if one ever does.
    let indices = matched
        .iter()
        .map(|entry| positions.get(entry.block.as_str()).copied().unwrap_or(0))
        .collect();
    let aux = matched.iter().map(|entry| entry.data).collect();

    Ok(VoxelGrid {
        width: grid.width,
        height: grid.height,
        palette,
        indices,
        aux,
    })
}
