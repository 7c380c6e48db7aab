//! SunPixel Structure Backend
//!
//! This crate turns PNG and JPEG images into Minecraft block structures.
//! Output is deterministic: the same image, palettes, and options always
//! produce the same voxel grid and the same encoded bytes.
//!
//! # Pipeline
//!
//! - **Palettes**: block color definitions loaded from a [`PaletteSource`]
//!   and merged into one table
//! - **Decode**: PNG/JPEG bytes into an RGB [`PixelBuffer`]
//! - **Resample**: region averaging down to the target grid size
//! - **Match**: redmean nearest color per cell, with a per-conversion cache
//! - **Encode**: Sponge schematic, JSON block list, or simplified Litematica
//!
//! # Example
//!
//! ```no_run
//! use sunpixel_backend_structure::{builtin_source, convert_file, ConvertOptions};
//! use sunpixel_spec::{NullProgress, StructureFormat};
//! use std::path::Path;
//!
//! let options = ConvertOptions {
//!     width: Some(64),
//!     height: Some(64),
//!     format: StructureFormat::Litematic,
//!     ..Default::default()
//! };
//!
//! let (path, conversion) = convert_file(
//!     Path::new("photo.png"),
//!     Path::new("out/photo"),
//!     &options,
//!     &builtin_source(),
//!     NullProgress,
//! )
//! .unwrap();
//! println!("{} -> {} ({} blocks)", conversion.report.hash, path.display(), conversion.report.cell_count);
//! ```
//!
//! # Determinism
//!
//! - Palette tables iterate in ascending color order; ties go to the first
//! - The block palette is listed in first-occurrence order
//! - Palette directories merge in sorted file order
//! - Report hashes are BLAKE3 over the encoded bytes

pub mod buffer;
pub mod builtin;
pub mod convert;
pub mod decode;
pub mod encode;
pub mod matcher;
pub mod palette;
pub mod resample;
pub mod source;
pub mod task;
pub mod voxel;
pub mod write;

// Re-export main types for convenience
pub use buffer::PixelBuffer;
pub use builtin::{builtin_source, install_builtin, BUILTIN_NAMES};
pub use convert::{convert, convert_file, Conversion, ConvertOptions};
pub use decode::{decode, image_format};
pub use encode::{
    check_size, encode_structure, encoder_for, read_structure, DecodedStructure, StructureEncoder,
    MAX_CELLS,
};
pub use matcher::{closest, ColorMatcher};
pub use palette::{list_palettes, load_palette, parse_definition, LoadedPalette, DEFAULT_SELECTION};
pub use resample::resample;
pub use source::{DirectorySource, MemorySource, PaletteSource};
pub use task::{TaskFailure, TaskId, TaskResult, TaskSnapshot, TaskStore};
pub use voxel::{build, build_with_progress, VoxelGrid, AIR};
pub use write::{output_path, write_structure};
