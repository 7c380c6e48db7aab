//! SunPixel shared types
//!
//! This crate holds the data model used by every stage of the image-to-structure
//! pipeline. It performs no I/O; the pipeline itself lives in
//! `sunpixel-backend-structure`.
//!
//! # Example
//!
//! ```
//! use sunpixel_spec::{GridDimensions, PaletteEntry, PaletteTable, Rgb, Suggestion};
//!
//! let mut table = PaletteTable::new();
//! table.insert(Rgb::new(160, 39, 34), PaletteEntry::new("minecraft:red_wool", 0));
//! assert_eq!(table.len(), 1);
//!
//! let key: Rgb = "(160, 39, 34)".parse().unwrap();
//! assert!(table.get(&key).is_some());
//!
//! let suggestion = GridDimensions::suggest_for(
//!     GridDimensions::new(200, 200),
//!     GridDimensions::new(100, 50),
//! );
//! assert_eq!(suggestion, Suggestion::Adjust(GridDimensions::new(50, 50)));
//! ```
//!
//! # Modules
//!
//! - [`color`]: RGB colors and the redmean distance
//! - [`palette`]: Palette entries, definitions, and the merged table
//! - [`dimensions`]: Grid sizes and the aspect-ratio suggestion
//! - [`output`]: Image and structure formats, structure metadata
//! - [`progress`]: Progress events and sinks
//! - [`error`]: Error taxonomy and warnings
//! - [`report`]: Conversion report

pub mod color;
pub mod dimensions;
pub mod error;
pub mod output;
pub mod palette;
pub mod progress;
pub mod report;

pub use color::{perceptual_distance, ParseRgbError, Rgb};
pub use dimensions::{
    resolve_size, GridDimensions, ResolvedSize, SizePolicy, Suggestion, ASPECT_TOLERANCE,
};
pub use error::{
    BackendError, ConvertError, ConvertResult, ConvertWarning, ErrorCode, WarningCode,
};
pub use output::{ImageFormat, StructureFormat, StructureMetadata};
pub use palette::{MalformedEntry, PaletteDefinition, PaletteEntry, PaletteInfo, PaletteTable};
pub use progress::{NullProgress, ProgressEvent, ProgressLog, ProgressSink, Stage};
pub use report::{ConversionReport, StageTiming, REPORT_VERSION};
