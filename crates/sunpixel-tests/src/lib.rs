//! SunPixel End-to-End Test Infrastructure
//!
//! This crate provides integration tests for the conversion pipeline:
//!
//! - Conversion: image -> structure file, through the library and the CLI
//! - Cross-format: schem, json, and litematic describe the same grid
//! - **Determinism**: identical bytes across repeated conversions
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sunpixel-tests
//! ```
//!
//! ## Fixtures
//!
//! Images are built in memory with [`fixtures::png_bytes`] and
//! [`fixtures::jpeg_bytes`]; palette directories live in a temporary
//! directory owned by [`fixtures::PaletteDirFixture`].

pub mod determinism;
pub mod fixtures;

// Re-export commonly used items
pub use determinism::{compute_hash, verify_determinism, DeterminismResult, DiffInfo};
pub use fixtures::{checkerboard, gradient, jpeg_bytes, png_bytes, solid, PaletteDirFixture};
