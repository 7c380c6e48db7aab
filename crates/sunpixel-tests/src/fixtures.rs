//! Test fixture utilities: in-memory images and palette directories.

use std::fs;
use std::path::{Path, PathBuf};
use sunpixel_backend_structure::{install_builtin, PixelBuffer};
use sunpixel_spec::Rgb;
use tempfile::TempDir;

/// A single-color image.
pub fn solid(width: u32, height: u32, color: Rgb) -> PixelBuffer {
    PixelBuffer::new(width, height, color)
}

/// Horizontal red ramp over a vertical blue ramp.
pub fn gradient(width: u32, height: u32) -> PixelBuffer {
    let x_span = width.saturating_sub(1).max(1);
    let y_span = height.saturating_sub(1).max(1);
    let mut buffer = PixelBuffer::new(width, height, Rgb::BLACK);
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / x_span) as u8;
            let b = (y * 255 / y_span) as u8;
            buffer.set(x, y, Rgb::new(r, 128, b));
        }
    }
    buffer
}

/// Alternating `cell`-sized squares of `a` and `b`.
pub fn checkerboard(width: u32, height: u32, cell: u32, a: Rgb, b: Rgb) -> PixelBuffer {
    let cell = cell.max(1);
    let mut buffer = PixelBuffer::new(width, height, a);
    for y in 0..height {
        for x in 0..width {
            if (x / cell + y / cell) % 2 == 1 {
                buffer.set(x, y, b);
            }
        }
    }
    buffer
}

/// Encode `buffer` as an 8-bit RGB PNG.
pub fn png_bytes(buffer: &PixelBuffer) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, buffer.width, buffer.height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().expect("Failed to write PNG header");
        writer
            .write_image_data(&buffer.to_rgb8())
            .expect("Failed to write PNG data");
    }
    out
}

/// Encode `buffer` as a baseline JPEG.
pub fn jpeg_bytes(buffer: &PixelBuffer, quality: u8) -> Vec<u8> {
    use image::ImageEncoder;

    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality)
        .write_image(
            &buffer.to_rgb8(),
            buffer.width,
            buffer.height,
            image::ExtendedColorType::Rgb8,
        )
        .expect("Failed to encode JPEG");
    out
}

/// A temporary palette directory.
pub struct PaletteDirFixture {
    pub root: TempDir,
    pub dir: PathBuf,
}

impl PaletteDirFixture {
    /// Create an empty palette directory.
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let dir = root.path().join("block");
        fs::create_dir_all(&dir).expect("Failed to create palette dir");
        Self { root, dir }
    }

    /// Create a palette directory holding the built-in palettes.
    pub fn with_builtin() -> Self {
        let fixture = Self::new();
        install_builtin(&fixture.dir, false).expect("Failed to install built-in palettes");
        fixture
    }

    /// Palette directory path.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Scratch directory next to the palettes, for inputs and outputs.
    pub fn scratch(&self) -> PathBuf {
        let scratch = self.root.path().join("work");
        fs::create_dir_all(&scratch).expect("Failed to create scratch dir");
        scratch
    }

    /// Write `<name>.json` with `content`.
    pub fn add(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.join(format!("{name}.json"));
        fs::write(&path, content).expect("Failed to write palette file");
        path
    }

    /// Write `bytes` into the scratch directory as `file_name`.
    pub fn add_input(&self, file_name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.scratch().join(file_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create input dir");
        }
        fs::write(&path, bytes).expect("Failed to write input file");
        path
    }
}

impl Default for PaletteDirFixture {
    fn default() -> Self {
        Self::new()
    }
}
