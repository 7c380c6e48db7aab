//! PNG and JPEG decoding into a [`PixelBuffer`].

use std::io::Cursor;

use sunpixel_spec::{ConvertError, ConvertResult, ImageFormat};
use tracing::debug;

use crate::buffer::PixelBuffer;

/// Resolve an image format from a file extension.
///
/// # Errors
///
/// [`ConvertError::UnsupportedImageFormat`] for anything but png, jpg, or jpeg.
pub fn image_format(extension: &str) -> ConvertResult<ImageFormat> {
    ImageFormat::from_extension(extension).ok_or_else(|| ConvertError::UnsupportedImageFormat {
        extension: extension.to_string(),
    })
}

/// Decode image bytes to RGB. Alpha is dropped, not composited.
///
/// # Errors
///
/// [`ConvertError::ImageDecode`] for corrupt or truncated data and for
/// images with a zero dimension.
pub fn decode(bytes: &[u8], format: ImageFormat) -> ConvertResult<PixelBuffer> {
    let buffer = match format {
        ImageFormat::Png => decode_png(bytes)?,
        ImageFormat::Jpeg => decode_jpeg(bytes)?,
    };

    if buffer.width == 0 || buffer.height == 0 {
        return Err(ConvertError::decode(format!(
            "image has zero dimension ({}x{})",
            buffer.width, buffer.height
        )));
    }

    debug!(%format, width = buffer.width, height = buffer.height, "decoded image");
    Ok(buffer)
}

fn decode_png(bytes: &[u8]) -> ConvertResult<PixelBuffer> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    // Palette and low-bit-depth images come out as 8-bit gray or RGB(A).
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);

    let mut reader = decoder
        .read_info()
        .map_err(|e| ConvertError::decode(format!("failed to read PNG header: {e}")))?;

    let mut pixels = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut pixels)
        .map_err(|e| ConvertError::decode(format!("failed to decode PNG frame: {e}")))?;
    pixels.truncate(info.buffer_size());

    let channels = match info.color_type {
        png::ColorType::Grayscale => 1,
        png::ColorType::GrayscaleAlpha => 2,
        png::ColorType::Rgb => 3,
        png::ColorType::Rgba => 4,
        png::ColorType::Indexed => {
            return Err(ConvertError::decode("indexed PNG was not expanded"));
        }
    };

    PixelBuffer::from_packed(info.width, info.height, &pixels, channels)
        .ok_or_else(|| ConvertError::decode("PNG frame size does not match its header"))
}

fn decode_jpeg(bytes: &[u8]) -> ConvertResult<PixelBuffer> {
    let image = image::load_from_memory_with_format(bytes, image::ImageFormat::Jpeg)
        .map_err(|e| ConvertError::decode(format!("failed to decode JPEG: {e}")))?;
    // Grayscale and CMYK sources are converted here.
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();

    PixelBuffer::from_packed(width, height, rgb.as_raw(), 3)
        .ok_or_else(|| ConvertError::decode("JPEG buffer size does not match its dimensions"))
}
