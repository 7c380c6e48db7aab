//! Dense RGB pixel storage.

use sunpixel_spec::{GridDimensions, Rgb};

/// A row-major grid of colors.
///
/// Used both for decoded images and for resampled output grids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel data (row-major, y outer).
    pub data: Vec<Rgb>,
}

impl PixelBuffer {
    /// Create a buffer filled with one color.
    pub fn new(width: u32, height: u32, fill: Rgb) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            data: vec![fill; size],
        }
    }

    /// Wrap existing row-major data. Returns `None` if the length is wrong.
    pub fn from_data(width: u32, height: u32, data: Vec<Rgb>) -> Option<Self> {
        (data.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// Build from packed 8-bit pixels with `channels` bytes each.
    ///
    /// Channels past the third (alpha) are dropped. Grayscale (one or two
    /// channels) is expanded to equal RGB components.
    pub fn from_packed(width: u32, height: u32, bytes: &[u8], channels: usize) -> Option<Self> {
        if channels == 0 {
            return None;
        }
        let data = bytes
            .chunks_exact(channels)
            .map(|px| match channels {
                1 | 2 => Rgb::new(px[0], px[0], px[0]),
                _ => Rgb::from_pixel(px),
            })
            .collect();
        Self::from_data(width, height, data)
    }

    /// Buffer dimensions.
    pub fn dimensions(&self) -> GridDimensions {
        GridDimensions::new(self.width, self.height)
    }

    /// Get a pixel at the given coordinates.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Rgb {
        self.data[self.index(x, y)]
    }

    /// Set a pixel at the given coordinates.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Rgb) {
        let idx = self.index(x, y);
        self.data[idx] = color;
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Iterate rows.
    pub fn rows(&self) -> impl Iterator<Item = &[Rgb]> {
        self.data.chunks(self.width.max(1) as usize)
    }

    /// Convert to 8-bit RGB bytes.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.data.iter().flat_map(|c| c.to_array()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let mut buf = PixelBuffer::new(3, 2, Rgb::BLACK);
        buf.set(2, 1, Rgb::WHITE);
        assert_eq!(buf.get(2, 1), Rgb::WHITE);
        assert_eq!(buf.data[5], Rgb::WHITE);
        assert_eq!(buf.get(0, 0), Rgb::BLACK);
    }

    #[test]
    fn test_from_packed_drops_alpha() {
        let rgba = [10, 20, 30, 0, 40, 50, 60, 255];
        let buf = PixelBuffer::from_packed(2, 1, &rgba, 4).unwrap();
        assert_eq!(buf.data, vec![Rgb::new(10, 20, 30), Rgb::new(40, 50, 60)]);
    }

    #[test]
    fn test_from_packed_expands_gray() {
        let gray_alpha = [7, 255, 9, 0];
        let buf = PixelBuffer::from_packed(1, 2, &gray_alpha, 2).unwrap();
        assert_eq!(buf.data, vec![Rgb::new(7, 7, 7), Rgb::new(9, 9, 9)]);
    }

    #[test]
    fn test_from_data_rejects_wrong_length() {
        assert!(PixelBuffer::from_data(2, 2, vec![Rgb::BLACK; 3]).is_none());
        assert!(PixelBuffer::from_packed(2, 2, &[0; 11], 3).is_none());
    }

    #[test]
    fn test_rows_and_bytes() {
        let buf = PixelBuffer::from_data(
            2,
            2,
            vec![Rgb::new(1, 2, 3), Rgb::new(4, 5, 6), Rgb::BLACK, Rgb::WHITE],
        )
        .unwrap();
        assert_eq!(buf.rows().count(), 2);
        assert_eq!(&buf.to_rgb8()[..6], &[1, 2, 3, 4, 5, 6]);
    }
}
