//! Region-average downscaling to the output grid.

use sunpixel_spec::{GridDimensions, Rgb};

use crate::buffer::PixelBuffer;

/// Source span `[start, end)` covered by output cell `i` along one axis.
#[inline]
fn span(i: u32, scale: f64, limit: u32) -> (u32, u32) {
    let start = (i as f64 * scale).floor() as u32;
    let end = (((i + 1) as f64 * scale).floor() as u32).min(limit);
    (start.min(limit), end)
}

/// Mean color of the source rectangle `[x0, x1) × [y0, y1)`, or white if empty.
fn region_mean(source: &PixelBuffer, (x0, x1): (u32, u32), (y0, y1): (u32, u32)) -> Rgb {
    let mut sums = [0u64; 3];
    let mut count = 0u64;

    for y in y0..y1 {
        for x in x0..x1 {
            let px = source.get(x, y);
            sums[0] += px.r as u64;
            sums[1] += px.g as u64;
            sums[2] += px.b as u64;
            count += 1;
        }
    }

    Rgb::from_channel_sums(sums, count).unwrap_or(Rgb::WHITE)
}

/// Downscale `source` to `target` by averaging axis-aligned regions.
///
/// Output cell `(x, y)` covers source columns
/// `[floor(x·sx), min(floor((x+1)·sx), width))` and the matching rows, with
/// `sx = width / target.width`. Channels are truncated means. A cell whose
/// region is empty (possible when upscaling) is white.
pub fn resample(source: &PixelBuffer, target: GridDimensions) -> PixelBuffer {
    let scale_x = source.width as f64 / target.width as f64;
    let scale_y = source.height as f64 / target.height as f64;

    let columns: Vec<(u32, u32)> = (0..target.width)
        .map(|x| span(x, scale_x, source.width))
        .collect();

    let mut data = Vec::with_capacity(target.cell_count() as usize);
    for y in 0..target.height {
        let rows = span(y, scale_y, source.height);
        data.extend(columns.iter().map(|&cols| region_mean(source, cols, rows)));
    }

    PixelBuffer {
        width: target.width,
        height: target.height,
        data,
    }
}
