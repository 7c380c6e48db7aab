//! RGB colors and the perceptual distance used for block matching.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Accepts `"(r, g, b)"` and `"r, g, b"`; parenthesis balance is checked after matching.
const RGB_KEY_PATTERN: &str = r"^\s*(\()?\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(\))?\s*$";

static RGB_KEY_REGEX: OnceLock<Regex> = OnceLock::new();

fn rgb_key_regex() -> &'static Regex {
    RGB_KEY_REGEX.get_or_init(|| Regex::new(RGB_KEY_PATTERN).expect("invalid regex pattern"))
}

/// An exact 8-bit RGB triple.
///
/// Ordering is lexicographic on `(r, g, b)`; palette tables rely on it for a
/// deterministic scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Pure white, used for empty resample regions.
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    /// Pure black.
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    /// Create a color from channel values.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create from the first three bytes of a pixel. Extra channels (alpha) are ignored.
    ///
    /// # Panics
    /// Panics if `pixel` has fewer than three bytes.
    #[inline]
    pub fn from_pixel(pixel: &[u8]) -> Self {
        Self::new(pixel[0], pixel[1], pixel[2])
    }

    /// Component-wise mean of `count` accumulated pixels, truncated toward zero.
    ///
    /// Returns `None` when `count` is zero.
    pub fn from_channel_sums(sums: [u64; 3], count: u64) -> Option<Self> {
        if count == 0 {
            return None;
        }
        let channel = |sum: u64| (sum / count).min(255) as u8;
        Some(Self::new(channel(sums[0]), channel(sums[1]), channel(sums[2])))
    }

    /// Perceptual distance to another color. See [`perceptual_distance`].
    #[inline]
    pub fn distance(&self, other: &Rgb) -> f64 {
        perceptual_distance(*self, *other)
    }

    /// Channels as an array.
    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(rgb: [u8; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2])
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Error parsing a string-encoded palette key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseRgbError {
    #[error("expected \"(r, g, b)\" or \"r, g, b\", got {0:?}")]
    Syntax(String),

    #[error("channel value {0} is out of range 0-255")]
    OutOfRange(u32),
}

impl FromStr for Rgb {
    type Err = ParseRgbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = rgb_key_regex()
            .captures(s)
            .ok_or_else(|| ParseRgbError::Syntax(s.to_string()))?;

        if caps.get(1).is_some() != caps.get(5).is_some() {
            return Err(ParseRgbError::Syntax(s.to_string()));
        }

        let mut channels = [0u8; 3];
        for (slot, group) in channels.iter_mut().zip(2..=4) {
            // The pattern caps each group at three digits, so this parse cannot overflow u32.
            let value: u32 = caps[group]
                .parse()
                .map_err(|_| ParseRgbError::Syntax(s.to_string()))?;
            *slot = u8::try_from(value).map_err(|_| ParseRgbError::OutOfRange(value))?;
        }

        Ok(Rgb::from(channels))
    }
}

/// Weighted "redmean" distance between two colors.
///
/// With `rmean = (r1 + r2) / 2`:
///
/// ```text
/// sqrt((2 + rmean/256)·Δr² + 4·Δg² + (2 + (255 - rmean)/256)·Δb²)
/// ```
///
/// Symmetric in its arguments and zero only for identical colors.
pub fn perceptual_distance(a: Rgb, b: Rgb) -> f64 {
    let r_mean = (a.r as f64 + b.r as f64) / 2.0;
    let dr = a.r as f64 - b.r as f64;
    let dg = a.g as f64 - b.g as f64;
    let db = a.b as f64 - b.b as f64;

    ((2.0 + r_mean / 256.0) * dr * dr
        + 4.0 * dg * dg
        + (2.0 + (255.0 - r_mean) / 256.0) * db * db)
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_parenthesized_and_bare_keys_agree() {
        let a: Rgb = "(160, 39, 34)".parse().unwrap();
        let b: Rgb = "160, 39, 34".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a, Rgb::new(160, 39, 34));
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        let c: Rgb = "  ( 1,2 ,  3 )  ".parse().unwrap();
        assert_eq!(c, Rgb::new(1, 2, 3));
    }

    #[test]
    fn test_parse_rejects_malformed_keys() {
        for key in ["", "red", "(1, 2)", "(1, 2, 3", "1, 2, 3)", "1, 2, 3, 4", "(-1, 0, 0)"] {
            assert!(key.parse::<Rgb>().is_err(), "{key:?} should not parse");
        }
    }

    #[test]
    fn test_parse_rejects_out_of_range_channel() {
        assert_eq!(
            "(256, 0, 0)".parse::<Rgb>(),
            Err(ParseRgbError::OutOfRange(256))
        );
    }

    #[test]
    fn test_display_round_trips() {
        let c = Rgb::new(233, 236, 239);
        assert_eq!(c.to_string(), "(233, 236, 239)");
        assert_eq!(c.to_string().parse::<Rgb>().unwrap(), c);
    }

    #[test]
    fn test_distance_identity_and_symmetry() {
        let a = Rgb::new(10, 200, 30);
        let b = Rgb::new(250, 3, 99);
        assert_eq!(perceptual_distance(a, a), 0.0);
        assert_eq!(perceptual_distance(a, b), perceptual_distance(b, a));
    }

    #[test]
    fn test_distance_weights_green_over_red() {
        let base = Rgb::new(128, 128, 128);
        let red_shift = Rgb::new(138, 128, 128);
        let green_shift = Rgb::new(128, 138, 128);
        assert!(base.distance(&green_shift) > base.distance(&red_shift));
    }

    #[test]
    fn test_distance_known_value() {
        // Pure red vs black: rmean = 127.5, only the red term contributes.
        let d = perceptual_distance(Rgb::new(255, 0, 0), Rgb::BLACK);
        let expected = ((2.0 + 127.5 / 256.0) * 255.0 * 255.0_f64).sqrt();
        assert!((d - expected).abs() < 1e-9);
    }

    #[test]
    fn test_channel_sums_truncate() {
        let c = Rgb::from_channel_sums([255 + 254, 1, 3], 2).unwrap();
        assert_eq!(c, Rgb::new(254, 0, 1));
        assert_eq!(Rgb::from_channel_sums([0, 0, 0], 0), None);
    }
}
