//! Gzip framing for the NBT formats.

use std::io::{self, Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

/// Gzip `data` at the default level. The header carries no timestamp, so
/// output is byte-stable.
pub fn compress(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Inflate gzip `data`.
pub fn decompress(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    GzDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_and_stable() {
        let data = b"SunPixel structure payload".repeat(20);
        let a = compress(&data).unwrap();
        let b = compress(&data).unwrap();
        assert_eq!(a, b);
        assert_eq!(&a[..2], &[0x1f, 0x8b]);
        assert_eq!(decompress(&a).unwrap(), data);
    }

    #[test]
    fn test_decompress_rejects_plain_bytes() {
        assert!(decompress(b"not gzip").is_err());
    }
}
