//! Determinism checks for conversion output.
//!
//! A conversion must produce byte-identical structure files when run again
//! with the same image, palettes, and options.
//!
//! ```rust,ignore
//! use sunpixel_tests::determinism::verify_determinism;
//!
//! let result = verify_determinism(|| convert_bytes(&image), 3);
//! result.assert_deterministic();
//! ```

use std::fmt;

/// Result of a determinism verification.
#[derive(Debug, Clone)]
pub struct DeterminismResult {
    /// Whether all runs produced identical output.
    pub is_deterministic: bool,
    /// Number of runs performed.
    pub runs: usize,
    /// Size of the first output in bytes.
    pub output_size: usize,
    /// BLAKE3 hash of the first output.
    pub hash: String,
    /// The first difference, if any.
    pub diff_info: Option<DiffInfo>,
}

/// First byte difference between two runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffInfo {
    /// Byte offset of the difference, or the shorter length on a size mismatch.
    pub offset: usize,
    /// Byte from the first run (`None` past its end).
    pub expected: Option<u8>,
    /// Byte from the differing run (`None` past its end).
    pub actual: Option<u8>,
    /// Which run (0-indexed) differed.
    pub run_index: usize,
}

impl fmt::Display for DiffInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |b: Option<u8>| b.map_or("EOF".to_string(), |b| format!("0x{b:02X}"));
        write!(
            f,
            "Difference at byte {}: expected {}, got {} (run {})",
            self.offset,
            show(self.expected),
            show(self.actual),
            self.run_index
        )
    }
}

impl DeterminismResult {
    /// Panic with a detailed message if not deterministic.
    pub fn assert_deterministic(&self) {
        if let Some(diff) = &self.diff_info {
            panic!(
                "Non-deterministic output detected!\n\
                 Runs: {}\n\
                 Output size: {} bytes\n\
                 Hash: {}\n\
                 {}",
                self.runs, self.output_size, self.hash, diff
            );
        }
    }
}

/// Hex BLAKE3 hash of `bytes`.
pub fn compute_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

fn first_difference(reference: &[u8], output: &[u8], run_index: usize) -> Option<DiffInfo> {
    let offset = reference
        .iter()
        .zip(output)
        .position(|(a, b)| a != b)
        .or_else(|| (reference.len() != output.len()).then(|| reference.len().min(output.len())))?;
    Some(DiffInfo {
        offset,
        expected: reference.get(offset).copied(),
        actual: output.get(offset).copied(),
        run_index,
    })
}

/// Run `generate_fn` `runs` times and compare every output to the first.
pub fn verify_determinism<F, O>(generate_fn: F, runs: usize) -> DeterminismResult
where
    F: Fn() -> O,
    O: AsRef<[u8]>,
{
    assert!(runs >= 2, "Must run at least 2 times to verify determinism");

    let reference = generate_fn();
    let reference = reference.as_ref();
    let hash = compute_hash(reference);

    let diff_info = (1..runs).find_map(|run_index| {
        let output = generate_fn();
        first_difference(reference, output.as_ref(), run_index)
    });

    DeterminismResult {
        is_deterministic: diff_info.is_none(),
        runs,
        output_size: reference.len(),
        hash,
        diff_info,
    }
}
