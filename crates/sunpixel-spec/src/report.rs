//! Conversion report: what was produced, with which warnings, and how long it took.

use serde::{Deserialize, Serialize};

use crate::dimensions::{GridDimensions, Suggestion};
use crate::error::{ConvertWarning, WarningCode};
use crate::output::StructureFormat;

/// Report schema version.
pub const REPORT_VERSION: u32 = 1;

/// Duration of one pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTiming {
    /// Stage name, e.g. "decode" or "serialize".
    pub stage: String,
    pub duration_ms: u64,
}

impl StageTiming {
    pub fn new(stage: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            stage: stage.into(),
            duration_ms,
        }
    }
}

/// Summary of a successful conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Report schema version (always 1).
    pub report_version: u32,
    /// Output grid width.
    pub width: u32,
    /// Output grid height (structure length).
    pub height: u32,
    /// Number of cells (width x height).
    pub cell_count: u64,
    /// Size of the output block palette.
    pub palette_size: usize,
    pub format: StructureFormat,
    /// Dimensions of the decoded source image.
    pub source: GridDimensions,
    /// Aspect-ratio suggestion for the requested size.
    pub suggestion: Suggestion,
    pub warnings: Vec<ConvertWarning>,
    /// Hex-encoded BLAKE3 hash of the encoded structure bytes.
    pub hash: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub timings: Vec<StageTiming>,
}

impl ConversionReport {
    /// Output dimensions.
    pub fn dimensions(&self) -> GridDimensions {
        GridDimensions::new(self.width, self.height)
    }

    /// Whether a warning with `code` was recorded.
    pub fn has_warning(&self, code: WarningCode) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }

    /// Serializes the report to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parses a report from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
