//! Error and warning types for conversions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::output::StructureFormat;

/// Error codes for failed conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// E001: Input is not PNG or JPEG
    UnsupportedImageFormat,
    /// E002: Image bytes could not be decoded
    ImageDecode,
    /// E003: Palette directory does not exist
    PaletteDirectoryMissing,
    /// E004: Merged palette has no entries
    EmptyPalette,
    /// E005: Structure could not be encoded or decoded
    Serialization,
    /// E006: Filesystem failure
    Io,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::UnsupportedImageFormat => "E001",
            ErrorCode::ImageDecode => "E002",
            ErrorCode::PaletteDirectoryMissing => "E003",
            ErrorCode::EmptyPalette => "E004",
            ErrorCode::Serialization => "E005",
            ErrorCode::Io => "E006",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Warning codes for recoverable conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarningCode {
    /// W001: Palette entry skipped
    #[serde(rename = "W001")]
    MalformedPaletteEntry,
    /// W002: Requested size does not match the source aspect ratio
    #[serde(rename = "W002")]
    AspectRatioMismatch,
    /// W003: Selected palette name not found
    #[serde(rename = "W003")]
    PaletteNotFound,
}

impl WarningCode {
    /// Returns the warning code string (e.g., "W001").
    pub fn code(&self) -> &'static str {
        match self {
            WarningCode::MalformedPaletteEntry => "W001",
            WarningCode::AspectRatioMismatch => "W002",
            WarningCode::PaletteNotFound => "W003",
        }
    }
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A recoverable condition recorded during a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertWarning {
    pub code: WarningCode,
    pub message: String,
}

impl ConvertWarning {
    /// Creates a new warning.
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConvertWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Common trait for pipeline errors.
///
/// Gives every failure a stable code and category so callers can report
/// errors uniformly without matching on concrete types.
pub trait BackendError: std::error::Error {
    /// Stable code such as "E004".
    fn code(&self) -> &'static str;

    /// Human-readable message. Defaults to `Display`.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Coarse grouping: "image", "palette", "structure", or "io".
    fn category(&self) -> &'static str;
}

/// Terminal failure of a conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Input extension or content type is not PNG or JPEG.
    #[error("unsupported image format '{extension}' (expected png, jpg, or jpeg)")]
    UnsupportedImageFormat {
        /// The rejected extension.
        extension: String,
    },

    /// Image bytes are malformed.
    #[error("failed to decode image: {message}")]
    ImageDecode {
        /// Decoder message.
        message: String,
    },

    /// The palette directory does not exist.
    #[error("palette directory not found: {}", path.display())]
    PaletteDirectoryMissing {
        /// The missing directory.
        path: PathBuf,
    },

    /// No palette entries were loaded.
    #[error("no palette entries loaded for selection [{}]", selected.join(", "))]
    EmptyPalette {
        /// Names the caller selected.
        selected: Vec<String>,
    },

    /// Encoding or decoding a structure failed.
    #[error("{format} serialization failed: {message}")]
    Serialization {
        /// Structure format involved.
        format: StructureFormat,
        /// Underlying message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// Creates an image decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::ImageDecode {
            message: message.into(),
        }
    }

    /// Creates a serialization error.
    pub fn serialization(format: StructureFormat, message: impl Into<String>) -> Self {
        Self::Serialization {
            format,
            message: message.into(),
        }
    }

    /// The taxonomy code for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ConvertError::UnsupportedImageFormat { .. } => ErrorCode::UnsupportedImageFormat,
            ConvertError::ImageDecode { .. } => ErrorCode::ImageDecode,
            ConvertError::PaletteDirectoryMissing { .. } => ErrorCode::PaletteDirectoryMissing,
            ConvertError::EmptyPalette { .. } => ErrorCode::EmptyPalette,
            ConvertError::Serialization { .. } => ErrorCode::Serialization,
            ConvertError::Io(_) => ErrorCode::Io,
        }
    }
}

impl BackendError for ConvertError {
    fn code(&self) -> &'static str {
        self.error_code().code()
    }

    fn category(&self) -> &'static str {
        match self {
            ConvertError::UnsupportedImageFormat { .. } | ConvertError::ImageDecode { .. } => {
                "image"
            }
            ConvertError::PaletteDirectoryMissing { .. } | ConvertError::EmptyPalette { .. } => {
                "palette"
            }
            ConvertError::Serialization { .. } => "structure",
            ConvertError::Io(_) => "io",
        }
    }
}

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;
