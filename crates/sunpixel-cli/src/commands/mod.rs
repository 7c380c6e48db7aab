//! CLI command implementations

pub mod batch;
pub mod convert;
pub mod inspect;
pub mod palettes;
pub mod suggest;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use sunpixel_spec::{
    BackendError, ConvertError, ConvertWarning, ProgressEvent, ProgressSink, Stage,
};

/// Machine-readable error body for `--json` output.
#[derive(Debug, Serialize)]
pub(crate) struct JsonError {
    pub code: String,
    pub message: String,
}

impl From<&ConvertError> for JsonError {
    fn from(error: &ConvertError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.message(),
        }
    }
}

/// Envelope printed by commands run with `--json`.
#[derive(Debug, Serialize)]
pub(crate) struct JsonOutput<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(result: T) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(error: JsonError) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error),
        }
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Conversion error with its code, for `anyhow` propagation.
pub(crate) fn coded(error: ConvertError) -> anyhow::Error {
    anyhow::anyhow!("{}: {}", error.code(), error)
}

pub(crate) fn print_warnings(warnings: &[ConvertWarning]) {
    for warning in warnings {
        println!("  {} {}", "!".yellow(), warning);
    }
}

/// Prints one line per stage change to stderr.
#[derive(Debug, Default)]
pub(crate) struct ConsoleProgress {
    stage: Option<Stage>,
}

impl ProgressSink for ConsoleProgress {
    fn update(&mut self, event: ProgressEvent) {
        if self.stage == Some(event.stage) || event.stage == Stage::Error {
            return;
        }
        self.stage = Some(event.stage);
        eprintln!(
            "  {} {}",
            format!("[{:>3}%]", event.percent).dimmed(),
            event.message
        );
    }
}
