//! Progress events emitted while a conversion runs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Pipeline stage named in a progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Init,
    Palette,
    Decode,
    Resample,
    Match,
    Serialize,
    Done,
    Error,
}

impl Stage {
    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::Palette => "palette",
            Stage::Decode => "decode",
            Stage::Resample => "resample",
            Stage::Match => "match",
            Stage::Serialize => "serialize",
            Stage::Done => "done",
            Stage::Error => "error",
        }
    }

    /// Whether no further events follow this stage.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done | Stage::Error)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One progress update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Completion percentage, 0-100.
    pub percent: u8,
    pub message: String,
    pub stage: Stage,
}

impl ProgressEvent {
    /// Creates an event, capping `percent` at 100.
    pub fn new(percent: u8, stage: Stage, message: impl Into<String>) -> Self {
        Self {
            percent: percent.min(100),
            message: message.into(),
            stage,
        }
    }
}

/// Receiver for progress events and user-facing log lines.
///
/// A conversion emits events with non-decreasing `percent` and ends with
/// either a [`Stage::Done`] event at 100 or a single [`Stage::Error`] event.
pub trait ProgressSink {
    /// Record a progress event.
    fn update(&mut self, event: ProgressEvent);

    /// Append a log line. Ignored by default.
    fn log(&mut self, _line: &str) {}
}

impl<T: ProgressSink + ?Sized> ProgressSink for &mut T {
    fn update(&mut self, event: ProgressEvent) {
        (**self).update(event)
    }

    fn log(&mut self, line: &str) {
        (**self).log(line)
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn update(&mut self, _event: ProgressEvent) {}
}

/// Sink that keeps every event and log line in memory.
#[derive(Debug, Clone, Default)]
pub struct ProgressLog {
    pub events: Vec<ProgressEvent>,
    pub lines: Vec<String>,
}

impl ProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent event, if any.
    pub fn last(&self) -> Option<&ProgressEvent> {
        self.events.last()
    }

    /// Whether percentages never decreased.
    pub fn is_monotonic(&self) -> bool {
        self.events.windows(2).all(|w| w[0].percent <= w[1].percent)
    }
}

impl ProgressSink for ProgressLog {
    fn update(&mut self, event: ProgressEvent) {
        self.events.push(event);
    }

    fn log(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}
