//! Background conversions with pollable progress.
//!
//! A [`TaskStore`] runs each conversion on its own thread and keeps a shared
//! [`ProgressRecord`] per task. Callers poll [`TaskStore::snapshot`] for the
//! latest percent, stage, and log tail, then collect the outcome with
//! [`TaskStore::take_result`]. Tasks share no mutable state with each other.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;
use sunpixel_spec::{
    BackendError, ConversionReport, ConvertError, ProgressEvent, ProgressSink, Stage,
};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::convert::{convert, Conversion, ConvertOptions};
use crate::source::PaletteSource;

/// Number of log lines returned by [`TaskStore::snapshot`].
pub const LOG_TAIL: usize = 20;

/// Failure code recorded when a conversion thread panics.
pub const PANIC_CODE: &str = "E000";

/// Default age after which finished tasks are swept.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60 * 60);

/// Identifier of a background conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Why a background conversion produced no structure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{code}: {message}")]
pub struct TaskFailure {
    /// Stable error code, e.g. "E002", or [`PANIC_CODE`].
    pub code: &'static str,
    pub message: String,
}

impl From<&ConvertError> for TaskFailure {
    fn from(error: &ConvertError) -> Self {
        Self {
            code: error.code(),
            message: error.message(),
        }
    }
}

/// Outcome summary exposed in snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskResult {
    Finished { report: ConversionReport },
    Failed { failure: TaskFailure },
}

/// Point-in-time view of one task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSnapshot {
    pub percent: u8,
    pub message: String,
    pub stage: Stage,
    pub running: bool,
    /// The last [`LOG_TAIL`] log lines.
    pub logs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskResult>,
}

#[derive(Debug)]
struct RecordState {
    percent: u8,
    message: String,
    stage: Stage,
    running: bool,
    logs: Vec<String>,
    outcome: Option<Result<Conversion, TaskFailure>>,
    finished: Option<Instant>,
}

/// Shared, mutable progress of one task.
#[derive(Debug)]
pub struct ProgressRecord {
    state: Mutex<RecordState>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ProgressRecord {
    fn new() -> Self {
        Self {
            state: Mutex::new(RecordState {
                percent: 0,
                message: String::new(),
                stage: Stage::Init,
                running: true,
                logs: Vec::new(),
                outcome: None,
                finished: None,
            }),
            handle: Mutex::new(None),
        }
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        let state = lock(&self.state);
        let tail = state.logs.len().saturating_sub(LOG_TAIL);
        TaskSnapshot {
            percent: state.percent,
            message: state.message.clone(),
            stage: state.stage,
            running: state.running,
            logs: state.logs[tail..].to_vec(),
            result: state.outcome.as_ref().map(|outcome| match outcome {
                Ok(conversion) => TaskResult::Finished {
                    report: conversion.report.clone(),
                },
                Err(failure) => TaskResult::Failed {
                    failure: failure.clone(),
                },
            }),
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.state).running
    }

    /// Time since the task finished, or `None` while it runs.
    pub fn finished_for(&self) -> Option<Duration> {
        lock(&self.state).finished.map(|at| at.elapsed())
    }

    fn finish(&self, outcome: Result<Conversion, TaskFailure>) {
        let mut state = lock(&self.state);
        if let Err(failure) = &outcome {
            if !state.stage.is_terminal() {
                state.stage = Stage::Error;
                state.message = failure.to_string();
            }
        }
        state.outcome = Some(outcome);
        state.running = false;
        state.finished.get_or_insert_with(Instant::now);
    }
}

fn panic_failure(payload: &(dyn Any + Send)) -> TaskFailure {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    TaskFailure {
        code: PANIC_CODE,
        message: format!("conversion thread panicked: {detail}"),
    }
}

impl ProgressSink for &ProgressRecord {
    fn update(&mut self, event: ProgressEvent) {
        let mut state = lock(&self.state);
        // Percent never goes backwards, even for the error event.
        state.percent = state.percent.max(event.percent);
        state.message = event.message;
        state.stage = event.stage;
    }

    fn log(&mut self, line: &str) {
        lock(&self.state).logs.push(line.to_string());
    }
}

/// Registry of background conversions.
///
/// Cloning shares the same registry.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Arc<DashMap<TaskId, Arc<ProgressRecord>>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start converting `image` on a new thread.
    pub fn spawn<S>(
        &self,
        image: Vec<u8>,
        extension: String,
        options: ConvertOptions,
        source: Arc<S>,
    ) -> std::io::Result<TaskId>
    where
        S: PaletteSource + Send + Sync + ?Sized + 'static,
    {
        let id = TaskId::new();
        let record = Arc::new(ProgressRecord::new());
        self.tasks.insert(id, Arc::clone(&record));

        let worker = Arc::clone(&record);
        let spawned = thread::Builder::new()
            .name(format!("sunpixel-task-{id}"))
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    convert(&image, &extension, &options, &*source, &*worker)
                }))
                .map_err(|payload| panic_failure(&*payload))
                .and_then(|result| result.map_err(|e| TaskFailure::from(&e)));
                debug!(task = %id, ok = outcome.is_ok(), "task finished");
                worker.finish(outcome);
            });

        match spawned {
            Ok(handle) => {
                *lock(&record.handle) = Some(handle);
                debug!(task = %id, "task spawned");
                Ok(id)
            }
            Err(e) => {
                self.tasks.remove(&id);
                Err(e)
            }
        }
    }

    /// Latest progress of `id`.
    pub fn snapshot(&self, id: TaskId) -> Option<TaskSnapshot> {
        self.tasks.get(&id).map(|record| record.snapshot())
    }

    /// Block until `id` finishes, then return its final snapshot.
    pub fn wait(&self, id: TaskId) -> Option<TaskSnapshot> {
        let record = self.tasks.get(&id).map(|r| Arc::clone(r.value()))?;
        let handle = lock(&record.handle).take();
        if let Some(handle) = handle {
            // Panics are caught in the worker; this covers one escaping `finish`.
            if handle.join().is_err() && record.is_running() {
                record.finish(Err(TaskFailure {
                    code: PANIC_CODE,
                    message: "conversion thread panicked".to_string(),
                }));
            }
        }
        Some(record.snapshot())
    }

    /// Remove a finished task and return its outcome.
    ///
    /// Returns `None` if the task is unknown or still running.
    pub fn take_result(&self, id: TaskId) -> Option<Result<Conversion, TaskFailure>> {
        let (_, record) = self
            .tasks
            .remove_if(&id, |_, record| !record.is_running())?;
        let outcome = lock(&record.state).outcome.take();
        outcome
    }

    /// Evict tasks that finished at least `max_age` ago. Returns the count.
    ///
    /// Running tasks are never evicted.
    pub fn sweep_expired(&self, max_age: Duration) -> usize {
        let before = self.tasks.len();
        self.tasks
            .retain(|_, record| record.finished_for().map_or(true, |age| age < max_age));
        let removed = before.saturating_sub(self.tasks.len());
        if removed > 0 {
            debug!(removed, "swept expired tasks");
        }
        removed
    }

    /// Number of tracked tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
