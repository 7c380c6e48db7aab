//! Batch conversion command
//!
//! Converts every image under a directory, one background task per image.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use sunpixel_backend_structure::{write_structure, ConvertOptions, TaskId, TaskStore};
use sunpixel_spec::{BackendError, ConversionReport, ImageFormat, Stage};
use walkdir::WalkDir;

use super::{print_json, JsonOutput};
use crate::config::{PaletteLocation, SharedSource};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// One image to convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Serialize)]
struct BatchItem {
    input: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<PathBuf>,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<ConversionReport>,
}

impl BatchItem {
    fn failed(job: &BatchJob, error: String) -> Self {
        Self {
            input: job.input.clone(),
            output: None,
            success: false,
            error: Some(error),
            report: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchSummary {
    total: usize,
    passed: usize,
    failed: usize,
    items: Vec<BatchItem>,
}

/// PNG and JPEG files under `dir`, in sorted order.
pub fn find_images(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .and_then(ImageFormat::from_extension)
                .is_some()
        })
        .collect()
}

/// Pair each image with its output path, mirroring the input tree.
pub fn plan_jobs(input_dir: &Path, output_dir: &Path, options: &ConvertOptions) -> Vec<BatchJob> {
    find_images(input_dir)
        .into_iter()
        .map(|input| {
            let relative = input.strip_prefix(input_dir).unwrap_or(&input);
            let output = output_dir
                .join(relative)
                .with_extension(options.format.extension());
            BatchJob { input, output }
        })
        .collect()
}

fn spawn_job(
    store: &TaskStore,
    job: &BatchJob,
    options: &ConvertOptions,
    palettes: &SharedSource,
) -> Result<TaskId> {
    let image = fs::read(&job.input)
        .with_context(|| format!("Failed to read {}", job.input.display()))?;
    let extension = job
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string();

    let mut options = options.clone();
    options.name = job
        .output
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string);

    let id = store
        .spawn(image, extension, options, Arc::clone(palettes))
        .context("Failed to start conversion thread")?;
    Ok(id)
}

fn finish_job(store: &TaskStore, id: TaskId, job: &BatchJob) -> BatchItem {
    store.wait(id);
    match store.take_result(id) {
        Some(Ok(conversion)) => match write_structure(&job.output, &conversion.bytes) {
            Ok(()) => BatchItem {
                input: job.input.clone(),
                output: Some(job.output.clone()),
                success: true,
                error: None,
                report: Some(conversion.report),
            },
            Err(e) => BatchItem::failed(job, format!("{}: {}", e.code(), e)),
        },
        Some(Err(failure)) => BatchItem::failed(job, failure.to_string()),
        None => BatchItem::failed(job, "task result missing".to_string()),
    }
}

/// Run batch conversion
///
/// # Returns
/// Exit code: 0 if every image converted, 1 otherwise
pub fn run(
    input_dir: &Path,
    output_dir: Option<&Path>,
    options: &ConvertOptions,
    palettes: &PaletteLocation,
    jobs: usize,
    json_output: bool,
) -> Result<ExitCode> {
    if !input_dir.is_dir() {
        anyhow::bail!("input directory not found: {}", input_dir.display());
    }
    let output_dir = output_dir.unwrap_or(input_dir);
    let planned = plan_jobs(input_dir, output_dir, options);

    if planned.is_empty() {
        if json_output {
            print_json(&JsonOutput::ok(BatchSummary {
                total: 0,
                passed: 0,
                failed: 0,
                items: Vec::new(),
            }))?;
        } else {
            println!("No images found in: {}", input_dir.display());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let total = planned.len();
    if !json_output {
        println!("Batch converting {} images...", total);
        println!("Output directory: {}", output_dir.display());
    }

    let batch_start = Instant::now();
    let store = TaskStore::new();
    let source = palettes.source();
    let mut queue: VecDeque<BatchJob> = planned.into();
    let mut running: Vec<(TaskId, BatchJob, Option<Stage>)> = Vec::new();
    let mut items = Vec::with_capacity(total);

    while !queue.is_empty() || !running.is_empty() {
        while running.len() < jobs.max(1) {
            let Some(job) = queue.pop_front() else {
                break;
            };
            match spawn_job(&store, &job, options, &source) {
                Ok(id) => running.push((id, job, None)),
                Err(e) => items.push(BatchItem::failed(&job, format!("{e:#}"))),
            }
        }

        thread::sleep(POLL_INTERVAL);

        let mut still_running = Vec::with_capacity(running.len());
        for (id, job, last_stage) in running.drain(..) {
            let Some(snapshot) = store.snapshot(id) else {
                items.push(BatchItem::failed(&job, "task disappeared".to_string()));
                continue;
            };
            if !json_output && last_stage != Some(snapshot.stage) && !snapshot.stage.is_terminal()
            {
                eprintln!(
                    "  {} {}: {}",
                    format!("[{:>3}%]", snapshot.percent).dimmed(),
                    job.input.display(),
                    snapshot.message
                );
            }
            if snapshot.running {
                still_running.push((id, job, Some(snapshot.stage)));
                continue;
            }

            let item = finish_job(&store, id, &job);
            if !json_output {
                let progress = format!("[{}/{}]", items.len() + 1, total).cyan().bold();
                match (&item.output, &item.error) {
                    (Some(output), _) => println!(
                        "{} {} {} -> {}",
                        progress,
                        "✓".green().bold(),
                        job.input.display(),
                        output.display()
                    ),
                    (None, error) => println!(
                        "{} {} {}: {}",
                        progress,
                        "✗".red().bold(),
                        job.input.display(),
                        error.as_deref().unwrap_or("unknown error")
                    ),
                }
            }
            items.push(item);
        }
        running = still_running;
    }

    let passed = items.iter().filter(|i| i.success).count();
    let failed = items.len() - passed;

    if json_output {
        print_json(&JsonOutput::ok(BatchSummary {
            total,
            passed,
            failed,
            items,
        }))?;
    } else {
        println!(
            "\n{} {} passed, {} failed in {:.1}s",
            "Summary:".cyan().bold(),
            passed.to_string().green(),
            if failed > 0 {
                failed.to_string().red()
            } else {
                failed.to_string().normal()
            },
            batch_start.elapsed().as_secs_f64()
        );
    }

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
