//! Batch resampling and packaging.
//!
//! Takes the plan produced by [`sizing`](crate::sizing) and turns every task
//! into output bytes:
//!
//! - **Resize tasks** go through [`imaging::resample`](crate::imaging::resample).
//! - **Pass-through tasks** (target equals physical size) ship the source bytes.
//! - **Failed resizes** also ship the source bytes, under the same output
//!   name. A failure is logged and recorded; it never aborts the batch.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── manifest.json              # BatchReport: one record per task
//! └── optimized/                 # root_folder from config
//!     ├── ui/button.png
//!     └── bg/sky.png
//! ```
//!
//! ## Parallel Processing
//!
//! Tasks run on the global [rayon](https://docs.rs/rayon) pool, whose size
//! the CLI sets from `processing.max_processes`. Each task owns its buffers.
//! Progress events are sent as tasks complete. Outputs are written in plan
//! order as soon as every earlier task has finished, so only results that
//! overtake a slower earlier task wait in memory. A cancellation flag stops
//! tasks that have not finished yet; finished tasks are still written.

use crate::config::DitherConfig;
use crate::imaging::{DitherSource, NoDither, PixelCodec, TriangularDither, resample};
use crate::types::OptimizationTask;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Name of the report written next to the root folder.
pub const MANIFEST_FILENAME: &str = "manifest.json";

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Two tasks share the output name {0}")]
    DuplicateOutputName(String),
}

/// Destination for packaged outputs.
pub trait OutputSink: Sync {
    /// Store `bytes` under `output_name` (a relative path with `/` separators).
    fn write(&self, output_name: &str, bytes: &[u8]) -> std::io::Result<()>;
}

/// Writes outputs to `<output_dir>/<root_folder>/<output_name>`.
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(output_dir: &Path, root_folder: &str) -> Self {
        Self {
            root: output_dir.join(root_folder),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Path components of an output name, as [`DirectorySink`] lays them out.
///
/// Both separators split, and empty, `.` and `..` parts are dropped.
fn name_parts(output_name: &str) -> impl Iterator<Item = &str> {
    output_name
        .split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != "." && *part != "..")
}

impl OutputSink for DirectorySink {
    fn write(&self, output_name: &str, bytes: &[u8]) -> std::io::Result<()> {
        let path = name_parts(output_name).fold(self.root.clone(), |acc, part| acc.join(part));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)
    }
}

/// What happened to one task.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// Resampled and re-encoded; `bytes` is the encoded size.
    Resized { bytes: usize },
    /// Already at target size; source bytes shipped.
    Original,
    /// Resampling failed; source bytes shipped.
    Fallback { reason: String },
    /// Not finished before cancellation; nothing written.
    Cancelled,
}

/// Per-task line of the build manifest.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRecord {
    pub output_name: String,
    pub original_path: String,
    pub physical_width: u32,
    pub physical_height: u32,
    pub target_width: u32,
    pub target_height: u32,
    pub source_bytes: usize,
    #[serde(flatten)]
    pub outcome: TaskOutcome,
}

/// Result of a batch run, in plan order.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub tasks: Vec<TaskRecord>,
}

impl BatchReport {
    pub fn count(&self, pred: impl Fn(&TaskOutcome) -> bool) -> usize {
        self.tasks.iter().filter(|t| pred(&t.outcome)).count()
    }

    pub fn resized(&self) -> usize {
        self.count(|o| matches!(o, TaskOutcome::Resized { .. }))
    }

    pub fn originals(&self) -> usize {
        self.count(|o| matches!(o, TaskOutcome::Original))
    }

    pub fn fallbacks(&self) -> usize {
        self.count(|o| matches!(o, TaskOutcome::Fallback { .. }))
    }

    pub fn cancelled(&self) -> usize {
        self.count(|o| matches!(o, TaskOutcome::Cancelled))
    }

    /// Total source bytes vs. written bytes, for written tasks only.
    pub fn byte_totals(&self) -> (usize, usize) {
        self.tasks.iter().fold((0, 0), |(before, after), t| match &t.outcome {
            TaskOutcome::Resized { bytes } => (before + t.source_bytes, after + bytes),
            TaskOutcome::Original | TaskOutcome::Fallback { .. } => {
                (before + t.source_bytes, after + t.source_bytes)
            }
            TaskOutcome::Cancelled => (before, after),
        })
    }

    /// Save as `manifest.json` in `output_dir`.
    pub fn save(&self, output_dir: &Path) -> Result<(), BatchError> {
        fs::create_dir_all(output_dir)?;
        let json = serde_json::to_string_pretty(self)?;
        fs::write(output_dir.join(MANIFEST_FILENAME), json)?;
        Ok(())
    }
}

/// Progress events emitted while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Started {
        total: usize,
    },
    TaskFinished {
        completed: usize,
        total: usize,
        output_name: String,
        outcome: TaskOutcome,
    },
}

/// Knobs for a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub dither: DitherConfig,
    /// Set to stop the batch. Checked before and after each task's work.
    pub cancel: Arc<AtomicBool>,
}

/// Per-task dither, chosen from config.
pub enum TaskDither {
    Triangular(TriangularDither<StdRng>),
    Off(NoDither),
}

impl DitherSource for TaskDither {
    fn next_offset(&mut self) -> f32 {
        match self {
            Self::Triangular(d) => d.next_offset(),
            Self::Off(d) => d.next_offset(),
        }
    }
}

/// Dither stream for the task at `index`.
///
/// Seeded configs derive one stream per task index, so results don't depend
/// on which worker picks the task up.
pub fn dither_for(config: &DitherConfig, index: usize) -> TaskDither {
    if !config.enabled {
        return TaskDither::Off(NoDither);
    }
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
        None => StdRng::from_os_rng(),
    };
    TaskDither::Triangular(TriangularDither::new(rng))
}

/// Reject plans where two tasks would write the same output.
///
/// Names are compared after the same path cleanup the sink applies, so
/// `a\b.png`, `a//b.png` and `a/b.png` all collide.
pub fn check_unique_names(tasks: &[OptimizationTask]) -> Result<(), BatchError> {
    let mut seen = HashSet::new();
    for task in tasks {
        let normalized = name_parts(&task.output_name).collect::<Vec<_>>().join("/");
        if !seen.insert(normalized) {
            return Err(BatchError::DuplicateOutputName(task.output_name.clone()));
        }
    }
    Ok(())
}

/// Produce the bytes for one task. `None` means cancelled.
fn produce<'a>(
    index: usize,
    task: &'a OptimizationTask,
    codec: &impl PixelCodec,
    options: &BatchOptions,
) -> Option<(Cow<'a, [u8]>, TaskOutcome)> {
    if options.cancel.load(Ordering::Relaxed) {
        return None;
    }
    if !task.is_resize {
        return Some((Cow::Borrowed(&task.source[..]), TaskOutcome::Original));
    }

    let mut dither = dither_for(&options.dither, index);
    let result = resample(
        codec,
        &task.source,
        task.target_width,
        task.target_height,
        &mut dither,
    );
    if options.cancel.load(Ordering::Relaxed) {
        return None;
    }

    Some(match result {
        Ok(bytes) => {
            let outcome = TaskOutcome::Resized { bytes: bytes.len() };
            (Cow::Owned(bytes), outcome)
        }
        Err(e) => {
            tracing::warn!(
                asset = %task.original_path,
                error = %e,
                "resize failed, shipping original"
            );
            (
                Cow::Borrowed(&task.source[..]),
                TaskOutcome::Fallback {
                    reason: e.to_string(),
                },
            )
        }
    })
}

/// Hands finished outputs to the sink in plan order.
///
/// A result is written once every earlier task has finished. The first sink
/// error is kept and stops further writes.
struct OrderedWriter<'a, S> {
    tasks: &'a [OptimizationTask],
    sink: &'a S,
    state: Mutex<WriteState<'a>>,
}

struct WriteState<'a> {
    next: usize,
    /// Finished out of order; `None` for tasks with nothing to write.
    pending: BTreeMap<usize, Option<Cow<'a, [u8]>>>,
    error: Option<std::io::Error>,
}

impl<'a, S: OutputSink> OrderedWriter<'a, S> {
    fn new(tasks: &'a [OptimizationTask], sink: &'a S) -> Self {
        Self {
            tasks,
            sink,
            state: Mutex::new(WriteState {
                next: 0,
                pending: BTreeMap::new(),
                error: None,
            }),
        }
    }

    fn complete(&self, index: usize, bytes: Option<Cow<'a, [u8]>>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.pending.insert(index, bytes);
        loop {
            let next = state.next;
            let Some(ready) = state.pending.remove(&next) else {
                break;
            };
            state.next += 1;
            let Some(bytes) = ready else {
                continue;
            };
            if state.error.is_some() {
                continue;
            }
            if let Err(e) = self.sink.write(&self.tasks[next].output_name, &bytes) {
                state.error = Some(e);
            }
        }
    }

    fn finish(self) -> Result<(), BatchError> {
        let state = self
            .state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        match state.error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

/// Run every task and write the results to `sink` in plan order.
pub fn run_batch(
    tasks: &[OptimizationTask],
    codec: &impl PixelCodec,
    sink: &impl OutputSink,
    options: &BatchOptions,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchReport, BatchError> {
    check_unique_names(tasks)?;

    let total = tasks.len();
    let completed = AtomicUsize::new(0);
    let send = |event: BatchEvent| {
        if let Some(tx) = &events {
            // A dropped receiver only means nobody is listening.
            let _ = tx.send(event);
        }
    };
    send(BatchEvent::Started { total });

    let writer = OrderedWriter::new(tasks, sink);
    let outcomes: Vec<TaskOutcome> = tasks
        .par_iter()
        .enumerate()
        .map(|(index, task)| match produce(index, task, codec, options) {
            Some((bytes, outcome)) => {
                writer.complete(index, Some(bytes));
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                send(BatchEvent::TaskFinished {
                    completed: done,
                    total,
                    output_name: task.output_name.clone(),
                    outcome: outcome.clone(),
                });
                outcome
            }
            None => {
                writer.complete(index, None);
                TaskOutcome::Cancelled
            }
        })
        .collect();
    writer.finish()?;

    let records = tasks
        .iter()
        .zip(outcomes)
        .map(|(task, outcome)| TaskRecord {
            output_name: task.output_name.clone(),
            original_path: task.original_path.clone(),
            physical_width: task.physical_width,
            physical_height: task.physical_height,
            target_width: task.target_width,
            target_height: task.target_height,
            source_bytes: task.source.len(),
            outcome,
        })
        .collect();

    Ok(BatchReport { tasks: records })
}
