//! CLI output formatting for the plan and build commands.
//!
//! # Asset-First Display
//!
//! Every line leads with the asset's positional index and relative path.
//! Sizes and outcomes are secondary context, either on the same line after
//! `→` or on indented lines below.
//!
//! # Output Format
//!
//! ## Plan
//!
//! ```text
//! Resize
//! 001 bg/sky.jpg 2048x1024 → 1024x512, 25% of pixels (override 50%)
//!     Output: bg/sky.png
//! 002 ui/button.png 512x128 → 96x32, 4.7% of pixels
//!     Output: ui/button.png
//!
//! Keep
//! 003 ui/icon.png 32x32
//!     Output: ui/icon.png
//!
//! 3 assets: 2 resized, 1 kept
//! ```
//!
//! ## Build
//!
//! ```text
//! Building 3 assets
//! [1/3] ui/button.png resized (1.2 KB)
//! [2/3] ui/icon.png original
//! [3/3] bg/sky.png fallback: import failed: ...
//!
//! 1 resized, 1 original, 1 fallback, 0 cancelled
//! 812.4 KB → 96.1 KB
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::batch::{BatchEvent, BatchReport, TaskOutcome};
use crate::types::OptimizationTask;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn dims(width: u32, height: u32) -> String {
    format!("{width}x{height}")
}

/// Human-readable byte count.
fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Percentage with one decimal below 10%, whole numbers above.
fn format_share(ratio: f64) -> String {
    let pct = ratio * 100.0;
    if pct < 10.0 {
        format!("{pct:.1}%")
    } else {
        format!("{pct:.0}%")
    }
}

fn outcome_label(outcome: &TaskOutcome) -> String {
    match outcome {
        TaskOutcome::Resized { bytes } => format!("resized ({})", format_bytes(*bytes)),
        TaskOutcome::Original => "original".to_string(),
        TaskOutcome::Fallback { reason } => format!("fallback: {reason}"),
        TaskOutcome::Cancelled => "cancelled".to_string(),
    }
}

// ============================================================================
// Plan output
// ============================================================================

/// Format the task list produced by the sizing policy.
///
/// Resize tasks come first, matching plan order.
pub fn format_plan(tasks: &[OptimizationTask]) -> Vec<String> {
    let mut lines = Vec::new();
    let resize_count = tasks.iter().filter(|t| t.is_resize).count();

    for (section, resize) in [("Resize", true), ("Keep", false)] {
        let group: Vec<(usize, &OptimizationTask)> = tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_resize == resize)
            .collect();
        if group.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(section.to_string());

        for (i, task) in group {
            let physical = dims(task.physical_width, task.physical_height);
            let mut header = format!("{} {} {}", format_index(i + 1), task.original_path, physical);
            if task.is_resize {
                header.push_str(&format!(
                    " \u{2192} {}, {} of pixels",
                    dims(task.target_width, task.target_height),
                    format_share(task.pixel_ratio())
                ));
            }
            if let Some(pct) = task.override_percentage {
                header.push_str(&format!(" (override {pct}%)"));
            }
            lines.push(header);
            lines.push(format!("{}Output: {}", indent(1), task.output_name));
        }
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "{} assets: {} resized, {} kept",
        tasks.len(),
        resize_count,
        tasks.len() - resize_count
    ));
    lines
}

pub fn print_plan(tasks: &[OptimizationTask]) {
    for line in format_plan(tasks) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { total } => vec![format!("Building {total} assets")],
        BatchEvent::TaskFinished {
            completed,
            total,
            output_name,
            outcome,
        } => vec![format!(
            "[{completed}/{total}] {output_name} {}",
            outcome_label(outcome)
        )],
    }
}

/// Format the end-of-build summary.
pub fn format_batch_summary(report: &BatchReport) -> Vec<String> {
    let (before, after) = report.byte_totals();
    vec![
        format!(
            "{} resized, {} original, {} fallback, {} cancelled",
            report.resized(),
            report.originals(),
            report.fallbacks(),
            report.cancelled()
        ),
        format!("{} \u{2192} {}", format_bytes(before), format_bytes(after)),
    ]
}

pub fn print_batch_summary(report: &BatchReport) {
    for line in format_batch_summary(report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::TaskRecord;
    use std::sync::Arc;

    fn task(path: &str, physical: (u32, u32), target: (u32, u32)) -> OptimizationTask {
        OptimizationTask {
            output_name: crate::naming::output_name(path),
            original_path: path.to_string(),
            physical_width: physical.0,
            physical_height: physical.1,
            target_width: target.0,
            target_height: target.1,
            source: Arc::from(Vec::new()),
            max_scale: 1.0,
            is_resize: physical != target,
            override_percentage: None,
        }
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn format_share_precision() {
        assert_eq!(format_share(0.25), "25%");
        assert_eq!(format_share(0.046875), "4.7%");
        assert_eq!(format_share(1.0), "100%");
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(1234), "1234");
    }

    // =========================================================================
    // Plan
    // =========================================================================

    #[test]
    fn plan_groups_resize_and_keep() {
        let mut sky = task("bg/sky.jpg", (2048, 1024), (1024, 512));
        sky.override_percentage = Some(50.0);
        let tasks = vec![
            sky,
            task("ui/button.png", (512, 128), (96, 32)),
            task("ui/icon.png", (32, 32), (32, 32)),
        ];

        let lines = format_plan(&tasks);
        assert_eq!(
            lines,
            vec![
                "Resize",
                "001 bg/sky.jpg 2048x1024 \u{2192} 1024x512, 25% of pixels (override 50%)",
                "    Output: bg/sky.png",
                "002 ui/button.png 512x128 \u{2192} 96x32, 4.7% of pixels",
                "    Output: ui/button.png",
                "",
                "Keep",
                "003 ui/icon.png 32x32",
                "    Output: ui/icon.png",
                "",
                "3 assets: 2 resized, 1 kept",
            ]
        );
    }

    #[test]
    fn plan_empty() {
        assert_eq!(format_plan(&[]), vec!["0 assets: 0 resized, 0 kept"]);
    }

    // =========================================================================
    // Build
    // =========================================================================

    #[test]
    fn batch_event_lines() {
        assert_eq!(
            format_batch_event(&BatchEvent::Started { total: 3 }),
            vec!["Building 3 assets"]
        );
        assert_eq!(
            format_batch_event(&BatchEvent::TaskFinished {
                completed: 2,
                total: 3,
                output_name: "ui/icon.png".into(),
                outcome: TaskOutcome::Original,
            }),
            vec!["[2/3] ui/icon.png original"]
        );
        assert_eq!(
            format_batch_event(&BatchEvent::TaskFinished {
                completed: 3,
                total: 3,
                output_name: "a.png".into(),
                outcome: TaskOutcome::Resized { bytes: 2048 },
            }),
            vec!["[3/3] a.png resized (2.0 KB)"]
        );
    }

    #[test]
    fn batch_summary_counts_and_bytes() {
        let record = |outcome, source_bytes| TaskRecord {
            output_name: "x.png".into(),
            original_path: "x.jpg".into(),
            physical_width: 1,
            physical_height: 1,
            target_width: 1,
            target_height: 1,
            source_bytes,
            outcome,
        };
        let report = BatchReport {
            tasks: vec![
                record(TaskOutcome::Resized { bytes: 100 }, 1000),
                record(TaskOutcome::Original, 24),
                record(
                    TaskOutcome::Fallback {
                        reason: "bad".into(),
                    },
                    0,
                ),
                record(TaskOutcome::Cancelled, 500),
            ],
        };
        assert_eq!(
            format_batch_summary(&report),
            vec![
                "1 resized, 1 original, 1 fallback, 1 cancelled",
                "1.0 KB \u{2192} 124 B",
            ]
        );
    }
}
