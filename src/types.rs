//! Shared types passed between the scan, sizing, and batch stages.
//!
//! Usage stats come in as JSON, loaded images come from the source scan, and
//! [`OptimizationTask`] is what sizing hands to the batch. Tasks serialize
//! for inspection; the source bytes are never serialized.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Usage statistics for one logical asset, aggregated across every place it
/// is rendered.
///
/// Keyed externally by the asset's lookup identifier (its relative path).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetUsageStat {
    /// Largest on-screen width this asset was ever drawn at, in pixels.
    pub max_render_width: f64,
    /// Largest on-screen height this asset was ever drawn at, in pixels.
    pub max_render_height: f64,
    /// Largest horizontal scale factor observed.
    #[serde(default = "unit_scale")]
    pub max_scale_x: f64,
    /// Largest vertical scale factor observed.
    #[serde(default = "unit_scale")]
    pub max_scale_y: f64,
    /// User-chosen size that supersedes the usage-derived one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_override: Option<UserOverride>,
}

fn unit_scale() -> f64 {
    1.0
}

/// A user override. The percentage is already applied to `width`/`height`
/// by whoever produced the stats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserOverride {
    pub percentage: f64,
    pub width: u32,
    pub height: u32,
}

/// A decoded-enough source image: its dimensions and raw bytes.
///
/// `width`/`height` are the canonical (display) size. When that size is a
/// scaled proxy, `source_width`/`source_height` hold the real pixel size of
/// the payload.
#[derive(Debug, Clone)]
pub struct LoadedSourceImage {
    pub width: u32,
    pub height: u32,
    pub source_width: Option<u32>,
    pub source_height: Option<u32>,
    pub bytes: Arc<[u8]>,
    /// Relative path with `/` separators, as found under the source root.
    pub relative_path: String,
}

impl LoadedSourceImage {
    /// Physical resolution: the true source size if known, else canonical.
    pub fn physical_size(&self) -> (u32, u32) {
        (
            self.source_width.unwrap_or(self.width),
            self.source_height.unwrap_or(self.height),
        )
    }
}

/// One entry of the optimization plan.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationTask {
    /// Name inside the package, always with the output extension.
    pub output_name: String,
    pub original_path: String,
    pub physical_width: u32,
    pub physical_height: u32,
    pub target_width: u32,
    pub target_height: u32,
    #[serde(skip)]
    pub source: Arc<[u8]>,
    pub max_scale: f64,
    pub is_resize: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_percentage: Option<f64>,
}

impl OptimizationTask {
    /// Fraction of the physical pixel count kept by the target size.
    pub fn pixel_ratio(&self) -> f64 {
        let before = self.physical_width as f64 * self.physical_height as f64;
        let after = self.target_width as f64 * self.target_height as f64;
        if before == 0.0 { 1.0 } else { after / before }
    }
}
