//! Input discovery: usage stats and source images.
//!
//! Builds the two ordered indexes the sizing policy consumes. Both are keyed
//! by the asset's relative path (with `/` separators), so a stats entry and
//! the file it describes meet on the same key.
//!
//! ## Stats file
//!
//! ```json
//! {
//!   "assets": {
//!     "ui/button.png": { "max_render_width": 96, "max_render_height": 32 },
//!     "bg/sky.jpg": {
//!       "max_render_width": 1280, "max_render_height": 720,
//!       "max_scale_x": 1.0, "max_scale_y": 1.0,
//!       "user_override": { "percentage": 50, "width": 1024, "height": 512 }
//!     }
//!   }
//! }
//! ```
//!
//! ## Source directory
//!
//! Every file with a decodable extension under the source root becomes a
//! [`LoadedSourceImage`]. Dimensions come from a header probe; pixels are not
//! decoded here. Files whose header cannot be read are skipped with a warning.

use crate::imaging::rust_codec::{is_supported, probe_dimensions};
use crate::types::{AssetUsageStat, LoadedSourceImage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Source directory not found: {0}")]
    SourceNotFound(PathBuf),
}

/// On-disk shape of the usage stats file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StatsFile {
    pub assets: BTreeMap<String, AssetUsageStat>,
}

/// Load usage stats from a JSON file.
pub fn load_stats(path: &Path) -> Result<BTreeMap<String, AssetUsageStat>, ScanError> {
    let content = fs::read_to_string(path)?;
    let file: StatsFile = serde_json::from_str(&content)?;
    Ok(file.assets)
}

/// Relative path of `path` under `root`, joined with `/`.
fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

/// Load one source file into memory.
pub fn load_source(root: &Path, path: &Path) -> Result<Option<LoadedSourceImage>, ScanError> {
    let Some(relative_path) = relative_key(root, path) else {
        return Ok(None);
    };
    let bytes = fs::read(path)?;
    match probe_dimensions(&bytes) {
        Ok((width, height)) => Ok(Some(LoadedSourceImage {
            width,
            height,
            source_width: None,
            source_height: None,
            bytes: Arc::from(bytes),
            relative_path,
        })),
        Err(e) => {
            tracing::warn!(path = %relative_path, error = %e, "skipping unreadable image");
            Ok(None)
        }
    }
}

/// Walk `root` and load every decodable image, keyed by relative path.
pub fn scan_sources(root: &Path) -> Result<BTreeMap<String, LoadedSourceImage>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::SourceNotFound(root.to_path_buf()));
    }

    let mut loaded = BTreeMap::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !is_supported(&name) {
            continue;
        }
        if let Some(image) = load_source(root, entry.path())? {
            loaded.insert(image.relative_path.clone(), image);
        }
    }
    Ok(loaded)
}
