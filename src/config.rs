//! Tool configuration.
//!
//! Handles loading, validating, and merging `sizewise.toml`. Stock defaults
//! are overridden by a config file in the source directory, and the CLI can
//! override individual values on top of that.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! buffer_percentage = 0.0   # Safety margin added to every usage-derived size
//! root_folder = "optimized" # Folder every output is placed under
//!
//! [dither]
//! enabled = true            # Triangular dither before 8-bit quantization
//! # seed = 42               # Fixed seed for reproducible output
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the source directory.
pub const CONFIG_FILENAME: &str = "sizewise.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `sizewise.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Uniform percentage added to usage-derived sizes. Overrides ignore it.
    pub buffer_percentage: f64,
    /// Single folder under the output directory holding every output.
    pub root_folder: String,
    /// Quantization dither settings.
    pub dither: DitherConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buffer_percentage: 0.0,
            root_folder: "optimized".to_string(),
            dither: DitherConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.buffer_percentage.is_finite() || self.buffer_percentage < 0.0 {
            return Err(ConfigError::Validation(
                "buffer_percentage must be a non-negative number".into(),
            ));
        }
        if self.root_folder.is_empty()
            || self.root_folder.contains(['/', '\\'])
            || self.root_folder == ".."
        {
            return Err(ConfigError::Validation(
                "root_folder must be a single non-empty folder name".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Dither settings for quantization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DitherConfig {
    /// When false, values are rounded without any offset.
    pub enabled: bool,
    /// Fixed seed. Each task derives its own stream from it, so output is
    /// byte-identical across runs and worker counts. `None` uses OS entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for DitherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            seed: None,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel resample workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(Config::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `sizewise.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `sizewise.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<Config, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `sizewise.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# sizewise configuration
# ======================
# All settings are optional. Values shown below are the defaults.
# Place this file as sizewise.toml in the source directory.
# Unknown keys will cause an error.

# Percentage added to every usage-derived size before it is capped at the
# physical resolution. 10 means "10% larger than the largest on-screen size".
# User overrides are not affected.
buffer_percentage = 0.0

# Every output is written under this single folder in the output directory,
# keeping each asset's relative path.
root_folder = "optimized"

# ---------------------------------------------------------------------------
# Quantization dither
# ---------------------------------------------------------------------------
[dither]
# Triangular dither hides banding in smooth gradients when rounding to 8 bits.
enabled = true

# Fixed seed for byte-identical output across runs.
# Omit to seed from the operating system.
# seed = 42

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel resample workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
