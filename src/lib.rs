//! # sizewise
//!
//! Downsizes image assets to the largest size they are ever shown at.
//! Usage stats say how big each asset is rendered; physical resolution says
//! how big it can be. Everything between is wasted bytes.
//!
//! # Architecture: Plan, Then Resample
//!
//! ```text
//! 1. Plan      usage.json + assets/  →  Vec<OptimizationTask>   (pure, no pixels)
//! 2. Build     tasks                 →  dist/optimized/ + manifest.json
//! ```
//!
//! Planning is a pure function over two ordered maps, so the sizing rules
//! are unit tested without decoding a single image. The build stage runs each
//! resize through the same fixed pipeline:
//!
//! ```text
//! decode → 2×2 box pyramid → separable Lanczos-3 → dither + quantize → PNG
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`sizing`] | Sizing policy: usage stats + physical size → target size and resize flag |
//! | [`imaging`] | Pixel pipeline: codec trait, pyramid, Lanczos, quantization |
//! | [`batch`] | Runs tasks in parallel, falls back to originals, writes outputs and the manifest |
//! | [`scan`] | Loads the usage stats JSON and walks the source directory |
//! | [`config`] | `sizewise.toml` loading, merging, and validation |
//! | [`types`] | Stats, loaded images, and tasks shared across stages |
//! | [`naming`] | Output file naming |
//! | [`output`] | CLI output formatting for plan and build |
//!
//! # Design Decisions
//!
//! ## Never Upscale
//!
//! Every target is capped at the physical resolution. An asset whose usage
//! asks for more pixels than it has is shipped as-is.
//!
//! ## Alpha-Safe Quantization
//!
//! Lanczos ringing can push color above alpha near transparent edges. The
//! quantizer clamps color to alpha before rounding, so outputs stay valid
//! for premultiplied consumers.
//!
//! ## Single Output Format
//!
//! Every output is 8-bit RGBA PNG with a `.png` name, whatever the source
//! format. Failed resizes ship the original bytes under that same name so the
//! output set is always complete.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod scan;
pub mod sizing;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
