//! Image resampling in pure Rust.
//!
//! | Stage | Module |
//! |---|---|
//! | **Decode** | [`PixelCodec::decode`] ([`RustCodec`] via the `image` crate) |
//! | **Pyramid** | [`pyramid`]: 2×2 box halving to within 2× of the target |
//! | **Resample** | [`lanczos`]: separable Lanczos-3, 6 taps per axis |
//! | **Quantize** | [`quantize`]: triangular dither, color ≤ alpha, 8-bit |
//! | **Encode** | [`PixelCodec::encode`] (PNG RGBA8) |
//!
//! The module is split into:
//! - **Buffer**: [`PixelBuffer`], the float RGBA working buffer
//! - **Codec**: [`PixelCodec`] trait + [`RustCodec`]
//! - **Stages**: pure functions over buffers (unit testable)
//! - **Resample**: [`resample()`], the entry point combining codec + stages

pub mod buffer;
pub mod codec;
pub mod lanczos;
pub mod pyramid;
pub mod quantize;
mod resample;
pub mod rust_codec;

pub use buffer::PixelBuffer;
pub use codec::{CodecError, PixelCodec};
pub use quantize::{DitherSource, NoDither, TriangularDither};
pub use resample::{ResampleError, resample};
pub use rust_codec::RustCodec;
