//! Pixel codec trait and shared error type.
//!
//! The [`PixelCodec`] trait is the capability boundary between the numeric
//! pipeline and whatever reads and writes compressed images. It has two
//! operations: decode bytes into a raw [`PixelBuffer`], and encode 8-bit RGBA
//! samples into output bytes.
//!
//! The production implementation is
//! [`RustCodec`](super::rust_codec::RustCodec), built on the pure-Rust `image`
//! crate. Pyramid, Lanczos, and quantization do not depend on which codec is
//! used.

use super::buffer::PixelBuffer;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("import failed: {0}")]
    ImportFailed(String),
    #[error("encode failed: {0}")]
    EncodeFailed(String),
}

/// Trait for image codecs.
///
/// `decode` must not apply gamma or ICC transforms and must not premultiply
/// alpha: the buffer holds stored sample values as floats.
pub trait PixelCodec: Sync {
    /// Decode compressed bytes into a non-premultiplied RGBA float buffer.
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, CodecError>;

    /// Encode tightly packed RGBA8 samples.
    fn encode(&self, width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>, CodecError>;
}
