//! Resample entry point.
//!
//! Combines the codec with the numeric stages:
//!
//! ```text
//! bytes ─decode─▶ PixelBuffer ─pyramid─▶ ─lanczos─▶ ─quantize─▶ RGBA8 ─encode─▶ bytes
//! ```
//!
//! Each call owns its buffers; nothing is shared between concurrent runs.

use super::codec::{CodecError, PixelCodec};
use super::quantize::{DitherSource, quantize};
use super::{lanczos, pyramid};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResampleError {
    #[error("{0}")]
    Import(CodecError),
    #[error("{0}")]
    Encode(CodecError),
}

/// Decode `source`, resample it to exactly `target_width × target_height`,
/// and encode the result.
///
/// On error the caller is expected to ship `source` unchanged.
pub fn resample(
    codec: &impl PixelCodec,
    source: &[u8],
    target_width: u32,
    target_height: u32,
    dither: &mut impl DitherSource,
) -> Result<Vec<u8>, ResampleError> {
    let target_width = target_width.max(1);
    let target_height = target_height.max(1);

    let decoded = codec.decode(source).map_err(ResampleError::Import)?;
    if decoded.width == 0 || decoded.height == 0 {
        return Err(ResampleError::Import(CodecError::ImportFailed(
            "decoded image is empty".to_string(),
        )));
    }
    tracing::debug!(
        from = %format!("{}x{}", decoded.width, decoded.height),
        to = %format!("{target_width}x{target_height}"),
        "resampling"
    );

    let reduced = pyramid::reduce(decoded, target_width, target_height);
    let resampled = lanczos::resample(&reduced, target_width, target_height);
    drop(reduced);
    let rgba = quantize(&resampled, dither);

    codec
        .encode(target_width, target_height, &rgba)
        .map_err(ResampleError::Encode)
}
