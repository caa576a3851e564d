//! Codec built on the pure-Rust `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Probe dimensions | `image::ImageReader::into_dimensions` (header only) |
//! | Decode (PNG, JPEG, WebP, BMP, GIF, TIFF) | `image::load_from_memory` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (RGBA8) |
//!
//! The `image` crate performs no color management on decode: ICC profiles
//! and PNG gamma chunks are ignored, and alpha is never premultiplied, so the
//! samples reach the pipeline exactly as stored.

use super::buffer::PixelBuffer;
use super::codec::{CodecError, PixelCodec};
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader};
use std::io::Cursor;

/// Extensions whose decoders are compiled in.
pub const SUPPORTED_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "webp", "bmp", "gif", "tif", "tiff"];

/// Whether a file name has a decodable extension (case-insensitive).
pub fn is_supported(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, ext)| {
        SUPPORTED_EXTENSIONS
            .iter()
            .any(|s| s.eq_ignore_ascii_case(ext))
    })
}

/// Read image dimensions from the header without decoding pixels.
pub fn probe_dimensions(bytes: &[u8]) -> Result<(u32, u32), CodecError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CodecError::ImportFailed(format!("Failed to sniff format: {e}")))?
        .into_dimensions()
        .map_err(|e| CodecError::ImportFailed(format!("Failed to read dimensions: {e}")))
}

/// Pure Rust codec using the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Flatten any decoded image into RGBA floats in 0–255 units.
fn to_pixel_buffer(img: DynamicImage) -> PixelBuffer {
    let (width, height) = (img.width(), img.height());
    let data: Vec<f32> = match img {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_) => img
            .into_rgba8()
            .into_raw()
            .into_iter()
            .map(f32::from)
            .collect(),
        // Deeper formats keep their precision, rescaled to the 8-bit range.
        _ => img
            .into_rgba32f()
            .into_raw()
            .into_iter()
            .map(|v| v * 255.0)
            .collect(),
    };
    PixelBuffer {
        width,
        height,
        data,
    }
}

impl PixelCodec for RustCodec {
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, CodecError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| CodecError::ImportFailed(format!("Failed to decode: {e}")))?;
        Ok(to_pixel_buffer(img))
    }

    fn encode(&self, width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>, CodecError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected || width == 0 || height == 0 {
            return Err(CodecError::EncodeFailed(format!(
                "buffer of {} bytes does not match {width}x{height} RGBA",
                rgba.len()
            )));
        }
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(rgba, width, height, ExtendedColorType::Rgba8)
            .map_err(|e| CodecError::EncodeFailed(format!("PNG encode failed: {e}")))?;
        Ok(out)
    }
}
