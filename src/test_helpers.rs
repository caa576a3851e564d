//! Shared test utilities.
//!
//! Builds small in-memory images and encodes them, so tests can feed real
//! bytes through the codec and the scanner without fixture files.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let png = encode_png(&solid_rgba(64, 32, [255, 0, 0, 255]));
//! ```

use image::{ImageEncoder, RgbaImage};

// =========================================================================
// Image builders
// =========================================================================

/// Image filled with one RGBA color.
pub fn solid_rgba(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, image::Rgba(color))
}

/// PNG-encode an RGBA image.
pub fn encode_png(img: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
    out
}
