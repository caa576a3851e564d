//! Dithered 8-bit quantization that keeps color ≤ alpha.
//!
//! Each pixel gets one triangular-distributed offset `d` in `(-1, 1)`,
//! applied identically to all four channels:
//!
//! ```text
//! alpha_out = round(a + d)
//! color_out = round(min(c, a) + d)
//! ```
//!
//! Color is clamped to alpha before the offset and before rounding. Since
//! both sides then receive the same `d` and rounding is monotonic, the
//! output never has a color channel above its alpha, which downstream
//! premultiplied-alpha compositing relies on.

use super::buffer::{CHANNELS, PixelBuffer};
use rand::Rng;

/// Source of per-pixel dither offsets.
pub trait DitherSource {
    /// Next offset, in `(-1, 1)`.
    fn next_offset(&mut self) -> f32;
}

/// Triangular dither from the sum of two uniform samples.
pub struct TriangularDither<R> {
    rng: R,
}

impl<R: Rng> TriangularDither<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> DitherSource for TriangularDither<R> {
    fn next_offset(&mut self) -> f32 {
        self.rng.random::<f32>() + self.rng.random::<f32>() - 1.0
    }
}

/// No dithering: every offset is zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDither;

impl DitherSource for NoDither {
    fn next_offset(&mut self) -> f32 {
        0.0
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Quantize a float buffer into tightly packed RGBA8.
pub fn quantize(buffer: &PixelBuffer, dither: &mut impl DitherSource) -> Vec<u8> {
    let mut out = Vec::with_capacity(buffer.data.len());
    for px in buffer.pixels() {
        let d = dither.next_offset();
        let alpha = px[3];
        for &c in &px[..CHANNELS - 1] {
            out.push(to_u8(c.min(alpha) + d));
        }
        out.push(to_u8(alpha + d));
    }
    out
}
