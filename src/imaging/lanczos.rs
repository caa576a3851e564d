//! Separable Lanczos-3 resampling.
//!
//! The kernel has radius 3, so every output coordinate draws from exactly six
//! source samples on each axis:
//!
//! ```text
//! center = (i + 0.5) * (src / dst) - 0.5
//! taps   = floor(center) - 2 ..= floor(center) + 3
//! weight = L(center - tap), renormalized to sum to 1
//! ```
//!
//! Tap indices outside the image are clamped to the nearest edge sample.
//! The horizontal pass writes a `dst_w × src_h` intermediate, the vertical
//! pass reads it into `dst_w × dst_h`. Both passes accumulate in floating
//! point; nothing is rounded until quantization.

use super::buffer::{CHANNELS, PixelBuffer};
use std::f64::consts::PI;

/// Kernel radius in source pixels.
pub const RADIUS: f64 = 3.0;

/// Taps per output coordinate.
pub const TAPS: usize = 6;

#[inline]
fn sinc(t: f64) -> f64 {
    let a = PI * t;
    a.sin() / a
}

/// Lanczos-3 kernel.
#[inline]
pub fn kernel(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else if x.abs() >= RADIUS {
        0.0
    } else {
        sinc(x) * sinc(x / RADIUS)
    }
}

/// The six source indices and weights feeding one output coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapSet {
    pub indices: [usize; TAPS],
    pub weights: [f32; TAPS],
}

/// Tap set for output coordinate `out_index` when resampling `src_size`
/// samples down (or up) to `dst_size`.
pub fn taps_for(out_index: u32, src_size: u32, dst_size: u32) -> TapSet {
    let scale = src_size as f64 / dst_size as f64;
    let center = (out_index as f64 + 0.5) * scale - 0.5;
    let first = center.floor() as i64 - 2;
    let last = src_size as i64 - 1;

    let mut raw = [0.0f64; TAPS];
    let mut indices = [0usize; TAPS];
    for (k, (w, idx)) in raw.iter_mut().zip(indices.iter_mut()).enumerate() {
        let n = first + k as i64;
        *w = kernel(center - n as f64);
        *idx = n.clamp(0, last) as usize;
    }

    let sum: f64 = raw.iter().sum();
    // An all-zero set cannot be normalized; leave it as is.
    if sum != 0.0 {
        for w in &mut raw {
            *w /= sum;
        }
    }

    TapSet {
        indices,
        weights: raw.map(|w| w as f32),
    }
}

/// Tap sets for every output coordinate along one axis.
pub fn axis_weights(src_size: u32, dst_size: u32) -> Vec<TapSet> {
    (0..dst_size)
        .map(|i| taps_for(i, src_size, dst_size))
        .collect()
}

fn resample_horizontal(src: &PixelBuffer, dst_width: u32) -> PixelBuffer {
    let taps = axis_weights(src.width, dst_width);
    let mut out = PixelBuffer::new(dst_width, src.height);

    for y in 0..src.height {
        let row = src.index(0, y);
        for (x, set) in taps.iter().enumerate() {
            let mut acc = [0.0f32; CHANNELS];
            for (&sx, &w) in set.indices.iter().zip(&set.weights) {
                let i = row + sx * CHANNELS;
                for (c, a) in acc.iter_mut().enumerate() {
                    *a += src.data[i + c] * w;
                }
            }
            let dst = out.index(x as u32, y);
            out.data[dst..dst + CHANNELS].copy_from_slice(&acc);
        }
    }
    out
}

fn resample_vertical(src: &PixelBuffer, dst_height: u32) -> PixelBuffer {
    let taps = axis_weights(src.height, dst_height);
    let mut out = PixelBuffer::new(src.width, dst_height);

    for (y, set) in taps.iter().enumerate() {
        for x in 0..src.width {
            let mut acc = [0.0f32; CHANNELS];
            for (&sy, &w) in set.indices.iter().zip(&set.weights) {
                let i = src.index(x, sy as u32);
                for (c, a) in acc.iter_mut().enumerate() {
                    *a += src.data[i + c] * w;
                }
            }
            let dst = out.index(x, y as u32);
            out.data[dst..dst + CHANNELS].copy_from_slice(&acc);
        }
    }
    out
}

/// Resample to exactly `target_width × target_height`, horizontal first.
pub fn resample(src: &PixelBuffer, target_width: u32, target_height: u32) -> PixelBuffer {
    let intermediate = resample_horizontal(src, target_width);
    resample_vertical(&intermediate, target_height)
}
