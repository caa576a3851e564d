//! Box-filter pyramid pre-reduction.
//!
//! Halves an oversized buffer with a 2×2 average until it is within a factor
//! of two of the target on at least one axis. The Lanczos pass then only has
//! to cover the remaining (< 2×) ratio on that axis, which keeps its six-tap
//! footprint meaningful.
//!
//! Averaging stays in `f32`. Rounding each level to 8 bits would stack
//! quantization error level over level and show up as banding in gradients.

use super::buffer::{CHANNELS, PixelBuffer};

/// Whether another halving step applies.
#[inline]
pub fn needs_halving(width: u32, height: u32, target_width: u32, target_height: u32) -> bool {
    width as u64 > 2 * target_width as u64 && height as u64 > 2 * target_height as u64
}

/// One 2×2 box-filter level. Odd trailing rows/columns are dropped.
pub fn halve(src: &PixelBuffer) -> PixelBuffer {
    let width = src.width / 2;
    let height = src.height / 2;
    let mut out = PixelBuffer::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let tl = src.index(2 * x, 2 * y);
            let tr = src.index(2 * x + 1, 2 * y);
            let bl = src.index(2 * x, 2 * y + 1);
            let br = src.index(2 * x + 1, 2 * y + 1);
            let dst = out.index(x, y);
            for c in 0..CHANNELS {
                out.data[dst + c] =
                    (src.data[tl + c] + src.data[tr + c] + src.data[bl + c] + src.data[br + c])
                        * 0.25;
            }
        }
    }
    out
}

/// Repeatedly halve `buffer` while both axes are more than twice the target.
///
/// Afterwards `width <= 2 * target_width || height <= 2 * target_height`.
pub fn reduce(mut buffer: PixelBuffer, target_width: u32, target_height: u32) -> PixelBuffer {
    while needs_halving(buffer.width, buffer.height, target_width, target_height) {
        buffer = halve(&buffer);
        tracing::trace!(width = buffer.width, height = buffer.height, "pyramid level");
    }
    buffer
}
