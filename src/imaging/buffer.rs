//! Floating-point RGBA working buffer.

/// Channels per pixel. Always RGBA.
pub const CHANNELS: usize = 4;

/// Row-major, non-premultiplied RGBA samples in stored-value units
/// (0.0–255.0 for 8-bit sources).
///
/// Owned by a single pipeline run. Stages consume one buffer and return the
/// next; nothing is shared.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl PixelBuffer {
    /// Zero-filled buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize * CHANNELS],
        }
    }

    /// Wrap existing samples. Returns `None` if the length doesn't match.
    pub fn from_raw(width: u32, height: u32, data: Vec<f32>) -> Option<Self> {
        (data.len() == width as usize * height as usize * CHANNELS).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// Buffer filled with a single RGBA value.
    pub fn filled(width: u32, height: u32, rgba: [f32; 4]) -> Self {
        let data = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * CHANNELS)
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        let i = self.index(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    pub fn pixels(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(CHANNELS)
    }
}
