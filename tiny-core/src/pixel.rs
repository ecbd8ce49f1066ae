//! Pixel types for the presentation path.
//!
//! Application code draws into a [`Framebuffer`] of RGBA pixels. The
//! host blit expects BGRA, so every present converts into a
//! surface-owned [`ScratchBuffer`] first.

use crate::error::{Result, TinyError};

// ── PixelFormat ──────────────────────────────────────────────────

/// Byte layout of a packed pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 4 bytes per pixel: Red, Green, Blue, Alpha (application side).
    Rgba8,
    /// 4 bytes per pixel: Blue, Green, Red, Alpha (GDI DIB layout).
    Bgra8,
}

impl PixelFormat {
    /// Bytes consumed by a single pixel in this format.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8 | PixelFormat::Bgra8 => 4,
        }
    }
}

// ── Rgba ─────────────────────────────────────────────────────────

/// A single logical pixel.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);
    pub const GREEN: Rgba = Rgba::opaque(0, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// A fully opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

// ── Framebuffer ──────────────────────────────────────────────────

/// A caller-owned grid of RGBA pixels, row-major, origin at the top-left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Framebuffer {
    /// A framebuffer cleared to transparent black.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba::default())
    }

    /// A framebuffer with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Wrap an existing pixel vector. Its length must be `width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(TinyError::InvalidFramebuffer {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgba] {
        &mut self.pixels
    }

    /// The pixel at `(x, y)`, or `None` when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set the pixel at `(x, y)`. Returns `false` when out of bounds.
    pub fn set(&mut self, x: u32, y: u32, color: Rgba) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.pixels[i] = color;
                true
            }
            None => false,
        }
    }

    pub fn fill(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }
}

// ── Conversion ───────────────────────────────────────────────────

/// Convert RGBA pixels into packed BGRA bytes with alpha forced to 255.
///
/// `dst` must hold at least `src.len() * 4` bytes.
pub fn convert_rgba_to_bgra(src: &[Rgba], dst: &mut [u8]) {
    let bpp = PixelFormat::Bgra8.bytes_per_pixel();
    for (px, out) in src.iter().zip(dst.chunks_exact_mut(bpp)) {
        out[0] = px.b;
        out[1] = px.g;
        out[2] = px.r;
        out[3] = 255;
    }
}

// ── ScratchBuffer ────────────────────────────────────────────────

/// Reusable BGRA staging buffer owned by a surface.
///
/// Reallocated from scratch whenever the presented pixel count changes;
/// there is no partial resize.
#[derive(Debug, Default)]
pub struct ScratchBuffer {
    data: Vec<u8>,
    pixel_count: usize,
    reallocations: u64,
}

impl ScratchBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size the buffer for `pixel_count` pixels and return it for writing.
    pub fn prepare(&mut self, pixel_count: usize) -> &mut [u8] {
        if self.pixel_count != pixel_count {
            self.data = vec![0; pixel_count * PixelFormat::Bgra8.bytes_per_pixel()];
            self.pixel_count = pixel_count;
            self.reallocations += 1;
            tracing::debug!(pixel_count, "scratch buffer reallocated");
        }
        &mut self.data
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    /// Number of times [`prepare`](Self::prepare) had to reallocate.
    pub fn reallocations(&self) -> u64 {
        self.reallocations
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_swaps_channels_and_forces_opaque() {
        let src = [Rgba::new(10, 20, 30, 0), Rgba::new(255, 0, 0, 128)];
        let mut dst = [0u8; 8];
        convert_rgba_to_bgra(&src, &mut dst);
        assert_eq!(dst, [30, 20, 10, 255, 0, 0, 255, 255]);
    }

    #[test]
    fn conversion_ignores_every_alpha_value() {
        let src: Vec<Rgba> = (0..=255u8).map(|a| Rgba::new(1, 2, 3, a)).collect();
        let mut dst = vec![0u8; src.len() * 4];
        convert_rgba_to_bgra(&src, &mut dst);
        for px in dst.chunks_exact(4) {
            assert_eq!(px, [3, 2, 1, 255]);
        }
    }

    #[test]
    fn scratch_reuses_buffer_for_same_size() {
        let mut scratch = ScratchBuffer::new();
        scratch.prepare(6);
        scratch.prepare(6);
        assert_eq!(scratch.reallocations(), 1);
        assert_eq!(scratch.as_bytes().len(), 24);
    }

    #[test]
    fn scratch_reallocates_once_on_size_change() {
        let mut scratch = ScratchBuffer::new();
        scratch.prepare(6);
        scratch.prepare(2);
        scratch.prepare(2);
        assert_eq!(scratch.reallocations(), 2);
        assert_eq!(scratch.pixel_count(), 2);
        assert_eq!(scratch.as_bytes().len(), 8);
    }

    #[test]
    fn framebuffer_from_pixels_checks_length() {
        let err = Framebuffer::from_pixels(2, 2, vec![Rgba::BLACK; 3]).unwrap_err();
        assert!(matches!(
            err,
            TinyError::InvalidFramebuffer {
                expected: 4,
                actual: 3
            }
        ));
        assert!(Framebuffer::from_pixels(2, 2, vec![Rgba::BLACK; 4]).is_ok());
    }

    #[test]
    fn framebuffer_is_row_major_from_top_left() {
        let mut fb = Framebuffer::new(3, 2);
        assert!(fb.set(2, 1, Rgba::WHITE));
        assert_eq!(fb.pixels()[5], Rgba::WHITE);
        assert_eq!(fb.get(2, 1), Some(Rgba::WHITE));
        assert_eq!(fb.get(0, 0), Some(Rgba::default()));
    }

    #[test]
    fn framebuffer_out_of_bounds_is_rejected() {
        let mut fb = Framebuffer::new(3, 2);
        assert!(!fb.set(3, 0, Rgba::WHITE));
        assert!(!fb.set(0, 2, Rgba::WHITE));
        assert_eq!(fb.get(3, 0), None);
    }

    #[test]
    fn fill_overwrites_every_pixel() {
        let mut fb = Framebuffer::filled(4, 4, Rgba::BLACK);
        fb.fill(Rgba::GREEN);
        assert!(fb.pixels().iter().all(|p| *p == Rgba::GREEN));
        assert_eq!(fb.pixel_count(), 16);
    }
}
