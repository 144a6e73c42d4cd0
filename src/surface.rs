//! Drawing surfaces the session renders its output canvas onto.

use image::RgbaImage;

use crate::blending;

/// Width of a surface that has never been sized.
pub const DEFAULT_WIDTH: u32 = 300;
/// Height of a surface that has never been sized.
pub const DEFAULT_HEIGHT: u32 = 150;

/// A 2D-addressable RGBA pixel surface.
pub trait Surface {
    /// Current `(width, height)`.
    fn dimensions(&self) -> (u32, u32);

    /// Resize to `width` x `height`. Contents become fully transparent.
    fn resize(&mut self, width: u32, height: u32);

    /// Reset every pixel to `(0, 0, 0, 0)`.
    fn clear(&mut self);

    /// Copy out the current pixels.
    fn read_pixels(&self) -> RgbaImage;

    /// Replace the surface contents, adopting the dimensions of `pixels`.
    fn write_pixels(&mut self, pixels: &RgbaImage);

    /// Composite `layer` source-over at the origin, clipped to the surface.
    fn draw_over(&mut self, layer: &RgbaImage);
}

/// In-memory [`Surface`] backed by an [`RgbaImage`].
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixels: RgbaImage,
}

impl RasterSurface {
    /// Create a transparent surface of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    /// Borrow the backing buffer.
    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Consume the surface, returning its buffer.
    #[must_use]
    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Surface for RasterSurface {
    fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.pixels = RgbaImage::new(width, height);
    }

    fn clear(&mut self) {
        let buf: &mut [u8] = &mut self.pixels;
        buf.fill(0);
    }

    fn read_pixels(&self) -> RgbaImage {
        self.pixels.clone()
    }

    fn write_pixels(&mut self, pixels: &RgbaImage) {
        self.pixels.clone_from(pixels);
    }

    fn draw_over(&mut self, layer: &RgbaImage) {
        blending::draw_over(&mut self.pixels, layer);
    }
}
