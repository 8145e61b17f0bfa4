//! RGBA raster buffer.

use regionscan_core::{Dimensions, Error, Rect, Result, Rgba};

const CHANNELS: usize = 4;

/// In-memory RGBA8 image.
///
/// Pixels are stored row-major, four bytes per pixel. The engine treats a
/// raster as read-only input; new buffers are only produced for crops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    /// Pixel storage (row-major, RGBA)
    pixels: Vec<u8>,
    /// Raster dimensions
    dimensions: Dimensions,
}

impl RasterBuffer {
    /// Create a raster filled with one color.
    pub fn filled(dimensions: Dimensions, color: Rgba) -> Self {
        let mut pixels = Vec::with_capacity(dimensions.pixel_count() * CHANNELS);
        for _ in 0..dimensions.pixel_count() {
            pixels.extend_from_slice(&[color.r, color.g, color.b, color.a]);
        }
        Self { pixels, dimensions }
    }

    /// Create a transparent black raster.
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            pixels: vec![0; dimensions.pixel_count() * CHANNELS],
            dimensions,
        }
    }

    /// Wrap raw RGBA bytes.
    ///
    /// Fails if `pixels` does not hold exactly `width * height * 4` bytes.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let dimensions = Dimensions::new(width, height);
        if pixels.len() != dimensions.pixel_count() * CHANNELS {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok(Self { pixels, dimensions })
    }

    /// Raster dimensions.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    /// Raw RGBA bytes.
    pub fn as_raw(&self) -> &[u8] {
        &self.pixels
    }

    /// Consume the raster, returning the raw RGBA bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.dimensions.width as usize + x as usize) * CHANNELS
    }

    /// Get pixel at position.
    ///
    /// Returns None if position is out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x < self.dimensions.width && y < self.dimensions.height {
            Some(self.pixel_at(x, y))
        } else {
            None
        }
    }

    /// Get pixel at a position the caller already knows is in bounds.
    ///
    /// # Panics
    /// Panics if the position is outside the raster.
    pub fn pixel_at(&self, x: u32, y: u32) -> Rgba {
        debug_assert!(x < self.dimensions.width && y < self.dimensions.height);
        let i = self.offset(x, y);
        let p = &self.pixels[i..i + CHANNELS];
        Rgba::new(p[0], p[1], p[2], p[3])
    }

    /// Unweighted luma of an in-bounds pixel.
    pub fn luma_at(&self, x: u32, y: u32) -> u8 {
        self.pixel_at(x, y).luma()
    }

    /// Set pixel at position. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x < self.dimensions.width && y < self.dimensions.height {
            let i = self.offset(x, y);
            self.pixels[i..i + CHANNELS].copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    /// Fill a rectangle, clipped to the raster.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let Some(rect) = rect.clamp_to(self.dimensions) else {
            return;
        };
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                self.set_pixel(x, y, color);
            }
        }
    }

    /// Copy a rectangle into a new raster.
    ///
    /// The rectangle is clamped to the raster first; a rectangle with nothing
    /// left after clamping is an `InvalidRegion` error.
    pub fn crop(&self, rect: Rect) -> Result<RasterBuffer> {
        let clamped = rect.clamp_to(self.dimensions).ok_or_else(|| {
            Error::InvalidRegion(format!(
                "{}x{} at ({}, {}) lies outside {}x{} raster",
                rect.width,
                rect.height,
                rect.x,
                rect.y,
                self.dimensions.width,
                self.dimensions.height
            ))
        })?;

        let row_bytes = clamped.width as usize * CHANNELS;
        let mut pixels = Vec::with_capacity(row_bytes * clamped.height as usize);
        for y in clamped.y..clamped.bottom() {
            let start = self.offset(clamped.x, y);
            pixels.extend_from_slice(&self.pixels[start..start + row_bytes]);
        }

        Ok(RasterBuffer {
            pixels,
            dimensions: Dimensions::new(clamped.width, clamped.height),
        })
    }
}
