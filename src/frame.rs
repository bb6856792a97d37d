//! Raster buffer layer.
//!
//! This module defines the only mutable data structure the transforms operate on.
//!
//! - `Pixel`: three 8-bit channels stored in blue, green, red order.
//! - `RasterBuffer`: row-major grid of `Pixel` with fixed width and height.
//!
//! Transforms always pair a read-only source with a destination of identical
//! dimensions. A mismatch or an empty buffer is a caller bug: the core panics
//! through `assert_same_dimensions` instead of truncating.
//!
//! Packed RGB24 bytes are the interchange format with decode/capture/display
//! collaborators; conversion errors there are recoverable (`anyhow`).

use anyhow::{anyhow, Result};

// ----------------------------------------------------------------------------
// Pixel
// ----------------------------------------------------------------------------

/// A single 3-channel pixel (B, G, R).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub b: u8,
    pub g: u8,
    pub r: u8,
}

impl Pixel {
    pub const BLACK: Pixel = Pixel { b: 0, g: 0, r: 0 };
    pub const WHITE: Pixel = Pixel {
        b: 255,
        g: 255,
        r: 255,
    };

    pub const fn new(b: u8, g: u8, r: u8) -> Self {
        Self { b, g, r }
    }

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { b, g, r }
    }

    /// Same value on every channel.
    pub const fn gray(value: u8) -> Self {
        Self {
            b: value,
            g: value,
            r: value,
        }
    }

    /// Build a pixel from floating point channels.
    ///
    /// Each channel is truncated toward zero and clamped to [0, 255]; NaN maps to 0.
    pub fn from_clamped(b: f64, g: f64, r: f64) -> Self {
        Self {
            b: clamp_channel(b),
            g: clamp_channel(g),
            r: clamp_channel(r),
        }
    }

    /// Channels as `[b, g, r]`.
    pub fn channels(self) -> [u8; 3] {
        [self.b, self.g, self.r]
    }
}

/// Truncate and clamp a channel value. `as` saturates and maps NaN to 0.
#[inline]
pub(crate) fn clamp_channel(value: f64) -> u8 {
    value.trunc().clamp(0.0, 255.0) as u8
}

// ----------------------------------------------------------------------------
// RasterBuffer
// ----------------------------------------------------------------------------

/// Row-major 2-D grid of pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl RasterBuffer {
    /// Create a buffer filled with `fill`.
    ///
    /// # Panics
    /// Panics if either dimension is zero.
    pub fn new(width: usize, height: usize, fill: Pixel) -> Self {
        assert!(
            width > 0 && height > 0,
            "raster buffer must be non-empty (got {}x{})",
            width,
            height
        );
        Self {
            width,
            height,
            pixels: vec![fill; width * height],
        }
    }

    /// Build a buffer from a generator called once per `(row, col)`.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> Pixel) -> Self {
        let mut buffer = Self::new(width, height, Pixel::BLACK);
        for row in 0..height {
            for col in 0..width {
                buffer.pixels[row * width + col] = f(row, col);
            }
        }
        buffer
    }

    /// Import packed RGB24 bytes (as produced by the `image` crate or a camera).
    pub fn from_rgb_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(anyhow!("raster dimensions must be non-zero ({}x{})", width, height));
        }
        let expected = width
            .checked_mul(height)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("raster dimensions overflow"))?;
        if bytes.len() != expected {
            return Err(anyhow!(
                "RGB buffer length mismatch: expected {}, got {}",
                expected,
                bytes.len()
            ));
        }
        let pixels = bytes
            .chunks_exact(3)
            .map(|rgb| Pixel::from_rgb(rgb[0], rgb[1], rgb[2]))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Export as packed RGB24 bytes for display collaborators.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for p in &self.pixels {
            bytes.extend_from_slice(&[p.r, p.g, p.b]);
        }
        bytes
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.height && col < self.width,
            "pixel ({}, {}) outside {}x{} buffer",
            row,
            col,
            self.width,
            self.height
        );
        row * self.width + col
    }

    /// Read the pixel at `(row, col)`. Panics when out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Pixel {
        self.pixels[self.index(row, col)]
    }

    /// Write the pixel at `(row, col)`. Panics when out of bounds.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, pixel: Pixel) {
        let idx = self.index(row, col);
        self.pixels[idx] = pixel;
    }

    pub fn fill(&mut self, pixel: Pixel) {
        self.pixels.fill(pixel);
    }

    /// Overwrite this buffer with `other`'s pixels. Dimensions must match.
    pub fn copy_from(&mut self, other: &RasterBuffer) {
        self.assert_same_dimensions(other);
        self.pixels.copy_from_slice(&other.pixels);
    }

    pub fn same_dimensions(&self, other: &RasterBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Fail fast when two paired buffers differ in size.
    pub fn assert_same_dimensions(&self, other: &RasterBuffer) {
        assert!(
            self.same_dimensions(other),
            "paired buffers must share dimensions ({}x{} vs {}x{})",
            self.width,
            self.height,
            other.width,
            other.height
        );
    }

    /// Number of pixels exactly equal to `pixel`.
    pub fn count(&self, pixel: Pixel) -> usize {
        self.pixels.iter().filter(|p| **p == pixel).count()
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Always false; empty buffers cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
