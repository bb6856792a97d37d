//! Sobel-style edge outline.
//!
//! Each interior pixel samples the 3x3 neighborhood's luminosity, applies a
//! vertical and a horizontal kernel and classifies the gradient magnitude:
//!
//! | magnitude        | output                          |
//! |------------------|---------------------------------|
//! | `> 100`          | white                           |
//! | `(30, 100]`      | gray at the truncated magnitude |
//! | `<= 30`          | black                           |
//!
//! The one-pixel border is never written; it keeps whatever the destination
//! held before the call. Interior-only iteration is what keeps every neighbor
//! sample in bounds.

use crate::color::{edge_luminosity, luminosity_709};
use crate::frame::{clamp_channel, Pixel, RasterBuffer};

/// Magnitude above which a pixel is a hard edge.
pub const STRONG_EDGE: f64 = 100.0;
/// Magnitude above which a pixel is a soft (gray) edge.
pub const WEAK_EDGE: f64 = 30.0;

/// Classification band of a gradient magnitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EdgeBand {
    Strong,
    Weak(f64),
    Flat,
}

impl EdgeBand {
    pub fn classify(magnitude: f64) -> Self {
        if magnitude > STRONG_EDGE {
            EdgeBand::Strong
        } else if magnitude > WEAK_EDGE {
            EdgeBand::Weak(magnitude)
        } else {
            EdgeBand::Flat
        }
    }

    pub fn pixel(self) -> Pixel {
        match self {
            EdgeBand::Strong => Pixel::WHITE,
            EdgeBand::Weak(magnitude) => Pixel::gray(clamp_channel(magnitude)),
            EdgeBand::Flat => Pixel::BLACK,
        }
    }
}

/// Directional gradients at an interior pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gradient {
    pub vertical: f64,
    pub horizontal: f64,
}

impl Gradient {
    pub fn magnitude(self) -> f64 {
        (self.vertical * self.vertical + self.horizontal * self.horizontal).sqrt()
    }
}

/// Gradient at `(row, col)`. The caller guarantees `1 <= row < height - 1`
/// and `1 <= col < width - 1`.
pub fn gradient_at(source: &RasterBuffer, row: usize, col: usize) -> Gradient {
    let lum = |r: usize, c: usize| edge_luminosity(source.get(r, c));
    let (up, down, left, right) = (row - 1, row + 1, col - 1, col + 1);

    let vertical = lum(down, right) + 2.0 * lum(row, right) + lum(up, right)
        - 2.0 * lum(row, left)
        - lum(down, left)
        - lum(up, left);

    // NOTE: the final term takes blue and green from (up, right) but red from
    // (down, left). Possibly a defect; fixing it changes every outline.
    let up_right = source.get(up, right);
    let skewed = luminosity_709(
        up_right.b as f64,
        up_right.g as f64,
        source.get(down, left).r as f64,
    );
    let horizontal = -lum(down, left) - 2.0 * lum(down, col) - lum(down, right)
        + 2.0 * lum(up, col)
        + lum(up, left)
        + skewed;

    Gradient {
        vertical,
        horizontal,
    }
}

/// Write the edge outline of `source` into the interior of `destination`.
pub fn edge_outline(source: &RasterBuffer, destination: &mut RasterBuffer) {
    source.assert_same_dimensions(destination);
    let (width, height) = (source.width(), source.height());
    if width < 3 || height < 3 {
        return;
    }
    for row in 1..height - 1 {
        for col in 1..width - 1 {
            let band = EdgeBand::classify(gradient_at(source, row, col).magnitude());
            destination.set(row, col, band.pixel());
        }
    }
}

/// Stateless edge detector, usable wherever a transform object is expected.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeDetector;

impl EdgeDetector {
    pub fn apply(&self, source: &RasterBuffer, destination: &mut RasterBuffer) {
        edge_outline(source, destination);
    }
}
