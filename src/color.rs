//! Shared color helpers: luminosity formulas, channel-space distance and the
//! closeness schedule used by the triangle approximator.
//!
//! The two luminosity formulas are deliberately separate. The edge outline uses
//! Rec. 709 weights and grayscale uses Rec. 601 weights; unifying them changes
//! output.

use crate::frame::Pixel;

/// Largest possible `color_distance` rounded up. Marks an unusable direction.
pub const SENTINEL_GRADIENT: f64 = 442.0;

/// Luminosity used by the edge outline: `0.2126·R + 0.7152·G + 0.0722·B`.
#[inline]
pub fn edge_luminosity(pixel: Pixel) -> f64 {
    luminosity_709(pixel.b as f64, pixel.g as f64, pixel.r as f64)
}

#[inline]
pub(crate) fn luminosity_709(b: f64, g: f64, r: f64) -> f64 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// Luminosity used by grayscale: `0.299·R + 0.587·G + 0.114·B`.
#[inline]
pub fn gray_luminosity(pixel: Pixel) -> f64 {
    0.299 * pixel.r as f64 + 0.587 * pixel.g as f64 + 0.114 * pixel.b as f64
}

/// Euclidean distance in (B, G, R) space. Range [0, ~441.67].
#[inline]
pub fn color_distance(a: Pixel, b: Pixel) -> f64 {
    let db = a.b as f64 - b.b as f64;
    let dg = a.g as f64 - b.g as f64;
    let dr = a.r as f64 - b.r as f64;
    (db * db + dg * dg + dr * dr).sqrt()
}

/// True when `candidate` lies strictly closer than `strength` to `origin`.
#[inline]
pub fn is_close(origin: Pixel, candidate: Pixel, strength: u32) -> bool {
    color_distance(origin, candidate) < strength as f64
}

/// Step function from iteration count to closeness threshold.
///
/// Early iterations paint broad regions; later ones refine detail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrengthSchedule {
    /// `(first iteration, strength)` pairs, ascending by iteration.
    steps: Vec<(u32, u32)>,
}

impl StrengthSchedule {
    /// Build a schedule from `(first iteration, strength)` steps.
    ///
    /// Returns `None` when the steps are empty, do not start at iteration 0,
    /// are not strictly ascending, or when strength ever increases.
    pub fn new(steps: Vec<(u32, u32)>) -> Option<Self> {
        let first = steps.first()?;
        if first.0 != 0 {
            return None;
        }
        let ordered = steps
            .windows(2)
            .all(|pair| pair[0].0 < pair[1].0 && pair[0].1 >= pair[1].1);
        ordered.then_some(Self { steps })
    }

    /// Strength for the given iteration count.
    pub fn strength_for(&self, iteration: u32) -> u32 {
        self.steps
            .iter()
            .rev()
            .find(|(start, _)| iteration >= *start)
            .map(|(_, strength)| *strength)
            .unwrap_or(self.steps[0].1)
    }
}

impl Default for StrengthSchedule {
    fn default() -> Self {
        Self {
            steps: vec![(0, 90), (2500, 60), (5000, 45), (6000, 30), (8000, 20)],
        }
    }
}
