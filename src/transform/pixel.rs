//! Stateless per-pixel transforms.
//!
//! Every output pixel depends only on the matching input pixel (plus a global
//! scalar for black/white). None of these read neighbors, so rows could be
//! processed in parallel without changing results.

use crate::color::gray_luminosity;
use crate::frame::{clamp_channel, Pixel, RasterBuffer};

/// Upper bound for per-channel percentages.
pub const MAX_CHANNEL_PERCENT: f64 = 150.0;

/// Apply `f` to every pixel of `source`, writing into `destination`.
pub fn map_pixels(source: &RasterBuffer, destination: &mut RasterBuffer, f: impl Fn(Pixel) -> Pixel) {
    source.assert_same_dimensions(destination);
    for (out, &input) in destination.pixels_mut().iter_mut().zip(source.pixels()) {
        *out = f(input);
    }
}

/// Copy verbatim.
pub fn identity(source: &RasterBuffer, destination: &mut RasterBuffer) {
    destination.copy_from(source);
}

/// White iff the channel average is strictly above `threshold`.
pub fn black_and_white(source: &RasterBuffer, destination: &mut RasterBuffer, threshold: u8) {
    map_pixels(source, destination, |p| {
        let average = (p.b as f64 + p.g as f64 + p.r as f64) / 3.0;
        if average > threshold as f64 {
            Pixel::WHITE
        } else {
            Pixel::BLACK
        }
    });
}

/// Rec. 601 grayscale. One rounded value is written to all three channels.
pub fn grayscale(source: &RasterBuffer, destination: &mut RasterBuffer) {
    map_pixels(source, destination, |p| {
        let gray = gray_luminosity(p).round().clamp(0.0, 255.0) as u8;
        Pixel::gray(gray)
    });
}

/// Multiply every channel by `k` (clamped to [0, 1]) and truncate.
pub fn darken(source: &RasterBuffer, destination: &mut RasterBuffer, k: f64) {
    let k = if k.is_nan() { 0.0 } else { k.clamp(0.0, 1.0) };
    map_pixels(source, destination, |p| {
        Pixel::from_clamped(p.b as f64 * k, p.g as f64 * k, p.r as f64 * k)
    });
}

/// Per-channel percentages in [0, 150]. Results above 255 saturate.
pub fn channel_percentage(
    source: &RasterBuffer,
    destination: &mut RasterBuffer,
    red_pct: f64,
    green_pct: f64,
    blue_pct: f64,
) {
    let scale = |pct: f64| {
        if pct.is_nan() {
            0.0
        } else {
            pct.clamp(0.0, MAX_CHANNEL_PERCENT) / 100.0
        }
    };
    let (rs, gs, bs) = (scale(red_pct), scale(green_pct), scale(blue_pct));
    map_pixels(source, destination, |p| Pixel {
        b: clamp_channel(p.b as f64 * bs),
        g: clamp_channel(p.g as f64 * gs),
        r: clamp_channel(p.r as f64 * rs),
    });
}

/// Force the dominant channel to 255 and the others to 0. See `dominant_channel`.
pub fn purify(source: &RasterBuffer, destination: &mut RasterBuffer) {
    map_pixels(source, destination, |p| match dominant_channel(p) {
        Channel::Blue => Pixel::new(255, 0, 0),
        Channel::Green => Pixel::new(0, 255, 0),
        Channel::Red => Pixel::new(0, 0, 255),
    });
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Blue,
    Green,
    Red,
}

/// Winning channel for `purify`.
///
/// Channels are tested in blue, green, red order with `>=` against the channels
/// not yet beaten, so on an exact tie the earlier-checked channel wins.
pub fn dominant_channel(p: Pixel) -> Channel {
    if p.b >= p.g && p.b >= p.r {
        Channel::Blue
    } else if p.g >= p.r {
        Channel::Green
    } else {
        Channel::Red
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(p: Pixel) -> RasterBuffer {
        RasterBuffer::new(1, 1, p)
    }

    fn run(source: &RasterBuffer, f: impl FnOnce(&RasterBuffer, &mut RasterBuffer)) -> Pixel {
        let mut out = RasterBuffer::new(source.width(), source.height(), Pixel::new(1, 2, 3));
        f(source, &mut out);
        out.get(0, 0)
    }

    #[test]
    fn black_and_white_threshold_is_strict() {
        let equal = single(Pixel::gray(100));
        assert_eq!(run(&equal, |s, d| black_and_white(s, d, 100)), Pixel::BLACK);
        assert_eq!(run(&equal, |s, d| black_and_white(s, d, 99)), Pixel::WHITE);
        let zero = single(Pixel::BLACK);
        assert_eq!(run(&zero, |s, d| black_and_white(s, d, 0)), Pixel::BLACK);
    }

    #[test]
    fn black_and_white_uses_fractional_average() {
        // (0 + 0 + 1) / 3 > 0
        let p = single(Pixel::new(0, 0, 1));
        assert_eq!(run(&p, |s, d| black_and_white(s, d, 0)), Pixel::WHITE);
    }

    #[test]
    fn grayscale_rounds_once() {
        // 0.299*10 + 0.587*20 + 0.114*30 = 18.15 -> 18
        let p = single(Pixel::from_rgb(10, 20, 30));
        assert_eq!(run(&p, grayscale), Pixel::gray(18));
        // 0.299*255 + 0.587*0 + 0.114*0 = 76.245 -> 76
        let red = single(Pixel::from_rgb(255, 0, 0));
        assert_eq!(run(&red, grayscale), Pixel::gray(76));
        // 0.587*255 = 149.685 -> 150
        let green = single(Pixel::from_rgb(0, 255, 0));
        assert_eq!(run(&green, grayscale), Pixel::gray(150));
        assert_eq!(run(&single(Pixel::WHITE), grayscale), Pixel::WHITE);
    }

    #[test]
    fn darken_truncates() {
        let p = single(Pixel::new(255, 101, 3));
        assert_eq!(run(&p, |s, d| darken(s, d, 0.5)), Pixel::new(127, 50, 1));
        assert_eq!(run(&p, |s, d| darken(s, d, 1.0)), Pixel::new(255, 101, 3));
        assert_eq!(run(&p, |s, d| darken(s, d, 0.0)), Pixel::BLACK);
    }

    #[test]
    fn darken_clamps_constant() {
        let p = single(Pixel::new(200, 100, 50));
        assert_eq!(run(&p, |s, d| darken(s, d, 3.0)), Pixel::new(200, 100, 50));
        assert_eq!(run(&p, |s, d| darken(s, d, -1.0)), Pixel::BLACK);
        assert_eq!(run(&p, |s, d| darken(s, d, f64::NAN)), Pixel::BLACK);
    }

    #[test]
    fn compounded_darken_stays_within_truncation_tolerance() {
        let source = RasterBuffer::from_fn(16, 16, |r, c| {
            Pixel::new((r * 16 + c) as u8, (255 - r * 16 - c) as u8, (r * c) as u8)
        });
        let mut half = source.clone();
        let mut twice = source.clone();
        let mut quarter = source.clone();
        darken(&source, &mut half, 0.5);
        darken(&half, &mut twice, 0.5);
        darken(&source, &mut quarter, 0.25);
        for (a, b) in twice.pixels().iter().zip(quarter.pixels()) {
            for (x, y) in a.channels().iter().zip(b.channels()) {
                assert!((*x as i32 - y as i32).abs() <= 1, "{} vs {}", x, y);
            }
        }
    }

    #[test]
    fn channel_percentage_scales_and_saturates() {
        let p = single(Pixel::new(200, 100, 201));
        // blue 150% -> 300 saturates, green 50% -> 50, red 33% -> 66.33 -> 66
        assert_eq!(
            run(&p, |s, d| channel_percentage(s, d, 33.0, 50.0, 150.0)),
            Pixel::new(255, 50, 66)
        );
        // out-of-range percentages clamp to [0, 150]
        assert_eq!(
            run(&p, |s, d| channel_percentage(s, d, 500.0, -10.0, 100.0)),
            Pixel::new(200, 0, 255)
        );
    }

    #[test]
    fn purify_picks_strict_winner() {
        assert_eq!(run(&single(Pixel::new(9, 3, 4)), purify), Pixel::new(255, 0, 0));
        assert_eq!(run(&single(Pixel::new(3, 9, 4)), purify), Pixel::new(0, 255, 0));
        assert_eq!(run(&single(Pixel::new(3, 4, 9)), purify), Pixel::new(0, 0, 255));
    }

    #[test]
    fn purify_ties_resolve_blue_then_green_then_red() {
        assert_eq!(dominant_channel(Pixel::new(7, 7, 1)), Channel::Blue);
        assert_eq!(dominant_channel(Pixel::new(7, 1, 7)), Channel::Blue);
        assert_eq!(dominant_channel(Pixel::new(1, 7, 7)), Channel::Green);
        assert_eq!(dominant_channel(Pixel::gray(50)), Channel::Blue);
    }

    #[test]
    fn purify_output_has_exactly_one_full_channel() {
        let source = RasterBuffer::from_fn(8, 8, |r, c| {
            Pixel::new((r * 31) as u8, (c * 29) as u8, ((r + c) * 17) as u8)
        });
        let mut out = source.clone();
        purify(&source, &mut out);
        for p in out.pixels() {
            let full = p.channels().iter().filter(|&&v| v == 255).count();
            let empty = p.channels().iter().filter(|&&v| v == 0).count();
            assert_eq!((full, empty), (1, 2));
        }
    }

    #[test]
    fn identity_copies() {
        let source = RasterBuffer::from_fn(3, 3, |r, c| Pixel::new(r as u8, c as u8, 7));
        let mut out = RasterBuffer::new(3, 3, Pixel::WHITE);
        identity(&source, &mut out);
        assert_eq!(out, source);
    }
}
