use crate::frame::{Pixel, RasterBuffer};

/// Summed per-channel difference above which a pixel counts as moving.
pub const MOTION_THRESHOLD: u32 = 110;

/// Frame-differencing motion detector.
///
/// Holds exactly one retained frame. Each call compares against the frame from
/// the previous call, then replaces it; there is no fixed background reference.
#[derive(Debug, Default)]
pub struct MotionDetector {
    previous: Option<RasterBuffer>,
}

impl MotionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once at least one frame has been observed.
    pub fn has_reference(&self) -> bool {
        self.previous.is_some()
    }

    /// Forget the retained frame (e.g. after the video source restarts).
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Classify `frame` against the retained frame into `destination`.
    ///
    /// The first call adopts `frame` as the reference and yields all black.
    /// Returns the number of moving (white) pixels.
    pub fn detect(&mut self, frame: &RasterBuffer, destination: &mut RasterBuffer) -> usize {
        frame.assert_same_dimensions(destination);

        if let Some(stale) = self.previous.as_ref().filter(|p| !p.same_dimensions(frame)) {
            log::debug!(
                "MotionDetector: frame size changed from {}x{} to {}x{}, resetting reference",
                stale.width(),
                stale.height(),
                frame.width(),
                frame.height()
            );
            self.previous = None;
        }
        let previous = self.previous.get_or_insert_with(|| frame.clone());

        let mut moving = 0;
        for ((out, current), prior) in destination
            .pixels_mut()
            .iter_mut()
            .zip(frame.pixels())
            .zip(previous.pixels())
        {
            if frame_difference(*current, *prior) > MOTION_THRESHOLD {
                *out = Pixel::WHITE;
                moving += 1;
            } else {
                *out = Pixel::BLACK;
            }
        }

        previous.copy_from(frame);
        moving
    }
}

/// `|B-B'| + |G-G'| + |R-R'|`.
#[inline]
pub fn frame_difference(a: Pixel, b: Pixel) -> u32 {
    a.b.abs_diff(b.b) as u32 + a.g.abs_diff(b.g) as u32 + a.r.abs_diff(b.r) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(fill: Pixel) -> RasterBuffer {
        RasterBuffer::new(5, 4, fill)
    }

    #[test]
    fn first_frame_is_all_black() {
        let mut detector = MotionDetector::new();
        assert!(!detector.has_reference());
        let current = RasterBuffer::from_fn(5, 4, |r, c| Pixel::new((r * 50) as u8, (c * 60) as u8, 9));
        let mut out = frame(Pixel::WHITE);
        assert_eq!(detector.detect(&current, &mut out), 0);
        assert_eq!(out.count(Pixel::BLACK), out.len());
        assert!(detector.has_reference());
    }

    #[test]
    fn single_pixel_change_just_over_threshold() {
        let mut detector = MotionDetector::new();
        let base = frame(Pixel::new(100, 100, 100));
        let mut out = frame(Pixel::BLACK);
        detector.detect(&base, &mut out);

        let mut changed = base.clone();
        changed.set(2, 3, Pixel::new(137, 137, 137)); // 37 * 3 = 111
        assert_eq!(detector.detect(&changed, &mut out), 1);
        assert_eq!(out.get(2, 3), Pixel::WHITE);
        assert_eq!(out.count(Pixel::BLACK), out.len() - 1);
    }

    #[test]
    fn threshold_is_strict() {
        let mut detector = MotionDetector::new();
        let mut out = frame(Pixel::BLACK);
        detector.detect(&frame(Pixel::new(0, 0, 0)), &mut out);
        assert_eq!(detector.detect(&frame(Pixel::new(110, 0, 0)), &mut out), 0);
    }

    #[test]
    fn differencing_is_frame_to_frame() {
        let mut detector = MotionDetector::new();
        let mut out = frame(Pixel::BLACK);
        detector.detect(&frame(Pixel::BLACK), &mut out);
        assert_eq!(detector.detect(&frame(Pixel::WHITE), &mut out), 20);
        // Same frame again: compared against the previous white frame, not the first.
        assert_eq!(detector.detect(&frame(Pixel::WHITE), &mut out), 0);
    }

    #[test]
    fn reset_forgets_reference() {
        let mut detector = MotionDetector::new();
        let mut out = frame(Pixel::BLACK);
        detector.detect(&frame(Pixel::BLACK), &mut out);
        detector.reset();
        assert!(!detector.has_reference());
        assert_eq!(detector.detect(&frame(Pixel::WHITE), &mut out), 0);
    }

    #[test]
    fn resized_stream_restarts_reference() {
        let mut detector = MotionDetector::new();
        let mut out = frame(Pixel::BLACK);
        detector.detect(&frame(Pixel::BLACK), &mut out);
        let bigger = RasterBuffer::new(6, 6, Pixel::WHITE);
        let mut big_out = RasterBuffer::new(6, 6, Pixel::WHITE);
        assert_eq!(detector.detect(&bigger, &mut big_out), 0);
    }

    #[test]
    fn difference_is_symmetric() {
        let a = Pixel::new(10, 200, 30);
        let b = Pixel::new(40, 100, 30);
        assert_eq!(frame_difference(a, b), 130);
        assert_eq!(frame_difference(b, a), 130);
    }
}
