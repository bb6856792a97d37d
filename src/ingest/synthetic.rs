//! Synthetic video for `stub://` devices.
//!
//! Produces a static gradient background with a dark block that slides one
//! step to the right per frame and wraps around. Fully deterministic, so
//! motion detection over it has a known answer.

use anyhow::Result;

use super::{FrameSource, SourceStats};
use crate::config::DisplaySettings;
use crate::frame::{Pixel, RasterBuffer};

pub struct SyntheticSource {
    device: String,
    display: DisplaySettings,
    frame_count: u64,
    frame_limit: Option<u64>,
    connected: bool,
}

impl SyntheticSource {
    pub fn new(device: &str, display: DisplaySettings) -> Self {
        Self {
            device: device.to_string(),
            display,
            frame_count: 0,
            frame_limit: None,
            connected: false,
        }
    }

    /// End the feed after `limit` frames.
    pub fn with_frame_limit(mut self, limit: u64) -> Self {
        self.frame_limit = Some(limit);
        self
    }

    /// Side length of the moving block.
    pub fn block_size(&self) -> usize {
        (self.display.width.min(self.display.height) as usize / 5).max(1)
    }

    /// Horizontal step between frames.
    pub fn step(&self) -> usize {
        self.block_size()
    }

    fn render(&self, frame: u64) -> RasterBuffer {
        let (width, height) = (self.display.width as usize, self.display.height as usize);
        let block = self.block_size();
        let span = width.saturating_sub(block).max(1);
        let left = (frame as usize * self.step()) % span;
        let top = height.saturating_sub(block) / 2;

        RasterBuffer::from_fn(width, height, |row, col| {
            let inside = (top..top + block).contains(&row) && (left..left + block).contains(&col);
            if inside {
                Pixel::new(20, 20, 20)
            } else {
                Pixel::from_rgb(
                    (col * 255 / width.max(1)) as u8,
                    (row * 255 / height.max(1)) as u8,
                    200,
                )
            }
        })
    }
}

impl FrameSource for SyntheticSource {
    fn connect(&mut self) -> Result<()> {
        self.connected = true;
        log::info!(
            "SyntheticSource: connected to {} ({}x{})",
            self.device,
            self.display.width,
            self.display.height
        );
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<RasterBuffer>> {
        if self.frame_limit.is_some_and(|limit| self.frame_count >= limit) {
            return Ok(None);
        }
        let frame = self.render(self.frame_count);
        self.frame_count += 1;
        Ok(Some(frame))
    }

    fn is_healthy(&self) -> bool {
        self.connected
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            frames_captured: self.frame_count,
            origin: self.device.clone(),
        }
    }
}
