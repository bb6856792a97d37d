//! Still image source.
//!
//! Decodes a local file once on `connect`, resizes it to the display size and
//! then hands out the same still on every `next_frame`.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

use super::{fit_to_display, FrameSource, SourceStats};
use crate::config::DisplaySettings;
use crate::frame::RasterBuffer;

pub struct ImageFileSource {
    path: PathBuf,
    display: DisplaySettings,
    still: Option<RasterBuffer>,
    frames_served: u64,
}

impl ImageFileSource {
    pub fn new(path: impl Into<PathBuf>, display: DisplaySettings) -> Self {
        Self {
            path: path.into(),
            display,
            still: None,
            frames_served: 0,
        }
    }

    /// Decode and resize `path` in one call.
    pub fn load(path: &Path, display: DisplaySettings) -> Result<RasterBuffer> {
        let mut source = Self::new(path, display);
        source.connect()?;
        source
            .next_frame()?
            .ok_or_else(|| anyhow!("image {} produced no frame", path.display()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for ImageFileSource {
    fn connect(&mut self) -> Result<()> {
        let decoded = image::open(&self.path)
            .with_context(|| format!("failed to decode image {}", self.path.display()))?
            .to_rgb8();
        log::info!(
            "ImageFileSource: loaded {} ({}x{} -> {}x{})",
            self.path.display(),
            decoded.width(),
            decoded.height(),
            self.display.width,
            self.display.height
        );
        self.still = Some(fit_to_display(&decoded, self.display)?);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<RasterBuffer>> {
        let still = self
            .still
            .as_ref()
            .ok_or_else(|| anyhow!("image source not connected"))?;
        self.frames_served += 1;
        Ok(Some(still.clone()))
    }

    fn is_healthy(&self) -> bool {
        self.still.is_some()
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            frames_captured: self.frames_served,
            origin: self.path.display().to_string(),
        }
    }
}
