//! V4L2 camera source.
//!
//! Captures from a local device node (e.g. /dev/video0), converts RGB3 or NV12
//! captures to RGB and resizes to the display size. Frames are handed over
//! in-memory only.

use anyhow::{anyhow, Context, Result};
use ouroboros::self_referencing;
use std::time::{Duration, Instant};

use super::normalize::{to_rgb_image, CaptureFormat};
use super::{fit_to_display, FrameSource, SourceStats};
use crate::config::{CameraSettings, DisplaySettings};
use crate::frame::RasterBuffer;

/// Capture size requested from the device before resizing.
const CAPTURE_WIDTH: u32 = 640;
const CAPTURE_HEIGHT: u32 = 480;

pub struct V4l2Source {
    camera: CameraSettings,
    display: DisplaySettings,
    state: Option<CaptureState>,
    format: CaptureFormat,
    frame_count: u64,
    last_frame_at: Option<Instant>,
    last_error: Option<String>,
    active_width: u32,
    active_height: u32,
}

#[self_referencing]
struct CaptureState {
    device: v4l::Device,
    #[borrows(mut device)]
    #[covariant]
    stream: v4l::prelude::MmapStream<'this, v4l::Device>,
}

impl V4l2Source {
    pub fn new(camera: CameraSettings, display: DisplaySettings) -> Self {
        Self {
            camera,
            display,
            state: None,
            format: CaptureFormat::Rgb24,
            frame_count: 0,
            last_frame_at: None,
            last_error: None,
            active_width: CAPTURE_WIDTH,
            active_height: CAPTURE_HEIGHT,
        }
    }

    fn health_grace(&self) -> Duration {
        let base_ms = (1000 / self.camera.target_fps.max(1)).saturating_mul(6);
        Duration::from_millis(base_ms.max(2_000) as u64)
    }
}

impl FrameSource for V4l2Source {
    fn connect(&mut self) -> Result<()> {
        use v4l::buffer::Type;
        use v4l::video::Capture;

        let mut device = v4l::Device::with_path(&self.camera.device)
            .with_context(|| format!("open v4l2 device {}", self.camera.device))?;
        let mut format = device.format().context("read v4l2 format")?;
        format.width = CAPTURE_WIDTH;
        format.height = CAPTURE_HEIGHT;
        format.fourcc = v4l::FourCC::new(b"RGB3");

        let format = match device.set_format(&format) {
            Ok(format) => format,
            Err(err) => {
                log::warn!(
                    "V4l2Source: failed to set format on {}: {}",
                    self.camera.device,
                    err
                );
                device
                    .format()
                    .context("read v4l2 format after set failure")?
            }
        };
        self.format = CaptureFormat::from_fourcc(&format.fourcc.repr).ok_or_else(|| {
            anyhow!(
                "v4l2 device {} negotiated unsupported format {}",
                self.camera.device,
                format.fourcc
            )
        })?;

        let params = v4l::video::capture::Parameters::with_fps(self.camera.target_fps);
        if let Err(err) = device.set_params(&params) {
            log::warn!(
                "V4l2Source: failed to set fps on {}: {}",
                self.camera.device,
                err
            );
        }

        self.active_width = format.width;
        self.active_height = format.height;
        self.last_error = None;

        let state = CaptureStateBuilder {
            device,
            stream_builder: |device| {
                v4l::prelude::MmapStream::with_buffers(device, Type::VideoCapture, 4)
                    .map_err(|err| anyhow::Error::new(err).context("create v4l2 buffer stream"))
            },
        }
        .try_build()
        .map_err(|err| {
            self.last_error = Some(err.to_string());
            err
        })?;
        self.state = Some(state);

        log::info!(
            "V4l2Source: connected to {} ({}x{} {:?})",
            self.camera.device,
            self.active_width,
            self.active_height,
            self.format
        );
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<RasterBuffer>> {
        use v4l::io::traits::CaptureStream;

        let state = self.state.as_mut().context("v4l2 device not connected")?;
        let capture = state
            .with_mut(|fields| fields.stream.next().map(|(buf, _meta)| buf.to_vec()))
            .map_err(|err| {
                self.last_error = Some(err.to_string());
                anyhow::Error::new(err).context("capture v4l2 frame")
            })?;

        self.frame_count += 1;
        self.last_frame_at = Some(Instant::now());

        let image = to_rgb_image(&capture, self.active_width, self.active_height, self.format)?;
        fit_to_display(&image, self.display).map(Some)
    }

    fn is_healthy(&self) -> bool {
        if self.last_error.is_some() {
            return false;
        }
        let Some(last_frame_at) = self.last_frame_at else {
            return true;
        };
        last_frame_at.elapsed() <= self.health_grace()
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            frames_captured: self.frame_count,
            origin: self.camera.device.clone(),
        }
    }
}
