//! Frame sources feeding the transforms.
//!
//! - Still images decoded from disk (`image_file`)
//! - Synthetic video for `stub://` devices (`synthetic`)
//! - Local V4L2 cameras (feature: camera-v4l2)
//! - The `imageNames.txt` catalog used to pick a still by number (`catalog`)
//!
//! Every source resizes to the configured display size before handing a
//! `RasterBuffer` over, so transforms always see one fixed geometry. Sources
//! never write frames back to disk.

pub mod catalog;
pub mod image_file;
pub mod normalize;
pub mod synthetic;
#[cfg(feature = "camera-v4l2")]
pub mod v4l2;

use anyhow::{anyhow, Result};
use image::imageops::FilterType;
use image::RgbImage;

use crate::config::{CameraSettings, DisplaySettings};
use crate::frame::RasterBuffer;

pub use catalog::ImageCatalog;
pub use image_file::ImageFileSource;
pub use synthetic::SyntheticSource;
#[cfg(feature = "camera-v4l2")]
pub use v4l2::V4l2Source;

/// Filter used for every display resize.
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// A producer of frames.
pub trait FrameSource {
    /// Open the underlying device or file.
    fn connect(&mut self) -> Result<()>;

    /// Next frame, or `None` once the feed has ended.
    fn next_frame(&mut self) -> Result<Option<RasterBuffer>>;

    fn is_healthy(&self) -> bool;

    fn stats(&self) -> SourceStats;
}

/// Statistics for a frame source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceStats {
    pub frames_captured: u64,
    pub origin: String,
}

/// Resize a decoded RGB image to the display size and convert it.
pub fn fit_to_display(image: &RgbImage, display: DisplaySettings) -> Result<RasterBuffer> {
    if display.width == 0 || display.height == 0 {
        return Err(anyhow!("display size must be non-zero"));
    }
    let resized = if image.dimensions() == (display.width, display.height) {
        image.clone()
    } else {
        image::imageops::resize(image, display.width, display.height, RESIZE_FILTER)
    };
    RasterBuffer::from_rgb_bytes(
        display.width as usize,
        display.height as usize,
        resized.as_raw(),
    )
}

/// Open the camera named in `camera`. `stub://` devices are synthetic; anything
/// else needs the camera-v4l2 feature.
pub fn open_camera(camera: &CameraSettings, display: DisplaySettings) -> Result<Box<dyn FrameSource>> {
    if camera.device.starts_with("stub://") {
        return Ok(Box::new(SyntheticSource::new(&camera.device, display)));
    }
    #[cfg(feature = "camera-v4l2")]
    {
        Ok(Box::new(V4l2Source::new(camera.clone(), display)))
    }
    #[cfg(not(feature = "camera-v4l2"))]
    {
        Err(anyhow!(
            "camera {} requires the camera-v4l2 feature",
            camera.device
        ))
    }
}
