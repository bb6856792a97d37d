//! Raster manipulation toolkit.
//!
//! Applies a fixed set of image transforms to a still image or to a live
//! camera feed.
//!
//! # Architecture
//!
//! The core never touches files, devices or windows. It consumes and produces
//! `RasterBuffer`s; everything else is a collaborator:
//!
//! 1. **Ingest** decodes a file or captures a frame and resizes it to the
//!    display size.
//! 2. **Transform** reads the source buffer and writes a destination buffer of
//!    identical dimensions.
//! 3. **Display** is whatever the caller does with the destination (the
//!    binaries log statistics; nothing is written back to disk).
//!
//! # Module Structure
//!
//! - `frame`: `Pixel` and `RasterBuffer`
//! - `color`: luminosity, color distance, approximation strength schedule
//! - `transform`: per-pixel transforms, edge outline, triangle approximation,
//!   motion detection and the `Dispatcher` that routes between them
//! - `cancel`: cooperative cancellation shared with Ctrl-C handlers
//! - `ingest`: image files, synthetic video, V4L2 cameras, image catalog
//! - `config`: layered configuration (defaults, file, environment)
//! - `ui`: stderr stage spinners and progress bars

pub mod cancel;
pub mod color;
pub mod config;
pub mod frame;
pub mod ingest;
pub mod transform;
pub mod ui;

pub use cancel::CancelToken;
pub use color::StrengthSchedule;
pub use config::{CameraSettings, DisplaySettings, ManipConfig};
pub use frame::{Pixel, RasterBuffer};
pub use ingest::{FrameSource, ImageCatalog, ImageFileSource, SourceStats, SyntheticSource};
pub use transform::{
    ApproximationOutcome, Dispatcher, EdgeDetector, MediaMode, MotionDetector, RunReport,
    TransformKind, TransformSettings, TriangleApproximator,
};
