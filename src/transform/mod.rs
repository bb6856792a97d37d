//! Image transforms.
//!
//! Every transform reads a source `RasterBuffer` and writes a destination of
//! identical dimensions. The pixel transforms and the edge outline are pure
//! functions; the approximator and the motion detector carry state, which the
//! `Dispatcher` owns between calls.

pub mod approximate;
pub mod dispatch;
pub mod edge;
pub mod motion;
pub mod pixel;

pub use approximate::{ApproximationOutcome, Stroke, TriangleApproximator, DEFAULT_ITERATIONS};
pub use dispatch::{Dispatcher, MediaMode, RunReport, TransformKind, TransformSettings};
pub use edge::EdgeDetector;
pub use motion::MotionDetector;
