use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cancel::CancelToken;
use crate::color::StrengthSchedule;
use crate::frame::RasterBuffer;

use super::approximate::{ApproximationOutcome, TriangleApproximator, DEFAULT_ITERATIONS};
use super::motion::MotionDetector;
use super::{edge, pixel};

/// Media the transform runs against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaMode {
    /// A single decoded still.
    Image,
    /// A live frame stream.
    Video,
}

impl FromStr for MediaMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(MediaMode::Image),
            "video" | "webcam" | "camera" => Ok(MediaMode::Video),
            other => Err(anyhow!("unknown media mode '{}'", other)),
        }
    }
}

/// Transform identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransformKind {
    Original,
    BlackAndWhite,
    Grayscale,
    Darken,
    ChannelPercentage,
    Purify,
    EdgeOutline,
    Approximate,
    MotionDetection,
}

impl TransformKind {
    pub const ALL: [TransformKind; 9] = [
        TransformKind::Original,
        TransformKind::BlackAndWhite,
        TransformKind::Grayscale,
        TransformKind::Darken,
        TransformKind::ChannelPercentage,
        TransformKind::Purify,
        TransformKind::EdgeOutline,
        TransformKind::Approximate,
        TransformKind::MotionDetection,
    ];

    /// Menu numbering: 0..=6 are shared, 7 depends on the media mode.
    pub fn from_choice(choice: u8, mode: MediaMode) -> Result<Self> {
        Ok(match (choice, mode) {
            (0, _) => TransformKind::Original,
            (1, _) => TransformKind::BlackAndWhite,
            (2, _) => TransformKind::Grayscale,
            (3, _) => TransformKind::Darken,
            (4, _) => TransformKind::ChannelPercentage,
            (5, _) => TransformKind::Purify,
            (6, _) => TransformKind::EdgeOutline,
            (7, MediaMode::Image) => TransformKind::Approximate,
            (7, MediaMode::Video) => TransformKind::MotionDetection,
            (other, _) => return Err(anyhow!("menu choice {} is not a transform", other)),
        })
    }

    /// Menu number of this transform.
    pub fn choice(self) -> u8 {
        match self {
            TransformKind::Original => 0,
            TransformKind::BlackAndWhite => 1,
            TransformKind::Grayscale => 2,
            TransformKind::Darken => 3,
            TransformKind::ChannelPercentage => 4,
            TransformKind::Purify => 5,
            TransformKind::EdgeOutline => 6,
            TransformKind::Approximate | TransformKind::MotionDetection => 7,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TransformKind::Original => "original",
            TransformKind::BlackAndWhite => "black-white",
            TransformKind::Grayscale => "grayscale",
            TransformKind::Darken => "darken",
            TransformKind::ChannelPercentage => "rgb-percent",
            TransformKind::Purify => "purify",
            TransformKind::EdgeOutline => "edge-outline",
            TransformKind::Approximate => "approximate",
            TransformKind::MotionDetection => "motion",
        }
    }

    pub fn supports(self, mode: MediaMode) -> bool {
        match self {
            TransformKind::Approximate => mode == MediaMode::Image,
            TransformKind::MotionDetection => mode == MediaMode::Video,
            _ => true,
        }
    }

    fn strategy(self) -> Strategy {
        match self {
            TransformKind::Original => Strategy::Stateless(|s, d, _| pixel::identity(s, d)),
            TransformKind::BlackAndWhite => {
                Strategy::Stateless(|s, d, cfg| pixel::black_and_white(s, d, cfg.bw_threshold))
            }
            TransformKind::Grayscale => Strategy::Stateless(|s, d, _| pixel::grayscale(s, d)),
            TransformKind::Darken => Strategy::Stateless(|s, d, cfg| pixel::darken(s, d, cfg.darken)),
            TransformKind::ChannelPercentage => Strategy::Stateless(|s, d, cfg| {
                pixel::channel_percentage(s, d, cfg.red_pct, cfg.green_pct, cfg.blue_pct)
            }),
            TransformKind::Purify => Strategy::Stateless(|s, d, _| pixel::purify(s, d)),
            TransformKind::EdgeOutline => Strategy::Stateless(|s, d, _| edge::edge_outline(s, d)),
            TransformKind::Approximate => Strategy::Approximate,
            TransformKind::MotionDetection => Strategy::Motion,
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransformKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        TransformKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| anyhow!("unknown transform '{}'", s))
    }
}

type StatelessFn = fn(&RasterBuffer, &mut RasterBuffer, &TransformSettings);

enum Strategy {
    Stateless(StatelessFn),
    Approximate,
    Motion,
}

/// Configuration values consumed by the transforms.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformSettings {
    pub bw_threshold: u8,
    /// Brightness multiplier in [0, 1].
    pub darken: f64,
    /// Percentages in [0, 150].
    pub red_pct: f64,
    pub green_pct: f64,
    pub blue_pct: f64,
    pub approximate_iterations: u32,
    /// Closeness threshold per approximation iteration.
    pub approximate_schedule: StrengthSchedule,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            bw_threshold: 0,
            darken: 1.0,
            red_pct: 100.0,
            green_pct: 100.0,
            blue_pct: 100.0,
            approximate_iterations: DEFAULT_ITERATIONS,
            approximate_schedule: StrengthSchedule::default(),
        }
    }
}

impl TransformSettings {
    /// Reject values outside the documented ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.darken) {
            return Err(anyhow!("darken constant must be within 0-1 (got {})", self.darken));
        }
        for (name, pct) in [
            ("red", self.red_pct),
            ("green", self.green_pct),
            ("blue", self.blue_pct),
        ] {
            if !(0.0..=pixel::MAX_CHANNEL_PERCENT).contains(&pct) {
                return Err(anyhow!("{} percentage must be within 0-150 (got {})", name, pct));
            }
        }
        Ok(())
    }
}

/// What a dispatched transform reports back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunReport {
    Completed,
    Approximated(ApproximationOutcome),
    Motion { moving_pixels: usize },
}

/// Routes a `TransformKind` to its implementation and owns the state that
/// outlives a single call: the motion detector's retained frame and the
/// approximator's random source.
pub struct Dispatcher {
    mode: MediaMode,
    motion: MotionDetector,
    rng: StdRng,
}

impl Dispatcher {
    pub fn new(mode: MediaMode) -> Self {
        Self::with_rng(mode, StdRng::from_entropy())
    }

    pub fn with_seed(mode: MediaMode, seed: u64) -> Self {
        Self::with_rng(mode, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(mode: MediaMode, rng: StdRng) -> Self {
        Self {
            mode,
            motion: MotionDetector::new(),
            rng,
        }
    }

    pub fn mode(&self) -> MediaMode {
        self.mode
    }

    pub fn motion_detector(&self) -> &MotionDetector {
        &self.motion
    }

    /// Run `kind` from `source` into `destination`.
    ///
    /// `on_progress` is only invoked by the approximator (once per iteration);
    /// `cancel` is only polled there too.
    pub fn run(
        &mut self,
        kind: TransformKind,
        source: &RasterBuffer,
        destination: &mut RasterBuffer,
        settings: &TransformSettings,
        cancel: &CancelToken,
        on_progress: impl FnMut(&RasterBuffer, u32),
    ) -> Result<RunReport> {
        if !kind.supports(self.mode) {
            return Err(anyhow!(
                "transform '{}' is not available in {:?} mode",
                kind,
                self.mode
            ));
        }
        source.assert_same_dimensions(destination);

        let report = match kind.strategy() {
            Strategy::Stateless(apply) => {
                apply(source, destination, settings);
                RunReport::Completed
            }
            Strategy::Approximate => {
                let outcome = TriangleApproximator::new(&mut self.rng)
                    .with_schedule(settings.approximate_schedule.clone())
                    .with_max_iterations(settings.approximate_iterations)
                    .run(source, destination, cancel, on_progress);
                RunReport::Approximated(outcome)
            }
            Strategy::Motion => RunReport::Motion {
                moving_pixels: self.motion.detect(source, destination),
            },
        };
        log::debug!("dispatch: {} -> {:?}", kind, report);
        Ok(report)
    }
}
