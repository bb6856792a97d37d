//! manipulate - apply one transform to a still image or a camera feed
//!
//! Image mode decodes the chosen file (directly or by catalog number), resizes
//! it to the display size and runs the transform once. Video mode pulls frames
//! from the configured camera and runs the transform on each until the feed
//! ends, the frame limit is hit or Ctrl-C is pressed.
//!
//! Results are reported through the log; nothing is written to disk.

use anyhow::{anyhow, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use raster_manip::ingest::{self, FrameSource};
use raster_manip::ui::Ui;
use raster_manip::{
    CancelToken, Dispatcher, ImageCatalog, ImageFileSource, ManipConfig, MediaMode, Pixel,
    RasterBuffer, RunReport, TransformKind, TransformSettings,
};

/// Bounded wait between video frames.
const FRAME_POLL: Duration = Duration::from_millis(10);

#[derive(Parser, Debug)]
#[command(
    name = "manipulate",
    about = "Apply an image transform to a still image or a camera feed"
)]
struct Args {
    /// Media mode (image|video)
    #[arg(long, default_value = "image")]
    mode: String,

    /// Image file to load (image mode)
    #[arg(long, value_name = "PATH", conflicts_with = "catalog_entry")]
    image: Option<PathBuf>,

    /// 1-based entry of the image catalog (image mode)
    #[arg(long, value_name = "N")]
    catalog_entry: Option<usize>,

    /// Camera device, e.g. /dev/video0 or stub://camera (video mode)
    #[arg(long, value_name = "DEVICE")]
    camera: Option<String>,

    /// Transform name (original, black-white, grayscale, darken, rgb-percent,
    /// purify, edge-outline, approximate, motion)
    #[arg(long, value_name = "NAME", conflicts_with = "choice")]
    transform: Option<String>,

    /// Menu number 0-7 (7 is approximate for images, motion for video)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=7))]
    choice: Option<u8>,

    /// Black/white threshold (0-255)
    #[arg(long)]
    threshold: Option<i64>,

    /// Darken constant (0-1)
    #[arg(long)]
    darken: Option<f64>,

    /// Red percentage (0-150)
    #[arg(long)]
    red: Option<f64>,

    /// Green percentage (0-150)
    #[arg(long)]
    green: Option<f64>,

    /// Blue percentage (0-150)
    #[arg(long)]
    blue: Option<f64>,

    /// Seed for the triangle approximation
    #[arg(long)]
    seed: Option<u64>,

    /// Stop video mode after this many frames
    #[arg(long, value_name = "N")]
    frames: Option<u64>,

    /// UI mode for stderr progress (auto|plain|pretty)
    #[arg(long, default_value = "auto", value_name = "MODE")]
    ui: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let is_tty = std::io::stderr().is_terminal();
    let ui = Ui::from_args(Some(&args.ui), is_tty, false);

    let mode: MediaMode = args.mode.parse()?;
    let kind = select_transform(&args, mode)?;
    if !kind.supports(mode) {
        return Err(anyhow!("transform '{}' is not available in {:?} mode", kind, mode));
    }

    let cfg = {
        let _stage = ui.stage("Load configuration");
        let mut cfg = ManipConfig::load()?;
        apply_overrides(&mut cfg, &args);
        cfg.validate()?;
        cfg
    };
    let settings = cfg.transform_settings()?;

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .map_err(|e| anyhow!("error setting Ctrl-C handler: {}", e))?;

    let mut dispatcher = match cfg.approximate.seed {
        Some(seed) => Dispatcher::with_seed(mode, seed),
        None => Dispatcher::new(mode),
    };

    match mode {
        MediaMode::Image => run_image(&args, &cfg, &ui, &mut dispatcher, kind, &settings, &cancel),
        MediaMode::Video => run_video(&args, &cfg, &ui, &mut dispatcher, kind, &settings, &cancel),
    }
}

fn select_transform(args: &Args, mode: MediaMode) -> Result<TransformKind> {
    match (&args.transform, args.choice) {
        (Some(name), _) => name.parse(),
        (None, Some(choice)) => TransformKind::from_choice(choice, mode),
        (None, None) => {
            let menu: Vec<String> = TransformKind::ALL
                .into_iter()
                .filter(|kind| kind.supports(mode))
                .map(|kind| format!("{}: {}", kind.choice(), kind))
                .collect();
            Err(anyhow!(
                "pick a transform with --transform or --choice ({})",
                menu.join(", ")
            ))
        }
    }
}

fn apply_overrides(cfg: &mut ManipConfig, args: &Args) {
    if let Some(threshold) = args.threshold {
        cfg.transform.bw_threshold = threshold;
    }
    if let Some(darken) = args.darken {
        cfg.transform.darken = darken;
    }
    if let Some(red) = args.red {
        cfg.transform.red_pct = red;
    }
    if let Some(green) = args.green {
        cfg.transform.green_pct = green;
    }
    if let Some(blue) = args.blue {
        cfg.transform.blue_pct = blue;
    }
    if let Some(seed) = args.seed {
        cfg.approximate.seed = Some(seed);
    }
    if let Some(camera) = &args.camera {
        cfg.camera.device = camera.clone();
    }
}

fn resolve_image(args: &Args, cfg: &ManipConfig) -> Result<PathBuf> {
    if let Some(path) = &args.image {
        return Ok(path.clone());
    }
    let catalog = ImageCatalog::load(&cfg.catalog_path, &cfg.image_dir)?;
    match args.catalog_entry {
        Some(number) => catalog.resolve(number),
        None => {
            for line in catalog.listing() {
                println!("{line}");
            }
            Err(anyhow!("pick an image with --image or --catalog-entry"))
        }
    }
}

fn run_image(
    args: &Args,
    cfg: &ManipConfig,
    ui: &Ui,
    dispatcher: &mut Dispatcher,
    kind: TransformKind,
    settings: &TransformSettings,
    cancel: &CancelToken,
) -> Result<()> {
    let path = resolve_image(args, cfg)?;
    let source = {
        let _stage = ui.stage(&format!("Decode {}", path.display()));
        ImageFileSource::load(&path, cfg.display)?
    };
    let mut destination = source.clone();

    let report = if kind == TransformKind::Approximate {
        let mut progress = ui.progress("approximate", settings.approximate_iterations as u64);
        let report = dispatcher.run(kind, &source, &mut destination, settings, cancel, |_, i| {
            progress.set_position(i as u64 + 1)
        })?;
        progress.finish(if cancel.is_cancelled() { "cancelled" } else { "done" });
        report
    } else {
        let _stage = ui.stage(&format!("Apply {}", kind));
        dispatcher.run(kind, &source, &mut destination, settings, cancel, |_, _| {})?
    };

    log::info!(
        "{} on {} ({}x{}): {:?}",
        kind,
        path.display(),
        destination.width(),
        destination.height(),
        report
    );
    log_summary(&destination);
    Ok(())
}

fn run_video(
    args: &Args,
    cfg: &ManipConfig,
    ui: &Ui,
    dispatcher: &mut Dispatcher,
    kind: TransformKind,
    settings: &TransformSettings,
    cancel: &CancelToken,
) -> Result<()> {
    let mut source = {
        let _stage = ui.stage(&format!("Open camera {}", cfg.camera.device));
        let mut source = ingest::open_camera(&cfg.camera, cfg.display)?;
        source.connect()?;
        source
    };

    let mut destination = RasterBuffer::new(
        cfg.display.width as usize,
        cfg.display.height as usize,
        Pixel::BLACK,
    );
    let mut frames = 0u64;
    let mut moving_total = 0usize;
    log::info!("{} running on {} (Ctrl-C to stop)", kind, cfg.camera.device);

    while !cancel.is_cancelled() {
        if args.frames.is_some_and(|limit| frames >= limit) {
            break;
        }
        let Some(frame) = source.next_frame()? else {
            log::info!("camera feed ended");
            break;
        };
        if !frame.same_dimensions(&destination) {
            destination = RasterBuffer::new(frame.width(), frame.height(), Pixel::BLACK);
        }
        let report = dispatcher.run(kind, &frame, &mut destination, settings, cancel, |_, _| {})?;
        if let RunReport::Motion { moving_pixels } = report {
            moving_total += moving_pixels;
            log::debug!("frame {}: {} moving pixels", frames, moving_pixels);
        }
        frames += 1;
        if !source.is_healthy() {
            log::warn!("camera {} reports unhealthy", cfg.camera.device);
        }
        std::thread::sleep(FRAME_POLL);
    }

    let stats = source.stats();
    log::info!(
        "{}: {} frames from {} ({} captured)",
        kind,
        frames,
        stats.origin,
        stats.frames_captured
    );
    if kind == TransformKind::MotionDetection && frames > 0 {
        log::info!(
            "motion: {} moving pixels total, {:.1} per frame",
            moving_total,
            moving_total as f64 / frames as f64
        );
    }
    log_summary(&destination);
    Ok(())
}

fn log_summary(buffer: &RasterBuffer) {
    log::info!(
        "last frame: {} white, {} black of {} pixels",
        buffer.count(Pixel::WHITE),
        buffer.count(Pixel::BLACK),
        buffer.len()
    );
}
