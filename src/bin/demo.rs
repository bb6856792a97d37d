//! demo - end-to-end synthetic run of every transform

use anyhow::{anyhow, Result};
use clap::Parser;
use std::io::IsTerminal;

use raster_manip::ingest::FrameSource;
use raster_manip::ui::Ui;
use raster_manip::{
    CancelToken, Dispatcher, DisplaySettings, MediaMode, Pixel, RasterBuffer, RunReport,
    SyntheticSource, TransformKind, TransformSettings,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Display width of the synthetic source.
    #[arg(long, default_value_t = 550)]
    width: u32,
    /// Display height of the synthetic source.
    #[arg(long, default_value_t = 350)]
    height: u32,
    /// Frames to push through video mode.
    #[arg(long, default_value_t = 30)]
    frames: u64,
    /// Iterations for the triangle approximation.
    #[arg(long, default_value_t = 2_000)]
    iterations: u32,
    /// Deterministic seed for the approximation.
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// UI mode for stderr progress (auto|plain|pretty)
    #[arg(long, default_value = "auto", value_name = "MODE")]
    ui: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if args.width == 0 || args.height == 0 {
        return Err(anyhow!("width and height must be >= 1"));
    }
    let ui = Ui::from_args(Some(&args.ui), std::io::stderr().is_terminal(), false);
    let display = DisplaySettings {
        width: args.width,
        height: args.height,
    };
    let settings = TransformSettings {
        bw_threshold: 127,
        darken: 0.5,
        red_pct: 120.0,
        green_pct: 80.0,
        blue_pct: 100.0,
        approximate_iterations: args.iterations,
        ..TransformSettings::default()
    };
    settings.validate()?;
    let cancel = CancelToken::new();

    let still = {
        let _stage = ui.stage("Render synthetic still");
        let mut source = SyntheticSource::new("stub://demo-still", display);
        source.connect()?;
        source
            .next_frame()?
            .ok_or_else(|| anyhow!("synthetic source produced no frame"))?
    };

    println!("demo summary ({}x{}):", display.width, display.height);

    let mut images = Dispatcher::with_seed(MediaMode::Image, args.seed);
    for kind in TransformKind::ALL.into_iter().filter(|k| k.supports(MediaMode::Image)) {
        let mut out = still.clone();
        let report = if kind == TransformKind::Approximate {
            let mut progress = ui.progress("approximate", args.iterations as u64);
            let report = images.run(kind, &still, &mut out, &settings, &cancel, |_, i| {
                progress.set_position(i as u64 + 1)
            })?;
            progress.finish("done");
            report
        } else {
            let _stage = ui.stage(&format!("Image: {}", kind));
            images.run(kind, &still, &mut out, &settings, &cancel, |_, _| {})?
        };
        println!("  image {:<13} {}", kind.to_string(), describe(&report, &out));
    }

    let mut video = Dispatcher::new(MediaMode::Video);
    let mut source = SyntheticSource::new("stub://demo-video", display).with_frame_limit(args.frames);
    source.connect()?;
    let mut out = RasterBuffer::new(display.width as usize, display.height as usize, Pixel::BLACK);
    let mut moving = 0usize;
    {
        let _stage = ui.stage("Video: motion");
        while let Some(frame) = source.next_frame()? {
            if let RunReport::Motion { moving_pixels } = video.run(
                TransformKind::MotionDetection,
                &frame,
                &mut out,
                &settings,
                &cancel,
                |_, _| {},
            )? {
                moving += moving_pixels;
            }
        }
    }
    println!(
        "  video {:<13} {} frames, {} moving pixels",
        TransformKind::MotionDetection.to_string(),
        source.stats().frames_captured,
        moving
    );

    Ok(())
}

fn describe(report: &RunReport, out: &RasterBuffer) -> String {
    match report {
        RunReport::Completed => format!(
            "{} white / {} black pixels",
            out.count(Pixel::WHITE),
            out.count(Pixel::BLACK)
        ),
        RunReport::Approximated(outcome) => format!(
            "{} iterations, {} pixels left white",
            outcome.iterations,
            out.count(Pixel::WHITE)
        ),
        RunReport::Motion { moving_pixels } => format!("{} moving pixels", moving_pixels),
    }
}
