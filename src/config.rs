use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::color::StrengthSchedule;
use crate::transform::{TransformSettings, DEFAULT_ITERATIONS};

const DEFAULT_DISPLAY_WIDTH: u32 = 550;
const DEFAULT_DISPLAY_HEIGHT: u32 = 350;
const DEFAULT_IMAGE_DIR: &str = "images";
const DEFAULT_CATALOG_PATH: &str = "imageNames.txt";
const DEFAULT_CAMERA_DEVICE: &str = "stub://camera";
const DEFAULT_CAMERA_FPS: u32 = 10;

#[derive(Debug, Deserialize, Default)]
struct ManipConfigFile {
    display: Option<DisplayConfigFile>,
    image_dir: Option<PathBuf>,
    catalog_path: Option<PathBuf>,
    camera: Option<CameraConfigFile>,
    transform: Option<TransformConfigFile>,
    approximate: Option<ApproximateConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct DisplayConfigFile {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    device: Option<String>,
    target_fps: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct TransformConfigFile {
    bw_threshold: Option<i64>,
    darken: Option<f64>,
    red_pct: Option<f64>,
    green_pct: Option<f64>,
    blue_pct: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct ApproximateConfigFile {
    seed: Option<u64>,
    iterations: Option<u32>,
    schedule: Option<Vec<(u32, u32)>>,
}

#[derive(Debug, Clone)]
pub struct ManipConfig {
    pub display: DisplaySettings,
    pub image_dir: PathBuf,
    pub catalog_path: PathBuf,
    pub camera: CameraSettings,
    pub transform: TransformValues,
    pub approximate: ApproximateSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySettings {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct CameraSettings {
    pub device: String,
    pub target_fps: u32,
}

/// Raw transform values as loaded; range-checked by `validate`.
#[derive(Debug, Clone)]
pub struct TransformValues {
    pub bw_threshold: i64,
    pub darken: f64,
    pub red_pct: f64,
    pub green_pct: f64,
    pub blue_pct: f64,
}

#[derive(Debug, Clone)]
pub struct ApproximateSettings {
    pub seed: Option<u64>,
    pub iterations: u32,
    /// `(first iteration, strength)` steps; `None` keeps the built-in schedule.
    pub schedule: Option<Vec<(u32, u32)>>,
}

impl Default for ManipConfig {
    fn default() -> Self {
        Self::from_file(ManipConfigFile::default())
    }
}

impl ManipConfig {
    /// Defaults, then the file named by `RASTER_CONFIG`, then `RASTER_*`
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("RASTER_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) if !path.trim().is_empty() => Some(read_config_file(Path::new(path))?),
            _ => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: ManipConfigFile) -> Self {
        let display = DisplaySettings {
            width: file
                .display
                .as_ref()
                .and_then(|display| display.width)
                .unwrap_or(DEFAULT_DISPLAY_WIDTH),
            height: file
                .display
                .as_ref()
                .and_then(|display| display.height)
                .unwrap_or(DEFAULT_DISPLAY_HEIGHT),
        };
        let camera = CameraSettings {
            device: file
                .camera
                .as_ref()
                .and_then(|camera| camera.device.clone())
                .unwrap_or_else(|| DEFAULT_CAMERA_DEVICE.to_string()),
            target_fps: file
                .camera
                .as_ref()
                .and_then(|camera| camera.target_fps)
                .unwrap_or(DEFAULT_CAMERA_FPS),
        };
        let transform = file.transform.unwrap_or_default();
        let defaults = TransformSettings::default();
        let transform = TransformValues {
            bw_threshold: transform
                .bw_threshold
                .unwrap_or(defaults.bw_threshold as i64),
            darken: transform.darken.unwrap_or(defaults.darken),
            red_pct: transform.red_pct.unwrap_or(defaults.red_pct),
            green_pct: transform.green_pct.unwrap_or(defaults.green_pct),
            blue_pct: transform.blue_pct.unwrap_or(defaults.blue_pct),
        };
        let approximate = file.approximate.unwrap_or_default();
        let approximate = ApproximateSettings {
            seed: approximate.seed,
            iterations: approximate.iterations.unwrap_or(DEFAULT_ITERATIONS),
            schedule: approximate.schedule,
        };
        Self {
            display,
            image_dir: file
                .image_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE_DIR)),
            catalog_path: file
                .catalog_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH)),
            camera,
            transform,
            approximate,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(width) = env_parse::<u32>("RASTER_DISPLAY_WIDTH")? {
            self.display.width = width;
        }
        if let Some(height) = env_parse::<u32>("RASTER_DISPLAY_HEIGHT")? {
            self.display.height = height;
        }
        if let Ok(dir) = std::env::var("RASTER_IMAGE_DIR") {
            if !dir.trim().is_empty() {
                self.image_dir = PathBuf::from(dir);
            }
        }
        if let Ok(device) = std::env::var("RASTER_CAMERA_DEVICE") {
            if !device.trim().is_empty() {
                self.camera.device = device;
            }
        }
        if let Some(fps) = env_parse::<u32>("RASTER_CAMERA_FPS")? {
            self.camera.target_fps = fps;
        }
        if let Some(threshold) = env_parse::<i64>("RASTER_BW_THRESHOLD")? {
            self.transform.bw_threshold = threshold;
        }
        if let Some(darken) = env_parse::<f64>("RASTER_DARKEN")? {
            self.transform.darken = darken;
        }
        if let Some(seed) = env_parse::<u64>("RASTER_SEED")? {
            self.approximate.seed = Some(seed);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.display.width == 0 || self.display.height == 0 {
            return Err(anyhow!(
                "display size must be non-zero (got {}x{})",
                self.display.width,
                self.display.height
            ));
        }
        if self.camera.target_fps == 0 {
            return Err(anyhow!("camera target_fps must be greater than zero"));
        }
        if !(0..=255).contains(&self.transform.bw_threshold) {
            return Err(anyhow!(
                "bw_threshold must be within 0-255 (got {})",
                self.transform.bw_threshold
            ));
        }
        self.transform_settings()?;
        Ok(())
    }

    /// Core settings for the dispatcher.
    pub fn transform_settings(&self) -> Result<TransformSettings> {
        let bw_threshold = u8::try_from(self.transform.bw_threshold)
            .map_err(|_| anyhow!("bw_threshold must be within 0-255"))?;
        let approximate_schedule = match &self.approximate.schedule {
            Some(steps) => StrengthSchedule::new(steps.clone()).ok_or_else(|| {
                anyhow!(
                    "approximate schedule must start at iteration 0, ascend by iteration \
                     and never increase strength (got {:?})",
                    steps
                )
            })?,
            None => StrengthSchedule::default(),
        };
        let settings = TransformSettings {
            bw_threshold,
            darken: self.transform.darken,
            red_pct: self.transform.red_pct,
            green_pct: self.transform.green_pct,
            blue_pct: self.transform.blue_pct,
            approximate_iterations: self.approximate.iterations,
            approximate_schedule,
        };
        settings.validate()?;
        Ok(settings)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| anyhow!("{} has an invalid value '{}'", name, value)),
        _ => Ok(None),
    }
}

fn read_config_file(path: &Path) -> Result<ManipConfigFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);
    let cfg = if is_toml {
        toml::from_str(&raw).map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}
