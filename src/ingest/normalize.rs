//! Capture format conversion into packed RGB24.

use anyhow::{anyhow, Result};
use image::RgbImage;

/// Pixel layouts a capture device may hand back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureFormat {
    /// Packed 8-bit R, G, B.
    Rgb24,
    /// Full-resolution Y plane followed by interleaved half-resolution UV.
    Nv12,
}

impl CaptureFormat {
    /// Map a V4L2 fourcc to a supported format.
    pub fn from_fourcc(fourcc: &[u8; 4]) -> Option<Self> {
        match fourcc {
            b"RGB3" => Some(CaptureFormat::Rgb24),
            b"NV12" => Some(CaptureFormat::Nv12),
            _ => None,
        }
    }

    /// Expected byte length of a `width` x `height` capture.
    pub fn frame_len(self, width: u32, height: u32) -> Result<usize> {
        let area = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| anyhow!("capture dimensions overflow"))?;
        let len = match self {
            CaptureFormat::Rgb24 => area.checked_mul(3),
            CaptureFormat::Nv12 => area.checked_add(area / 2),
        };
        len.ok_or_else(|| anyhow!("capture dimensions overflow"))
    }
}

/// Convert a raw capture into an `RgbImage`.
pub fn to_rgb_image(bytes: &[u8], width: u32, height: u32, format: CaptureFormat) -> Result<RgbImage> {
    let expected = format.frame_len(width, height)?;
    if bytes.len() != expected {
        return Err(anyhow!(
            "{:?} capture length mismatch: expected {}, got {}",
            format,
            expected,
            bytes.len()
        ));
    }
    let rgb = match format {
        CaptureFormat::Rgb24 => bytes.to_vec(),
        CaptureFormat::Nv12 => nv12_to_rgb(bytes, width as usize, height as usize),
    };
    RgbImage::from_raw(width, height, rgb).ok_or_else(|| anyhow!("capture buffer too small"))
}

fn nv12_to_rgb(bytes: &[u8], width: usize, height: usize) -> Vec<u8> {
    let luma_len = width * height;
    let mut rgb = Vec::with_capacity(luma_len * 3);
    for row in 0..height {
        for col in 0..width {
            let y = bytes[row * width + col] as f32;
            let chroma = luma_len + (row / 2) * width + (col / 2) * 2;
            let u = bytes[chroma] as f32 - 128.0;
            let v = bytes[chroma + 1] as f32 - 128.0;

            rgb.push(to_channel(y + 1.402 * v));
            rgb.push(to_channel(y - 0.344_136 * u - 0.714_136 * v));
            rgb.push(to_channel(y + 1.772 * u));
        }
    }
    rgb
}

fn to_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
