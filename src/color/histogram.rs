//! Per-channel intensity histograms.

use crate::imaging::backend::ImagingError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const LEVELS: usize = 256;

/// 256-bin counts for each RGB channel.
///
/// Invariant: every channel sums to `total_pixels`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelHistogram {
    #[serde(rename = "red_channel")]
    pub red: Vec<u64>,
    #[serde(rename = "green_channel")]
    pub green: Vec<u64>,
    #[serde(rename = "blue_channel")]
    pub blue: Vec<u64>,
    pub total_pixels: u64,
}

/// Mean intensity per channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelMeans {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

fn channel_mean(counts: &[u64]) -> f64 {
    let total: u64 = counts.iter().sum();
    let weighted: u64 = counts
        .iter()
        .enumerate()
        .map(|(level, &count)| level as u64 * count)
        .sum();
    weighted as f64 / total as f64
}

impl ChannelHistogram {
    /// Count every pixel of the RGB rendition of `img`.
    pub fn summarize(img: &DynamicImage) -> Self {
        let rgb = img.to_rgb8();
        let mut red = vec![0u64; LEVELS];
        let mut green = vec![0u64; LEVELS];
        let mut blue = vec![0u64; LEVELS];

        for px in rgb.pixels() {
            red[px[0] as usize] += 1;
            green[px[1] as usize] += 1;
            blue[px[2] as usize] += 1;
        }

        Self {
            red,
            green,
            blue,
            total_pixels: rgb.width() as u64 * rgb.height() as u64,
        }
    }

    /// `Σ(level · count) / Σ(count)` per channel.
    pub fn means(&self) -> Result<ChannelMeans, ImagingError> {
        if self.total_pixels == 0 {
            return Err(ImagingError::EmptyImage);
        }
        Ok(ChannelMeans {
            red: channel_mean(&self.red),
            green: channel_mean(&self.green),
            blue: channel_mean(&self.blue),
        })
    }

    /// Persist as pretty-printed JSON, creating parent directories.
    pub fn write_json(&self, path: &Path) -> Result<(), ImagingError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
