//! Dominant color extraction.
//!
//! The image is downsampled to a `sample_size`×`sample_size` grid with
//! nearest-neighbour sampling (no blended colors are introduced), flattened
//! to a pixel list and handed to a [`PaletteExtractor`]:
//!
//! - [`ClusteringExtractor`] runs seeded k-means++ with several restarts.
//!   Compiled in with the `kmeans` cargo feature (on by default).
//! - [`FrequencyExtractor`] counts exact colors and keeps the most common.
//!
//! [`PaletteStrategy::Auto`] picks clustering when it is compiled in.
//! Asking for clustering in a build without it falls back to frequency
//! counting with a warning rather than failing.

mod frequency;
#[cfg(feature = "kmeans")]
mod kmeans;

pub use frequency::FrequencyExtractor;
#[cfg(feature = "kmeans")]
pub use kmeans::ClusteringExtractor;

use crate::imaging::backend::ImagingError;
use image::DynamicImage;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Whether k-means clustering is compiled into this build.
pub const CLUSTERING_AVAILABLE: bool = cfg!(feature = "kmeans");

/// A representative color and the fraction of sampled pixels it stands for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorSwatch {
    pub rgb: [u8; 3],
    pub weight: f64,
}

impl ColorSwatch {
    pub fn hex(&self) -> String {
        let [r, g, b] = self.rgb;
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Reduces a pixel list to at most `k` swatches.
pub trait PaletteExtractor {
    fn name(&self) -> &'static str;

    /// `pixels` is non-empty and `k >= 1`.
    fn extract(&self, pixels: &[[u8; 3]], k: usize) -> Vec<ColorSwatch>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteStrategy {
    #[default]
    Auto,
    #[serde(rename = "kmeans")]
    Clustering,
    Frequency,
}

impl PaletteStrategy {
    pub fn name(self) -> &'static str {
        match self {
            PaletteStrategy::Auto => "auto",
            PaletteStrategy::Clustering => "kmeans",
            PaletteStrategy::Frequency => "frequency",
        }
    }
}

impl FromStr for PaletteStrategy {
    type Err = ImagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            PaletteStrategy::Auto,
            PaletteStrategy::Clustering,
            PaletteStrategy::Frequency,
        ]
        .into_iter()
        .find(|p| p.name() == s)
        .ok_or_else(|| {
            ImagingError::unsupported("palette strategy", s, &["auto", "kmeans", "frequency"])
        })
    }
}

/// Knobs for [`extract_palette`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteOptions {
    pub colors: usize,
    pub strategy: PaletteStrategy,
    pub sample_size: u32,
    pub seed: u64,
    pub restarts: u32,
}

impl Default for PaletteOptions {
    fn default() -> Self {
        Self {
            colors: 5,
            strategy: PaletteStrategy::Auto,
            sample_size: 150,
            seed: 42,
            restarts: 10,
        }
    }
}

/// Nearest-neighbour resample to `size`×`size`, flattened row-major.
pub fn sample_pixels(img: &DynamicImage, size: u32) -> Vec<[u8; 3]> {
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    if w == 0 || h == 0 || size == 0 {
        return Vec::new();
    }

    let mut pixels = Vec::with_capacity(size as usize * size as usize);
    for y in 0..size {
        let sy = (y as u64 * h as u64 / size as u64) as u32;
        for x in 0..size {
            let sx = (x as u64 * w as u64 / size as u64) as u32;
            pixels.push(rgb.get_pixel(sx, sy).0);
        }
    }
    pixels
}

/// Pick the extractor for a requested strategy in this build.
pub fn extractor_for(options: &PaletteOptions) -> Box<dyn PaletteExtractor> {
    match options.strategy {
        PaletteStrategy::Frequency => Box::new(FrequencyExtractor),
        PaletteStrategy::Auto | PaletteStrategy::Clustering => clustering_or_fallback(options),
    }
}

#[cfg(feature = "kmeans")]
fn clustering_or_fallback(options: &PaletteOptions) -> Box<dyn PaletteExtractor> {
    Box::new(ClusteringExtractor::new(options.seed, options.restarts))
}

#[cfg(not(feature = "kmeans"))]
fn clustering_or_fallback(options: &PaletteOptions) -> Box<dyn PaletteExtractor> {
    if options.strategy == PaletteStrategy::Clustering {
        warn!("k-means clustering is not compiled in; using frequency counting");
    }
    Box::new(FrequencyExtractor)
}

/// Extract up to `options.colors` dominant colors.
pub fn extract_palette(
    img: &DynamicImage,
    options: &PaletteOptions,
) -> Result<Vec<ColorSwatch>, ImagingError> {
    if options.colors == 0 {
        return Err(ImagingError::InvalidParameter(
            "number of colors must be at least 1".into(),
        ));
    }
    if options.sample_size == 0 {
        return Err(ImagingError::InvalidParameter(
            "palette sample size must be positive".into(),
        ));
    }

    let pixels = sample_pixels(img, options.sample_size);
    if pixels.is_empty() {
        return Err(ImagingError::EmptyImage);
    }

    let extractor = extractor_for(options);
    debug!(
        "Extracting {} colors from {} samples with {}",
        options.colors,
        pixels.len(),
        extractor.name()
    );
    let palette = extractor.extract(&pixels, options.colors);
    if palette.is_empty() {
        warn!("Palette extraction produced no colors");
    }
    Ok(palette)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    const RED: [u8; 3] = [255, 0, 0];
    const GREEN: [u8; 3] = [0, 255, 0];
    const BLUE: [u8; 3] = [0, 0, 255];

    fn red_red_green_blue() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(2, 2, |x, y| match (x, y) {
            (_, 0) => Rgb(RED),
            (0, 1) => Rgb(GREEN),
            _ => Rgb(BLUE),
        }))
    }

    #[test]
    fn hex_is_lowercase_and_padded() {
        let swatch = ColorSwatch {
            rgb: [255, 10, 0],
            weight: 1.0,
        };
        assert_eq!(swatch.hex(), "#ff0a00");
    }

    #[test]
    fn strategy_parses_config_names() {
        assert_eq!("auto".parse::<PaletteStrategy>().unwrap(), PaletteStrategy::Auto);
        assert_eq!(
            "kmeans".parse::<PaletteStrategy>().unwrap(),
            PaletteStrategy::Clustering
        );
        assert!("median-cut".parse::<PaletteStrategy>().is_err());
    }

    #[test]
    fn sample_pixels_replicates_without_blending() {
        let pixels = sample_pixels(&red_red_green_blue(), 150);
        assert_eq!(pixels.len(), 150 * 150);
        assert!(pixels.iter().all(|p| [RED, GREEN, BLUE].contains(p)));
        assert_eq!(pixels.iter().filter(|p| **p == GREEN).count(), 75 * 75);
        assert_eq!(pixels.iter().filter(|p| **p == BLUE).count(), 75 * 75);
    }

    #[test]
    fn frequency_strategy_orders_by_count_then_first_seen() {
        let options = PaletteOptions {
            colors: 2,
            strategy: PaletteStrategy::Frequency,
            ..PaletteOptions::default()
        };
        let palette = extract_palette(&red_red_green_blue(), &options).unwrap();

        let colors: Vec<[u8; 3]> = palette.iter().map(|s| s.rgb).collect();
        assert_eq!(colors, vec![RED, GREEN]);
        assert_eq!(palette[0].weight, 0.5);
        assert_eq!(palette[1].weight, 0.25);
    }

    #[test]
    fn zero_colors_is_invalid() {
        let options = PaletteOptions {
            colors: 0,
            ..PaletteOptions::default()
        };
        assert!(matches!(
            extract_palette(&red_red_green_blue(), &options),
            Err(ImagingError::InvalidParameter(_))
        ));
    }

    #[test]
    fn empty_image_is_rejected() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        assert!(matches!(
            extract_palette(&img, &PaletteOptions::default()),
            Err(ImagingError::EmptyImage)
        ));
    }

    #[test]
    fn auto_uses_clustering_when_compiled_in() {
        let name = extractor_for(&PaletteOptions::default()).name();
        if CLUSTERING_AVAILABLE {
            assert_eq!(name, "kmeans");
        } else {
            assert_eq!(name, "frequency");
        }
    }

    #[test]
    fn explicit_clustering_never_errors() {
        let options = PaletteOptions {
            colors: 3,
            strategy: PaletteStrategy::Clustering,
            restarts: 2,
            ..PaletteOptions::default()
        };
        let palette = extract_palette(&red_red_green_blue(), &options).unwrap();
        assert!(!palette.is_empty());
        assert!(palette.len() <= 3);
    }
}
