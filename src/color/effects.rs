//! Per-pixel color remapping.
//!
//! Every effect works on an RGB copy of the source; alpha is dropped.
//! [`Effect::Grayscale`] returns a single-channel image, the others RGB.

use crate::imaging::backend::ImagingError;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Sepia,
    Grayscale,
    Invert,
    Posterize,
    Solarize,
}

impl Effect {
    pub const ALL: [Effect; 5] = [
        Effect::Sepia,
        Effect::Grayscale,
        Effect::Invert,
        Effect::Posterize,
        Effect::Solarize,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Effect::Sepia => "sepia",
            Effect::Grayscale => "grayscale",
            Effect::Invert => "invert",
            Effect::Posterize => "posterize",
            Effect::Solarize => "solarize",
        }
    }
}

impl FromStr for Effect {
    type Err = ImagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.name() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|e| e.name()).collect();
                ImagingError::unsupported("effect", s, &valid)
            })
    }
}

/// Bits kept by [`Effect::Posterize`].
const POSTERIZE_MASK: u8 = 0xF0;
/// Levels at or above this are inverted by [`Effect::Solarize`].
const SOLARIZE_THRESHOLD: u8 = 128;

/// ITU-R 601-2 luma in 16-bit fixed point, rounded.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
}

fn sepia_pixel(Rgb([r, g, b]): Rgb<u8>) -> Rgb<u8> {
    let (r, g, b) = (r as f64, g as f64, b as f64);
    let tone = |kr: f64, kg: f64, kb: f64| (kr * r + kg * g + kb * b).min(255.0) as u8;
    Rgb([
        tone(0.393, 0.769, 0.189),
        tone(0.349, 0.686, 0.168),
        tone(0.272, 0.534, 0.131),
    ])
}

/// Sepia tone matrix, truncated toward zero and clamped at 255.
pub fn sepia(img: &RgbImage) -> RgbImage {
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        sepia_pixel(*img.get_pixel(x, y))
    })
}

pub fn grayscale(img: &RgbImage) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let Rgb([r, g, b]) = *img.get_pixel(x, y);
        Luma([luma(r, g, b)])
    })
}

fn map_channels(img: &RgbImage, f: impl Fn(u8) -> u8) -> RgbImage {
    let mut out = img.clone();
    out.iter_mut().for_each(|v| *v = f(*v));
    out
}

pub fn apply_effect(img: &DynamicImage, effect: Effect) -> DynamicImage {
    let rgb = img.to_rgb8();
    match effect {
        Effect::Sepia => DynamicImage::ImageRgb8(sepia(&rgb)),
        Effect::Grayscale => DynamicImage::ImageLuma8(grayscale(&rgb)),
        Effect::Invert => DynamicImage::ImageRgb8(map_channels(&rgb, |v| 255 - v)),
        Effect::Posterize => DynamicImage::ImageRgb8(map_channels(&rgb, |v| v & POSTERIZE_MASK)),
        Effect::Solarize => DynamicImage::ImageRgb8(map_channels(&rgb, |v| {
            if v < SOLARIZE_THRESHOLD { v } else { 255 - v }
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::gradient_rgb;

    fn single(r: u8, g: u8, b: u8) -> RgbImage {
        RgbImage::from_pixel(1, 1, Rgb([r, g, b]))
    }

    #[test]
    fn effect_names_roundtrip() {
        for effect in Effect::ALL {
            assert_eq!(effect.name().parse::<Effect>().unwrap(), effect);
        }
    }

    #[test]
    fn unknown_effect_is_unsupported_operation() {
        let err = "oil".parse::<Effect>().unwrap_err();
        assert!(matches!(err, ImagingError::UnsupportedOperation { .. }));
        assert!(err.to_string().contains("sepia, grayscale, invert, posterize, solarize"));
    }

    #[test]
    fn sepia_of_black_and_white() {
        assert_eq!(sepia(&single(0, 0, 0)).get_pixel(0, 0).0, [0, 0, 0]);
        // 0.393+0.769+0.189 > 1 → red and green saturate; blue: 0.937·255 = 238.9 → 238
        assert_eq!(sepia(&single(255, 255, 255)).get_pixel(0, 0).0, [255, 255, 238]);
    }

    #[test]
    fn sepia_truncates() {
        // r' = 39.3 → 39, g' = 34.9 → 34, b' = 27.2 → 27
        assert_eq!(sepia(&single(100, 0, 0)).get_pixel(0, 0).0, [39, 34, 27]);
    }

    #[test]
    fn sepia_is_not_idempotent() {
        let src = gradient_rgb(16, 16).to_rgb8();
        let once = sepia(&src);
        let twice = sepia(&once);
        assert_ne!(once, twice);
    }

    #[test]
    fn sepia_leaves_input_untouched() {
        let src = single(10, 20, 30);
        let _ = sepia(&src);
        assert_eq!(src.get_pixel(0, 0).0, [10, 20, 30]);
    }

    #[test]
    fn luma_weights() {
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(0, 0, 0), 0);
        // 0.299·255 = 76.2
        assert_eq!(luma(255, 0, 0), 76);
        // 0.587·255 = 149.7
        assert_eq!(luma(0, 255, 0), 150);
        // 0.114·255 = 29.1
        assert_eq!(luma(0, 0, 255), 29);
    }

    #[test]
    fn grayscale_is_single_channel() {
        let out = apply_effect(&gradient_rgb(8, 4), Effect::Grayscale);
        assert!(matches!(out, DynamicImage::ImageLuma8(_)));
        assert_eq!((out.width(), out.height()), (8, 4));
    }

    #[test]
    fn double_invert_of_grayscale_is_grayscale() {
        let gray = apply_effect(&gradient_rgb(8, 8), Effect::Grayscale);
        let back = apply_effect(&apply_effect(&gray, Effect::Invert), Effect::Invert);
        assert_eq!(back.to_rgb8(), gray.to_rgb8());
    }

    #[test]
    fn invert_posterize_solarize_values() {
        let img = DynamicImage::ImageRgb8(single(0, 127, 200));
        let px = |e| apply_effect(&img, e).to_rgb8().get_pixel(0, 0).0;

        assert_eq!(px(Effect::Invert), [255, 128, 55]);
        assert_eq!(px(Effect::Posterize), [0, 112, 192]);
        assert_eq!(px(Effect::Solarize), [0, 127, 55]);
    }

    #[test]
    fn alpha_is_dropped() {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            2,
            2,
            image::Rgba([1, 2, 3, 4]),
        ));
        assert!(!apply_effect(&img, Effect::Invert).color().has_alpha());
    }
}
