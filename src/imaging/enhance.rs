//! Brightness, contrast, saturation and sharpness adjustment.
//!
//! Each factor blends the image with a degenerate version of itself:
//! `out = degenerate + factor · (src - degenerate)`. A factor of 1.0 is the
//! identity, 0.0 yields the degenerate image and values above 1.0
//! extrapolate away from it.
//!
//! | Adjustment | Degenerate image |
//! |---|---|
//! | brightness | black |
//! | contrast | flat gray at the mean luma |
//! | saturation | grayscale |
//! | sharpness | smoothed by the 3×3 smooth kernel |

use super::filters::{SMOOTH, convolve};
use super::params::Adjustments;
use crate::color::luma;
use image::{DynamicImage, RgbaImage};
use log::debug;

/// Apply all four adjustments in order.
pub fn adjust(img: &DynamicImage, adjustments: &Adjustments) -> DynamicImage {
    let had_alpha = img.color().has_alpha();
    let mut buf = img.to_rgba8();

    if adjustments.brightness != 1.0 {
        blend_toward(&mut buf, adjustments.brightness, |_| [0.0; 3]);
    }

    if adjustments.contrast != 1.0 {
        let mean = mean_luma(&buf) as f32;
        debug!("Contrast pivot: mean luma {mean}");
        blend_toward(&mut buf, adjustments.contrast, |_| [mean; 3]);
    }

    if adjustments.saturation != 1.0 {
        blend_toward(&mut buf, adjustments.saturation, |px| {
            let l = luma(px[0], px[1], px[2]) as f32;
            [l; 3]
        });
    }

    if adjustments.sharpness != 1.0 {
        let smoothed = convolve(&buf, &SMOOTH);
        let mut i = 0;
        let raw = smoothed.as_raw();
        blend_toward(&mut buf, adjustments.sharpness, |_| {
            let d = [raw[i] as f32, raw[i + 1] as f32, raw[i + 2] as f32];
            i += 4;
            d
        });
    }

    if had_alpha {
        DynamicImage::ImageRgba8(buf)
    } else {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(buf).to_rgb8())
    }
}

/// Blend every pixel's color channels toward (factor < 1) or away from
/// (factor > 1) the degenerate color. Pixels are visited in row-major order.
fn blend_toward(buf: &mut RgbaImage, factor: f32, mut degenerate: impl FnMut(&[u8; 4]) -> [f32; 3]) {
    for px in buf.pixels_mut() {
        let d = degenerate(&px.0);
        for c in 0..3 {
            let v = d[c] + factor * (px.0[c] as f32 - d[c]);
            px.0[c] = v.round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Mean luma rounded to the nearest level; 0 for an empty image.
fn mean_luma(buf: &RgbaImage) -> u8 {
    let count = buf.width() as u64 * buf.height() as u64;
    if count == 0 {
        return 0;
    }
    let sum: u64 = buf.pixels().map(|p| luma(p[0], p[1], p[2]) as u64).sum();
    ((sum as f64 / count as f64) + 0.5) as u8
}
