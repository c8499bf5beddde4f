//! Radial vignette.
//!
//! The mask is built from [`VIGNETTE_STEPS`] concentric rings around the
//! image center. Ring `i` has radius `max_radius · i / steps` and alpha
//! `round(255 · (1 − strength · i / steps))`; each pixel takes the alpha of
//! the innermost ring whose disc covers it, and pixels beyond the last disc
//! take the outermost alpha. The mask is therefore 255 at the center and
//! non-increasing outward.

use crate::imaging::backend::ImagingError;
use image::{DynamicImage, GrayImage, Luma};

pub const VIGNETTE_STEPS: u32 = 100;

fn check_strength(strength: f32) -> Result<(), ImagingError> {
    if !(0.0..=1.0).contains(&strength) {
        return Err(ImagingError::InvalidParameter(format!(
            "vignette strength must be within 0.0-1.0, got {strength}"
        )));
    }
    Ok(())
}

/// Alpha of ring `step`.
pub fn ring_alpha(step: u32, strength: f32) -> u8 {
    let fraction = step as f64 / VIGNETTE_STEPS as f64;
    (255.0 * (1.0 - strength as f64 * fraction))
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Index of the innermost ring covering a point `distance` from the center.
fn ring_index(distance: f64, max_radius: u32) -> u32 {
    let last = VIGNETTE_STEPS - 1;
    if max_radius == 0 {
        return if distance == 0.0 { 0 } else { last };
    }
    let step = (distance * VIGNETTE_STEPS as f64 / max_radius as f64).ceil();
    if step > last as f64 { last } else { step as u32 }
}

/// Build the single-channel vignette mask for a `width`×`height` image.
pub fn radial_mask(width: u32, height: u32, strength: f32) -> Result<GrayImage, ImagingError> {
    check_strength(strength)?;

    let (cx, cy) = (width / 2, height / 2);
    let max_radius = cx.min(cy);
    let alphas: Vec<u8> = (0..VIGNETTE_STEPS)
        .map(|i| ring_alpha(i, strength))
        .collect();

    Ok(GrayImage::from_fn(width, height, |x, y| {
        let dx = x as f64 - cx as f64;
        let dy = y as f64 - cy as f64;
        let step = ring_index(dx.hypot(dy), max_radius);
        Luma([alphas[step as usize]])
    }))
}

/// Darken the image toward its edges. The result is RGBA.
pub fn apply_vignette(img: &DynamicImage, strength: f32) -> Result<DynamicImage, ImagingError> {
    let mut rgba = img.to_rgba8();
    let mask = radial_mask(rgba.width(), rgba.height(), strength)?;

    for (px, m) in rgba.pixels_mut().zip(mask.pixels()) {
        let m = m.0[0] as u32;
        for c in 0..3 {
            px.0[c] = ((px.0[c] as u32 * m + 127) / 255) as u8;
        }
    }
    Ok(DynamicImage::ImageRgba8(rgba))
}
