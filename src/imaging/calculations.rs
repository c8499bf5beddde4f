//! Pure calculation functions for image dimensions and placement.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::ImagingError;
use super::params::{CropRect, ResizeParams, WatermarkPosition};

/// Calculate the output size of a resize.
///
/// - Both dimensions with aspect: fit inside the box (one side matches, the
///   other is truncated).
/// - Both dimensions without aspect: exact size.
/// - One dimension: the other follows the source aspect ratio.
///
/// # Examples
/// ```
/// # use pixkit::imaging::{ResizeParams, calculate_resize_dimensions};
/// let params = ResizeParams::new(Some(400), Some(400), true).unwrap();
/// assert_eq!(calculate_resize_dimensions((800, 600), &params), (400, 300));
/// ```
pub fn calculate_resize_dimensions(original: (u32, u32), params: &ResizeParams) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    let aspect = orig_w as f64 / orig_h.max(1) as f64;

    let (w, h) = match (params.width, params.height) {
        (Some(w), Some(h)) if params.maintain_aspect => {
            if w as f64 / h as f64 > aspect {
                // Box is wider than the image: height is the limit
                ((h as f64 * aspect) as u32, h)
            } else {
                (w, (w as f64 / aspect) as u32)
            }
        }
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, (w as f64 / aspect) as u32),
        (None, Some(h)) => ((h as f64 * aspect) as u32, h),
        (None, None) => (orig_w, orig_h),
    };

    (w.max(1), h.max(1))
}

/// Calculate dimensions that fit within `bound` while keeping aspect ratio.
///
/// Images already inside the box keep their size (never enlarged).
pub fn calculate_fit_dimensions(original: (u32, u32), bound: (u32, u32)) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    let (max_w, max_h) = bound;

    if orig_w <= max_w && orig_h <= max_h {
        return original;
    }

    let scale = (max_w as f64 / orig_w as f64).min(max_h as f64 / orig_h as f64);
    let w = ((orig_w as f64 * scale).round() as u32).clamp(1, max_w.max(1));
    let h = ((orig_h as f64 * scale).round() as u32).clamp(1, max_h.max(1));
    (w, h)
}

/// Check that a crop rectangle is non-empty and lies inside the image.
pub fn validate_crop(image: (u32, u32), rect: &CropRect) -> Result<(), ImagingError> {
    let (img_w, img_h) = image;
    if rect.width == 0 || rect.height == 0 {
        return Err(ImagingError::InvalidParameter(
            "crop width and height must be positive".into(),
        ));
    }
    let right = rect.x as u64 + rect.width as u64;
    let bottom = rect.y as u64 + rect.height as u64;
    if right > img_w as u64 || bottom > img_h as u64 {
        return Err(ImagingError::InvalidParameter(format!(
            "crop dimensions exceed image size ({img_w}x{img_h})"
        )));
    }
    Ok(())
}

/// Bounding box of a `width`×`height` image rotated by `angle` degrees.
pub fn calculate_rotated_bounds(width: u32, height: u32, angle: f32) -> (u32, u32) {
    let radians = (angle as f64).to_radians();
    let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
    let w = width as f64 * cos + height as f64 * sin;
    let h = width as f64 * sin + height as f64 * cos;
    // Shave float noise so a 90° turn of 100x50 is 50x100, not 51x101
    (
        ((w - 1e-6).ceil() as u32).max(1),
        ((h - 1e-6).ceil() as u32).max(1),
    )
}

/// Inset between a watermark and the image edge.
pub const WATERMARK_MARGIN: i64 = 10;

/// Top-left corner of a text box anchored at `position`.
///
/// May be negative when the text is wider than the image.
pub fn calculate_watermark_origin(
    image: (u32, u32),
    text: (u32, u32),
    position: WatermarkPosition,
) -> (i64, i64) {
    let (img_w, img_h) = (image.0 as i64, image.1 as i64);
    let (text_w, text_h) = (text.0 as i64, text.1 as i64);

    match position {
        WatermarkPosition::TopLeft => (WATERMARK_MARGIN, WATERMARK_MARGIN),
        WatermarkPosition::TopRight => (img_w - text_w - WATERMARK_MARGIN, WATERMARK_MARGIN),
        WatermarkPosition::BottomLeft => (WATERMARK_MARGIN, img_h - text_h - WATERMARK_MARGIN),
        WatermarkPosition::BottomRight => (
            img_w - text_w - WATERMARK_MARGIN,
            img_h - text_h - WATERMARK_MARGIN,
        ),
        WatermarkPosition::Center => ((img_w - text_w) / 2, (img_h - text_h) / 2),
    }
}

/// Offset that centers an item inside a cell along both axes.
///
/// Items larger than the cell on an axis are placed at the cell origin.
pub fn center_offset(cell: (u32, u32), item: (u32, u32)) -> (u32, u32) {
    (
        cell.0.saturating_sub(item.0) / 2,
        cell.1.saturating_sub(item.1) / 2,
    )
}
