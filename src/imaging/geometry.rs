//! Geometric transforms: crop, rotate, flip, border.

use super::backend::ImagingError;
use super::calculations::{calculate_rotated_bounds, validate_crop};
use super::params::{CropRect, FlipDirection};
use image::{DynamicImage, ImageBuffer, Rgb, Rgba, RgbaImage, imageops};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};

const WHITE_RGBA: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Cut a rectangle out of the image.
pub fn crop(img: &DynamicImage, rect: &CropRect) -> Result<DynamicImage, ImagingError> {
    validate_crop((img.width(), img.height()), rect)?;
    Ok(img.crop_imm(rect.x, rect.y, rect.width, rect.height))
}

pub fn flip(img: &DynamicImage, direction: FlipDirection) -> DynamicImage {
    match direction {
        FlipDirection::Horizontal => img.fliph(),
        FlipDirection::Vertical => img.flipv(),
    }
}

/// Rotate counter-clockwise by `angle` degrees.
///
/// With `expand` the canvas grows to hold the whole rotated image;
/// otherwise it keeps the source size and corners are cut off. Uncovered
/// areas are filled with white. Quarter turns that fit the canvas take an
/// exact lossless path.
pub fn rotate(img: &DynamicImage, angle: f32, expand: bool) -> DynamicImage {
    let angle = angle.rem_euclid(360.0);
    let fits = expand || img.width() == img.height();

    match angle {
        a if a == 0.0 => img.clone(),
        a if a == 180.0 => img.rotate180(),
        // image's rotations are clockwise
        a if a == 90.0 && fits => img.rotate270(),
        a if a == 270.0 && fits => img.rotate90(),
        a => {
            let rotated = rotate_about_center(&img.to_rgba8(), a, expand);
            if img.color().has_alpha() {
                DynamicImage::ImageRgba8(rotated)
            } else {
                DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rotated).to_rgb8())
            }
        }
    }
}

/// Nearest-neighbour rotation about the image center onto a canvas that is
/// either the source size or the rotated bounding box.
fn rotate_about_center(src: &RgbaImage, angle: f32, expand: bool) -> RgbaImage {
    let (src_w, src_h) = src.dimensions();
    let (out_w, out_h) = if expand {
        calculate_rotated_bounds(src_w, src_h, angle)
    } else {
        (src_w, src_h)
    };

    // Projection::rotate turns clockwise in image coordinates
    let projection = Projection::translate(out_w as f32 / 2.0, out_h as f32 / 2.0)
        * Projection::rotate(-angle.to_radians())
        * Projection::translate(-(src_w as f32) / 2.0, -(src_h as f32) / 2.0);

    let mut out = RgbaImage::new(out_w, out_h);
    warp_into(src, &projection, Interpolation::Nearest, WHITE_RGBA, &mut out);
    out
}

/// Surround the image with a solid border `width` pixels wide.
pub fn add_border(
    img: &DynamicImage,
    width: u32,
    color: Rgb<u8>,
) -> Result<DynamicImage, ImagingError> {
    let grow = |side: u32| {
        width
            .checked_mul(2)
            .and_then(|both| side.checked_add(both))
            .ok_or_else(|| {
                ImagingError::InvalidParameter(format!(
                    "border width {width} makes the image larger than {} pixels",
                    u32::MAX
                ))
            })
    };
    let (w, h) = (grow(img.width())?, grow(img.height())?);
    let offset = width as i64;

    Ok(if img.color().has_alpha() {
        let [r, g, b] = color.0;
        let mut canvas = ImageBuffer::from_pixel(w, h, Rgba([r, g, b, 255]));
        imageops::replace(&mut canvas, &img.to_rgba8(), offset, offset);
        DynamicImage::ImageRgba8(canvas)
    } else {
        let mut canvas = ImageBuffer::from_pixel(w, h, color);
        imageops::replace(&mut canvas, &img.to_rgb8(), offset, offset);
        DynamicImage::ImageRgb8(canvas)
    })
}
