//! High-level image operations.
//!
//! [`apply`] dispatches one [`ImageOperation`] onto a decoded image.
//! [`process_file`] wraps it with the backend: load, apply, save.

use super::backend::{ImageBackend, ImagingError};
use super::calculations::{calculate_fit_dimensions, calculate_resize_dimensions};
use super::params::ImageOperation;
use super::{enhance, filters, geometry, watermark};
use crate::color::{apply_effect, apply_vignette};
use image::DynamicImage;
use image::imageops::FilterType;
use log::debug;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, ImagingError>;

/// Apply a single operation, returning a new image.
pub fn apply(img: &DynamicImage, op: &ImageOperation) -> Result<DynamicImage> {
    let original = (img.width(), img.height());

    let out = match op {
        ImageOperation::Resize(params) => {
            let (w, h) = calculate_resize_dimensions(original, params);
            debug!("Resize: {}x{} → {w}x{h}", original.0, original.1);
            img.resize_exact(w, h, FilterType::Lanczos3)
        }
        ImageOperation::Filter(kind) => {
            debug!("Filter: {}", kind.name());
            filters::apply_filter(img, *kind)
        }
        ImageOperation::Adjust(adjustments) => {
            debug!("Adjust: {adjustments:?}");
            enhance::adjust(img, adjustments)
        }
        ImageOperation::Crop(rect) => {
            debug!("Crop: {rect:?}");
            geometry::crop(img, rect)?
        }
        ImageOperation::Rotate { angle, expand } => {
            debug!("Rotate: angle={angle}, expand={expand}");
            geometry::rotate(img, *angle, *expand)
        }
        ImageOperation::Flip(direction) => {
            debug!("Flip: {direction:?}");
            geometry::flip(img, *direction)
        }
        ImageOperation::Convert(format) => {
            // Pixel layout is adapted to the target by the encoder
            debug!("Format Conversion: {}", format.name());
            img.clone()
        }
        ImageOperation::Thumbnail { width, height } => {
            let (w, h) = calculate_fit_dimensions(original, (*width, *height));
            debug!("Thumbnail: bound {width}x{height} → {w}x{h}");
            if (w, h) == original {
                img.clone()
            } else {
                img.resize_exact(w, h, FilterType::Lanczos3)
            }
        }
        ImageOperation::Watermark(spec) => {
            debug!(
                "Watermark: text={:?}, position={}, opacity={}",
                spec.text,
                spec.position.name(),
                spec.opacity
            );
            watermark::add_watermark(img, spec)
        }
        ImageOperation::Effect(effect) => {
            debug!("Effect: {}", effect.name());
            apply_effect(img, *effect)
        }
        ImageOperation::Border { width, color } => {
            debug!("Border: width={width}, color={:?}", color.0);
            geometry::add_border(img, *width, *color)?
        }
        ImageOperation::Vignette { strength } => {
            debug!("Vignette: strength={strength}");
            apply_vignette(img, *strength)?
        }
    };

    Ok(out)
}

/// Load `input`, apply `op`, save to `output`. Returns the output size.
pub fn process_file(
    backend: &impl ImageBackend,
    input: &Path,
    output: &Path,
    op: &ImageOperation,
) -> Result<(u32, u32)> {
    let img = backend.load(input)?;
    let out = apply(&img, op)?;
    backend.save(&out, output, op.output_format())?;
    Ok((out.width(), out.height()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Effect;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::params::{
        CropRect, FilterKind, FlipDirection, OutputFormat, ResizeParams, WatermarkPosition,
        WatermarkSpec,
    };
    use crate::test_helpers::gradient_rgb;
    use image::Rgb;

    fn size(img: &DynamicImage) -> (u32, u32) {
        (img.width(), img.height())
    }

    #[test]
    fn resize_width_only_keeps_aspect() {
        let op = ImageOperation::Resize(ResizeParams::new(Some(40), None, true).unwrap());
        let out = apply(&gradient_rgb(80, 60), &op).unwrap();
        assert_eq!(size(&out), (40, 30));
    }

    #[test]
    fn resize_without_aspect_is_exact() {
        let op = ImageOperation::Resize(ResizeParams::new(Some(10), Some(50), false).unwrap());
        let out = apply(&gradient_rgb(80, 60), &op).unwrap();
        assert_eq!(size(&out), (10, 50));
    }

    #[test]
    fn thumbnail_never_enlarges() {
        let op = ImageOperation::thumbnail(128, 128).unwrap();
        assert_eq!(size(&apply(&gradient_rgb(40, 20), &op).unwrap()), (40, 20));
        assert_eq!(size(&apply(&gradient_rgb(400, 200), &op).unwrap()), (128, 64));
    }

    #[test]
    fn crop_error_propagates() {
        let op = ImageOperation::Crop(CropRect {
            x: 0,
            y: 0,
            width: 100,
            height: 100,
        });
        assert!(matches!(
            apply(&gradient_rgb(10, 10), &op),
            Err(ImagingError::InvalidParameter(_))
        ));
    }

    #[test]
    fn oversized_border_is_invalid_parameter() {
        let op = ImageOperation::Border {
            width: 3_000_000_000,
            color: Rgb([0, 0, 0]),
        };
        assert!(matches!(
            apply(&gradient_rgb(4, 4), &op),
            Err(ImagingError::InvalidParameter(_))
        ));
    }

    #[test]
    fn every_operation_produces_an_image() {
        let img = gradient_rgb(64, 48);
        let ops = [
            ImageOperation::Filter(FilterKind::Emboss),
            ImageOperation::Adjust(Default::default()),
            ImageOperation::rotate(30.0, true).unwrap(),
            ImageOperation::Flip(FlipDirection::Vertical),
            ImageOperation::Convert(OutputFormat::Png),
            ImageOperation::Watermark(
                WatermarkSpec::new("pixkit", WatermarkPosition::Center, 128).unwrap(),
            ),
            ImageOperation::Effect(Effect::Solarize),
            ImageOperation::Border {
                width: 3,
                color: Rgb([0, 0, 0]),
            },
            ImageOperation::vignette(0.5).unwrap(),
        ];
        for op in &ops {
            let out = apply(&img, op).unwrap();
            assert!(out.width() > 0 && out.height() > 0, "{}", op.name());
        }
    }

    #[test]
    fn process_file_loads_applies_and_saves() {
        let backend = MockBackend::with_images(vec![gradient_rgb(100, 50)]);
        let op = ImageOperation::Resize(ResizeParams::new(Some(50), None, true).unwrap());

        let dims = process_file(&backend, Path::new("/in/a.png"), Path::new("/out/a.png"), &op)
            .unwrap();
        assert_eq!(dims, (50, 25));

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(&ops[0], RecordedOp::Load(p) if p == "/in/a.png"));
        assert!(matches!(
            &ops[1],
            RecordedOp::Save {
                width: 50,
                height: 25,
                format: None,
                ..
            }
        ));
    }

    #[test]
    fn convert_passes_format_to_backend() {
        let backend = MockBackend::new();
        let op = ImageOperation::Convert(OutputFormat::Jpeg);
        process_file(&backend, Path::new("/in/a.png"), Path::new("/out/a.bin"), &op).unwrap();

        assert!(matches!(
            backend.get_operations().last(),
            Some(RecordedOp::Save {
                format: Some(OutputFormat::Jpeg),
                ..
            })
        ));
    }

    #[test]
    fn load_failure_skips_save() {
        let backend = MockBackend::failing_on(&["broken.png"]);
        let op = ImageOperation::Effect(Effect::Invert);
        assert!(process_file(&backend, Path::new("/in/broken.png"), Path::new("/o.png"), &op).is_err());
        assert!(backend.saved_paths().is_empty());
    }
}
