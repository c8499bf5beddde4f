//! Pure Rust codec backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, BMP, GIF, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` at the configured quality |
//! | Encode → PNG | `image::codecs::png::PngEncoder`, best compression |
//! | Encode → BMP, GIF, TIFF, WebP | `DynamicImage::write_to` (WebP is lossless) |
//! | EXIF tags | `kamadak-exif` via [`exif_reader`](super::exif_reader) |

use super::backend::{ImageBackend, ImageInfo, ImagingError, color_mode};
use super::exif_reader::read_exif;
use super::params::{OutputFormat, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{DynamicImage, ImageReader, RgbImage};
use log::debug;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Extensions accepted as inputs, lowercase without the dot.
pub const SUPPORTED_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "bmp", "gif", "tiff", "tif", "webp"];

/// Returns true when the path has one of the [`SUPPORTED_EXTENSIONS`].
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Check that an input path exists and carries a recognized extension.
pub fn validate_image_path(path: &Path) -> Result<(), ImagingError> {
    if !path.exists() {
        return Err(ImagingError::FileNotFound(path.to_path_buf()));
    }
    if !has_supported_extension(path) {
        return Err(ImagingError::UnsupportedFormat(format!(
            "{} (supported: .{})",
            path.display(),
            SUPPORTED_EXTENSIONS.join(", .")
        )));
    }
    Ok(())
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend {
    quality: Quality,
}

impl RustBackend {
    pub fn new() -> Self {
        Self::with_quality(Quality::default())
    }

    pub fn with_quality(quality: Quality) -> Self {
        Self { quality }
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Composite an image with alpha onto an opaque white background.
pub fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (src, dst) in rgba.pixels().zip(out.pixels_mut()) {
        let alpha = src[3] as u32;
        for c in 0..3 {
            dst[c] = ((src[c] as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        }
    }
    out
}

/// Convert an image into a pixel layout the target encoder accepts.
fn prepare_for_format(img: &DynamicImage, format: OutputFormat) -> Cow<'_, DynamicImage> {
    let has_alpha = img.color().has_alpha();
    if has_alpha && !format.supports_alpha() {
        debug!("Flattening alpha onto white for {}", format.name());
        return Cow::Owned(DynamicImage::ImageRgb8(flatten_onto_white(img)));
    }

    match (format, img) {
        (OutputFormat::Gif, DynamicImage::ImageRgba8(_)) => Cow::Borrowed(img),
        (OutputFormat::Gif, _) => Cow::Owned(DynamicImage::ImageRgba8(img.to_rgba8())),
        (
            _,
            DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageRgb8(_)
            | DynamicImage::ImageRgba8(_),
        ) => Cow::Borrowed(img),
        (OutputFormat::Jpeg, DynamicImage::ImageLumaA8(_)) => {
            Cow::Owned(DynamicImage::ImageRgb8(flatten_onto_white(img)))
        }
        (_, DynamicImage::ImageLumaA8(_)) => Cow::Borrowed(img),
        // 16-bit and float buffers are reduced to 8 bits per channel
        _ if has_alpha => Cow::Owned(DynamicImage::ImageRgba8(img.to_rgba8())),
        _ => Cow::Owned(DynamicImage::ImageRgb8(img.to_rgb8())),
    }
}

impl ImageBackend for RustBackend {
    fn load(&self, path: &Path) -> Result<DynamicImage, ImagingError> {
        validate_image_path(path)?;
        let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        debug!(
            "Loaded {} ({}x{}, {})",
            path.display(),
            img.width(),
            img.height(),
            color_mode(img.color())
        );
        Ok(img)
    }

    fn save(
        &self,
        image: &DynamicImage,
        path: &Path,
        format: Option<OutputFormat>,
    ) -> Result<(), ImagingError> {
        let format = match format {
            Some(f) => f,
            None => OutputFormat::from_path(path)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let prepared = prepare_for_format(image, format);
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        match format {
            OutputFormat::Jpeg => {
                let encoder =
                    JpegEncoder::new_with_quality(&mut writer, self.quality.value() as u8);
                prepared.write_with_encoder(encoder)?;
            }
            OutputFormat::Png => {
                let encoder = PngEncoder::new_with_quality(
                    &mut writer,
                    CompressionType::Best,
                    PngFilter::Adaptive,
                );
                prepared.write_with_encoder(encoder)?;
            }
            other => prepared.write_to(&mut writer, other.image_format())?,
        }

        writer.flush()?;
        debug!("Saved {} as {}", path.display(), format.name());
        Ok(())
    }

    fn identify(&self, path: &Path) -> Result<ImageInfo, ImagingError> {
        validate_image_path(path)?;
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader
            .format()
            .map(|f| format!("{f:?}").to_ascii_uppercase());
        let img = reader.decode()?;
        let (width, height) = (img.width(), img.height());

        Ok(ImageInfo {
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            format,
            mode: color_mode(img.color()),
            size: (width, height),
            width,
            height,
            exif: read_exif(path),
        })
    }
}
