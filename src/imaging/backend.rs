//! Codec backend trait and shared error type.
//!
//! The [`ImageBackend`] trait defines the three operations every backend must
//! support: load, save, and identify. Everything above it (single-image
//! operations, collage, batch runs) talks to the trait, so tests can swap in
//! a recording mock without touching the filesystem.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate's pure-Rust codecs.

use super::params::OutputFormat;
use image::{ColorType, DynamicImage};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("Image file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Unknown {family}: {name}. Available: {valid}")]
    UnsupportedOperation {
        family: &'static str,
        name: String,
        valid: String,
    },
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Image has no pixels")]
    EmptyImage,
    #[error("No input images provided")]
    NoInputImages,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ImagingError {
    /// Build an [`ImagingError::UnsupportedOperation`] listing the valid names.
    pub(crate) fn unsupported(family: &'static str, name: &str, valid: &[&str]) -> Self {
        Self::UnsupportedOperation {
            family,
            name: name.to_string(),
            valid: valid.join(", "),
        }
    }
}

/// Result of an identify operation.
///
/// Field names follow what `pixkit metadata` prints as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    pub filename: String,
    /// Container format detected from the file contents (`JPEG`, `PNG`, ...).
    pub format: Option<String>,
    /// Color mode in the conventional short form (`RGB`, `RGBA`, `L`, ...).
    pub mode: String,
    pub size: (u32, u32),
    pub width: u32,
    pub height: u32,
    /// EXIF tags from the primary IFD, tag name → display value.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub exif: BTreeMap<String, String>,
}

/// Short color-mode name for a decoded color type.
pub fn color_mode(color: ColorType) -> String {
    match color {
        ColorType::L8 => "L".to_string(),
        ColorType::La8 => "LA".to_string(),
        ColorType::Rgb8 => "RGB".to_string(),
        ColorType::Rgba8 => "RGBA".to_string(),
        ColorType::L16 => "I;16".to_string(),
        ColorType::La16 => "LA;16".to_string(),
        ColorType::Rgb16 => "RGB;16".to_string(),
        ColorType::Rgba16 => "RGBA;16".to_string(),
        ColorType::Rgb32F => "RGB;F".to_string(),
        ColorType::Rgba32F => "RGBA;F".to_string(),
        other => format!("{other:?}"),
    }
}

/// Trait for image codec backends.
pub trait ImageBackend: Sync {
    /// Validate and decode an image file.
    fn load(&self, path: &Path) -> Result<DynamicImage, ImagingError>;

    /// Encode an image to `path`.
    ///
    /// With `format: None` the format is inferred from the path's extension.
    fn save(
        &self,
        image: &DynamicImage,
        path: &Path,
        format: Option<OutputFormat>,
    ) -> Result<(), ImagingError>;

    /// Read format, color mode, dimensions and EXIF tags.
    fn identify(&self, path: &Path) -> Result<ImageInfo, ImagingError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock backend that records operations and serves in-memory images.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockBackend {
        /// Images handed out by `load`, last first. Falls back to a 4x4 gray image.
        pub images: Mutex<Vec<DynamicImage>>,
        /// File names whose `load` fails as if the file were corrupt.
        pub failing: Mutex<Vec<String>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Load(String),
        Save {
            output: String,
            width: u32,
            height: u32,
            format: Option<OutputFormat>,
        },
        Identify(String),
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_images(images: Vec<DynamicImage>) -> Self {
            Self {
                images: Mutex::new(images),
                ..Self::default()
            }
        }

        pub fn failing_on(names: &[&str]) -> Self {
            Self {
                failing: Mutex::new(names.iter().map(|n| n.to_string()).collect()),
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        /// Output paths of every recorded save, sorted.
        pub fn saved_paths(&self) -> Vec<String> {
            let mut paths: Vec<String> = self
                .get_operations()
                .into_iter()
                .filter_map(|op| match op {
                    RecordedOp::Save { output, .. } => Some(output),
                    _ => None,
                })
                .collect();
            paths.sort();
            paths
        }
    }

    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    impl ImageBackend for MockBackend {
        fn load(&self, path: &Path) -> Result<DynamicImage, ImagingError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Load(path.to_string_lossy().to_string()));

            if self.failing.lock().unwrap().contains(&file_name(path)) {
                return Err(ImagingError::UnsupportedFormat(format!(
                    "cannot decode {}",
                    path.display()
                )));
            }

            Ok(self.images.lock().unwrap().pop().unwrap_or_else(|| {
                DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
                    4,
                    4,
                    image::Rgb([128, 128, 128]),
                ))
            }))
        }

        fn save(
            &self,
            image: &DynamicImage,
            path: &Path,
            format: Option<OutputFormat>,
        ) -> Result<(), ImagingError> {
            self.operations.lock().unwrap().push(RecordedOp::Save {
                output: path.to_string_lossy().to_string(),
                width: image.width(),
                height: image.height(),
                format,
            });
            Ok(())
        }

        fn identify(&self, path: &Path) -> Result<ImageInfo, ImagingError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(path.to_string_lossy().to_string()));
            Ok(ImageInfo {
                filename: file_name(path),
                format: Some("PNG".to_string()),
                mode: "RGB".to_string(),
                size: (4, 4),
                width: 4,
                height: 4,
                exif: BTreeMap::new(),
            })
        }
    }

    #[test]
    fn mock_records_load_and_save() {
        let backend = MockBackend::new();

        let img = backend.load(Path::new("/in/photo.png")).unwrap();
        backend
            .save(&img, Path::new("/out/photo.png"), Some(OutputFormat::Png))
            .unwrap();

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(&ops[0], RecordedOp::Load(p) if p == "/in/photo.png"));
        assert!(matches!(
            &ops[1],
            RecordedOp::Save {
                width: 4,
                height: 4,
                format: Some(OutputFormat::Png),
                ..
            }
        ));
    }

    #[test]
    fn mock_fails_on_configured_names() {
        let backend = MockBackend::failing_on(&["broken.jpg"]);
        assert!(backend.load(Path::new("/in/broken.jpg")).is_err());
        assert!(backend.load(Path::new("/in/fine.jpg")).is_ok());
    }

    #[test]
    fn unsupported_lists_valid_names() {
        let err = ImagingError::unsupported("effect", "glow", &["sepia", "invert"]);
        assert_eq!(err.to_string(), "Unknown effect: glow. Available: sepia, invert");
    }

    #[test]
    fn color_mode_names() {
        assert_eq!(color_mode(ColorType::Rgb8), "RGB");
        assert_eq!(color_mode(ColorType::Rgba8), "RGBA");
        assert_eq!(color_mode(ColorType::L8), "L");
    }
}
