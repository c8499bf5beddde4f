//! Parameter types for image operations.
//!
//! These types describe *what* to do, not *how* to do it. Every operation
//! family is a closed enum whose variants carry their own typed parameters;
//! names coming from the command line are parsed with [`FromStr`] so an
//! unknown filter or position is rejected before any image is decoded.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 95). Clamped on construction.
//! - [`OutputFormat`]: encoder selection, inferred from extensions or named explicitly.
//! - [`FilterKind`], [`FlipDirection`], [`WatermarkPosition`]: named choices.
//! - [`ResizeParams`], [`CropRect`], [`Adjustments`], [`WatermarkSpec`]: validated parameter sets.
//! - [`ImageOperation`]: one single-image operation, ready to apply.

use super::backend::ImagingError;
use crate::color::Effect;
use image::{ImageFormat, Rgb};
use std::path::Path;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// Encoders compiled into the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Bmp,
    Gif,
    Tiff,
    WebP,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 6] = [
        OutputFormat::Jpeg,
        OutputFormat::Png,
        OutputFormat::Bmp,
        OutputFormat::Gif,
        OutputFormat::Tiff,
        OutputFormat::WebP,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Png => "PNG",
            OutputFormat::Bmp => "BMP",
            OutputFormat::Gif => "GIF",
            OutputFormat::Tiff => "TIFF",
            OutputFormat::WebP => "WEBP",
        }
    }

    /// Map a lowercase file extension to its format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "png" => Some(OutputFormat::Png),
            "bmp" => Some(OutputFormat::Bmp),
            "gif" => Some(OutputFormat::Gif),
            "tif" | "tiff" => Some(OutputFormat::Tiff),
            "webp" => Some(OutputFormat::WebP),
            _ => None,
        }
    }

    /// Infer the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self, ImagingError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(ext).ok_or_else(|| {
            ImagingError::UnsupportedFormat(format!(
                "'.{ext}' ({})",
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            ))
        })
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Bmp => ImageFormat::Bmp,
            OutputFormat::Gif => ImageFormat::Gif,
            OutputFormat::Tiff => ImageFormat::Tiff,
            OutputFormat::WebP => ImageFormat::WebP,
        }
    }

    /// Whether the format keeps an alpha channel. Alpha is flattened onto
    /// white before encoding into formats that don't.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, OutputFormat::Jpeg | OutputFormat::Bmp)
    }
}

impl FromStr for OutputFormat {
    type Err = ImagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim_start_matches('.')).ok_or_else(|| {
            let valid: Vec<&str> = Self::ALL.iter().map(|f| f.name()).collect();
            ImagingError::unsupported("format", s, &valid)
        })
    }
}

/// Convolution and blur filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Blur,
    Contour,
    Detail,
    EdgeEnhance,
    EdgeEnhanceMore,
    Emboss,
    FindEdges,
    Sharpen,
    Smooth,
    SmoothMore,
    GaussianBlur,
    UnsharpMask,
}

impl FilterKind {
    pub const ALL: [FilterKind; 12] = [
        FilterKind::Blur,
        FilterKind::Contour,
        FilterKind::Detail,
        FilterKind::EdgeEnhance,
        FilterKind::EdgeEnhanceMore,
        FilterKind::Emboss,
        FilterKind::FindEdges,
        FilterKind::Sharpen,
        FilterKind::Smooth,
        FilterKind::SmoothMore,
        FilterKind::GaussianBlur,
        FilterKind::UnsharpMask,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FilterKind::Blur => "blur",
            FilterKind::Contour => "contour",
            FilterKind::Detail => "detail",
            FilterKind::EdgeEnhance => "edge_enhance",
            FilterKind::EdgeEnhanceMore => "edge_enhance_more",
            FilterKind::Emboss => "emboss",
            FilterKind::FindEdges => "find_edges",
            FilterKind::Sharpen => "sharpen",
            FilterKind::Smooth => "smooth",
            FilterKind::SmoothMore => "smooth_more",
            FilterKind::GaussianBlur => "gaussian_blur",
            FilterKind::UnsharpMask => "unsharp_mask",
        }
    }
}

impl FromStr for FilterKind {
    type Err = ImagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|k| k.name()).collect();
                ImagingError::unsupported("filter", s, &valid)
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    Horizontal,
    Vertical,
}

impl FromStr for FlipDirection {
    type Err = ImagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "horizontal" => Ok(FlipDirection::Horizontal),
            "vertical" => Ok(FlipDirection::Vertical),
            other => Err(ImagingError::unsupported(
                "flip direction",
                other,
                &["horizontal", "vertical"],
            )),
        }
    }
}

/// Anchor for watermark text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatermarkPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

impl WatermarkPosition {
    pub const ALL: [WatermarkPosition; 5] = [
        WatermarkPosition::TopLeft,
        WatermarkPosition::TopRight,
        WatermarkPosition::BottomLeft,
        WatermarkPosition::BottomRight,
        WatermarkPosition::Center,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WatermarkPosition::TopLeft => "top-left",
            WatermarkPosition::TopRight => "top-right",
            WatermarkPosition::BottomLeft => "bottom-left",
            WatermarkPosition::BottomRight => "bottom-right",
            WatermarkPosition::Center => "center",
        }
    }
}

impl FromStr for WatermarkPosition {
    type Err = ImagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|p| p.name()).collect();
                ImagingError::unsupported("watermark position", s, &valid)
            })
    }
}

const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 255, 0]),
    ("blue", [0, 0, 255]),
];

/// Parse a border color: one of the named colors or `#rrggbb`.
pub fn parse_color(s: &str) -> Result<Rgb<u8>, ImagingError> {
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(ImagingError::InvalidParameter(format!(
                "color '{s}' must be #rrggbb"
            )));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| {
                ImagingError::InvalidParameter(format!("color '{s}' is not valid hex"))
            })
        };
        return Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]));
    }

    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == s)
        .map(|(_, rgb)| Rgb(*rgb))
        .ok_or_else(|| {
            let mut valid: Vec<&str> = NAMED_COLORS.iter().map(|(name, _)| *name).collect();
            valid.push("#rrggbb");
            ImagingError::unsupported("color", s, &valid)
        })
}

/// Target size for a resize. At least one of width/height is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeParams {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub maintain_aspect: bool,
}

impl ResizeParams {
    pub fn new(
        width: Option<u32>,
        height: Option<u32>,
        maintain_aspect: bool,
    ) -> Result<Self, ImagingError> {
        if width.is_none() && height.is_none() {
            return Err(ImagingError::InvalidParameter(
                "must specify at least width or height".into(),
            ));
        }
        if width == Some(0) || height == Some(0) {
            return Err(ImagingError::InvalidParameter(
                "width and height must be positive".into(),
            ));
        }
        Ok(Self {
            width,
            height,
            maintain_aspect,
        })
    }
}

/// Crop rectangle in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Enhancement factors. `1.0` leaves the image unchanged, `0.0` yields the
/// degenerate image (black, flat gray, grayscale, smoothed).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustments {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub sharpness: f32,
}

impl Default for Adjustments {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
            sharpness: 1.0,
        }
    }
}

impl Adjustments {
    pub fn new(
        brightness: f32,
        contrast: f32,
        saturation: f32,
        sharpness: f32,
    ) -> Result<Self, ImagingError> {
        for (name, value) in [
            ("brightness", brightness),
            ("contrast", contrast),
            ("saturation", saturation),
            ("sharpness", sharpness),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ImagingError::InvalidParameter(format!(
                    "{name} factor must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(Self {
            brightness,
            contrast,
            saturation,
            sharpness,
        })
    }
}

/// Text watermark settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkSpec {
    pub text: String,
    pub position: WatermarkPosition,
    pub opacity: u8,
}

impl WatermarkSpec {
    pub fn new(
        text: &str,
        position: WatermarkPosition,
        opacity: u32,
    ) -> Result<Self, ImagingError> {
        if text.trim().is_empty() {
            return Err(ImagingError::InvalidParameter(
                "watermark text must not be empty".into(),
            ));
        }
        let opacity = u8::try_from(opacity).map_err(|_| {
            ImagingError::InvalidParameter(format!("opacity must be 0-255, got {opacity}"))
        })?;
        Ok(Self {
            text: text.to_string(),
            position,
            opacity,
        })
    }
}

/// A single-image operation with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageOperation {
    Resize(ResizeParams),
    Filter(FilterKind),
    Adjust(Adjustments),
    Crop(CropRect),
    /// Counter-clockwise rotation in degrees.
    Rotate { angle: f32, expand: bool },
    Flip(FlipDirection),
    Convert(OutputFormat),
    /// Fit within the box, keeping aspect ratio, never enlarging.
    Thumbnail { width: u32, height: u32 },
    Watermark(WatermarkSpec),
    Effect(Effect),
    Border { width: u32, color: Rgb<u8> },
    Vignette { strength: f32 },
}

impl ImageOperation {
    pub fn rotate(angle: f32, expand: bool) -> Result<Self, ImagingError> {
        if !angle.is_finite() {
            return Err(ImagingError::InvalidParameter(format!(
                "rotation angle must be finite, got {angle}"
            )));
        }
        Ok(ImageOperation::Rotate { angle, expand })
    }

    pub fn thumbnail(width: u32, height: u32) -> Result<Self, ImagingError> {
        if width == 0 || height == 0 {
            return Err(ImagingError::InvalidParameter(
                "thumbnail size must be positive".into(),
            ));
        }
        Ok(ImageOperation::Thumbnail { width, height })
    }

    pub fn vignette(strength: f32) -> Result<Self, ImagingError> {
        if !(0.0..=1.0).contains(&strength) {
            return Err(ImagingError::InvalidParameter(format!(
                "vignette strength must be within 0.0-1.0, got {strength}"
            )));
        }
        Ok(ImageOperation::Vignette { strength })
    }

    /// Short name used in log lines and batch reports.
    pub fn name(&self) -> &'static str {
        match self {
            ImageOperation::Resize(_) => "resize",
            ImageOperation::Filter(_) => "filter",
            ImageOperation::Adjust(_) => "adjust",
            ImageOperation::Crop(_) => "crop",
            ImageOperation::Rotate { .. } => "rotate",
            ImageOperation::Flip(_) => "flip",
            ImageOperation::Convert(_) => "convert",
            ImageOperation::Thumbnail { .. } => "thumbnail",
            ImageOperation::Watermark(_) => "watermark",
            ImageOperation::Effect(_) => "effect",
            ImageOperation::Border { .. } => "border",
            ImageOperation::Vignette { .. } => "vignette",
        }
    }

    /// Operations that `batch` accepts.
    pub fn is_batchable(&self) -> bool {
        matches!(
            self,
            ImageOperation::Resize(_)
                | ImageOperation::Filter(_)
                | ImageOperation::Adjust(_)
                | ImageOperation::Effect(_)
                | ImageOperation::Thumbnail { .. }
        )
    }

    /// Explicit output format, when the operation forces one.
    pub fn output_format(&self) -> Option<OutputFormat> {
        match self {
            ImageOperation::Convert(format) => Some(*format),
            _ => None,
        }
    }
}
