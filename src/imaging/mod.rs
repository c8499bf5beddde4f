//! Image processing on the pure-Rust `image` stack.
//!
//! | Operation | Implementation |
//! |---|---|
//! | **Decode / encode** | `image` codecs ([`RustBackend`]) |
//! | **EXIF** | `kamadak-exif`, primary IFD |
//! | **Resize / thumbnail** | Lanczos3 |
//! | **Filters** | integer convolution kernels, `image` blur / unsharpen |
//! | **Adjust** | blend against a degenerate image |
//! | **Rotate** | nearest-neighbour inverse mapping, white fill |
//! | **Watermark** | built-in 5×7 bitmap font |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Pixel stages**: filters, enhance, geometry, watermark
//! - **Operations**: [`apply`] and [`process_file`] tying it together

pub mod backend;
mod calculations;
mod enhance;
pub(crate) mod exif_reader;
mod filters;
mod geometry;
pub mod operations;
mod params;
pub mod rust_backend;
mod watermark;

pub use backend::{ImageBackend, ImageInfo, ImagingError};
pub use calculations::{
    calculate_fit_dimensions, calculate_resize_dimensions, center_offset,
};
pub use operations::{apply, process_file};
pub use params::{
    Adjustments, CropRect, FilterKind, FlipDirection, ImageOperation, OutputFormat, Quality,
    ResizeParams, WatermarkPosition, WatermarkSpec, parse_color,
};
pub use rust_backend::{RustBackend, SUPPORTED_EXTENSIONS, has_supported_extension};
