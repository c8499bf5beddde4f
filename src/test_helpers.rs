//! Shared test utilities for the pixkit test suite.
//!
//! Synthetic images built in memory, plus ways to put one on disk as a
//! real JPEG, with or without an EXIF block, for codec and metadata tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("photo.jpg");
//! write_jpeg(&path, &gradient_rgb(64, 48));
//! ```

use exif::experimental::Writer;
use exif::{Field, In, Tag, Value};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};
use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::Path;

// =========================================================================
// Synthetic images
// =========================================================================

/// RGB image where red ramps left to right, green top to bottom and blue
/// runs against both. Neighbouring pixels differ for sides up to 255.
pub fn gradient_rgb(width: u32, height: u32) -> DynamicImage {
    let w = width.max(1);
    let h = height.max(1);
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / w) as u8,
            (y * 255 / h) as u8,
            (255 - (x + y) * 255 / (w + h)) as u8,
        ])
    }))
}

// =========================================================================
// Files on disk
// =========================================================================

/// Encode `img` as a quality-90 JPEG at `path`, without EXIF.
pub fn write_jpeg(path: &Path, img: &DynamicImage) {
    let file = File::create(path).unwrap();
    let mut encoder = JpegEncoder::new_with_quality(BufWriter::new(file), 90);
    encoder.encode_image(&img.to_rgb8()).unwrap();
}

/// Encode `img` as a JPEG carrying an APP1 EXIF segment with the given
/// camera `Make` and `Model` in the primary IFD.
pub fn write_jpeg_with_exif(path: &Path, img: &DynamicImage, make: &str, model: &str) {
    let ascii = |text: &str| Value::Ascii(vec![text.as_bytes().to_vec()]);
    let fields = [
        Field {
            tag: Tag::Make,
            ifd_num: In::PRIMARY,
            value: ascii(make),
        },
        Field {
            tag: Tag::Model,
            ifd_num: In::PRIMARY,
            value: ascii(model),
        },
    ];
    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).unwrap();
    let tiff = tiff.into_inner();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, 90)
        .encode_image(&img.to_rgb8())
        .unwrap();

    // SOI, then APP1 (length covers itself, the Exif header and the TIFF body)
    let mut app1 = vec![0xFF, 0xE1];
    app1.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    app1.extend_from_slice(b"Exif\0\0");
    app1.extend_from_slice(&tiff);

    let mut bytes = jpeg[..2].to_vec();
    bytes.extend_from_slice(&app1);
    bytes.extend_from_slice(&jpeg[2..]);
    std::fs::write(path, bytes).unwrap();
}

#[test]
fn exif_jpeg_still_decodes() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("tagged.jpg");
    write_jpeg_with_exif(&path, &gradient_rgb(8, 6), "Pixkit", "Test Rig");

    let img = image::open(&path).unwrap();
    assert_eq!((img.width(), img.height()), (8, 6));
}

#[test]
fn gradient_has_requested_size_and_varies() {
    let img = gradient_rgb(10, 5).to_rgb8();
    assert_eq!(img.dimensions(), (10, 5));
    assert_ne!(img.get_pixel(0, 0), img.get_pixel(1, 0));
    assert_ne!(img.get_pixel(0, 0), img.get_pixel(0, 1));
}
