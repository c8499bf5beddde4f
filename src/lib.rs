//! # pixkit
//!
//! A command-line toolkit for everyday raster image work: resize, crop,
//! rotate, filter, adjust, watermark and convert single images; compose
//! collages, contact sheets and overlays; and analyze color through
//! histograms, dominant-color palettes and channel splits.
//!
//! # Architecture: Decode, Transform, Encode
//!
//! Every command follows the same shape:
//!
//! ```text
//! 1. Load     path     →  DynamicImage   (ImageBackend::load)
//! 2. Apply    image    →  image          (pure pixel functions)
//! 3. Save     image    →  path           (ImageBackend::save)
//! ```
//!
//! The middle step never touches the filesystem. Pixel code takes a decoded
//! image and returns a new one, so unit tests build tiny synthetic images in
//! memory and assert on exact pixel values. File I/O sits behind the
//! [`imaging::ImageBackend`] trait, which tests replace with a recording mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Codec backend, operation parameters, and single-image operations |
//! | [`color`] | Effects, vignette, histogram, palette extraction, channel split |
//! | [`layout`] | Grid arithmetic for collage and contact sheet; overlay composite |
//! | [`batch`] | One operation over every image in a directory, in parallel |
//! | [`config`] | `pixkit.toml` loading, validation and merging over stock defaults |
//! | [`output`] | CLI output formatting for every command |
//!
//! # Design Decisions
//!
//! ## Closed Enums Over Strings
//!
//! Filters, effects, flip directions, watermark positions, output formats and
//! batch operations are enums parsed with `FromStr`. An unknown name fails
//! once, at parse time, with a message listing the valid ones; past that
//! point every `match` is exhaustive.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, encoding and resampling use the `image` crate; EXIF comes from
//! `kamadak-exif`. There are no system libraries to install, and the binary
//! behaves the same on every platform.
//!
//! ## Optional Clustering
//!
//! Palette extraction clusters with k-means when the `kmeans` feature is on
//! (the default) and falls back to exact frequency counting when it is off.
//! Both sit behind [`color::palette::PaletteExtractor`], and the choice is
//! made at runtime from config or a flag.

pub mod batch;
pub mod color;
pub mod config;
pub mod imaging;
pub mod layout;
pub mod output;

#[cfg(test)]
pub(crate) mod test_helpers;
