//! Multi-image composition: collage, contact sheet and overlay composite.
//!
//! ## Grid arithmetic
//!
//! Collage and contact sheet share one layout: `cols` columns of equal
//! cells, `padding` pixels around and between every cell.
//!
//! ```text
//! rows   = ceil(n / cols)
//! x      = col · (cell_w + padding) + padding
//! y      = row · (cell_h + padding) + padding
//! canvas = (cols · cell_w + (cols + 1) · padding,
//!           rows · cell_h + (rows + 1) · padding)
//! ```
//!
//! The collage stretches every input to the largest width × largest height
//! without preserving aspect ratio. The contact sheet instead shrinks each
//! image into a square cell and centers it.

use crate::imaging::{ImageBackend, ImagingError, calculate_fit_dimensions, center_offset};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage, RgbaImage};
use log::debug;
use rayon::prelude::*;
use std::path::PathBuf;

/// Most columns a contact sheet uses.
pub const CONTACT_SHEET_MAX_COLS: usize = 4;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Cell origins in input order plus the canvas size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    pub positions: Vec<(u32, u32)>,
    pub canvas: (u32, u32),
    pub rows: u32,
}

/// Place `count` cells of `cell` size on a `cols`-wide grid.
pub fn layout(
    count: usize,
    cols: usize,
    cell: (u32, u32),
    padding: u32,
) -> Result<GridLayout, ImagingError> {
    if cols == 0 {
        return Err(ImagingError::InvalidParameter(
            "number of columns must be at least 1".into(),
        ));
    }
    if count == 0 {
        return Err(ImagingError::NoInputImages);
    }

    let (cell_w, cell_h) = cell;
    let rows = count.div_ceil(cols);
    let canvas = (
        grid_extent(cols, cell_w, padding)?,
        grid_extent(rows, cell_h, padding)?,
    );
    let rows = u32::try_from(rows).map_err(|_| too_large(rows, cell_h, padding))?;

    // Every origin lies inside the canvas, so these sums stay in range
    let positions = (0..count)
        .map(|i| {
            let (row, col) = ((i / cols) as u32, (i % cols) as u32);
            (
                col * (cell_w + padding) + padding,
                row * (cell_h + padding) + padding,
            )
        })
        .collect();

    Ok(GridLayout {
        positions,
        canvas,
        rows,
    })
}

/// `cells · cell + (cells + 1) · padding`, if that fits in a `u32`.
fn grid_extent(cells: usize, cell: u32, padding: u32) -> Result<u32, ImagingError> {
    let n = cells as u64;
    n.checked_mul(cell as u64)
        .zip(n.checked_add(1).and_then(|g| g.checked_mul(padding as u64)))
        .and_then(|(cells, gaps)| cells.checked_add(gaps))
        .and_then(|extent| u32::try_from(extent).ok())
        .ok_or_else(|| too_large(cells, cell, padding))
}

fn too_large(cells: usize, cell: u32, padding: u32) -> ImagingError {
    ImagingError::InvalidParameter(format!(
        "{cells} cells of {cell}px with padding {padding} exceed {} pixels",
        u32::MAX
    ))
}

/// Decode every path, in parallel, keeping input order.
pub fn load_all(
    backend: &impl ImageBackend,
    paths: &[PathBuf],
) -> Result<Vec<DynamicImage>, ImagingError> {
    paths.par_iter().map(|p| backend.load(p)).collect()
}

/// Paste every image into a grid on a white canvas.
///
/// All inputs are stretched to the largest width and largest height among
/// them; mixed aspect ratios are distorted.
pub fn collage(
    images: &[DynamicImage],
    cols: usize,
    padding: u32,
) -> Result<RgbImage, ImagingError> {
    let cell_w = images.iter().map(|i| i.width()).max().unwrap_or(0);
    let cell_h = images.iter().map(|i| i.height()).max().unwrap_or(0);
    let grid = layout(images.len(), cols, (cell_w, cell_h), padding)?;
    debug!(
        "Collage: {} images, {cols} cols, cell {cell_w}x{cell_h}, canvas {}x{}",
        images.len(),
        grid.canvas.0,
        grid.canvas.1
    );

    let mut canvas = RgbImage::from_pixel(grid.canvas.0, grid.canvas.1, WHITE);
    for (img, &(x, y)) in images.iter().zip(&grid.positions) {
        let cell = if (img.width(), img.height()) == (cell_w, cell_h) {
            img.to_rgb8()
        } else {
            img.resize_exact(cell_w, cell_h, FilterType::Lanczos3)
                .to_rgb8()
        };
        imageops::replace(&mut canvas, &cell, x as i64, y as i64);
    }
    Ok(canvas)
}

/// Square thumbnail edge for a sheet: `(sheet_width − margin·(cols+1)) / cols`.
pub fn contact_sheet_cell(
    count: usize,
    sheet_width: u32,
    margin: u32,
) -> Result<(usize, u32), ImagingError> {
    if count == 0 {
        return Err(ImagingError::NoInputImages);
    }
    let cols = count.min(CONTACT_SHEET_MAX_COLS);
    let gutters = margin as u64 * (cols as u64 + 1);
    let thumb = (sheet_width as u64).saturating_sub(gutters) / cols as u64;
    if thumb == 0 {
        return Err(ImagingError::InvalidParameter(format!(
            "sheet width {sheet_width} leaves no room for {cols} thumbnails with margin {margin}"
        )));
    }
    Ok((cols, thumb as u32))
}

/// Grid of up to four columns of square cells, each image shrunk to fit
/// (never enlarged) and centered in its cell.
pub fn contact_sheet(
    images: &[DynamicImage],
    sheet_width: u32,
    margin: u32,
) -> Result<RgbImage, ImagingError> {
    let (cols, thumb) = contact_sheet_cell(images.len(), sheet_width, margin)?;
    let grid = layout(images.len(), cols, (thumb, thumb), margin)?;
    let sheet_height = grid.canvas.1;
    debug!(
        "Contact sheet: {} images, {cols} cols, thumb {thumb}px, sheet {sheet_width}x{sheet_height}",
        images.len()
    );

    let mut canvas = RgbImage::from_pixel(sheet_width, sheet_height, WHITE);
    for (img, &(x, y)) in images.iter().zip(&grid.positions) {
        let (w, h) = calculate_fit_dimensions((img.width(), img.height()), (thumb, thumb));
        let small = if (w, h) == (img.width(), img.height()) {
            img.to_rgb8()
        } else {
            img.resize_exact(w, h, FilterType::Lanczos3).to_rgb8()
        };
        let (dx, dy) = center_offset((thumb, thumb), (w, h));
        imageops::replace(&mut canvas, &small, (x + dx) as i64, (y + dy) as i64);
    }
    Ok(canvas)
}

/// Alpha-composite `overlay` onto `background` with its top-left at
/// `position`. Below full opacity the overlay's alpha is replaced by
/// `round(255 · opacity)`.
pub fn composite(
    background: &DynamicImage,
    overlay: &DynamicImage,
    position: (i64, i64),
    opacity: f32,
) -> Result<RgbaImage, ImagingError> {
    if !(0.0..=1.0).contains(&opacity) {
        return Err(ImagingError::InvalidParameter(format!(
            "opacity must be within 0.0-1.0, got {opacity}"
        )));
    }

    let mut base = background.to_rgba8();
    let mut top = overlay.to_rgba8();
    if opacity < 1.0 {
        let alpha = (255.0 * opacity).round() as u8;
        top.pixels_mut().for_each(|p| p.0[3] = alpha);
    }
    debug!(
        "Composite: overlay {}x{} at {:?}, opacity {opacity}",
        top.width(),
        top.height(),
        position
    );
    imageops::overlay(&mut base, &top, position.0, position.1);
    Ok(base)
}
