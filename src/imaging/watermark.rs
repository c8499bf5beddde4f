//! Text watermarks drawn with a built-in 5×7 bitmap font.
//!
//! The font covers A–Z, 0–9 and common punctuation. Lowercase letters
//! render as uppercase; anything else renders as `?`. Glyphs are scaled by
//! an integer factor that grows with the image height so the text stays
//! legible on large photos.
//!
//! The text sits on a translucent black box (half the text opacity) padded
//! 5px on every side and is inset 10px from the anchoring edges.

use super::calculations::calculate_watermark_origin;
use super::params::WatermarkSpec;
use image::{DynamicImage, Rgba, RgbaImage};

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
/// Glyph width plus one column of spacing.
const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;
const BOX_PADDING: i64 = 5;
const MAX_SCALE: u32 = 6;

/// Rows top to bottom, bit 4 is the leftmost column.
type Glyph = [u8; 7];

#[rustfmt::skip]
const FONT: &[(char, Glyph)] = &[
    ('A', [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11]),
    ('B', [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E]),
    ('C', [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E]),
    ('D', [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C]),
    ('E', [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F]),
    ('F', [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10]),
    ('G', [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F]),
    ('H', [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11]),
    ('I', [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E]),
    ('J', [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C]),
    ('K', [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11]),
    ('L', [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F]),
    ('M', [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11]),
    ('N', [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11]),
    ('O', [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E]),
    ('P', [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10]),
    ('Q', [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D]),
    ('R', [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11]),
    ('S', [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E]),
    ('T', [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04]),
    ('U', [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E]),
    ('V', [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04]),
    ('W', [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A]),
    ('X', [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11]),
    ('Y', [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04]),
    ('Z', [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F]),
    ('0', [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E]),
    ('1', [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E]),
    ('2', [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F]),
    ('3', [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E]),
    ('4', [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02]),
    ('5', [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E]),
    ('6', [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E]),
    ('7', [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08]),
    ('8', [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E]),
    ('9', [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C]),
    (' ', [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
    ('.', [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C]),
    (',', [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08]),
    ('!', [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04]),
    ('?', [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04]),
    ('-', [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00]),
    ('_', [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F]),
    (':', [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00]),
    ('\'', [0x04, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00]),
    ('(', [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02]),
    (')', [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08]),
    ('/', [0x01, 0x01, 0x02, 0x04, 0x08, 0x10, 0x10]),
    ('@', [0x0E, 0x11, 0x17, 0x15, 0x17, 0x10, 0x0E]),
    ('&', [0x0C, 0x12, 0x14, 0x08, 0x15, 0x12, 0x0D]),
    ('#', [0x0A, 0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x0A]),
    ('+', [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00]),
];

const FALLBACK: Glyph = [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04];

fn glyph(c: char) -> &'static Glyph {
    let c = c.to_ascii_uppercase();
    FONT.iter()
        .find(|(ch, _)| *ch == c)
        .map(|(_, g)| g)
        .unwrap_or(&FALLBACK)
}

/// Glyph scale for an image of the given height: one font pixel per 100
/// image rows, between 1 and 6.
pub fn font_scale(image_height: u32) -> u32 {
    (image_height / 100).clamp(1, MAX_SCALE)
}

/// Rendered size of `text` at `scale`, without the background box.
pub fn text_size(text: &str, scale: u32) -> (u32, u32) {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return (0, 0);
    }
    (
        (chars * GLYPH_ADVANCE - 1) * scale,
        GLYPH_HEIGHT * scale,
    )
}

/// Alpha-blend a color over one pixel.
fn blend(px: &mut Rgba<u8>, color: [u8; 3], alpha: u8) {
    if alpha == 0 {
        return;
    }
    let a = alpha as u32;
    for c in 0..3 {
        px.0[c] = ((color[c] as u32 * a + px.0[c] as u32 * (255 - a) + 127) / 255) as u8;
    }
    px.0[3] = (a + (px.0[3] as u32 * (255 - a) + 127) / 255) as u8;
}

/// Blend a color over a rectangle, clipped to the image.
fn fill_rect(img: &mut RgbaImage, x: i64, y: i64, w: i64, h: i64, color: [u8; 3], alpha: u8) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(img.width() as i64);
    let y1 = (y + h).min(img.height() as i64);
    for py in y0..y1 {
        for px in x0..x1 {
            blend(img.get_pixel_mut(px as u32, py as u32), color, alpha);
        }
    }
}

/// Draw the watermark described by `spec`.
///
/// The result keeps an alpha channel only when the source had one.
pub fn add_watermark(img: &DynamicImage, spec: &WatermarkSpec) -> DynamicImage {
    let had_alpha = img.color().has_alpha();
    let mut canvas = img.to_rgba8();
    let (width, height) = canvas.dimensions();

    let scale = font_scale(height);
    let (text_w, text_h) = text_size(&spec.text, scale);
    let (x, y) = calculate_watermark_origin((width, height), (text_w, text_h), spec.position);

    fill_rect(
        &mut canvas,
        x - BOX_PADDING,
        y - BOX_PADDING,
        text_w as i64 + 2 * BOX_PADDING,
        text_h as i64 + 2 * BOX_PADDING,
        [0, 0, 0],
        spec.opacity / 2,
    );

    let s = scale as i64;
    for (i, c) in spec.text.chars().enumerate() {
        let gx = x + i as i64 * (GLYPH_ADVANCE as i64) * s;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (0x10 >> col) == 0 {
                    continue;
                }
                fill_rect(
                    &mut canvas,
                    gx + col as i64 * s,
                    y + row as i64 * s,
                    s,
                    s,
                    [255, 255, 255],
                    spec.opacity,
                );
            }
        }
    }

    if had_alpha {
        DynamicImage::ImageRgba8(canvas)
    } else {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
    }
}
