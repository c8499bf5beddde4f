//! Convolution filters.
//!
//! The fixed kernels are the classic 3×3 / 5×5 set (blur, contour, emboss,
//! ...). Each output channel is `sum(weight · sample) / scale + offset`,
//! rounded and clamped to 0–255. Samples past the image edge clamp to the
//! nearest edge pixel. Alpha is copied through untouched.
//!
//! Gaussian blur and unsharp mask delegate to the `image` crate.

use super::params::FilterKind;
use image::{DynamicImage, ImageBuffer, Pixel};
use rayon::prelude::*;

/// Sigma for [`FilterKind::GaussianBlur`].
pub const GAUSSIAN_SIGMA: f32 = 2.0;
/// Sigma and threshold for [`FilterKind::UnsharpMask`].
pub const UNSHARP_SIGMA: f32 = 2.0;
pub const UNSHARP_THRESHOLD: i32 = 3;

/// A square integer convolution kernel, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kernel {
    pub size: usize,
    pub weights: &'static [i32],
    pub scale: i32,
    pub offset: i32,
}

impl Kernel {
    fn finish(&self, sum: i32) -> u8 {
        (sum as f32 / self.scale as f32 + self.offset as f32)
            .round()
            .clamp(0.0, 255.0) as u8
    }
}

#[rustfmt::skip]
pub const BLUR: Kernel = Kernel {
    size: 5,
    weights: &[
        1, 1, 1, 1, 1,
        1, 0, 0, 0, 1,
        1, 0, 0, 0, 1,
        1, 0, 0, 0, 1,
        1, 1, 1, 1, 1,
    ],
    scale: 16,
    offset: 0,
};

#[rustfmt::skip]
pub const CONTOUR: Kernel = Kernel {
    size: 3,
    weights: &[
        -1, -1, -1,
        -1,  8, -1,
        -1, -1, -1,
    ],
    scale: 1,
    offset: 255,
};

#[rustfmt::skip]
pub const DETAIL: Kernel = Kernel {
    size: 3,
    weights: &[
         0, -1,  0,
        -1, 10, -1,
         0, -1,  0,
    ],
    scale: 6,
    offset: 0,
};

#[rustfmt::skip]
pub const EDGE_ENHANCE: Kernel = Kernel {
    size: 3,
    weights: &[
        -1, -1, -1,
        -1, 10, -1,
        -1, -1, -1,
    ],
    scale: 2,
    offset: 0,
};

#[rustfmt::skip]
pub const EDGE_ENHANCE_MORE: Kernel = Kernel {
    size: 3,
    weights: &[
        -1, -1, -1,
        -1,  9, -1,
        -1, -1, -1,
    ],
    scale: 1,
    offset: 0,
};

#[rustfmt::skip]
pub const EMBOSS: Kernel = Kernel {
    size: 3,
    weights: &[
        -1, 0, 0,
         0, 1, 0,
         0, 0, 0,
    ],
    scale: 1,
    offset: 128,
};

#[rustfmt::skip]
pub const FIND_EDGES: Kernel = Kernel {
    size: 3,
    weights: &[
        -1, -1, -1,
        -1,  8, -1,
        -1, -1, -1,
    ],
    scale: 1,
    offset: 0,
};

#[rustfmt::skip]
pub const SHARPEN: Kernel = Kernel {
    size: 3,
    weights: &[
        -2, -2, -2,
        -2, 32, -2,
        -2, -2, -2,
    ],
    scale: 16,
    offset: 0,
};

#[rustfmt::skip]
pub const SMOOTH: Kernel = Kernel {
    size: 3,
    weights: &[
        1, 1, 1,
        1, 5, 1,
        1, 1, 1,
    ],
    scale: 13,
    offset: 0,
};

#[rustfmt::skip]
pub const SMOOTH_MORE: Kernel = Kernel {
    size: 5,
    weights: &[
        1, 1,  1, 1, 1,
        1, 5,  5, 5, 1,
        1, 5, 44, 5, 1,
        1, 5,  5, 5, 1,
        1, 1,  1, 1, 1,
    ],
    scale: 100,
    offset: 0,
};

/// Kernel for a filter, or `None` for the ones the `image` crate implements.
pub fn kernel(kind: FilterKind) -> Option<Kernel> {
    match kind {
        FilterKind::Blur => Some(BLUR),
        FilterKind::Contour => Some(CONTOUR),
        FilterKind::Detail => Some(DETAIL),
        FilterKind::EdgeEnhance => Some(EDGE_ENHANCE),
        FilterKind::EdgeEnhanceMore => Some(EDGE_ENHANCE_MORE),
        FilterKind::Emboss => Some(EMBOSS),
        FilterKind::FindEdges => Some(FIND_EDGES),
        FilterKind::Sharpen => Some(SHARPEN),
        FilterKind::Smooth => Some(SMOOTH),
        FilterKind::SmoothMore => Some(SMOOTH_MORE),
        FilterKind::GaussianBlur | FilterKind::UnsharpMask => None,
    }
}

/// Apply a named filter.
pub fn apply_filter(img: &DynamicImage, kind: FilterKind) -> DynamicImage {
    match kernel(kind) {
        Some(k) => convolve_image(img, &k),
        None if kind == FilterKind::GaussianBlur => img.blur(GAUSSIAN_SIGMA),
        None => img.unsharpen(UNSHARP_SIGMA, UNSHARP_THRESHOLD),
    }
}

/// Convolve any 8-bit image, keeping its channel layout where possible.
pub fn convolve_image(img: &DynamicImage, kernel: &Kernel) -> DynamicImage {
    match img {
        DynamicImage::ImageLuma8(buf) => DynamicImage::ImageLuma8(convolve(buf, kernel)),
        DynamicImage::ImageLumaA8(buf) => DynamicImage::ImageLumaA8(convolve(buf, kernel)),
        DynamicImage::ImageRgb8(buf) => DynamicImage::ImageRgb8(convolve(buf, kernel)),
        DynamicImage::ImageRgba8(buf) => DynamicImage::ImageRgba8(convolve(buf, kernel)),
        other if other.color().has_alpha() => {
            DynamicImage::ImageRgba8(convolve(&other.to_rgba8(), kernel))
        }
        other => DynamicImage::ImageRgb8(convolve(&other.to_rgb8(), kernel)),
    }
}

/// Convolve the color channels of an 8-bit buffer. Rows run in parallel.
pub fn convolve<P>(src: &ImageBuffer<P, Vec<u8>>, kernel: &Kernel) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + Send + Sync,
{
    let (width, height) = (src.width() as usize, src.height() as usize);
    let mut out = src.clone();
    if width == 0 || height == 0 {
        return out;
    }

    let channels = P::CHANNEL_COUNT as usize;
    let color_channels = if P::HAS_ALPHA {
        channels - 1
    } else {
        channels
    };
    let radius = (kernel.size / 2) as isize;
    let raw: &[u8] = src.as_raw();
    let row_len = width * channels;

    let dst: &mut [u8] = &mut out;
    dst.par_chunks_mut(row_len).enumerate().for_each(|(y, row)| {
        for x in 0..width {
            let mut sums = [0i32; 4];
            for ky in 0..kernel.size {
                let sy = (y as isize + ky as isize - radius).clamp(0, height as isize - 1) as usize;
                for kx in 0..kernel.size {
                    let weight = kernel.weights[ky * kernel.size + kx];
                    if weight == 0 {
                        continue;
                    }
                    let sx =
                        (x as isize + kx as isize - radius).clamp(0, width as isize - 1) as usize;
                    let base = (sy * width + sx) * channels;
                    for (c, sum) in sums.iter_mut().enumerate().take(color_channels) {
                        *sum += weight * raw[base + c] as i32;
                    }
                }
            }
            let base = x * channels;
            for (c, sum) in sums.iter().enumerate().take(color_channels) {
                row[base + c] = kernel.finish(*sum);
            }
        }
    });

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    fn flat_rgb(value: u8) -> RgbImage {
        RgbImage::from_pixel(8, 8, Rgb([value, value, value]))
    }

    #[test]
    fn every_kernel_is_well_formed() {
        for kind in FilterKind::ALL {
            if let Some(k) = kernel(kind) {
                assert_eq!(k.weights.len(), k.size * k.size, "{}", kind.name());
                assert_ne!(k.scale, 0, "{}", kind.name());
            }
        }
    }

    #[test]
    fn normalized_kernels_preserve_flat_regions() {
        let src = flat_rgb(100);
        for k in [
            BLUR,
            DETAIL,
            EDGE_ENHANCE,
            EDGE_ENHANCE_MORE,
            SHARPEN,
            SMOOTH,
            SMOOTH_MORE,
        ] {
            let out = convolve(&src, &k);
            assert!(
                out.pixels().all(|p| p.0 == [100, 100, 100]),
                "kernel {k:?} changed a flat image"
            );
        }
    }

    #[test]
    fn find_edges_of_flat_image_is_black() {
        let out = convolve(&flat_rgb(200), &FIND_EDGES);
        assert!(out.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn contour_of_flat_image_is_white() {
        let out = convolve(&flat_rgb(200), &CONTOUR);
        assert!(out.pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn emboss_of_flat_image_is_mid_gray() {
        let out = convolve(&flat_rgb(37), &EMBOSS);
        assert!(out.pixels().all(|p| p.0 == [128, 128, 128]));
    }

    #[test]
    fn find_edges_lights_up_a_step() {
        // Left half black, right half white
        let src = GrayImage::from_fn(8, 8, |x, _| Luma([if x < 4 { 0 } else { 255 }]));
        let out = convolve(&src, &FIND_EDGES);

        assert_eq!(out.get_pixel(0, 4).0, [0]);
        assert_eq!(out.get_pixel(7, 4).0, [0]);
        assert!(out.get_pixel(4, 4).0[0] > 0);
    }

    #[test]
    fn alpha_channel_is_untouched() {
        let src = RgbaImage::from_fn(6, 6, |x, y| Rgba([(x * 40) as u8, (y * 40) as u8, 0, 77]));
        let out = convolve(&src, &FIND_EDGES);
        assert!(out.pixels().all(|p| p.0[3] == 77));
    }

    #[test]
    fn empty_image_is_returned_as_is() {
        let src = RgbImage::new(0, 0);
        assert_eq!(convolve(&src, &SMOOTH).dimensions(), (0, 0));
    }

    #[test]
    fn apply_filter_keeps_dimensions_and_layout() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 6, Rgba([9, 9, 9, 255])));
        for kind in FilterKind::ALL {
            let out = apply_filter(&img, kind);
            assert_eq!((out.width(), out.height()), (10, 6), "{}", kind.name());
            assert!(out.color().has_alpha(), "{}", kind.name());
        }
    }
}
