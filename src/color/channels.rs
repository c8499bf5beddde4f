//! Split an image into one RGB image per color channel.

use crate::imaging::{ImageBackend, ImagingError, OutputFormat};
use image::{DynamicImage, Rgb, RgbImage};
use std::path::{Path, PathBuf};

pub const CHANNEL_NAMES: [&str; 3] = ["red", "green", "blue"];

/// One image per channel, each keeping only that channel's values and
/// zeroing the other two.
pub fn split_channels(img: &DynamicImage) -> [RgbImage; 3] {
    let rgb = img.to_rgb8();
    std::array::from_fn(|channel| {
        RgbImage::from_fn(rgb.width(), rgb.height(), |x, y| {
            let mut px = [0u8; 3];
            px[channel] = rgb.get_pixel(x, y).0[channel];
            Rgb(px)
        })
    })
}

/// `<dir>/<stem>_red.png`, `<stem>_green.png`, `<stem>_blue.png`.
pub fn channel_paths(input: &Path, output_dir: &Path) -> [PathBuf; 3] {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    CHANNEL_NAMES.map(|name| output_dir.join(format!("{stem}_{name}.png")))
}

/// Load `input`, split it and save the three channel PNGs.
pub fn save_channels(
    backend: &impl ImageBackend,
    input: &Path,
    output_dir: &Path,
) -> Result<[PathBuf; 3], ImagingError> {
    let img = backend.load(input)?;
    let paths = channel_paths(input, output_dir);
    for (channel, path) in split_channels(&img).into_iter().zip(&paths) {
        backend.save(&DynamicImage::ImageRgb8(channel), path, Some(OutputFormat::Png))?;
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;

    #[test]
    fn each_split_keeps_one_channel() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([10, 20, 30])));
        let [r, g, b] = split_channels(&img);
        assert_eq!(r.get_pixel(0, 0).0, [10, 0, 0]);
        assert_eq!(g.get_pixel(1, 1).0, [0, 20, 0]);
        assert_eq!(b.get_pixel(0, 1).0, [0, 0, 30]);
    }

    #[test]
    fn paths_use_input_stem() {
        let paths = channel_paths(Path::new("/in/sunset.jpg"), Path::new("/out"));
        assert_eq!(paths[0], PathBuf::from("/out/sunset_red.png"));
        assert_eq!(paths[1], PathBuf::from("/out/sunset_green.png"));
        assert_eq!(paths[2], PathBuf::from("/out/sunset_blue.png"));
    }

    #[test]
    fn save_channels_writes_three_pngs() {
        let backend = MockBackend::new();
        save_channels(&backend, Path::new("/in/a.jpg"), Path::new("/out")).unwrap();
        assert_eq!(
            backend.saved_paths(),
            vec!["/out/a_blue.png", "/out/a_green.png", "/out/a_red.png"]
        );
    }
}
