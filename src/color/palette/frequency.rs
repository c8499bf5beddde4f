use super::{ColorSwatch, PaletteExtractor};
use std::collections::HashMap;

/// Most common exact colors.
///
/// Counts are strictly ordered, with ties going to the color seen first in
/// the pixel list. Returns fewer than `k` swatches when the image has fewer
/// distinct colors.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrequencyExtractor;

impl PaletteExtractor for FrequencyExtractor {
    fn name(&self) -> &'static str {
        "frequency"
    }

    fn extract(&self, pixels: &[[u8; 3]], k: usize) -> Vec<ColorSwatch> {
        // color → (count, first index)
        let mut counts: HashMap<[u8; 3], (usize, usize)> = HashMap::new();
        for (i, px) in pixels.iter().enumerate() {
            counts.entry(*px).or_insert((0, i)).0 += 1;
        }

        let mut ranked: Vec<([u8; 3], usize, usize)> = counts
            .into_iter()
            .map(|(rgb, (count, first))| (rgb, count, first))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        let total = pixels.len() as f64;
        ranked
            .into_iter()
            .take(k)
            .map(|(rgb, count, _)| ColorSwatch {
                rgb,
                weight: count as f64 / total,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_reds_outrank_green_and_blue() {
        let pixels = [[255, 0, 0], [255, 0, 0], [0, 255, 0], [0, 0, 255]];
        let palette = FrequencyExtractor.extract(&pixels, 2);
        let colors: Vec<[u8; 3]> = palette.iter().map(|s| s.rgb).collect();
        assert_eq!(colors, vec![[255, 0, 0], [0, 255, 0]]);
    }

    #[test]
    fn weights_are_non_increasing() {
        let pixels: Vec<[u8; 3]> = (0..100u32)
            .map(|i| [(i % 7) as u8 * 30, (i % 3) as u8, 0])
            .collect();
        let palette = FrequencyExtractor.extract(&pixels, 10);
        assert!(palette.windows(2).all(|w| w[0].weight >= w[1].weight));
    }

    #[test]
    fn solid_image_yields_one_swatch() {
        let pixels = vec![[12, 34, 56]; 500];
        let palette = FrequencyExtractor.extract(&pixels, 5);
        assert_eq!(palette.len(), 1);
        assert_eq!(palette[0].rgb, [12, 34, 56]);
        assert_eq!(palette[0].weight, 1.0);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let pixels = [[3, 3, 3], [1, 1, 1], [2, 2, 2]];
        let palette = FrequencyExtractor.extract(&pixels, 3);
        let colors: Vec<[u8; 3]> = palette.iter().map(|s| s.rgb).collect();
        assert_eq!(colors, vec![[3, 3, 3], [1, 1, 1], [2, 2, 2]]);
    }
}
