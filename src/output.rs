//! CLI output formatting for every command.
//!
//! # Result-First Display
//!
//! Each command prints what it produced, not how: the saved path, the
//! numbers an analysis found, or a one-line tally for multi-image commands.
//! Diagnostics go through `log` to stderr; this module owns stdout.
//!
//! # Output Format
//!
//! ## Single-image commands
//!
//! ```text
//! Image saved to: out/photo.png
//! ```
//!
//! ## Histogram
//!
//! ```text
//! Image: photo.jpg
//! Dimensions: 640x480
//! Total pixels: 307200
//! Average RGB values: R=118.2, G=104.9, B=97.3
//! Histogram data saved to: hist.json
//! ```
//!
//! ## Palette
//!
//! ```text
//! Dominant colors in photo.jpg:
//!   1. RGB(212, 180, 140) - #d4b48c (41.2%)
//!   2. RGB(40, 52, 71) - #283447 (23.0%)
//! ```
//!
//! ## Batch
//!
//! ```text
//! Processing 3 images...
//! a.jpg (800x600)
//! Error processing broken.jpg: Image codec error: ...
//! c.jpg (800x533)
//! Successfully processed 2/3 images
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and, where the caller has nothing else to do, a `print_*`
//! wrapper that writes to stdout. Format functions are pure: no I/O, no
//! side effects.

use crate::batch::{BatchEvent, BatchReport};
use crate::color::{ChannelHistogram, ChannelMeans, ColorSwatch};
use crate::imaging::{ImageInfo, ImagingError};
use std::path::{Path, PathBuf};

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// Single-image commands
// ============================================================================

pub fn format_saved(output: &Path) -> Vec<String> {
    vec![format!("Image saved to: {}", output.display())]
}

pub fn print_saved(output: &Path) {
    print_lines(&format_saved(output));
}

/// Image metadata as pretty-printed JSON.
pub fn format_metadata(info: &ImageInfo) -> Result<Vec<String>, ImagingError> {
    let json = serde_json::to_string_pretty(info)?;
    Ok(json.lines().map(str::to_string).collect())
}

// ============================================================================
// Multi-image commands
// ============================================================================

pub fn format_collage(count: usize, cols: u32) -> Vec<String> {
    let rows = count.div_ceil(cols.max(1) as usize);
    vec![format!(
        "Created collage with {} images ({}x{} grid)",
        count, rows, cols
    )]
}

pub fn format_contact_sheet(count: usize) -> Vec<String> {
    vec![format!("Created contact sheet with {} images", count)]
}

pub fn format_composite(position: (i64, i64), opacity: f32) -> Vec<String> {
    vec![format!(
        "Created composite image at position ({}, {}) with opacity {}",
        position.0, position.1, opacity
    )]
}

// ============================================================================
// Analysis commands
// ============================================================================

/// Histogram summary; the last line only appears when the JSON was written.
pub fn format_histogram(
    input: &Path,
    dimensions: (u32, u32),
    histogram: &ChannelHistogram,
    means: &ChannelMeans,
    saved_to: Option<&Path>,
) -> Vec<String> {
    let mut lines = vec![
        format!("Image: {}", display_name(input)),
        format!("Dimensions: {}x{}", dimensions.0, dimensions.1),
        format!("Total pixels: {}", histogram.total_pixels),
        format!(
            "Average RGB values: R={:.1}, G={:.1}, B={:.1}",
            means.red, means.green, means.blue
        ),
    ];
    if let Some(path) = saved_to {
        lines.push(format!("Histogram data saved to: {}", path.display()));
    }
    lines
}

pub fn format_palette(input: &Path, swatches: &[ColorSwatch]) -> Vec<String> {
    let mut lines = vec![format!("Dominant colors in {}:", display_name(input))];
    for (i, swatch) in swatches.iter().enumerate() {
        let [r, g, b] = swatch.rgb;
        lines.push(format!(
            "  {}. RGB({}, {}, {}) - {} ({:.1}%)",
            i + 1,
            r,
            g,
            b,
            swatch.hex(),
            swatch.weight * 100.0
        ));
    }
    lines
}

pub fn print_palette(input: &Path, swatches: &[ColorSwatch]) {
    print_lines(&format_palette(input, swatches));
}

pub fn format_channels(output_dir: &Path, paths: &[PathBuf]) -> Vec<String> {
    let mut lines = vec![format!("Split channels saved to {}", output_dir.display())];
    lines.extend(paths.iter().map(|p| format!("    {}", display_name(p))));
    lines
}

// ============================================================================
// Batch
// ============================================================================

/// Format a single batch progress event.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { total } => vec![format!("Processing {} images...", total)],
        BatchEvent::Processed {
            file,
            width,
            height,
        } => vec![format!("{} ({}x{})", file, width, height)],
        BatchEvent::Failed { file, message } => {
            vec![format!("Error processing {}: {}", file, message)]
        }
    }
}

pub fn format_batch_summary(report: &BatchReport) -> Vec<String> {
    vec![format!(
        "Successfully processed {}/{} images",
        report.processed, report.total
    )]
}

pub fn print_batch_summary(report: &BatchReport) {
    print_lines(&format_batch_summary(report));
}

/// Print lines for any formatter that returns them.
pub fn print(lines: Vec<String>) {
    print_lines(&lines);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::histogram::LEVELS;
    use std::collections::BTreeMap;

    // =========================================================================
    // Single-image tests
    // =========================================================================

    #[test]
    fn saved_line() {
        assert_eq!(
            format_saved(Path::new("out/a.png")),
            vec!["Image saved to: out/a.png"]
        );
    }

    #[test]
    fn metadata_is_pretty_json() {
        let info = ImageInfo {
            filename: "a.png".to_string(),
            format: Some("PNG".to_string()),
            mode: "RGB".to_string(),
            size: (4, 3),
            width: 4,
            height: 3,
            exif: BTreeMap::new(),
        };
        let lines = format_metadata(&info).unwrap();
        assert_eq!(lines.first().map(String::as_str), Some("{"));
        assert!(lines.iter().any(|l| l.contains("\"filename\": \"a.png\"")));
        assert!(lines.iter().any(|l| l.contains("\"width\": 4")));
    }

    #[test]
    fn metadata_lists_exif_tags_of_a_camera_jpeg() {
        use crate::imaging::{ImageBackend, RustBackend};
        use crate::test_helpers::{gradient_rgb, write_jpeg_with_exif};

        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("camera.jpg");
        write_jpeg_with_exif(&path, &gradient_rgb(16, 12), "Pixkit", "Test Rig");
        let info = RustBackend::new().identify(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&format_metadata(&info).unwrap().join("\n")).unwrap();
        let make = json["exif"]["Make"].as_str().unwrap();
        assert!(make.contains("Pixkit"), "{make}");
        assert!(json["exif"]["Model"].as_str().unwrap().contains("Test Rig"));
    }

    // =========================================================================
    // Multi-image tests
    // =========================================================================

    #[test]
    fn collage_reports_grid() {
        assert_eq!(
            format_collage(5, 2),
            vec!["Created collage with 5 images (3x2 grid)"]
        );
    }

    #[test]
    fn contact_sheet_line() {
        assert_eq!(
            format_contact_sheet(7),
            vec!["Created contact sheet with 7 images"]
        );
    }

    #[test]
    fn composite_line() {
        assert_eq!(
            format_composite((10, -4), 0.5),
            vec!["Created composite image at position (10, -4) with opacity 0.5"]
        );
    }

    // =========================================================================
    // Analysis tests
    // =========================================================================

    fn white_histogram() -> ChannelHistogram {
        let mut counts = vec![0u64; LEVELS];
        counts[255] = 16;
        ChannelHistogram {
            red: counts.clone(),
            green: counts.clone(),
            blue: counts,
            total_pixels: 16,
        }
    }

    #[test]
    fn histogram_summary_without_json() {
        let hist = white_histogram();
        let means = hist.means().unwrap();
        let lines = format_histogram(Path::new("/in/white.png"), (4, 4), &hist, &means, None);
        assert_eq!(
            lines,
            vec![
                "Image: white.png",
                "Dimensions: 4x4",
                "Total pixels: 16",
                "Average RGB values: R=255.0, G=255.0, B=255.0",
            ]
        );
    }

    #[test]
    fn histogram_summary_mentions_json() {
        let hist = white_histogram();
        let means = hist.means().unwrap();
        let lines = format_histogram(
            Path::new("white.png"),
            (4, 4),
            &hist,
            &means,
            Some(Path::new("hist.json")),
        );
        assert_eq!(lines.last().unwrap(), "Histogram data saved to: hist.json");
    }

    #[test]
    fn palette_lines_are_numbered() {
        let swatches = vec![
            ColorSwatch {
                rgb: [255, 0, 0],
                weight: 0.5,
            },
            ColorSwatch {
                rgb: [0, 255, 0],
                weight: 0.25,
            },
        ];
        let lines = format_palette(Path::new("dir/pic.jpg"), &swatches);
        assert_eq!(lines[0], "Dominant colors in pic.jpg:");
        assert_eq!(lines[1], "  1. RGB(255, 0, 0) - #ff0000 (50.0%)");
        assert_eq!(lines[2], "  2. RGB(0, 255, 0) - #00ff00 (25.0%)");
    }

    #[test]
    fn channels_list_file_names() {
        let paths = vec![
            PathBuf::from("/out/a_red.png"),
            PathBuf::from("/out/a_green.png"),
            PathBuf::from("/out/a_blue.png"),
        ];
        let lines = format_channels(Path::new("/out"), &paths);
        assert_eq!(lines[0], "Split channels saved to /out");
        assert_eq!(lines[1], "    a_red.png");
        assert_eq!(lines.len(), 4);
    }

    // =========================================================================
    // Batch tests
    // =========================================================================

    #[test]
    fn batch_started_event() {
        let event = BatchEvent::Started { total: 3 };
        assert_eq!(format_batch_event(&event), vec!["Processing 3 images..."]);
    }

    #[test]
    fn batch_processed_event() {
        let event = BatchEvent::Processed {
            file: "a.jpg".to_string(),
            width: 800,
            height: 600,
        };
        assert_eq!(format_batch_event(&event), vec!["a.jpg (800x600)"]);
    }

    #[test]
    fn batch_failed_event() {
        let event = BatchEvent::Failed {
            file: "broken.jpg".to_string(),
            message: "bad data".to_string(),
        };
        assert_eq!(
            format_batch_event(&event),
            vec!["Error processing broken.jpg: bad data"]
        );
    }

    #[test]
    fn batch_summary_counts() {
        let report = BatchReport {
            processed: 2,
            total: 3,
            failures: vec![("broken.jpg".to_string(), "bad data".to_string())],
        };
        assert_eq!(
            format_batch_summary(&report),
            vec!["Successfully processed 2/3 images"]
        );
    }
}
