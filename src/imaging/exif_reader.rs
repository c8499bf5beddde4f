//! EXIF tag extraction for `pixkit metadata`.
//!
//! Reads the primary IFD through `kamadak-exif`, which understands JPEG,
//! TIFF, PNG and WebP containers. Files without EXIF (or that fail to
//! parse) yield an empty map; metadata is informational and never fails
//! the command.

use exif::{In, Reader};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read EXIF tags as `tag name → display value` (units included).
pub fn read_exif(path: &Path) -> BTreeMap<String, String> {
    let Ok(file) = File::open(path) else {
        return BTreeMap::new();
    };
    let mut reader = BufReader::new(file);

    match Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif
            .fields()
            .filter(|field| field.ifd_num == In::PRIMARY)
            .map(|field| {
                (
                    field.tag.to_string(),
                    field.display_value().with_unit(&exif).to_string(),
                )
            })
            .collect(),
        Err(_) => BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gradient_rgb, write_jpeg, write_jpeg_with_exif};

    #[test]
    fn missing_file_yields_empty_map() {
        assert!(read_exif(Path::new("/nonexistent/image.jpg")).is_empty());
    }

    #[test]
    fn jpeg_without_exif_yields_empty_map() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("plain.jpg");
        write_jpeg(&path, &gradient_rgb(16, 16));

        assert!(read_exif(&path).is_empty());
    }

    #[test]
    fn jpeg_with_exif_yields_primary_tags() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("tagged.jpg");
        write_jpeg_with_exif(&path, &gradient_rgb(16, 16), "Pixkit", "Test Rig");

        let tags = read_exif(&path);
        assert!(tags.get("Make").is_some_and(|v| v.contains("Pixkit")), "{tags:?}");
        assert!(tags.get("Model").is_some_and(|v| v.contains("Test Rig")), "{tags:?}");
    }

    #[test]
    fn non_image_yields_empty_map() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("notes.jpg");
        std::fs::write(&path, "just text").unwrap();

        assert!(read_exif(&path).is_empty());
    }
}
