//! Apply one operation to every image in a directory.
//!
//! Only direct children of the input directory are considered (no
//! recursion), matched by extension and sorted by path. Files are processed
//! in parallel on the global rayon pool; each result goes to
//! `output_dir/<file name>`. A failing file is logged and recorded in the
//! [`BatchReport`], and the rest of the batch carries on.
//!
//! Progress is reported as [`BatchEvent`]s over an optional channel: one
//! `Started` up front, then one event per file in sorted input order once
//! the workers are done.

use crate::imaging::{ImageBackend, ImageOperation, ImagingError, process_file};
use log::{info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::mpsc::Sender;
use walkdir::WalkDir;

/// Extensions picked up by a batch run.
pub const BATCH_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tiff", "webp"];

/// Operations `batch` accepts, by command-line name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOperation {
    Resize,
    Filter,
    Adjust,
    Effect,
    Thumbnail,
}

impl BatchOperation {
    pub const ALL: [BatchOperation; 5] = [
        BatchOperation::Resize,
        BatchOperation::Filter,
        BatchOperation::Adjust,
        BatchOperation::Effect,
        BatchOperation::Thumbnail,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BatchOperation::Resize => "resize",
            BatchOperation::Filter => "filter",
            BatchOperation::Adjust => "adjust",
            BatchOperation::Effect => "effect",
            BatchOperation::Thumbnail => "thumbnail",
        }
    }
}

impl FromStr for BatchOperation {
    type Err = ImagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|op| op.name()).collect();
                ImagingError::unsupported("batch operation", s, &valid)
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// Sent once, before any file is processed.
    Started {
        total: usize,
    },
    Processed {
        file: String,
        width: u32,
        height: u32,
    },
    Failed {
        file: String,
        message: String,
    },
}

/// Outcome of a batch run, in sorted input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub total: usize,
    /// `(file name, error message)` for every file that failed.
    pub failures: Vec<(String, String)>,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Image files directly inside `dir`, sorted by path.
pub fn find_image_files(dir: &Path) -> Result<Vec<PathBuf>, ImagingError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| BATCH_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        if matches {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Run `op` over every image in `input_dir`.
pub fn process_directory(
    backend: &impl ImageBackend,
    input_dir: &Path,
    output_dir: &Path,
    op: &ImageOperation,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchReport, ImagingError> {
    if !input_dir.is_dir() {
        return Err(ImagingError::FileNotFound(input_dir.to_path_buf()));
    }
    if !op.is_batchable() {
        return Err(ImagingError::InvalidParameter(format!(
            "'{}' cannot be used in a batch (resize, filter, adjust, effect, thumbnail)",
            op.name()
        )));
    }

    let files = find_image_files(input_dir)?;
    if files.is_empty() {
        return Err(ImagingError::NoInputImages);
    }
    std::fs::create_dir_all(output_dir)?;
    info!(
        "Batch {}: {} images from {}",
        op.name(),
        files.len(),
        input_dir.display()
    );
    if let Some(tx) = &events {
        tx.send(BatchEvent::Started { total: files.len() }).ok();
    }

    let results: Vec<(String, Result<(u32, u32), ImagingError>)> = files
        .par_iter()
        .map(|path| {
            let name = file_name(path);
            let result = process_file(backend, path, &output_dir.join(&name), op);
            if let Err(e) = &result {
                warn!("Error processing {name}: {e}");
            }
            (name, result)
        })
        .collect();

    let mut report = BatchReport {
        total: files.len(),
        ..BatchReport::default()
    };
    for (name, result) in results {
        let event = match result {
            Ok((width, height)) => {
                report.processed += 1;
                BatchEvent::Processed {
                    file: name,
                    width,
                    height,
                }
            }
            Err(e) => {
                let message = e.to_string();
                report.failures.push((name.clone(), message.clone()));
                BatchEvent::Failed {
                    file: name,
                    message,
                }
            }
        };
        if let Some(tx) = &events {
            tx.send(event).ok();
        }
    }
    Ok(report)
}
