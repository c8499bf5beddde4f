//! Tool configuration module.
//!
//! Handles loading, validating, and merging `pixkit.toml`. Stock defaults are
//! the base layer; a user file overrides any subset of them.
//!
//! ## Config File Location
//!
//! Pass `--config <FILE>` explicitly, or drop a `pixkit.toml` in the working
//! directory. Without either, stock defaults are used.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! quality = 95              # JPEG quality (1-100)
//!
//! [palette]
//! colors = 5                # Swatches to extract
//! strategy = "auto"         # auto | kmeans | frequency
//! sample_size = 150         # Square side the image is sampled down to
//! seed = 42                 # Clustering RNG seed
//! restarts = 10             # Clustering restarts, best inertia wins
//!
//! [contact_sheet]
//! width = 1200              # Sheet width in pixels
//! margin = 10               # Gap around and between thumbnails
//!
//! [collage]
//! cols = 2                  # Images per row
//! padding = 10              # Gap around and between cells
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; override just the values you want:
//!
//! ```toml
//! [palette]
//! strategy = "frequency"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::color::{PaletteOptions, PaletteStrategy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "pixkit.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `pixkit.toml`.
///
/// All fields have defaults. User config files need only specify the
/// values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Encoder settings.
    pub output: OutputConfig,
    /// Dominant color extraction.
    pub palette: PaletteConfig,
    /// Contact sheet geometry.
    pub contact_sheet: ContactSheetConfig,
    /// Collage grid defaults.
    pub collage: CollageConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl ToolConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if self.palette.colors == 0 {
            return Err(ConfigError::Validation(
                "palette.colors must be at least 1".into(),
            ));
        }
        if self.palette.sample_size == 0 {
            return Err(ConfigError::Validation(
                "palette.sample_size must be non-zero".into(),
            ));
        }
        if self.palette.restarts == 0 {
            return Err(ConfigError::Validation(
                "palette.restarts must be at least 1".into(),
            ));
        }
        if self.contact_sheet.width == 0 {
            return Err(ConfigError::Validation(
                "contact_sheet.width must be non-zero".into(),
            ));
        }
        if self.collage.cols == 0 {
            return Err(ConfigError::Validation(
                "collage.cols must be at least 1".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Encoder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// JPEG quality (1-100). Other formats ignore it.
    pub quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { quality: 95 }
    }
}

/// Dominant color extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaletteConfig {
    pub colors: usize,
    pub strategy: PaletteStrategy,
    pub sample_size: u32,
    pub seed: u64,
    pub restarts: u32,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        let stock = PaletteOptions::default();
        Self {
            colors: stock.colors,
            strategy: stock.strategy,
            sample_size: stock.sample_size,
            seed: stock.seed,
            restarts: stock.restarts,
        }
    }
}

impl PaletteConfig {
    pub fn options(&self) -> PaletteOptions {
        PaletteOptions {
            colors: self.colors,
            strategy: self.strategy,
            sample_size: self.sample_size,
            seed: self.seed,
            restarts: self.restarts,
        }
    }
}

/// Contact sheet geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContactSheetConfig {
    pub width: u32,
    pub margin: u32,
}

impl Default for ContactSheetConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            margin: 10,
        }
    }
}

/// Collage grid defaults, used when the command line leaves them out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollageConfig {
    pub cols: u32,
    pub padding: u32,
}

impl Default for CollageConfig {
    fn default() -> Self {
        Self {
            cols: 2,
            padding: 10,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer that user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ToolConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if it exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ToolConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ToolConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective configuration.
///
/// An explicit path must exist. Without one, `./pixkit.toml` is used when
/// present and stock defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<ToolConfig, ConfigError> {
    let overlay = match path {
        Some(p) => {
            if !p.is_file() {
                return Err(ConfigError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("config file not found: {}", p.display()),
                )));
            }
            load_raw_config(p)?
        }
        None => load_raw_config(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    resolve_config(stock_defaults_value()?, overlay)
}

/// Returns a fully-commented stock `pixkit.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# pixkit Configuration
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# pixkit reads ./pixkit.toml when present, or the file given with --config.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output encoding
# ---------------------------------------------------------------------------
[output]
# JPEG quality (1-100). PNG is always written with best compression.
quality = 95

# ---------------------------------------------------------------------------
# Dominant colors (`pixkit palette`)
# ---------------------------------------------------------------------------
[palette]
# Number of swatches to report.
colors = 5

# "kmeans" clusters the sampled pixels, "frequency" counts exact colors,
# "auto" clusters when the build supports it and counts otherwise.
strategy = "auto"

# The image is sampled down to sample_size x sample_size before analysis.
sample_size = 150

# Clustering is seeded so repeated runs agree.
seed = 42

# Independent clustering runs; the tightest one wins.
restarts = 10

# ---------------------------------------------------------------------------
# Contact sheet (`pixkit contact-sheet`)
# ---------------------------------------------------------------------------
[contact_sheet]
# Sheet width in pixels. Up to four thumbnails per row.
width = 1200

# Gap around and between thumbnails.
margin = 10

# ---------------------------------------------------------------------------
# Collage (`pixkit collage`)
# ---------------------------------------------------------------------------
[collage]
# Images per row when --cols is not given.
cols = 2

# Gap around and between cells when --padding is not given.
padding = 10

# ---------------------------------------------------------------------------
# Parallel processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for batch runs and multi-image loads.
# Omit to use all CPU cores. Larger values are clamped to the core count.
# max_processes = 4
"##
}
