//! Pixel-level color transforms and color analysis.
//!
//! Everything here is a pure function of a decoded image, apart from
//! [`ChannelHistogram::write_json`] and [`channels::save_channels`].
//!
//! - [`effects`]: sepia, grayscale, invert, posterize, solarize
//! - [`vignette`]: radial darkening mask
//! - [`histogram`]: per-channel counts and means
//! - [`palette`]: dominant colors by clustering or frequency
//! - [`channels`]: one image per RGB channel

pub mod channels;
pub mod effects;
pub mod histogram;
pub mod palette;
pub mod vignette;

pub use effects::{Effect, apply_effect, luma, sepia};
pub use histogram::{ChannelHistogram, ChannelMeans};
pub use palette::{ColorSwatch, PaletteOptions, PaletteStrategy, extract_palette};
pub use vignette::{apply_vignette, radial_mask};
