//! Raster renderer for composing an image's canvases
//!
//! This module owns the depth-buffered pixel grid and the depth-first walk
//! that paints canvas backgrounds, shapes and child canvases into it.

pub mod color;
pub mod compose;
pub mod config;
pub mod raster;

pub use color::{ColorParseError, PixelColor};
pub use compose::compose;
pub use config::{DepthOverwrite, RasterConfig};
pub use raster::{Raster, DEFAULT_LEGEND};
