//! Configuration for rasterization

use serde::Deserialize;

use super::color::PixelColor;

/// How a write at the same depth as the stored pixel is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthOverwrite {
    /// Only strictly deeper writes win
    Greater,
    /// Ties overwrite, so the later write wins
    #[default]
    GreaterOrEqual,
}

/// Configuration options for raster output
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Tie-break policy for equal depths
    pub overwrite: DepthOverwrite,

    /// Depth at which canvas backgrounds are painted
    pub background_depth: f64,

    /// Depth given to shapes that do not set one
    pub default_shape_depth: f64,

    /// Color of pixels nothing has been written to
    pub clear_color: PixelColor,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            overwrite: DepthOverwrite::default(),
            background_depth: 0.0,
            default_shape_depth: 1.0,
            clear_color: PixelColor::WHITE,
        }
    }
}

impl RasterConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the depth tie-break policy
    pub fn with_overwrite(mut self, overwrite: DepthOverwrite) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Set the depth used for canvas backgrounds
    pub fn with_background_depth(mut self, depth: f64) -> Self {
        self.background_depth = depth;
        self
    }

    /// Set the depth used by shapes without an explicit depth
    pub fn with_default_shape_depth(mut self, depth: f64) -> Self {
        self.default_shape_depth = depth;
        self
    }

    /// Set the color of untouched pixels
    pub fn with_clear_color(mut self, color: PixelColor) -> Self {
        self.clear_color = color;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RasterConfig::default();
        assert_eq!(config.overwrite, DepthOverwrite::GreaterOrEqual);
        assert_eq!(config.background_depth, 0.0);
        assert_eq!(config.default_shape_depth, 1.0);
        assert_eq!(config.clear_color, PixelColor::WHITE);
    }

    #[test]
    fn test_builder_pattern() {
        let config = RasterConfig::new()
            .with_overwrite(DepthOverwrite::Greater)
            .with_clear_color(PixelColor::BLACK);

        assert_eq!(config.overwrite, DepthOverwrite::Greater);
        assert_eq!(config.clear_color, PixelColor::BLACK);
    }

    #[test]
    fn test_toml_override() {
        let config: RasterConfig =
            toml::from_str("overwrite = \"greater\"\nclear_color = \"#000000\"").unwrap();
        assert_eq!(config.overwrite, DepthOverwrite::Greater);
        assert_eq!(config.clear_color, PixelColor::BLACK);
        assert_eq!(config.default_shape_depth, 1.0);
    }
}
