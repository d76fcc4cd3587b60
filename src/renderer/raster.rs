//! Depth-buffered pixel raster
//!
//! Row 0 is the bottom row of the image and `y` grows upward, the same
//! orientation canvas locations use. Export helpers that need the usual
//! top-first order flip explicitly.

use crate::layout::CanvasLocation;

use super::color::PixelColor;
use super::config::{DepthOverwrite, RasterConfig};

/// Characters used by [`Raster::to_ascii`] when no legend is given
pub const DEFAULT_LEGEND: &str = ".#*o+x=%@";

/// A pixel grid with a parallel depth grid and an active clip rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<PixelColor>,
    /// `None` until the first write to a pixel
    depth: Vec<Option<f64>>,
    permitted: CanvasLocation,
    overwrite: DepthOverwrite,
}

impl Raster {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_config(width, height, &RasterConfig::default())
    }

    pub fn with_config(width: usize, height: usize, config: &RasterConfig) -> Self {
        Self {
            width,
            height,
            pixels: vec![config.clear_color; width * height],
            depth: vec![None; width * height],
            permitted: Self::full_region(width, height),
            overwrite: config.overwrite,
        }
    }

    fn full_region(width: usize, height: usize) -> CanvasLocation {
        CanvasLocation::new(0, 0, clamp_dim(width), clamp_dim(height))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn overwrite(&self) -> DepthOverwrite {
        self.overwrite
    }

    pub fn set_overwrite(&mut self, overwrite: DepthOverwrite) {
        self.overwrite = overwrite;
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }

    /// Write a pixel if it is inside the permitted region and wins the depth test.
    ///
    /// Returns whether the pixel was written.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: PixelColor, depth: f64) -> bool {
        if !self.permitted.contains(x, y) {
            return false;
        }
        let Some(i) = self.index(x, y) else {
            return false;
        };
        let wins = match self.depth[i] {
            None => true,
            Some(stored) => match self.overwrite {
                DepthOverwrite::Greater => depth > stored,
                DepthOverwrite::GreaterOrEqual => depth >= stored,
            },
        };
        if wins {
            self.pixels[i] = color;
            self.depth[i] = Some(depth);
        }
        wins
    }

    /// Fill the half-open rectangle `[x0, x1) x [y0, y1)`.
    ///
    /// Only pixels inside the permitted region are visited.
    pub fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: PixelColor, depth: f64) {
        let region = self.permitted;
        for y in y0.max(region.bottom)..y1.min(region.top) {
            for x in x0.max(region.left)..x1.min(region.right) {
                self.set_pixel(x, y, color, depth);
            }
        }
    }

    /// Color at `(x, y)`, or `None` outside the raster
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<PixelColor> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Stored depth at `(x, y)`; `None` if outside or never written
    pub fn depth(&self, x: i32, y: i32) -> Option<f64> {
        self.index(x, y).and_then(|i| self.depth[i])
    }

    /// Restrict writes to `[xlow, xhi) x [ylow, yhi)`, clamped to the raster
    pub fn set_permitted_region(&mut self, xlow: i32, xhi: i32, ylow: i32, yhi: i32) {
        let full = Self::full_region(self.width, self.height);
        self.permitted = CanvasLocation::new(
            xlow.max(full.left),
            ylow.max(full.bottom),
            xhi.min(full.right),
            yhi.min(full.top),
        );
    }

    /// Restrict writes to a canvas' rectangle
    pub fn permit_location(&mut self, location: &CanvasLocation) {
        self.set_permitted_region(location.left, location.right, location.bottom, location.top);
    }

    /// Allow writes anywhere in the raster
    pub fn reset_permitted_region(&mut self) {
        self.permitted = Self::full_region(self.width, self.height);
    }

    pub fn permitted_region(&self) -> CanvasLocation {
        self.permitted
    }

    /// Rows from the top of the image down
    pub fn rows_top_down(&self) -> impl Iterator<Item = &[PixelColor]> + '_ {
        self.pixels.chunks(self.width.max(1)).rev().take(self.height)
    }

    /// Every color in the raster, in order of first appearance reading top-down
    pub fn distinct_colors(&self) -> Vec<PixelColor> {
        let mut colors: Vec<PixelColor> = Vec::new();
        for row in self.rows_top_down() {
            for color in row {
                if !colors.contains(color) {
                    colors.push(*color);
                }
            }
        }
        colors
    }

    /// Character preview, one character per pixel, top row first.
    ///
    /// Colors are assigned legend characters in order of first appearance;
    /// colors beyond the legend's length render as `?`.
    pub fn to_ascii(&self, legend: &str) -> String {
        let colors = self.distinct_colors();
        let symbols: Vec<char> = legend.chars().collect();
        let symbol = |color: &PixelColor| {
            colors
                .iter()
                .position(|c| c == color)
                .and_then(|i| symbols.get(i).copied())
                .unwrap_or('?')
        };
        self.rows_top_down()
            .map(|row| row.iter().map(symbol).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn clamp_dim(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}
