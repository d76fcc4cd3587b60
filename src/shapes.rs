//! Drawable shapes attached to canvases
//!
//! Shapes never see final pixel rectangles directly. They report the logical
//! extent they occupy, and when asked to draw they convert their points
//! through the [`DrawTarget`] handed to them by the compositor.

use std::fmt;

use crate::layout::{
    CanvasMapping, CoordinateBoundingBox, LayoutError, LocationType, PixelOrigin, Point,
};
use crate::renderer::{PixelColor, Raster};

/// Where a shape draws: the raster plus the placement of its canvas
pub struct DrawTarget<'a> {
    pub raster: &'a mut Raster,
    pub mapping: CanvasMapping,
    /// Depth for shapes that do not choose their own
    pub default_depth: f64,
}

impl<'a> DrawTarget<'a> {
    pub fn new(raster: &'a mut Raster, mapping: CanvasMapping, default_depth: f64) -> Self {
        Self {
            raster,
            mapping,
            default_depth,
        }
    }

    /// Absolute pixel position of a point on this canvas
    pub fn to_pixels(&self, point: &Point) -> (f64, f64) {
        self.mapping.point_to_pixels(point, PixelOrigin::Absolute)
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: PixelColor, depth: f64) -> bool {
        self.raster.set_pixel(x, y, color, depth)
    }

    /// Fill the half-open pixel rectangle `[x0, x1) x [y0, y1)`
    pub fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: PixelColor, depth: f64) {
        self.raster.fill_rect(x0, y0, x1, y1, color, depth);
    }
}

/// Something that can be attached to a canvas and drawn into a raster
pub trait Shape: fmt::Debug {
    /// Logical extent; only coordinate-typed axes contribute
    fn bounding_box(&self) -> CoordinateBoundingBox;

    /// Draw into the target
    fn draw(&self, target: &mut DrawTarget<'_>);
}

/// Extend `bbox` with the coordinate-typed axes of `point`
fn include_point(bbox: &mut CoordinateBoundingBox, point: &Point) {
    if point.type_x == LocationType::Coordinate {
        bbox.include_x(point.x);
    }
    if point.type_y == LocationType::Coordinate {
        bbox.include_y(point.y);
    }
}

// ============================================================================
// Block
// ============================================================================

/// An axis-aligned filled rectangle between two corners
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub first: Point,
    pub second: Point,
    pub color: PixelColor,
    pub depth: Option<f64>,
}

impl Block {
    pub fn new(first: Point, second: Point, color: PixelColor) -> Self {
        Self {
            first,
            second,
            color,
            depth: None,
        }
    }

    pub fn with_depth(mut self, depth: f64) -> Self {
        self.depth = Some(depth);
        self
    }
}

impl Shape for Block {
    fn bounding_box(&self) -> CoordinateBoundingBox {
        let mut bbox = CoordinateBoundingBox::empty();
        include_point(&mut bbox, &self.first);
        include_point(&mut bbox, &self.second);
        bbox
    }

    fn draw(&self, target: &mut DrawTarget<'_>) {
        let (ax, ay) = target.to_pixels(&self.first);
        let (bx, by) = target.to_pixels(&self.second);
        let depth = self.depth.unwrap_or(target.default_depth);
        target.fill_rect(
            ax.min(bx).round() as i32,
            ay.min(by).round() as i32,
            ax.max(bx).round() as i32,
            ay.max(by).round() as i32,
            self.color,
            depth,
        );
    }
}

// ============================================================================
// Markers
// ============================================================================

/// Square markers at data points given as parallel arrays
#[derive(Debug, Clone, PartialEq)]
pub struct Markers {
    xs: Vec<f64>,
    ys: Vec<f64>,
    pub color: PixelColor,
    /// Half-width of each marker in pixels; 0 draws a single pixel
    pub radius: i32,
    pub depth: Option<f64>,
}

impl Markers {
    /// Create markers; `xs` and `ys` must have the same length
    pub fn new(xs: Vec<f64>, ys: Vec<f64>, color: PixelColor) -> Result<Self, LayoutError> {
        if xs.len() != ys.len() {
            return Err(LayoutError::mismatched(xs.len(), ys.len()));
        }
        Ok(Self {
            xs,
            ys,
            color,
            radius: 0,
            depth: None,
        })
    }

    /// Set the marker half-width; negative radii are rejected
    pub fn with_radius(mut self, radius: i32) -> Result<Self, LayoutError> {
        if radius < 0 {
            return Err(LayoutError::InvalidRadius { radius });
        }
        self.radius = radius;
        Ok(self)
    }

    pub fn with_depth(mut self, depth: f64) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.xs
            .iter()
            .zip(&self.ys)
            .map(|(&x, &y)| Point::coordinate(x, y))
    }
}

impl Shape for Markers {
    fn bounding_box(&self) -> CoordinateBoundingBox {
        let mut bbox = CoordinateBoundingBox::empty();
        for point in self.points() {
            include_point(&mut bbox, &point);
        }
        bbox
    }

    fn draw(&self, target: &mut DrawTarget<'_>) {
        let depth = self.depth.unwrap_or(target.default_depth);
        for point in self.points() {
            let (px, py) = target.to_pixels(&point);
            let (cx, cy) = (px.floor() as i32, py.floor() as i32);
            target.fill_rect(
                cx.saturating_sub(self.radius),
                cy.saturating_sub(self.radius),
                cx.saturating_add(self.radius).saturating_add(1),
                cy.saturating_add(self.radius).saturating_add(1),
                self.color,
                depth,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{CanvasLocation, CoordinateDescription};

    fn unit_mapping() -> CanvasMapping {
        CanvasMapping::new(
            CanvasLocation::new(0, 0, 10, 10),
            CoordinateDescription {
                left: 0.0,
                right: 10.0,
                bottom: 0.0,
                top: 10.0,
            },
        )
    }

    #[test]
    fn test_markers_reject_mismatched_lengths() {
        let err = Markers::new(vec![1.0, 2.0], vec![1.0], PixelColor::BLACK).unwrap_err();
        assert_eq!(err, LayoutError::MismatchedLengths { x_len: 2, y_len: 1 });
    }

    #[test]
    fn test_markers_bounding_box() {
        let markers = Markers::new(vec![3.0, -1.0, 2.0], vec![0.5, 4.0, 1.0], PixelColor::BLACK).unwrap();
        let bbox = markers.bounding_box();
        assert_eq!((bbox.min_x, bbox.max_x), (Some(-1.0), Some(3.0)));
        assert_eq!((bbox.min_y, bbox.max_y), (Some(0.5), Some(4.0)));
    }

    #[test]
    fn test_block_bbox_ignores_non_coordinate_axes() {
        let block = Block::new(
            Point::new(1.0, 0.0, LocationType::Coordinate, LocationType::Proportional),
            Point::new(4.0, 1.0, LocationType::Coordinate, LocationType::Proportional),
            PixelColor::RED,
        );
        let bbox = block.bounding_box();
        assert_eq!((bbox.min_x, bbox.max_x), (Some(1.0), Some(4.0)));
        assert_eq!((bbox.min_y, bbox.max_y), (None, None));
    }

    #[test]
    fn test_block_draws_half_open_rect() {
        let mut raster = Raster::new(10, 10);
        let block = Block::new(Point::pixels(2.0, 3.0), Point::pixels(4.0, 5.0), PixelColor::RED);
        block.draw(&mut DrawTarget::new(&mut raster, unit_mapping(), 1.0));

        assert_eq!(raster.get_pixel(2, 3), Some(PixelColor::RED));
        assert_eq!(raster.get_pixel(3, 4), Some(PixelColor::RED));
        assert_eq!(raster.get_pixel(4, 4), Some(PixelColor::WHITE));
        assert_eq!(raster.depth(2, 3), Some(1.0));
    }

    #[test]
    fn test_markers_draw_at_data_points() {
        let mut raster = Raster::new(10, 10);
        let markers = Markers::new(vec![5.0], vec![2.0], PixelColor::BLUE)
            .unwrap()
            .with_depth(3.0);
        markers.draw(&mut DrawTarget::new(&mut raster, unit_mapping(), 1.0));

        assert_eq!(raster.get_pixel(5, 2), Some(PixelColor::BLUE));
        assert_eq!(raster.depth(5, 2), Some(3.0));
        assert_eq!(raster.distinct_colors().len(), 2);
    }

    #[test]
    fn test_markers_reject_negative_radius() {
        let err = Markers::new(vec![1.0], vec![1.0], PixelColor::BLACK)
            .unwrap()
            .with_radius(-2)
            .unwrap_err();
        assert_eq!(err, LayoutError::InvalidRadius { radius: -2 });
    }

    #[test]
    fn test_huge_marker_fills_the_raster() {
        let mut raster = Raster::new(10, 10);
        let markers = Markers::new(vec![5.0], vec![5.0], PixelColor::RED)
            .unwrap()
            .with_radius(i32::MAX)
            .unwrap();
        markers.draw(&mut DrawTarget::new(&mut raster, unit_mapping(), 1.0));

        assert_eq!(raster.distinct_colors(), vec![PixelColor::RED]);
    }
}
