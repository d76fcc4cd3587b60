//! Logical coordinate inference and point-to-pixel mapping
//!
//! A canvas' logical coordinate system is either set explicitly or inferred
//! from the coordinate-typed extents of the shapes attached to it. Inference
//! always pads degenerate axes so the logical width and height are nonzero.

use super::error::LayoutError;
use super::types::{
    CanvasCoordinates, CanvasDimension, CanvasLocation, CoordinateBoundingBox,
    CoordinateDescription, Displacement, LocationType, PixelOrigin, Point,
};

/// Reject explicit bounds that are not finite or that do not increase along their axis
pub fn validate_coordinates(coordinates: &CanvasCoordinates) -> Result<(), LayoutError> {
    let sides = [
        ("left", coordinates.left),
        ("right", coordinates.right),
        ("bottom", coordinates.bottom),
        ("top", coordinates.top),
    ];
    for (parameter, value) in sides {
        if let Some(value) = value.filter(|v| !v.is_finite()) {
            return Err(LayoutError::NonFiniteParameter {
                fix: "Coordinates",
                parameter,
                value,
            });
        }
    }

    let axes = [
        (CanvasDimension::X, coordinates.left, coordinates.right),
        (CanvasDimension::Y, coordinates.bottom, coordinates.top),
    ];
    for (dimension, low, high) in axes {
        if let (Some(low), Some(high)) = (low, high) {
            if low >= high {
                return Err(LayoutError::InvalidCoordinates {
                    dimension,
                    low,
                    high,
                });
            }
        }
    }
    Ok(())
}

/// Fold shape bounding boxes into a single observed extent
pub fn observed_extent<'a>(
    boxes: impl IntoIterator<Item = &'a CoordinateBoundingBox>,
) -> CoordinateBoundingBox {
    let fold_min = |acc: Option<f64>, v: Option<f64>| match (acc, v) {
        (Some(a), Some(v)) => Some(a.min(v)),
        (None, v) => v,
        (a, None) => a,
    };
    let fold_max = |acc: Option<f64>, v: Option<f64>| match (acc, v) {
        (Some(a), Some(v)) => Some(a.max(v)),
        (None, v) => v,
        (a, None) => a,
    };

    boxes
        .into_iter()
        .fold(CoordinateBoundingBox::empty(), |acc, b| CoordinateBoundingBox {
            min_x: fold_min(acc.min_x, b.min_x),
            max_x: fold_max(acc.max_x, b.max_x),
            min_y: fold_min(acc.min_y, b.min_y),
            max_y: fold_max(acc.max_y, b.max_y),
        })
}

/// Resolve one axis; explicit bounds win, observed values come next, padding last.
///
/// A single explicit bound that meets or crosses the observed opposite side
/// is padded by `epsilon` instead, so the result always increases.
fn resolve_axis(
    explicit: (Option<f64>, Option<f64>),
    observed: (Option<f64>, Option<f64>),
    epsilon: f64,
) -> (f64, f64) {
    let (low, high) = match observed {
        (Some(min), Some(max)) if min == max => (min - epsilon, min + epsilon),
        (Some(min), Some(max)) => (min, max),
        (Some(v), None) | (None, Some(v)) => (v - epsilon, v + epsilon),
        (None, None) => (-epsilon, epsilon),
    };
    let (low, high) = (explicit.0.unwrap_or(low), explicit.1.unwrap_or(high));
    if low < high {
        return (low, high);
    }
    match explicit {
        (Some(low), None) => (low, low + epsilon),
        (None, Some(high)) => (high - epsilon, high),
        _ => {
            let middle = (low + high) / 2.0;
            (middle - epsilon, middle + epsilon)
        }
    }
}

/// Infer a canvas' coordinate description from its shapes' logical extents
pub fn infer_coordinates<'a>(
    boxes: impl IntoIterator<Item = &'a CoordinateBoundingBox>,
    explicit: &CanvasCoordinates,
    epsilon: f64,
) -> CoordinateDescription {
    let observed = observed_extent(boxes);
    let (left, right) = resolve_axis(
        (explicit.left, explicit.right),
        (observed.min_x, observed.max_x),
        epsilon,
    );
    let (bottom, top) = resolve_axis(
        (explicit.bottom, explicit.top),
        (observed.min_y, observed.max_y),
        epsilon,
    );
    CoordinateDescription {
        left,
        right,
        bottom,
        top,
    }
}

/// Pixel rectangle and logical bounds of one canvas, used to place points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasMapping {
    pub location: CanvasLocation,
    pub coordinates: CoordinateDescription,
}

impl CanvasMapping {
    pub fn new(location: CanvasLocation, coordinates: CoordinateDescription) -> Self {
        Self {
            location,
            coordinates,
        }
    }

    /// Convert a point to absolute pixel coordinates
    ///
    /// With [`PixelOrigin::Canvas`], pixel-typed values are measured from the
    /// canvas' bottom-left corner instead of the image origin.
    pub fn point_to_pixels(&self, point: &Point, origin: PixelOrigin) -> (f64, f64) {
        let loc = &self.location;
        let coords = &self.coordinates;
        let x = Self::axis_to_pixels(
            point.x,
            point.type_x,
            f64::from(loc.left),
            loc.width() as f64,
            coords.left,
            coords.width(),
            origin,
        );
        let y = Self::axis_to_pixels(
            point.y,
            point.type_y,
            f64::from(loc.bottom),
            loc.height() as f64,
            coords.bottom,
            coords.height(),
            origin,
        );
        (x, y)
    }

    fn axis_to_pixels(
        value: f64,
        kind: LocationType,
        pixel_low: f64,
        pixel_extent: f64,
        logical_low: f64,
        logical_extent: f64,
        origin: PixelOrigin,
    ) -> f64 {
        match kind {
            LocationType::Pixels => match origin {
                PixelOrigin::Absolute => value,
                PixelOrigin::Canvas => pixel_low + value,
            },
            LocationType::Proportional => pixel_low + pixel_extent * value,
            LocationType::Coordinate => {
                pixel_low + pixel_extent * (value - logical_low) / logical_extent
            }
        }
    }

    /// Convert a displacement to pixels; only the per-axis scale applies
    pub fn displacement_to_pixels(&self, displacement: &Displacement) -> (f64, f64) {
        let scale = |value: f64, kind: LocationType, pixel_extent: i64, logical_extent: f64| match kind {
            LocationType::Pixels => value,
            LocationType::Proportional => pixel_extent as f64 * value,
            LocationType::Coordinate => pixel_extent as f64 * value / logical_extent,
        };
        (
            scale(
                displacement.dx,
                displacement.type_dx,
                self.location.width(),
                self.coordinates.width(),
            ),
            scale(
                displacement.dy,
                displacement.type_dy,
                self.location.height(),
                self.coordinates.height(),
            ),
        )
    }

    /// Map absolute pixel coordinates back into logical space
    ///
    /// Returns `None` when the canvas has no pixel extent on either axis.
    pub fn pixels_to_coordinates(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let loc = &self.location;
        if loc.width() == 0 || loc.height() == 0 {
            return None;
        }
        let coords = &self.coordinates;
        let fx = (x - f64::from(loc.left)) / loc.width() as f64;
        let fy = (y - f64::from(loc.bottom)) / loc.height() as f64;
        Some((
            coords.left + fx * coords.width(),
            coords.bottom + fy * coords.height(),
        ))
    }
}
