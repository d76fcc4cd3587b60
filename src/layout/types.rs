//! Core types for the layout engine

use std::fmt;

use serde::Deserialize;

/// One side (or center line) of a canvas rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasPart {
    Left,
    Right,
    Bottom,
    Top,
    /// Center X = (Left + Right) / 2 (derived, not an unknown of its own)
    CenterX,
    /// Center Y = (Bottom + Top) / 2 (derived, not an unknown of its own)
    CenterY,
}

impl fmt::Display for CanvasPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CanvasPart::Left => "Left",
            CanvasPart::Right => "Right",
            CanvasPart::Bottom => "Bottom",
            CanvasPart::Top => "Top",
            CanvasPart::CenterX => "CenterX",
            CanvasPart::CenterY => "CenterY",
        };
        f.write_str(name)
    }
}

/// An axis of a canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasDimension {
    X,
    Y,
}

impl CanvasDimension {
    /// The lesser side along this dimension (Left or Bottom)
    pub fn low(self) -> CanvasPart {
        match self {
            CanvasDimension::X => CanvasPart::Left,
            CanvasDimension::Y => CanvasPart::Bottom,
        }
    }

    /// The greater side along this dimension (Right or Top)
    pub fn high(self) -> CanvasPart {
        match self {
            CanvasDimension::X => CanvasPart::Right,
            CanvasDimension::Y => CanvasPart::Top,
        }
    }
}

impl fmt::Display for CanvasDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanvasDimension::X => f.write_str("X"),
            CanvasDimension::Y => f.write_str("Y"),
        }
    }
}

/// The four unknowns solved for each locatable, in column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Bottom,
    Right,
    Top,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Left, Side::Bottom, Side::Right, Side::Top];

    /// Offset of this unknown inside a locatable's block of four columns
    pub fn offset(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Bottom => 1,
            Side::Right => 2,
            Side::Top => 3,
        }
    }

    pub fn from_offset(offset: usize) -> Side {
        Self::ALL[offset % 4]
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Side::Left => "Left",
            Side::Bottom => "Bottom",
            Side::Right => "Right",
            Side::Top => "Top",
        };
        f.write_str(name)
    }
}

/// Solved pixel rectangle of a canvas, half-open: `[left, right) x [bottom, top)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CanvasLocation {
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
    pub top: i32,
}

impl CanvasLocation {
    pub fn new(left: i32, bottom: i32, right: i32, top: i32) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    pub fn width(&self) -> i64 {
        i64::from(self.right) - i64::from(self.left)
    }

    pub fn height(&self) -> i64 {
        i64::from(self.top) - i64::from(self.bottom)
    }

    /// Whether the pixel `(x, y)` lies inside the half-open rectangle
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.left <= x && x < self.right && self.bottom <= y && y < self.top
    }

    /// A malformed constraint set can produce inverted rectangles; the solver does not prevent it
    pub fn is_well_formed(&self) -> bool {
        self.left <= self.right && self.bottom <= self.top
    }
}

impl fmt::Display for CanvasLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ left: {}, bottom: {}, right: {}, top: {} }}",
            self.left, self.bottom, self.right, self.top
        )
    }
}

/// Explicit logical bounds requested for a canvas; each side may be left unset
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct CanvasCoordinates {
    pub left: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub top: Option<f64>,
}

impl CanvasCoordinates {
    /// Fully specified bounds on both axes
    pub fn new(left: f64, right: f64, bottom: f64, top: f64) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
            bottom: Some(bottom),
            top: Some(top),
        }
    }

    pub fn with_x(mut self, left: f64, right: f64) -> Self {
        self.left = Some(left);
        self.right = Some(right);
        self
    }

    pub fn with_y(mut self, bottom: f64, top: f64) -> Self {
        self.bottom = Some(bottom);
        self.top = Some(top);
        self
    }
}

/// Resolved logical coordinate system of a canvas
///
/// Produced by coordinate inference; every side is always present and the
/// extents along each axis are never zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateDescription {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl CoordinateDescription {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }
}

impl Default for CoordinateDescription {
    fn default() -> Self {
        let epsilon = super::config::DEFAULT_COORDINATE_EPSILON;
        Self {
            left: -epsilon,
            right: epsilon,
            bottom: -epsilon,
            top: epsilon,
        }
    }
}

/// Logical-space extent of a shape; absent fields mean the shape has no
/// coordinate-typed value along that side
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CoordinateBoundingBox {
    pub min_x: Option<f64>,
    pub max_x: Option<f64>,
    pub min_y: Option<f64>,
    pub max_y: Option<f64>,
}

impl CoordinateBoundingBox {
    /// A box with no coordinate extent at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Grow the x extent to include `x`
    pub fn include_x(&mut self, x: f64) {
        self.min_x = Some(self.min_x.map_or(x, |m| m.min(x)));
        self.max_x = Some(self.max_x.map_or(x, |m| m.max(x)));
    }

    /// Grow the y extent to include `y`
    pub fn include_y(&mut self, y: f64) {
        self.min_y = Some(self.min_y.map_or(y, |m| m.min(y)));
        self.max_y = Some(self.max_y.map_or(y, |m| m.max(y)));
    }
}

/// The coordinate space a value is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    /// Fraction (0..1) of the canvas' own pixel extent
    Proportional,
    /// Logical (data-space) value, mapped through the canvas coordinate description
    Coordinate,
    #[default]
    Pixels,
}

/// Whether pixel-typed values are absolute or measured from the canvas origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelOrigin {
    #[default]
    Absolute,
    Canvas,
}

/// A point whose axes may each live in a different coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub type_x: LocationType,
    #[serde(default)]
    pub type_y: LocationType,
}

impl Point {
    pub fn new(x: f64, y: f64, type_x: LocationType, type_y: LocationType) -> Self {
        Self {
            x,
            y,
            type_x,
            type_y,
        }
    }

    pub fn coordinate(x: f64, y: f64) -> Self {
        Self::new(x, y, LocationType::Coordinate, LocationType::Coordinate)
    }

    pub fn relative(x: f64, y: f64) -> Self {
        Self::new(x, y, LocationType::Proportional, LocationType::Proportional)
    }

    pub fn pixels(x: f64, y: f64) -> Self {
        Self::new(x, y, LocationType::Pixels, LocationType::Pixels)
    }
}

/// A displacement, e.g. from a point. Has no absolute position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Displacement {
    pub dx: f64,
    pub dy: f64,
    pub type_dx: LocationType,
    pub type_dy: LocationType,
}

impl Displacement {
    pub fn new(dx: f64, dy: f64, type_dx: LocationType, type_dy: LocationType) -> Self {
        Self {
            dx,
            dy,
            type_dx,
            type_dy,
        }
    }

    pub fn pixels(dx: f64, dy: f64) -> Self {
        Self::new(dx, dy, LocationType::Pixels, LocationType::Pixels)
    }
}

/// A scalar length in one coordinate space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distance {
    pub distance: f64,
    pub kind: LocationType,
}

impl Distance {
    pub fn new(distance: f64, kind: LocationType) -> Self {
        Self { distance, kind }
    }

    /// The same length along both axes
    pub fn as_displacement(&self) -> Displacement {
        Displacement::new(self.distance, self.distance, self.kind, self.kind)
    }
}
