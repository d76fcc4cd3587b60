//! Error types for the layout engine

use thiserror::Error;

use super::registry::{CanvasId, LocatableId};
use super::solver::SolverError;
use super::types::CanvasDimension;

/// Errors that can occur during layout computation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// A fix refers to something that was never registered with the image
    #[error("{id} is not registered with the image")]
    UnregisteredLocatable { id: LocatableId },

    /// A canvas id that does not belong to this image
    #[error("canvas #{} does not exist in this image", .id.index())]
    UnknownCanvas { id: CanvasId },

    /// Dimension fixes need a positive extent
    #[error("extent must be positive, got {extent}")]
    InvalidExtent { extent: f64 },

    /// Images need a positive pixel size on both axes
    #[error("image size must be positive, got {width}x{height}")]
    InvalidImageSize { width: i32, height: i32 },

    /// Explicit logical bounds must increase along their axis
    #[error("logical {dimension} bounds must increase, got {low} to {high}")]
    InvalidCoordinates {
        dimension: CanvasDimension,
        low: f64,
        high: f64,
    },

    /// Axis padding must be a positive, finite number
    #[error("coordinate epsilon must be positive, got {epsilon}")]
    InvalidEpsilon { epsilon: f64 },

    /// Marker half-widths cannot be negative
    #[error("marker radius must not be negative, got {radius}")]
    InvalidRadius { radius: i32 },

    /// Relative-size fixes need a positive scale
    #[error("scale must be positive, got {scale}")]
    InvalidScale { scale: f64 },

    /// NaN or infinite fix parameter
    #[error("{fix} parameter '{parameter}' must be finite, got {value}")]
    NonFiniteParameter {
        fix: &'static str,
        parameter: &'static str,
        value: f64,
    },

    /// Data-bearing shape given arrays of different lengths
    #[error("mismatched data lengths: {x_len} x values but {y_len} y values")]
    MismatchedLengths { x_len: usize, y_len: usize },

    /// Layout is ill-posed
    #[error("constraint solver error: {0}")]
    Solver(#[from] SolverError),

    /// Diagnostics were produced and the caller asked for them to be fatal
    #[error("layout produced {count} diagnostic warning(s) in strict mode")]
    Diagnostics { count: usize },
}

impl LayoutError {
    /// Create a mismatched lengths error
    pub fn mismatched(x_len: usize, y_len: usize) -> Self {
        Self::MismatchedLengths { x_len, y_len }
    }

    /// Whether this error comes from an ill-posed constraint system rather than API misuse
    pub fn is_fatal_layout(&self) -> bool {
        matches!(self, Self::Solver(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unregistered_display() {
        let err = LayoutError::UnregisteredLocatable {
            id: LocatableId::Canvas(CanvasId(3)),
        };
        assert_eq!(err.to_string(), "canvas #3 is not registered with the image");
    }

    #[test]
    fn test_solver_error_conversion() {
        let err: LayoutError = SolverError::NonSquare { rows: 8, columns: 4 }.into();
        assert!(err.is_fatal_layout());
        assert!(err.to_string().contains("over-constrained by 4"));
    }

    #[test]
    fn test_invalid_coordinates_display() {
        let err = LayoutError::InvalidCoordinates {
            dimension: CanvasDimension::X,
            low: 5.0,
            high: 5.0,
        };
        assert_eq!(err.to_string(), "logical X bounds must increase, got 5 to 5");
        assert!(!err.is_fatal_layout());
    }

    #[test]
    fn test_mismatched_display() {
        let err = LayoutError::mismatched(3, 2);
        assert!(err.to_string().contains("3 x values but 2 y values"));
        assert!(!err.is_fatal_layout());
    }
}
