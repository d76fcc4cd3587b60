//! Layout constraints ("fixes")
//!
//! Each fix contributes exactly one row to the linear system solved by
//! [`super::solver`]. Columns come in blocks of four per registered
//! locatable, ordered Left, Bottom, Right, Top.

use std::fmt;

use super::error::LayoutError;
use super::registry::{LocatableId, LocatableRegistry};
use super::solver::LinearSystem;
use super::types::{CanvasDimension, CanvasPart, Side};

/// The four kinds of constraint
#[derive(Debug, Clone, PartialEq)]
pub enum FixKind {
    /// `second.second_part - first.first_part = pixels_diff`
    Relationship {
        first: LocatableId,
        first_part: CanvasPart,
        second: LocatableId,
        second_part: CanvasPart,
        pixels_diff: f64,
    },

    /// `target.high(dimension) - target.low(dimension) = extent`
    Dimensions {
        target: LocatableId,
        dimension: CanvasDimension,
        extent: f64,
    },

    /// `target.target_part = (1 - lambda) * reference.low(dimension) + lambda * reference.high(dimension)`
    Scale {
        target: LocatableId,
        target_part: CanvasPart,
        reference: LocatableId,
        dimension: CanvasDimension,
        lambda: f64,
    },

    /// `size(target, target_dimension) = scale * size(reference, reference_dimension)`
    RelativeSize {
        target: LocatableId,
        target_dimension: CanvasDimension,
        reference: LocatableId,
        reference_dimension: CanvasDimension,
        scale: f64,
    },
}

/// An immutable layout constraint with an optional description for diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    kind: FixKind,
    description: Option<String>,
}

impl Fix {
    pub fn new(kind: FixKind) -> Self {
        Self {
            kind,
            description: None,
        }
    }

    /// `second.second_part - first.first_part = pixels_diff`
    pub fn relationship(
        first: impl Into<LocatableId>,
        first_part: CanvasPart,
        second: impl Into<LocatableId>,
        second_part: CanvasPart,
        pixels_diff: f64,
    ) -> Self {
        Self::new(FixKind::Relationship {
            first: first.into(),
            first_part,
            second: second.into(),
            second_part,
            pixels_diff,
        })
    }

    pub fn dimensions(target: impl Into<LocatableId>, dimension: CanvasDimension, extent: f64) -> Self {
        Self::new(FixKind::Dimensions {
            target: target.into(),
            dimension,
            extent,
        })
    }

    pub fn scale(
        target: impl Into<LocatableId>,
        target_part: CanvasPart,
        reference: impl Into<LocatableId>,
        dimension: CanvasDimension,
        lambda: f64,
    ) -> Self {
        Self::new(FixKind::Scale {
            target: target.into(),
            target_part,
            reference: reference.into(),
            dimension,
            lambda,
        })
    }

    pub fn relative_size(
        target: impl Into<LocatableId>,
        target_dimension: CanvasDimension,
        reference: impl Into<LocatableId>,
        reference_dimension: CanvasDimension,
        scale: f64,
    ) -> Self {
        Self::new(FixKind::RelativeSize {
            target: target.into(),
            target_dimension,
            reference: reference.into(),
            reference_dimension,
            scale,
        })
    }

    /// Attach a human-readable description, reported by diagnostics
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn kind(&self) -> &FixKind {
        &self.kind
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Short name of the fix kind
    pub fn name(&self) -> &'static str {
        match self.kind {
            FixKind::Relationship { .. } => "FixRelationship",
            FixKind::Dimensions { .. } => "FixDimensions",
            FixKind::Scale { .. } => "FixScale",
            FixKind::RelativeSize { .. } => "FixRelativeSize",
        }
    }

    /// Every locatable this fix refers to
    pub fn locatables(&self) -> Vec<LocatableId> {
        match &self.kind {
            FixKind::Relationship { first, second, .. } => vec![*first, *second],
            FixKind::Dimensions { target, .. } => vec![*target],
            FixKind::Scale {
                target, reference, ..
            }
            | FixKind::RelativeSize {
                target, reference, ..
            } => vec![*target, *reference],
        }
    }

    /// Check the numeric parameters.
    ///
    /// Extents and relative-size scales must be finite and positive; offsets and
    /// interpolation fractions must be finite.
    pub fn validate(&self) -> Result<(), LayoutError> {
        match &self.kind {
            FixKind::Relationship { pixels_diff, .. } => finite(self.name(), "pixels_diff", *pixels_diff),
            FixKind::Dimensions { extent, .. } => {
                finite(self.name(), "extent", *extent)?;
                if *extent <= 0.0 {
                    return Err(LayoutError::InvalidExtent { extent: *extent });
                }
                Ok(())
            }
            FixKind::Scale { lambda, .. } => finite(self.name(), "lambda", *lambda),
            FixKind::RelativeSize { scale, .. } => {
                finite(self.name(), "scale", *scale)?;
                if *scale <= 0.0 {
                    return Err(LayoutError::InvalidScale { scale: *scale });
                }
                Ok(())
            }
        }
    }

    /// Write this fix into `row` of the system, resolving identities through `registry`
    pub fn create(
        &self,
        row: usize,
        system: &mut LinearSystem,
        registry: &LocatableRegistry,
    ) -> Result<(), LayoutError> {
        let index = |id: LocatableId| {
            registry
                .index_of(id)
                .ok_or(LayoutError::UnregisteredLocatable { id })
        };

        match &self.kind {
            FixKind::Relationship {
                first,
                first_part,
                second,
                second_part,
                pixels_diff,
            } => {
                let (i1, i2) = (index(*first)?, index(*second)?);
                add_for_part(system, row, -1.0, *first_part, i1);
                add_for_part(system, row, 1.0, *second_part, i2);
                system.set_constant(row, *pixels_diff);
            }
            FixKind::Dimensions {
                target,
                dimension,
                extent,
            } => {
                let i = index(*target)?;
                add_for_part(system, row, -1.0, dimension.low(), i);
                add_for_part(system, row, 1.0, dimension.high(), i);
                system.set_constant(row, *extent);
            }
            FixKind::Scale {
                target,
                target_part,
                reference,
                dimension,
                lambda,
            } => {
                let (i1, i2) = (index(*target)?, index(*reference)?);
                add_for_part(system, row, 1.0, *target_part, i1);
                add_for_part(system, row, -(1.0 - lambda), dimension.low(), i2);
                add_for_part(system, row, -lambda, dimension.high(), i2);
                system.set_constant(row, 0.0);
            }
            FixKind::RelativeSize {
                target,
                target_dimension,
                reference,
                reference_dimension,
                scale,
            } => {
                let (i1, i2) = (index(*target)?, index(*reference)?);
                add_for_part(system, row, 1.0, target_dimension.high(), i1);
                add_for_part(system, row, -1.0, target_dimension.low(), i1);
                add_for_part(system, row, -scale, reference_dimension.high(), i2);
                add_for_part(system, row, *scale, reference_dimension.low(), i2);
                system.set_constant(row, 0.0);
            }
        }
        Ok(())
    }
}

impl fmt::Display for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FixKind::Relationship {
                first,
                first_part,
                second,
                second_part,
                pixels_diff,
            } => write!(
                f,
                "{}.{} - {}.{} = {}",
                second, second_part, first, first_part, pixels_diff
            ),
            FixKind::Dimensions {
                target,
                dimension,
                extent,
            } => write!(f, "size({}, {}) = {}", target, dimension, extent),
            FixKind::Scale {
                target,
                target_part,
                reference,
                dimension,
                lambda,
            } => write!(
                f,
                "{}.{} = lerp({}.{}, {}.{}, {})",
                target,
                target_part,
                reference,
                dimension.low(),
                reference,
                dimension.high(),
                lambda
            ),
            FixKind::RelativeSize {
                target,
                target_dimension,
                reference,
                reference_dimension,
                scale,
            } => write!(
                f,
                "size({}, {}) = {} * size({}, {})",
                target, target_dimension, scale, reference, reference_dimension
            ),
        }
    }
}

fn finite(fix: &'static str, parameter: &'static str, value: f64) -> Result<(), LayoutError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(LayoutError::NonFiniteParameter { fix, parameter, value })
    }
}

/// Add `value` to the column(s) of `part` for the locatable at `index`.
///
/// Center parts spread half the coefficient over both sides of their axis.
pub(crate) fn add_for_part(system: &mut LinearSystem, row: usize, value: f64, part: CanvasPart, index: usize) {
    let column = |side: Side| 4 * index + side.offset();
    match part {
        CanvasPart::Left => system.add(row, column(Side::Left), value),
        CanvasPart::Right => system.add(row, column(Side::Right), value),
        CanvasPart::Bottom => system.add(row, column(Side::Bottom), value),
        CanvasPart::Top => system.add(row, column(Side::Top), value),
        CanvasPart::CenterX => {
            system.add(row, column(Side::Left), 0.5 * value);
            system.add(row, column(Side::Right), 0.5 * value);
        }
        CanvasPart::CenterY => {
            system.add(row, column(Side::Bottom), 0.5 * value);
            system.add(row, column(Side::Top), 0.5 * value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::registry::CanvasId;

    fn registry_with(n: usize) -> LocatableRegistry {
        let mut registry = LocatableRegistry::new();
        for i in 0..n {
            registry.add(LocatableId::Canvas(CanvasId(i)));
        }
        registry
    }

    fn canvas(i: usize) -> LocatableId {
        LocatableId::Canvas(CanvasId(i))
    }

    #[test]
    fn test_relationship_row() {
        let registry = registry_with(2);
        let mut system = LinearSystem::zeros(1, 8);
        Fix::relationship(canvas(1), CanvasPart::Left, canvas(0), CanvasPart::Left, 10.0)
            .create(0, &mut system, &registry)
            .unwrap();

        // -1 x Left[1] + 1 x Left[0] = 10
        assert_eq!(system.get(0, 0), 1.0);
        assert_eq!(system.get(0, 4), -1.0);
        assert_eq!(system.constant(0), 10.0);
    }

    #[test]
    fn test_dimension_row() {
        let registry = registry_with(1);
        let mut system = LinearSystem::zeros(1, 4);
        Fix::dimensions(canvas(0), CanvasDimension::Y, 50.0)
            .create(0, &mut system, &registry)
            .unwrap();

        assert_eq!(system.row(0), vec![0.0, -1.0, 0.0, 1.0]);
        assert_eq!(system.constant(0), 50.0);
    }

    #[test]
    fn test_scale_row() {
        let registry = registry_with(2);
        let mut system = LinearSystem::zeros(1, 8);
        Fix::scale(canvas(1), CanvasPart::Left, canvas(0), CanvasDimension::X, 0.25)
            .create(0, &mut system, &registry)
            .unwrap();

        assert_eq!(system.get(0, 4), 1.0);
        assert_eq!(system.get(0, 0), -0.75);
        assert_eq!(system.get(0, 2), -0.25);
        assert_eq!(system.constant(0), 0.0);
    }

    #[test]
    fn test_relative_size_row() {
        let registry = registry_with(2);
        let mut system = LinearSystem::zeros(1, 8);
        Fix::relative_size(canvas(1), CanvasDimension::X, canvas(0), CanvasDimension::Y, 0.3)
            .create(0, &mut system, &registry)
            .unwrap();

        assert_eq!(system.get(0, 6), 1.0);
        assert_eq!(system.get(0, 4), -1.0);
        assert_eq!(system.get(0, 3), -0.3);
        assert_eq!(system.get(0, 1), 0.3);
    }

    #[test]
    fn test_center_part_splits_coefficient() {
        let registry = registry_with(2);
        let mut system = LinearSystem::zeros(1, 8);
        Fix::relationship(canvas(1), CanvasPart::CenterX, canvas(0), CanvasPart::CenterY, 0.0)
            .create(0, &mut system, &registry)
            .unwrap();

        assert_eq!(system.get(0, 4), -0.5);
        assert_eq!(system.get(0, 6), -0.5);
        assert_eq!(system.get(0, 1), 0.5);
        assert_eq!(system.get(0, 3), 0.5);
    }

    #[test]
    fn test_same_column_accumulates() {
        // A part related to itself cancels out instead of overwriting.
        let registry = registry_with(1);
        let mut system = LinearSystem::zeros(1, 4);
        Fix::relationship(canvas(0), CanvasPart::Left, canvas(0), CanvasPart::CenterX, 5.0)
            .create(0, &mut system, &registry)
            .unwrap();

        assert_eq!(system.get(0, 0), -0.5);
        assert_eq!(system.get(0, 2), 0.5);
    }

    #[test]
    fn test_unregistered_locatable_error() {
        let registry = registry_with(1);
        let mut system = LinearSystem::zeros(1, 4);
        let result = Fix::dimensions(canvas(5), CanvasDimension::X, 10.0).create(0, &mut system, &registry);
        assert!(matches!(result, Err(LayoutError::UnregisteredLocatable { .. })));
    }

    #[test]
    fn test_validate_rejects_non_positive_extent() {
        let fix = Fix::dimensions(canvas(0), CanvasDimension::X, 0.0);
        assert!(matches!(fix.validate(), Err(LayoutError::InvalidExtent { .. })));
    }

    #[test]
    fn test_validate_rejects_non_positive_scale() {
        let fix = Fix::relative_size(canvas(0), CanvasDimension::X, canvas(1), CanvasDimension::X, -2.0);
        assert!(matches!(fix.validate(), Err(LayoutError::InvalidScale { .. })));
    }

    #[test]
    fn test_validate_rejects_nan() {
        let fix = Fix::scale(canvas(0), CanvasPart::Top, canvas(1), CanvasDimension::Y, f64::NAN);
        assert!(matches!(fix.validate(), Err(LayoutError::NonFiniteParameter { .. })));
    }

    #[test]
    fn test_description_and_name() {
        let fix = Fix::dimensions(canvas(0), CanvasDimension::X, 120.0).with_description("plot width");
        assert_eq!(fix.name(), "FixDimensions");
        assert_eq!(fix.description(), Some("plot width"));
        assert_eq!(fix.to_string(), "size(canvas #0, X) = 120");
    }
}
