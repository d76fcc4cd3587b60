//! Linear layout solver
//!
//! Every registered locatable owns four unknowns (Left, Bottom, Right, Top).
//! The system is assembled from, in order:
//!
//! 1. four rows pinning the master canvas to `(0, 0, width, height)`,
//! 2. one implicit dimension row per intrinsic width or height,
//! 3. one row per explicit [`Fix`], in registration order.
//!
//! The resulting matrix must be square and non-singular; anything else is a
//! fatal layout error. There is no fallback to a partial solution.

use std::fmt;

use nalgebra::{DMatrix, DVector};
use thiserror::Error;

use super::config::LayoutConfig;
use super::error::LayoutError;
use super::fix::{add_for_part, Fix};
use super::registry::LocatableRegistry;
use super::types::{CanvasDimension, CanvasLocation, Side};

// ============================================================================
// Linear system storage
// ============================================================================

/// Dense matrix plus constants vector: `matrix * x = constants`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    matrix: DMatrix<f64>,
    constants: DVector<f64>,
}

impl LinearSystem {
    pub fn zeros(rows: usize, columns: usize) -> Self {
        Self {
            matrix: DMatrix::zeros(rows, columns),
            constants: DVector::zeros(rows),
        }
    }

    pub fn rows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn columns(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    pub fn constants(&self) -> &DVector<f64> {
        &self.constants
    }

    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.matrix[(row, column)]
    }

    /// Accumulate into an entry; parts of one row may touch the same column twice
    pub fn add(&mut self, row: usize, column: usize, value: f64) {
        self.matrix[(row, column)] += value;
    }

    pub fn row(&self, row: usize) -> Vec<f64> {
        self.matrix.row(row).iter().copied().collect()
    }

    pub fn constant(&self, row: usize) -> f64 {
        self.constants[row]
    }

    pub fn set_constant(&mut self, row: usize, value: f64) {
        self.constants[row] = value;
    }

    /// `matrix * x`
    pub fn multiply(&self, x: &DVector<f64>) -> DVector<f64> {
        &self.matrix * x
    }

    /// `sum_i |(matrix * x - constants)_i|`
    pub fn residual_norm(&self, x: &DVector<f64>) -> f64 {
        (self.multiply(x) - &self.constants).lp_norm(1)
    }
}

// ============================================================================
// Row provenance
// ============================================================================

/// Where a row of the system came from
#[derive(Debug, Clone, PartialEq)]
pub enum RowOrigin {
    /// One of the four rows pinning the master canvas
    MasterPin(Side),
    /// Generated from a locatable's intrinsic width or height
    Implicit {
        locatable: usize,
        dimension: CanvasDimension,
    },
    /// An explicit fix, by registration order
    Explicit {
        fix: usize,
        name: &'static str,
        description: Option<String>,
    },
}

impl fmt::Display for RowOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowOrigin::MasterPin(_) => write!(f, "Fix is auto generated"),
            RowOrigin::Implicit {
                locatable,
                dimension,
            } => {
                let what = match dimension {
                    CanvasDimension::X => "width",
                    CanvasDimension::Y => "height",
                };
                write!(f, "Implicitly generated {} for locatable {}", what, locatable)
            }
            RowOrigin::Explicit {
                name, description, ..
            } => {
                write!(f, "Fix type is '{}'", name)?;
                if let Some(description) = description {
                    write!(f, ", Description: \"{}\"", description)?;
                }
                Ok(())
            }
        }
    }
}

/// Intrinsic size reported by one registered locatable
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IntrinsicSize {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// An assembled system together with the provenance of each row
#[derive(Debug, Clone)]
pub struct LayoutSystem {
    pub system: LinearSystem,
    pub origins: Vec<RowOrigin>,
}

impl LayoutSystem {
    /// Build the layout system.
    ///
    /// `sizes` holds the intrinsic size of every registered locatable, in
    /// registration order; the master canvas must be registered first.
    pub fn assemble(
        width: i32,
        height: i32,
        sizes: &[IntrinsicSize],
        fixes: &[Fix],
        registry: &LocatableRegistry,
    ) -> Result<Self, LayoutError> {
        let implicit = sizes
            .iter()
            .map(|s| s.width.is_some() as usize + s.height.is_some() as usize)
            .sum::<usize>();
        if registry.is_empty() {
            return Err(SolverError::Empty.into());
        }
        let rows = 4 + implicit + fixes.len();
        let columns = 4 * registry.len();

        // Squareness is checked by the solve, so the assembly itself never rejects a row count.
        let mut system = LinearSystem::zeros(rows, columns);
        let mut origins = Vec::with_capacity(rows);

        let pins = [0.0, 0.0, f64::from(width), f64::from(height)];
        for side in Side::ALL {
            let row = side.offset();
            system.add(row, side.offset(), 1.0);
            system.set_constant(row, pins[row]);
            origins.push(RowOrigin::MasterPin(side));
        }

        let mut row = 4;
        for (locatable, size) in sizes.iter().enumerate() {
            let dims = [(CanvasDimension::X, size.width), (CanvasDimension::Y, size.height)];
            for (dimension, extent) in dims {
                if let Some(extent) = extent {
                    add_for_part(&mut system, row, -1.0, dimension.low(), locatable);
                    add_for_part(&mut system, row, 1.0, dimension.high(), locatable);
                    system.set_constant(row, extent);
                    origins.push(RowOrigin::Implicit {
                        locatable,
                        dimension,
                    });
                    row += 1;
                }
            }
        }

        for (i, fix) in fixes.iter().enumerate() {
            fix.create(row, &mut system, registry)?;
            origins.push(RowOrigin::Explicit {
                fix: i,
                name: fix.name(),
                description: fix.description().map(str::to_string),
            });
            row += 1;
        }

        Ok(Self { system, origins })
    }

    /// Number of locatables (column blocks) in the system
    pub fn locatable_count(&self) -> usize {
        self.system.columns() / 4
    }

    /// Human-readable form of a row, e.g. `+ ( -1 x Left[1] ) + ( Left[0] ) = 10`
    pub fn equation(&self, row: usize) -> String {
        let mut out = String::new();
        for (column, c) in self.system.row(row).into_iter().enumerate() {
            if c.abs() > 1e-4 {
                let name = format!("{}[{}]", Side::from_offset(column % 4), column / 4);
                if c == 1.0 {
                    out.push_str(&format!(" + ( {} )", name));
                } else {
                    out.push_str(&format!(" + ( {} x {} )", c, name));
                }
            }
        }
        out.push_str(&format!(" = {}", self.system.constant(row)));
        out.trim_start().to_string()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// An unknown the solver could not determine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeUnknown {
    pub locatable: usize,
    pub side: Side,
}

impl fmt::Display for FreeUnknown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.side, self.locatable)
    }
}

/// Errors from the linear solve
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("layout system is not square: {rows} constraints for {columns} unknowns ({})", balance(*rows, *columns))]
    NonSquare { rows: usize, columns: usize },

    #[error(
        "layout system is singular: rank {rank} of {columns}, under-constrained by {}; free unknowns: {}",
        columns - rank,
        format_free(free)
    )]
    Singular {
        rank: usize,
        columns: usize,
        free: Vec<FreeUnknown>,
    },

    #[error("solved {side}[{locatable}] = {value} does not fit in pixel coordinates")]
    OutOfRange {
        locatable: usize,
        side: Side,
        value: f64,
    },

    #[error("no locatables registered")]
    Empty,
}

fn format_free(free: &[FreeUnknown]) -> String {
    free.iter().map(|f| f.to_string()).collect::<Vec<_>>().join(", ")
}

fn balance(rows: usize, columns: usize) -> String {
    if rows < columns {
        format!("under-constrained by {}", columns - rows)
    } else {
        format!("over-constrained by {}", rows - columns)
    }
}

// ============================================================================
// Solve
// ============================================================================

/// Raw solution of a layout system
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub values: DVector<f64>,
}

impl Solution {
    /// Solved value of one unknown
    pub fn get(&self, locatable: usize, side: Side) -> f64 {
        self.values[4 * locatable + side.offset()]
    }

    /// Pixel rectangle of one locatable.
    ///
    /// Values within `snap` of an integer are snapped first, then truncated toward zero.
    pub fn location(&self, locatable: usize, snap: f64) -> Result<CanvasLocation, SolverError> {
        let px = |side: Side| {
            let value = self.get(locatable, side);
            to_pixel(value, snap).ok_or(SolverError::OutOfRange {
                locatable,
                side,
                value,
            })
        };
        Ok(CanvasLocation::new(
            px(Side::Left)?,
            px(Side::Bottom)?,
            px(Side::Right)?,
            px(Side::Top)?,
        ))
    }
}

fn to_pixel(value: f64, snap: f64) -> Option<i32> {
    let rounded = value.round();
    let value = if (value - rounded).abs() < snap { rounded } else { value };
    let value = value.trunc();
    if value.is_finite() && value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX) {
        Some(value as i32)
    } else {
        None
    }
}

/// Solve a square system through a fully pivoted LU decomposition
///
/// Pivots at or below `pivot_tolerance` times the largest coefficient count
/// as zero; the columns they were swapped into are reported as free.
pub fn solve(system: &LinearSystem, config: &LayoutConfig) -> Result<Solution, SolverError> {
    let n = system.columns();
    if n == 0 {
        return Err(SolverError::Empty);
    }
    if system.rows() != n {
        return Err(SolverError::NonSquare {
            rows: system.rows(),
            columns: n,
        });
    }

    let threshold = config.pivot_tolerance * system.matrix.amax().max(1.0);
    let lu = system.matrix.clone().full_piv_lu();
    let rank = lu
        .u()
        .diagonal()
        .iter()
        .take_while(|pivot| pivot.abs() > threshold)
        .count();

    let singular = |rank: usize| {
        // Position k of the permuted order holds the original column pivoted into place k.
        let mut order = DMatrix::from_fn(1, n, |_, column| column);
        lu.q().permute_columns(&mut order);
        let mut free: Vec<FreeUnknown> = order
            .iter()
            .skip(rank)
            .map(|&column| FreeUnknown {
                locatable: column / 4,
                side: Side::from_offset(column % 4),
            })
            .collect();
        free.sort_by_key(|f| (f.locatable, f.side.offset()));
        SolverError::Singular {
            rank,
            columns: n,
            free,
        }
    };

    if rank < n {
        return Err(singular(rank));
    }
    let values = lu.solve(&system.constants).ok_or_else(|| singular(n - 1))?;
    Ok(Solution { values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::registry::{CanvasId, LocatableId};
    use crate::layout::types::CanvasPart;

    fn canvas(i: usize) -> LocatableId {
        LocatableId::Canvas(CanvasId(i))
    }

    fn registry_with(n: usize) -> LocatableRegistry {
        let mut registry = LocatableRegistry::new();
        for i in 0..n {
            registry.add(canvas(i));
        }
        registry
    }

    #[test]
    fn test_solve_identity() {
        let mut system = LinearSystem::zeros(2, 2);
        system.add(0, 0, 1.0);
        system.add(1, 1, 1.0);
        system.set_constant(0, 3.0);
        system.set_constant(1, -4.0);

        let solution = solve(&system, &LayoutConfig::default()).unwrap();
        assert!((solution.values[0] - 3.0).abs() < 1e-12);
        assert!((solution.values[1] + 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_solve_needs_pivoting() {
        // [0 1; 1 1] x = [2; 5]  =>  x = (3, 2)
        let mut system = LinearSystem::zeros(2, 2);
        system.add(0, 1, 1.0);
        system.add(1, 0, 1.0);
        system.add(1, 1, 1.0);
        system.set_constant(0, 2.0);
        system.set_constant(1, 5.0);

        let solution = solve(&system, &LayoutConfig::default()).unwrap();
        assert!((solution.values[0] - 3.0).abs() < 1e-12);
        assert!((solution.values[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_square_error() {
        let system = LinearSystem::zeros(3, 4);
        let err = solve(&system, &LayoutConfig::default()).unwrap_err();
        assert_eq!(err, SolverError::NonSquare { rows: 3, columns: 4 });
        assert!(err.to_string().contains("under-constrained by 1"));
    }

    #[test]
    fn test_singular_reports_free_unknowns() {
        // Only Left and Right are pinned; Bottom and Top never appear.
        let mut system = LinearSystem::zeros(4, 4);
        system.add(0, 0, 1.0);
        system.add(1, 2, 1.0);
        system.add(2, 0, 1.0);
        system.add(3, 2, 2.0);

        match solve(&system, &LayoutConfig::default()).unwrap_err() {
            SolverError::Singular { rank, columns, free } => {
                assert_eq!(rank, 2);
                assert_eq!(columns, 4);
                let sides: Vec<Side> = free.iter().map(|f| f.side).collect();
                assert_eq!(sides, vec![Side::Bottom, Side::Top]);
            }
            other => panic!("Expected Singular error, got: {:?}", other),
        }
    }

    #[test]
    fn test_assemble_master_only() {
        let registry = registry_with(1);
        let layout =
            LayoutSystem::assemble(200, 100, &[IntrinsicSize::default()], &[], &registry).unwrap();
        assert_eq!(layout.system.rows(), 4);
        assert_eq!(layout.system.columns(), 4);
        assert_eq!(layout.system.constant(2), 200.0);
        assert_eq!(layout.system.constant(3), 100.0);

        let solution = solve(&layout.system, &LayoutConfig::default()).unwrap();
        assert_eq!(solution.location(0, 1e-6), Ok(CanvasLocation::new(0, 0, 200, 100)));
    }

    #[test]
    fn test_assemble_row_order() {
        let registry = registry_with(2);
        let sizes = [
            IntrinsicSize::default(),
            IntrinsicSize {
                width: Some(30.0),
                height: None,
            },
        ];
        let fixes = [
            Fix::relationship(canvas(1), CanvasPart::Left, canvas(0), CanvasPart::Left, 0.0)
                .with_description("flush left"),
        ];
        let layout = LayoutSystem::assemble(100, 100, &sizes, &fixes, &registry).unwrap();

        assert_eq!(layout.origins.len(), 6);
        assert_eq!(layout.origins[0], RowOrigin::MasterPin(Side::Left));
        assert_eq!(
            layout.origins[4],
            RowOrigin::Implicit {
                locatable: 1,
                dimension: CanvasDimension::X
            }
        );
        assert!(matches!(layout.origins[5], RowOrigin::Explicit { fix: 0, .. }));
        assert_eq!(
            layout.origins[5].to_string(),
            "Fix type is 'FixRelationship', Description: \"flush left\""
        );
    }

    #[test]
    fn test_equation_formatting() {
        let registry = registry_with(2);
        let fixes = [Fix::relationship(canvas(1), CanvasPart::Left, canvas(0), CanvasPart::Left, 10.0)];
        let sizes = [IntrinsicSize::default(); 2];
        let layout = LayoutSystem::assemble(100, 100, &sizes, &fixes, &registry).unwrap();
        assert_eq!(layout.equation(4), "+ ( Left[0] ) + ( -1 x Left[1] ) = 10");
        assert_eq!(layout.equation(2), "+ ( Right[0] ) = 100");
    }

    #[test]
    fn test_to_pixel_truncates_toward_zero() {
        assert_eq!(to_pixel(10.7, 1e-6), Some(10));
        assert_eq!(to_pixel(-10.7, 1e-6), Some(-10));
        assert_eq!(to_pixel(189.99999999997, 1e-6), Some(190));
    }

    #[test]
    fn test_to_pixel_rejects_values_beyond_i32() {
        assert_eq!(to_pixel(3e9, 1e-6), None);
        assert_eq!(to_pixel(-3e9, 1e-6), None);
        assert_eq!(to_pixel(f64::from(i32::MAX), 1e-6), Some(i32::MAX));
    }

    #[test]
    fn test_out_of_range_location() {
        let solution = Solution {
            values: DVector::from_vec(vec![0.0, 0.0, 5e9, 10.0]),
        };
        assert_eq!(
            solution.location(0, 1e-6),
            Err(SolverError::OutOfRange {
                locatable: 0,
                side: Side::Right,
                value: 5e9
            })
        );
    }
}
