//! Consistency checks run after every solve.
//!
//! Two checks are made against the solved system: every row is re-evaluated
//! and compared to its constant, and every unknown is nudged to see whether
//! the residual notices. Neither check fails the solve; findings come back as
//! [`LayoutWarning`]s and are also logged.

use std::fmt;

use log::{debug, warn};

use super::config::LayoutConfig;
use super::registry::LocatableId;
use super::solver::{FreeUnknown, LayoutSystem, LinearSystem, RowOrigin, Solution};
use super::types::{CanvasLocation, Side};

/// A diagnostic about a solved layout
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutWarning {
    pub category: WarningCategory,
    pub message: String,
}

/// Category of layout diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCategory {
    UnsatisfiedConstraint,
    Unconstrained,
}

impl fmt::Display for WarningCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningCategory::UnsatisfiedConstraint => write!(f, "unsatisfied"),
            WarningCategory::Unconstrained => write!(f, "unconstrained"),
        }
    }
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)
    }
}

/// Outcome of re-evaluating one row of the system
#[derive(Debug, Clone, PartialEq)]
pub struct RowCheck {
    pub index: usize,
    pub equation: String,
    pub expected: f64,
    pub actual: f64,
    pub origin: RowOrigin,
    pub satisfied: bool,
}

impl fmt::Display for RowCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.satisfied {
            write!(f, "Satisfied constraint # {:>3}         : ", self.index)?;
        } else {
            write!(f, "Failed to satisfy constraint # {:>3} : ", self.index)?;
        }
        write!(
            f,
            "{}, Actually = {}, {}",
            self.equation, self.actual, self.origin
        )
    }
}

/// Re-evaluate every row of the system at the solution
pub fn check_rows(layout: &LayoutSystem, solution: &Solution, config: &LayoutConfig) -> Vec<RowCheck> {
    let products = layout.system.multiply(&solution.values);
    products
        .iter()
        .enumerate()
        .map(|(index, &actual)| {
            let expected = layout.system.constant(index);
            let satisfied = (actual - expected).abs() <= config.residual_tolerance;
            let check = RowCheck {
                index,
                equation: layout.equation(index),
                expected,
                actual,
                origin: layout.origins[index].clone(),
                satisfied,
            };
            if satisfied {
                debug!("{}", check);
            } else {
                warn!("{}", check);
            }
            check
        })
        .collect()
}

/// Unknowns whose perturbation does not move the residual
pub fn find_unconstrained(
    system: &LinearSystem,
    solution: &Solution,
    config: &LayoutConfig,
) -> Vec<FreeUnknown> {
    let step = config.perturbation;
    let base = system.residual_norm(&solution.values);
    let mut free = Vec::new();
    let mut probe = solution.values.clone();

    for column in 0..probe.len() {
        probe[column] += step;
        let change = (system.residual_norm(&probe) - base).abs() / step;
        probe[column] -= step;

        if change < config.unconstrained_threshold {
            let unknown = FreeUnknown {
                locatable: column / 4,
                side: Side::from_offset(column % 4),
            };
            warn!("Unconstrained {}", unknown);
            free.push(unknown);
        }
    }
    free
}

/// Run both checks and collect the warnings they produce
pub fn check(
    layout: &LayoutSystem,
    solution: &Solution,
    config: &LayoutConfig,
) -> (Vec<RowCheck>, Vec<LayoutWarning>) {
    let rows = check_rows(layout, solution, config);
    let mut warnings: Vec<LayoutWarning> = rows
        .iter()
        .filter(|row| !row.satisfied)
        .map(|row| LayoutWarning {
            category: WarningCategory::UnsatisfiedConstraint,
            message: format!(
                "constraint #{} not satisfied: {}, actually {} ({})",
                row.index, row.equation, row.actual, row.origin
            ),
        })
        .collect();

    warnings.extend(
        find_unconstrained(&layout.system, solution, config)
            .into_iter()
            .map(|unknown| LayoutWarning {
                category: WarningCategory::Unconstrained,
                message: format!(
                    "{} of locatable {} is unconstrained",
                    unknown.side, unknown.locatable
                ),
            }),
    );
    (rows, warnings)
}

/// Everything learned from one layout pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutReport {
    /// Solved rectangle of every registered locatable, in registration order
    pub locations: Vec<(LocatableId, CanvasLocation)>,
    pub rows: Vec<RowCheck>,
    pub warnings: Vec<LayoutWarning>,
}

impl LayoutReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Solved rectangle of one locatable
    pub fn location_of(&self, id: LocatableId) -> Option<CanvasLocation> {
        self.locations
            .iter()
            .find(|(entry, _)| *entry == id)
            .map(|(_, location)| *location)
    }
}

impl fmt::Display for LayoutReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{}", row)?;
        }
        for (i, (id, location)) in self.locations.iter().enumerate() {
            writeln!(f, "Locatable # {:>3} ({}) location: {}", i, id, location)?;
        }
        for warning in &self.warnings {
            writeln!(f, "warning: {}", warning)?;
        }
        Ok(())
    }
}
