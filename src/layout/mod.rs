//! Layout engine for computing canvas rectangles
//!
//! Canvases and other locatables are related by [`Fix`] constraints. The
//! engine turns the fixes into a square linear system, solves it, rounds the
//! result to pixel rectangles and checks the solution for consistency.

pub mod config;
pub mod coordinates;
pub mod diagnostics;
pub mod error;
pub mod fix;
pub mod registry;
pub mod solver;
pub mod types;

pub use config::LayoutConfig;
pub use coordinates::{infer_coordinates, validate_coordinates, CanvasMapping};
pub use diagnostics::{LayoutReport, LayoutWarning, RowCheck, WarningCategory};
pub use error::LayoutError;
pub use fix::{Fix, FixKind};
pub use registry::{CanvasId, ItemId, Locatable, LocatableId, LocatableRegistry};
pub use solver::{solve, FreeUnknown, IntrinsicSize, LayoutSystem, RowOrigin, Solution, SolverError};
pub use types::*;
