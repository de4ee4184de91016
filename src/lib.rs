//! Overlapping wave function collapse over 3D volumes of named modules
//!
//! The solver slices a labelled input volume into PS×PS×PS patterns, then
//! repeatedly collapses the open output cell with the lowest local entropy
//! and propagates the consequences until every cell is resolved or the
//! attempt budget runs out. Each axis may wrap independently, both when
//! reading the input and when solving the output.

#![forbid(unsafe_code)]

/// Selection, collapse, propagation and the solver driver
pub mod algorithm;
/// Errors, diagnostics, configuration and file front ends
pub mod io;
/// Module types and name lookup
pub mod registry;
/// Coordinates, pattern extraction and output grid state
pub mod spatial;

pub use algorithm::executor::{SolveConfig, SolveOutcome, Solver, SolverState, solve};
pub use io::error::{AlgorithmError, Result};
pub use registry::modules::{Module, ModuleId, ModuleRegistry};
pub use spatial::coordinates::{AxisTiling, Coord, Extent};
