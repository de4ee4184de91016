//! Error types and context management for solver operations

use crate::spatial::coordinates::{Coord, Extent};
use std::fmt;
use std::path::PathBuf;

/// Main error type for all solver operations
#[derive(Debug)]
pub enum AlgorithmError {
    /// Solver parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Source volume doesn't meet solver requirements
    InvalidSourceData {
        /// Description of what's wrong with the source data
        reason: String,
    },

    /// Two palette modules share a type name
    DuplicateModule {
        /// The repeated type name
        name: String,
    },

    /// A module was requested by a name the registry does not know
    UnknownModule {
        /// The requested type name
        name: String,
    },

    /// Coordinate lies outside the output volume
    OutOfBounds {
        /// Requested coordinate
        coord: Coord,
        /// Volume dimensions
        extent: Extent,
    },

    /// A cell reached the collapse operator with no candidates left
    ///
    /// Open-cell bookkeeping guarantees this never happens; seeing it means
    /// an internal invariant was broken.
    EmptyCandidates {
        /// Cell that was about to collapse
        coord: Coord,
    },

    /// Operation is not allowed in the solver's current state
    InvalidState {
        /// Operation that was attempted
        operation: &'static str,
        /// State the solver was in
        state: String,
    },

    /// Volume document could not be parsed or serialized
    Parse {
        /// Document path
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Failed to save a rendered image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },
}

impl fmt::Display for AlgorithmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::InvalidSourceData { reason } => {
                write!(f, "Invalid source data: {reason}")
            }
            Self::DuplicateModule { name } => {
                write!(f, "Module type '{name}' is registered more than once")
            }
            Self::UnknownModule { name } => {
                write!(f, "Module type '{name}' is not registered")
            }
            Self::OutOfBounds { coord, extent } => {
                write!(f, "Coordinate {coord} is outside the {extent} volume")
            }
            Self::EmptyCandidates { coord } => {
                write!(f, "Cell {coord} has no candidates left to collapse into")
            }
            Self::InvalidState { operation, state } => {
                write!(f, "Cannot {operation} while the solver is {state}")
            }
            Self::Parse { path, source } => {
                write!(f, "Failed to parse '{}': {source}", path.display())
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for AlgorithmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            Self::ImageExport { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for solver results
pub type Result<T> = std::result::Result<T, AlgorithmError>;

impl From<std::io::Error> for AlgorithmError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> AlgorithmError {
    AlgorithmError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an invalid state error for an operation attempted at the wrong time
pub fn invalid_state(operation: &'static str, state: &impl ToString) -> AlgorithmError {
    AlgorithmError::InvalidState {
        operation,
        state: state.to_string(),
    }
}
