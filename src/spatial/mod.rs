//! Spatial data structures for volumes
//!
//! This module contains spatial-related functionality including:
//! - Coordinates, extents and per-axis wraparound
//! - Pattern extraction from the input volume
//! - Output grid state and collapse history

/// Coordinates, dimensions and offset arithmetic
pub mod coordinates;
/// Output grid state and collapse history
pub mod grid;
/// Pattern extraction and deduplication
pub mod patterns;

pub use grid::Grid;
