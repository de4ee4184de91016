//! Committing cells to a single module

use crate::{
    io::error::{AlgorithmError, Result, invalid_parameter},
    registry::modules::ModuleId,
    spatial::{coordinates::Coord, grid::Grid},
};

/// Commit an open cell to one of its candidates, drawn uniformly at random
///
/// Candidates are drawn in palette order from the grid's random source. The
/// grid clears the candidate set, closes the cell and records a snapshot.
///
/// # Errors
///
/// Returns an error if:
/// - The coordinate is outside the volume or the cell is no longer open
/// - The candidate set is already empty, which means the open-cell
///   bookkeeping was violated
pub fn collapse_cell<P>(grid: &mut Grid<P>, coord: Coord) -> Result<ModuleId> {
    grid.check_bounds(coord)?;
    let candidates = match grid.cell(coord) {
        Some(cell) if cell.is_open() => cell.candidates().to_vec(),
        _ => {
            return Err(invalid_parameter(
                "coord",
                &coord,
                &"cell is no longer open",
            ));
        }
    };

    let module = grid
        .random()
        .pick_module(&candidates)
        .ok_or(AlgorithmError::EmptyCandidates { coord })?;
    grid.commit(coord, module)?;
    Ok(module)
}

/// Commit an open cell to a chosen module without drawing
///
/// # Errors
///
/// Returns an error if:
/// - The coordinate is outside the volume or the cell is no longer open
/// - The module is not among the cell's remaining candidates
pub fn pin_cell<P>(grid: &mut Grid<P>, coord: Coord, module: ModuleId) -> Result<()> {
    grid.check_bounds(coord)?;
    let allowed = grid
        .cell(coord)
        .is_some_and(|cell| cell.is_open() && cell.candidates().contains(module));
    if !allowed {
        let name = grid.registry().name(module).to_string();
        return Err(invalid_parameter(
            "pin",
            &format!("{name} at {coord}"),
            &"module is not a remaining candidate of an open cell",
        ));
    }
    grid.commit(coord, module)
}
