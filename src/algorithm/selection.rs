use crate::{
    registry::modules::ModuleId,
    spatial::coordinates::Coord,
    spatial::grid::{Cell, Grid},
};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Seeded random source for reproducible stochastic choices
///
/// Every draw of a solve goes through this one generator, so a fixed seed
/// and a fixed call order reproduce the same output.
#[derive(Clone, Debug)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    /// Create a deterministic random source
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform index in `0..len`, or `None` for an empty range
    pub fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let index = match u32::try_from(len) {
            Ok(bound) => self.rng.random_range(0..bound) as usize,
            Err(_) => self.rng.random_range(0..len),
        };
        Some(index)
    }

    /// Uniform element of a slice
    pub fn pick<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        let index = self.pick_index(items.len())?;
        items.get(index).copied()
    }

    /// Uniform member of a candidate list in palette order
    pub fn pick_module(&mut self, candidates: &[ModuleId]) -> Option<ModuleId> {
        self.pick(candidates)
    }
}

/// Mean candidate count over the `[-PS+1, PS-1]³` neighborhood of a cell
///
/// Neighbors are remapped through output tiling; out-of-range neighbors on
/// untiled axes are left out of the average. Collapsed and uncollapsable
/// cells count as zero.
pub fn local_average_entropy<P>(grid: &Grid<P>, coord: Coord) -> f64 {
    let (sum, count) = grid
        .neighborhood(coord)
        .filter_map(|neighbor| grid.cell(neighbor).map(Cell::entropy))
        .fold((0usize, 0usize), |(sum, count), entropy| {
            (sum + entropy, count + 1)
        });

    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

/// Pick a random open cell among those with the lowest local average entropy
///
/// The minimum is taken over positive averages, capped at the palette size.
/// Every open cell within the grid's entropy threshold of that minimum is a
/// candidate, listed in open-cell order, and exactly one uniform draw picks
/// among them. Returns `None` once no open cells remain.
pub fn select_lowest_entropy_cell<P>(grid: &mut Grid<P>) -> Option<Coord> {
    let view: &Grid<P> = grid;
    let averages: Vec<(Coord, f64)> = view
        .open_cells()
        .map(|coord| (coord, local_average_entropy(view, coord)))
        .collect();
    if averages.is_empty() {
        return None;
    }

    let ceiling = grid.registry().palette_len() as f64;
    let lowest = averages
        .iter()
        .map(|&(_, average)| average)
        .filter(|&average| average > 0.0)
        .fold(ceiling, f64::min);

    let threshold = grid.entropy_threshold();
    let candidates: Vec<Coord> = averages
        .iter()
        .filter(|&&(_, average)| average - lowest <= threshold)
        .map(|&(coord, _)| coord)
        .collect();

    let selected = grid.random().pick(&candidates)?;
    let count = candidates.len();
    grid.diagnostics_mut().trace(|| {
        format!("...selected cell {selected} among {count} with local entropy near {lowest:.3}")
    });
    Some(selected)
}
