use crate::{
    algorithm::{bitset::ModuleSet, collapse::collapse_cell},
    io::error::Result,
    registry::modules::ModuleId,
    spatial::{
        coordinates::{Coord, Offset, neighborhood_offsets, pattern_positions, window_anchor_offsets},
        grid::Grid,
    },
};
use std::collections::VecDeque;

/// FIFO of cells whose neighborhood still has to be re-checked
///
/// A cell is only queued once at a time; it may be queued again after it
/// has been taken out.
#[derive(Debug, Default)]
pub struct PropagationQueue {
    queue: VecDeque<Coord>,
}

impl PropagationQueue {
    /// Create a queue holding a single cell
    pub fn seeded(start: Coord) -> Self {
        Self {
            queue: VecDeque::from([start]),
        }
    }

    /// Add a cell unless it is already waiting, returning whether it was added
    pub fn push(&mut self, coord: Coord) -> bool {
        if self.queue.contains(&coord) {
            return false;
        }
        self.queue.push_back(coord);
        true
    }

    /// Remove and return the next cell
    pub fn take_next(&mut self) -> Option<Coord> {
        self.queue.pop_front()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of waiting cells
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

/// Per-offset support flags around the cell being propagated
///
/// Entry `o` holds the modules that at least one matched pattern places on
/// the cell at relative offset `o` in `[-PS+1, PS-1]³`.
#[derive(Debug)]
pub struct SupportTable {
    reach: i64,
    side: usize,
    flags: Vec<ModuleSet>,
}

impl SupportTable {
    /// Create a table with every flag cleared
    pub fn new(pattern_size: usize, palette_len: usize) -> Self {
        let side = (2 * pattern_size).saturating_sub(1);
        Self {
            reach: pattern_size as i64 - 1,
            side,
            flags: vec![ModuleSet::new(palette_len); side.checked_pow(3).unwrap_or(0)],
        }
    }

    fn slot(&self, offset: Offset) -> Option<usize> {
        let mut index = 0;
        for component in offset {
            let shifted = usize::try_from(component + self.reach).ok()?;
            if shifted >= self.side {
                return None;
            }
            index = index * self.side + shifted;
        }
        Some(index)
    }

    /// Supported modules at a relative offset
    pub fn supported(&self, offset: Offset) -> Option<&ModuleSet> {
        self.flags.get(self.slot(offset)?)
    }

    /// Flag a module as supported at a relative offset
    pub fn mark(&mut self, offset: Offset, module: ModuleId) {
        if let Some(set) = self.slot(offset).and_then(|slot| self.flags.get_mut(slot)) {
            set.insert(module);
        }
    }
}

/// Summary of one propagation run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropagationReport {
    /// Cells taken off the queue
    pub cells_processed: usize,
    /// Candidates removed across all culls
    pub candidates_removed: usize,
    /// Cells that were left with one candidate and collapsed, in order
    pub collapsed: Vec<Coord>,
    /// Cells whose candidates ran out, in order
    pub uncollapsable: Vec<Coord>,
}

/// Gather support flags for the neighborhood of `center`
///
/// Every pattern that fits the grid at some window containing `center`
/// supports, at each of its positions that lands on an open cell, the module
/// it places there.
pub fn gather_support<P>(grid: &Grid<P>, center: Coord) -> SupportTable {
    let pattern_size = grid.pattern_size();
    let mut support = SupportTable::new(pattern_size, grid.registry().palette_len());

    for anchor in window_anchor_offsets(pattern_size) {
        for pattern in grid.patterns() {
            if !grid.pattern_fits(pattern, center, anchor) {
                continue;
            }
            for local in pattern_positions(pattern_size) {
                let relative = [
                    anchor[0] + local[0] as i64,
                    anchor[1] + local[1] as i64,
                    anchor[2] + local[2] as i64,
                ];
                let open = grid
                    .neighbor(center, relative)
                    .is_some_and(|target| grid.cell(target).is_some_and(|cell| cell.is_open()));
                if let (true, Some(module)) = (open, pattern.module_at(local)) {
                    support.mark(relative, module);
                }
            }
        }
    }

    support
}

/// Propagate constraints outward from a freshly collapsed cell
///
/// Processes a FIFO of cells. For each one, candidates of the open cells in
/// its `[-PS+1, PS-1]³` neighborhood are cut down to what the matched
/// patterns support. A cell left with one candidate is collapsed and queued;
/// a cell left with none is marked uncollapsable and the run continues.
///
/// # Errors
///
/// Returns an error only if collapsing a cell with a single candidate fails,
/// which would mean the grid's bookkeeping is broken
pub fn propagate<P>(grid: &mut Grid<P>, start: Coord) -> Result<PropagationReport> {
    grid.diagnostics_mut()
        .debug(|| format!("New propagation cycle starting from cell {start}"));

    let mut queue = PropagationQueue::seeded(start);
    let mut report = PropagationReport::default();

    while let Some(current) = queue.take_next() {
        report.cells_processed += 1;
        grid.diagnostics_mut()
            .trace(|| format!("...next in propagation queue is cell {current}"));

        let support = gather_support(grid, current);

        for offset in neighborhood_offsets(grid.pattern_size()) {
            let Some(target) = grid.neighbor(current, offset) else {
                continue;
            };
            if !grid.is_open(target) {
                continue;
            }
            let Some(supported) = support.supported(offset) else {
                continue;
            };

            let removed = grid.restrict(target, supported);
            report.candidates_removed += removed;
            if removed > 0 {
                grid.diagnostics_mut()
                    .trace(|| format!("......culled {removed} candidates at {target}"));
            }

            match grid.cell(target).map(|cell| cell.entropy()) {
                Some(1) => {
                    collapse_cell(grid, target)?;
                    queue.push(target);
                    report.collapsed.push(target);
                    grid.diagnostics_mut().trace(|| {
                        format!(".........collapsable cell discovered while propagating at {target}")
                    });
                }
                Some(0) => {
                    grid.mark_uncollapsable(target);
                    report.uncollapsable.push(target);
                }
                _ => {}
            }
        }
    }

    grid.diagnostics_mut().debug(|| {
        format!(
            "END propagation queue: {} cells processed, {} candidates removed",
            report.cells_processed, report.candidates_removed
        )
    });
    Ok(report)
}
