//! Output grid state: cells, open-cell bookkeeping and collapse history
//!
//! The grid is the single mutable context of a solve. Selection, collapse
//! and propagation all borrow it exclusively, and it owns the seeded random
//! source so that draw order is fixed by call order alone.

use crate::algorithm::bitset::ModuleSet;
use crate::algorithm::selection::RandomSource;
use crate::io::diagnostics::Diagnostics;
use crate::io::error::{AlgorithmError, Result};
use crate::registry::modules::{ModuleId, ModuleRegistry};
use crate::spatial::coordinates::{AxisTiling, Coord, Extent, Offset, neighborhood_offsets};
use crate::spatial::patterns::Pattern;
use bitvec::prelude::*;
use ndarray::Array3;

/// Resolution state of a cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellState {
    /// Still open for collapse
    Open,
    /// Committed to exactly one module
    Collapsed(ModuleId),
    /// Candidates ran out; rendered with the filler
    Uncollapsable,
}

/// One position of the output volume
#[derive(Clone, Debug)]
pub struct Cell {
    candidates: ModuleSet,
    state: CellState,
}

impl Cell {
    fn open(palette_len: usize) -> Self {
        Self {
            candidates: ModuleSet::all(palette_len),
            state: CellState::Open,
        }
    }

    /// Remaining candidate modules
    pub const fn candidates(&self) -> &ModuleSet {
        &self.candidates
    }

    /// Number of remaining candidates
    pub fn entropy(&self) -> usize {
        self.candidates.count()
    }

    /// Current resolution state
    pub const fn state(&self) -> CellState {
        self.state
    }

    /// Whether the cell is neither collapsed nor uncollapsable
    pub const fn is_open(&self) -> bool {
        matches!(self.state, CellState::Open)
    }

    /// Whether the cell committed to a module
    pub const fn is_collapsed(&self) -> bool {
        matches!(self.state, CellState::Collapsed(_))
    }

    /// Whether the cell ran out of candidates
    pub const fn is_uncollapsable(&self) -> bool {
        matches!(self.state, CellState::Uncollapsable)
    }

    /// The committed module, if collapsed
    pub const fn module(&self) -> Option<ModuleId> {
        match self.state {
            CellState::Collapsed(module) => Some(module),
            CellState::Open | CellState::Uncollapsable => None,
        }
    }
}

/// Whole-volume snapshots taken after every collapse
#[derive(Clone, Debug, Default)]
pub struct CollapseHistory {
    order: Vec<Coord>,
    snapshots: Vec<Array3<ModuleId>>,
    recording: bool,
}

impl CollapseHistory {
    /// Create a history; without recording only the collapse order is kept
    pub const fn new(recording: bool) -> Self {
        Self {
            order: Vec::new(),
            snapshots: Vec::new(),
            recording,
        }
    }

    /// Whether volume snapshots are stored
    pub const fn is_recording(&self) -> bool {
        self.recording
    }

    /// Number of collapse events
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing has collapsed yet
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Coordinates in collapse order
    pub fn collapse_order(&self) -> &[Coord] {
        &self.order
    }

    /// Volume state right after the `index`-th collapse
    pub fn snapshot(&self, index: usize) -> Option<&Array3<ModuleId>> {
        self.snapshots.get(index)
    }

    /// Module at a coordinate within the `index`-th snapshot
    pub fn module_at(&self, coord: Coord, index: usize) -> Option<ModuleId> {
        self.snapshot(index)?.get(coord.index()).copied()
    }

    /// `(coordinate, snapshot)` pairs in collapse order
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Array3<ModuleId>)> {
        self.order.iter().copied().zip(self.snapshots.iter())
    }

    fn record(&mut self, coord: Coord, snapshot: impl FnOnce() -> Array3<ModuleId>) {
        self.order.push(coord);
        if self.recording {
            self.snapshots.push(snapshot());
        }
    }
}

/// Output grid of a single solve
pub struct Grid<P = ()> {
    cells: Array3<Cell>,
    extent: Extent,
    registry: ModuleRegistry<P>,
    patterns: Vec<Pattern>,
    pattern_size: usize,
    output_tiling: AxisTiling,
    entropy_threshold: f64,
    random: RandomSource,
    open_cells: BitVec,
    open_count: usize,
    history: CollapseHistory,
    diagnostics: Diagnostics,
}

impl<P> Grid<P> {
    /// Create a grid with every cell open and holding the full palette
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any output dimension or the pattern size is zero
    /// - The cell count overflows `usize`
    pub fn new(
        extent: Extent,
        registry: ModuleRegistry<P>,
        pattern_size: usize,
        output_tiling: AxisTiling,
        seed: u64,
    ) -> Result<Self> {
        if extent.is_empty() {
            return Err(crate::io::error::invalid_parameter(
                "output_size",
                &extent,
                &"every output dimension must be positive",
            ));
        }
        if pattern_size == 0 {
            return Err(crate::io::error::invalid_parameter(
                "pattern_size",
                &pattern_size,
                &"must be positive",
            ));
        }

        let Some(cell_count) = extent.checked_cell_count() else {
            return Err(crate::io::error::invalid_parameter(
                "output_size",
                &extent,
                &"cell count does not fit in memory addressing",
            ));
        };

        let palette_len = registry.palette_len();
        let cells = Array3::from_shape_simple_fn(extent.shape(), || Cell::open(palette_len));

        Ok(Self {
            cells,
            extent,
            registry,
            patterns: Vec::new(),
            pattern_size,
            output_tiling,
            entropy_threshold: crate::io::configuration::DEFAULT_ENTROPY_THRESHOLD,
            random: RandomSource::new(seed),
            open_cells: bitvec![1; cell_count],
            open_count: cell_count,
            history: CollapseHistory::new(true),
            diagnostics: Diagnostics::forwarding(),
        })
    }

    /// Replace the diagnostics sink
    pub fn set_diagnostics(&mut self, diagnostics: Diagnostics) {
        self.diagnostics = diagnostics;
    }

    /// Set how far above the minimum local entropy a cell may be and still be picked
    pub const fn set_entropy_threshold(&mut self, threshold: f64) {
        self.entropy_threshold = threshold;
    }

    /// Enable or disable snapshot storage; only valid before the first collapse
    pub fn set_history_recording(&mut self, recording: bool) {
        if self.history.is_empty() {
            self.history = CollapseHistory::new(recording);
        }
    }

    /// Install the pattern vocabulary
    pub fn set_patterns(&mut self, patterns: Vec<Pattern>) {
        self.patterns = patterns;
    }

    /// Output dimensions
    pub const fn extent(&self) -> Extent {
        self.extent
    }

    /// Edge length of the patterns
    pub const fn pattern_size(&self) -> usize {
        self.pattern_size
    }

    /// Per-axis output wraparound
    pub const fn output_tiling(&self) -> AxisTiling {
        self.output_tiling
    }

    /// Tie-break threshold of the entropy selector
    pub const fn entropy_threshold(&self) -> f64 {
        self.entropy_threshold
    }

    /// Module registry
    pub const fn registry(&self) -> &ModuleRegistry<P> {
        &self.registry
    }

    /// Pattern vocabulary
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Collapse history for playback
    pub const fn history(&self) -> &CollapseHistory {
        &self.history
    }

    /// Diagnostics sink
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Mutable diagnostics sink
    pub const fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Seeded random source
    pub const fn random(&mut self) -> &mut RandomSource {
        &mut self.random
    }

    /// Access a cell
    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.cells.get(coord.index())
    }

    /// All cells
    pub const fn cells(&self) -> &Array3<Cell> {
        &self.cells
    }

    /// Apply an offset, honoring output tiling
    pub fn neighbor(&self, coord: Coord, offset: Offset) -> Option<Coord> {
        self.extent.resolve(coord, offset, self.output_tiling)
    }

    /// In-bounds cells of the `[-PS+1, PS-1]³` cube around a coordinate
    ///
    /// Tiled axes wrap, so the same cell may appear more than once when the
    /// volume is narrower than the cube.
    pub fn neighborhood(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        neighborhood_offsets(self.pattern_size).filter_map(move |offset| self.neighbor(coord, offset))
    }

    /// Number of open cells
    pub const fn open_count(&self) -> usize {
        self.open_count
    }

    /// Whether a coordinate is in the open-cell set
    pub fn is_open(&self, coord: Coord) -> bool {
        self.extent.contains(coord)
            && self.open_cells.get(self.extent.flat_index(coord)).as_deref() == Some(&true)
    }

    /// Open cells in creation order
    pub fn open_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.open_cells
            .iter_ones()
            .map(move |index| self.extent.coord_of(index))
    }

    /// Check that the coordinate is inside the volume
    ///
    /// # Errors
    ///
    /// Returns [`AlgorithmError::OutOfBounds`] otherwise
    pub const fn check_bounds(&self, coord: Coord) -> Result<()> {
        if self.extent.contains(coord) {
            Ok(())
        } else {
            Err(AlgorithmError::OutOfBounds {
                coord,
                extent: self.extent,
            })
        }
    }

    /// Whether the pattern agrees with the grid when its origin sits at `anchor`
    ///
    /// Positions outside the volume and uncollapsable cells accept anything.
    /// A collapsed cell must hold the pattern's module; an open cell must
    /// still list it as a candidate.
    pub fn pattern_fits(&self, pattern: &Pattern, anchor: Coord, anchor_offset: Offset) -> bool {
        let size = pattern.size();
        for i in 0..size {
            for j in 0..size {
                for k in 0..size {
                    let offset = [
                        anchor_offset[0] + i as i64,
                        anchor_offset[1] + j as i64,
                        anchor_offset[2] + k as i64,
                    ];
                    let Some(target) = self.neighbor(anchor, offset) else {
                        continue;
                    };
                    let (Some(cell), Some(module)) =
                        (self.cell(target), pattern.module_at([i, j, k]))
                    else {
                        continue;
                    };
                    let agrees = match cell.state {
                        CellState::Uncollapsable => true,
                        CellState::Collapsed(committed) => committed == module,
                        CellState::Open => cell.candidates.contains(module),
                    };
                    if !agrees {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Commit a cell to a module and record the collapse
    ///
    /// Clears the candidate set, removes the cell from the open set and
    /// appends a snapshot to the history.
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinate is out of bounds or the cell is not open
    pub fn commit(&mut self, coord: Coord, module: ModuleId) -> Result<()> {
        self.check_bounds(coord)?;
        let filler = self.registry.filler();
        let cell = self
            .cells
            .get_mut(coord.index())
            .ok_or(AlgorithmError::OutOfBounds {
                coord,
                extent: self.extent,
            })?;
        if !cell.is_open() {
            return Err(crate::io::error::invalid_parameter(
                "coord",
                &coord,
                &"cell is no longer open",
            ));
        }
        let entropy = cell.entropy();
        cell.candidates.clear();
        cell.state = CellState::Collapsed(module);
        self.close(coord);

        let name = self.registry.name(module).to_string();
        self.diagnostics.debug(|| {
            format!("Collapsing cell {coord} (entropy {entropy}) into {name}")
        });

        let cells = &self.cells;
        self.history
            .record(coord, || Self::render(cells, filler));
        Ok(())
    }

    /// Mark an open cell as unsolvable and remove it from the open set
    pub fn mark_uncollapsable(&mut self, coord: Coord) {
        let Some(cell) = self.cells.get_mut(coord.index()) else {
            return;
        };
        if !cell.is_open() {
            return;
        }
        cell.candidates.clear();
        cell.state = CellState::Uncollapsable;
        self.close(coord);
        self.diagnostics
            .warn(|| format!("Unsolvable state reached at cell {coord}; using the filler module"));
    }

    /// Restrict an open cell's candidates to `supported`, returning how many were removed
    pub fn restrict(&mut self, coord: Coord, supported: &ModuleSet) -> usize {
        match self.cells.get_mut(coord.index()) {
            Some(cell) if cell.is_open() => cell.candidates.intersect_with(supported),
            _ => 0,
        }
    }

    fn close(&mut self, coord: Coord) {
        let index = self.extent.flat_index(coord);
        if self.open_cells.get(index).as_deref() == Some(&true) {
            self.open_cells.set(index, false);
            self.open_count -= 1;
        }
    }

    fn render(cells: &Array3<Cell>, filler: ModuleId) -> Array3<ModuleId> {
        cells.map(|cell| cell.module().unwrap_or(filler))
    }

    /// Final volume: committed modules, the filler everywhere else
    pub fn output(&self) -> Array3<ModuleId> {
        Self::render(&self.cells, self.registry.filler())
    }

    /// Count cells by state as `(collapsed, uncollapsable, open)`
    pub fn state_counts(&self) -> (usize, usize, usize) {
        self.cells
            .iter()
            .fold((0, 0, 0), |(collapsed, failed, open), cell| match cell.state {
                CellState::Collapsed(_) => (collapsed + 1, failed, open),
                CellState::Uncollapsable => (collapsed, failed + 1, open),
                CellState::Open => (collapsed, failed, open + 1),
            })
    }
}
