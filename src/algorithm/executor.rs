use crate::{
    algorithm::{
        collapse::{collapse_cell, pin_cell},
        propagation::{PropagationReport, propagate},
        selection::select_lowest_entropy_cell,
    },
    io::{
        configuration::{
            DEFAULT_ENTROPY_THRESHOLD, DEFAULT_MAX_ATTEMPTS, DEFAULT_PATTERN_SIZE, DEFAULT_SEED,
            MAX_GRID_DIMENSION,
        },
        diagnostics::Diagnostics,
        error::{AlgorithmError, Result, invalid_parameter, invalid_state},
    },
    registry::modules::{ModuleId, ModuleRegistry},
    spatial::{
        coordinates::{AxisTiling, Coord, Extent},
        grid::Grid,
        patterns::PatternExtractor,
    },
};
use ndarray::Array3;
use std::fmt;

/// Solver parameters controlling extraction, selection and playback
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolveConfig {
    /// Edge length of extracted patterns
    pub pattern_size: usize,
    /// Axes along which input windows wrap
    pub input_tiling: AxisTiling,
    /// Axes along which the output volume wraps
    pub output_tiling: AxisTiling,
    /// Collapse attempts before giving up
    pub max_attempts: usize,
    /// Seed of the random source
    pub seed: u64,
    /// Tie-break window above the lowest local entropy
    pub entropy_threshold: f64,
    /// Keep a whole-volume snapshot after every collapse
    pub record_history: bool,
    /// Keep diagnostics lines in memory in addition to tracing them
    pub capture_diagnostics: bool,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            pattern_size: DEFAULT_PATTERN_SIZE,
            input_tiling: AxisTiling::NONE,
            output_tiling: AxisTiling::NONE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            seed: DEFAULT_SEED,
            entropy_threshold: DEFAULT_ENTROPY_THRESHOLD,
            record_history: true,
            capture_diagnostics: false,
        }
    }
}

impl SolveConfig {
    /// Check that every parameter is usable
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pattern size or the attempt budget is zero
    /// - The entropy threshold is negative or not finite
    pub fn validate(&self) -> Result<()> {
        if self.pattern_size == 0 {
            return Err(invalid_parameter(
                "pattern_size",
                &self.pattern_size,
                &"must be positive",
            ));
        }
        if self.max_attempts == 0 {
            return Err(invalid_parameter(
                "max_attempts",
                &self.max_attempts,
                &"must be positive",
            ));
        }
        if !self.entropy_threshold.is_finite() || self.entropy_threshold < 0.0 {
            return Err(invalid_parameter(
                "entropy_threshold",
                &self.entropy_threshold,
                &"must be a finite non-negative number",
            ));
        }
        Ok(())
    }
}

/// Phase of a solve
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverState {
    /// Created, patterns not yet extracted
    Idle,
    /// Pattern extraction in progress or failed
    Extracting,
    /// Running select, collapse and propagate cycles
    Collapsing,
    /// No open cells remain
    Done,
    /// The attempt budget ran out with open cells left
    Aborted,
}

impl SolverState {
    /// Whether no further steps change anything
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }
}

impl fmt::Display for SolverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Extracting => "extracting",
            Self::Collapsing => "collapsing",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Final volume and bookkeeping of a solve
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolveOutcome {
    /// Committed modules; the filler for every cell that is not collapsed
    pub volume: Array3<ModuleId>,
    /// State the solver stopped in
    pub state: SolverState,
    /// Collapse attempts consumed
    pub attempts_used: usize,
    /// Cells committed to a module
    pub collapsed: usize,
    /// Cells whose candidates ran out
    pub uncollapsable: usize,
    /// Cells still open
    pub open: usize,
}

/// Wave function collapse driver over one output grid
///
/// Walks `Idle → Extracting → Collapsing → Done | Aborted`. Each step of the
/// collapsing phase spends one attempt on a select, collapse and propagate
/// cycle.
pub struct Solver<P = ()> {
    grid: Grid<P>,
    input: Array3<Option<ModuleId>>,
    config: SolveConfig,
    state: SolverState,
    attempts_used: usize,
    unknown_names: Vec<String>,
}

impl<P> Solver<P> {
    /// Create a solver for an input volume of module type names
    ///
    /// Names missing from the registry are kept as gaps; windows reading
    /// them are skipped during extraction.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid
    /// - The input volume is empty
    /// - An output dimension is zero or exceeds the size limit
    /// - The pattern size exceeds the longest input axis or the size limit
    pub fn new<S: AsRef<str>>(
        registry: ModuleRegistry<P>,
        input: &Array3<S>,
        output: Extent,
        config: SolveConfig,
    ) -> Result<Self> {
        config.validate()?;
        if input.is_empty() {
            return Err(AlgorithmError::InvalidSourceData {
                reason: "input volume has no cells".to_string(),
            });
        }
        if output.as_array().iter().any(|&len| len > MAX_GRID_DIMENSION) {
            return Err(invalid_parameter(
                "output_size",
                &output,
                &format!("dimensions are limited to {MAX_GRID_DIMENSION}"),
            ));
        }
        let longest_axis = input.shape().iter().copied().max().unwrap_or(0);
        if config.pattern_size > longest_axis.min(MAX_GRID_DIMENSION) {
            return Err(invalid_parameter(
                "pattern_size",
                &config.pattern_size,
                &format!(
                    "must not exceed the longest input axis ({longest_axis}) or {MAX_GRID_DIMENSION}"
                ),
            ));
        }

        let (resolved, unknown_names) = registry.resolve_volume(input);
        let mut grid = Grid::new(
            output,
            registry,
            config.pattern_size,
            config.output_tiling,
            config.seed,
        )?;
        grid.set_entropy_threshold(config.entropy_threshold);
        grid.set_history_recording(config.record_history);
        grid.set_diagnostics(if config.capture_diagnostics {
            Diagnostics::capturing()
        } else {
            Diagnostics::forwarding()
        });

        let palette_len = grid.registry().palette_len();
        grid.diagnostics_mut().debug(|| {
            format!(
                "Grid created: {output} cells, {palette_len} modules, output tiling {}",
                config.output_tiling
            )
        });
        let included: Vec<String> = grid
            .registry()
            .palette()
            .map(|id| grid.registry().name(id).to_string())
            .collect();
        for name in &included {
            grid.diagnostics_mut()
                .trace(|| format!("...including module {name}"));
        }
        for name in &unknown_names {
            grid.diagnostics_mut()
                .warn(|| format!("Input module '{name}' is not registered; its windows are skipped"));
        }

        Ok(Self {
            grid,
            input: resolved,
            config,
            state: SolverState::Idle,
            attempts_used: 0,
            unknown_names,
        })
    }

    /// Extract the pattern vocabulary and enter the collapsing phase
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Patterns were already extracted
    /// - No window of the input yields a pattern
    pub fn extract(&mut self) -> Result<usize> {
        if !matches!(self.state, SolverState::Idle | SolverState::Extracting) {
            return Err(invalid_state("extract patterns", &self.state));
        }
        self.state = SolverState::Extracting;

        let extractor = PatternExtractor::extract(
            &self.input,
            self.config.pattern_size,
            self.config.input_tiling,
            self.grid.diagnostics_mut(),
        );
        if extractor.patterns().is_empty() {
            return Err(AlgorithmError::InvalidSourceData {
                reason: format!(
                    "no pattern of size {} could be read from the input",
                    self.config.pattern_size
                ),
            });
        }

        let count = extractor.patterns().len();
        self.grid.set_patterns(extractor.into_patterns());
        self.state = SolverState::Collapsing;
        Ok(count)
    }

    /// Commit a cell to a named module before the random cycles run, then propagate
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Patterns have not been extracted or the solve already finished
    /// - The name is not registered or the coordinate is outside the volume
    /// - The module is no longer a candidate of that cell
    pub fn pin(&mut self, coord: Coord, name: &str) -> Result<PropagationReport> {
        if self.state != SolverState::Collapsing {
            return Err(invalid_state("pin a cell", &self.state));
        }
        let module = self.grid.registry().require(name)?;
        pin_cell(&mut self.grid, coord, module)?;
        let report = propagate(&mut self.grid, coord)?;
        self.settle_if_solved();
        Ok(report)
    }

    /// Advance by one phase transition or one collapse attempt
    ///
    /// # Errors
    ///
    /// Returns an error if extraction fails or the grid's bookkeeping breaks
    pub fn step(&mut self) -> Result<SolverState> {
        match self.state {
            SolverState::Idle | SolverState::Extracting => {
                self.extract()?;
                self.settle_if_solved();
            }
            SolverState::Collapsing => self.attempt()?,
            SolverState::Done | SolverState::Aborted => {}
        }
        Ok(self.state)
    }

    /// Step until the solve reaches a terminal state
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`Solver::step`]
    pub fn run(&mut self) -> Result<SolverState> {
        self.run_with(|_| {})
    }

    /// Step until a terminal state, calling `on_step` after every step
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`Solver::step`]
    pub fn run_with(&mut self, mut on_step: impl FnMut(&Self)) -> Result<SolverState> {
        while !self.state.is_terminal() {
            self.step()?;
            on_step(self);
        }
        let (collapsed, failed, open) = self.grid.state_counts();
        let state = self.state;
        self.grid.diagnostics_mut().debug(|| {
            format!(
                "Solve {state}: {collapsed} collapsed, {failed} uncollapsable, {open} open"
            )
        });
        Ok(self.state)
    }

    fn attempt(&mut self) -> Result<()> {
        if self.settle_if_solved() {
            return Ok(());
        }
        if self.attempts_used >= self.config.max_attempts {
            self.state = SolverState::Aborted;
            return Ok(());
        }

        let cycle = self.attempts_used;
        self.attempts_used += 1;
        self.grid
            .diagnostics_mut()
            .debug(|| format!("... Collapse/Propagate cycle #{cycle}"));

        if let Some(coord) = select_lowest_entropy_cell(&mut self.grid) {
            collapse_cell(&mut self.grid, coord)?;
            propagate(&mut self.grid, coord)?;
        }

        let remaining = self.grid.open_count();
        self.grid
            .diagnostics_mut()
            .debug(|| format!("...{remaining} uncollapsed cells remaining"));

        if !self.settle_if_solved() && self.attempts_used >= self.config.max_attempts {
            self.state = SolverState::Aborted;
            self.grid.diagnostics_mut().warn(|| {
                format!("Attempt budget exhausted with {remaining} open cells; rendering them with the filler")
            });
        }
        Ok(())
    }

    fn settle_if_solved(&mut self) -> bool {
        let solved = self.state == SolverState::Collapsing && self.grid.open_count() == 0;
        if solved {
            self.state = SolverState::Done;
        }
        solved
    }

    /// Final volume and counters for the current state
    pub fn finish(&self) -> SolveOutcome {
        let (collapsed, uncollapsable, open) = self.grid.state_counts();
        SolveOutcome {
            volume: self.grid.output(),
            state: self.state,
            attempts_used: self.attempts_used,
            collapsed,
            uncollapsable,
            open,
        }
    }

    /// Current phase
    pub const fn state(&self) -> SolverState {
        self.state
    }

    /// Collapse attempts consumed so far
    pub const fn attempts_used(&self) -> usize {
        self.attempts_used
    }

    /// Parameters of this solve
    pub const fn config(&self) -> &SolveConfig {
        &self.config
    }

    /// Output grid
    pub const fn grid(&self) -> &Grid<P> {
        &self.grid
    }

    /// Consume the solver and keep its grid
    pub fn into_grid(self) -> Grid<P> {
        self.grid
    }

    /// Distinct input names missing from the registry, in first-seen order
    pub fn unknown_names(&self) -> &[String] {
        &self.unknown_names
    }
}

/// Solve an input volume of type names in one call
///
/// Extracts patterns, runs collapse cycles until no open cell remains or
/// the attempt budget is spent, and returns the final volume. Module ids in
/// the outcome index into `registry`.
///
/// # Errors
///
/// Returns an error if the configuration or input is unusable, or if
/// the grid's bookkeeping breaks during the solve
pub fn solve<P: Clone, S: AsRef<str>>(
    registry: &ModuleRegistry<P>,
    input: &Array3<S>,
    output: Extent,
    config: SolveConfig,
) -> Result<SolveOutcome> {
    let mut solver = Solver::new(registry.clone(), input, output, config)?;
    solver.run()?;
    Ok(solver.finish())
}
