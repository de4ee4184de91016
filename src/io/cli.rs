//! Command-line interface for batch solving of JSON volume documents

use crate::algorithm::executor::{SolveConfig, Solver};
use crate::io::configuration::{
    DEFAULT_ENTROPY_THRESHOLD, DEFAULT_MAX_ATTEMPTS, DEFAULT_PATTERN_SIZE, DEFAULT_SEED,
    GIF_FRAME_DELAY_MS, OUTPUT_SUFFIX, VOLUME_EXTENSION,
};
use crate::io::error::{AlgorithmError, Result, invalid_parameter};
use crate::io::progress::ProgressManager;
use crate::io::visualization::PlaybackRenderer;
use crate::io::volume::VolumeDocument;
use crate::spatial::coordinates::{AxisTiling, Extent};
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "voxcollapse")]
#[command(
    author,
    version,
    about = "Fill 3D module volumes with overlapping wave function collapse"
)]
/// Command-line arguments for the volume solver
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input volume document (.json) or directory of documents
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Output dimensions as XxYxZ
    #[arg(short, long, value_parser = parse_extent, default_value = "8x8x8")]
    pub output_size: Extent,

    /// Edge length of extracted patterns
    #[arg(short, long, default_value_t = DEFAULT_PATTERN_SIZE)]
    pub pattern_size: usize,

    /// Random seed for reproducible generation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Maximum collapse attempts before stopping
    #[arg(short, long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub attempts: usize,

    /// Tie-break window above the lowest local entropy
    #[arg(short = 't', long, default_value_t = DEFAULT_ENTROPY_THRESHOLD)]
    pub entropy_threshold: f64,

    /// Axes along which input windows wrap (any of x, y, z)
    #[arg(long, value_parser = parse_tiling, default_value = "none")]
    pub input_tiling: AxisTiling,

    /// Axes along which the output wraps (any of x, y, z)
    #[arg(long, value_parser = parse_tiling, default_value = "none")]
    pub output_tiling: AxisTiling,

    /// Write the collapse playback as an animated GIF
    #[arg(short, long)]
    pub visualize: bool,

    /// Write the solved volume as a PNG of its z-slices
    #[arg(short, long)]
    pub image: bool,

    /// Write the solver's diagnostics lines to a log file
    #[arg(short, long)]
    pub log: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Process files even if output exists
    #[arg(short, long)]
    pub no_skip: bool,
}

impl Cli {
    /// Check if existing output files should be skipped
    pub const fn skip_existing(&self) -> bool {
        !self.no_skip
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Log filter used when `RUST_LOG` is not set
    ///
    /// Quiet runs only report warnings; otherwise per-file summaries and
    /// skip notices are shown.
    pub const fn log_filter(&self) -> &'static str {
        if self.quiet { "warn" } else { "info" }
    }

    /// Solver parameters selected on the command line
    pub const fn solve_config(&self) -> SolveConfig {
        SolveConfig {
            pattern_size: self.pattern_size,
            input_tiling: self.input_tiling,
            output_tiling: self.output_tiling,
            max_attempts: self.attempts,
            seed: self.seed,
            entropy_threshold: self.entropy_threshold,
            record_history: self.visualize,
            capture_diagnostics: self.log,
        }
    }
}

/// Parse `XxYxZ` into output dimensions
///
/// # Errors
///
/// Returns a message if there are not exactly three positive integers
pub fn parse_extent(text: &str) -> std::result::Result<Extent, String> {
    let lengths = text
        .split(['x', 'X'])
        .map(|part| part.trim().parse::<usize>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|error| format!("invalid size '{text}': {error}"))?;
    match lengths.as_slice() {
        &[x, y, z] if x > 0 && y > 0 && z > 0 => Ok(Extent::new(x, y, z)),
        _ => Err(format!(
            "invalid size '{text}': expected three positive lengths like 8x8x8"
        )),
    }
}

/// Parse a set of axis letters such as `xz` or the word `none`
///
/// # Errors
///
/// Returns a message for any character other than x, y or z
pub fn parse_tiling(text: &str) -> std::result::Result<AxisTiling, String> {
    let mut tiling = AxisTiling::NONE;
    if text.eq_ignore_ascii_case("none") {
        return Ok(tiling);
    }
    for axis in text.chars() {
        match axis.to_ascii_lowercase() {
            'x' => tiling.x = true,
            'y' => tiling.y = true,
            'z' => tiling.z = true,
            other => return Err(format!("unknown axis '{other}' in '{text}'")),
        }
    }
    Ok(tiling)
}

/// Orchestrates batch solving of volume documents with progress tracking
pub struct FileProcessor {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl FileProcessor {
    /// Create a new file processor with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Process files according to CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if target validation or file processing fails
    pub fn process(&mut self) -> Result<()> {
        let files = self.collect_files()?;

        if files.is_empty() {
            return Ok(());
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(files.len());
        }

        for (index, file) in files.iter().enumerate() {
            self.process_file(file, index)?;
        }

        if let Some(ref pm) = self.progress_manager {
            pm.finish();
        }

        Ok(())
    }

    fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let target = &self.cli.target;
        if target.is_file() {
            if !Self::is_volume_document(target) {
                return Err(invalid_parameter(
                    "target",
                    &target.display(),
                    &"target file must be a .json volume document",
                ));
            }
            Ok(if self.should_process_file(target) {
                vec![target.clone()]
            } else {
                vec![]
            })
        } else if target.is_dir() {
            let read_error = |source| AlgorithmError::FileSystem {
                path: target.clone(),
                operation: "read directory",
                source,
            };
            let mut files = Vec::new();
            for entry in std::fs::read_dir(target).map_err(read_error)? {
                let path = entry.map_err(read_error)?.path();
                if Self::is_volume_document(&path) && self.should_process_file(&path) {
                    files.push(path);
                }
            }
            files.sort();
            Ok(files)
        } else {
            Err(invalid_parameter(
                "target",
                &target.display(),
                &"target must be a .json file or a directory",
            ))
        }
    }

    /// Documents written by earlier runs are never picked up as inputs
    fn is_volume_document(path: &Path) -> bool {
        let is_json = path.extension().and_then(|s| s.to_str()) == Some(VOLUME_EXTENSION);
        let is_output = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| stem.ends_with(OUTPUT_SUFFIX));
        is_json && !is_output
    }

    fn should_process_file(&self, input_path: &Path) -> bool {
        if !self.cli.skip_existing() {
            return true;
        }

        if Self::get_output_path(input_path).exists() {
            tracing::info!("Skipping: {} (output exists)", input_path.display());
            false
        } else {
            true
        }
    }

    fn process_file(&mut self, input_path: &Path, index: usize) -> Result<()> {
        let document = VolumeDocument::load(input_path)?;
        let registry = document.registry()?;
        let output_size = self.cli.output_size;
        let mut solver = Solver::new(
            registry,
            &document.volume()?,
            output_size,
            self.cli.solve_config(),
        )?;
        // Solver::new bounds every output axis
        let cell_count = output_size.cell_count();

        if let Some(ref mut pm) = self.progress_manager {
            pm.start_file(index, input_path, cell_count);
        }
        solver.extract()?;
        for (coord, name) in document.pins() {
            solver.pin(coord, name)?;
        }

        let progress = &mut self.progress_manager;
        solver.run_with(|current| {
            if let Some(pm) = progress.as_mut() {
                let open = current.grid().open_count();
                pm.update_solve(index, cell_count - open, current.attempts_used());
            }
        })?;

        let outcome = solver.finish();
        let grid = solver.grid();
        VolumeDocument::from_solution(grid.registry(), &outcome.volume)
            .save(&Self::get_output_path(input_path))?;

        let renderer = PlaybackRenderer::new(grid.registry(), output_size);
        if self.cli.image {
            renderer.export_png(&outcome.volume, &Self::sibling_path(input_path, "_result.png"))?;
        }
        if self.cli.visualize {
            renderer.export_gif(
                grid.history(),
                &Self::sibling_path(input_path, "_playback.gif"),
                GIF_FRAME_DELAY_MS,
            )?;
        }
        if self.cli.log {
            let log_path = Self::sibling_path(input_path, "_log.txt");
            let mut text = grid.diagnostics().lines().join("\n");
            text.push('\n');
            std::fs::write(&log_path, text).map_err(|source| AlgorithmError::FileSystem {
                path: log_path,
                operation: "write log",
                source,
            })?;
        }

        tracing::info!(
            "{}: {} after {} attempts ({} collapsed, {} uncollapsable, {} open)",
            input_path.display(),
            outcome.state,
            outcome.attempts_used,
            outcome.collapsed,
            outcome.uncollapsable,
            outcome.open
        );

        if let Some(ref mut pm) = self.progress_manager {
            pm.complete_file(index);
        }

        Ok(())
    }

    /// Path of the solved document for an input document
    pub fn get_output_path(input_path: &Path) -> PathBuf {
        Self::sibling_path(
            input_path,
            &format!("{OUTPUT_SUFFIX}.{VOLUME_EXTENSION}"),
        )
    }

    fn sibling_path(input_path: &Path, suffix: &str) -> PathBuf {
        let stem = input_path.file_stem().unwrap_or_default();
        let name = format!("{}{suffix}", stem.to_string_lossy());

        if let Some(parent) = input_path.parent() {
            parent.join(name)
        } else {
            PathBuf::from(name)
        }
    }
}
