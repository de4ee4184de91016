//! Multi-file solve progress with automatic batching for large sets

use crate::io::configuration::{MAX_INDIVIDUAL_PROGRESS_BARS, PROGRESS_BAR_WIDTH};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::LazyLock;

/// Solve progress of one file
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct FileProgress {
    name: String,
    cells_resolved: usize,
    cell_count: usize,
    attempts_used: usize,
}

/// Coordinates progress display for batch solves
///
/// Small batches get one bar per file showing resolved cells; larger
/// batches add a files bar and only the most recent files keep a bar.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: Option<ProgressBar>,
    file_bars: Vec<ProgressBar>,
    files: Vec<FileProgress>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

static CELL_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "{{prefix}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Volumes: [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            batch_bar: None,
            file_bars: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Create the bars for a batch of `file_count` volumes
    pub fn initialize(&mut self, file_count: usize) {
        // Switch to batch mode for large file sets to avoid terminal spam
        if file_count > MAX_INDIVIDUAL_PROGRESS_BARS + 1 {
            let batch_bar = ProgressBar::new(file_count as u64);
            batch_bar.set_style(BATCH_STYLE.clone());
            self.batch_bar = Some(self.multi_progress.add(batch_bar));
        }

        for _ in 0..file_count.min(MAX_INDIVIDUAL_PROGRESS_BARS) {
            let bar = ProgressBar::new(0);
            bar.set_style(CELL_STYLE.clone());
            self.file_bars.push(self.multi_progress.add(bar));
        }
    }

    /// Start tracking a file whose output has `cell_count` cells
    pub fn start_file(&mut self, index: usize, path: &Path, cell_count: usize) {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        if index >= self.files.len() {
            self.files.resize(index + 1, FileProgress::default());
        }
        if let Some(file) = self.files.get_mut(index) {
            *file = FileProgress {
                name,
                cells_resolved: 0,
                cell_count,
                attempts_used: 0,
            };
        }
        self.update_bars();
    }

    /// Report resolved cells and consumed attempts of a running solve
    pub fn update_solve(&mut self, index: usize, cells_resolved: usize, attempts_used: usize) {
        if let Some(file) = self.files.get_mut(index) {
            file.cells_resolved = cells_resolved;
            file.attempts_used = attempts_used;
        }
        self.update_bars();
    }

    /// Mark a file as finished and advance the batch bar
    pub fn complete_file(&mut self, index: usize) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.inc(1);
        }

        if let Some(file) = self.files.get_mut(index) {
            file.name = format!("✓ {}", file.name);
            file.cells_resolved = file.cell_count;
        }
        self.update_bars();
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.finish_with_message("All volumes solved");
        }
        // A failed clear only leaves stale bars on the terminal
        if self.multi_progress.clear().is_err() {
            tracing::debug!("progress bars could not be cleared");
        }
    }

    /// Show the most recent files on the available bars
    fn update_bars(&self) {
        let active: Vec<&FileProgress> = self
            .files
            .iter()
            .filter(|file| !file.name.is_empty())
            .collect();
        let start = active.len().saturating_sub(MAX_INDIVIDUAL_PROGRESS_BARS);
        let visible = active.get(start..).unwrap_or(&[]);

        for (bar, file) in self.file_bars.iter().zip(visible) {
            bar.set_length(file.cell_count as u64);
            bar.set_position(file.cells_resolved as u64);
            bar.set_prefix(file.name.clone());
            bar.set_message(format!(
                "{}/{} cells, {} attempts",
                file.cells_resolved, file.cell_count, file.attempts_used
            ));
        }

        for bar in self.file_bars.iter().skip(visible.len()) {
            bar.set_length(0);
            bar.set_position(0);
            bar.set_message(String::new());
            bar.set_prefix(String::new());
        }
    }

    /// Number of files registered so far
    pub fn tracked_files(&self) -> usize {
        self.files.len()
    }
}
