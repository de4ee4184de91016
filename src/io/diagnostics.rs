//! Human-readable trace of a solve
//!
//! Every line goes to `tracing`; when capture is enabled the same lines are
//! also kept in order so the host can show them after the solve. No solver
//! decision ever depends on what is written here.

use tracing::Level;

/// Severity of a diagnostics line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Fine-grained per-cell and per-pattern events
    Trace,
    /// Phase boundaries and per-cycle summaries
    Debug,
    /// Degraded outcomes such as unsolvable cells or unknown module names
    Warn,
}

/// Ordered diagnostics sink owned by a grid
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    captured: Option<Vec<String>>,
}

impl Diagnostics {
    /// Forward to `tracing` only
    pub const fn forwarding() -> Self {
        Self { captured: None }
    }

    /// Forward to `tracing` and keep every line
    pub const fn capturing() -> Self {
        Self {
            captured: Some(Vec::new()),
        }
    }

    /// Whether lines are being kept
    pub const fn is_capturing(&self) -> bool {
        self.captured.is_some()
    }

    /// Captured lines in emission order (empty when not capturing)
    pub fn lines(&self) -> &[String] {
        self.captured.as_deref().unwrap_or(&[])
    }

    /// Take the captured lines, leaving capture enabled
    pub fn drain(&mut self) -> Vec<String> {
        self.captured.as_mut().map(std::mem::take).unwrap_or_default()
    }

    /// Record a fine-grained line
    pub fn trace(&mut self, message: impl FnOnce() -> String) {
        self.emit(Severity::Trace, message);
    }

    /// Record a phase-level line
    pub fn debug(&mut self, message: impl FnOnce() -> String) {
        self.emit(Severity::Debug, message);
    }

    /// Record a degraded-outcome line
    pub fn warn(&mut self, message: impl FnOnce() -> String) {
        self.emit(Severity::Warn, message);
    }

    /// Record a line at the given severity
    ///
    /// The message is only formatted when somebody listens.
    pub fn emit(&mut self, severity: Severity, message: impl FnOnce() -> String) {
        let traced = match severity {
            Severity::Trace => tracing::enabled!(Level::TRACE),
            Severity::Debug => tracing::enabled!(Level::DEBUG),
            Severity::Warn => tracing::enabled!(Level::WARN),
        };
        if !traced && self.captured.is_none() {
            return;
        }

        let line = message();
        match severity {
            Severity::Trace => tracing::trace!("{line}"),
            Severity::Debug => tracing::debug!("{line}"),
            Severity::Warn => tracing::warn!("{line}"),
        }
        if let Some(lines) = &mut self.captured {
            lines.push(line);
        }
    }
}
