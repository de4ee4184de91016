/// Command-line arguments and batch file processing
pub mod cli;
/// Default constants
pub mod configuration;
/// Diagnostics lines forwarded to tracing
pub mod diagnostics;
/// Error types and constructors
pub mod error;
/// Multi-file progress bars
pub mod progress;
/// Snapshot rendering to PNG and GIF
pub mod visualization;
/// JSON volume documents
pub mod volume;
