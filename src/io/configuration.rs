//! Solver constants and runtime configuration defaults

/// Edge length of extracted patterns
pub const DEFAULT_PATTERN_SIZE: usize = 2;

/// Collapse attempts before a solve gives up with open cells left
pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;

/// How far above the minimum local entropy a cell may be and still be picked
pub const DEFAULT_ENTROPY_THRESHOLD: f64 = 0.01;

/// Output dimensions used by the command line when none are given
pub const DEFAULT_OUTPUT_SIZE: [usize; 3] = [8, 8, 8];

// Safety limit to prevent excessive memory allocation
/// Maximum allowed output dimension
pub const MAX_GRID_DIMENSION: usize = 512;

// Progress bar display settings
/// Threshold for switching to batch progress mode
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 50;

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_result";
/// Extension of volume documents
pub const VOLUME_EXTENSION: &str = "json";
/// Delay between GIF animation frames
pub const GIF_FRAME_DELAY_MS: u32 = 5;
/// Minimum frame delay that viewers reliably support (in milliseconds)
pub const VIEWER_MIN_FRAME_DELAY_MS: u32 = 50;
/// Multiplier applied to the frame delay of the last GIF frame
pub const FINAL_FRAME_HOLD: u32 = 25;
/// Edge length in pixels of one rendered cell
pub const PIXELS_PER_CELL: u32 = 4;
/// Pixel gap between rendered z-slices
pub const SLICE_GAP_PIXELS: u32 = 2;
