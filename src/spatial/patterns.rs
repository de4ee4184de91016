//! Pattern extraction from the input volume
//!
//! Slides a PS³ window over the input and keeps every distinct block it
//! sees. Axes with tiling enabled let the window start anywhere along the
//! axis and wrap around the far edge; the other axes only admit windows that
//! fit inside the input.

use crate::io::diagnostics::Diagnostics;
use crate::registry::modules::ModuleId;
use crate::spatial::coordinates::{AxisTiling, Coord, Extent, pattern_positions};
use ndarray::Array3;
use std::collections::HashSet;

/// A PS×PS×PS block of modules observed in the input volume
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    modules: Array3<ModuleId>,
}

impl Pattern {
    /// Build a pattern from a cubic block of modules
    ///
    /// Returns `None` if the block is not cubic or is empty.
    pub fn from_block(modules: Array3<ModuleId>) -> Option<Self> {
        let (x, y, z) = modules.dim();
        (x > 0 && x == y && y == z).then_some(Self { modules })
    }

    /// Edge length of the block
    pub fn size(&self) -> usize {
        self.modules.dim().0
    }

    /// Module at a local position
    pub fn module_at(&self, position: [usize; 3]) -> Option<ModuleId> {
        self.modules.get(position).copied()
    }

    /// The underlying block
    pub const fn modules(&self) -> &Array3<ModuleId> {
        &self.modules
    }

    fn key(&self) -> Vec<ModuleId> {
        self.modules.iter().copied().collect()
    }
}

/// Pattern extractor holding the deduplicated pattern vocabulary
pub struct PatternExtractor {
    patterns: Vec<Pattern>,
    windows: usize,
    skipped_windows: usize,
}

impl PatternExtractor {
    /// Extract every PS³ window of the input and drop exact duplicates
    ///
    /// Windows touching an input cell without a module (an unknown name) are
    /// skipped. An untiled axis shorter than the pattern size cannot hold a
    /// single window, so it is read as tiled instead.
    pub fn extract(
        input: &Array3<Option<ModuleId>>,
        pattern_size: usize,
        tiling: AxisTiling,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let extent = Extent::from(<[usize; 3]>::from(input.dim()));
        diagnostics.debug(|| {
            format!(
                "Generating patterns of size {pattern_size} from {extent} input (input tiling: {tiling})"
            )
        });

        if pattern_size == 0 || extent.is_empty() {
            return Self {
                patterns: Vec::new(),
                windows: 0,
                skipped_windows: 0,
            };
        }

        let effective = Self::effective_tiling(extent, pattern_size, tiling, diagnostics);
        let [range_x, range_y, range_z] = [
            Self::window_starts(extent.x, pattern_size, effective.x),
            Self::window_starts(extent.y, pattern_size, effective.y),
            Self::window_starts(extent.z, pattern_size, effective.z),
        ];

        let mut extracted = Vec::with_capacity(range_x * range_y * range_z);
        let mut skipped_windows = 0;
        for x in 0..range_x {
            for y in 0..range_y {
                for z in 0..range_z {
                    let origin = Coord::new(x, y, z);
                    if let Some(pattern) = Self::window_at(input, extent, origin, pattern_size) {
                        diagnostics.trace(|| format!("...pattern from input window at {origin}"));
                        extracted.push(pattern);
                    } else {
                        skipped_windows += 1;
                        diagnostics.trace(|| {
                            format!("...window at {origin} reads an unknown module, skipped")
                        });
                    }
                }
            }
        }

        let windows = range_x * range_y * range_z;
        if skipped_windows > 0 {
            diagnostics.warn(|| {
                format!("{skipped_windows} of {windows} input windows skipped for unknown modules")
            });
        }

        let before = extracted.len();
        let patterns = Self::deduplicate_patterns(extracted);
        diagnostics.debug(|| {
            format!(
                "Culled {} duplicate patterns, {} remain",
                before - patterns.len(),
                patterns.len()
            )
        });

        Self {
            patterns,
            windows,
            skipped_windows,
        }
    }

    fn effective_tiling(
        extent: Extent,
        pattern_size: usize,
        tiling: AxisTiling,
        diagnostics: &mut Diagnostics,
    ) -> AxisTiling {
        let mut flags = tiling.as_array();
        for ((flag, len), axis) in flags.iter_mut().zip(extent.as_array()).zip(['x', 'y', 'z']) {
            if !*flag && len < pattern_size {
                *flag = true;
                diagnostics.warn(|| {
                    format!(
                        "Input axis {axis} ({len}) is shorter than the pattern size {pattern_size}; reading it as tiled"
                    )
                });
            }
        }
        let [x, y, z] = flags;
        AxisTiling::new(x, y, z)
    }

    /// Number of valid window starts along one axis
    pub const fn window_starts(axis_len: usize, pattern_size: usize, tiled: bool) -> usize {
        if tiled {
            axis_len
        } else {
            (axis_len + 1).saturating_sub(pattern_size)
        }
    }

    fn window_at(
        input: &Array3<Option<ModuleId>>,
        extent: Extent,
        origin: Coord,
        pattern_size: usize,
    ) -> Option<Pattern> {
        let mut block = Vec::with_capacity(pattern_size.checked_pow(3)?);
        for [i, j, k] in pattern_positions(pattern_size) {
            let source = [
                (origin.x + i) % extent.x,
                (origin.y + j) % extent.y,
                (origin.z + k) % extent.z,
            ];
            block.push(input.get(source).copied().flatten()?);
        }
        Array3::from_shape_vec((pattern_size, pattern_size, pattern_size), block)
            .ok()
            .and_then(Pattern::from_block)
    }

    /// Keep the first occurrence of every distinct block
    pub fn deduplicate_patterns(patterns: Vec<Pattern>) -> Vec<Pattern> {
        let mut seen = HashSet::new();
        let mut unique_patterns = Vec::new();

        for pattern in patterns {
            if seen.insert(pattern.key()) {
                unique_patterns.push(pattern);
            }
        }

        unique_patterns
    }

    /// The deduplicated patterns in extraction order
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Consume the extractor and return its patterns
    pub fn into_patterns(self) -> Vec<Pattern> {
        self.patterns
    }

    /// Number of windows visited
    pub const fn windows(&self) -> usize {
        self.windows
    }

    /// Number of windows dropped because they read an unknown module
    pub const fn skipped_windows(&self) -> usize {
        self.skipped_windows
    }
}
