//! Volume coordinates, dimensions and per-axis wraparound arithmetic
//!
//! Every volume in the crate (input, output, pattern blocks, snapshots) is
//! laid out x-major: `x` is the slowest varying axis and `z` the fastest.
//! Iteration helpers in this module follow the same order so that flat
//! indices, ndarray indices and enumeration order always agree.

use std::fmt;

/// Signed offset relative to a coordinate
pub type Offset = [i64; 3];

/// A position inside a volume
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    /// Position along the x axis
    pub x: usize,
    /// Position along the y axis
    pub y: usize,
    /// Position along the z axis
    pub z: usize,
}

impl Coord {
    /// Create a coordinate from its components
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Index form accepted by `ndarray::Array3`
    pub const fn index(self) -> [usize; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[usize; 3]> for Coord {
    fn from([x, y, z]: [usize; 3]) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

/// Which axes wrap around toroidally
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AxisTiling {
    /// Wrap along x
    pub x: bool,
    /// Wrap along y
    pub y: bool,
    /// Wrap along z
    pub z: bool,
}

impl AxisTiling {
    /// No axis wraps
    pub const NONE: Self = Self {
        x: false,
        y: false,
        z: false,
    };

    /// Every axis wraps
    pub const ALL: Self = Self {
        x: true,
        y: true,
        z: true,
    };

    /// Create a tiling from individual axis flags
    pub const fn new(x: bool, y: bool, z: bool) -> Self {
        Self { x, y, z }
    }

    /// Flags in axis order
    pub const fn as_array(self) -> [bool; 3] {
        [self.x, self.y, self.z]
    }
}

impl fmt::Display for AxisTiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::NONE {
            return f.write_str("none");
        }
        for (flag, axis) in self.as_array().into_iter().zip(['x', 'y', 'z']) {
            if flag {
                write!(f, "{axis}")?;
            }
        }
        Ok(())
    }
}

/// Dimensions of a volume
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Extent {
    /// Length along x
    pub x: usize,
    /// Length along y
    pub y: usize,
    /// Length along z
    pub z: usize,
}

impl Extent {
    /// Create an extent from its axis lengths
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Create a cubic extent
    pub const fn cube(side: usize) -> Self {
        Self::new(side, side, side)
    }

    /// Shape tuple accepted by `ndarray` constructors
    pub const fn shape(self) -> (usize, usize, usize) {
        (self.x, self.y, self.z)
    }

    /// Axis lengths in axis order
    pub const fn as_array(self) -> [usize; 3] {
        [self.x, self.y, self.z]
    }

    /// Total number of cells
    pub const fn cell_count(self) -> usize {
        self.x * self.y * self.z
    }

    /// Total number of cells, or `None` if the product overflows `usize`
    pub const fn checked_cell_count(self) -> Option<usize> {
        match self.x.checked_mul(self.y) {
            Some(plane) => plane.checked_mul(self.z),
            None => None,
        }
    }

    /// Whether any axis has zero length
    pub const fn is_empty(self) -> bool {
        self.x == 0 || self.y == 0 || self.z == 0
    }

    /// Whether the coordinate lies inside the volume
    pub const fn contains(self, coord: Coord) -> bool {
        coord.x < self.x && coord.y < self.y && coord.z < self.z
    }

    /// Row-major (x-major) flat index of a coordinate
    pub const fn flat_index(self, coord: Coord) -> usize {
        (coord.x * self.y + coord.y) * self.z + coord.z
    }

    /// Coordinate for a flat index produced by [`Extent::flat_index`]
    pub const fn coord_of(self, index: usize) -> Coord {
        let z = index % self.z;
        let rest = index / self.z;
        Coord::new(rest / self.y, rest % self.y, z)
    }

    /// All coordinates in x-major order
    pub fn coords(self) -> impl Iterator<Item = Coord> {
        (0..self.x).flat_map(move |x| {
            (0..self.y).flat_map(move |y| (0..self.z).map(move |z| Coord::new(x, y, z)))
        })
    }

    /// Apply an offset to a coordinate
    ///
    /// Tiled axes wrap with true modulo arithmetic; on untiled axes a result
    /// outside `[0, len)` yields `None`.
    pub fn resolve(self, base: Coord, offset: Offset, tiling: AxisTiling) -> Option<Coord> {
        let x = resolve_axis(base.x, offset[0], self.x, tiling.x)?;
        let y = resolve_axis(base.y, offset[1], self.y, tiling.y)?;
        let z = resolve_axis(base.z, offset[2], self.z, tiling.z)?;
        Some(Coord::new(x, y, z))
    }
}

impl From<[usize; 3]> for Extent {
    fn from([x, y, z]: [usize; 3]) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

fn resolve_axis(base: usize, offset: i64, len: usize, tiled: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let shifted = base as i64 + offset;
    if tiled {
        Some(shifted.rem_euclid(len as i64) as usize)
    } else if shifted >= 0 && (shifted as usize) < len {
        Some(shifted as usize)
    } else {
        None
    }
}

/// Every offset in the cube `[low, high]³`, x outermost and z innermost
pub fn offset_cube(low: i64, high: i64) -> impl Iterator<Item = Offset> {
    (low..=high)
        .flat_map(move |x| (low..=high).flat_map(move |y| (low..=high).map(move |z| [x, y, z])))
}

/// Offsets of the neighborhood `[-PS+1, PS-1]³` used for entropy averaging and propagation
pub fn neighborhood_offsets(pattern_size: usize) -> impl Iterator<Item = Offset> {
    let reach = pattern_size as i64 - 1;
    offset_cube(-reach, reach)
}

/// Anchor offsets `[-PS+1, 0]³` of every window that contains the origin cell
pub fn window_anchor_offsets(pattern_size: usize) -> impl Iterator<Item = Offset> {
    let reach = pattern_size as i64 - 1;
    offset_cube(-reach, 0)
}

/// Local positions `[0, PS)³` inside a pattern block
pub fn pattern_positions(pattern_size: usize) -> impl Iterator<Item = [usize; 3]> {
    (0..pattern_size).flat_map(move |i| {
        (0..pattern_size).flat_map(move |j| (0..pattern_size).map(move |k| [i, j, k]))
    })
}
