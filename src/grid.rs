#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::{valid_directions, Cell, GridError, PlanError};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Whether planning lattice points are cell centers or integer vertices.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GridMode {
    /// Lattice points are cell centers, offset by `0.5` on every axis.
    #[default]
    Cell,
    /// Lattice points are the integer grid vertices themselves.
    Vertex,
}

impl fmt::Display for GridMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridMode::Cell => write!(f, "cell"),
            GridMode::Vertex => write!(f, "vertex"),
        }
    }
}

impl FromStr for GridMode {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cell" => Ok(GridMode::Cell),
            "vertex" => Ok(GridMode::Vertex),
            _ => Err(PlanError::UnsupportedMode(s.to_string())),
        }
    }
}

/// An N-dimensional boolean occupancy lattice. Immutable after construction,
/// so one grid may be shared by reference across concurrent plans.
///
/// A world cell `c` occupies the half-open hypercube `[c, c + 1)`. The grid
/// covers world cells `origin <= c < origin + shape`; any cell outside that
/// range counts as occupied.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyGrid {
    shape: SmallVec<[usize; 4]>,
    strides: SmallVec<[usize; 4]>,
    origin: Cell,
    loose: usize,
    cells: Vec<bool>,
    directions: Vec<Cell>,
}

impl OccupancyGrid {
    /// Create a grid with every cell unoccupied and a zero origin.
    ///
    /// `shape` is the number of cells per axis, in world-axis order.
    /// See [OccupancyGrid::from_data] for the constraints on `shape` and
    /// `loose`.
    #[inline]
    pub fn new(shape: &[usize], loose: usize) -> Result<Self, GridError> {
        let len = shape.iter().product();
        Self::from_data(shape, vec![false; len], loose)
    }

    /// Create a grid from packed occupancy data.
    ///
    /// # Parameters
    ///
    /// - `shape`: The number of cells per axis, in world-axis order. At least
    ///   two axes, each holding at least one cell.
    /// - `data`: One flag per cell, `true` meaning blocked. Storage is
    ///   row-major with the last world axis varying slowest: the flag for
    ///   cell `c` lives at `sum_i(c_i * stride_i)` where `stride_0 = 1` and
    ///   `stride_i = stride_(i-1) * shape_(i-1)`. This matches a nested
    ///   row-per-last-axis literal read back-to-front, the layout plotting
    ///   collaborators expect.
    /// - `loose`: The maximum number of axes a single neighbor step may
    ///   change, in `1..=shape.len()`.
    pub fn from_data(shape: &[usize], data: Vec<bool>, loose: usize) -> Result<Self, GridError> {
        let dimensions = shape.len();
        if dimensions < 2 {
            return Err(GridError::TooFewDimensions(dimensions));
        }
        if let Some(axis) = shape.iter().position(|&s| s == 0) {
            return Err(GridError::EmptyAxis { axis });
        }
        if loose < 1 || loose > dimensions {
            return Err(GridError::LooseOutOfRange { loose, dimensions });
        }

        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(GridError::DataLengthMismatch {
                expected,
                got: data.len(),
            });
        }

        let mut strides: SmallVec<[usize; 4]> = SmallVec::with_capacity(dimensions);
        let mut stride = 1;
        for &axis_cells in shape {
            strides.push(stride);
            stride *= axis_cells;
        }

        Ok(Self {
            shape: SmallVec::from_slice(shape),
            strides,
            origin: SmallVec::from_elem(0, dimensions),
            loose,
            cells: data,
            directions: valid_directions(dimensions, loose),
        })
    }

    /// Create a grid by evaluating a predicate for every zero-based cell
    /// index, `true` meaning blocked.
    pub fn from_fn<F>(shape: &[usize], loose: usize, mut f: F) -> Result<Self, GridError>
    where
        F: FnMut(&[i64]) -> bool,
    {
        let mut grid = Self::new(shape, loose)?;
        let mut coords: Cell = SmallVec::from_elem(0, shape.len());
        for offset in 0..grid.cells.len() {
            for (axis, coord) in coords.iter_mut().enumerate() {
                *coord = ((offset / grid.strides[axis]) % grid.shape[axis]) as i64;
            }
            grid.cells[offset] = f(&coords);
        }
        Ok(grid)
    }

    /// Place the grid's minimum corner at the given world coordinates.
    #[inline]
    pub fn with_origin(mut self, origin: &[i64]) -> Result<Self, GridError> {
        if origin.len() != self.dimensions() {
            return Err(GridError::OriginDimensionMismatch {
                expected: self.dimensions(),
                got: origin.len(),
            });
        }
        self.origin = SmallVec::from_slice(origin);
        Ok(self)
    }

    /// The number of axes of this grid.
    #[inline]
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.shape.len()
    }

    /// The number of cells per axis, in world-axis order.
    #[inline]
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The world coordinates of the grid's minimum corner.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> &[i64] {
        &self.origin
    }

    /// The maximum number of axes a single neighbor step may change.
    #[inline]
    #[must_use]
    pub fn loose(&self) -> usize {
        self.loose
    }

    /// The precomputed neighbor offsets for this grid's `loose` setting, in
    /// canonical lexicographic order. See [valid_directions].
    #[inline]
    #[must_use]
    pub fn valid_directions(&self) -> &[Cell] {
        &self.directions
    }

    /// Determine if the given world cell is blocked. Out-of-bounds cells
    /// count as occupied.
    #[inline]
    #[must_use]
    pub fn occupied(&self, cell: &[i64]) -> bool {
        match self.index_of(cell) {
            Some(offset) => self.cells[offset],
            None => true,
        }
    }

    /// Determine if the given world cell lies within the grid.
    #[inline]
    #[must_use]
    pub fn in_bounds(&self, cell: &[i64]) -> bool {
        self.index_of(cell).is_some()
    }

    /// Determine if the given world cell is both in bounds and unoccupied.
    #[inline]
    #[must_use]
    pub fn accessible(&self, cell: &[i64]) -> bool {
        match self.index_of(cell) {
            Some(offset) => !self.cells[offset],
            None => false,
        }
    }

    /// Determine if the given world coordinates are within planning bounds
    /// for the mode: `shape` cells per axis in cell mode, `shape + 1`
    /// vertices per axis in vertex mode.
    #[inline]
    #[must_use]
    pub fn in_bounds_for(&self, coords: &[i64], mode: GridMode) -> bool {
        if coords.len() != self.dimensions() {
            return false;
        }
        self.index_in_mode_bounds(&self.world_to_grid(coords), mode)
    }

    /// Translate world coordinates into grid-index space.
    #[inline]
    #[must_use]
    pub fn world_to_grid(&self, coords: &[i64]) -> Cell {
        coords
            .iter()
            .zip(self.origin.iter())
            .map(|(&c, &o)| c - o)
            .collect()
    }

    /// Translate grid-index coordinates into world space.
    #[inline]
    #[must_use]
    pub fn grid_to_world(&self, index: &[i64]) -> Cell {
        index
            .iter()
            .zip(self.origin.iter())
            .map(|(&c, &o)| c + o)
            .collect()
    }

    /// Mode bounds check in grid-index space (origin already subtracted).
    #[inline]
    #[must_use]
    pub(crate) fn index_in_mode_bounds(&self, index: &[i64], mode: GridMode) -> bool {
        index.iter().zip(self.shape.iter()).all(|(&c, &s)| {
            let limit = match mode {
                GridMode::Cell => s as i64,
                GridMode::Vertex => s as i64 + 1,
            };
            c >= 0 && c < limit
        })
    }

    #[inline]
    fn index_of(&self, cell: &[i64]) -> Option<usize> {
        debug_assert_eq!(cell.len(), self.dimensions());
        let mut offset = 0;
        for (axis, &c) in cell.iter().enumerate() {
            let index = c - self.origin[axis];
            if index < 0 || index >= self.shape[axis] as i64 {
                return None;
            }
            offset += index as usize * self.strides[axis];
        }
        Some(offset)
    }
}
