use num_traits::NumCast;
use smallvec::SmallVec;

/// Tolerance for floating point comparisons against grid lines.
pub const THRESHOLD: f64 = 1e-8;

/// An integer lattice coordinate of runtime arity. A cell at index `c`
/// occupies the half-open hypercube `[c, c + 1)`.
pub type Cell = SmallVec<[i64; 4]>;

/// A position in continuous space, of runtime arity.
pub type Point = SmallVec<[f64; 4]>;

/// Create a [Cell] from a coordinate slice.
#[inline]
#[must_use]
pub fn cell(coords: &[i64]) -> Cell {
    SmallVec::from_slice(coords)
}

/// Create a [Point] from a coordinate slice.
#[inline]
#[must_use]
pub fn point(coords: &[f64]) -> Point {
    SmallVec::from_slice(coords)
}

/// Get the center point of the given cell, offset by `0.5` on every axis.
#[inline]
#[must_use]
pub fn cell_center(cell: &[i64]) -> Point {
    cell.iter().map(|&c| c as f64 + 0.5).collect()
}

/// Find the squared euclidean distance between two lattice coordinates.
#[inline]
#[must_use]
pub fn distance_squared(a: &[i64], b: &[i64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&p, &q)| {
            let d = (p - q) as f64;
            d * d
        })
        .sum()
}

/// Find the euclidean distance between two lattice coordinates.
#[inline]
#[must_use]
pub fn distance(a: &[i64], b: &[i64]) -> f64 {
    distance_squared(a, b).sqrt()
}

/// Determine whether `value` lies on an integer grid line, within [THRESHOLD].
#[inline]
#[must_use]
pub fn is_integral(value: f64) -> bool {
    (value - value.round()).abs() < THRESHOLD
}

/// Convert a numeric coordinate slice into a [Point]. Accepts any castable
/// scalar type, so integer and float coordinates are treated uniformly.
#[inline]
pub(crate) fn to_point<T: NumCast + Copy>(coords: &[T]) -> Point {
    coords
        .iter()
        .map(|&v| num_traits::cast::cast(v).unwrap())
        .collect()
}
