use crate::Cell;
use smallvec::SmallVec;

/// Enumerate every valid neighbor offset for a grid of the given
/// dimensionality, constrained by `loose`.
///
/// Offsets are drawn from `{-1, 0, 1}` per axis. The zero offset is dropped,
/// and an offset is kept only when the number of nonzero components is at
/// most `loose`: `loose = 1` permits axis-aligned steps only, while
/// `loose = dimensions` permits every diagonal.
///
/// The result is in canonical lexicographic order (first axis varies
/// slowest, `-1 < 0 < 1`), so search expansion order is reproducible.
#[must_use]
pub fn valid_directions(dimensions: usize, loose: usize) -> Vec<Cell> {
    let total = 3usize.pow(dimensions as u32);
    let mut directions = Vec::with_capacity(total - 1);

    for index in 0..total {
        let mut offset: Cell = SmallVec::from_elem(0, dimensions);
        let mut rem = index;
        for axis in (0..dimensions).rev() {
            offset[axis] = (rem % 3) as i64 - 1;
            rem /= 3;
        }

        let nonzero = offset.iter().filter(|&&o| o != 0).count();
        if nonzero >= 1 && nonzero <= loose {
            directions.push(offset);
        }
    }

    directions
}
