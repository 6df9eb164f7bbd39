use gridcast::OccupancyGrid;

/// A square grid with staggered walls: every fourth column is blocked apart
/// from one gap, forcing a plan to zigzag.
pub fn create_walled_grid(size: usize, loose: usize) -> OccupancyGrid {
    OccupancyGrid::from_fn(&[size, size], loose, |cell| {
        let x = cell[0] as usize;
        let y = cell[1] as usize;
        x % 4 == 2 && y != (x / 4 * 7 + 1) % size
    })
    .unwrap()
}
