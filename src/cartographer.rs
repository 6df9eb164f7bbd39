#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::{Cell, CorridorError, OccupancyGrid, Point, RayError, Raytracer};
use fxhash::FxHashSet;
use std::collections::VecDeque;

/// The raytracer's resting position after a corridor sweep.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RayPosition {
    /// Current coordinates along the ray.
    pub coords: Point,
    /// Parametric position; `>= 1` once the goal is reached.
    pub t: f64,
    /// Whether the sweep made it to the goal.
    pub reached: bool,
}

/// Results from [OccupancyGrid::cartograph].
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CartographResult {
    /// Whether the whole corridor was swept to the goal.
    pub success: bool,

    /// Why the sweep stopped, when it did.
    pub error: Option<CorridorError>,

    /// The corridor: every accessible front cell the ray passed through, in
    /// world coordinates, sorted lexicographically. Holds the partial
    /// corridor on failure.
    pub traversed_cells: Vec<Cell>,

    /// Where the raytracer came to rest.
    pub position: RayPosition,
}

/// Sweeps a single ray across an occupancy grid and records the corridor of
/// cells it passes through.
///
/// At every raytracer position the front is filtered down to its accessible
/// cells, then to the subset reachable from the previous front by stepping
/// through unblocked cells. The sweep fails as soon as either filter leaves
/// nothing: a corridor must be traversable front to front, not merely
/// unblocked where the ray happens to touch.
pub struct Cartographer<'a> {
    grid: &'a OccupancyGrid,
    raytracer: Raytracer,
    traversed: FxHashSet<Cell>,
}

impl<'a> Cartographer<'a> {
    /// Create a cartographer for the ray from `start` to `end` over `grid`.
    /// Fails when either endpoint's arity differs from the grid's.
    pub fn new(grid: &'a OccupancyGrid, start: &[f64], end: &[f64]) -> Result<Self, RayError> {
        let raytracer = Raytracer::new(grid.dimensions(), start, end)?;
        Ok(Self {
            grid,
            raytracer,
            traversed: FxHashSet::default(),
        })
    }

    /// Sweep the ray to the goal, recording the traversed corridor.
    pub fn map(mut self) -> CartographResult {
        let mut previous: Option<Vec<Cell>> = None;

        while !self.raytracer.reached() {
            let front = self.raytracer.front_cells();
            if let Err(error) = self.step(&mut previous, front) {
                return self.finish(Some(error));
            }
            if !self.raytracer.advance() {
                break;
            }
        }

        // Front at the final position, when the walk stopped short of the
        // goal; filtered identically.
        if !self.raytracer.reached() {
            let front = self.raytracer.front_cells();
            if let Err(error) = self.step(&mut previous, front) {
                return self.finish(Some(error));
            }
        }

        self.finish(None)
    }

    /// Filter one front and fold it into the corridor.
    fn step(
        &mut self,
        previous: &mut Option<Vec<Cell>>,
        front: Vec<Cell>,
    ) -> Result<(), CorridorError> {
        let accessible: Vec<Cell> = front
            .into_iter()
            .filter(|cell| self.grid.accessible(cell))
            .collect();
        if accessible.is_empty() {
            return Err(CorridorError::FrontInaccessible);
        }

        let current = match previous.take() {
            Some(prev) => {
                let reachable = self.reachable_subset(&prev, accessible);
                if reachable.is_empty() {
                    return Err(CorridorError::FrontNotReachable);
                }
                reachable
            }
            None => accessible,
        };

        self.traversed.extend(current.iter().cloned());
        *previous = Some(current);
        Ok(())
    }

    /// Filter `current` down to the cells reachable from `previous` by a
    /// BFS inside the bounding box of both fronts, stepping through
    /// accessible cells along the grid's valid directions. This is what
    /// stops the corridor from jumping across an obstacle between two ray
    /// steps when `loose` is small.
    fn reachable_subset(&self, previous: &[Cell], current: Vec<Cell>) -> Vec<Cell> {
        let dimensions = self.grid.dimensions();

        let mut lo = previous[0].clone();
        let mut hi = previous[0].clone();
        for cell in previous.iter().chain(current.iter()) {
            for axis in 0..dimensions {
                lo[axis] = lo[axis].min(cell[axis]);
                hi[axis] = hi[axis].max(cell[axis]);
            }
        }

        let targets: FxHashSet<&Cell> = current.iter().collect();
        let mut found: FxHashSet<Cell> = FxHashSet::default();
        let mut visited: FxHashSet<Cell> = previous.iter().cloned().collect();
        let mut queue: VecDeque<Cell> = previous.iter().cloned().collect();

        while let Some(cell) = queue.pop_front() {
            if targets.contains(&cell) {
                found.insert(cell.clone());
                if found.len() == targets.len() {
                    break;
                }
            }

            for direction in self.grid.valid_directions() {
                let neighbor: Cell = cell
                    .iter()
                    .zip(direction.iter())
                    .map(|(&c, &d)| c + d)
                    .collect();
                let in_box = neighbor
                    .iter()
                    .enumerate()
                    .all(|(axis, &c)| c >= lo[axis] && c <= hi[axis]);
                if !in_box || visited.contains(&neighbor) || !self.grid.accessible(&neighbor) {
                    continue;
                }
                visited.insert(neighbor.clone());
                queue.push_back(neighbor);
            }
        }

        current.into_iter().filter(|c| found.contains(c)).collect()
    }

    fn finish(self, error: Option<CorridorError>) -> CartographResult {
        let mut traversed: Vec<Cell> = self.traversed.into_iter().collect();
        traversed.sort();

        CartographResult {
            success: error.is_none(),
            error,
            traversed_cells: traversed,
            position: RayPosition {
                coords: self.raytracer.coords(),
                t: self.raytracer.t(),
                reached: self.raytracer.reached(),
            },
        }
    }
}

impl OccupancyGrid {
    /// Trace one ray across this grid and report the swept corridor. See
    /// [Cartographer].
    ///
    /// Corridor blockage is not an error: it comes back as a
    /// `success = false` result carrying the partial corridor and a
    /// [CorridorError] tag. Only arity mismatches fail outright.
    pub fn cartograph(&self, start: &[f64], end: &[f64]) -> Result<CartographResult, RayError> {
        Ok(Cartographer::new(self, start, end)?.map())
    }
}
