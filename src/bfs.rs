use crate::{
    distance_squared, Cartographer, Cell, EdgePolicy, GridMode, NodeTable, OccupancyGrid, Point,
    Raytracer,
};
use log::debug;
use std::collections::VecDeque;

/// Breadth-first search over lattice coordinates, using the raytracer as the
/// edge-feasibility predicate.
///
/// Operates in grid-index space: the grid origin is subtracted from the
/// endpoints before the search and added back while reconstructing the path.
pub(crate) struct Bfs<'a> {
    grid: &'a OccupancyGrid,
    nodes: NodeTable,
    start: Cell,
    end: Cell,
    mode: GridMode,
    policy: EdgePolicy,
}

impl<'a> Bfs<'a> {
    pub(crate) fn new(
        grid: &'a OccupancyGrid,
        start: Cell,
        end: Cell,
        mode: GridMode,
        policy: EdgePolicy,
    ) -> Self {
        let bounds: Vec<usize> = grid
            .shape()
            .iter()
            .map(|&s| match mode {
                GridMode::Cell => s,
                GridMode::Vertex => s + 1,
            })
            .collect();
        Self {
            grid,
            nodes: NodeTable::new(&bounds),
            start,
            end,
            mode,
            policy,
        }
    }

    /// Run the search. Returns the path in world coordinates, whether it is
    /// complete, and the number of nodes expanded.
    ///
    /// When the frontier empties without reaching the goal, the path to the
    /// expanded node nearest the goal is returned instead, so callers can
    /// still display best-effort progress.
    pub(crate) fn run(&mut self) -> (Vec<Point>, bool, usize) {
        let grid = self.grid;

        match self.nodes.get_or_insert(&self.start) {
            Some(node) => node.expand(),
            None => return (Vec::new(), false, 0),
        }

        let mut queue: VecDeque<Cell> = VecDeque::new();
        queue.push_back(self.start.clone());

        while let Some(current) = queue.pop_front() {
            if current == self.end {
                let path = self.reconstruct(&current);
                return (path, true, self.expanded_count());
            }

            for direction in grid.valid_directions() {
                let neighbor: Cell = current
                    .iter()
                    .zip(direction.iter())
                    .map(|(&c, &d)| c + d)
                    .collect();

                if !grid.index_in_mode_bounds(&neighbor, self.mode) {
                    continue;
                }
                if self
                    .nodes
                    .get(&neighbor)
                    .is_some_and(|node| node.expanded())
                {
                    continue;
                }
                if !self.edge_feasible(&current, &neighbor) {
                    continue;
                }

                if let Some(node) = self.nodes.get_or_insert(&neighbor) {
                    node.expand_from(current.clone());
                    queue.push_back(neighbor);
                }
            }
        }

        let nearest = self.nearest_expanded_to_goal();
        let path = self.reconstruct(&nearest);
        (path, false, self.expanded_count())
    }

    /// Test whether the step from `from` to `to` is connected by a ray. A
    /// raytracer failure blocks the edge rather than aborting the plan.
    fn edge_feasible(&self, from: &Cell, to: &Cell) -> bool {
        let start = self.ray_coords(from);
        let end = self.ray_coords(to);

        match self.policy {
            EdgePolicy::AnyFrontCell => {
                let mut raytracer =
                    match Raytracer::new(self.grid.dimensions(), &start, &end) {
                        Ok(raytracer) => raytracer,
                        Err(error) => {
                            debug!("edge {from:?} -> {to:?} blocked: {error}");
                            return false;
                        }
                    };

                // The node's own cell is trivially accessible and does not
                // witness a connection.
                let own_cell = match self.mode {
                    GridMode::Cell => Some(self.grid.grid_to_world(from)),
                    GridMode::Vertex => None,
                };

                raytracer
                    .trace()
                    .iter()
                    .any(|cell| own_cell.as_ref() != Some(cell) && self.grid.accessible(cell))
            }
            EdgePolicy::ClearCorridor => match Cartographer::new(self.grid, &start, &end) {
                Ok(cartographer) => cartographer.map().success,
                Err(error) => {
                    debug!("edge {from:?} -> {to:?} blocked: {error}");
                    false
                }
            },
        }
    }

    /// Raytracing coordinates for a lattice index: world cell centers in
    /// cell mode, world vertices in vertex mode.
    fn ray_coords(&self, index: &Cell) -> Point {
        index
            .iter()
            .zip(self.grid.origin().iter())
            .map(|(&c, &o)| {
                let world = (c + o) as f64;
                match self.mode {
                    GridMode::Cell => world + 0.5,
                    GridMode::Vertex => world,
                }
            })
            .collect()
    }

    fn reconstruct(&self, goal: &Cell) -> Vec<Point> {
        let mut path = Vec::new();
        let mut current = Some(goal.clone());
        while let Some(coords) = current {
            path.push(self.ray_coords(&coords));
            current = self
                .nodes
                .get(&coords)
                .and_then(|node| node.parent().cloned());
        }
        path.reverse();
        path
    }

    /// The expanded node with the smallest euclidean distance to the goal;
    /// ties keep the first node created, so the result is deterministic.
    fn nearest_expanded_to_goal(&self) -> Cell {
        let mut nearest = self.start.clone();
        let mut nearest_distance = f64::INFINITY;
        for (coords, node) in self.nodes.iter() {
            if !node.expanded() {
                continue;
            }
            let distance = distance_squared(coords, &self.end);
            if distance < nearest_distance {
                nearest_distance = distance;
                nearest = coords.clone();
            }
        }
        nearest
    }

    fn expanded_count(&self) -> usize {
        self.nodes.iter().filter(|(_, node)| node.expanded()).count()
    }
}
