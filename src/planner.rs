#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::bfs::Bfs;
use crate::{GridMode, OccupancyGrid, PlanError, Point};
use log::warn;
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// The search algorithm driving a plan.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Algorithm {
    /// Breadth-first search: minimal hop count under uniform edge weight.
    #[default]
    Bfs,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Bfs => write!(f, "bfs"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bfs" => Ok(Algorithm::Bfs),
            _ => Err(PlanError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// How a candidate edge is tested against the cells its ray sweeps.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EdgePolicy {
    /// Accept the edge when at least one swept cell (other than the source
    /// cell, in cell mode) is accessible. The edge is blocked only when the
    /// entire swept corridor is blocked.
    AnyFrontCell,

    /// Accept the edge only when the [crate::Cartographer] sweeps the whole
    /// corridor: every front must have an accessible cell, each reachable
    /// from the previous front.
    #[default]
    ClearCorridor,
}

/// Options for [OccupancyGrid::plan_path].
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanOptions {
    pub algorithm: Algorithm,
    pub mode: GridMode,
    pub edge_policy: EdgePolicy,
}

/// Results from [OccupancyGrid::plan_path].
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PlanResult {
    /// World coordinates from start to end: cell centers in cell mode,
    /// integer vertices in vertex mode. Never empty.
    pub path: Vec<Point>,

    /// Whether the path reaches the goal. When `false`, `path` leads to the
    /// expanded node nearest the goal instead.
    pub complete: bool,

    /// The number of nodes expanded while searching.
    pub expanded_nodes: usize,
}

impl OccupancyGrid {
    /// Find a path from `start` to `end` across this grid.
    ///
    /// Both endpoints are integer lattice coordinates in world space: cell
    /// indices in cell mode, vertex coordinates in vertex mode. Neighbor
    /// steps follow this grid's `loose` setting, and each candidate step is
    /// admitted by raytracing between the two lattice points and testing the
    /// swept cells against `options.edge_policy`.
    ///
    /// # Returns
    ///
    /// An `Err` for validation failures: arity mismatch, out-of-mode-bounds
    /// endpoints, or occupied start/end cells in cell mode. No search is
    /// performed in that case.
    ///
    /// Otherwise a [PlanResult]. When no complete path exists the result
    /// carries `complete = false` and the best-effort path to the expanded
    /// node nearest the goal; that is a distinguished success mode, not an
    /// error.
    pub fn plan_path(
        &self,
        start: &[i64],
        end: &[i64],
        options: &PlanOptions,
    ) -> Result<PlanResult, PlanError> {
        let dimensions = self.dimensions();
        if start.len() != dimensions {
            return Err(PlanError::StartDimensionMismatch {
                expected: dimensions,
                got: start.len(),
            });
        }
        if end.len() != dimensions {
            return Err(PlanError::EndDimensionMismatch {
                expected: dimensions,
                got: end.len(),
            });
        }

        let start_index = self.world_to_grid(start);
        let end_index = self.world_to_grid(end);

        if !self.index_in_mode_bounds(&start_index, options.mode) {
            return Err(PlanError::StartOutOfBounds(
                SmallVec::from_slice(start),
                options.mode,
            ));
        }
        if !self.index_in_mode_bounds(&end_index, options.mode) {
            return Err(PlanError::EndOutOfBounds(
                SmallVec::from_slice(end),
                options.mode,
            ));
        }

        if options.mode == GridMode::Cell {
            if self.occupied(start) {
                return Err(PlanError::StartOccupied(SmallVec::from_slice(start)));
            }
            if self.occupied(end) {
                return Err(PlanError::EndOccupied(SmallVec::from_slice(end)));
            }
        }

        let (path, complete, expanded_nodes) = match options.algorithm {
            Algorithm::Bfs => Bfs::new(
                self,
                start_index,
                end_index,
                options.mode,
                options.edge_policy,
            )
            .run(),
        };

        if !complete {
            warn!(
                "no complete path from {start:?} to {end:?}; returning attempted path of {} points",
                path.len()
            );
        }

        Ok(PlanResult {
            path,
            complete,
            expanded_nodes,
        })
    }

}

/// Find a path from `start` to `end` across `grid`.
///
/// Thin wrapper over [OccupancyGrid::plan_path] with the edge acceptance
/// rule this planner has always used: a step is blocked only when every cell
/// its ray sweeps is blocked ([EdgePolicy::AnyFrontCell]). New callers
/// composing [PlanOptions] directly get the stricter
/// [EdgePolicy::ClearCorridor] by default.
pub fn plan_path(
    start: &[i64],
    end: &[i64],
    grid: &OccupancyGrid,
    algorithm: Algorithm,
    mode: GridMode,
) -> Result<PlanResult, PlanError> {
    grid.plan_path(
        start,
        end,
        &PlanOptions {
            algorithm,
            mode,
            edge_policy: EdgePolicy::AnyFrontCell,
        },
    )
}
