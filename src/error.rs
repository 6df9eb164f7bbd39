#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::{Cell, GridMode};
use thiserror::Error;

/// Errors raised while constructing an [crate::OccupancyGrid].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("occupancy grid must have at least 2 dimensions, got {0}")]
    TooFewDimensions(usize),

    #[error("shape axis {axis} must hold at least one cell")]
    EmptyAxis { axis: usize },

    #[error("loose must be in 1..={dimensions}, got {loose}")]
    LooseOutOfRange { loose: usize, dimensions: usize },

    #[error("origin has {got} coordinates, expected {expected}")]
    OriginDimensionMismatch { expected: usize, got: usize },

    #[error("occupancy data holds {got} cells, shape requires {expected}")]
    DataLengthMismatch { expected: usize, got: usize },
}

/// Errors raised while constructing a [crate::Raytracer].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RayError {
    #[error("ray must have at least 1 dimension")]
    ZeroDimensions,

    #[error("ray start has {got} coordinates, expected {expected}")]
    StartDimensionMismatch { expected: usize, got: usize },

    #[error("ray end has {got} coordinates, expected {expected}")]
    EndDimensionMismatch { expected: usize, got: usize },
}

/// Validation errors reported by [crate::OccupancyGrid::plan_path] before any
/// search is performed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("start has {got} coordinates, expected {expected}")]
    StartDimensionMismatch { expected: usize, got: usize },

    #[error("end has {got} coordinates, expected {expected}")]
    EndDimensionMismatch { expected: usize, got: usize },

    #[error("start {0:?} is out of {1} bounds")]
    StartOutOfBounds(Cell, GridMode),

    #[error("end {0:?} is out of {1} bounds")]
    EndOutOfBounds(Cell, GridMode),

    #[error("start cell {0:?} is occupied")]
    StartOccupied(Cell),

    #[error("end cell {0:?} is occupied")]
    EndOccupied(Cell),

    #[error("unsupported algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    #[error("unsupported mode '{0}', use 'cell' or 'vertex'")]
    UnsupportedMode(String),
}

/// The reason a traced corridor was cut short. Carried inside a
/// [crate::CartographResult] rather than raised: the partial corridor is
/// still part of the answer.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CorridorError {
    /// Every cell of the current front is out of bounds or occupied.
    #[error("no accessible front cells")]
    FrontInaccessible,

    /// The current front has accessible cells, but none of them can be
    /// reached from the previous front without crossing blocked cells.
    #[error("front not reachable from previous front")]
    FrontNotReachable,
}
