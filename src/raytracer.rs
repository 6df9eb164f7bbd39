use crate::{is_integral, to_point, Cell, Point, RayError, THRESHOLD};
use fxhash::FxHashSet;
use num_traits::NumCast;
use smallvec::SmallVec;

/// An incremental N-dimensional raytracer.
///
/// The ray from `x0` to `xf` is parameterised as `x(t) = x0 + t * (xf - x0)`
/// with `t` in `[0, 1]`. The tracer walks the ray one grid-line crossing at a
/// time, tracking the integer corner `y` most recently crossed per axis and
/// the parametric distance `D` to the next crossing per axis. At each
/// position the *front* is the set of lattice cells incident to the corner on
/// the forward side of the ray.
///
/// Hyperplane crossings closer together than [THRESHOLD] in `t` are taken in
/// one step, so rays travelling along grid diagonals update every crossed
/// axis atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct Raytracer {
    dimensions: usize,
    start: Point,
    end: Point,
    delta: Point,
    ray_length: f64,
    sign: SmallVec<[i64; 4]>,
    y: Cell,
    k: SmallVec<[u32; 4]>,
    d: SmallVec<[f64; 4]>,
    d0: SmallVec<[f64; 4]>,
    t: f64,
}

impl Raytracer {
    /// Create a raytracer for the segment from `start` to `end`.
    ///
    /// Integer and float coordinate slices are both accepted. Fails when
    /// `dimensions` is zero or either endpoint's arity differs from it.
    pub fn new<T>(dimensions: usize, start: &[T], end: &[T]) -> Result<Self, RayError>
    where
        T: NumCast + Copy,
    {
        if dimensions == 0 {
            return Err(RayError::ZeroDimensions);
        }
        if start.len() != dimensions {
            return Err(RayError::StartDimensionMismatch {
                expected: dimensions,
                got: start.len(),
            });
        }
        if end.len() != dimensions {
            return Err(RayError::EndDimensionMismatch {
                expected: dimensions,
                got: end.len(),
            });
        }

        let start = to_point(start);
        let end = to_point(end);
        let delta: Point = end.iter().zip(start.iter()).map(|(&e, &s)| e - s).collect();
        let ray_length = delta.iter().map(|&d| d * d).sum::<f64>().sqrt();

        let mut sign: SmallVec<[i64; 4]> = SmallVec::from_elem(0, dimensions);
        let mut y: Cell = SmallVec::from_elem(0, dimensions);
        let mut d: SmallVec<[f64; 4]> = SmallVec::from_elem(f64::INFINITY, dimensions);

        for i in 0..dimensions {
            if delta[i] > THRESHOLD {
                sign[i] = 1;
                y[i] = start[i].floor() as i64;
            } else if delta[i] < -THRESHOLD {
                sign[i] = -1;
                y[i] = start[i].ceil() as i64;
            } else {
                y[i] = start[i].floor() as i64;
                continue;
            }
            d[i] = (y[i] as f64 + sign[i] as f64 - start[i]) / delta[i];

            // A start exactly on a grid line, moving away from it: the first
            // crossing lies one whole cell ahead, not at t = 0.
            if d[i].abs() < THRESHOLD {
                d[i] = 1.0 / delta[i].abs();
            }
        }
        let d0 = d.clone();

        Ok(Self {
            dimensions,
            start,
            end,
            delta,
            ray_length,
            sign,
            y,
            k: SmallVec::from_elem(0, dimensions),
            d,
            d0,
            t: 0.0,
        })
    }

    /// The number of axes of this ray.
    #[inline]
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// The ray's start coordinates.
    #[inline]
    #[must_use]
    pub fn start(&self) -> &[f64] {
        &self.start
    }

    /// The ray's end coordinates.
    #[inline]
    #[must_use]
    pub fn end(&self) -> &[f64] {
        &self.end
    }

    /// The integer corner most recently crossed per axis, in the direction of
    /// travel.
    #[inline]
    #[must_use]
    pub fn corner(&self) -> &[i64] {
        &self.y
    }

    /// The current parametric position along the ray. `0` at the start,
    /// `>= 1` once the goal is reached.
    #[inline]
    #[must_use]
    pub fn t(&self) -> f64 {
        self.t
    }

    /// The total length of the segment.
    #[inline]
    #[must_use]
    pub fn ray_length(&self) -> f64 {
        self.ray_length
    }

    /// The distance travelled so far.
    #[inline]
    #[must_use]
    pub fn length(&self) -> f64 {
        if self.ray_length == 0.0 {
            0.0
        } else {
            self.t * self.ray_length
        }
    }

    /// The current position along the ray.
    #[inline]
    #[must_use]
    pub fn coords(&self) -> Point {
        if self.ray_length == 0.0 {
            return self.start.clone();
        }
        self.start
            .iter()
            .zip(self.delta.iter())
            .map(|(&s, &d)| s + self.t * d)
            .collect()
    }

    /// Whether the goal has been reached.
    #[inline]
    #[must_use]
    pub fn reached(&self) -> bool {
        self.t >= 1.0
    }

    /// The set of cells incident to the current corner on the forward side
    /// of the ray. Empty once the goal is reached.
    ///
    /// Along a moving axis the front extends one cell in the direction of
    /// travel. A stationary axis whose start coordinate lies on a grid line
    /// is degenerate: the cells on both sides of the line belong to the
    /// front, so a ray leaving an integer vertex sweeps across all incident
    /// cells. With `k` degenerate axes the front holds `2^k` cells.
    #[must_use]
    pub fn front_cells(&self) -> Vec<Cell> {
        if self.reached() {
            return Vec::new();
        }

        let mut base: Cell = SmallVec::with_capacity(self.dimensions);
        let mut degenerate: SmallVec<[usize; 4]> = SmallVec::new();
        for i in 0..self.dimensions {
            let offset = if self.sign[i] < 0 { -1 } else { 0 };
            base.push(self.y[i] + offset);
            if self.sign[i] == 0 && is_integral(self.start[i]) {
                degenerate.push(i);
            }
        }

        let count = 1usize << degenerate.len();
        let mut cells = Vec::with_capacity(count);
        for mask in 0..count {
            let mut cell = base.clone();
            for (bit, &axis) in degenerate.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    cell[axis] -= 1;
                }
            }
            cells.push(cell);
        }
        cells
    }

    /// Step to the next grid-line crossing. Every axis whose crossing lies
    /// within [THRESHOLD] of the nearest one is crossed in the same step.
    ///
    /// Returns `false` if the goal was already reached.
    pub fn advance(&mut self) -> bool {
        if self.reached() {
            return false;
        }

        let mut nearest = 0;
        for i in 1..self.dimensions {
            if self.d[i] < self.d[nearest] {
                nearest = i;
            }
        }
        self.t = self.d[nearest];

        for j in 0..self.dimensions {
            if (self.d[j] - self.t).abs() < THRESHOLD {
                if self.sign[j] == 0 {
                    continue;
                }
                self.y[j] += self.sign[j];
                self.k[j] += 1;
                self.d[j] = self.d0[j] + self.k[j] as f64 / self.delta[j].abs();
            }
        }

        true
    }

    /// Walk the ray to the goal and collect every front cell encountered,
    /// duplicates discarded.
    ///
    /// The union covers every cell the closed segment passes through,
    /// starting at `t = 0`. A zero-length ray yields the cells incident to
    /// its start point, up to `2^N` of them when the point is an integer
    /// vertex.
    pub fn trace(&mut self) -> FxHashSet<Cell> {
        let mut intersected = FxHashSet::default();

        while !self.reached() {
            intersected.extend(self.front_cells());
            if !self.advance() {
                break;
            }
        }

        // Front at the final position; empty once the goal is reached.
        intersected.extend(self.front_cells());

        intersected
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cell;

    fn assert_near(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{} != {}", a, b);
    }

    fn trace_cells(start: &[f64], end: &[f64]) -> FxHashSet<Cell> {
        Raytracer::new(start.len(), start, end).unwrap().trace()
    }

    fn set(cells: &[&[i64]]) -> FxHashSet<Cell> {
        cells.iter().map(|c| cell(c)).collect()
    }

    #[test]
    fn test_construction_positive() {
        let ray = Raytracer::new(2, &[0.5, 0.5], &[2.5, 2.5]).unwrap();
        assert_eq!(ray.sign.as_slice(), &[1, 1]);
        assert_eq!(ray.corner(), &[0, 0]);
        assert_near(ray.d[0], 0.25);
        assert_near(ray.d[1], 0.25);
        assert_eq!(ray.t(), 0.0);
        assert!(!ray.reached());
    }

    #[test]
    fn test_construction_negative() {
        let ray = Raytracer::new(2, &[2.5, 2.5], &[0.5, 0.5]).unwrap();
        assert_eq!(ray.sign.as_slice(), &[-1, -1]);
        assert_eq!(ray.corner(), &[3, 3]);
        assert_near(ray.d[0], 0.25);
        assert_near(ray.d[1], 0.25);
    }

    #[test]
    fn test_construction_stationary_axis() {
        let ray = Raytracer::new(2, &[0.5, 0.25], &[2.5, 0.25]).unwrap();
        assert_eq!(ray.sign.as_slice(), &[1, 0]);
        assert_eq!(ray.corner(), &[0, 0]);
        assert_eq!(ray.d[1], f64::INFINITY);
    }

    #[test]
    fn test_construction_near_grid_line_fixup() {
        // A start epsilon below x = 1, moving right: the first crossing is
        // treated as lying at x = 2, one whole cell ahead.
        let ray = Raytracer::new(2, &[1.0 - 1e-12, 0.5], &[3.0 - 1e-12, 0.5]).unwrap();
        assert_eq!(ray.corner(), &[0, 0]);
        assert_near(ray.d[0], 0.5);
    }

    #[test]
    fn test_construction_errors() {
        assert_eq!(
            Raytracer::new(0, &[0.0; 0], &[0.0; 0]).unwrap_err(),
            RayError::ZeroDimensions
        );
        assert_eq!(
            Raytracer::new(3, &[0.0, 0.0], &[0.0, 0.0, 0.0]).unwrap_err(),
            RayError::StartDimensionMismatch {
                expected: 3,
                got: 2
            }
        );
        assert_eq!(
            Raytracer::new(2, &[0.0, 0.0], &[0.0, 0.0, 0.0]).unwrap_err(),
            RayError::EndDimensionMismatch {
                expected: 2,
                got: 3
            }
        );
    }

    #[test]
    fn test_integer_start_with_motion_is_not_degenerate() {
        // Both axes move, so only the forward cell is in the front even
        // though the start is a lattice vertex.
        let ray = Raytracer::new(2, &[0.0, 0.0], &[3.0, 3.0]).unwrap();
        assert_eq!(ray.front_cells(), vec![cell(&[0, 0])]);
    }

    #[test]
    fn test_degenerate_front_at_vertex() {
        // Zero-length ray anchored on a vertex: all four incident cells.
        let ray = Raytracer::new(2, &[1.0, 1.0], &[1.0, 1.0]).unwrap();
        let front: FxHashSet<Cell> = ray.front_cells().into_iter().collect();
        assert_eq!(
            front,
            set(&[&[0, 0], &[0, 1], &[1, 0], &[1, 1]])
        );
    }

    #[test]
    fn test_degenerate_front_single_axis() {
        // x stationary on a grid line, y moving: two cells per position.
        let ray = Raytracer::new(2, &[1.0, 0.5], &[1.0, 2.5]).unwrap();
        let front: FxHashSet<Cell> = ray.front_cells().into_iter().collect();
        assert_eq!(front, set(&[&[0, 0], &[1, 0]]));
    }

    #[test]
    fn test_stationary_non_integral_front() {
        let ray = Raytracer::new(2, &[0.5, 0.5], &[0.5, 2.5]).unwrap();
        assert_eq!(ray.front_cells(), vec![cell(&[0, 0])]);
    }

    #[test]
    fn test_advance_diagonal_crossings_are_atomic() {
        let mut ray = Raytracer::new(2, &[0.0, 0.0], &[2.0, 2.0]).unwrap();
        assert_near(ray.d[0], 0.5);
        assert_near(ray.d[1], 0.5);

        assert!(ray.advance());
        assert_eq!(ray.t(), 0.5);
        assert_eq!(ray.corner(), &[1, 1]);
        assert_eq!(ray.k.as_slice(), &[1, 1]);
        assert_near(ray.d[0], 1.0);
        assert_near(ray.d[1], 1.0);

        assert!(ray.advance());
        assert_eq!(ray.t(), 1.0);
        assert_eq!(ray.corner(), &[2, 2]);
        assert!(ray.reached());
        assert!(!ray.advance());
    }

    #[test]
    fn test_zero_length_ray() {
        let mut ray = Raytracer::new(2, &[0.5, 0.5], &[0.5, 0.5]).unwrap();
        assert_eq!(ray.ray_length(), 0.0);
        assert!(!ray.reached());
        assert_eq!(ray.coords(), crate::point(&[0.5, 0.5]));

        let cells = ray.trace();
        assert_eq!(cells, set(&[&[0, 0]]));
        assert!(ray.reached());
        assert_eq!(ray.length(), 0.0);
    }

    #[test]
    fn test_zero_length_ray_at_vertex() {
        let cells = trace_cells(&[1.0, 1.0], &[1.0, 1.0]);
        assert_eq!(cells, set(&[&[0, 0], &[0, 1], &[1, 0], &[1, 1]]));
    }

    #[test]
    fn test_trace_diagonal_between_cell_centers() {
        let cells = trace_cells(&[0.5, 0.5], &[2.5, 2.5]);
        assert_eq!(cells, set(&[&[0, 0], &[1, 1], &[2, 2]]));
    }

    #[test]
    fn test_trace_axis_aligned() {
        let cells = trace_cells(&[0.5, 0.5], &[2.5, 0.5]);
        assert_eq!(cells, set(&[&[0, 0], &[1, 0], &[2, 0]]));
    }

    #[test]
    fn test_trace_covers_endpoint_cell_short_of_a_crossing() {
        let cells = trace_cells(&[0.5, 0.5], &[2.7, 2.7]);
        assert_eq!(cells, set(&[&[0, 0], &[1, 1], &[2, 2]]));
    }

    #[test]
    fn test_axis_aligned_cell_count() {
        // Integer travel distance, off-lattice orthogonal coordinate: one
        // cell per unit of travel.
        let cells = trace_cells(&[0.5, 0.0], &[0.5, 3.0]);
        assert_eq!(cells, set(&[&[0, 0], &[0, 1], &[0, 2]]));
    }

    #[test]
    fn test_axis_aligned_cell_count_doubles_when_degenerate() {
        // The stationary x axis sits on a grid line, doubling the front.
        let cells = trace_cells(&[0.0, 0.0], &[0.0, 3.0]);
        assert_eq!(
            cells,
            set(&[
                &[-1, 0],
                &[0, 0],
                &[-1, 1],
                &[0, 1],
                &[-1, 2],
                &[0, 2],
            ])
        );
    }

    #[test]
    fn test_trace_3d_axis_aligned_from_cell_centers() {
        let cells = trace_cells(&[0.5, 0.5, 0.5], &[0.5, 0.5, 4.5]);
        assert_eq!(
            cells,
            set(&[
                &[0, 0, 0],
                &[0, 0, 1],
                &[0, 0, 2],
                &[0, 0, 3],
                &[0, 0, 4],
            ])
        );
    }

    #[test]
    fn test_trace_3d_axis_aligned_from_vertex() {
        // Two degenerate orthogonal axes: four incident cells per crossing.
        let cells = trace_cells(&[0.0, 0.0, 0.0], &[0.0, 0.0, 5.0]);
        assert_eq!(cells.len(), 20);
        for z in 0..5 {
            for x in -1..=0 {
                for y in -1..=0 {
                    assert!(cells.contains(&cell(&[x, y, z])), "({x},{y},{z})");
                }
            }
        }
    }

    #[test]
    fn test_trace_4d_diagonal() {
        let cells = trace_cells(&[0.5, 0.5, 0.5, 0.5], &[2.5, 2.5, 2.5, 2.5]);
        assert_eq!(
            cells,
            set(&[&[0, 0, 0, 0], &[1, 1, 1, 1], &[2, 2, 2, 2]])
        );
    }

    #[test]
    fn test_reversal_symmetry() {
        let segments: Vec<(Vec<f64>, Vec<f64>)> = vec![
            (vec![0.5, 0.5], vec![2.5, 2.5]),
            (vec![0.5, 0.5], vec![2.5, 0.5]),
            (vec![0.25, 0.25], vec![2.25, 1.25]),
            (vec![0.0, 0.0], vec![2.0, 2.0]),
            (vec![0.5, 0.5, 0.5], vec![2.5, 1.5, 0.5]),
        ];

        for (a, b) in segments {
            let forward = trace_cells(&a, &b);
            let backward = trace_cells(&b, &a);
            assert_eq!(forward, backward, "{:?} <-> {:?}", a, b);
        }
    }

    #[test]
    fn test_trace_covers_sampled_segment() {
        let segments: Vec<(Vec<f64>, Vec<f64>)> = vec![
            (vec![0.5, 0.5], vec![2.5, 2.5]),
            (vec![0.25, 0.25], vec![2.25, 1.25]),
            (vec![0.3, 0.0], vec![0.2, 3.1]),
            (vec![0.5, 0.5, 0.5], vec![4.5, 2.5, 1.5]),
        ];

        for (a, b) in segments {
            let cells = trace_cells(&a, &b);
            for step in 0..=1000 {
                let t = step as f64 / 1000.0;
                let position: Vec<f64> = a
                    .iter()
                    .zip(b.iter())
                    .map(|(&p, &q)| p + t * (q - p))
                    .collect();
                // Points on cell boundaries belong to more than one cell.
                if position.iter().any(|&v| (v - v.round()).abs() < 1e-6) {
                    continue;
                }
                let containing: Cell = position.iter().map(|&v| v.floor() as i64).collect();
                assert!(
                    cells.contains(&containing),
                    "cell {:?} at t = {} missing for {:?} -> {:?}",
                    containing,
                    t,
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_front_cells_empty_once_reached() {
        let mut ray = Raytracer::new(2, &[0.5, 0.5], &[1.5, 0.5]).unwrap();
        ray.trace();
        assert!(ray.reached());
        assert!(ray.front_cells().is_empty());
    }

    #[test]
    fn test_coords_and_length_track_t() {
        let mut ray = Raytracer::new(2, &[0.0, 0.0], &[4.0, 0.0]).unwrap();
        assert_eq!(ray.ray_length(), 4.0);

        assert!(ray.advance());
        assert_eq!(ray.t(), 0.25);
        assert_eq!(ray.coords(), crate::point(&[1.0, 0.0]));
        assert_eq!(ray.length(), 1.0);
    }

    #[test]
    fn test_integer_inputs_accepted() {
        let cells = Raytracer::new(2, &[0i64, 0], &[2, 2]).unwrap().trace();
        assert_eq!(cells, set(&[&[0, 0], &[1, 1]]));
    }
}
