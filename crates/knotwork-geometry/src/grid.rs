//! Surface control grids and the neighbor/reordering helpers built on them.

use std::ops::Index;

use knotwork_core::traits::{BoundingBox, Validate};
use knotwork_core::{KnotworkError, Result};
use knotwork_math::{Aabb, ControlPoint};
use serde::{Deserialize, Serialize};

/// A `size_u × size_v` grid stored row-major, `v` the fast index.
///
/// `grid[(i, j)]` is the point at row `i` (u-direction) and column `j`
/// (v-direction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlGrid<T> {
    points: Vec<T>,
    size_u: usize,
    size_v: usize,
}

impl<T> ControlGrid<T> {
    /// Wrap a flat row-major point list.
    pub fn new(points: Vec<T>, size_u: usize, size_v: usize) -> Result<Self> {
        let grid = Self {
            points,
            size_u,
            size_v,
        };
        grid.check_shape()?;
        Ok(grid)
    }

    /// Build a grid from rows of equal length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let size_u = rows.len();
        let size_v = rows.first().map_or(0, Vec::len);
        if let Some(i) = rows.iter().position(|row| row.len() != size_v) {
            return Err(KnotworkError::InvalidInput(format!(
                "row {} has {} points, expected {}",
                i,
                rows[i].len(),
                size_v
            )));
        }
        Self::new(rows.into_iter().flatten().collect(), size_u, size_v)
    }

    fn check_shape(&self) -> Result<()> {
        if self.size_u == 0 || self.size_v == 0 {
            return Err(KnotworkError::InvalidInput(format!(
                "grid dimensions must be positive, got {} x {}",
                self.size_u, self.size_v
            )));
        }
        if self.points.len() != self.size_u * self.size_v {
            return Err(KnotworkError::InvalidInput(format!(
                "grid of {} x {} needs {} points, got {}",
                self.size_u,
                self.size_v,
                self.size_u * self.size_v,
                self.points.len()
            )));
        }
        Ok(())
    }

    pub fn size_u(&self) -> usize {
        self.size_u
    }

    pub fn size_v(&self) -> usize {
        self.size_v
    }

    /// Flat row-major points.
    pub fn points(&self) -> &[T] {
        &self.points
    }

    pub fn into_points(self) -> Vec<T> {
        self.points
    }

    /// Position of `(i, j)` in the flat point list.
    #[inline]
    pub fn offset(&self, i: usize, j: usize) -> usize {
        i * self.size_v + j
    }

    pub fn get(&self, i: usize, j: usize) -> Option<&T> {
        if i < self.size_u && j < self.size_v {
            self.points.get(self.offset(i, j))
        } else {
            None
        }
    }

    /// Points with fixed u index `i`, running along v.
    pub fn row(&self, i: usize) -> &[T] {
        let start = self.offset(i, 0);
        &self.points[start..start + self.size_v]
    }
}

impl<T: Clone> ControlGrid<T> {
    /// Points with fixed v index `j`, running along u.
    pub fn column(&self, j: usize) -> Vec<T> {
        (0..self.size_u).map(|i| self[(i, j)].clone()).collect()
    }

    pub fn rows(&self) -> Vec<Vec<T>> {
        self.points.chunks(self.size_v).map(<[T]>::to_vec).collect()
    }

    /// Rebuild a grid from its columns (each of equal length).
    pub fn from_columns(columns: Vec<Vec<T>>) -> Result<Self> {
        let size_v = columns.len();
        let size_u = columns.first().map_or(0, Vec::len);
        if columns.iter().any(|c| c.len() != size_u) {
            return Err(KnotworkError::InvalidInput("columns differ in length".into()));
        }
        let mut points = Vec::with_capacity(size_u * size_v);
        for i in 0..size_u {
            for column in &columns {
                points.push(column[i].clone());
            }
        }
        Self::new(points, size_u, size_v)
    }
}

impl<T> Index<(usize, usize)> for ControlGrid<T> {
    type Output = T;

    fn index(&self, (i, j): (usize, usize)) -> &T {
        &self.points[self.offset(i, j)]
    }
}

impl<T> Validate for ControlGrid<T> {
    fn validate(&self) -> Result<()> {
        self.check_shape()
    }
}

impl<P: ControlPoint> BoundingBox for ControlGrid<P> {
    type Point = P;

    fn bounding_box(&self) -> Result<(P, P)> {
        let aabb = Aabb::from_points(&self.points)?;
        Ok((aabb.min, aabb.max))
    }
}

/// Options for [`neighbor_structure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborConfig {
    /// Synthesize missing boundary neighbors by reflecting the opposite one
    pub extrapolate: bool,
}

impl Default for NeighborConfig {
    fn default() -> Self {
        Self { extrapolate: true }
    }
}

/// A grid point followed by its neighbors.
///
/// Neighbors come in the order `(u+1, v)`, `(u, v+1)`, `(u-1, v)`, `(u, v-1)`,
/// skipping any that are missing and were not synthesized.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborRecord<P> {
    pub points: Vec<P>,
}

impl<P> NeighborRecord<P> {
    pub fn center(&self) -> &P {
        &self.points[0]
    }

    pub fn neighbors(&self) -> &[P] {
        &self.points[1..]
    }
}

/// Collect each grid point with its direct neighbors, row-major (u outer, v inner).
///
/// With `extrapolate` set, a neighbor missing on the boundary becomes
/// `b + (b - opposite)`. A grid one point wide has no opposite neighbor in that
/// direction, so the center itself stands in and every record keeps four neighbors.
pub fn neighbor_structure<P: ControlPoint>(
    grid: &ControlGrid<P>,
    config: NeighborConfig,
) -> Vec<NeighborRecord<P>> {
    let (size_u, size_v) = (grid.size_u(), grid.size_v());
    let at = |i: isize, j: isize| -> Option<P> {
        if i < 0 || j < 0 {
            return None;
        }
        grid.get(i as usize, j as usize).copied()
    };

    let mut records = Vec::with_capacity(size_u * size_v);
    for u in 0..size_u as isize {
        for v in 0..size_v as isize {
            let center = grid[(u as usize, v as usize)];
            let mut points = vec![center];
            for (du, dv) in [(1, 0), (0, 1), (-1, 0), (0, -1)] {
                match at(u + du, v + dv) {
                    Some(p) => points.push(p),
                    None if config.extrapolate => match at(u - du, v - dv) {
                        Some(opposite) => points.push(center + (center - opposite)),
                        None => points.push(center),
                    },
                    None => {}
                }
            }
            records.push(NeighborRecord { points });
        }
    }
    records
}

/// Reorder a flat point list so consecutive rows of `num_cols` alternate direction.
///
/// ```text
/// ------->>-------|
/// |------<<-------|
/// |------>>-------|
/// ```
pub fn zigzag<T: Clone>(points: &[T], num_cols: usize) -> Result<Vec<T>> {
    if num_cols == 0 {
        return Err(KnotworkError::InvalidInput("zig-zag needs at least one column".into()));
    }
    let mut out = Vec::with_capacity(points.len());
    for (row, chunk) in points.chunks(num_cols).enumerate() {
        if row % 2 == 0 {
            out.extend_from_slice(chunk);
        } else {
            out.extend(chunk.iter().rev().cloned());
        }
    }
    Ok(out)
}

/// Reorder grid points into a single path that sweeps the rows and then the columns.
///
/// The output holds every point twice: the row zig-zag reversed, followed by
/// a zig-zag over the columns.
pub fn quad_reorder<T: Clone>(points: &[T], size_u: usize, size_v: usize) -> Result<Vec<T>> {
    if size_u == 0 || size_v == 0 || points.len() != size_u * size_v {
        return Err(KnotworkError::InvalidInput(format!(
            "grid of {} x {} does not match {} points",
            size_u,
            size_v,
            points.len()
        )));
    }

    let mut out = zigzag(points, size_v)?;
    out.reverse();
    out.reserve(points.len());

    for j in 0..size_v {
        let column = (0..size_u).map(|i| points[j + i * size_v].clone());
        if j % 2 == 0 {
            out.extend(column);
        } else {
            out.extend(column.rev());
        }
    }
    Ok(out)
}
