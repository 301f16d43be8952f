//! Fixed-dimension control points and boundary conversion from raw coordinates.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};

use knotwork_core::{KnotworkError, Result};

use crate::{Point2, Point3};

/// A point that can be blended by basis functions.
///
/// Implemented for [`Point2`] and [`Point3`]. Evaluators, knot insertion and
/// the grid utilities are generic over this trait, so a curve never mixes
/// dimensions.
pub trait ControlPoint:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f64, Output = Self>
    + Div<f64, Output = Self>
    + AddAssign
    + SubAssign
{
    const DIMENSION: usize;
    const ZERO: Self;

    fn coords(&self) -> Vec<f64>;

    /// Build a point from exactly `DIMENSION` coordinates.
    fn from_coords(coords: &[f64]) -> Option<Self>;

    fn splat(v: f64) -> Self;

    fn component_min(self, other: Self) -> Self;

    fn component_max(self, other: Self) -> Self;

    fn distance_to(self, other: Self) -> f64;
}

impl ControlPoint for Point2 {
    const DIMENSION: usize = 2;
    const ZERO: Self = Point2::ZERO;

    fn coords(&self) -> Vec<f64> {
        vec![self.x, self.y]
    }

    fn from_coords(coords: &[f64]) -> Option<Self> {
        match coords {
            [x, y] => Some(Point2::new(*x, *y)),
            _ => None,
        }
    }

    fn splat(v: f64) -> Self {
        Point2::splat(v)
    }

    fn component_min(self, other: Self) -> Self {
        self.min(other)
    }

    fn component_max(self, other: Self) -> Self {
        self.max(other)
    }

    fn distance_to(self, other: Self) -> f64 {
        self.distance(other)
    }
}

impl ControlPoint for Point3 {
    const DIMENSION: usize = 3;
    const ZERO: Self = Point3::ZERO;

    fn coords(&self) -> Vec<f64> {
        vec![self.x, self.y, self.z]
    }

    fn from_coords(coords: &[f64]) -> Option<Self> {
        match coords {
            [x, y, z] => Some(Point3::new(*x, *y, *z)),
            _ => None,
        }
    }

    fn splat(v: f64) -> Self {
        Point3::splat(v)
    }

    fn component_min(self, other: Self) -> Self {
        self.min(other)
    }

    fn component_max(self, other: Self) -> Self {
        self.max(other)
    }

    fn distance_to(self, other: Self) -> f64 {
        self.distance(other)
    }
}

/// Convert raw coordinate rows into typed points of one dimension.
///
/// Every row must have exactly `P::DIMENSION` entries.
pub fn points_from_coords<P, T>(points: &[T]) -> Result<Vec<P>>
where
    P: ControlPoint,
    T: AsRef<[f64]>,
{
    if points.is_empty() {
        return Err(KnotworkError::InvalidInput("point set is empty".into()));
    }
    points
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let row = row.as_ref();
            P::from_coords(row).ok_or_else(|| {
                KnotworkError::InvalidInput(format!(
                    "point {} has {} coordinates, expected {}",
                    i,
                    row.len(),
                    P::DIMENSION
                ))
            })
        })
        .collect()
}

/// A point set whose dimension was decided at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum PointSet {
    Planar(Vec<Point2>),
    Spatial(Vec<Point3>),
}

impl PointSet {
    /// Infer the dimension from the first row and convert every row to it.
    pub fn from_coords<T: AsRef<[f64]>>(points: &[T]) -> Result<Self> {
        let first = points
            .first()
            .ok_or_else(|| KnotworkError::InvalidInput("point set is empty".into()))?;
        match first.as_ref().len() {
            2 => points_from_coords(points).map(PointSet::Planar),
            3 => points_from_coords(points).map(PointSet::Spatial),
            d => Err(KnotworkError::InvalidInput(format!(
                "unsupported point dimension {}, expected 2 or 3",
                d
            ))),
        }
    }

    pub fn dimension(&self) -> usize {
        match self {
            PointSet::Planar(_) => Point2::DIMENSION,
            PointSet::Spatial(_) => Point3::DIMENSION,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PointSet::Planar(pts) => pts.len(),
            PointSet::Spatial(pts) => pts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
