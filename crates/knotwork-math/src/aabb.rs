use knotwork_core::{KnotworkError, Result};
use serde::{Deserialize, Serialize};

use crate::point::ControlPoint;

/// Axis-Aligned Bounding Box over 2D or 3D points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb<P> {
    pub min: P,
    pub max: P,
}

impl<P: ControlPoint> Aabb<P> {
    pub fn new(min: P, max: P) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: &[P]) -> Result<Self> {
        let (&first, rest) = points
            .split_first()
            .ok_or_else(|| KnotworkError::InvalidInput("cannot bound an empty point set".into()))?;
        let mut min = first;
        let mut max = first;
        for &p in rest {
            min = min.component_min(p);
            max = max.component_max(p);
        }
        Ok(Self { min, max })
    }

    pub fn center(&self) -> P {
        (self.min + self.max) * 0.5
    }

    pub fn extents(&self) -> P {
        self.max - self.min
    }

    pub fn contains_point(&self, p: P) -> bool {
        self.min.component_min(p) == self.min && self.max.component_max(p) == self.max
    }

    pub fn intersects(&self, other: &Self) -> bool {
        let lo = self.min.component_max(other.min);
        let hi = self.max.component_min(other.max);
        lo.component_min(hi) == lo
    }

    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min: self.min.component_min(other.min),
            max: self.max.component_max(other.max),
        }
    }

    pub fn expand(&self, amount: f64) -> Self {
        let offset = P::splat(amount);
        Self {
            min: self.min - offset,
            max: self.max + offset,
        }
    }
}

/// `(min, max)` corners of a typed point set.
pub fn bounding_box<P: ControlPoint>(points: &[P]) -> Result<(P, P)> {
    let aabb = Aabb::from_points(points)?;
    Ok((aabb.min, aabb.max))
}

/// `(min, max)` corners of untyped coordinate rows of any dimension.
///
/// The dimension is taken from the first row; every other row must match it.
pub fn bounding_box_coords<T: AsRef<[f64]>>(points: &[T]) -> Result<(Vec<f64>, Vec<f64>)> {
    let first = points
        .first()
        .ok_or_else(|| KnotworkError::InvalidInput("cannot bound an empty point set".into()))?
        .as_ref();
    let dimension = first.len();
    if dimension == 0 {
        return Err(KnotworkError::InvalidInput("points have no coordinates".into()));
    }

    let mut min = vec![f64::INFINITY; dimension];
    let mut max = vec![f64::NEG_INFINITY; dimension];
    for (i, row) in points.iter().enumerate() {
        let row = row.as_ref();
        if row.len() != dimension {
            return Err(KnotworkError::InvalidInput(format!(
                "point {} has {} coordinates, expected {}",
                i,
                row.len(),
                dimension
            )));
        }
        for (axis, &c) in row.iter().enumerate() {
            min[axis] = min[axis].min(c);
            max[axis] = max[axis].max(c);
        }
    }
    Ok((min, max))
}
