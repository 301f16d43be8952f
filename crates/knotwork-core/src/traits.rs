use crate::error::Result;

/// Re-check the cross-field invariants of a curve, surface or grid.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Per-axis `(min, max)` corners of a point set.
///
/// Fails with `InvalidInput` when there are no points to enclose.
pub trait BoundingBox {
    type Point;
    fn bounding_box(&self) -> Result<(Self::Point, Self::Point)>;
}
