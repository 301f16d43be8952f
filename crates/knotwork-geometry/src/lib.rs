//! Knotwork geometry: B-spline and NURBS curves and surfaces.

pub mod compat;
pub mod config;
pub mod curve;
pub mod grid;
pub mod nurbs;
pub mod surface;

pub use config::{EvalConfig, MultiplicityPolicy};
pub use curve::{BSplineCurve, Curve, CurveBuilder, NurbsCurve};
pub use grid::{neighbor_structure, quad_reorder, zigzag, ControlGrid, NeighborConfig, NeighborRecord};
pub use surface::{
    BSplineSurface, NurbsSurface, Surface, SurfaceBuilder, SurfaceInsertion, SurfaceNormal,
};
