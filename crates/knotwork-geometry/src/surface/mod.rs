//! Surface traits and implementations.

mod bspline;
mod builder;

use knotwork_core::Result;
use knotwork_math::{ControlPoint, Point3, Vector3};
use rayon::prelude::*;

use crate::config::EvalConfig;
use crate::grid::ControlGrid;
use crate::nurbs::knot;

pub use bspline::{BSplineSurface, NurbsSurface};
pub use builder::SurfaceBuilder;

/// Trait for tensor-product B-spline surfaces over 2D or 3D control points.
pub trait Surface<P: ControlPoint>: Send + Sync {
    fn degree_u(&self) -> usize;

    fn degree_v(&self) -> usize;

    fn knotvector_u(&self) -> &[f64];

    fn knotvector_v(&self) -> &[f64];

    fn ctrlpts(&self) -> &ControlGrid<P>;

    fn config(&self) -> &EvalConfig;

    fn dimension(&self) -> usize {
        P::DIMENSION
    }

    /// Return the u-parameter domain `(u_min, u_max)`.
    fn domain_u(&self) -> (f64, f64) {
        knot::domain(self.knotvector_u(), self.degree_u())
    }

    /// Return the v-parameter domain `(v_min, v_max)`.
    fn domain_v(&self) -> (f64, f64) {
        knot::domain(self.knotvector_v(), self.degree_v())
    }

    /// Evaluate the surface at parameters `(u, v)`.
    fn evaluate(&self, u: f64, v: f64) -> Result<P>;

    /// Partial derivatives at `(u, v)`: `skl[k][l]` is taken `k` times in u
    /// and `l` times in v, for `k + l <= order`.
    fn derivatives(&self, u: f64, v: f64, order: usize) -> Result<Vec<Vec<P>>>;

    /// Evaluate every `(u, v)` pair in parallel; results keep the input order.
    fn evaluate_list(&self, params: &[(f64, f64)]) -> Result<Vec<P>> {
        params.par_iter().map(|&(u, v)| self.evaluate(u, v)).collect()
    }

    /// Evaluate a `delta`-spaced parameter grid, row-major with v fast.
    fn sample(&self) -> Result<Vec<P>> {
        let us = self.config().sample_params(self.domain_u());
        let vs = self.config().sample_params(self.domain_v());
        let params: Vec<(f64, f64)> = us
            .iter()
            .flat_map(|&u| vs.iter().map(move |&v| (u, v)))
            .collect();
        self.evaluate_list(&params)
    }
}

/// Unit normals for surfaces in 3D space.
pub trait SurfaceNormal: Surface<Point3> {
    /// Normalized `S_u × S_v`; `+Z` where the partials are parallel.
    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        let skl = self.derivatives(u, v, 1)?;
        let n = skl[1][0].cross(skl[0][1]);
        let len = n.length();
        if len < 1e-15 {
            Ok(Vector3::Z)
        } else {
            Ok(n / len)
        }
    }
}

impl<S: Surface<Point3> + ?Sized> SurfaceNormal for S {}

/// Knot insertion request for a surface.
///
/// The u-direction is refined first, then v. A direction without a parameter
/// or with multiplicity 0 is left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SurfaceInsertion {
    pub param_u: Option<f64>,
    pub param_v: Option<f64>,
    pub mult_u: usize,
    pub mult_v: usize,
}

impl SurfaceInsertion {
    pub fn u(param: f64, multiplicity: usize) -> Self {
        Self {
            param_u: Some(param),
            mult_u: multiplicity,
            ..Self::default()
        }
    }

    pub fn v(param: f64, multiplicity: usize) -> Self {
        Self {
            param_v: Some(param),
            mult_v: multiplicity,
            ..Self::default()
        }
    }

    pub fn uv(u: f64, v: f64, mult_u: usize, mult_v: usize) -> Self {
        Self {
            param_u: Some(u),
            param_v: Some(v),
            mult_u,
            mult_v,
        }
    }
}
