//! Curve traits and implementations.

mod bspline;
mod builder;

use knotwork_core::Result;
use knotwork_math::ControlPoint;
use rayon::prelude::*;

use crate::config::EvalConfig;
use crate::nurbs::knot;

pub(crate) use bspline::check_weights;
pub use bspline::{BSplineCurve, NurbsCurve};
pub use builder::CurveBuilder;

/// Trait for parametric B-spline curves over 2D or 3D control points.
pub trait Curve<P: ControlPoint>: Send + Sync {
    fn degree(&self) -> usize;

    fn knotvector(&self) -> &[f64];

    fn ctrlpts(&self) -> &[P];

    fn config(&self) -> &EvalConfig;

    fn dimension(&self) -> usize {
        P::DIMENSION
    }

    /// Return the parameter domain `(t_min, t_max)`.
    fn domain(&self) -> (f64, f64) {
        knot::domain(self.knotvector(), self.degree())
    }

    /// Evaluate the curve at parameter `t`.
    fn evaluate(&self, t: f64) -> Result<P>;

    /// The point and its derivatives at `t`: `ders[k]` is the k-th derivative.
    fn derivatives(&self, t: f64, order: usize) -> Result<Vec<P>>;

    /// Evaluate the tangent vector (first derivative) at parameter `t`.
    fn tangent(&self, t: f64) -> Result<P> {
        Ok(self.derivatives(t, 1)?[1])
    }

    /// Evaluate every parameter in parallel; results keep the order of `params`.
    fn evaluate_list(&self, params: &[f64]) -> Result<Vec<P>> {
        params.par_iter().map(|&t| self.evaluate(t)).collect()
    }

    /// Evaluate the whole domain at the configured `delta` spacing.
    fn sample(&self) -> Result<Vec<P>> {
        let params = self.config().sample_params(self.domain());
        self.evaluate_list(&params)
    }
}
