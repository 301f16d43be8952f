//! B-spline and NURBS curve implementations.

use knotwork_core::traits::{BoundingBox, Validate};
use knotwork_core::{KnotworkError, Result};
use knotwork_math::{bounding_box, ControlPoint};
use serde::{Deserialize, Serialize};

use super::{Curve, CurveBuilder};
use crate::config::EvalConfig;
use crate::nurbs::insert::{insert_curve_knot, Homogeneous};
use crate::nurbs::{deboor, knot};

/// Cross-field checks shared by both curve kinds.
pub(crate) fn check_curve(
    degree: usize,
    knots: &[f64],
    num_ctrlpts: usize,
    weights: Option<&[f64]>,
    config: &EvalConfig,
) -> Result<()> {
    config.validate()?;
    if num_ctrlpts < degree + 1 {
        return Err(KnotworkError::InvalidParameter(format!(
            "a degree {} curve needs at least {} control points, got {}",
            degree,
            degree + 1,
            num_ctrlpts
        )));
    }
    if !knot::check(knots, degree, num_ctrlpts) {
        return Err(KnotworkError::InvalidParameter(format!(
            "invalid knot vector of length {} for degree {} and {} control points",
            knots.len(),
            degree,
            num_ctrlpts
        )));
    }
    if !knot::has_domain(knots, degree) {
        let (min, max) = knot::domain(knots, degree);
        return Err(KnotworkError::InvalidParameter(format!(
            "knot vector has an empty parameter domain [{}, {}]",
            min, max
        )));
    }
    if let Some(weights) = weights {
        check_weights(weights, num_ctrlpts)?;
    }
    Ok(())
}

pub(crate) fn check_weights(weights: &[f64], num_ctrlpts: usize) -> Result<()> {
    if weights.len() != num_ctrlpts {
        return Err(KnotworkError::InvalidParameter(format!(
            "expected {} weights, got {}",
            num_ctrlpts,
            weights.len()
        )));
    }
    if let Some(w) = weights.iter().find(|w| !(w.is_finite() && **w > 0.0)) {
        return Err(KnotworkError::InvalidParameter(format!(
            "weights must be positive, got {}",
            w
        )));
    }
    Ok(())
}

/// A B-spline curve defined by degree, knot vector, and control points.
///
/// Built through [`CurveBuilder`], which validates every field together.
/// Refinement returns a new curve, so the knot vector and control points are
/// always replaced as a pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BSplineCurve<P> {
    degree: usize,
    knots: Vec<f64>,
    control_points: Vec<P>,
    #[serde(skip)]
    config: EvalConfig,
}

impl<P: ControlPoint> BSplineCurve<P> {
    pub fn builder() -> CurveBuilder<P> {
        CurveBuilder::new()
    }

    /// Build a curve with the default configuration.
    pub fn new(degree: usize, knots: Vec<f64>, control_points: Vec<P>) -> Result<Self> {
        CurveBuilder::new()
            .degree(degree)
            .knotvector(knots)
            .ctrlpts(control_points)
            .build()
    }

    pub(crate) fn from_parts(
        degree: usize,
        knots: Vec<f64>,
        control_points: Vec<P>,
        config: EvalConfig,
    ) -> Self {
        Self {
            degree,
            knots,
            control_points,
            config,
        }
    }

    /// Return a geometrically identical curve with `t` inserted `count` times.
    pub fn insert_knot(&self, t: f64, count: usize) -> Result<Self> {
        let (knots, control_points) = insert_curve_knot(
            self.degree,
            &self.knots,
            &self.control_points,
            t,
            count,
            self.config.multiplicity.max_multiplicity(self.degree),
            self.config.tolerance,
        )?;
        Ok(Self::from_parts(self.degree, knots, control_points, self.config))
    }

    /// The same curve as a NURBS curve with unit weights.
    pub fn to_nurbs(&self) -> NurbsCurve<P> {
        NurbsCurve::from_parts(
            self.degree,
            self.knots.clone(),
            self.control_points.clone(),
            vec![1.0; self.control_points.len()],
            self.config,
        )
    }
}

impl<P: ControlPoint> Curve<P> for BSplineCurve<P> {
    fn degree(&self) -> usize {
        self.degree
    }

    fn knotvector(&self) -> &[f64] {
        &self.knots
    }

    fn ctrlpts(&self) -> &[P] {
        &self.control_points
    }

    fn config(&self) -> &EvalConfig {
        &self.config
    }

    fn evaluate(&self, t: f64) -> Result<P> {
        let basis = self
            .config
            .span_basis(self.degree, &self.knots, self.control_points.len(), t, 0)?;
        Ok(deboor::curve_point(&basis, &self.control_points))
    }

    fn derivatives(&self, t: f64, order: usize) -> Result<Vec<P>> {
        let basis = self
            .config
            .span_basis(self.degree, &self.knots, self.control_points.len(), t, order)?;
        Ok(deboor::curve_derivatives(&basis, &self.control_points, order))
    }
}

impl<P: ControlPoint> Validate for BSplineCurve<P> {
    fn validate(&self) -> Result<()> {
        check_curve(
            self.degree,
            &self.knots,
            self.control_points.len(),
            None,
            &self.config,
        )
    }
}

impl<P: ControlPoint> BoundingBox for BSplineCurve<P> {
    type Point = P;

    fn bounding_box(&self) -> Result<(P, P)> {
        bounding_box(&self.control_points)
    }
}

/// A NURBS (Non-Uniform Rational B-Spline) curve.
///
/// Extends `BSplineCurve` with one positive weight per control point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NurbsCurve<P> {
    degree: usize,
    knots: Vec<f64>,
    control_points: Vec<P>,
    weights: Vec<f64>,
    #[serde(skip)]
    config: EvalConfig,
}

impl<P: ControlPoint> NurbsCurve<P> {
    pub fn builder() -> CurveBuilder<P> {
        CurveBuilder::new()
    }

    /// Build a curve with the default configuration.
    pub fn new(
        degree: usize,
        knots: Vec<f64>,
        control_points: Vec<P>,
        weights: Vec<f64>,
    ) -> Result<Self> {
        CurveBuilder::new()
            .degree(degree)
            .knotvector(knots)
            .ctrlpts(control_points)
            .weights(weights)
            .build_nurbs()
    }

    pub(crate) fn from_parts(
        degree: usize,
        knots: Vec<f64>,
        control_points: Vec<P>,
        weights: Vec<f64>,
        config: EvalConfig,
    ) -> Self {
        Self {
            degree,
            knots,
            control_points,
            weights,
            config,
        }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Return a geometrically identical curve with `t` inserted `count` times.
    ///
    /// Refinement happens on the homogeneous points `(P·w, w)`.
    pub fn insert_knot(&self, t: f64, count: usize) -> Result<Self> {
        let lifted = Homogeneous::lift_all(&self.control_points, &self.weights);
        let (knots, refined) = insert_curve_knot(
            self.degree,
            &self.knots,
            &lifted,
            t,
            count,
            self.config.multiplicity.max_multiplicity(self.degree),
            self.config.tolerance,
        )?;
        let (control_points, weights) = Homogeneous::project_all(refined);
        Ok(Self::from_parts(self.degree, knots, control_points, weights, self.config))
    }
}

impl<P: ControlPoint> Curve<P> for NurbsCurve<P> {
    fn degree(&self) -> usize {
        self.degree
    }

    fn knotvector(&self) -> &[f64] {
        &self.knots
    }

    fn ctrlpts(&self) -> &[P] {
        &self.control_points
    }

    fn config(&self) -> &EvalConfig {
        &self.config
    }

    fn evaluate(&self, t: f64) -> Result<P> {
        let basis = self
            .config
            .span_basis(self.degree, &self.knots, self.control_points.len(), t, 0)?;
        deboor::nurbs_curve_point(&basis, &self.control_points, &self.weights, self.config.tolerance)
    }

    fn derivatives(&self, t: f64, order: usize) -> Result<Vec<P>> {
        let basis = self
            .config
            .span_basis(self.degree, &self.knots, self.control_points.len(), t, order)?;
        deboor::nurbs_curve_derivatives(
            &basis,
            &self.control_points,
            &self.weights,
            order,
            self.config.tolerance,
        )
    }
}

impl<P: ControlPoint> Validate for NurbsCurve<P> {
    fn validate(&self) -> Result<()> {
        check_curve(
            self.degree,
            &self.knots,
            self.control_points.len(),
            Some(&self.weights),
            &self.config,
        )
    }
}

impl<P: ControlPoint> BoundingBox for NurbsCurve<P> {
    type Point = P;

    fn bounding_box(&self) -> Result<(P, P)> {
        bounding_box(&self.control_points)
    }
}
