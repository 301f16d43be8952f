//! B-spline and NURBS surface implementations.

use knotwork_core::traits::{BoundingBox, Validate};
use knotwork_core::{KnotworkError, Result};
use knotwork_math::ControlPoint;
use serde::{Deserialize, Serialize};

use super::{Surface, SurfaceBuilder, SurfaceInsertion};
use crate::config::EvalConfig;
use crate::curve::check_weights;
use crate::grid::ControlGrid;
use crate::nurbs::insert::{insert_surface_knot_u, insert_surface_knot_v, Homogeneous};
use crate::nurbs::{deboor, knot, Blend};

/// Cross-field checks shared by both surface kinds.
pub(crate) fn check_surface<T>(
    degrees: (usize, usize),
    knots_u: &[f64],
    knots_v: &[f64],
    grid: &ControlGrid<T>,
    config: &EvalConfig,
) -> Result<()> {
    config.validate()?;
    grid.validate()?;
    let directions = [
        ("u", degrees.0, knots_u, grid.size_u()),
        ("v", degrees.1, knots_v, grid.size_v()),
    ];
    for (dir, degree, knots, count) in directions {
        if count < degree + 1 {
            return Err(KnotworkError::InvalidParameter(format!(
                "a degree {} {}-direction needs at least {} control points, got {}",
                degree,
                dir,
                degree + 1,
                count
            )));
        }
        if !knot::check(knots, degree, count) {
            return Err(KnotworkError::InvalidParameter(format!(
                "invalid {} knot vector of length {} for degree {} and {} control points",
                dir,
                knots.len(),
                degree,
                count
            )));
        }
        if !knot::has_domain(knots, degree) {
            let (min, max) = knot::domain(knots, degree);
            return Err(KnotworkError::InvalidParameter(format!(
                "{} knot vector has an empty parameter domain [{}, {}]",
                dir, min, max
            )));
        }
    }
    Ok(())
}

/// Apply a [`SurfaceInsertion`] to any blendable grid, u-direction first.
fn refine<T: Blend>(
    degrees: (usize, usize),
    knots: (&[f64], &[f64]),
    grid: &ControlGrid<T>,
    request: SurfaceInsertion,
    config: &EvalConfig,
) -> Result<(Vec<f64>, Vec<f64>, ControlGrid<T>)> {
    let (degree_u, degree_v) = degrees;
    let tol = config.tolerance;
    let mut knots_u = knots.0.to_vec();
    let mut knots_v = knots.1.to_vec();
    let mut grid = grid.clone();

    if let Some(u) = request.param_u {
        let max = config.multiplicity.max_multiplicity(degree_u);
        let (k, g) = insert_surface_knot_u(degree_u, &knots_u, &grid, u, request.mult_u, max, tol)?;
        knots_u = k;
        grid = g;
    }
    if let Some(v) = request.param_v {
        let max = config.multiplicity.max_multiplicity(degree_v);
        let (k, g) = insert_surface_knot_v(degree_v, &knots_v, &grid, v, request.mult_v, max, tol)?;
        knots_v = k;
        grid = g;
    }
    Ok((knots_u, knots_v, grid))
}

/// A B-spline surface defined by degrees, knot vectors, and a control grid.
///
/// `ctrlpts()[(i, j)]` is the control point at row `i` (u-direction) and
/// column `j` (v-direction).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BSplineSurface<P> {
    degree_u: usize,
    degree_v: usize,
    knots_u: Vec<f64>,
    knots_v: Vec<f64>,
    control_points: ControlGrid<P>,
    #[serde(skip)]
    config: EvalConfig,
}

impl<P: ControlPoint> BSplineSurface<P> {
    pub fn builder() -> SurfaceBuilder<P> {
        SurfaceBuilder::new()
    }

    /// Build a surface with the default configuration.
    pub fn new(
        degree_u: usize,
        degree_v: usize,
        knots_u: Vec<f64>,
        knots_v: Vec<f64>,
        control_points: ControlGrid<P>,
    ) -> Result<Self> {
        SurfaceBuilder::new()
            .degree_u(degree_u)
            .degree_v(degree_v)
            .knotvector_u(knots_u)
            .knotvector_v(knots_v)
            .ctrlpts(control_points)
            .build()
    }

    pub(crate) fn from_parts(
        degrees: (usize, usize),
        knots_u: Vec<f64>,
        knots_v: Vec<f64>,
        control_points: ControlGrid<P>,
        config: EvalConfig,
    ) -> Self {
        Self {
            degree_u: degrees.0,
            degree_v: degrees.1,
            knots_u,
            knots_v,
            control_points,
            config,
        }
    }

    /// Return a geometrically identical surface with the requested knots inserted.
    pub fn insert_knot(&self, request: SurfaceInsertion) -> Result<Self> {
        let (knots_u, knots_v, grid) = refine(
            (self.degree_u, self.degree_v),
            (&self.knots_u, &self.knots_v),
            &self.control_points,
            request,
            &self.config,
        )?;
        Ok(Self::from_parts(
            (self.degree_u, self.degree_v),
            knots_u,
            knots_v,
            grid,
            self.config,
        ))
    }

    /// The same surface as a NURBS surface with unit weights.
    pub fn to_nurbs(&self) -> Result<NurbsSurface<P>> {
        let weights = ControlGrid::new(
            vec![1.0; self.control_points.points().len()],
            self.control_points.size_u(),
            self.control_points.size_v(),
        )?;
        Ok(NurbsSurface::from_parts(
            (self.degree_u, self.degree_v),
            self.knots_u.clone(),
            self.knots_v.clone(),
            self.control_points.clone(),
            weights,
            self.config,
        ))
    }
}

impl<P: ControlPoint> Surface<P> for BSplineSurface<P> {
    fn degree_u(&self) -> usize {
        self.degree_u
    }

    fn degree_v(&self) -> usize {
        self.degree_v
    }

    fn knotvector_u(&self) -> &[f64] {
        &self.knots_u
    }

    fn knotvector_v(&self) -> &[f64] {
        &self.knots_v
    }

    fn ctrlpts(&self) -> &ControlGrid<P> {
        &self.control_points
    }

    fn config(&self) -> &EvalConfig {
        &self.config
    }

    fn evaluate(&self, u: f64, v: f64) -> Result<P> {
        let grid = &self.control_points;
        let bu = self.config.span_basis(self.degree_u, &self.knots_u, grid.size_u(), u, 0)?;
        let bv = self.config.span_basis(self.degree_v, &self.knots_v, grid.size_v(), v, 0)?;
        Ok(deboor::surface_point(&bu, &bv, grid))
    }

    fn derivatives(&self, u: f64, v: f64, order: usize) -> Result<Vec<Vec<P>>> {
        let grid = &self.control_points;
        let bu = self.config.span_basis(self.degree_u, &self.knots_u, grid.size_u(), u, order)?;
        let bv = self.config.span_basis(self.degree_v, &self.knots_v, grid.size_v(), v, order)?;
        Ok(deboor::surface_derivatives(&bu, &bv, grid, order))
    }
}

impl<P: ControlPoint> Validate for BSplineSurface<P> {
    fn validate(&self) -> Result<()> {
        check_surface(
            (self.degree_u, self.degree_v),
            &self.knots_u,
            &self.knots_v,
            &self.control_points,
            &self.config,
        )
    }
}

impl<P: ControlPoint> BoundingBox for BSplineSurface<P> {
    type Point = P;

    fn bounding_box(&self) -> Result<(P, P)> {
        self.control_points.bounding_box()
    }
}

/// A NURBS surface (rational B-spline surface).
///
/// Extends `BSplineSurface` with a grid of weights shaped like the control grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NurbsSurface<P> {
    degree_u: usize,
    degree_v: usize,
    knots_u: Vec<f64>,
    knots_v: Vec<f64>,
    control_points: ControlGrid<P>,
    weights: ControlGrid<f64>,
    #[serde(skip)]
    config: EvalConfig,
}

impl<P: ControlPoint> NurbsSurface<P> {
    pub fn builder() -> SurfaceBuilder<P> {
        SurfaceBuilder::new()
    }

    /// Build a surface with the default configuration.
    pub fn new(
        degree_u: usize,
        degree_v: usize,
        knots_u: Vec<f64>,
        knots_v: Vec<f64>,
        control_points: ControlGrid<P>,
        weights: Vec<f64>,
    ) -> Result<Self> {
        SurfaceBuilder::new()
            .degree_u(degree_u)
            .degree_v(degree_v)
            .knotvector_u(knots_u)
            .knotvector_v(knots_v)
            .ctrlpts(control_points)
            .weights(weights)
            .build_nurbs()
    }

    pub(crate) fn from_parts(
        degrees: (usize, usize),
        knots_u: Vec<f64>,
        knots_v: Vec<f64>,
        control_points: ControlGrid<P>,
        weights: ControlGrid<f64>,
        config: EvalConfig,
    ) -> Self {
        Self {
            degree_u: degrees.0,
            degree_v: degrees.1,
            knots_u,
            knots_v,
            control_points,
            weights,
            config,
        }
    }

    /// Weights in the control grid's row-major order.
    pub fn weights(&self) -> &[f64] {
        self.weights.points()
    }

    /// Return a geometrically identical surface with the requested knots inserted.
    ///
    /// Refinement happens on the homogeneous points `(P·w, w)`.
    pub fn insert_knot(&self, request: SurfaceInsertion) -> Result<Self> {
        let grid = &self.control_points;
        let lifted = ControlGrid::new(
            Homogeneous::lift_all(grid.points(), self.weights.points()),
            grid.size_u(),
            grid.size_v(),
        )?;
        let (knots_u, knots_v, refined) = refine(
            (self.degree_u, self.degree_v),
            (&self.knots_u, &self.knots_v),
            &lifted,
            request,
            &self.config,
        )?;

        let (size_u, size_v) = (refined.size_u(), refined.size_v());
        let (points, weights) = Homogeneous::project_all(refined.into_points());
        Ok(Self::from_parts(
            (self.degree_u, self.degree_v),
            knots_u,
            knots_v,
            ControlGrid::new(points, size_u, size_v)?,
            ControlGrid::new(weights, size_u, size_v)?,
            self.config,
        ))
    }
}

impl<P: ControlPoint> Surface<P> for NurbsSurface<P> {
    fn degree_u(&self) -> usize {
        self.degree_u
    }

    fn degree_v(&self) -> usize {
        self.degree_v
    }

    fn knotvector_u(&self) -> &[f64] {
        &self.knots_u
    }

    fn knotvector_v(&self) -> &[f64] {
        &self.knots_v
    }

    fn ctrlpts(&self) -> &ControlGrid<P> {
        &self.control_points
    }

    fn config(&self) -> &EvalConfig {
        &self.config
    }

    fn evaluate(&self, u: f64, v: f64) -> Result<P> {
        let grid = &self.control_points;
        let bu = self.config.span_basis(self.degree_u, &self.knots_u, grid.size_u(), u, 0)?;
        let bv = self.config.span_basis(self.degree_v, &self.knots_v, grid.size_v(), v, 0)?;
        deboor::nurbs_surface_point(&bu, &bv, grid, self.weights.points(), self.config.tolerance)
    }

    fn derivatives(&self, u: f64, v: f64, order: usize) -> Result<Vec<Vec<P>>> {
        let grid = &self.control_points;
        let bu = self.config.span_basis(self.degree_u, &self.knots_u, grid.size_u(), u, order)?;
        let bv = self.config.span_basis(self.degree_v, &self.knots_v, grid.size_v(), v, order)?;
        deboor::nurbs_surface_derivatives(
            &bu,
            &bv,
            grid,
            self.weights.points(),
            order,
            self.config.tolerance,
        )
    }
}

impl<P: ControlPoint> Validate for NurbsSurface<P> {
    fn validate(&self) -> Result<()> {
        check_surface(
            (self.degree_u, self.degree_v),
            &self.knots_u,
            &self.knots_v,
            &self.control_points,
            &self.config,
        )?;
        if (self.weights.size_u(), self.weights.size_v())
            != (self.control_points.size_u(), self.control_points.size_v())
        {
            return Err(KnotworkError::InvalidParameter(
                "weight grid does not match the control grid".into(),
            ));
        }
        check_weights(self.weights.points(), self.control_points.points().len())
    }
}

impl<P: ControlPoint> BoundingBox for NurbsSurface<P> {
    type Point = P;

    fn bounding_box(&self) -> Result<(P, P)> {
        self.control_points.bounding_box()
    }
}
