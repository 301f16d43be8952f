use knotwork_core::{KnotworkError, Result};
use knotwork_math::{points_from_coords, ControlPoint};

use super::bspline::{check_surface, BSplineSurface, NurbsSurface};
use crate::config::EvalConfig;
use crate::curve::check_weights;
use crate::grid::ControlGrid;
use crate::nurbs::knot;

/// Collects surface fields and validates them together on `build`.
///
/// Each direction without a knot vector gets a clamped uniform one.
#[derive(Debug, Clone)]
pub struct SurfaceBuilder<P> {
    degree_u: Option<usize>,
    degree_v: Option<usize>,
    control_points: Option<ControlGrid<P>>,
    knots_u: Option<Vec<f64>>,
    knots_v: Option<Vec<f64>>,
    weights: Option<Vec<f64>>,
    config: EvalConfig,
}

impl<P: ControlPoint> Default for SurfaceBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ControlPoint> SurfaceBuilder<P> {
    pub fn new() -> Self {
        Self {
            degree_u: None,
            degree_v: None,
            control_points: None,
            knots_u: None,
            knots_v: None,
            weights: None,
            config: EvalConfig::default(),
        }
    }

    pub fn degree_u(mut self, degree: usize) -> Self {
        self.degree_u = Some(degree);
        self
    }

    pub fn degree_v(mut self, degree: usize) -> Self {
        self.degree_v = Some(degree);
        self
    }

    pub fn ctrlpts(mut self, grid: ControlGrid<P>) -> Self {
        self.control_points = Some(grid);
        self
    }

    /// Set control points from a flat row-major list (v the fast index).
    pub fn ctrlpts_flat(self, points: Vec<P>, size_u: usize, size_v: usize) -> Result<Self> {
        Ok(self.ctrlpts(ControlGrid::new(points, size_u, size_v)?))
    }

    /// Set control points from flat row-major coordinate rows.
    pub fn ctrlpts_from_coords<T: AsRef<[f64]>>(
        self,
        rows: &[T],
        size_u: usize,
        size_v: usize,
    ) -> Result<Self> {
        self.ctrlpts_flat(points_from_coords(rows)?, size_u, size_v)
    }

    pub fn knotvector_u(mut self, knots: Vec<f64>) -> Self {
        self.knots_u = Some(knots);
        self
    }

    pub fn knotvector_v(mut self, knots: Vec<f64>) -> Self {
        self.knots_v = Some(knots);
        self
    }

    /// Weights in the control grid's row-major order.
    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    #[allow(clippy::type_complexity)]
    fn resolve(&self) -> Result<((usize, usize), Vec<f64>, Vec<f64>, ControlGrid<P>)> {
        self.config.validate()?;
        let degree_u = self
            .degree_u
            .ok_or_else(|| KnotworkError::InvalidParameter("degree_u is not set".into()))?;
        let degree_v = self
            .degree_v
            .ok_or_else(|| KnotworkError::InvalidParameter("degree_v is not set".into()))?;
        let grid = self
            .control_points
            .clone()
            .ok_or_else(|| KnotworkError::InvalidParameter("control points are not set".into()))?;

        let knots_u = knots_or_generated(&self.knots_u, degree_u, grid.size_u(), "u")?;
        let knots_v = knots_or_generated(&self.knots_v, degree_v, grid.size_v(), "v")?;
        check_surface((degree_u, degree_v), &knots_u, &knots_v, &grid, &self.config)?;

        let (knots_u, knots_v) = if self.config.normalize_kv {
            (knot::normalize(&knots_u)?, knot::normalize(&knots_v)?)
        } else {
            (knots_u, knots_v)
        };
        Ok(((degree_u, degree_v), knots_u, knots_v, grid))
    }

    /// Build a non-rational surface. Weights, if set, must be all ones.
    pub fn build(self) -> Result<BSplineSurface<P>> {
        let (degrees, knots_u, knots_v, grid) = self.resolve()?;
        if let Some(weights) = &self.weights {
            check_weights(weights, grid.points().len())?;
            if weights.iter().any(|&w| w != 1.0) {
                return Err(KnotworkError::InvalidParameter(
                    "non-unit weights need build_nurbs".into(),
                ));
            }
        }
        Ok(BSplineSurface::from_parts(degrees, knots_u, knots_v, grid, self.config))
    }

    /// Build a rational surface. Missing weights default to one.
    pub fn build_nurbs(self) -> Result<NurbsSurface<P>> {
        let (degrees, knots_u, knots_v, grid) = self.resolve()?;
        let weights = match &self.weights {
            Some(weights) => {
                check_weights(weights, grid.points().len())?;
                weights.clone()
            }
            None => vec![1.0; grid.points().len()],
        };
        let weights = ControlGrid::new(weights, grid.size_u(), grid.size_v())?;
        Ok(NurbsSurface::from_parts(
            degrees,
            knots_u,
            knots_v,
            grid,
            weights,
            self.config,
        ))
    }
}

fn knots_or_generated(
    knots: &Option<Vec<f64>>,
    degree: usize,
    count: usize,
    dir: &str,
) -> Result<Vec<f64>> {
    match knots {
        Some(knots) => Ok(knots.clone()),
        None => {
            log::debug!(
                "generating clamped {} knot vector for degree {} and {} control points",
                dir,
                degree,
                count
            );
            knot::generate(degree, count, true)
        }
    }
}
