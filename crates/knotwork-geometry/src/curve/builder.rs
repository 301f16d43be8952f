use knotwork_core::{KnotworkError, Result};
use knotwork_math::{points_from_coords, ControlPoint};

use super::bspline::{check_curve, check_weights, BSplineCurve, NurbsCurve};
use crate::config::EvalConfig;
use crate::nurbs::knot;

/// Collects curve fields and validates them together on `build`.
///
/// When no knot vector is given a clamped uniform one is generated.
#[derive(Debug, Clone)]
pub struct CurveBuilder<P> {
    degree: Option<usize>,
    control_points: Option<Vec<P>>,
    knots: Option<Vec<f64>>,
    weights: Option<Vec<f64>>,
    config: EvalConfig,
}

impl<P: ControlPoint> Default for CurveBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ControlPoint> CurveBuilder<P> {
    pub fn new() -> Self {
        Self {
            degree: None,
            control_points: None,
            knots: None,
            weights: None,
            config: EvalConfig::default(),
        }
    }

    pub fn degree(mut self, degree: usize) -> Self {
        self.degree = Some(degree);
        self
    }

    pub fn ctrlpts(mut self, control_points: Vec<P>) -> Self {
        self.control_points = Some(control_points);
        self
    }

    /// Set control points from raw coordinate rows of dimension `P::DIMENSION`.
    pub fn ctrlpts_from_coords<T: AsRef<[f64]>>(mut self, rows: &[T]) -> Result<Self> {
        self.control_points = Some(points_from_coords(rows)?);
        Ok(self)
    }

    pub fn knotvector(mut self, knots: Vec<f64>) -> Self {
        self.knots = Some(knots);
        self
    }

    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    /// Check the fields and resolve the final knot vector.
    fn resolve(&self) -> Result<(usize, Vec<P>, Vec<f64>)> {
        self.config.validate()?;
        let degree = self
            .degree
            .ok_or_else(|| KnotworkError::InvalidParameter("degree is not set".into()))?;
        let control_points = self
            .control_points
            .clone()
            .ok_or_else(|| KnotworkError::InvalidParameter("control points are not set".into()))?;
        let n = control_points.len();

        let knots = match &self.knots {
            Some(knots) => knots.clone(),
            None => {
                log::debug!(
                    "generating clamped knot vector for degree {} and {} control points",
                    degree,
                    n
                );
                knot::generate(degree, n, true)?
            }
        };
        check_curve(degree, &knots, n, None, &self.config)?;

        let knots = if self.config.normalize_kv {
            knot::normalize(&knots)?
        } else {
            knots
        };
        Ok((degree, control_points, knots))
    }

    /// Build a non-rational curve. Weights, if set, must be all ones.
    pub fn build(self) -> Result<BSplineCurve<P>> {
        let (degree, control_points, knots) = self.resolve()?;
        if let Some(weights) = &self.weights {
            check_weights(weights, control_points.len())?;
            if weights.iter().any(|&w| w != 1.0) {
                return Err(KnotworkError::InvalidParameter(
                    "non-unit weights need build_nurbs".into(),
                ));
            }
        }
        Ok(BSplineCurve::from_parts(degree, knots, control_points, self.config))
    }

    /// Build a rational curve. Missing weights default to one.
    pub fn build_nurbs(self) -> Result<NurbsCurve<P>> {
        let (degree, control_points, knots) = self.resolve()?;
        let weights = match &self.weights {
            Some(weights) => {
                check_weights(weights, control_points.len())?;
                weights.clone()
            }
            None => vec![1.0; control_points.len()],
        };
        Ok(NurbsCurve::from_parts(
            degree,
            knots,
            control_points,
            weights,
            self.config,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::Curve;
    use knotwork_math::{Point2, Point3};

    fn square() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
        ]
    }

    #[test]
    fn test_generated_knot_vector() {
        let curve = CurveBuilder::new().degree(2).ctrlpts(square()).build().unwrap();
        assert_eq!(curve.knotvector(), &[0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_missing_fields() {
        assert!(CurveBuilder::<Point2>::new().ctrlpts(square()).build().is_err());
        assert!(CurveBuilder::<Point2>::new().degree(2).build().is_err());
    }

    #[test]
    fn test_too_few_points() {
        let err = CurveBuilder::new()
            .degree(3)
            .ctrlpts(square()[..3].to_vec())
            .build()
            .unwrap_err();
        assert!(matches!(err, KnotworkError::InvalidParameter(_)));
    }

    #[test]
    fn test_bad_knot_vector() {
        // Wrong length
        assert!(CurveBuilder::new()
            .degree(2)
            .ctrlpts(square())
            .knotvector(vec![0.0, 0.0, 1.0, 1.0])
            .build()
            .is_err());
        // Decreasing
        assert!(CurveBuilder::new()
            .degree(2)
            .ctrlpts(square())
            .knotvector(vec![0.0, 0.0, 0.0, 0.7, 0.5, 1.0, 1.0])
            .build()
            .is_err());
    }

    #[test]
    fn test_empty_domain_rejected() {
        let pts = vec![Point2::new(3.0, 4.0), Point2::new(5.0, 6.0)];
        let err = CurveBuilder::new()
            .degree(1)
            .ctrlpts(pts.clone())
            .knotvector(vec![0.0, 0.5, 0.5, 1.0])
            .build()
            .unwrap_err();
        assert!(matches!(err, KnotworkError::InvalidParameter(_)));

        assert!(CurveBuilder::new()
            .degree(1)
            .ctrlpts(pts.clone())
            .knotvector(vec![0.0, 0.5, 0.5, 1.0])
            .build_nurbs()
            .is_err());
        // Same check with normalization off
        assert!(CurveBuilder::new()
            .degree(1)
            .ctrlpts(pts)
            .knotvector(vec![2.0, 3.0, 3.0, 4.0])
            .config(EvalConfig::default().with_normalize_kv(false))
            .build()
            .is_err());
    }

    #[test]
    fn test_normalization_toggle() {
        let knots = vec![0.0, 0.0, 0.0, 2.0, 4.0, 4.0, 4.0];
        let normalized = CurveBuilder::new()
            .degree(2)
            .ctrlpts(square())
            .knotvector(knots.clone())
            .build()
            .unwrap();
        assert_eq!(normalized.domain(), (0.0, 1.0));

        let raw = CurveBuilder::new()
            .degree(2)
            .ctrlpts(square())
            .knotvector(knots.clone())
            .config(EvalConfig::default().with_normalize_kv(false))
            .build()
            .unwrap();
        assert_eq!(raw.knotvector(), knots.as_slice());
        assert_eq!(raw.domain(), (0.0, 4.0));
        assert!(raw.evaluate(3.0).is_ok());
    }

    #[test]
    fn test_invalid_config() {
        assert!(CurveBuilder::new()
            .degree(2)
            .ctrlpts(square())
            .config(EvalConfig::default().with_delta(2.0))
            .build()
            .is_err());
    }

    #[test]
    fn test_weights() {
        let builder = CurveBuilder::new().degree(2).ctrlpts(square());
        assert!(builder.clone().weights(vec![1.0; 4]).build().is_ok());
        assert!(builder.clone().weights(vec![1.0, 2.0, 1.0, 1.0]).build().is_err());
        assert!(builder.clone().weights(vec![1.0, -2.0, 1.0, 1.0]).build_nurbs().is_err());
        assert!(builder.clone().weights(vec![1.0; 3]).build_nurbs().is_err());

        let nurbs = builder.build_nurbs().unwrap();
        assert_eq!(nurbs.weights(), &[1.0; 4]);
    }

    #[test]
    fn test_from_coords() {
        let rows = vec![[0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [2.0, 0.0, 1.0]];
        let curve = CurveBuilder::<Point3>::new()
            .degree(1)
            .ctrlpts_from_coords(&rows)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(curve.dimension(), 3);
        assert_eq!(curve.ctrlpts()[2], Point3::new(2.0, 0.0, 1.0));

        assert!(CurveBuilder::<Point2>::new().ctrlpts_from_coords(&rows).is_err());
    }
}
