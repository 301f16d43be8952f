//! Evaluation options shared by curves and surfaces.

use knotwork_core::{KnotworkError, Result, Tolerance};

use crate::nurbs::basis::{clamp_param, find_span_binsearch, FindSpanFn};
use crate::nurbs::deboor::SpanBasis;
use crate::nurbs::knot::{domain, linspace};

/// How far knot insertion may raise the multiplicity of a knot value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MultiplicityPolicy {
    /// Up to and including `degree + 1`; a full-multiplicity interior knot
    /// splits the spline into independent Bezier-like pieces.
    #[default]
    Discontinuous,
    /// Up to `degree`, keeping the spline at least C0 by construction.
    Continuous,
}

impl MultiplicityPolicy {
    pub fn max_multiplicity(self, degree: usize) -> usize {
        match self {
            MultiplicityPolicy::Discontinuous => degree + 1,
            MultiplicityPolicy::Continuous => degree,
        }
    }
}

/// Evaluation configuration for curves and surfaces.
#[derive(Debug, Clone, Copy)]
pub struct EvalConfig {
    /// Parameter step used by `sample`, in `(0, 1)`
    pub delta: f64,
    /// Rescale knot vectors to `[0, 1]` at construction
    pub normalize_kv: bool,
    /// Span finder used during evaluation
    pub find_span: FindSpanFn,
    pub tolerance: Tolerance,
    pub multiplicity: MultiplicityPolicy,
}

impl EvalConfig {
    pub const DEFAULT_DELTA: f64 = 0.01;

    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_normalize_kv(mut self, normalize_kv: bool) -> Self {
        self.normalize_kv = normalize_kv;
        self
    }

    pub fn with_find_span(mut self, find_span: FindSpanFn) -> Self {
        self.find_span = find_span;
        self
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_multiplicity(mut self, multiplicity: MultiplicityPolicy) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.delta > 0.0 && self.delta < 1.0) {
            return Err(KnotworkError::InvalidParameter(format!(
                "delta must lie in (0, 1), got {}",
                self.delta
            )));
        }
        Ok(())
    }

    /// Check `t` against the knot domain, locate its span with the configured
    /// finder, and compute the basis (with derivatives when `order > 0`).
    pub fn span_basis(
        &self,
        degree: usize,
        knots: &[f64],
        num_ctrlpts: usize,
        t: f64,
        order: usize,
    ) -> Result<SpanBasis> {
        let t = clamp_param(t, domain(knots, degree), self.tolerance)?;
        let span = (self.find_span)(degree, knots, num_ctrlpts, t);
        Ok(if order == 0 {
            SpanBasis::values(degree, knots, span, t)
        } else {
            SpanBasis::with_derivatives(degree, knots, span, t, order)
        })
    }

    /// Evenly spaced sample parameters over `(min, max)`, both ends included.
    pub fn sample_params(&self, (min, max): (f64, f64)) -> Vec<f64> {
        let divisions = (1.0 / self.delta).round().max(1.0) as usize;
        linspace(min, max, divisions + 1)
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            delta: Self::DEFAULT_DELTA,
            normalize_kv: true,
            find_span: find_span_binsearch,
            tolerance: Tolerance::default(),
            multiplicity: MultiplicityPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nurbs::basis::find_span_linear;

    #[test]
    fn test_defaults() {
        let config = EvalConfig::default();
        assert_eq!(config.delta, 0.01);
        assert!(config.normalize_kv);
        assert_eq!(config.multiplicity, MultiplicityPolicy::Discontinuous);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_delta_bounds() {
        assert!(EvalConfig::default().with_delta(0.0).validate().is_err());
        assert!(EvalConfig::default().with_delta(1.0).validate().is_err());
        assert!(EvalConfig::default().with_delta(f64::NAN).validate().is_err());
        assert!(EvalConfig::default().with_delta(0.25).validate().is_ok());
    }

    #[test]
    fn test_sample_params() {
        let params = EvalConfig::default().with_delta(0.25).sample_params((0.0, 1.0));
        assert_eq!(params, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_policy_limits() {
        assert_eq!(MultiplicityPolicy::Discontinuous.max_multiplicity(3), 4);
        assert_eq!(MultiplicityPolicy::Continuous.max_multiplicity(3), 3);
    }

    #[test]
    fn test_pluggable_span_finder() {
        let config = EvalConfig::default().with_find_span(find_span_linear);
        let knots = [0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0];
        assert_eq!((config.find_span)(2, &knots, 4, 0.75), 3);

        let basis = config.span_basis(2, &knots, 4, 0.75, 1).unwrap();
        assert_eq!(basis.span, 3);
        assert_eq!(basis.ders.len(), 2);
        assert!(config.span_basis(2, &knots, 4, 1.2, 0).is_err());
    }
}
