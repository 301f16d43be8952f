//! Long-form names for the knot vector helpers.

use knotwork_core::Result;

use crate::nurbs::knot;

/// Same as [`knot::generate`].
pub fn generate_knot_vector(degree: usize, num_ctrlpts: usize, clamped: bool) -> Result<Vec<f64>> {
    knot::generate(degree, num_ctrlpts, clamped)
}

/// Same as [`knot::check`].
pub fn check_knot_vector(knots: &[f64], degree: usize, num_ctrlpts: usize) -> bool {
    knot::check(knots, degree, num_ctrlpts)
}

/// Same as [`knot::normalize`].
pub fn normalize_knot_vector(knots: &[f64]) -> Result<Vec<f64>> {
    knot::normalize(knots)
}
