//! Knot insertion (Boehm's algorithm) for curves and surface grids.

use std::ops::{Add, Mul};

use knotwork_core::{KnotworkError, Result, Tolerance};
use knotwork_math::ControlPoint;

use super::basis::clamp_param;
use super::knot::{domain, multiplicity};
use super::Blend;
use crate::grid::ControlGrid;

/// A control point lifted to homogeneous space: `(P·w, w)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homogeneous<P> {
    pub weighted: P,
    pub weight: f64,
}

impl<P: ControlPoint> Homogeneous<P> {
    pub fn lift(point: P, weight: f64) -> Self {
        Self {
            weighted: point * weight,
            weight,
        }
    }

    pub fn project(self) -> P {
        self.weighted / self.weight
    }

    pub fn lift_all(points: &[P], weights: &[f64]) -> Vec<Self> {
        points
            .iter()
            .zip(weights)
            .map(|(&p, &w)| Self::lift(p, w))
            .collect()
    }

    pub fn project_all(lifted: Vec<Self>) -> (Vec<P>, Vec<f64>) {
        lifted.into_iter().map(|h| (h.project(), h.weight)).unzip()
    }
}

impl<P: ControlPoint> Add for Homogeneous<P> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            weighted: self.weighted + rhs.weighted,
            weight: self.weight + rhs.weight,
        }
    }
}

impl<P: ControlPoint> Mul<f64> for Homogeneous<P> {
    type Output = Self;

    fn mul(self, s: f64) -> Self {
        Self {
            weighted: self.weighted * s,
            weight: self.weight * s,
        }
    }
}

/// A single knot insertion request, validated against one knot vector.
#[derive(Debug, Clone, Copy)]
struct Insertion {
    knot: f64,
    span: usize,
    existing: usize,
}

fn plan(
    degree: usize,
    knots: &[f64],
    t: f64,
    count: usize,
    max_multiplicity: usize,
    tol: Tolerance,
) -> Result<Insertion> {
    let t = clamp_param(t, domain(knots, degree), tol)?;
    // Reuse the stored value of a knot that is already present
    let knot = knots
        .iter()
        .copied()
        .find(|&k| tol.knot_eq(k, t))
        .unwrap_or(t);

    let existing = multiplicity(knots, knot, tol.knot);
    if existing + count > max_multiplicity {
        return Err(KnotworkError::MultiplicityExceeded {
            knot,
            requested: existing + count,
            max: max_multiplicity,
        });
    }

    // Last index with knots[span] <= knot
    let span = knots.partition_point(|&k| k <= knot) - 1;
    Ok(Insertion {
        knot,
        span,
        existing,
    })
}

/// Insert the planned knot once, blending the points in the affected window.
fn insert_once<T: Blend>(degree: usize, knots: &[f64], points: &[T], ins: Insertion) -> (Vec<f64>, Vec<T>) {
    let (p, k, s, u) = (degree, ins.span, ins.existing, ins.knot);

    let mut new_points = Vec::with_capacity(points.len() + 1);
    new_points.extend_from_slice(&points[..=k - p]);
    for i in (k - p + 1)..=(k - s) {
        let alpha = (u - knots[i]) / (knots[i + p] - knots[i]);
        new_points.push(points[i] * alpha + points[i - 1] * (1.0 - alpha));
    }
    new_points.extend_from_slice(&points[k - s..]);

    let mut new_knots = Vec::with_capacity(knots.len() + 1);
    new_knots.extend_from_slice(&knots[..=k]);
    new_knots.push(u);
    new_knots.extend_from_slice(&knots[k + 1..]);

    (new_knots, new_points)
}

/// Insert `t` into a curve's knot vector `count` times.
///
/// Returns the refined knot vector and control points. The curve they
/// describe is the same as the input. Fails with `OutOfDomain` when `t` is
/// outside the knot domain and with `MultiplicityExceeded` when the knot would
/// end up repeated more than `max_multiplicity` times.
pub fn insert_curve_knot<T: Blend>(
    degree: usize,
    knots: &[f64],
    points: &[T],
    t: f64,
    count: usize,
    max_multiplicity: usize,
    tol: Tolerance,
) -> Result<(Vec<f64>, Vec<T>)> {
    let mut ins = plan(degree, knots, t, count, max_multiplicity, tol)?;
    log::debug!(
        "inserting knot {} x{} (multiplicity {} -> {})",
        ins.knot,
        count,
        ins.existing,
        ins.existing + count
    );

    let mut knots = knots.to_vec();
    let mut points = points.to_vec();
    for _ in 0..count {
        let (k, p) = insert_once(degree, &knots, &points, ins);
        knots = k;
        points = p;
        ins.span += 1;
        ins.existing += 1;
    }
    Ok((knots, points))
}

/// Insert `u` into the u knot vector of a surface grid, refining every column.
pub fn insert_surface_knot_u<T: Blend>(
    degree_u: usize,
    knots_u: &[f64],
    grid: &ControlGrid<T>,
    u: f64,
    count: usize,
    max_multiplicity: usize,
    tol: Tolerance,
) -> Result<(Vec<f64>, ControlGrid<T>)> {
    let mut new_knots = knots_u.to_vec();
    let mut columns = Vec::with_capacity(grid.size_v());
    for j in 0..grid.size_v() {
        let (knots, column) =
            insert_curve_knot(degree_u, knots_u, &grid.column(j), u, count, max_multiplicity, tol)?;
        new_knots = knots;
        columns.push(column);
    }
    Ok((new_knots, ControlGrid::from_columns(columns)?))
}

/// Insert `v` into the v knot vector of a surface grid, refining every row.
pub fn insert_surface_knot_v<T: Blend>(
    degree_v: usize,
    knots_v: &[f64],
    grid: &ControlGrid<T>,
    v: f64,
    count: usize,
    max_multiplicity: usize,
    tol: Tolerance,
) -> Result<(Vec<f64>, ControlGrid<T>)> {
    let mut new_knots = knots_v.to_vec();
    let mut rows = Vec::with_capacity(grid.size_u());
    for i in 0..grid.size_u() {
        let (knots, row) =
            insert_curve_knot(degree_v, knots_v, grid.row(i), v, count, max_multiplicity, tol)?;
        new_knots = knots;
        rows.push(row);
    }
    Ok((new_knots, ControlGrid::from_rows(rows)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nurbs::basis::find_span_binsearch;
    use crate::nurbs::deboor::{curve_point, SpanBasis};
    use knotwork_math::Point2;

    fn eval(degree: usize, knots: &[f64], pts: &[Point2], t: f64) -> Point2 {
        let span = find_span_binsearch(degree, knots, pts.len(), t);
        curve_point(&SpanBasis::values(degree, knots, span, t), pts)
    }

    fn quadratic() -> (Vec<f64>, Vec<Point2>) {
        (
            vec![0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0],
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 2.0),
                Point2::new(3.0, 2.0),
                Point2::new(4.0, 0.0),
            ],
        )
    }

    #[test]
    fn test_single_insertion_matches_textbook_blend() {
        let (knots, pts) = quadratic();
        let (new_knots, new_pts) =
            insert_curve_knot(2, &knots, &pts, 0.25, 1, 3, Tolerance::default()).unwrap();

        assert_eq!(new_knots, vec![0.0, 0.0, 0.0, 0.25, 0.5, 1.0, 1.0, 1.0]);
        assert_eq!(new_pts.len(), 5);
        // alpha_1 = 0.25 / 0.5, alpha_2 = 0.25 / 1.0
        assert_eq!(new_pts[0], pts[0]);
        assert_eq!(new_pts[1], pts[1] * 0.5 + pts[0] * 0.5);
        assert_eq!(new_pts[2], pts[2] * 0.25 + pts[1] * 0.75);
        assert_eq!(new_pts[3], pts[2]);
        assert_eq!(new_pts[4], pts[3]);
    }

    #[test]
    fn test_insertion_preserves_shape() {
        let (knots, pts) = quadratic();
        for &(t, count) in &[(0.5, 1), (0.5, 2), (0.1, 3), (0.9, 2)] {
            let (new_knots, new_pts) =
                insert_curve_knot(2, &knots, &pts, t, count, 3, Tolerance::default()).unwrap();
            assert_eq!(new_pts.len(), pts.len() + count);
            assert_eq!(new_knots.len(), knots.len() + count);
            for i in 0..=40 {
                let s = i as f64 / 40.0;
                let before = eval(2, &knots, &pts, s);
                let after = eval(2, &new_knots, &new_pts, s);
                assert!((before - after).length() < 1e-10, "t={} count={} s={}", t, count, s);
            }
        }
    }

    #[test]
    fn test_multiplicity_limits() {
        let (knots, pts) = quadratic();
        let tol = Tolerance::default();
        // 0.5 is already present once
        assert!(insert_curve_knot(2, &knots, &pts, 0.5, 2, 3, tol).is_ok());
        assert!(matches!(
            insert_curve_knot(2, &knots, &pts, 0.5, 3, 3, tol),
            Err(KnotworkError::MultiplicityExceeded { requested: 4, max: 3, .. })
        ));
        assert!(insert_curve_knot(2, &knots, &pts, 0.5, 2, 2, tol).is_err());
        // Clamped ends are already full
        assert!(insert_curve_knot(2, &knots, &pts, 0.0, 1, 3, tol).is_err());
        assert!(insert_curve_knot(2, &knots, &pts, 1.0, 1, 3, tol).is_err());
    }

    #[test]
    fn test_out_of_domain() {
        let (knots, pts) = quadratic();
        assert!(matches!(
            insert_curve_knot(2, &knots, &pts, 1.5, 1, 3, Tolerance::default()),
            Err(KnotworkError::OutOfDomain { .. })
        ));
    }

    #[test]
    fn test_zero_count_is_identity() {
        let (knots, pts) = quadratic();
        let (new_knots, new_pts) =
            insert_curve_knot(2, &knots, &pts, 0.3, 0, 3, Tolerance::default()).unwrap();
        assert_eq!(new_knots, knots);
        assert_eq!(new_pts, pts);
    }

    #[test]
    fn test_homogeneous_round_trip() {
        let pts = vec![Point2::new(1.0, 0.0), Point2::new(1.0, 1.0)];
        let weights = vec![1.0, 0.5];
        let lifted = Homogeneous::lift_all(&pts, &weights);
        assert_eq!(lifted[1].weighted, Point2::new(0.5, 0.5));
        let (back, w) = Homogeneous::project_all(lifted);
        assert_eq!(back, pts);
        assert_eq!(w, weights);
    }

    #[test]
    fn test_surface_insertion_shapes() {
        let knots = vec![0.0, 0.0, 1.0, 1.0];
        let grid = ControlGrid::from_rows(vec![
            vec![Point2::new(0.0, 0.0), Point2::new(0.0, 1.0)],
            vec![Point2::new(1.0, 0.0), Point2::new(1.0, 1.0)],
        ])
        .unwrap();
        let tol = Tolerance::default();

        let (ku, refined) = insert_surface_knot_u(1, &knots, &grid, 0.5, 1, 2, tol).unwrap();
        assert_eq!(ku, vec![0.0, 0.0, 0.5, 1.0, 1.0]);
        assert_eq!((refined.size_u(), refined.size_v()), (3, 2));
        assert_eq!(refined[(1, 1)], Point2::new(0.5, 1.0));

        let (kv, refined) = insert_surface_knot_v(1, &knots, &refined, 0.25, 2, 2, tol).unwrap();
        assert_eq!(kv, vec![0.0, 0.0, 0.25, 0.25, 1.0, 1.0]);
        assert_eq!((refined.size_u(), refined.size_v()), (3, 4));
        assert_eq!(refined[(1, 1)], Point2::new(0.5, 0.25));
    }
}
