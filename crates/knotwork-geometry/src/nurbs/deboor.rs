//! Point and derivative evaluation for B-spline and NURBS curves and surfaces.
//!
//! The functions here take a precomputed [`SpanBasis`] per parametric
//! direction, so span lookup (and its pluggable strategy) stays with the
//! caller.

use knotwork_core::{KnotworkError, Result, Tolerance};
use knotwork_math::ControlPoint;

use super::basis::{basis_function_derivatives, basis_functions};
use super::Blend;
use crate::grid::ControlGrid;

/// Nonzero basis functions (and optionally derivatives) for one direction at one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanBasis {
    pub degree: usize,
    pub span: usize,
    /// `ders[k][j]`: k-th derivative of `N_{span-degree+j}`
    pub ders: Vec<Vec<f64>>,
}

impl SpanBasis {
    /// Basis values only.
    pub fn values(degree: usize, knots: &[f64], span: usize, t: f64) -> Self {
        Self {
            degree,
            span,
            ders: vec![basis_functions(degree, knots, span, t)],
        }
    }

    /// Basis values and derivatives up to `order`.
    pub fn with_derivatives(degree: usize, knots: &[f64], span: usize, t: f64, order: usize) -> Self {
        Self {
            degree,
            span,
            ders: basis_function_derivatives(degree, knots, span, t, order),
        }
    }

    /// Index of the first control point the span touches.
    pub fn first(&self) -> usize {
        self.span - self.degree
    }

    /// Highest derivative order held.
    pub fn order(&self) -> usize {
        self.ders.len() - 1
    }
}

pub(crate) fn binomial(n: usize, k: usize) -> f64 {
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

/// `Σ_j ders[k][j] · value(first + j)` for every `k <= order`.
fn blend<T, F>(basis: &SpanBasis, order: usize, value: F, zero: T) -> Vec<T>
where
    T: Blend,
    F: Fn(usize) -> T,
{
    let mut out = vec![zero; order + 1];
    let first = basis.first();
    for (k, slot) in out.iter_mut().enumerate().take(order.min(basis.order()) + 1) {
        for (j, &n) in basis.ders[k].iter().enumerate() {
            *slot = *slot + value(first + j) * n;
        }
    }
    out
}

/// `Σ_r Σ_s N^(k)_u[r] · N^(l)_v[s] · value(i, j)` for every `k + l <= order`.
fn tensor_blend<T, F>(bu: &SpanBasis, bv: &SpanBasis, order: usize, value: F, zero: T) -> Vec<Vec<T>>
where
    T: Blend,
    F: Fn(usize, usize) -> T,
{
    let mut skl = vec![vec![zero; order + 1]; order + 1];
    let du = order.min(bu.order());
    let dv = order.min(bv.order());
    let (first_u, first_v) = (bu.first(), bv.first());
    let mut temp = vec![zero; bv.degree + 1];

    for k in 0..=du {
        for (s, slot) in temp.iter_mut().enumerate() {
            *slot = zero;
            for (r, &n) in bu.ders[k].iter().enumerate() {
                *slot = *slot + value(first_u + r, first_v + s) * n;
            }
        }
        for l in 0..=(order - k).min(dv) {
            let mut acc = zero;
            for (s, &n) in bv.ders[l].iter().enumerate() {
                acc = acc + temp[s] * n;
            }
            skl[k][l] = acc;
        }
    }

    skl
}

fn check_denominator(w: f64, tol: Tolerance) -> Result<f64> {
    if tol.is_degenerate(w) {
        Err(KnotworkError::DegenerateWeights(w))
    } else {
        Ok(w)
    }
}

/// Evaluate a B-spline curve point.
pub fn curve_point<P: ControlPoint>(basis: &SpanBasis, control_points: &[P]) -> P {
    blend(basis, 0, |i| control_points[i], P::ZERO)[0]
}

/// Evaluate a rational B-spline (NURBS) curve point by perspective division.
pub fn nurbs_curve_point<P: ControlPoint>(
    basis: &SpanBasis,
    control_points: &[P],
    weights: &[f64],
    tol: Tolerance,
) -> Result<P> {
    let first = basis.first();
    let mut point = P::ZERO;
    let mut w = 0.0;

    for (j, &n) in basis.ders[0].iter().enumerate() {
        let bw = n * weights[first + j];
        point += control_points[first + j] * bw;
        w += bw;
    }

    Ok(point / check_denominator(w, tol)?)
}

/// Evaluate a B-spline curve and its derivatives up to `order`.
///
/// `basis` must hold at least `min(order, degree)` derivative rows; orders
/// above the degree are zero.
pub fn curve_derivatives<P: ControlPoint>(
    basis: &SpanBasis,
    control_points: &[P],
    order: usize,
) -> Vec<P> {
    blend(basis, order, |i| control_points[i], P::ZERO)
}

/// Evaluate a NURBS curve and its derivatives up to `order`.
pub fn nurbs_curve_derivatives<P: ControlPoint>(
    basis: &SpanBasis,
    control_points: &[P],
    weights: &[f64],
    order: usize,
    tol: Tolerance,
) -> Result<Vec<P>> {
    let aders = blend(basis, order, |i| control_points[i] * weights[i], P::ZERO);
    let wders = blend(basis, order, |i| weights[i], 0.0);
    let w0 = check_denominator(wders[0], tol)?;

    let mut ck = vec![P::ZERO; order + 1];
    for k in 0..=order {
        let mut v = aders[k];
        for i in 1..=k {
            v -= ck[k - i] * (binomial(k, i) * wders[i]);
        }
        ck[k] = v / w0;
    }

    Ok(ck)
}

/// Evaluate a B-spline surface point.
pub fn surface_point<P: ControlPoint>(bu: &SpanBasis, bv: &SpanBasis, grid: &ControlGrid<P>) -> P {
    tensor_blend(bu, bv, 0, |i, j| grid[(i, j)], P::ZERO)[0][0]
}

/// Evaluate a NURBS surface point. `weights` shares the grid's row-major layout.
pub fn nurbs_surface_point<P: ControlPoint>(
    bu: &SpanBasis,
    bv: &SpanBasis,
    grid: &ControlGrid<P>,
    weights: &[f64],
    tol: Tolerance,
) -> Result<P> {
    let mut point = P::ZERO;
    let mut w = 0.0;

    for (r, &nu) in bu.ders[0].iter().enumerate() {
        let i = bu.first() + r;
        for (s, &nv) in bv.ders[0].iter().enumerate() {
            let j = bv.first() + s;
            let bw = nu * nv * weights[grid.offset(i, j)];
            point += grid[(i, j)] * bw;
            w += bw;
        }
    }

    Ok(point / check_denominator(w, tol)?)
}

/// Partial derivatives of a B-spline surface.
///
/// `skl[k][l]` is the derivative taken `k` times in u and `l` times in v,
/// for `k + l <= order`; other entries are zero.
pub fn surface_derivatives<P: ControlPoint>(
    bu: &SpanBasis,
    bv: &SpanBasis,
    grid: &ControlGrid<P>,
    order: usize,
) -> Vec<Vec<P>> {
    tensor_blend(bu, bv, order, |i, j| grid[(i, j)], P::ZERO)
}

/// Partial derivatives of a NURBS surface, laid out like [`surface_derivatives`].
pub fn nurbs_surface_derivatives<P: ControlPoint>(
    bu: &SpanBasis,
    bv: &SpanBasis,
    grid: &ControlGrid<P>,
    weights: &[f64],
    order: usize,
    tol: Tolerance,
) -> Result<Vec<Vec<P>>> {
    let aders = tensor_blend(
        bu,
        bv,
        order,
        |i, j| grid[(i, j)] * weights[grid.offset(i, j)],
        P::ZERO,
    );
    let wders = tensor_blend(bu, bv, order, |i, j| weights[grid.offset(i, j)], 0.0);
    let w0 = check_denominator(wders[0][0], tol)?;

    let mut skl = vec![vec![P::ZERO; order + 1]; order + 1];
    for k in 0..=order {
        for l in 0..=(order - k) {
            let mut v = aders[k][l];
            for j in 1..=l {
                v -= skl[k][l - j] * (binomial(l, j) * wders[0][j]);
            }
            for i in 1..=k {
                v -= skl[k - i][l] * (binomial(k, i) * wders[i][0]);
                let mut v2 = P::ZERO;
                for j in 1..=l {
                    v2 += skl[k - i][l - j] * (binomial(l, j) * wders[i][j]);
                }
                v -= v2 * binomial(k, i);
            }
            skl[k][l] = v / w0;
        }
    }

    Ok(skl)
}
