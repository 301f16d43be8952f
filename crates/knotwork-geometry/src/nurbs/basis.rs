//! Knot span search and B-spline basis functions.

use knotwork_core::{KnotworkError, Result, Tolerance};

/// Signature shared by the span finders.
///
/// Arguments are `(degree, knots, num_ctrlpts, t)`; `t` must already lie in
/// the knot vector's domain.
pub type FindSpanFn = fn(usize, &[f64], usize, f64) -> usize;

/// Snap `t` into `[min, max]` when it is within the domain tolerance.
///
/// Values further outside fail with `OutOfDomain`.
pub fn clamp_param(t: f64, (min, max): (f64, f64), tol: Tolerance) -> Result<f64> {
    if !tol.in_domain(t, min, max) || t.is_nan() {
        return Err(KnotworkError::OutOfDomain { param: t, min, max });
    }
    if t < min || t > max {
        log::trace!("snapping parameter {} into [{}, {}]", t, min, max);
    }
    Ok(t.clamp(min, max))
}

/// Check that every given parameter lies in the padded `[0, 1]` band.
pub fn check_params(params: &[Option<f64>], tol: Tolerance) -> bool {
    params
        .iter()
        .flatten()
        .all(|&t| tol.in_domain(t, 0.0, 1.0))
}

/// Find the knot span index for parameter `t` by binary search.
///
/// Returns the index `i` such that `knots[i] <= t < knots[i+1]`. When `t`
/// sits on the upper end of the domain the last valid span,
/// `num_ctrlpts - 1`, is returned.
pub fn find_span_binsearch(degree: usize, knots: &[f64], num_ctrlpts: usize, t: f64) -> usize {
    let n = num_ctrlpts - 1;

    if t >= knots[n + 1] {
        return n;
    }
    if t <= knots[degree] {
        // Skip past repeated knots at the lower end
        let mut span = degree;
        while span < n && knots[span + 1] <= t {
            span += 1;
        }
        return span;
    }

    let mut low = degree;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;

    while t < knots[mid] || t >= knots[mid + 1] {
        if t < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }

    mid
}

/// Find the knot span index for parameter `t` by scanning the knot vector.
///
/// Same contract as [`find_span_binsearch`], in `O(n)`.
pub fn find_span_linear(degree: usize, knots: &[f64], num_ctrlpts: usize, t: f64) -> usize {
    let mut span = degree + 1;
    while span < num_ctrlpts && knots[span] <= t {
        span += 1;
    }
    span - 1
}

/// Check the domain of `t` and find its span with binary search.
pub fn find_span(
    degree: usize,
    knots: &[f64],
    num_ctrlpts: usize,
    t: f64,
    tol: Tolerance,
) -> Result<usize> {
    let t = clamp_param(t, super::knot::domain(knots, degree), tol)?;
    Ok(find_span_binsearch(degree, knots, num_ctrlpts, t))
}

/// `a / b`, with `0 / 0` and anything over zero taken as 0.
#[inline]
fn ratio(a: f64, b: f64) -> f64 {
    if b == 0.0 {
        0.0
    } else {
        a / b
    }
}

/// Compute the non-vanishing basis functions at parameter `t`.
///
/// Returns the `degree + 1` values `N_{span-degree,degree}(t)` through
/// `N_{span,degree}(t)`.
///
/// # Arguments
/// * `degree` - Degree of the B-spline
/// * `knots` - The knot vector
/// * `span` - The knot span index (from a span finder)
/// * `t` - Parameter value
pub fn basis_functions(degree: usize, knots: &[f64], span: usize, t: f64) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];

    n[0] = 1.0;

    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;

        for r in 0..j {
            let temp = ratio(n[r], right[r + 1] + left[j - r]);
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }

        n[j] = saved;
    }

    n
}

/// Compute the basis functions and their derivatives up to `order`.
///
/// Returns `ders` where `ders[k][j]` is the k-th derivative of
/// `N_{span-degree+j,degree}` at `t`. Rows with `k > degree` are zero.
pub fn basis_function_derivatives(
    degree: usize,
    knots: &[f64],
    span: usize,
    t: f64,
    order: usize,
) -> Vec<Vec<f64>> {
    let p = degree;

    // ndu holds basis values in the upper triangle and knot differences in the lower
    let mut ndu = vec![vec![0.0; p + 1]; p + 1];
    let mut left = vec![0.0; p + 1];
    let mut right = vec![0.0; p + 1];

    ndu[0][0] = 1.0;

    for j in 1..=p {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;

        for r in 0..j {
            ndu[j][r] = right[r + 1] + left[j - r];
            let temp = ratio(ndu[r][j - 1], ndu[j][r]);

            ndu[r][j] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        ndu[j][j] = saved;
    }

    let mut ders = vec![vec![0.0; p + 1]; order + 1];
    for j in 0..=p {
        ders[0][j] = ndu[j][p];
    }

    let max_k = order.min(p);
    let mut a = vec![vec![0.0; p + 1]; 2];

    for r in 0..=p {
        let (mut s1, mut s2) = (0, 1);
        a[0][0] = 1.0;

        for k in 1..=max_k {
            let mut d = 0.0;
            let rk = r as isize - k as isize;
            let pk = p - k;

            if rk >= 0 {
                let rk = rk as usize;
                a[s2][0] = ratio(a[s1][0], ndu[pk + 1][rk]);
                d = a[s2][0] * ndu[rk][pk];
            }

            let j1 = if rk >= -1 { 1 } else { (-rk) as usize };
            let j2 = if r <= pk + 1 { k - 1 } else { p - r };

            for j in j1..=j2 {
                let idx = (rk + j as isize) as usize;
                a[s2][j] = ratio(a[s1][j] - a[s1][j - 1], ndu[pk + 1][idx]);
                d += a[s2][j] * ndu[idx][pk];
            }

            if r <= pk {
                a[s2][k] = ratio(-a[s1][k - 1], ndu[pk + 1][r]);
                d += a[s2][k] * ndu[r][pk];
            }

            ders[k][r] = d;
            std::mem::swap(&mut s1, &mut s2);
        }
    }

    // Multiply through by p! / (p - k)!
    let mut factor = p as f64;
    for k in 1..=max_k {
        for val in ders[k].iter_mut() {
            *val *= factor;
        }
        factor *= (p - k) as f64;
    }

    ders
}
