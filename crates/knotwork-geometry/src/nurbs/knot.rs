//! Knot vector construction, validation, and normalization.

use knotwork_core::{KnotworkError, Result};

/// `num` evenly spaced values from `start` to `stop`, both ends included.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut values: Vec<f64> = (0..num).map(|i| start + step * i as f64).collect();
            // Pin the last value so rounding never leaves it short of `stop`
            values[num - 1] = stop;
            values
        }
    }
}

/// Generate a uniform knot vector of length `num_ctrlpts + degree + 1`.
///
/// A clamped vector repeats 0 and 1 `degree + 1` times at the ends and spaces
/// the interior knots evenly. An unclamped vector spaces every knot evenly
/// over `[0, 1]`.
pub fn generate(degree: usize, num_ctrlpts: usize, clamped: bool) -> Result<Vec<f64>> {
    if num_ctrlpts < degree + 1 {
        return Err(KnotworkError::InvalidParameter(format!(
            "a degree {} spline needs at least {} control points, got {}",
            degree,
            degree + 1,
            num_ctrlpts
        )));
    }

    if !clamped {
        return Ok(linspace(0.0, 1.0, num_ctrlpts + degree + 1));
    }

    let mut knots = Vec::with_capacity(num_ctrlpts + degree + 1);
    knots.extend(std::iter::repeat(0.0).take(degree));
    knots.extend(linspace(0.0, 1.0, num_ctrlpts - degree + 1));
    knots.extend(std::iter::repeat(1.0).take(degree));
    Ok(knots)
}

/// Check that `knots` is a valid knot vector for the given degree and
/// control-point count.
///
/// Verifies the length, that values never decrease, and that no value is
/// repeated more than `degree + 1` times.
pub fn check(knots: &[f64], degree: usize, num_ctrlpts: usize) -> bool {
    if knots.len() != num_ctrlpts + degree + 1 {
        return false;
    }
    if knots.iter().any(|k| !k.is_finite()) {
        return false;
    }
    if knots.windows(2).any(|w| w[1] < w[0]) {
        return false;
    }

    let mut run = 1;
    for w in knots.windows(2) {
        if w[1] == w[0] {
            run += 1;
            if run > degree + 1 {
                return false;
            }
        } else {
            run = 1;
        }
    }
    true
}

/// Rescale `knots` so the first knot maps to 0 and the last to 1.
///
/// Relative spacing is preserved. An already normalized vector is returned
/// unchanged, so normalizing twice gives the same result as once. Values
/// must not decrease, so the first and last knots are the minimum and maximum.
pub fn normalize(knots: &[f64]) -> Result<Vec<f64>> {
    let (first, last) = match (knots.first(), knots.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => {
            return Err(KnotworkError::InvalidParameter(
                "cannot normalize an empty knot vector".into(),
            ))
        }
    };
    if let Some(i) = knots.windows(2).position(|w| w[1] < w[0]) {
        return Err(KnotworkError::InvalidParameter(format!(
            "knot vector decreases at index {} ({} -> {})",
            i + 1,
            knots[i],
            knots[i + 1]
        )));
    }

    if first == 0.0 && last == 1.0 {
        return Ok(knots.to_vec());
    }

    let span = last - first;
    if approx::abs_diff_eq!(span, 0.0) || !span.is_finite() {
        return Err(KnotworkError::InvalidParameter(format!(
            "knot vector has a zero-length domain [{}, {}]",
            first, last
        )));
    }

    log::trace!("normalizing knot vector from [{}, {}]", first, last);
    let mut normalized: Vec<f64> = knots.iter().map(|k| (k - first) / span).collect();
    // Pin the ends so the result passes the already-normalized check
    let n = normalized.len();
    normalized[0] = 0.0;
    normalized[n - 1] = 1.0;
    Ok(normalized)
}

/// Number of knots equal to `value` within `tol`.
pub fn multiplicity(knots: &[f64], value: f64, tol: f64) -> usize {
    knots.iter().filter(|&&k| (k - value).abs() <= tol).count()
}

/// Valid parameter range `[knots[p], knots[m - p]]` where `m` is the last index.
pub fn domain(knots: &[f64], degree: usize) -> (f64, f64) {
    (knots[degree], knots[knots.len() - degree - 1])
}

/// Whether the parameter domain `[knots[p], knots[m - p]]` has positive length.
pub fn has_domain(knots: &[f64], degree: usize) -> bool {
    let (min, max) = domain(knots, degree);
    min < max
}
