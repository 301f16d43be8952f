/// Tolerances shared by the evaluators and knot-vector utilities.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Padding around the parameter domain; values inside the pad snap to the edge
    pub domain: f64,
    /// Smallest rational denominator accepted during perspective division
    pub denominator: f64,
    /// Two knot values closer than this are the same knot
    pub knot: f64,
}

impl Tolerance {
    pub const DEFAULT_DOMAIN: f64 = 1e-7;
    pub const DEFAULT_DENOMINATOR: f64 = 1e-10;
    pub const DEFAULT_KNOT: f64 = 1e-10;

    pub fn new(domain: f64, denominator: f64, knot: f64) -> Self {
        Self {
            domain,
            denominator,
            knot,
        }
    }

    pub fn default_precision() -> Self {
        Self {
            domain: Self::DEFAULT_DOMAIN,
            denominator: Self::DEFAULT_DENOMINATOR,
            knot: Self::DEFAULT_KNOT,
        }
    }

    pub fn loose() -> Self {
        Self {
            domain: 1e-4,
            denominator: 1e-8,
            knot: 1e-8,
        }
    }

    pub fn tight() -> Self {
        Self {
            domain: 1e-10,
            denominator: 1e-12,
            knot: 1e-12,
        }
    }

    /// Check if two knot values are the same knot
    pub fn knot_eq(self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.knot
    }

    /// Check if a rational denominator is too small to divide by
    pub fn is_degenerate(self, w: f64) -> bool {
        w.abs() < self.denominator
    }

    /// Check if `t` lies in `[min, max]` padded by the domain tolerance
    pub fn in_domain(self, t: f64, min: f64, max: f64) -> bool {
        t >= min - self.domain && t <= max + self.domain
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::default_precision()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_domain_padding() {
        let tol = Tolerance::default();
        assert!(tol.in_domain(1.0 + 5e-8, 0.0, 1.0));
        assert!(tol.in_domain(-5e-8, 0.0, 1.0));
        assert!(!tol.in_domain(1.0 + 1e-6, 0.0, 1.0));
        assert!(!tol.in_domain(-0.1, 0.0, 1.0));
    }

    #[test]
    fn test_degenerate_denominator() {
        let tol = Tolerance::default();
        assert!(tol.is_degenerate(1e-12));
        assert!(tol.is_degenerate(-1e-11));
        assert!(!tol.is_degenerate(1e-3));
    }

    #[test]
    fn test_knot_eq() {
        let tol = Tolerance::default();
        assert!(tol.knot_eq(0.33, 0.33 + 1e-12));
        assert!(!tol.knot_eq(0.33, 0.34));
    }
}
