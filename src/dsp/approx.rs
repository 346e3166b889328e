//! Tolerant float comparisons for state-machine thresholds.

/// Absolute tolerance for threshold comparisons.
pub const ABSOLUTE_TOLERANCE: f64 = 1e-6;
/// Relative tolerance, scaled by the larger magnitude of the two operands.
pub const RELATIVE_TOLERANCE: f64 = 1e-6;

/// `a` and `b` differ by no more than the absolute tolerance, or by no more
/// than the relative tolerance of the larger magnitude.
///
/// Non-finite operands only compare equal when they are identical.
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    if !(a.is_finite() && b.is_finite()) {
        return a == b;
    }

    let diff = (a - b).abs();
    diff <= ABSOLUTE_TOLERANCE || diff <= RELATIVE_TOLERANCE * a.abs().max(b.abs())
}

#[inline]
pub fn approx_ge(a: f64, b: f64) -> bool {
    a > b || approx_eq(a, b)
}

#[inline]
pub fn approx_le(a: f64, b: f64) -> bool {
    a < b || approx_eq(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_tolerance_near_zero() {
        assert!(approx_eq(0.0, 5e-7));
        assert!(approx_le(5e-7, 0.0));
        assert!(!approx_le(1e-5, 0.0));
    }

    #[test]
    fn relative_tolerance_for_large_values() {
        assert!(approx_eq(1_000_000.0, 1_000_000.5));
        assert!(!approx_eq(1_000_000.0, 1_000_010.0));
    }

    #[test]
    fn residue_counts_as_reaching_threshold() {
        assert!(approx_ge(1.0 - 1e-9, 1.0));
        assert!(approx_ge(1.2, 1.0));
        assert!(!approx_ge(0.99, 1.0));
    }

    #[test]
    fn non_finite_only_matches_itself() {
        assert!(approx_eq(f64::INFINITY, f64::INFINITY));
        assert!(!approx_eq(f64::INFINITY, 1.0));
        assert!(!approx_eq(f64::NAN, f64::NAN));
    }
}
