//! Tolerance comparison and safe ratios.

/// True iff `|a - b| <= tol`. NaN on either side is never within tolerance.
pub fn within(a: f64, b: f64, tol: f64) -> bool {
    if a.is_nan() || b.is_nan() || tol.is_nan() {
        return false;
    }
    (a - b).abs() <= tol
}

/// `num / den` as a probability, or `None` when the denominator is zero.
///
/// Keeps division-by-zero out of emitted output: callers surface the
/// undefined case as an absent value instead of NaN.
pub fn ratio(num: u64, den: u64) -> Option<f64> {
    if den == 0 {
        return None;
    }
    Some(num as f64 / den as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_basic() {
        assert!(within(1.0, 1.0 + 1e-12, 1e-9));
        assert!(!within(1.0, 1.1, 1e-9));
    }

    #[test]
    fn within_nan_is_false() {
        assert!(!within(f64::NAN, 1.0, 1e-9));
        assert!(!within(1.0, 1.0, f64::NAN));
    }

    #[test]
    fn ratio_zero_denominator() {
        assert_eq!(ratio(3, 0), None);
    }

    #[test]
    fn ratio_probability() {
        assert_eq!(ratio(2, 4), Some(0.5));
        assert_eq!(ratio(0, 4), Some(0.0));
    }
}
