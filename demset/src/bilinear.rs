//! Bilinear surface reconstruction over one unit grid cell.

/// Blends the four corner heights of a unit cell at fractional offset
/// `(fx, fy)` from the `q00` corner.
///
/// `q00`, `q10`, `q01` and `q11` sit at (0, 0), (1, 0), (0, 1) and
/// (1, 1). NaN corners propagate.
pub fn sample(q00: f64, q10: f64, q01: f64, q11: f64, fx: f64, fy: f64) -> f64 {
    q00 * (1.0 - fx) * (1.0 - fy)
        + q10 * fx * (1.0 - fy)
        + q01 * (1.0 - fx) * fy
        + q11 * fx * fy
}

#[cfg(test)]
mod tests {
    use super::sample;

    #[test]
    fn test_corners_are_exact() {
        assert_eq!(sample(1.0, 2.0, 3.0, 4.0, 0.0, 0.0), 1.0);
        assert_eq!(sample(1.0, 2.0, 3.0, 4.0, 1.0, 0.0), 2.0);
        assert_eq!(sample(1.0, 2.0, 3.0, 4.0, 0.0, 1.0), 3.0);
        assert_eq!(sample(1.0, 2.0, 3.0, 4.0, 1.0, 1.0), 4.0);
    }

    #[test]
    fn test_center_is_mean() {
        assert_eq!(sample(0.0, 10.0, 10.0, 20.0, 0.5, 0.5), 10.0);
    }

    #[test]
    fn test_shared_edge_is_continuous() {
        // The x = 1 edge of one cell must match the x = 0 edge of its
        // neighbor for every fy; the far corners cannot matter.
        for i in 0..=10 {
            let fy = f64::from(i) / 10.0;
            let left = sample(3.0, 7.0, 5.0, 11.0, 1.0, fy);
            let right = sample(7.0, -2.0, 11.0, 40.0, 0.0, fy);
            assert!((left - right).abs() < 1e-12);
        }
    }

    #[test]
    fn test_nan_corner_propagates() {
        assert!(sample(f64::NAN, 2.0, 3.0, 4.0, 0.5, 0.5).is_nan());
    }
}
