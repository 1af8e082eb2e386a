//! Magnitude-aware population rounding.
//!
//! Reported people counts are rounded *up* to a precision that grows with the
//! value, so a report never understates how many people are affected and
//! large numbers do not suggest false precision:
//!
//! | value            | rounded up to a multiple of |
//! |------------------|-----------------------------|
//! | `< 1,000`        | 1                           |
//! | `< 10,000`       | 10                          |
//! | `< 100,000`      | 100                         |
//! | `>= 100,000`     | 1,000                       |
//!
//! Zero (and anything negative or NaN) rounds to zero. The function is
//! monotone non-decreasing, so rounding never reorders two totals by more than
//! one bucket width.

/// Bucket width used for `value`.
pub fn rounding_bucket(value: f64) -> u64 {
    if value < 1_000.0 {
        1
    } else if value < 10_000.0 {
        10
    } else if value < 100_000.0 {
        100
    } else {
        1_000
    }
}

/// Rounded value together with the bucket width that was applied.
pub fn population_rounding_full(value: f64) -> (u64, u64) {
    if value.is_nan() || value <= 0.0 {
        return (0, rounding_bucket(0.0));
    }
    let bucket = rounding_bucket(value);
    let b = bucket as f64;
    let rounded = ((value / b).ceil() * b) as u64;
    (rounded, bucket)
}

pub fn population_rounding(value: f64) -> u64 {
    population_rounding_full(value).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rounds_to_zero() {
        assert_eq!(population_rounding(0.0), 0);
        assert_eq!(population_rounding(-3.0), 0);
        assert_eq!(population_rounding(f64::NAN), 0);
    }

    #[test]
    fn test_small_values_round_up_to_unit() {
        assert_eq!(population_rounding(105.0), 105);
        assert_eq!(population_rounding(14.2), 15);
        assert_eq!(population_rounding(0.3), 1);
    }

    #[test]
    fn test_thousands_round_to_ten() {
        assert_eq!(population_rounding_full(1_234.0), (1_240, 10));
        assert_eq!(population_rounding(9_990.0), 9_990);
    }

    #[test]
    fn test_tens_of_thousands_round_to_hundred() {
        assert_eq!(population_rounding_full(12_345.0), (12_400, 100));
    }

    #[test]
    fn test_large_values_round_to_thousand() {
        assert_eq!(population_rounding_full(123_456.0), (124_000, 1_000));
        assert_eq!(population_rounding(2_000_000.0), 2_000_000);
    }

    #[test]
    fn test_bucket_edges() {
        assert_eq!(rounding_bucket(999.9), 1);
        assert_eq!(rounding_bucket(1_000.0), 10);
        assert_eq!(rounding_bucket(10_000.0), 100);
        assert_eq!(rounding_bucket(100_000.0), 1_000);
        // just under a bucket edge rounds onto the edge
        assert_eq!(population_rounding(999.5), 1_000);
    }

    #[test]
    fn test_monotone_over_a_sweep() {
        let mut prev = 0;
        let mut v = 0.0;
        while v < 250_000.0 {
            let r = population_rounding(v);
            assert!(r >= prev, "rounding({v}) = {r} < {prev}");
            assert!(r as f64 >= v, "rounding({v}) = {r} understates");
            assert!((r as f64 - v) < rounding_bucket(v) as f64 + 1e-9);
            prev = r;
            v += 37.3;
        }
    }
}
