//! Equal-interval classification of impact values for raster styling.
//!
//! `create_classes` returns the *upper* bound of each class. Class `i` covers
//! `(bound[i - 1], bound[i]]`, and class 0 covers everything from the smallest
//! non-zero value up to `bound[0]`. The last bound is always the maximum, so
//! the classes cover the whole non-zero range. When the range is narrow some
//! classes share a bound and stay empty.

use crate::formatting::format_class_value;

/// Upper class bounds for the non-zero, finite entries of `values`.
///
/// Always returns exactly `num_classes` bounds: all zero when there is no
/// non-zero value, all equal when there is a single distinct one.
pub fn create_classes(values: &[f64], num_classes: usize) -> Vec<f64> {
    let (min, max) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v != 0.0)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if min > max {
        return vec![0.0; num_classes];
    }

    let span = max - min;
    (0..num_classes)
        .map(|i| {
            if i + 1 == num_classes {
                max
            } else {
                min + span * (i + 1) as f64 / num_classes as f64
            }
        })
        .collect()
}

/// Human readable `(lower, upper)` interval per class, starting from 0.
pub fn humanize_class(classes: &[f64]) -> Vec<(String, String)> {
    let mut intervals = Vec::with_capacity(classes.len());
    let mut lower = 0.0;
    for &upper in classes {
        intervals.push((format_class_value(lower), format_class_value(upper)));
        lower = upper;
    }
    intervals
}

/// `"[lower - upper]"`, followed by the severity word when given.
pub fn create_label(interval: &(String, String), label: Option<&str>) -> String {
    let range = format!("[{} - {}]", interval.0, interval.1);
    match label {
        Some(word) => format!("{range} {word}"),
        None => range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_classes_equal_interval() {
        let values = [0.0, 10.0, 0.0, 90.0, 50.0];
        let classes = create_classes(&values, 8);
        assert_eq!(classes.len(), 8);
        assert_eq!(classes[0], 20.0);
        assert_eq!(classes[3], 50.0);
        assert_eq!(classes[7], 90.0);
        assert!(classes.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_create_classes_ignores_zero_and_nan() {
        let values = [0.0, f64::NAN, 4.0, 12.0];
        let classes = create_classes(&values, 4);
        assert_eq!(classes, vec![6.0, 8.0, 10.0, 12.0]);
    }

    #[test]
    fn test_create_classes_single_value() {
        let classes = create_classes(&[0.0, 7.0, 7.0, 0.0], 8);
        assert_eq!(classes, vec![7.0; 8]);
    }

    #[test]
    fn test_create_classes_all_zero() {
        let classes = create_classes(&[0.0, 0.0], 8);
        assert_eq!(classes, vec![0.0; 8]);
        let classes = create_classes(&[], 8);
        assert_eq!(classes.len(), 8);
    }

    #[test]
    fn test_humanize_class_starts_at_zero() {
        let intervals = humanize_class(&[2.5, 5.0, 12.0]);
        assert_eq!(intervals[0], ("0".to_string(), "2.5".to_string()));
        assert_eq!(intervals[1], ("2.5".to_string(), "5".to_string()));
        assert_eq!(intervals[2], ("5".to_string(), "12".to_string()));
    }

    #[test]
    fn test_create_label() {
        let interval = ("0".to_string(), "1,250".to_string());
        assert_eq!(create_label(&interval, None), "[0 - 1,250]");
        assert_eq!(create_label(&interval, Some("Low")), "[0 - 1,250] Low");
    }
}
