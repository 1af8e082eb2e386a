//! Number formatting for reports and legend labels.

use crate::config::{DECIMAL_SEPARATOR, THOUSAND_SEPARATOR};

pub fn get_thousand_separator() -> char {
    THOUSAND_SEPARATOR
}

pub fn get_decimal_separator() -> char {
    DECIMAL_SEPARATOR
}

/// Integer with thousand separators: `1234567` → `"1,234,567"`.
pub fn format_int(n: i64) -> String {
    format_with_separator(n, THOUSAND_SEPARATOR)
}

/// Value with thousand separators and `places` decimals.
pub fn format_decimal(value: f64, places: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{:.*}", places, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let mut out = String::new();
    // `-0.0` and values that round to zero print without a sign
    if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    let int_value: i64 = int_part.parse().unwrap_or(0);
    out.push_str(&format_with_separator(int_value, THOUSAND_SEPARATOR));
    if let Some(frac) = frac_part {
        out.push(DECIMAL_SEPARATOR);
        out.push_str(frac);
    }
    out
}

/// Legend-friendly number: whole numbers from 10 up, one decimal below.
pub fn format_class_value(value: f64) -> String {
    if value.abs() >= 10.0 || value.fract() == 0.0 {
        format_int(value.round() as i64)
    } else {
        format_decimal(value, 1)
    }
}

fn format_with_separator(n: i64, sep: char) -> String {
    let negative = n < 0;
    let s = n.unsigned_abs().to_string();
    let len = s.len();

    if len <= 3 {
        return if negative { format!("-{}", s) } else { s };
    }

    let mut result = String::with_capacity(len + len / 3 + 1);
    if negative {
        result.push('-');
    }

    let first_group = len % 3;
    if first_group > 0 {
        result.push_str(&s[..first_group]);
        result.push(sep);
    }

    for (i, ch) in s[first_group..].chars().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(sep);
        }
        result.push(ch);
    }

    result
}
