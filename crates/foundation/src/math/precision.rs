//! Float ordering for ranked values.

use core::cmp::Ordering;

/// Total order with `-0.0 == 0.0`; all NaNs compare equal and sort last.
pub fn ascending_cmp_f64(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Descending order for ranked values, NaN still last.
pub fn descending_cmp_f64(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => ascending_cmp_f64(b, a),
        _ => ascending_cmp_f64(a, b),
    }
}
