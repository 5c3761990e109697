//! Canonical cache keys for calculator requests.

use crate::calc::Operation;

/// Builds the cache key for `operation` applied to `x` and `y`.
///
/// The key is built from parsed operand values in a fixed order, so query
/// parameter order, extra parameters and spellings such as `4` and `4.0` all
/// land on the same entry.
pub fn cache_key(operation: Operation, x: f64, y: f64) -> String {
    format!(
        "/{}?x={}&y={}",
        operation.name(),
        canonical(x),
        canonical(y)
    )
}

// Folds -0.0 into 0.0.
fn canonical(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}
