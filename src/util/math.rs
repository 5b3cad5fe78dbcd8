//! Numeric helpers shared by the estimator, merger and compositor.

/// Rounds to the nearest integer with halves going towards positive infinity.
///
/// `f64::round` sends `-0.5` to `-1`; pixel mapping needs it to land on `0`.
#[inline]
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Arithmetic mean of a pair of values.
#[inline]
pub(crate) fn midpoint(a: f64, b: f64) -> f64 {
    (a + b) / 2.0
}
