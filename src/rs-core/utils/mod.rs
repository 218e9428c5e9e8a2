pub mod logger;
pub mod time_ranges;

/// Clamp `val` into `[min, max]`, treating `NaN` as `min`.
pub(crate) fn clamp_f64(val: f64, min: f64, max: f64) -> f64 {
    if val.is_nan() {
        min
    } else {
        val.max(min).min(max)
    }
}
