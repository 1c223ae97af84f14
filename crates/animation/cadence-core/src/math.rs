//! Scalar factor helpers:
//! - factor_between / factor_in (the frame driver's clamp)
//! - factor_out / factor_in_out (ramps for `on_update` consumers)
//! - mix (lerp), quantize

/// Position of `value` between `min` and `max`, unclamped.
/// A degenerate range returns `value` unchanged.
#[inline]
pub fn factor_between(value: f64, min: f64, max: f64) -> f64 {
    if min == max {
        value
    } else {
        (value - min) / (max - min)
    }
}

/// Position of `value` in `[start, end]`, clamped to `[0, 1]`.
#[inline]
pub fn factor_in(value: f64, start: f64, end: f64) -> f64 {
    factor_between(value, start, end).clamp(0.0, 1.0)
}

/// Inverse ramp: 1 at `start`, 0 at `end`.
#[inline]
pub fn factor_out(value: f64, start: f64, end: f64) -> f64 {
    factor_in(value, end, start)
}

/// Ramp up over `[start, mid]`, then down over `[mid, end]`.
#[inline]
pub fn factor_in_out(value: f64, start: f64, mid: f64, end: f64) -> f64 {
    if value > mid {
        factor_out(value, mid, end)
    } else {
        factor_in(value, start, mid)
    }
}

/// Linear interpolation.
#[inline]
pub fn mix(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub use self::mix as lerp;

#[inline]
pub fn quantize(value: f64, step: f64) -> f64 {
    // halves round toward +inf
    (value / step + 0.5).floor() * step
}
