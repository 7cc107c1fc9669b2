use crate::foundation::core::{Affine, Vec2};

/// Tolerance under which two skew angles (degrees) count as equal.
pub(crate) const SKEW_EPSILON_DEG: f64 = 1e-3;

pub(crate) fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

pub(crate) fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

/// Apply only the linear (non-translation) part of `m` to `v`.
pub(crate) fn apply_linear(m: Affine, v: Vec2) -> Vec2 {
    let [a, b, c, d, _, _] = m.as_coeffs();
    Vec2::new(a * v.x + c * v.y, b * v.x + d * v.y)
}

/// Flip a source-space (y down) vector into output space (y up).
pub(crate) fn flip_y(v: Vec2) -> Vec2 {
    Vec2::new(v.x, -v.y)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
