//! Interpolation-curve selection and rotation continuity.

use crate::scene::model::{Frame, TweenKind};
use crate::skeleton::model::{Curve, TIME_EPSILON};

/// Curve for a key written inside `frames`, ordered innermost (the element's own frame) first.
///
/// Un-tweened frames defer to the nearest enclosing tweened frame; with none, the key holds.
pub fn select_curve<'f>(frames: impl IntoIterator<Item = &'f Frame>) -> Curve {
    frames
        .into_iter()
        .find(|f| f.tween != TweenKind::None)
        .map_or(Curve::Stepped, frame_curve)
}

/// Curve described by one frame's own tween settings.
pub fn frame_curve(frame: &Frame) -> Curve {
    match frame.tween {
        TweenKind::None => Curve::Stepped,
        // Non-classic tweens arrive pre-sampled per frame.
        TweenKind::Motion | TweenKind::Shape => Curve::Linear,
        TweenKind::Classic => match &frame.custom_ease {
            Some(points) if points.len() == 4 => Curve::Bezier {
                cx1: points[1].x,
                cy1: points[1].y,
                cx2: points[2].x,
                cy2: points[2].y,
            },
            Some(points) => {
                tracing::debug!(
                    count = points.len(),
                    "custom ease is not a single cubic segment, using linear"
                );
                Curve::Linear
            }
            None => standard_ease_curve(frame.ease),
        },
    }
}

/// Cubic curve for a standard ease intensity in `[-100, 100]` (negative eases in).
///
/// The intensity places the control point of a quadratic curve, which is then degree-elevated
/// to the equivalent cubic.
pub fn standard_ease_curve(intensity: i32) -> Curve {
    if intensity == 0 {
        return Curve::Linear;
    }
    let k = f64::from(intensity.clamp(-100, 100).unsigned_abs()) / 100.0;
    let q1y = if intensity < 0 {
        0.5 * (1.0 - k)
    } else {
        0.5 + 0.5 * k
    };
    Curve::Bezier {
        cx1: 1.0 / 3.0,
        cy1: 2.0 / 3.0 * q1y,
        cx2: 2.0 / 3.0,
        cy2: 1.0 + 2.0 / 3.0 * (q1y - 1.0),
    }
}

/// A previously written rotation key: `(time, angle)`.
pub type RotationSample = (f64, f64);

/// Unwrap `angle` so it lies within (-180, 180] of the previous key.
///
/// Keys at or before the previous key's time are returned unchanged.
pub fn unwrap_rotation(previous: Option<RotationSample>, time: f64, angle: f64) -> f64 {
    let Some((prev_time, prev_angle)) = previous else {
        return angle;
    };
    if time <= prev_time + TIME_EPSILON {
        return angle;
    }
    let mut a = angle;
    while a - prev_angle > 180.0 {
        a -= 360.0;
    }
    while a - prev_angle <= -180.0 {
        a += 360.0;
    }
    a
}

#[cfg(test)]
#[path = "../../tests/unit/convert/curve.rs"]
mod tests;
