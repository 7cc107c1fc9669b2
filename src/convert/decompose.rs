//! Scene element transform -> bone pose.

use crate::foundation::core::{Affine, Vec2};
use crate::foundation::math::{SKEW_EPSILON_DEG, apply_linear, approx_eq, flip_y};
use crate::scene::model::Element;
use crate::skeleton::model::Pose;

/// Decompose `element` into a bone pose expressed in its parent's (output, y-up) space.
///
/// The baseline position is the registration point from the element matrix, or the element's
/// direct `x`/`y` for a raw vector shape outside a masked run. A distinct anchor point moves the
/// baseline by that point rotated and scaled like the element. Equal skews mean pure rotation;
/// differing skews mean pure shear.
///
/// `previous` is the last pose decomposed for the same logical node. It does not change the
/// result; callers use it for rotation continuity.
pub fn decompose(element: &Element, in_masked_run: bool, _previous: Option<&Pose>) -> Pose {
    let base = if element.is_shape() && !in_masked_run {
        Vec2::new(element.x, element.y)
    } else {
        element.affine().translation()
    };
    let base = flip_y(base);
    let (mut x, mut y) = (base.x, base.y);

    if let Some(anchor) = element.anchor() {
        let off = apply_linear(local_linear(element), anchor.to_vec2());
        x += off.x;
        y -= off.y;
    }

    let mut pose = Pose {
        x,
        y,
        scale_x: element.scale_x,
        scale_y: element.scale_y,
        ..Pose::default()
    };
    if approx_eq(element.skew_x, element.skew_y, SKEW_EPSILON_DEG) {
        pose.rotation = -element.rotation;
    } else {
        pose.shear_x = -element.skew_x;
        pose.shear_y = -element.skew_y;
    }
    pose
}

/// Pose of `element` relative to its parent bone.
///
/// Bones sit on their element's anchor point, so a child expressed in the parent timeline's
/// space is shifted by the parent's `anchor_offset`.
pub fn child_pose(
    element: &Element,
    in_masked_run: bool,
    previous: Option<&Pose>,
    parent_anchor: Vec2,
) -> Pose {
    let mut pose = decompose(element, in_masked_run, previous);
    pose.x -= parent_anchor.x;
    pose.y -= parent_anchor.y;
    pose
}

/// Linear part built from the element's own rotation/skew and scale (source, y-down space).
fn local_linear(element: &Element) -> Affine {
    let (kx, ky) = if approx_eq(element.skew_x, element.skew_y, SKEW_EPSILON_DEG) {
        (element.rotation, element.rotation)
    } else {
        (element.skew_x, element.skew_y)
    };
    let (kx, ky) = (kx.to_radians(), ky.to_radians());
    Affine::new([
        element.scale_x * ky.cos(),
        element.scale_x * ky.sin(),
        -element.scale_y * kx.sin(),
        element.scale_y * kx.cos(),
        0.0,
        0.0,
    ])
}

/// Anchor point of `element` as an offset in output (y-up) space, zero when absent.
pub(crate) fn anchor_offset(element: &Element) -> Vec2 {
    element
        .anchor()
        .map_or(Vec2::ZERO, |p| flip_y(p.to_vec2()))
}

#[cfg(test)]
#[path = "../../tests/unit/convert/decompose.rs"]
mod tests;
