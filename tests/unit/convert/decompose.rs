use super::*;
use crate::scene::model::PointDef;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn registration_point_flips_vertical_axis() {
    let e = crate::scene::model::Element::instance("a", "b").with_pose(10.0, 20.0, 0.0, 1.0, 1.0);
    let p = decompose(&e, false, None);
    assert_eq!((p.x, p.y), (10.0, -20.0));
    assert_eq!((p.scale_x, p.scale_y), (1.0, 1.0));
    assert_eq!(p.rotation, 0.0);
}

#[test]
fn equal_skews_are_pure_rotation() {
    let e = crate::scene::model::Element::instance("a", "b").with_pose(0.0, 0.0, 30.0, 2.0, 0.5);
    let p = decompose(&e, false, None);
    assert_eq!(p.rotation, -30.0);
    assert_eq!((p.shear_x, p.shear_y), (0.0, 0.0));
    assert_eq!((p.scale_x, p.scale_y), (2.0, 0.5));
}

#[test]
fn differing_skews_are_pure_shear() {
    let mut e = crate::scene::model::Element::instance("a", "b");
    e.rotation = 12.0;
    e.skew_x = 10.0;
    e.skew_y = 25.0;
    let p = decompose(&e, false, None);
    assert_eq!(p.rotation, 0.0);
    assert_eq!((p.shear_x, p.shear_y), (-10.0, -25.0));
}

#[test]
fn raw_shape_uses_direct_position_unless_masked() {
    let mut e = crate::scene::model::Element::shape("M0 0 L1 0 L1 1 Z");
    e.matrix = crate::scene::model::MatrixDef::from_affine(Affine::translate((100.0, 100.0)));
    e.x = 3.0;
    e.y = 4.0;
    let free = decompose(&e, false, None);
    assert_eq!((free.x, free.y), (3.0, -4.0));
    let masked = decompose(&e, true, None);
    assert_eq!((masked.x, masked.y), (100.0, -100.0));
}

#[test]
fn anchor_is_rotated_and_scaled_into_parent_space() {
    let mut e = crate::scene::model::Element::instance("a", "b").with_pose(50.0, 0.0, 90.0, 2.0, 2.0);
    e.transformation_point = Some(PointDef::new(10.0, 0.0));
    let p = decompose(&e, false, None);
    // (10, 0) scaled by 2 then rotated 90deg clockwise (y down) lands at (0, 20) in source space.
    assert!(close(p.x, 50.0));
    assert!(close(p.y, -20.0));
    assert_eq!(anchor_offset(&e), Vec2::new(10.0, -0.0));
}

#[test]
fn previous_pose_does_not_change_output() {
    let e = crate::scene::model::Element::instance("a", "b").with_pose(1.0, 2.0, 45.0, 1.0, 1.0);
    let prev = Pose {
        rotation: 300.0,
        ..Pose::default()
    };
    assert_eq!(decompose(&e, false, None), decompose(&e, false, Some(&prev)));
}

#[test]
fn child_is_placed_relative_to_parent_anchor() {
    let mut parent = crate::scene::model::Element::instance("arm", "arm");
    parent.transformation_point = Some(PointDef::new(10.0, 4.0));
    let hand = crate::scene::model::Element::instance("hand", "h").with_pose(10.0, 4.0, 0.0, 1.0, 1.0);

    let p = child_pose(&hand, false, None, anchor_offset(&parent));
    assert!(close(p.x, 0.0));
    assert!(close(p.y, 0.0));

    let unanchored = child_pose(&hand, false, None, Vec2::ZERO);
    assert_eq!(unanchored, decompose(&hand, false, None));
}
