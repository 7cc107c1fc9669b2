use super::*;

#[test]
fn clamp01_bounds() {
    assert_eq!(clamp01(-0.5), 0.0);
    assert_eq!(clamp01(0.25), 0.25);
    assert_eq!(clamp01(1.5), 1.0);
}

#[test]
fn apply_linear_ignores_translation() {
    let m = Affine::new([2.0, 0.0, 0.0, 3.0, 100.0, 200.0]);
    let v = apply_linear(m, Vec2::new(1.0, 1.0));
    assert_eq!(v, Vec2::new(2.0, 3.0));
}

#[test]
fn flip_y_negates_vertical() {
    assert_eq!(flip_y(Vec2::new(4.0, 5.0)), Vec2::new(4.0, -5.0));
    assert!(approx_eq(0.1 + 0.2, 0.3, 1e-12));
}
