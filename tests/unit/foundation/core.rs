use super::*;

#[test]
fn node_id_is_reference_identity() {
    let a = vec![1u8, 2, 3];
    let b = a.clone();
    assert_eq!(NodeId::of(&a), NodeId::of(&a));
    assert_ne!(NodeId::of(&a), NodeId::of(&b));
}

#[test]
fn frame_rate_rejects_non_positive() {
    assert!(FrameRate::new(0.0).is_err());
    assert!(FrameRate::new(-24.0).is_err());
    assert!(FrameRate::new(f64::NAN).is_err());
    let fps = FrameRate::new(24.0).unwrap();
    assert_eq!(fps.frames_to_secs(12), 0.5);
}

#[test]
fn rgba_hex_rounds_and_clamps() {
    assert_eq!(Rgba::WHITE.to_hex(), "ffffffff");
    let c = Rgba {
        r: 0.5,
        g: 0.0,
        b: 2.0,
        a: -1.0,
    };
    assert_eq!(c.to_hex(), "8000ff00");
}
