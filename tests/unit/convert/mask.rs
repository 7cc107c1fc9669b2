use super::*;
use crate::scene::model::{Frame, LibraryItem, MatrixDef};
use std::collections::BTreeMap;

fn timeline(name: &str, kind: LayerKind, elements: Vec<Element>) -> Timeline {
    Timeline {
        name: name.into(),
        layers: vec![Layer {
            name: "l".into(),
            kind,
            frames: vec![Frame {
                elements,
                ..Frame::default()
            }],
        }],
    }
}

fn doc(items: Vec<(&str, Timeline)>) -> Document {
    let library: BTreeMap<String, LibraryItem> = items
        .into_iter()
        .map(|(k, t)| (k.to_string(), LibraryItem::Symbol(t)))
        .collect();
    Document {
        frame_rate: 24.0,
        library,
        selection: Vec::new(),
    }
}

#[test]
fn nested_shape_accumulates_instance_matrices() {
    let mut inner = Element::instance("inner", "leaf");
    inner.matrix = MatrixDef::from_affine(Affine::translate((5.0, 7.0)));
    let d = doc(vec![
        ("outer", timeline("outer", LayerKind::Normal, vec![inner])),
        (
            "leaf",
            timeline(
                "leaf",
                LayerKind::Normal,
                vec![Element::shape("M0,0 L1,0 L1,1 Z")],
            ),
        ),
    ]);
    let outer = d.symbol("outer").unwrap();
    let (shape, m) = find_mask_shape(&d, outer, Affine::IDENTITY, 1, 8)
        .unwrap()
        .unwrap();
    assert!(shape.is_shape());
    assert_eq!(m.translation(), crate::foundation::core::Vec2::new(5.0, 7.0));
}

#[test]
fn guide_layers_and_bitmaps_are_not_mask_geometry() {
    let d = doc(vec![(
        "m",
        timeline(
            "m",
            LayerKind::Guide,
            vec![Element::shape("M0,0 L1,0 L1,1 Z")],
        ),
    )]);
    let m = d.symbol("m").unwrap();
    assert!(find_mask_shape(&d, m, Affine::IDENTITY, 1, 8).unwrap().is_none());
}

#[test]
fn self_referencing_mask_symbol_trips_depth_guard() {
    let d = doc(vec![(
        "loop",
        timeline(
            "loop",
            LayerKind::Normal,
            vec![Element::instance("again", "loop")],
        ),
    )]);
    let m = d.symbol("loop").unwrap();
    let err = find_mask_shape(&d, m, Affine::IDENTITY, 1, 4).unwrap_err();
    assert!(matches!(err, RigError::DepthExceeded { limit: 4, .. }));
}
