use super::*;
use crate::scene::model::{ColorAdjust, TweenKind};
use std::collections::BTreeMap;

fn doc() -> Document {
    Document {
        frame_rate: 24.0,
        library: BTreeMap::new(),
        selection: Vec::new(),
    }
}

#[test]
fn descent_links_parent_without_changing_it() {
    let doc = doc();
    let mut outer = Element::instance("outer", "sym");
    outer.color = ColorAdjust {
        alpha_percent: 50.0,
        ..ColorAdjust::default()
    };
    outer.blend = BlendMode::Add;
    let inner = Element::instance("inner", "sym2");
    let layer = Layer::default();
    let frame = Frame {
        tween: TweenKind::Classic,
        ..Frame::default()
    };

    let root = ConversionContext::root(&doc, "root");
    let top = root.top_level(&outer, "outer");
    let child = top.descend(Placement {
        layer: &layer,
        frame: &frame,
        element: &inner,
        bone: "outer_l_inner",
        time: 0.25,
    });

    assert_eq!(top.tint.depth(), 1);
    assert_eq!(child.tint.depth(), 2);
    assert_eq!(child.depth, 2);
    assert_eq!(child.blend, BlendMode::Add);
    assert_eq!(top.time, 0.0);
    assert_eq!(child.time, 0.25);
    assert_eq!(child.path(), "root/outer/outer_l_inner");
    assert_eq!(child.ancestors().count(), 3);
    assert_eq!(child.frames().count(), 1);
}

#[test]
fn inner_non_normal_blend_wins() {
    let doc = doc();
    let mut outer = Element::instance("o", "s");
    outer.blend = BlendMode::Multiply;
    let mut inner = Element::instance("i", "s");
    inner.blend = BlendMode::Screen;
    let layer = Layer::default();
    let frame = Frame::default();

    let root = ConversionContext::root(&doc, "root");
    let top = root.top_level(&outer, "o");
    let child = top.descend(Placement {
        layer: &layer,
        frame: &frame,
        element: &inner,
        bone: "i",
        time: 0.0,
    });
    assert_eq!(child.blend, BlendMode::Screen);
}

#[test]
fn masked_run_follows_layer_kind() {
    let doc = doc();
    let el = Element::shape("M0,0 L1,0 L1,1 Z");
    let layer = Layer {
        kind: LayerKind::Masked,
        ..Layer::default()
    };
    let frame = Frame::default();
    let root = ConversionContext::root(&doc, "root");
    let child = root.descend(Placement {
        layer: &layer,
        frame: &frame,
        element: &el,
        bone: "b",
        time: 0.0,
    });
    assert!(child.in_masked_run());
    assert!(!root.in_masked_run());
}
