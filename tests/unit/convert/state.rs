use super::*;
use crate::skeleton::model::Pose;

fn key(v: &u32) -> NodeId {
    NodeId::of(v)
}

#[test]
fn shared_attachment_names_dedupe_by_identity() {
    let (a, b) = (1u32, 1u32);
    let mut st = BuildState::new("s");
    let first = st.shared_attachment_name(key(&a), "hand");
    let again = st.shared_attachment_name(key(&a), "ignored");
    let other = st.shared_attachment_name(key(&b), "hand");
    assert_eq!(first, "hand");
    assert_eq!(again, "hand");
    assert_eq!(other, "hand_2");
}

#[test]
fn layer_slots_filter_by_parent_bone_and_skip_duplicates() {
    let layer = 0u32;
    let mut st = BuildState::new("s");
    let entry = LayerSlot {
        slot: "a".into(),
        owner_bone: "p_l_a".into(),
        parent_bone: "p".into(),
    };
    st.register_layer_slot(key(&layer), entry.clone());
    st.register_layer_slot(key(&layer), entry);
    st.register_layer_slot(
        key(&layer),
        LayerSlot {
            slot: "b".into(),
            owner_bone: "q_l_b".into(),
            parent_bone: "q".into(),
        },
    );
    let under_p: Vec<_> = st.layer_slots(key(&layer), "p").collect();
    assert_eq!(under_p.len(), 1);
    assert_eq!(under_p[0].slot, "a");
}

#[test]
fn previous_rotation_is_scoped_to_active_animation() {
    let mut st = BuildState::new("s");
    st.begin_animation("walk");
    let walk = st.animation_index().unwrap();
    st.record_pose(
        "b",
        PoseSample {
            animation: walk,
            time: 0.5,
            rotate: 170.0,
            pose: Pose::default(),
        },
    );
    assert_eq!(st.previous_rotation("b"), Some((0.5, 170.0)));
    st.begin_animation("run");
    assert_eq!(st.previous_rotation("b"), None);
    assert!(st.previous_pose("b").is_some());
}

#[test]
fn finish_lists_images_in_first_use_order() {
    let mut st = BuildState::new("s");
    for p in ["b.png", "a.png", "b.png"] {
        st.insert_image(ImageDescriptor {
            path: p.into(),
            width: 1.0,
            height: 1.0,
            scale: 1.0,
            x: 0.0,
            y: 0.0,
        });
    }
    assert!(st.image("a.png").is_some());
    let out = st.finish();
    let paths: Vec<_> = out.images.iter().map(|d| d.path.as_str()).collect();
    assert_eq!(paths, ["b.png", "a.png"]);
}

#[test]
fn snapshot_restores_partial_writes() {
    let mut st = BuildState::new("s");
    st.skeleton.ensure_bone("root", None);
    let snapshot = st.clone();
    st.skeleton.ensure_bone("extra", Some("root"));
    st.diagnose(DiagnosticKind::UnsupportedBlend, "x");
    st = snapshot;
    assert!(st.skeleton().bone("extra").is_none());
    assert!(st.diagnostics().is_empty());
}

#[test]
fn structure_descent_is_recorded_once() {
    let tl = 0u32;
    let mut st = BuildState::new("s");
    assert!(st.is_structure());
    assert!(st.mark_structured("b", key(&tl)));
    assert!(!st.mark_structured("b", key(&tl)));
    assert!(st.mark_structured("c", key(&tl)));
}
