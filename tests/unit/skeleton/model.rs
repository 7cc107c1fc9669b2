use super::*;

fn key(time: f64, value: f64) -> Keyframe<f64> {
    Keyframe {
        time,
        value,
        curve: Curve::Linear,
    }
}

#[test]
fn ensure_bone_is_idempotent_by_name() {
    let mut s = Skeleton::new("s");
    s.ensure_bone("root", None).initialized = true;
    s.ensure_bone("arm", Some("root"));
    let again = s.ensure_bone("arm", Some("elsewhere"));
    assert_eq!(again.parent.as_deref(), Some("root"));
    assert_eq!(s.bones.len(), 2);
    assert!(s.bone("root").unwrap().initialized);
}

#[test]
fn ensure_slot_reports_creation_once() {
    let mut s = Skeleton::new("s");
    let (_, created) = s.ensure_slot("a", "root");
    assert!(created);
    let (_, created) = s.ensure_slot("a", "root");
    assert!(!created);
    assert_eq!(s.slots.len(), 1);
}

#[test]
fn draw_order_reverses_creation_and_move_goes_behind() {
    let mut s = Skeleton::new("s");
    for n in ["top", "mid", "clip", "bottom"] {
        s.ensure_slot(n, "root");
    }
    s.move_slot_to_end("clip");
    let order: Vec<_> = s.draw_order().map(|sl| sl.name.as_str()).collect();
    assert_eq!(order, ["clip", "bottom", "mid", "top"]);
    assert_eq!(s.slot("mid").unwrap().name, "mid");
}

#[test]
fn keys_stay_sorted_and_same_instant_replaces() {
    let mut t = BoneTimelines::default();
    t.push_rotate(key(0.0, 1.0));
    t.push_rotate(key(1.0, 2.0));
    t.push_rotate(key(0.5, 3.0));
    t.push_rotate(key(1.0 + 1e-9, 4.0));
    let times: Vec<_> = t.rotate.iter().map(|k| k.time).collect();
    assert_eq!(times, [0.0, 0.5, 1.0]);
    assert_eq!(t.rotate[2].value, 4.0);
}

#[test]
fn repeated_visits_do_not_drift_key_times() {
    let mut t = SlotTimelines::default();
    t.push_attachment(AttachmentKey {
        time: 0.25,
        name: Some("a".into()),
    });
    for i in 1..=5 {
        t.push_attachment(AttachmentKey {
            time: 0.25 + i as f64 * 1e-7,
            name: None,
        });
    }
    assert_eq!(t.attachment.len(), 1);
    assert_eq!(t.attachment[0].time, 0.25);
    assert_eq!(t.attachment[0].name, None);
}

#[test]
fn insert_attachment_keeps_first() {
    let mut s = Skeleton::new("s");
    let clip = |n: usize| {
        Attachment::Clipping(ClippingAttachment {
            end: None,
            vertices: vec![0.0; n],
        })
    };
    s.insert_attachment("slot", "mask", clip(6));
    s.insert_attachment("slot", "mask", clip(8));
    let Some(Attachment::Clipping(c)) = s.attachment("slot", "mask") else {
        panic!("expected clipping attachment");
    };
    assert_eq!(c.vertices.len(), 6);
}

#[test]
fn animation_duration_spans_all_timelines() {
    let mut anim = Animation::new("walk");
    anim.bone_mut("b").push_rotate(key(0.25, 0.0));
    anim.slot_mut("s").push_attachment(AttachmentKey {
        time: 1.5,
        name: None,
    });
    assert_eq!(anim.duration(), 1.5);

    let mut s = Skeleton::new("s");
    let i = s.animation_index("walk");
    assert_eq!(s.animation_index("walk"), i);
    assert!(s.animation("walk").is_some());
}
