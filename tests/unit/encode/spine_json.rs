use super::*;
use crate::foundation::core::Rgba;
use crate::skeleton::model::{AttachmentKey, ClippingAttachment, Pose, RegionAttachment};

fn sample() -> Skeleton {
    let mut sk = Skeleton::new("hero");
    sk.ensure_bone("root", None);
    sk.ensure_bone("hero", Some("root")).pose = Pose {
        x: 10.0,
        rotation: -30.0,
        ..Pose::default()
    };
    sk.ensure_slot("front", "hero");
    let (back, _) = sk.ensure_slot("back", "hero");
    back.blend = SlotBlend::Additive;
    back.attachment = Some("img".into());
    sk.insert_attachment(
        "back",
        "img",
        Attachment::Region(RegionAttachment {
            path: "images/img.png".into(),
            x: 1.0,
            y: 2.0,
            width: 30.0,
            height: 40.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }),
    );
    sk.insert_attachment(
        "front",
        "front",
        Attachment::Clipping(ClippingAttachment {
            end: Some("back".into()),
            vertices: vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0],
        }),
    );
    let i = sk.animation_index("walk");
    let anim = &mut sk.animations[i];
    anim.bone_mut("hero").push_rotate(Keyframe {
        time: 0.0,
        value: 15.0,
        curve: Curve::Stepped,
    });
    anim.bone_mut("hero").push_translate(Keyframe {
        time: 0.5,
        value: Vec2::new(1.0, -1.0),
        curve: Curve::Bezier {
            cx1: 0.25,
            cy1: 0.0,
            cx2: 0.75,
            cy2: 1.0,
        },
    });
    anim.slot_mut("back").push_attachment(AttachmentKey {
        time: 0.25,
        name: None,
    });
    anim.slot_mut("back").push_color(Keyframe {
        time: 0.0,
        value: Rgba::WHITE,
        curve: Curve::Linear,
    });
    sk
}

#[test]
fn document_has_spine_sections() {
    let v = SpineJsonEncoder::default().to_value(&sample()).unwrap();
    assert_eq!(v["skeleton"]["spine"], "3.8.99");
    assert_eq!(v["bones"][0]["name"], "root");
    assert!(v["bones"][0].get("parent").is_none());
    assert_eq!(v["bones"][1]["parent"], "root");
    assert_eq!(v["bones"][1]["x"], 10.0);
    assert_eq!(v["bones"][1]["rotation"], -30.0);
    assert!(v["bones"][1].get("scaleX").is_none());
    assert_eq!(v["skins"][0]["name"], "default");
}

#[test]
fn slots_are_written_back_to_front() {
    let v = SpineJsonEncoder::default().to_value(&sample()).unwrap();
    assert_eq!(v["slots"][0]["name"], "back");
    assert_eq!(v["slots"][0]["blend"], "additive");
    assert_eq!(v["slots"][0]["color"], "ffffffff");
    assert_eq!(v["slots"][1]["name"], "front");
    assert!(v["slots"][1].get("blend").is_none());
}

#[test]
fn attachments_and_clipping_are_encoded() {
    let v = SpineJsonEncoder::default().to_value(&sample()).unwrap();
    let skin = &v["skins"][0]["attachments"];
    assert_eq!(skin["back"]["img"]["width"], 30.0);
    assert_eq!(skin["front"]["front"]["type"], "clipping");
    assert_eq!(skin["front"]["front"]["end"], "back");
    assert_eq!(skin["front"]["front"]["vertexCount"], 3);
}

#[test]
fn keyframes_carry_curves_and_null_attachments() {
    let v = SpineJsonEncoder::default().to_value(&sample()).unwrap();
    let walk = &v["animations"]["walk"];
    assert_eq!(walk["bones"]["hero"]["rotate"][0]["curve"], "stepped");
    let t = &walk["bones"]["hero"]["translate"][0];
    assert_eq!(t["curve"], 0.25);
    assert_eq!(t["c4"], 1.0);
    assert!(walk["slots"]["back"]["attachment"][0]["name"].is_null());
    assert!(walk["slots"]["back"]["color"][0].get("curve").is_none());
}

#[test]
fn dangling_clip_end_fails_to_encode() {
    let mut sk = sample();
    if let Some(Attachment::Clipping(c)) = sk.attachment_mut("front", "front") {
        c.end = Some("missing".into());
    }
    let err = SpineJsonEncoder::default().encode(&sk).unwrap_err();
    assert!(matches!(err, RigError::Encode(_)));
}

#[test]
fn encoded_bytes_parse_back() {
    let enc = SpineJsonEncoder {
        pretty: false,
        ..SpineJsonEncoder::default()
    };
    assert_eq!(enc.extension(), "json");
    let bytes = enc.encode(&sample()).unwrap();
    let v: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(v["animations"]["walk"].is_object());
}
