use crate::encode::SkeletonEncoder;
use crate::foundation::core::Vec2;
use crate::foundation::error::{RigError, RigResult};
use crate::skeleton::model::{
    Attachment, BoneTimelines, Curve, Keyframe, Skeleton, SlotBlend, SlotTimelines,
};
use serde_json::{Map, Value, json};

/// Spine 3.8 style JSON.
#[derive(Clone, Debug)]
pub struct SpineJsonEncoder {
    /// Runtime version written to `skeleton.spine`.
    pub version: String,
    /// Image root written to `skeleton.images`.
    pub images_path: String,
    pub pretty: bool,
}

impl Default for SpineJsonEncoder {
    fn default() -> Self {
        Self {
            version: "3.8.99".to_string(),
            images_path: "./".to_string(),
            pretty: true,
        }
    }
}

impl SkeletonEncoder for SpineJsonEncoder {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn encode(&self, skeleton: &Skeleton) -> RigResult<Vec<u8>> {
        let doc = self.to_value(skeleton)?;
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&doc)
        } else {
            serde_json::to_vec(&doc)
        };
        bytes.map_err(|e| RigError::encode(format!("write skeleton JSON: {e}")))
    }
}

impl SpineJsonEncoder {
    /// Build the JSON document for `skeleton`.
    pub fn to_value(&self, skeleton: &Skeleton) -> RigResult<Value> {
        let bones: Vec<Value> = skeleton
            .bones
            .iter()
            .map(|b| {
                let mut o = Map::new();
                o.insert("name".into(), json!(b.name));
                if let Some(p) = &b.parent {
                    o.insert("parent".into(), json!(p));
                }
                let p = &b.pose;
                put_nonzero(&mut o, "x", p.x, 0.0);
                put_nonzero(&mut o, "y", p.y, 0.0);
                put_nonzero(&mut o, "rotation", p.rotation, 0.0);
                put_nonzero(&mut o, "scaleX", p.scale_x, 1.0);
                put_nonzero(&mut o, "scaleY", p.scale_y, 1.0);
                put_nonzero(&mut o, "shearX", p.shear_x, 0.0);
                put_nonzero(&mut o, "shearY", p.shear_y, 0.0);
                Value::Object(o)
            })
            .collect();

        let slots: Vec<Value> = skeleton
            .draw_order()
            .map(|s| {
                let mut o = Map::new();
                o.insert("name".into(), json!(s.name));
                o.insert("bone".into(), json!(s.bone));
                o.insert("color".into(), json!(s.color.to_hex()));
                if let Some(a) = &s.attachment {
                    o.insert("attachment".into(), json!(a));
                }
                if s.blend != SlotBlend::Normal {
                    o.insert("blend".into(), json!(blend_name(s.blend)));
                }
                Value::Object(o)
            })
            .collect();

        let mut skin = Map::new();
        for (slot, attachments) in &skeleton.attachments {
            let mut per_slot = Map::new();
            for (name, attachment) in attachments {
                per_slot.insert(name.clone(), attachment_value(attachment, skeleton)?);
            }
            skin.insert(slot.clone(), Value::Object(per_slot));
        }

        let mut animations = Map::new();
        for anim in &skeleton.animations {
            let mut a = Map::new();
            let bones: Map<String, Value> = anim
                .bones
                .iter()
                .filter_map(|(name, t)| bone_timelines(t).map(|v| (name.clone(), v)))
                .collect();
            if !bones.is_empty() {
                a.insert("bones".into(), Value::Object(bones));
            }
            let slots: Map<String, Value> = anim
                .slots
                .iter()
                .filter_map(|(name, t)| slot_timelines(t).map(|v| (name.clone(), v)))
                .collect();
            if !slots.is_empty() {
                a.insert("slots".into(), Value::Object(slots));
            }
            animations.insert(anim.name.clone(), Value::Object(a));
        }

        Ok(json!({
            "skeleton": {
                "spine": self.version,
                "images": self.images_path,
                "name": skeleton.name,
            },
            "bones": bones,
            "slots": slots,
            "skins": [{ "name": "default", "attachments": skin }],
            "animations": animations,
        }))
    }
}

fn put_nonzero(o: &mut Map<String, Value>, key: &str, v: f64, neutral: f64) {
    if (v - neutral).abs() > 1e-9 {
        o.insert(key.into(), json!(round(v)));
    }
}

fn round(v: f64) -> f64 {
    (v * 1e4).round() / 1e4
}

fn blend_name(b: SlotBlend) -> &'static str {
    match b {
        SlotBlend::Normal => "normal",
        SlotBlend::Additive => "additive",
        SlotBlend::Multiply => "multiply",
        SlotBlend::Screen => "screen",
    }
}

fn attachment_value(attachment: &Attachment, skeleton: &Skeleton) -> RigResult<Value> {
    match attachment {
        Attachment::Region(r) => Ok(json!({
            "path": r.path,
            "x": round(r.x),
            "y": round(r.y),
            "width": round(r.width),
            "height": round(r.height),
            "scaleX": round(r.scale_x),
            "scaleY": round(r.scale_y),
        })),
        Attachment::Clipping(c) => {
            if c.vertices.len() % 2 != 0 {
                return Err(RigError::encode("clipping polygon has an odd coordinate count"));
            }
            let mut o = Map::new();
            o.insert("type".into(), json!("clipping"));
            if let Some(end) = &c.end {
                if skeleton.slot(end).is_none() {
                    return Err(RigError::encode(format!(
                        "clipping end slot '{end}' does not exist"
                    )));
                }
                o.insert("end".into(), json!(end));
            }
            o.insert("vertexCount".into(), json!(c.vertices.len() / 2));
            o.insert(
                "vertices".into(),
                json!(c.vertices.iter().copied().map(round).collect::<Vec<_>>()),
            );
            Ok(Value::Object(o))
        }
    }
}

fn keyed<T>(k: &Keyframe<T>, mut o: Map<String, Value>) -> Value {
    o.insert("time".into(), json!(round(k.time)));
    match k.curve {
        Curve::Linear => {}
        Curve::Stepped => {
            o.insert("curve".into(), json!("stepped"));
        }
        Curve::Bezier { cx1, cy1, cx2, cy2 } => {
            o.insert("curve".into(), json!(round(cx1)));
            o.insert("c2".into(), json!(round(cy1)));
            o.insert("c3".into(), json!(round(cx2)));
            o.insert("c4".into(), json!(round(cy2)));
        }
    }
    Value::Object(o)
}

fn pairs(keys: &[Keyframe<Vec2>]) -> Vec<Value> {
    keys.iter()
        .map(|k| {
            let mut o = Map::new();
            o.insert("x".into(), json!(round(k.value.x)));
            o.insert("y".into(), json!(round(k.value.y)));
            keyed(k, o)
        })
        .collect()
}

fn bone_timelines(t: &BoneTimelines) -> Option<Value> {
    let mut o = Map::new();
    if !t.rotate.is_empty() {
        let keys: Vec<Value> = t
            .rotate
            .iter()
            .map(|k| {
                let mut m = Map::new();
                m.insert("angle".into(), json!(round(k.value)));
                keyed(k, m)
            })
            .collect();
        o.insert("rotate".into(), json!(keys));
    }
    for (name, keys) in [
        ("translate", &t.translate),
        ("scale", &t.scale),
        ("shear", &t.shear),
    ] {
        if !keys.is_empty() {
            o.insert(name.into(), json!(pairs(keys)));
        }
    }
    (!o.is_empty()).then_some(Value::Object(o))
}

fn slot_timelines(t: &SlotTimelines) -> Option<Value> {
    let mut o = Map::new();
    if !t.attachment.is_empty() {
        let keys: Vec<Value> = t
            .attachment
            .iter()
            .map(|k| json!({ "time": round(k.time), "name": k.name }))
            .collect();
        o.insert("attachment".into(), json!(keys));
    }
    if !t.color.is_empty() {
        let keys: Vec<Value> = t
            .color
            .iter()
            .map(|k| {
                let mut m = Map::new();
                m.insert("color".into(), json!(k.value.to_hex()));
                keyed(k, m)
            })
            .collect();
        o.insert("color".into(), json!(keys));
    }
    (!o.is_empty()).then_some(Value::Object(o))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/spine_json.rs"]
mod tests;
