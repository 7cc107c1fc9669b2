use crate::foundation::core::{Rgba, Vec2};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Two keyframes closer than this (seconds) are treated as the same instant.
pub(crate) const TIME_EPSILON: f64 = 1e-6;

/// Local bone transform: position, rotation (degrees, counter-clockwise), scale and shear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub shear_x: f64,
    pub shear_y: f64,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            shear_x: 0.0,
            shear_y: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Bone {
    pub name: String,
    pub parent: Option<String>,
    /// Setup pose, fixed by the first STRUCTURE visit.
    pub pose: Pose,
    #[serde(skip)]
    pub initialized: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotBlend {
    #[default]
    Normal,
    Additive,
    Multiply,
    Screen,
}

#[derive(Debug, Clone, Serialize)]
pub struct Slot {
    pub name: String,
    pub bone: String,
    pub color: Rgba,
    /// Attachment shown in the setup pose.
    pub attachment: Option<String>,
    pub blend: SlotBlend,
    #[serde(skip)]
    pub initialized: bool,
}

/// Image placed in a slot, positioned relative to the slot's bone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionAttachment {
    /// Export path of the image, without extension handling.
    pub path: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

/// Polygon clipping every slot from its own slot up to and including `end` in draw order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClippingAttachment {
    pub end: Option<String>,
    /// Flat `[x0, y0, x1, y1, ...]` list in bone space.
    pub vertices: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Attachment {
    Region(RegionAttachment),
    Clipping(ClippingAttachment),
}

/// Interpolation from one keyframe to the next.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Curve {
    #[default]
    Linear,
    Stepped,
    Bezier {
        cx1: f64,
        cy1: f64,
        cx2: f64,
        cy2: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keyframe<T> {
    pub time: f64,
    pub value: T,
    pub curve: Curve,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachmentKey {
    pub time: f64,
    /// `None` hides the slot.
    pub name: Option<String>,
}

trait Timed {
    fn time(&self) -> f64;
    fn set_time(&mut self, time: f64);
}

impl<T> Timed for Keyframe<T> {
    fn time(&self) -> f64 {
        self.time
    }

    fn set_time(&mut self, time: f64) {
        self.time = time;
    }
}

impl Timed for AttachmentKey {
    fn time(&self) -> f64 {
        self.time
    }

    fn set_time(&mut self, time: f64) {
        self.time = time;
    }
}

/// Insert `key` keeping `keys` sorted by time.
///
/// A key at an existing instant replaces that key's value and curve but keeps its time.
fn insert_timed<K: Timed>(keys: &mut Vec<K>, key: K) {
    let t = key.time();
    match keys.last() {
        None => keys.push(key),
        Some(last) if t > last.time() + TIME_EPSILON => keys.push(key),
        _ => {
            let i = keys.partition_point(|k| k.time() < t - TIME_EPSILON);
            match keys.get_mut(i) {
                Some(existing) if (existing.time() - t).abs() <= TIME_EPSILON => {
                    let time = existing.time();
                    *existing = key;
                    existing.set_time(time);
                }
                _ => keys.insert(i, key),
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BoneTimelines {
    pub rotate: Vec<Keyframe<f64>>,
    pub translate: Vec<Keyframe<Vec2>>,
    pub scale: Vec<Keyframe<Vec2>>,
    pub shear: Vec<Keyframe<Vec2>>,
}

impl BoneTimelines {
    pub fn push_rotate(&mut self, key: Keyframe<f64>) {
        insert_timed(&mut self.rotate, key);
    }

    pub fn push_translate(&mut self, key: Keyframe<Vec2>) {
        insert_timed(&mut self.translate, key);
    }

    pub fn push_scale(&mut self, key: Keyframe<Vec2>) {
        insert_timed(&mut self.scale, key);
    }

    pub fn push_shear(&mut self, key: Keyframe<Vec2>) {
        insert_timed(&mut self.shear, key);
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SlotTimelines {
    pub attachment: Vec<AttachmentKey>,
    pub color: Vec<Keyframe<Rgba>>,
}

impl SlotTimelines {
    pub fn push_attachment(&mut self, key: AttachmentKey) {
        insert_timed(&mut self.attachment, key);
    }

    pub fn push_color(&mut self, key: Keyframe<Rgba>) {
        insert_timed(&mut self.color, key);
    }
}

/// One named animation, baked from one label range.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Animation {
    pub name: String,
    pub bones: BTreeMap<String, BoneTimelines>,
    pub slots: BTreeMap<String, SlotTimelines>,
}

impl Animation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn bone_mut(&mut self, bone: &str) -> &mut BoneTimelines {
        self.bones.entry(bone.to_string()).or_default()
    }

    pub fn slot_mut(&mut self, slot: &str) -> &mut SlotTimelines {
        self.slots.entry(slot.to_string()).or_default()
    }

    /// Time of the last key on any timeline.
    pub fn duration(&self) -> f64 {
        let bones = self.bones.values().flat_map(|b| {
            b.rotate
                .iter()
                .map(|k| k.time)
                .chain(b.translate.iter().map(|k| k.time))
                .chain(b.scale.iter().map(|k| k.time))
                .chain(b.shear.iter().map(|k| k.time))
        });
        let slots = self.slots.values().flat_map(|s| {
            s.attachment
                .iter()
                .map(|k| k.time)
                .chain(s.color.iter().map(|k| k.time))
        });
        bones.chain(slots).fold(0.0, f64::max)
    }
}

/// Skeleton under construction and, once finished, the conversion result.
///
/// Bones and slots are unique by name. `slots` holds creation order (front to back);
/// [`Skeleton::draw_order`] yields the back-to-front order renderers expect.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Skeleton {
    pub name: String,
    pub bones: Vec<Bone>,
    pub slots: Vec<Slot>,
    /// Attachments per slot, keyed by attachment name.
    pub attachments: BTreeMap<String, BTreeMap<String, Attachment>>,
    pub animations: Vec<Animation>,
    #[serde(skip)]
    bone_index: HashMap<String, usize>,
    #[serde(skip)]
    slot_index: HashMap<String, usize>,
}

impl Skeleton {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.bone_index.get(name).map(|&i| &self.bones[i])
    }

    pub fn bone_mut(&mut self, name: &str) -> Option<&mut Bone> {
        let i = *self.bone_index.get(name)?;
        self.bones.get_mut(i)
    }

    /// Get the bone `name`, creating an uninitialized one under `parent` on first use.
    pub fn ensure_bone(&mut self, name: &str, parent: Option<&str>) -> &mut Bone {
        let i = match self.bone_index.get(name) {
            Some(&i) => i,
            None => {
                self.bones.push(Bone {
                    name: name.to_string(),
                    parent: parent.map(str::to_string),
                    pose: Pose::default(),
                    initialized: false,
                });
                let i = self.bones.len() - 1;
                self.bone_index.insert(name.to_string(), i);
                i
            }
        };
        &mut self.bones[i]
    }

    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slot_index.get(name).map(|&i| &self.slots[i])
    }

    pub fn slot_mut(&mut self, name: &str) -> Option<&mut Slot> {
        let i = *self.slot_index.get(name)?;
        self.slots.get_mut(i)
    }

    /// Get the slot `name`, creating an uninitialized one on `bone` on first use.
    ///
    /// The returned flag is `true` when the slot was created by this call.
    pub fn ensure_slot(&mut self, name: &str, bone: &str) -> (&mut Slot, bool) {
        let (i, created) = match self.slot_index.get(name) {
            Some(&i) => (i, false),
            None => {
                self.slots.push(Slot {
                    name: name.to_string(),
                    bone: bone.to_string(),
                    color: Rgba::WHITE,
                    attachment: None,
                    blend: SlotBlend::Normal,
                    initialized: false,
                });
                let i = self.slots.len() - 1;
                self.slot_index.insert(name.to_string(), i);
                (i, true)
            }
        };
        (&mut self.slots[i], created)
    }

    /// Move slot `name` to the end of creation order, behind every slot created so far.
    pub(crate) fn move_slot_to_end(&mut self, name: &str) {
        let Some(&i) = self.slot_index.get(name) else {
            return;
        };
        let slot = self.slots.remove(i);
        self.slots.push(slot);
        self.reindex_slots();
    }

    fn reindex_slots(&mut self) {
        self.slot_index.clear();
        for (i, s) in self.slots.iter().enumerate() {
            self.slot_index.insert(s.name.clone(), i);
        }
    }

    /// Slots back to front.
    pub fn draw_order(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().rev()
    }

    pub fn attachment(&self, slot: &str, name: &str) -> Option<&Attachment> {
        self.attachments.get(slot)?.get(name)
    }

    pub fn attachment_mut(&mut self, slot: &str, name: &str) -> Option<&mut Attachment> {
        self.attachments.get_mut(slot)?.get_mut(name)
    }

    /// Register `attachment` under `slot`; an existing attachment of the same name is kept.
    pub fn insert_attachment(&mut self, slot: &str, name: &str, attachment: Attachment) {
        self.attachments
            .entry(slot.to_string())
            .or_default()
            .entry(name.to_string())
            .or_insert(attachment);
    }

    /// Index of animation `name`, created empty on first use.
    pub fn animation_index(&mut self, name: &str) -> usize {
        if let Some(i) = self.animations.iter().position(|a| a.name == name) {
            return i;
        }
        self.animations.push(Animation::new(name));
        self.animations.len() - 1
    }

    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.iter().find(|a| a.name == name)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/skeleton/model.rs"]
mod tests;
