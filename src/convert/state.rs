use crate::collab::export::ImageDescriptor;
use crate::foundation::core::NodeId;
use crate::scene::labels::FrameLabel;
use crate::skeleton::model::{Pose, Skeleton};
use std::collections::{HashMap, HashSet};

/// Which traversal is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassMode {
    /// Create bones, slots and attachments with their setup pose.
    Structure,
    /// Bake keyframes for one label range into the active animation.
    Animation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnsupportedGeometry,
    MissingMaskGeometry,
    UnsupportedBlend,
    ItemFailed,
}

/// A recoverable anomaly met during conversion.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

/// A slot created somewhere below a layer, and the element subtree it belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LayerSlot {
    pub(crate) slot: String,
    /// Bone of the element on that layer whose subtree holds the slot.
    pub(crate) owner_bone: String,
    /// Bone of the instance whose timeline owns the layer.
    pub(crate) parent_bone: String,
}

/// Last rotation written for a bone.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PoseSample {
    pub(crate) animation: usize,
    pub(crate) time: f64,
    pub(crate) rotate: f64,
    pub(crate) pose: Pose,
}

/// Result of converting one item (or a merged selection).
#[derive(Clone, Debug)]
pub struct ConvertedSkeleton {
    pub skeleton: Skeleton,
    /// Exported images in first-use order.
    pub images: Vec<ImageDescriptor>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Shared mutable root of one conversion run.
///
/// One value serves a single top-level item, or a whole selection in merge mode. Cloning
/// snapshots it so a failed item can be rolled back.
#[derive(Clone, Debug)]
pub struct BuildState {
    pub(crate) skeleton: Skeleton,
    images: HashMap<String, ImageDescriptor>,
    image_order: Vec<String>,
    /// Element or library item -> shared attachment name.
    shared_attachments: HashMap<NodeId, String>,
    attachment_names: HashSet<String>,
    /// Layer -> slots ever created below it.
    layer_slots: HashMap<NodeId, Vec<LayerSlot>>,
    /// Bone name -> last baked rotation.
    poses: HashMap<String, PoseSample>,
    /// (bone, timeline) pairs already descended during STRUCTURE.
    structured: HashSet<(String, NodeId)>,
    labels: Vec<FrameLabel>,
    mode: PassMode,
    animation: Option<usize>,
    diagnostics: Vec<Diagnostic>,
}

impl BuildState {
    pub fn new(skeleton_name: impl Into<String>) -> Self {
        Self {
            skeleton: Skeleton::new(skeleton_name),
            images: HashMap::new(),
            image_order: Vec::new(),
            shared_attachments: HashMap::new(),
            attachment_names: HashSet::new(),
            layer_slots: HashMap::new(),
            poses: HashMap::new(),
            structured: HashSet::new(),
            labels: Vec::new(),
            mode: PassMode::Structure,
            animation: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn mode(&self) -> PassMode {
        self.mode
    }

    pub fn labels(&self) -> &[FrameLabel] {
        &self.labels
    }

    pub(crate) fn set_labels(&mut self, labels: Vec<FrameLabel>) {
        self.labels = labels;
    }

    pub(crate) fn begin_structure(&mut self) {
        self.mode = PassMode::Structure;
        self.animation = None;
    }

    /// Switch to ANIMATION and make `name` the active animation, created on first use.
    pub(crate) fn begin_animation(&mut self, name: &str) {
        self.mode = PassMode::Animation;
        self.animation = Some(self.skeleton.animation_index(name));
    }

    pub(crate) fn animation_index(&self) -> Option<usize> {
        self.animation
    }

    pub(crate) fn is_structure(&self) -> bool {
        self.mode == PassMode::Structure
    }

    pub(crate) fn diagnose(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(?kind, "{message}");
        self.diagnostics.push(Diagnostic { kind, message });
    }

    /// Record the first STRUCTURE descent of `bone` into `timeline`; `false` if already done.
    pub(crate) fn mark_structured(&mut self, bone: &str, timeline: NodeId) -> bool {
        self.structured.insert((bone.to_string(), timeline))
    }

    /// Attachment name shared by every use of `key`, made unique against other keys.
    pub(crate) fn shared_attachment_name(&mut self, key: NodeId, base: &str) -> String {
        if let Some(name) = self.shared_attachments.get(&key) {
            return name.clone();
        }
        let mut name = base.to_string();
        let mut n = 2usize;
        while self.attachment_names.contains(&name) {
            name = format!("{base}_{n}");
            n += 1;
        }
        self.attachment_names.insert(name.clone());
        self.shared_attachments.insert(key, name.clone());
        name
    }

    pub(crate) fn image(&self, path: &str) -> Option<&ImageDescriptor> {
        self.images.get(path)
    }

    pub(crate) fn insert_image(&mut self, desc: ImageDescriptor) {
        if !self.images.contains_key(&desc.path) {
            self.image_order.push(desc.path.clone());
            self.images.insert(desc.path.clone(), desc);
        }
    }

    pub(crate) fn register_layer_slot(&mut self, layer: NodeId, entry: LayerSlot) {
        let slots = self.layer_slots.entry(layer).or_default();
        if !slots.contains(&entry) {
            slots.push(entry);
        }
    }

    /// Slots below `layer` within the instance bone `parent_bone`.
    pub(crate) fn layer_slots(
        &self,
        layer: NodeId,
        parent_bone: &str,
    ) -> impl Iterator<Item = &LayerSlot> {
        self.layer_slots
            .get(&layer)
            .into_iter()
            .flatten()
            .filter(move |s| s.parent_bone == parent_bone)
    }

    /// Previous rotation key of `bone` in the active animation.
    pub(crate) fn previous_rotation(&self, bone: &str) -> Option<(f64, f64)> {
        let anim = self.animation?;
        self.poses
            .get(bone)
            .filter(|s| s.animation == anim)
            .map(|s| (s.time, s.rotate))
    }

    pub(crate) fn previous_pose(&self, bone: &str) -> Option<&Pose> {
        self.poses.get(bone).map(|s| &s.pose)
    }

    pub(crate) fn record_pose(&mut self, bone: &str, sample: PoseSample) {
        self.poses.insert(bone.to_string(), sample);
    }

    pub fn finish(self) -> ConvertedSkeleton {
        let mut images = self.images;
        let images = self
            .image_order
            .iter()
            .filter_map(|p| images.remove(p))
            .collect();
        ConvertedSkeleton {
            skeleton: self.skeleton,
            images,
            diagnostics: self.diagnostics,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/convert/state.rs"]
mod tests;
