use crate::collab::export::{ExportRequest, ImageExporter};
use crate::collab::geometry::OutlineFlattener;
use crate::collab::naming::Naming;
use crate::config::ConvertConfig;
use crate::convert::context::{ConversionContext, Placement};
use crate::convert::curve::{select_curve, unwrap_rotation};
use crate::convert::decompose::child_pose;
use crate::convert::mask::MaskRun;
use crate::convert::state::{BuildState, DiagnosticKind, LayerSlot, PoseSample};
use crate::foundation::core::{FrameRate, NodeId, Vec2};
use crate::foundation::error::{RigError, RigResult};
use crate::scene::labels::derive_labels;
use crate::scene::model::{
    BlendMode, Document, Element, ElementKind, Frame, Layer, LayerKind, LoopMode, Timeline,
};
use crate::skeleton::model::{
    Attachment, AttachmentKey, Keyframe, RegionAttachment, SlotBlend,
};
use std::collections::HashMap;

/// Which nested frames a timeline visit covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Playback {
    /// Nested frame index played at window offset 0.
    pub(crate) start: usize,
    /// Number of frames to play.
    pub(crate) window: usize,
    pub(crate) looping: LoopMode,
}

impl Playback {
    pub(crate) fn once(start: usize, window: usize) -> Self {
        Self {
            start,
            window,
            looping: LoopMode::PlayOnce,
        }
    }

    /// Nested frame index shown at window offset `k` of a timeline with `n > 0` frames.
    pub(crate) fn index(&self, k: usize, n: usize) -> usize {
        match self.looping {
            LoopMode::Loop => (self.start + k) % n,
            LoopMode::PlayOnce => (self.start + k).min(n - 1),
            LoopMode::SingleFrame => self.start.min(n - 1),
        }
    }
}

/// A frame visit inside a layer.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Step<'a> {
    /// Offset within the playback window.
    pub(crate) offset: usize,
    pub(crate) index: usize,
    pub(crate) frame: Option<&'a Frame>,
}

/// Frames of `layer` to process: the first offset, every later offset where a new frame
/// starts, and every offset where the layer runs out of frames.
pub(crate) fn frame_steps(layer: &Layer, playback: Playback, n: usize) -> Vec<Step<'_>> {
    let mut steps = Vec::new();
    if n == 0 {
        return steps;
    }
    let mut prev: Option<(usize, bool)> = None;
    for offset in 0..playback.window {
        let index = playback.index(offset, n);
        let frame = layer.frame_at(index);
        let take = match (prev, frame) {
            (None, _) => true,
            (Some((p, _)), Some(f)) => f.start == index && index != p,
            (Some((_, had_frame)), None) => had_frame,
        };
        if take {
            steps.push(Step {
                offset,
                index,
                frame,
            });
        }
        prev = Some((index, frame.is_some()));
    }
    steps
}

/// Two-pass converter from scene graph to skeleton.
///
/// The STRUCTURE pass creates every bone, slot and attachment with its setup pose; one
/// ANIMATION pass per frame label then keys the same nodes, found again by name.
pub struct Converter<'c> {
    pub(crate) config: &'c ConvertConfig,
    pub(crate) naming: &'c dyn Naming,
    pub(crate) flattener: &'c dyn OutlineFlattener,
    exporter: &'c mut dyn ImageExporter,
}

impl<'c> Converter<'c> {
    pub fn new(
        config: &'c ConvertConfig,
        naming: &'c dyn Naming,
        flattener: &'c dyn OutlineFlattener,
        exporter: &'c mut dyn ImageExporter,
    ) -> Self {
        Self {
            config,
            naming,
            flattener,
            exporter,
        }
    }

    pub fn config(&self) -> &ConvertConfig {
        self.config
    }

    /// Bone name of a top-level item.
    pub fn item_name(&self, element: &Element) -> RigResult<String> {
        let raw = if element.name.trim().is_empty() {
            element.item_name().unwrap_or_default()
        } else {
            element.name.as_str()
        };
        if raw.trim().is_empty() {
            return Err(RigError::missing_identity(
                "top-level item has neither a name nor a library reference",
            ));
        }
        Ok(self.naming.sanitize(raw))
    }

    /// Convert one top-level symbol instance into `state`.
    ///
    /// Runs the STRUCTURE pass, then one ANIMATION pass per label of the item's timeline.
    #[tracing::instrument(skip_all, fields(item = element.item_name().unwrap_or_default()))]
    pub fn convert_item<'a>(
        &mut self,
        state: &mut BuildState,
        doc: &'a Document,
        element: &'a Element,
    ) -> RigResult<()> {
        let bone = self.item_name(element)?;
        let ElementKind::Instance { item, .. } = &element.kind else {
            return Err(RigError::validation(format!(
                "top-level item '{bone}' is not a symbol instance"
            )));
        };
        let timeline = doc
            .symbol(item)
            .ok_or_else(|| RigError::validation(format!("unknown symbol '{item}'")))?;
        let fps = doc.frame_rate()?;
        let n = timeline.frame_count();
        let labels = derive_labels(timeline, &self.config.default_label);
        state.set_labels(labels.clone());

        state.skeleton.ensure_bone(&self.config.root_bone, None).initialized = true;
        let root = ConversionContext::root(doc, self.config.root_bone.as_str());
        let top = root.top_level(element, &bone);

        state.begin_structure();
        tracing::debug!(bone = %bone, frames = n, "structure pass");
        self.enter_element(state, &top, Playback::once(0, n))?;

        for label in &labels {
            state.begin_animation(&label.name);
            tracing::debug!(
                label = %label.name,
                start = label.start,
                end = label.end,
                secs = fps.frames_to_secs(label.frame_count()),
                "animation pass"
            );
            self.enter_element(state, &top, Playback::once(label.start, label.frame_count()))?;
        }
        Ok(())
    }

    /// Set up or key the bone of `ctx`, then convert the element's content.
    pub(crate) fn enter_element<'a>(
        &mut self,
        state: &mut BuildState,
        ctx: &ConversionContext<'a, '_>,
        playback: Playback,
    ) -> RigResult<()> {
        self.check_depth(ctx)?;
        let Some(element) = ctx.element else {
            return Ok(());
        };
        self.bone(state, ctx);

        match &element.kind {
            ElementKind::Instance { item, .. } if self.naming.is_primitive(item) => {
                let key = ctx
                    .doc
                    .library
                    .get(item)
                    .map_or(NodeId::of(element), NodeId::of);
                self.leaf(state, ctx, key, item)
            }
            ElementKind::Instance { item, .. } => {
                let timeline = ctx
                    .doc
                    .symbol(item)
                    .ok_or_else(|| RigError::validation(format!("unknown symbol '{item}'")))?;
                if state.is_structure() {
                    if !state.mark_structured(&ctx.bone, NodeId::of(timeline)) {
                        return Ok(());
                    }
                    let n = timeline.frame_count();
                    return self.convert_timeline(state, ctx, timeline, Playback::once(0, n));
                }
                self.convert_timeline(state, ctx, timeline, playback)
            }
            ElementKind::Bitmap { item } => {
                let key = ctx
                    .doc
                    .library
                    .get(item)
                    .map_or(NodeId::of(element), NodeId::of);
                self.leaf(state, ctx, key, item)
            }
            ElementKind::Shape { .. } | ElementKind::Text { .. } => {
                self.leaf(state, ctx, NodeId::of(element), &ctx.bone)
            }
        }
    }

    pub(crate) fn check_depth(&self, ctx: &ConversionContext<'_, '_>) -> RigResult<()> {
        if ctx.depth > self.config.max_depth {
            return Err(RigError::DepthExceeded {
                depth: ctx.depth,
                limit: self.config.max_depth,
                path: ctx.path(),
            });
        }
        Ok(())
    }

    /// Convert the layers of `timeline`, topmost first, tracking masked runs.
    fn convert_timeline<'a>(
        &mut self,
        state: &mut BuildState,
        ctx: &ConversionContext<'a, '_>,
        timeline: &'a Timeline,
        playback: Playback,
    ) -> RigResult<()> {
        let n = timeline.frame_count();
        if n == 0 {
            return Ok(());
        }
        let fps = ctx.doc.frame_rate()?;
        let mut run = MaskRun::default();

        for (li, layer) in timeline.layers.iter().enumerate().rev() {
            match layer.kind {
                LayerKind::Guide | LayerKind::Folder => continue,
                LayerKind::Mask => self.close_clip(state, &mut run),
                LayerKind::Normal => {
                    self.close_clip(state, &mut run);
                    self.convert_layer(state, ctx, layer, playback, n, fps)?;
                }
                LayerKind::Masked => {
                    if run.mask.is_none() {
                        let above = timeline.layers.get(li + 1..).unwrap_or_default();
                        if let Some(mask) = above.iter().find(|l| l.kind == LayerKind::Mask) {
                            run.mask = Some(NodeId::of(mask));
                            run.clip = self.convert_mask(state, ctx, mask, playback, n)?;
                        }
                    }
                    self.convert_layer(state, ctx, layer, playback, n, fps)?;
                }
            }
        }
        self.close_clip(state, &mut run);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn convert_layer<'a>(
        &mut self,
        state: &mut BuildState,
        ctx: &ConversionContext<'a, '_>,
        layer: &'a Layer,
        playback: Playback,
        n: usize,
        fps: FrameRate,
    ) -> RigResult<()> {
        let steps = frame_steps(layer, playback, n);
        for (i, step) in steps.iter().enumerate() {
            let next = steps.get(i + 1).map_or(playback.window, |s| s.offset);
            let time = if state.is_structure() {
                0.0
            } else {
                ctx.time + fps.frames_to_secs(step.offset)
            };
            self.process_frame(state, ctx, layer, *step, next - step.offset, time)?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn process_frame<'a>(
        &mut self,
        state: &mut BuildState,
        ctx: &ConversionContext<'a, '_>,
        layer: &'a Layer,
        step: Step<'a>,
        window: usize,
        time: f64,
    ) -> RigResult<()> {
        let elements: &'a [Element] = step.frame.map_or(&[], |f| f.elements.as_slice());
        let bones = self.element_bones(ctx, layer, elements)?;
        if !state.is_structure() {
            self.hide_absent(state, ctx, layer, &bones, time);
        }
        let Some(frame) = step.frame else {
            return Ok(());
        };

        for (element, bone) in elements.iter().zip(&bones) {
            let child = ctx.descend(Placement {
                layer,
                frame,
                element,
                bone,
                time,
            });
            let nested = match &element.kind {
                ElementKind::Instance {
                    first_frame,
                    looping: LoopMode::SingleFrame,
                    ..
                } => Playback {
                    start: *first_frame,
                    window,
                    looping: LoopMode::SingleFrame,
                },
                ElementKind::Instance {
                    first_frame,
                    looping,
                    ..
                } => Playback {
                    start: first_frame + (step.index - frame.start),
                    window,
                    looping: *looping,
                },
                _ => Playback::once(0, window),
            };
            self.enter_element(state, &child, nested)?;
        }
        Ok(())
    }

    /// Bone names for the elements of one frame, in element order.
    ///
    /// Repeats of the same identity within the frame get `_2`, `_3`, ... suffixes.
    pub(crate) fn element_bones(
        &self,
        ctx: &ConversionContext<'_, '_>,
        layer: &Layer,
        elements: &[Element],
    ) -> RigResult<Vec<String>> {
        if elements.is_empty() {
            return Ok(Vec::new());
        }
        if layer.name.trim().is_empty() {
            return Err(RigError::missing_identity(format!(
                "unnamed layer under '{}'",
                ctx.bone
            )));
        }
        let layer_part = self.naming.sanitize(&layer.name);
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut bones = Vec::with_capacity(elements.len());
        for element in elements {
            let raw = match &element.kind {
                _ if !element.name.trim().is_empty() => element.name.as_str(),
                ElementKind::Instance { item, .. } | ElementKind::Bitmap { item }
                    if !item.trim().is_empty() =>
                {
                    item.as_str()
                }
                ElementKind::Instance { .. } | ElementKind::Bitmap { .. } => {
                    return Err(RigError::missing_identity(format!(
                        "element on layer '{}' under '{}' has no name or library reference",
                        layer.name, ctx.bone
                    )));
                }
                ElementKind::Shape { .. } => "shape",
                ElementKind::Text { .. } => "text",
            };
            let part = self.naming.sanitize(raw);
            let base = if part == layer_part {
                format!("{}_{layer_part}", ctx.bone)
            } else {
                format!("{}_{layer_part}_{part}", ctx.bone)
            };
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            bones.push(if *count == 1 {
                base
            } else {
                format!("{base}_{count}")
            });
        }
        Ok(bones)
    }

    /// Key every slot below `layer` whose element is not among `present` as hidden.
    fn hide_absent(
        &self,
        state: &mut BuildState,
        ctx: &ConversionContext<'_, '_>,
        layer: &Layer,
        present: &[String],
        time: f64,
    ) {
        let Some(anim) = state.animation_index() else {
            return;
        };
        let hidden: Vec<String> = state
            .layer_slots(NodeId::of(layer), &ctx.bone)
            .filter(|s| !present.contains(&s.owner_bone))
            .map(|s| s.slot.clone())
            .collect();
        for slot in hidden {
            state.skeleton.animations[anim]
                .slot_mut(&slot)
                .push_attachment(AttachmentKey { time, name: None });
        }
    }

    /// Create the bone of `ctx` with its setup pose, or key it against that pose.
    pub(crate) fn bone(&self, state: &mut BuildState, ctx: &ConversionContext<'_, '_>) {
        let Some(element) = ctx.element else {
            return;
        };
        let masked = ctx.in_masked_run();
        let parent = ctx.parent.map(|p| p.bone.as_str());
        let parent_anchor = ctx.parent.map_or(Vec2::ZERO, |p| p.anchor_offset);

        let existing = state
            .skeleton
            .bone(&ctx.bone)
            .filter(|b| b.initialized)
            .map(|b| b.pose);
        let setup = match existing {
            Some(pose) => pose,
            None => {
                if !state.is_structure() {
                    tracing::debug!(bone = %ctx.bone, "bone first met outside the structure pass");
                }
                let pose = child_pose(element, masked, None, parent_anchor);
                let bone = state.skeleton.ensure_bone(&ctx.bone, parent);
                bone.pose = pose;
                bone.initialized = true;
                pose
            }
        };
        if state.is_structure() || ctx.frame.is_none() {
            return;
        }
        let Some(anim) = state.animation_index() else {
            return;
        };

        let pose = child_pose(element, masked, state.previous_pose(&ctx.bone), parent_anchor);
        let curve = select_curve(ctx.frames());
        let time = ctx.time;
        let rotate = unwrap_rotation(
            state.previous_rotation(&ctx.bone),
            time,
            pose.rotation - setup.rotation,
        );
        let ratio = |v: f64, base: f64| if base == 0.0 { v } else { v / base };

        let timelines = state.skeleton.animations[anim].bone_mut(&ctx.bone);
        timelines.push_rotate(Keyframe {
            time,
            value: rotate,
            curve,
        });
        timelines.push_translate(Keyframe {
            time,
            value: Vec2::new(pose.x - setup.x, pose.y - setup.y),
            curve,
        });
        timelines.push_scale(Keyframe {
            time,
            value: Vec2::new(
                ratio(pose.scale_x, setup.scale_x),
                ratio(pose.scale_y, setup.scale_y),
            ),
            curve,
        });
        timelines.push_shear(Keyframe {
            time,
            value: Vec2::new(pose.shear_x - setup.shear_x, pose.shear_y - setup.shear_y),
            curve,
        });
        state.record_pose(
            &ctx.bone,
            PoseSample {
                animation: anim,
                time,
                rotate,
                pose,
            },
        );
    }

    /// Slot with one image attachment for a leaf element.
    fn leaf(
        &mut self,
        state: &mut BuildState,
        ctx: &ConversionContext<'_, '_>,
        key: NodeId,
        base: &str,
    ) -> RigResult<()> {
        let Some(element) = ctx.element else {
            return Ok(());
        };
        let slot_name = ctx.bone.clone();
        let name = state.shared_attachment_name(key, &self.naming.sanitize(base));

        if !state.is_structure() {
            let (Some(anim), Some(_)) = (state.animation_index(), ctx.frame) else {
                return Ok(());
            };
            let curve = select_curve(ctx.frames());
            let time = ctx.time;
            let color = ctx.tint.merge();
            let timelines = state.skeleton.animations[anim].slot_mut(&slot_name);
            timelines.push_attachment(AttachmentKey {
                time,
                name: Some(name),
            });
            timelines.push_color(Keyframe {
                time,
                value: color,
                curve,
            });
            return Ok(());
        }

        let path = self.config.image_path(&name);
        let desc = match state.image(&path) {
            Some(d) => d.clone(),
            None => {
                let d = self.exporter.export(&ExportRequest {
                    doc: ctx.doc,
                    element,
                    name: &name,
                    path: &path,
                })?;
                state.insert_image(d.clone());
                d
            }
        };

        if !state.skeleton.slot(&slot_name).is_some_and(|s| s.initialized) {
            let color = ctx.tint.merge();
            let blend = self.slot_blend(state, ctx);
            let (slot, created) = state.skeleton.ensure_slot(&slot_name, &ctx.bone);
            slot.color = color;
            slot.blend = blend;
            slot.attachment = Some(name.clone());
            slot.initialized = true;
            if created {
                register_slot(state, ctx, &slot_name);
            }
        }

        let inv = if desc.scale > 0.0 { 1.0 / desc.scale } else { 1.0 };
        state.skeleton.insert_attachment(
            &slot_name,
            &name,
            Attachment::Region(RegionAttachment {
                path: desc.path,
                x: desc.x,
                y: desc.y,
                width: desc.width,
                height: desc.height,
                scale_x: inv,
                scale_y: inv,
            }),
        );
        Ok(())
    }

    fn slot_blend(&self, state: &mut BuildState, ctx: &ConversionContext<'_, '_>) -> SlotBlend {
        match ctx.blend {
            BlendMode::Normal | BlendMode::Layer => SlotBlend::Normal,
            BlendMode::Add => SlotBlend::Additive,
            BlendMode::Multiply => SlotBlend::Multiply,
            BlendMode::Screen => SlotBlend::Screen,
            other => {
                state.diagnose(
                    DiagnosticKind::UnsupportedBlend,
                    format!("blend mode {other:?} on '{}' drawn as normal", ctx.bone),
                );
                SlotBlend::Normal
            }
        }
    }
}

/// Register `slot` with every layer on the path to the root.
fn register_slot(state: &mut BuildState, ctx: &ConversionContext<'_, '_>, slot: &str) {
    for c in ctx.ancestors() {
        let (Some(layer), Some(parent)) = (c.layer, c.parent) else {
            continue;
        };
        state.register_layer_slot(
            NodeId::of(layer),
            LayerSlot {
                slot: slot.to_string(),
                owner_bone: c.bone.clone(),
                parent_bone: parent.bone.clone(),
            },
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/convert/converter.rs"]
mod tests;
