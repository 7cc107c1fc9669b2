//! Clip regions for masked layer runs.

use crate::convert::context::{ConversionContext, Placement};
use crate::convert::converter::{Converter, Playback, frame_steps};
use crate::convert::decompose::anchor_offset;
use crate::convert::state::{BuildState, DiagnosticKind};
use crate::foundation::core::{Affine, NodeId};
use crate::foundation::error::{RigError, RigResult};
use crate::scene::model::{Document, Element, ElementKind, Layer, LayerKind, Timeline};
use crate::skeleton::model::{Attachment, ClippingAttachment};

/// Clip slot open over the masked layers that follow a mask layer.
#[derive(Clone, Debug)]
pub(crate) struct OpenClip {
    pub(crate) slot: String,
    /// Creation index of the first slot after the clip slot, set only when this visit created
    /// the clip slot.
    pub(crate) first_index: Option<usize>,
}

/// Masked-run bookkeeping for one timeline visit.
#[derive(Debug, Default)]
pub(crate) struct MaskRun {
    /// Mask layer already converted for the current run.
    pub(crate) mask: Option<NodeId>,
    pub(crate) clip: Option<OpenClip>,
}

impl<'c> Converter<'c> {
    /// Open a clip region for `mask_layer`, or `None` when it holds no usable shape.
    pub(crate) fn convert_mask<'a>(
        &mut self,
        state: &mut BuildState,
        ctx: &ConversionContext<'a, '_>,
        mask_layer: &'a Layer,
        playback: Playback,
        n: usize,
    ) -> RigResult<Option<OpenClip>> {
        let frame = mask_layer
            .frame_at(playback.index(0, n))
            .or_else(|| mask_layer.frames.first());
        let Some((frame, element)) = frame.and_then(|f| Some((f, f.elements.first()?))) else {
            self.missing_mask(state, ctx, mask_layer, "mask layer has no content");
            return Ok(None);
        };
        let tolerance = self.config.flatten_tolerance;

        match &element.kind {
            ElementKind::Shape { .. } => {
                let slot = format!("{}_{}_clip", ctx.bone, self.naming.sanitize(&mask_layer.name));
                let post = -ctx.anchor_offset;
                self.open_clip(state, &ctx.bone, slot, || {
                    self.flattener.flatten(element, tolerance, None, Some(post))
                })
            }
            ElementKind::Instance { item, .. } => {
                let timeline = ctx
                    .doc
                    .symbol(item)
                    .ok_or_else(|| RigError::validation(format!("unknown symbol '{item}'")))?;
                let found =
                    find_mask_shape(ctx.doc, timeline, Affine::IDENTITY, 1, self.config.max_depth)?;
                let Some((shape, inner)) = found else {
                    self.missing_mask(
                        state,
                        ctx,
                        mask_layer,
                        &format!("mask symbol '{item}' contains no vector shape"),
                    );
                    return Ok(None);
                };

                let bones = self.element_bones(ctx, mask_layer, std::slice::from_ref(element))?;
                let Some(bone) = bones.first() else {
                    return Ok(None);
                };
                if state.is_structure() {
                    let mask_ctx = ctx.descend(Placement {
                        layer: mask_layer,
                        frame,
                        element,
                        bone,
                        time: ctx.time,
                    });
                    self.check_depth(&mask_ctx)?;
                    self.bone(state, &mask_ctx);
                } else {
                    self.key_mask_bone(state, ctx, mask_layer, bone, playback, n)?;
                }

                let slot = format!("{bone}_clip");
                let post = -anchor_offset(element);
                self.open_clip(state, bone, slot, || {
                    self.flattener.flatten(shape, tolerance, Some(inner), Some(post))
                })
            }
            ElementKind::Bitmap { .. } | ElementKind::Text { .. } => {
                self.missing_mask(state, ctx, mask_layer, "mask content is not vector artwork");
                Ok(None)
            }
        }
    }

    /// Key the mask instance bone at every frame of the mask layer the window plays.
    fn key_mask_bone<'a>(
        &self,
        state: &mut BuildState,
        ctx: &ConversionContext<'a, '_>,
        mask_layer: &'a Layer,
        bone: &str,
        playback: Playback,
        n: usize,
    ) -> RigResult<()> {
        let fps = ctx.doc.frame_rate()?;
        for step in frame_steps(mask_layer, playback, n) {
            let Some(frame) = step.frame else {
                continue;
            };
            let Some(element) = frame.elements.first().filter(|e| e.item_name().is_some()) else {
                continue;
            };
            let keyed = ctx.descend(Placement {
                layer: mask_layer,
                frame,
                element,
                bone,
                time: ctx.time + fps.frames_to_secs(step.offset),
            });
            self.check_depth(&keyed)?;
            self.bone(state, &keyed);
        }
        Ok(())
    }

    fn missing_mask(
        &self,
        state: &mut BuildState,
        ctx: &ConversionContext<'_, '_>,
        mask_layer: &Layer,
        why: &str,
    ) {
        if state.is_structure() {
            state.diagnose(
                DiagnosticKind::MissingMaskGeometry,
                format!(
                    "{why}; layer '{}' under '{}' is not clipped",
                    mask_layer.name, ctx.bone
                ),
            );
        }
    }

    /// Create the clip slot and its polygon on first use.
    fn open_clip(
        &self,
        state: &mut BuildState,
        bone: &str,
        slot: String,
        vertices: impl FnOnce() -> RigResult<Vec<f64>>,
    ) -> RigResult<Option<OpenClip>> {
        let exists = state.skeleton.slot(&slot).is_some();
        if !state.is_structure() || exists {
            return Ok(exists.then_some(OpenClip {
                slot,
                first_index: None,
            }));
        }

        let vertices = match vertices() {
            Ok(v) => v,
            Err(e) if e.is_recoverable() => {
                state.diagnose(
                    DiagnosticKind::UnsupportedGeometry,
                    format!("clip '{slot}': {e}"),
                );
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        let (s, _) = state.skeleton.ensure_slot(&slot, bone);
        s.attachment = Some(slot.clone());
        s.initialized = true;
        state.skeleton.insert_attachment(
            &slot,
            &slot,
            Attachment::Clipping(ClippingAttachment {
                end: None,
                vertices,
            }),
        );
        let first_index = Some(state.skeleton.slots.len());
        Ok(Some(OpenClip { slot, first_index }))
    }

    /// Close the open clip, if any.
    ///
    /// A clip created during this visit ends at the first slot created after it, which is the
    /// last masked slot in draw order, and moves behind every masked slot in creation order so
    /// it is drawn before them.
    pub(crate) fn close_clip(&self, state: &mut BuildState, run: &mut MaskRun) {
        run.mask = None;
        let Some(OpenClip {
            slot,
            first_index: Some(first),
        }) = run.clip.take()
        else {
            return;
        };
        match state.skeleton.slots.get(first).map(|s| s.name.clone()) {
            Some(end) => {
                if let Some(Attachment::Clipping(c)) = state.skeleton.attachment_mut(&slot, &slot)
                {
                    c.end = Some(end);
                }
            }
            None => tracing::debug!(clip = %slot, "masked run created no slots"),
        }
        state.skeleton.move_slot_to_end(&slot);
    }
}

/// Depth-first search for the first raw shape on the normal layers of `timeline`.
///
/// Returns the shape and the transform from its timeline into the searched timeline.
pub(crate) fn find_mask_shape<'a>(
    doc: &'a Document,
    timeline: &'a Timeline,
    outer: Affine,
    depth: usize,
    limit: usize,
) -> RigResult<Option<(&'a Element, Affine)>> {
    if depth > limit {
        return Err(RigError::DepthExceeded {
            depth,
            limit,
            path: format!("mask symbol '{}'", timeline.name),
        });
    }
    let normal = timeline
        .layers
        .iter()
        .rev()
        .filter(|l| l.kind == LayerKind::Normal);
    for layer in normal {
        for element in layer.frames.iter().flat_map(|f| &f.elements) {
            match &element.kind {
                ElementKind::Shape { .. } => return Ok(Some((element, outer))),
                ElementKind::Instance { .. } => {
                    let Some(inner) = doc.timeline_of(element) else {
                        continue;
                    };
                    let found =
                        find_mask_shape(doc, inner, outer * element.affine(), depth + 1, limit)?;
                    if found.is_some() {
                        return Ok(found);
                    }
                }
                ElementKind::Bitmap { .. } | ElementKind::Text { .. } => {}
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
#[path = "../../tests/unit/convert/mask.rs"]
mod tests;
