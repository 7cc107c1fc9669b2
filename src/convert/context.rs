use crate::convert::decompose::anchor_offset;
use crate::convert::tint::TintChain;
use crate::foundation::core::Vec2;
use crate::scene::model::{BlendMode, Document, Element, Frame, Layer, LayerKind};

/// Per-node traversal state.
///
/// A context is never changed after creation; descending into an element derives a child that
/// links back to its parent. Shared mutable state lives in
/// [`BuildState`](crate::convert::state::BuildState) and is passed alongside.
#[derive(Clone, Debug)]
pub struct ConversionContext<'a, 'p> {
    pub doc: &'a Document,
    pub parent: Option<&'p ConversionContext<'a, 'p>>,
    /// Element this context converts; `None` only for the root.
    pub element: Option<&'a Element>,
    /// Layer and frame holding `element`.
    pub layer: Option<&'a Layer>,
    pub frame: Option<&'a Frame>,
    pub bone: String,
    pub tint: TintChain,
    /// Nearest non-normal blend mode on the path to the root.
    pub blend: BlendMode,
    /// Output time (seconds) at which `frame` is being keyed.
    pub time: f64,
    /// Anchor point of `element`, output space.
    pub anchor_offset: Vec2,
    pub depth: usize,
}

/// Where an element sits and how it is being visited.
#[derive(Clone, Copy, Debug)]
pub struct Placement<'a, 'n> {
    pub layer: &'a Layer,
    pub frame: &'a Frame,
    pub element: &'a Element,
    pub bone: &'n str,
    pub time: f64,
}

impl<'a, 'p> ConversionContext<'a, 'p> {
    pub fn root(doc: &'a Document, bone: impl Into<String>) -> Self {
        Self {
            doc,
            parent: None,
            element: None,
            layer: None,
            frame: None,
            bone: bone.into(),
            tint: TintChain::root(),
            blend: BlendMode::Normal,
            time: 0.0,
            anchor_offset: Vec2::ZERO,
            depth: 0,
        }
    }

    /// Context for a top-level item, which has no enclosing layer or frame.
    pub fn top_level<'q>(&'q self, element: &'a Element, bone: &str) -> ConversionContext<'a, 'q> {
        ConversionContext {
            doc: self.doc,
            parent: Some(self),
            element: Some(element),
            layer: None,
            frame: None,
            bone: bone.to_string(),
            tint: self.tint.blend(element),
            blend: inherit_blend(self.blend, element.blend),
            time: self.time,
            anchor_offset: anchor_offset(element),
            depth: self.depth + 1,
        }
    }

    /// Context for an element found on a layer of this context's timeline.
    pub fn descend<'q>(&'q self, at: Placement<'a, '_>) -> ConversionContext<'a, 'q> {
        ConversionContext {
            doc: self.doc,
            parent: Some(self),
            element: Some(at.element),
            layer: Some(at.layer),
            frame: Some(at.frame),
            bone: at.bone.to_string(),
            tint: self.tint.blend(at.element),
            blend: inherit_blend(self.blend, at.element.blend),
            time: at.time,
            anchor_offset: anchor_offset(at.element),
            depth: self.depth + 1,
        }
    }

    /// This context followed by its ancestors, innermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = &ConversionContext<'a, 'p>> {
        std::iter::successors(Some(self), |c| c.parent)
    }

    /// Frames on the path to the root, innermost first.
    pub fn frames(&self) -> impl Iterator<Item = &'a Frame> + '_ {
        self.ancestors().filter_map(|c| c.frame)
    }

    /// Whether `element` sits on a masked layer.
    pub fn in_masked_run(&self) -> bool {
        self.layer.is_some_and(|l| l.kind == LayerKind::Masked)
    }

    /// Bone path from the root, for messages.
    pub fn path(&self) -> String {
        let mut names: Vec<&str> = self.ancestors().map(|c| c.bone.as_str()).collect();
        names.reverse();
        names.join("/")
    }
}

fn inherit_blend(outer: BlendMode, own: BlendMode) -> BlendMode {
    match own {
        BlendMode::Normal | BlendMode::Layer => outer,
        other => other,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/convert/context.rs"]
mod tests;
