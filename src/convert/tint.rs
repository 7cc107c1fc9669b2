use crate::foundation::core::Rgba;
use crate::foundation::math::clamp01;
use crate::scene::model::{ColorAdjust, Element};
use std::rc::Rc;

#[derive(Debug)]
struct TintNode {
    visible: bool,
    adjust: ColorAdjust,
    outer: Option<Rc<TintNode>>,
}

/// Persistent chain of per-level color adjustments, innermost first.
///
/// Blending never mutates an existing chain; it returns a new head that links to the old one,
/// so sibling branches of the traversal share their common ancestry.
#[derive(Debug, Clone, Default)]
pub struct TintChain {
    head: Option<Rc<TintNode>>,
}

impl TintChain {
    /// Empty chain (neutral color).
    pub fn root() -> Self {
        Self::default()
    }

    /// Chain for descending into `element`.
    pub fn blend(&self, element: &Element) -> Self {
        self.push(element.visible, element.color)
    }

    pub fn push(&self, visible: bool, adjust: ColorAdjust) -> Self {
        Self {
            head: Some(Rc::new(TintNode {
                visible,
                adjust,
                outer: self.head.clone(),
            })),
        }
    }

    pub fn depth(&self) -> usize {
        self.nodes().count()
    }

    fn nodes(&self) -> impl Iterator<Item = &TintNode> {
        std::iter::successors(self.head.as_deref(), |n| n.outer.as_deref())
    }

    /// Fold the chain from the innermost node out to the root.
    ///
    /// Each node maps `c -> clamp01(c * percent / 100 + amount / 255)` per channel. The map is
    /// affine, so the fold order changes the result. Once a hidden node is met, alpha stays 0.
    pub fn merge(&self) -> Rgba {
        let mut c = Rgba::WHITE;
        let mut hidden = false;
        for node in self.nodes() {
            let a = &node.adjust;
            c.a = clamp01(c.a * (a.alpha_percent / 100.0) + a.alpha_amount / 255.0);
            c.r = clamp01(c.r * (a.red_percent / 100.0) + a.red_amount / 255.0);
            c.g = clamp01(c.g * (a.green_percent / 100.0) + a.green_amount / 255.0);
            c.b = clamp01(c.b * (a.blue_percent / 100.0) + a.blue_amount / 255.0);
            hidden |= !node.visible;
            if hidden {
                c.a = 0.0;
            }
        }
        c
    }
}

#[cfg(test)]
#[path = "../../tests/unit/convert/tint.rs"]
mod tests;
