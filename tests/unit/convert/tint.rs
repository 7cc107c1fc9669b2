use super::*;

fn adjust(percent: f64, amount: f64) -> ColorAdjust {
    ColorAdjust {
        red_percent: percent,
        red_amount: amount,
        ..ColorAdjust::default()
    }
}

#[test]
fn empty_chain_is_neutral() {
    assert_eq!(TintChain::root().merge(), Rgba::WHITE);
    assert_eq!(TintChain::root().depth(), 0);
}

#[test]
fn merge_folds_innermost_first() {
    // Outermost pushed first, innermost last.
    let chain = TintChain::root()
        .push(true, adjust(100.0, 127.5))
        .push(true, adjust(50.0, 0.0));
    assert_eq!(chain.depth(), 2);
    assert_eq!(chain.merge().r, 1.0);

    let reversed = TintChain::root()
        .push(true, adjust(50.0, 0.0))
        .push(true, adjust(100.0, 127.5));
    assert_eq!(reversed.merge().r, 0.5);
}

#[test]
fn hidden_ancestor_forces_alpha_to_zero() {
    let shown = ColorAdjust {
        alpha_amount: 255.0,
        ..ColorAdjust::default()
    };
    let chain = TintChain::root()
        .push(true, shown)
        .push(false, ColorAdjust::default())
        .push(true, ColorAdjust::default());
    let c = chain.merge();
    assert_eq!(c.a, 0.0);
    assert_eq!(c.r, 1.0);
}

#[test]
fn blend_does_not_mutate_parent_chain() {
    let parent = TintChain::root().push(true, adjust(50.0, 0.0));
    let mut e = crate::scene::model::Element::instance("x", "y");
    e.color.alpha_percent = 25.0;
    let child = parent.blend(&e);
    assert_eq!(parent.depth(), 1);
    assert_eq!(child.depth(), 2);
    assert_eq!(parent.merge().a, 1.0);
    assert_eq!(child.merge().a, 0.25);
    assert_eq!(child.merge().r, 0.5);
}
