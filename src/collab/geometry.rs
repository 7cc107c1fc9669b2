use crate::foundation::core::{Affine, BezPath, Point, Vec2};
use crate::foundation::error::{RigError, RigResult};
use crate::scene::model::{Element, ElementKind};
use kurbo::PathEl;

/// Flattens a vector shape outline into a polygon for clip attachments.
pub trait OutlineFlattener {
    /// Flat `[x0, y0, x1, y1, ...]` list with the vertical axis inverted to output convention.
    ///
    /// `pre` is applied to the outline in source space, `post` is added to every vertex after
    /// the axis flip. Malformed or degenerate outlines fail with
    /// [`RigError::UnsupportedGeometry`].
    fn flatten(
        &self,
        shape: &Element,
        tolerance: f64,
        pre: Option<Affine>,
        post: Option<Vec2>,
    ) -> RigResult<Vec<f64>>;
}

/// [`OutlineFlattener`] over SVG path data, using kurbo's curve flattening.
///
/// Only the first closed contour is used.
#[derive(Clone, Copy, Debug, Default)]
pub struct KurboFlattener;

impl OutlineFlattener for KurboFlattener {
    fn flatten(
        &self,
        shape: &Element,
        tolerance: f64,
        pre: Option<Affine>,
        post: Option<Vec2>,
    ) -> RigResult<Vec<f64>> {
        let ElementKind::Shape { path } = &shape.kind else {
            return Err(RigError::unsupported_geometry("element is not a vector shape"));
        };
        if path.trim().is_empty() {
            return Err(RigError::unsupported_geometry("shape has no outline data"));
        }
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(RigError::validation("flatten tolerance must be finite and > 0"));
        }
        let mut bez = BezPath::from_svg(path.trim())
            .map_err(|e| RigError::unsupported_geometry(format!("invalid outline path: {e}")))?;
        if let Some(m) = pre {
            bez.apply_affine(m);
        }

        let points = first_contour(&bez, tolerance);
        if points.len() < 3 {
            return Err(RigError::unsupported_geometry(format!(
                "outline contour has {} distinct points, need at least 3",
                points.len()
            )));
        }

        let post = post.unwrap_or(Vec2::ZERO);
        let mut out = Vec::with_capacity(points.len() * 2);
        for p in points {
            out.push(p.x + post.x);
            out.push(-p.y + post.y);
        }
        Ok(out)
    }
}

fn first_contour(bez: &BezPath, tolerance: f64) -> Vec<Point> {
    let mut points: Vec<Point> = Vec::new();
    let mut contours = 0usize;
    kurbo::flatten(bez.iter(), tolerance, |el| match el {
        PathEl::MoveTo(p) => {
            contours += 1;
            if contours == 1 {
                points.push(p);
            }
        }
        PathEl::LineTo(p) if contours == 1 => {
            if points.last() != Some(&p) {
                points.push(p);
            }
        }
        _ => {}
    });
    // Closing vertex is implicit in a polygon.
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

#[cfg(test)]
#[path = "../../tests/unit/collab/geometry.rs"]
mod tests;
