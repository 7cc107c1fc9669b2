use crate::foundation::core::{BezPath, Rect, Vec2};
use crate::foundation::error::{RigError, RigResult};
use crate::foundation::math::flip_y;
use crate::scene::model::{Document, Element, ElementKind, LibraryItem};
use std::path::PathBuf;

/// One image the converter needs for a leaf element.
#[derive(Clone, Copy, Debug)]
pub struct ExportRequest<'a> {
    pub doc: &'a Document,
    pub element: &'a Element,
    /// Shared attachment name.
    pub name: &'a str,
    /// Target export path, relative to the output image root.
    pub path: &'a str,
}

/// Pixel geometry of an exported image.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImageDescriptor {
    pub path: String,
    pub width: f64,
    pub height: f64,
    /// Pixels per source unit.
    pub scale: f64,
    /// Image center relative to the element's anchor point, output (y-up) space.
    pub x: f64,
    pub y: f64,
}

/// Rasterizes (or locates) the image for a leaf element.
pub trait ImageExporter {
    fn export(&mut self, request: &ExportRequest<'_>) -> RigResult<ImageDescriptor>;
}

/// Exporter that renders nothing: it sizes images from document bounds and records every
/// request so an external renderer can produce the files later.
#[derive(Debug)]
pub struct ManifestExporter {
    scale: f64,
    requests: Vec<ImageDescriptor>,
}

impl ManifestExporter {
    pub fn new(scale: f64) -> RigResult<Self> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(RigError::validation("export scale must be finite and > 0"));
        }
        Ok(Self {
            scale,
            requests: Vec::new(),
        })
    }

    pub fn requests(&self) -> &[ImageDescriptor] {
        &self.requests
    }
}

impl Default for ManifestExporter {
    fn default() -> Self {
        Self {
            scale: 1.0,
            requests: Vec::new(),
        }
    }
}

impl ImageExporter for ManifestExporter {
    fn export(&mut self, request: &ExportRequest<'_>) -> RigResult<ImageDescriptor> {
        let scale = self.scale;
        let bounds = local_bounds(request.doc, request.element).unwrap_or_else(|| {
            tracing::warn!(
                path = request.path,
                "no bounds known for exported element, using an empty image"
            );
            Rect::ZERO
        });
        let center = pivot(request.element, bounds);
        let desc = ImageDescriptor {
            path: request.path.to_string(),
            width: bounds.width() * scale,
            height: bounds.height() * scale,
            scale,
            x: center.x,
            y: center.y,
        };
        self.requests.push(desc.clone());
        Ok(desc)
    }
}

/// Exporter for images rendered ahead of time under `root`; reads their pixel size from disk.
#[derive(Debug, Clone)]
pub struct PrerenderedExporter {
    root: PathBuf,
    scale: f64,
}

impl PrerenderedExporter {
    pub fn new(root: impl Into<PathBuf>, scale: f64) -> RigResult<Self> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(RigError::validation("export scale must be finite and > 0"));
        }
        Ok(Self {
            root: root.into(),
            scale,
        })
    }
}

impl ImageExporter for PrerenderedExporter {
    fn export(&mut self, request: &ExportRequest<'_>) -> RigResult<ImageDescriptor> {
        let file = self.root.join(request.path);
        let (w, h) = image::image_dimensions(&file)
            .map_err(|e| RigError::export(format!("read '{}': {e}", file.display())))?;
        let (width, height) = (f64::from(w), f64::from(h));
        // Without document bounds the image's top-left sits on the registration point.
        let bounds = local_bounds(request.doc, request.element)
            .unwrap_or_else(|| Rect::new(0.0, 0.0, width / self.scale, height / self.scale));
        let center = pivot(request.element, bounds);
        Ok(ImageDescriptor {
            path: request.path.to_string(),
            width,
            height,
            scale: self.scale,
            x: center.x,
            y: center.y,
        })
    }
}

/// Artwork bounds in the element's local (y-down) space.
pub fn local_bounds(doc: &Document, element: &Element) -> Option<Rect> {
    if let Some(b) = element.bounds {
        return Some(b.to_rect());
    }
    match &element.kind {
        ElementKind::Bitmap { item } => match doc.library.get(item)? {
            LibraryItem::Bitmap(b) => Some(Rect::new(0.0, 0.0, b.width, b.height)),
            LibraryItem::Symbol(_) => None,
        },
        // Shape outlines live in the parent's space; the shape's bone sits at its x/y.
        ElementKind::Shape { path } => {
            let bez = BezPath::from_svg(path.trim()).ok()?;
            let r = kurbo::Shape::bounding_box(&bez);
            Some(r - Vec2::new(element.x, element.y))
        }
        ElementKind::Text { .. } | ElementKind::Instance { .. } => None,
    }
}

/// Center of `bounds` relative to the element's anchor point, flipped to output space.
fn pivot(element: &Element, bounds: Rect) -> Vec2 {
    let anchor = element.anchor().map_or(Vec2::ZERO, |p| p.to_vec2());
    flip_y(bounds.center().to_vec2() - anchor)
}

#[cfg(test)]
#[path = "../../tests/unit/collab/export.rs"]
mod tests;
