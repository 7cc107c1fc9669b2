use crate::foundation::core::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Boundary document: the read-only scene graph handed over by the authoring tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Source frame rate in frames per second.
    pub frame_rate: f64,
    /// Library items addressable by name (symbols and bitmaps).
    #[serde(default)]
    pub library: BTreeMap<String, LibraryItem>,
    /// Top-level instances selected for conversion.
    #[serde(default)]
    pub selection: Vec<Element>,
}

/// One library entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LibraryItem {
    /// A symbol owning a nested timeline.
    Symbol(Timeline),
    /// An imported bitmap.
    Bitmap(BitmapItem),
}

/// Pixel size of an imported bitmap.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BitmapItem {
    /// Width in source units.
    pub width: f64,
    /// Height in source units.
    pub height: f64,
}

/// Ordered stack of layers. Index 0 is the bottom layer; the highest index is topmost.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timeline {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl Timeline {
    /// Total frame count (end of the longest layer).
    pub fn frame_count(&self) -> usize {
        self.layers
            .iter()
            .filter_map(|l| l.frames.last().map(Frame::end))
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    #[default]
    Normal,
    Mask,
    Masked,
    Guide,
    Folder,
}

/// A named sequence of time-contiguous frames.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Layer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: LayerKind,
    #[serde(default)]
    pub frames: Vec<Frame>,
}

impl Layer {
    /// Frame whose span contains `index`, if any.
    pub fn frame_at(&self, index: usize) -> Option<&Frame> {
        let i = self.frames.partition_point(|f| f.start <= index);
        let f = self.frames.get(i.checked_sub(1)?)?;
        (index < f.end()).then_some(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TweenKind {
    #[default]
    None,
    Classic,
    Motion,
    Shape,
}

/// A time span `[start, start + duration)` and the elements visible during it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub start: usize,
    #[serde(default = "default_duration")]
    pub duration: usize,
    #[serde(default)]
    pub tween: TweenKind,
    /// Standard ease intensity in `[-100, 100]` (negative eases in).
    #[serde(default)]
    pub ease: i32,
    /// Custom easing control points in unit space.
    #[serde(default)]
    pub custom_ease: Option<Vec<PointDef>>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

fn default_duration() -> usize {
    1
}

impl Frame {
    /// Exclusive end index.
    pub fn end(&self) -> usize {
        self.start + self.duration
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            start: 0,
            duration: 1,
            tween: TweenKind::None,
            ease: 0,
            custom_ease: None,
            label: None,
            elements: Vec::new(),
        }
    }
}

/// Per-instance color and alpha adjustment (percent multipliers plus 0..255 offsets).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorAdjust {
    pub alpha_percent: f64,
    pub alpha_amount: f64,
    pub red_percent: f64,
    pub red_amount: f64,
    pub green_percent: f64,
    pub green_amount: f64,
    pub blue_percent: f64,
    pub blue_amount: f64,
}

impl Default for ColorAdjust {
    fn default() -> Self {
        Self {
            alpha_percent: 100.0,
            alpha_amount: 0.0,
            red_percent: 100.0,
            red_amount: 0.0,
            green_percent: 100.0,
            green_amount: 0.0,
            blue_percent: 100.0,
            blue_amount: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    Normal,
    Layer,
    Add,
    Multiply,
    Screen,
    Lighten,
    Darken,
    Overlay,
    HardLight,
    Difference,
    Subtract,
    Invert,
    Alpha,
    Erase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    #[default]
    Loop,
    PlayOnce,
    SingleFrame,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    /// Raw vector artwork; `path` is SVG path data in the containing timeline's space.
    Shape {
        #[serde(default)]
        path: String,
    },
    Bitmap {
        item: String,
    },
    Text {
        #[serde(default)]
        text: String,
    },
    /// A reference to a library symbol and its nested timeline.
    Instance {
        item: String,
        #[serde(default)]
        first_frame: usize,
        #[serde(default)]
        looping: LoopMode,
    },
}

/// One node of the scene graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub kind: ElementKind,
    #[serde(default)]
    pub matrix: MatrixDef,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    /// Rotation in degrees (clockwise, source convention).
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub skew_x: f64,
    #[serde(default)]
    pub skew_y: f64,
    #[serde(default = "one")]
    pub scale_x: f64,
    #[serde(default = "one")]
    pub scale_y: f64,
    /// Anchor point in the element's local space, when distinct from the registration point.
    #[serde(default)]
    pub transformation_point: Option<PointDef>,
    #[serde(default)]
    pub color: ColorAdjust,
    #[serde(default)]
    pub blend: BlendMode,
    #[serde(default = "yes")]
    pub visible: bool,
    /// Local-space bounds of the artwork, used to size exported images.
    #[serde(default)]
    pub bounds: Option<RectDef>,
}

fn one() -> f64 {
    1.0
}

fn yes() -> bool {
    true
}

impl Element {
    /// Element with neutral transform and color for the given kind.
    pub fn new(name: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            name: name.into(),
            kind,
            matrix: MatrixDef::default(),
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            skew_x: 0.0,
            skew_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            transformation_point: None,
            color: ColorAdjust::default(),
            blend: BlendMode::Normal,
            visible: true,
            bounds: None,
        }
    }

    /// Instance of library symbol `item`.
    pub fn instance(name: impl Into<String>, item: impl Into<String>) -> Self {
        Self::new(
            name,
            ElementKind::Instance {
                item: item.into(),
                first_frame: 0,
                looping: LoopMode::Loop,
            },
        )
    }

    /// Raw vector shape with SVG path data.
    pub fn shape(path: impl Into<String>) -> Self {
        Self::new("", ElementKind::Shape { path: path.into() })
    }

    /// Set translation, rotation (degrees) and scale, keeping `matrix` consistent.
    pub fn with_pose(mut self, x: f64, y: f64, rotation: f64, scale_x: f64, scale_y: f64) -> Self {
        let m = Affine::translate((x, y))
            * Affine::rotate(rotation.to_radians())
            * Affine::scale_non_uniform(scale_x, scale_y);
        self.matrix = MatrixDef::from_affine(m);
        self.x = x;
        self.y = y;
        self.rotation = rotation;
        self.skew_x = rotation;
        self.skew_y = rotation;
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    pub fn affine(&self) -> Affine {
        self.matrix.to_affine()
    }

    /// Library item referenced by this element, if any.
    pub fn item_name(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Instance { item, .. } | ElementKind::Bitmap { item } => Some(item),
            ElementKind::Shape { .. } | ElementKind::Text { .. } => None,
        }
    }

    pub fn is_shape(&self) -> bool {
        matches!(self.kind, ElementKind::Shape { .. })
    }

    pub fn anchor(&self) -> Option<Point> {
        self.transformation_point
            .map(PointDef::to_point)
            .filter(|p| p.x != 0.0 || p.y != 0.0)
    }
}

/// 2D point accepting `[x, y]` or `{ "x": .., "y": .. }`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PointDef {
    pub x: f64,
    pub y: f64,
}

impl PointDef {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_point(self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl<'de> Deserialize<'de> for PointDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Arr([f64; 2]),
            Obj { x: f64, y: f64 },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Arr([x, y]) => Ok(Self { x, y }),
            Repr::Obj { x, y } => Ok(Self { x, y }),
        }
    }
}

/// Affine matrix accepting `[a, b, c, d, tx, ty]` or an object with those keys.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatrixDef {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl MatrixDef {
    pub fn from_affine(m: Affine) -> Self {
        let [a, b, c, d, tx, ty] = m.as_coeffs();
        Self { a, b, c, d, tx, ty }
    }

    pub fn to_affine(self) -> Affine {
        Affine::new([self.a, self.b, self.c, self.d, self.tx, self.ty])
    }
}

impl Default for MatrixDef {
    fn default() -> Self {
        Self::from_affine(Affine::IDENTITY)
    }
}

impl<'de> Deserialize<'de> for MatrixDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Arr([f64; 6]),
            Obj {
                a: f64,
                b: f64,
                c: f64,
                d: f64,
                tx: f64,
                ty: f64,
            },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Arr([a, b, c, d, tx, ty]) => Ok(Self { a, b, c, d, tx, ty }),
            Repr::Obj { a, b, c, d, tx, ty } => Ok(Self { a, b, c, d, tx, ty }),
        }
    }
}

/// Axis-aligned rectangle accepting `[x0, y0, x1, y1]` or an object with those keys.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RectDef {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl RectDef {
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x0, self.y0, self.x1, self.y1)
    }
}

impl<'de> Deserialize<'de> for RectDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Arr([f64; 4]),
            Obj { x0: f64, y0: f64, x1: f64, y1: f64 },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Arr([x0, y0, x1, y1]) => Ok(Self { x0, y0, x1, y1 }),
            Repr::Obj { x0, y0, x1, y1 } => Ok(Self { x0, y0, x1, y1 }),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
