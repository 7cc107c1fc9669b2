use crate::foundation::error::{RigError, RigResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Reference identity of a borrowed scene-graph node.
///
/// Two `NodeId`s are equal only when they were taken from the same value in memory, so
/// structurally identical elements or layers stay distinct. Valid for as long as the
/// document they point into is neither moved nor mutated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Identity of `node`.
    pub fn of<T>(node: &T) -> Self {
        Self(std::ptr::from_ref(node) as usize)
    }
}

/// Source frame rate in frames per second.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameRate(f64);

impl FrameRate {
    /// Create a validated frame rate (finite and > 0).
    pub fn new(fps: f64) -> RigResult<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(RigError::validation("frame rate must be finite and > 0"));
        }
        Ok(Self(fps))
    }

    /// Frames per second.
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Seconds covered by `frames` frames.
    pub fn frames_to_secs(self, frames: usize) -> f64 {
        (frames as f64) / self.0
    }
}

/// Straight (non-premultiplied) RGBA color with channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgba {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
    /// Alpha channel.
    pub a: f64,
}

impl Rgba {
    /// Opaque white, the neutral slot color.
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    /// Lowercase `rrggbbaa` hex string.
    pub fn to_hex(self) -> String {
        fn byte(v: f64) -> u8 {
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        format!(
            "{:02x}{:02x}{:02x}{:02x}",
            byte(self.r),
            byte(self.g),
            byte(self.b),
            byte(self.a)
        )
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
