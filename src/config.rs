use crate::foundation::error::{RigError, RigResult};
use std::path::Path;

/// Conversion settings. Every field has a default, so a partial JSON file is valid.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Convert the whole selection into one skeleton.
    pub merge_skeletons: bool,
    /// Skeleton name used in merge mode.
    pub merged_name: String,
    /// Directory prefix of derived image export paths.
    pub image_dir: String,
    pub image_extension: String,
    /// Maximum distance from a curve to its flattened polygon, in source units.
    pub flatten_tolerance: f64,
    /// Maximum symbol nesting depth.
    pub max_depth: usize,
    /// Library items whose last path component starts with this are exported as one image.
    pub primitive_prefix: String,
    pub root_bone: String,
    /// Animation name used when a timeline carries no frame labels.
    pub default_label: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            merge_skeletons: false,
            merged_name: "skeleton".to_string(),
            image_dir: "images".to_string(),
            image_extension: "png".to_string(),
            flatten_tolerance: 0.25,
            max_depth: 32,
            primitive_prefix: "IMG_".to_string(),
            root_bone: "root".to_string(),
            default_label: "default".to_string(),
        }
    }
}

impl ConvertConfig {
    pub fn from_reader<R: std::io::Read>(r: R) -> RigResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| RigError::validation(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> RigResult<Self> {
        let path = path.as_ref();
        let f = std::fs::File::open(path).map_err(|e| {
            RigError::validation(format!("open config '{}': {e}", path.display()))
        })?;
        Self::from_reader(std::io::BufReader::new(f))
    }

    pub fn validate(&self) -> RigResult<()> {
        if !(self.flatten_tolerance.is_finite() && self.flatten_tolerance > 0.0) {
            return Err(RigError::validation(
                "flatten_tolerance must be finite and > 0",
            ));
        }
        if self.max_depth == 0 {
            return Err(RigError::validation("max_depth must be > 0"));
        }
        if self.root_bone.trim().is_empty() {
            return Err(RigError::validation("root_bone must be non-empty"));
        }
        if self.default_label.trim().is_empty() {
            return Err(RigError::validation("default_label must be non-empty"));
        }
        Ok(())
    }

    /// Export path for an image named `name`.
    pub fn image_path(&self, name: &str) -> String {
        let dir = self.image_dir.trim_end_matches('/');
        if dir.is_empty() {
            format!("{name}.{}", self.image_extension)
        } else {
            format!("{dir}/{name}.{}", self.image_extension)
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
