use crate::foundation::core::FrameRate;
use crate::foundation::error::{RigError, RigResult};
use crate::scene::model::{Document, Element, ElementKind, Layer, LibraryItem, Timeline};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

impl Document {
    /// Parse a scene document from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> RigResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| RigError::validation(format!("parse scene document JSON: {e}")))
    }

    /// Parse a scene document from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> RigResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            RigError::validation(format!("open scene document '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn frame_rate(&self) -> RigResult<FrameRate> {
        FrameRate::new(self.frame_rate)
    }

    /// Timeline of library symbol `name`.
    pub fn symbol(&self, name: &str) -> Option<&Timeline> {
        match self.library.get(name)? {
            LibraryItem::Symbol(t) => Some(t),
            LibraryItem::Bitmap(_) => None,
        }
    }

    /// Nested timeline referenced by `element`, if it is an instance of a known symbol.
    pub fn timeline_of(&self, element: &Element) -> Option<&Timeline> {
        match &element.kind {
            ElementKind::Instance { item, .. } => self.symbol(item),
            _ => None,
        }
    }

    /// Check frame contiguity and library references across the whole document.
    pub fn validate(&self) -> RigResult<()> {
        self.frame_rate()?;
        for (name, item) in &self.library {
            if let LibraryItem::Symbol(timeline) = item {
                for layer in &timeline.layers {
                    self.validate_layer(name, layer)?;
                }
            }
        }
        for element in &self.selection {
            self.validate_element("<selection>", element)?;
        }
        Ok(())
    }

    fn validate_layer(&self, owner: &str, layer: &Layer) -> RigResult<()> {
        let mut expected = 0usize;
        for frame in &layer.frames {
            if frame.duration == 0 {
                return Err(RigError::validation(format!(
                    "'{owner}' layer '{}': frame at {} has zero duration",
                    layer.name, frame.start
                )));
            }
            if frame.start != expected {
                return Err(RigError::validation(format!(
                    "'{owner}' layer '{}': frame starts at {} but previous span ends at {expected}",
                    layer.name, frame.start
                )));
            }
            expected = frame.end();
            for element in &frame.elements {
                self.validate_element(owner, element)?;
            }
        }
        Ok(())
    }

    fn validate_element(&self, owner: &str, element: &Element) -> RigResult<()> {
        match &element.kind {
            ElementKind::Instance { item, .. } => match self.library.get(item) {
                Some(LibraryItem::Symbol(_)) => Ok(()),
                Some(LibraryItem::Bitmap(_)) => Err(RigError::validation(format!(
                    "'{owner}': instance references bitmap '{item}' as a symbol"
                ))),
                None => Err(RigError::validation(format!(
                    "'{owner}': instance references unknown item '{item}'"
                ))),
            },
            ElementKind::Bitmap { item } => match self.library.get(item) {
                Some(LibraryItem::Bitmap(_)) => Ok(()),
                _ => Err(RigError::validation(format!(
                    "'{owner}': bitmap references unknown bitmap item '{item}'"
                ))),
            },
            ElementKind::Shape { .. } | ElementKind::Text { .. } => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/document.rs"]
mod tests;
