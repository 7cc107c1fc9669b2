/// Identifier derivation and library item classification.
pub trait Naming {
    /// Map a raw name to a safe identifier. Total and deterministic.
    fn sanitize(&self, raw: &str) -> String;

    /// Return `true` when library item `item` is exported as a single image instead of being
    /// traversed.
    fn is_primitive(&self, item: &str) -> bool;
}

/// Default naming: lowercase `[a-z0-9_]` identifiers and prefix-based primitive classification.
#[derive(Clone, Debug)]
pub struct NamingPolicy {
    primitive_prefix: String,
}

impl NamingPolicy {
    pub fn new(primitive_prefix: impl Into<String>) -> Self {
        Self {
            primitive_prefix: primitive_prefix.into(),
        }
    }
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self::new("IMG_")
    }
}

impl Naming for NamingPolicy {
    fn sanitize(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut pending_sep = false;
        for ch in raw.chars().flat_map(char::to_lowercase) {
            if ch.is_ascii_alphanumeric() {
                if pending_sep && !out.is_empty() {
                    out.push('_');
                }
                pending_sep = false;
                out.push(ch);
            } else {
                pending_sep = true;
            }
        }
        if out.is_empty() {
            "unnamed".to_string()
        } else {
            out
        }
    }

    fn is_primitive(&self, item: &str) -> bool {
        if self.primitive_prefix.is_empty() {
            return false;
        }
        item.rsplit('/')
            .next()
            .is_some_and(|leaf| leaf.starts_with(&self.primitive_prefix))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/collab/naming.rs"]
mod tests;
