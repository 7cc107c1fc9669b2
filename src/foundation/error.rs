/// Convenience result type used across rigbake.
pub type RigResult<T> = Result<T, RigError>;

/// Top-level error taxonomy used by conversion APIs.
#[derive(thiserror::Error, Debug)]
pub enum RigError {
    /// Invalid user-provided or document data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A root target or instance lacks the identity data needed to derive a stable name.
    #[error("missing identity: {0}")]
    MissingIdentity(String),

    /// Shape outline data is malformed or unreadable.
    #[error("unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    /// A mask layer or mask symbol contains no usable vector shape.
    #[error("missing mask geometry: {0}")]
    MissingMaskGeometry(String),

    /// Symbol nesting exceeded the configured maximum depth.
    #[error("nesting depth {depth} exceeds limit {limit} at '{path}'")]
    DepthExceeded {
        /// Depth reached when the guard tripped.
        depth: usize,
        /// Configured limit.
        limit: usize,
        /// Bone path at which the guard tripped.
        path: String,
    },

    /// The image export collaborator failed.
    #[error("export error: {0}")]
    Export(String),

    /// The format encoder failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RigError {
    /// Build a [`RigError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RigError::MissingIdentity`] value.
    pub fn missing_identity(msg: impl Into<String>) -> Self {
        Self::MissingIdentity(msg.into())
    }

    /// Build a [`RigError::UnsupportedGeometry`] value.
    pub fn unsupported_geometry(msg: impl Into<String>) -> Self {
        Self::UnsupportedGeometry(msg.into())
    }

    /// Build a [`RigError::MissingMaskGeometry`] value.
    pub fn missing_mask_geometry(msg: impl Into<String>) -> Self {
        Self::MissingMaskGeometry(msg.into())
    }

    /// Build a [`RigError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`RigError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`RigError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for failure classes the traversal degrades around instead of aborting.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedGeometry(_) | Self::MissingMaskGeometry(_)
        )
    }
}

impl From<serde_json::Error> for RigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
