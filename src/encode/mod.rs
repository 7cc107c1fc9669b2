//! Skeleton format encoders.

pub mod spine_json;

use crate::foundation::error::RigResult;
use crate::skeleton::model::Skeleton;

/// Serializes a finished skeleton into one file format.
pub trait SkeletonEncoder {
    /// File extension of encoded documents, without the dot.
    fn extension(&self) -> &'static str;

    fn encode(&self, skeleton: &Skeleton) -> RigResult<Vec<u8>>;
}
