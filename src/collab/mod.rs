//! Seams to the collaborators the conversion engine relies on but does not own.

pub mod export;
pub mod geometry;
pub mod naming;
