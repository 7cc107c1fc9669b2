//! Scene graph to skeleton conversion.

pub mod context;
pub mod converter;
pub mod curve;
pub mod decompose;
pub(crate) mod mask;
pub mod selection;
pub mod state;
pub mod tint;
