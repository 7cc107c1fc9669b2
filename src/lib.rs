//! rigbake converts nested keyframe vector-animation scene graphs into skeletal animation.
//!
//! A conversion walks a symbol's timeline twice: once to build bones, slots and attachments,
//! then once per frame label to bake keyframes onto them. The public API is:
//!
//! - Load and validate a [`Document`]
//! - Build a [`Converter`] from a [`ConvertConfig`] and the collaborator seams
//!   ([`Naming`], [`OutlineFlattener`], [`ImageExporter`])
//! - Run [`convert_selection`] and encode each [`Skeleton`] with a [`SkeletonEncoder`]
#![forbid(unsafe_code)]

mod foundation;

/// Collaborator seams: naming, outline flattening and image export.
pub mod collab;
pub mod config;
/// The two-pass conversion engine.
pub mod convert;
/// Skeleton file encoders.
pub mod encode;
/// Boundary scene model.
pub mod scene;
/// Output skeleton model.
pub mod skeleton;

pub use crate::foundation::core::{Affine, BezPath, FrameRate, NodeId, Point, Rect, Rgba, Vec2};
pub use crate::foundation::error::{RigError, RigResult};

pub use crate::collab::export::{
    ExportRequest, ImageDescriptor, ImageExporter, ManifestExporter, PrerenderedExporter,
};
pub use crate::collab::geometry::{KurboFlattener, OutlineFlattener};
pub use crate::collab::naming::{Naming, NamingPolicy};
pub use crate::config::ConvertConfig;
pub use crate::convert::converter::Converter;
pub use crate::convert::selection::{ItemFailure, SelectionReport, convert_selection};
pub use crate::convert::state::{BuildState, ConvertedSkeleton, Diagnostic, DiagnosticKind};
pub use crate::encode::SkeletonEncoder;
pub use crate::encode::spine_json::SpineJsonEncoder;
pub use crate::scene::labels::{FrameLabel, derive_labels};
pub use crate::scene::model::{Document, Element, ElementKind, Layer, LayerKind, Timeline};
pub use crate::skeleton::model::Skeleton;
