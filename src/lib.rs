//! Squinch keeps a moving viewpoint framed on a flat, rectangular target.
//!
//! For every time sample the viewpoint is rotated so its optical axis is perpendicular to the
//! target, then its focal scale and optical-center shift are solved so the target's four corners
//! land exactly on the frame edges. The result reads as the target photographed straight on, from
//! wherever the viewpoint happens to be.
//!
//! - Load and validate a [`Scene`]
//! - Create a [`FramingSession`]
//! - Solve single samples or ranges; parallel ranges give each worker its own [`EvalContext`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Dependency-tracked evaluation with per-context caches.
pub mod eval;
/// Planar target setup and per-sample world geometry.
pub mod geometry;
/// World to viewpoint-space projection.
pub mod projection;
/// Render resolution helpers.
pub mod render;
/// Scene description and the stand-in host that samples it.
pub mod scene;
/// Session-oriented solving API.
pub mod session;
/// Orientation and intrinsics solvers.
pub mod solve;

pub use crate::foundation::config::FramingConfig;
pub use crate::foundation::core::{
    DMat3, DMat4, DQuat, DVec3, FrameIndex, FrameRange, Point, Pose, Rect, SampleTime,
};
pub use crate::foundation::error::{SquinchError, SquinchResult};

pub use crate::eval::declaration::{DeclarationBuilder, DependencyDeclaration, DerivedValue, Input};
pub use crate::eval::evaluator::{
    CacheStats, ContextKind, EvalContext, FramingEvaluator, FramingSolution, SlotState,
};
pub use crate::eval::fingerprint::SampleFingerprint;
pub use crate::eval::signal::{Signal, SignalSnapshot};
pub use crate::geometry::sampler::{TargetSample, sample_target};
pub use crate::geometry::target::{CornerLabel, Footprint, PlanarTarget};
pub use crate::render::resolution::RenderResolution;
pub use crate::scene::document::Scene;
pub use crate::scene::host::{SampleSource, SceneHost};
pub use crate::session::framing_session::{
    FramingSession, ParityReport, RangeSolve, RangeStats, SampleOutcome, SessionOpts,
};
pub use crate::solve::intrinsics::{Intrinsics, solve_intrinsics};
pub use crate::solve::orientation::{Orientation, solve_orientation};
