//! World to viewpoint-space projection.
//!
//! The viewpoint looks down its local `-Z` axis. Perspective-normalized coordinates are
//! `u = x / depth`, `v = y / depth` with `depth = max(-z, epsilon)`; points at or behind the image
//! plane are pinned to `epsilon` depth, so results near the clamp are approximate.

use crate::foundation::core::{DVec3, Point, Pose};
use crate::geometry::sampler::TargetSample;
use crate::geometry::target::CornerLabel;

/// A world point expressed in perspective-normalized viewpoint coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ProjectedPoint {
    /// `(u, v)` normalized coordinate.
    pub point: Point,
    /// Depth actually used for the division.
    pub depth: f64,
    /// `true` when the raw depth was below epsilon and got clamped.
    pub depth_clamped: bool,
}

/// One projected target corner. Ephemeral, recomputed every sample.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ProjectedCorner {
    /// Which corner this is.
    pub label: CornerLabel,
    /// Projection result.
    pub projected: ProjectedPoint,
}

impl ProjectedCorner {
    /// Normalized horizontal coordinate.
    pub fn u(&self) -> f64 {
        self.projected.point.x
    }

    /// Normalized vertical coordinate.
    pub fn v(&self) -> f64 {
        self.projected.point.y
    }
}

/// Map a world point into viewpoint-local space.
#[inline]
pub fn to_viewpoint_local(viewpoint: &Pose, world: DVec3) -> DVec3 {
    viewpoint.world_to_local(world)
}

/// Project a world point through `viewpoint`.
pub fn project_point(viewpoint: &Pose, world: DVec3, depth_epsilon: f64) -> ProjectedPoint {
    let local = to_viewpoint_local(viewpoint, world);
    let raw_depth = -local.z;
    let depth_clamped = raw_depth < depth_epsilon;
    let depth = raw_depth.max(depth_epsilon);
    ProjectedPoint {
        point: Point::new(local.x / depth, local.y / depth),
        depth,
        depth_clamped,
    }
}

/// Project all four target corners through `viewpoint`.
pub fn project_corners(
    viewpoint: &Pose,
    target: &TargetSample,
    depth_epsilon: f64,
) -> [ProjectedCorner; 4] {
    CornerLabel::ALL.map(|label| ProjectedCorner {
        label,
        projected: project_point(viewpoint, target.corner(label), depth_epsilon),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/projection/projector.rs"]
mod tests;
