use crate::foundation::core::{DMat3, DMat4, DVec3};
use crate::foundation::error::{SquinchError, SquinchResult};
use crate::geometry::target::{COPLANAR_TOLERANCE, CornerLabel, LENGTH_EPSILON, PlanarTarget};

/// World-space state of a [`PlanarTarget`] at one time sample.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TargetSample {
    /// World corners, indexed by [`CornerLabel::index`].
    pub corners: [DVec3; 4],
    /// Unit world normal carrying the sign stored at setup.
    pub normal: DVec3,
    /// Mean of the four world corners.
    pub center: DVec3,
}

impl TargetSample {
    /// Build a sample from host-resolved world corners.
    ///
    /// Corner markers may be animated independently of the target transform, so the corners are
    /// taken as given; the normal still comes from `target_world` and the stored local normal.
    pub fn from_corners(
        target: &PlanarTarget,
        target_world: &DMat4,
        corners: [DVec3; 4],
    ) -> SquinchResult<Self> {
        if corners.iter().any(|c| !c.is_finite()) {
            return Err(SquinchError::validation("target corners must be finite"));
        }

        let normal = world_normal(target, target_world)?;

        let bl = corners[CornerLabel::BottomLeft.index()];
        let e1 = corners[CornerLabel::BottomRight.index()] - bl;
        let e2 = corners[CornerLabel::TopLeft.index()] - bl;
        if e1.cross(e2).length() < LENGTH_EPSILON * LENGTH_EPSILON {
            return Err(SquinchError::degenerate(
                "target corners are collinear at this sample",
            ));
        }

        // Markers may be animated independently; the fourth corner must stay on the plane of the
        // other three.
        let e3 = corners[CornerLabel::TopRight.index()] - bl;
        let deviation = e3.dot(e1.cross(e2).normalize()).abs();
        let extent = e1.length().max(e2.length()).max(e3.length());
        if deviation > COPLANAR_TOLERANCE * extent {
            return Err(SquinchError::degenerate(format!(
                "target corners are not coplanar at this sample (deviation {deviation:e})"
            )));
        }

        let center = corners.iter().fold(DVec3::ZERO, |acc, &c| acc + c) * 0.25;
        Ok(Self {
            corners,
            normal,
            center,
        })
    }

    /// World corner for `label`.
    pub fn corner(&self, label: CornerLabel) -> DVec3 {
        self.corners[label.index()]
    }
}

/// Resolve the target's world corners and normal from its world transform.
pub fn sample_target(target: &PlanarTarget, target_world: &DMat4) -> SquinchResult<TargetSample> {
    let corners = target
        .local_corners()
        .map(|c| target_world.transform_point3(c));
    TargetSample::from_corners(target, target_world, corners)
}

fn world_normal(target: &PlanarTarget, target_world: &DMat4) -> SquinchResult<DVec3> {
    if !target_world.is_finite() {
        return Err(SquinchError::validation("target transform must be finite"));
    }
    let linear = DMat3::from_mat4(*target_world);
    let det = linear.determinant();
    if det.abs() < 1e-18 {
        return Err(SquinchError::degenerate("target transform is singular"));
    }
    Ok((linear.inverse().transpose() * target.local_normal()).normalize())
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/sampler.rs"]
mod tests;
