use crate::foundation::core::{DMat3, DQuat, DVec3, Pose};
use crate::geometry::sampler::TargetSample;

/// Cosine above which the reference up is considered parallel to the optical axis.
const PARALLEL_COS: f64 = 0.999;

/// Viewpoint orientation that keeps the optical axis perpendicular to the target.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Orientation {
    /// World rotation to apply to the viewpoint.
    pub rotation: DQuat,
    /// Unit look direction (viewpoint local `-Z` in world space).
    pub forward: DVec3,
    /// `true` when the viewpoint sits behind the target and the axis was turned around.
    pub flipped: bool,
}

impl Orientation {
    /// Viewpoint pose at `location` carrying this orientation.
    pub fn pose_at(&self, location: DVec3) -> Pose {
        Pose::new(location, self.rotation)
    }
}

/// Derive the viewpoint rotation from the target's world normal and the viewpoint position.
///
/// The viewpoint's local `+Z` is aligned with the target normal pointing toward the viewpoint,
/// so it looks straight at the visible face. Roll keeps local `+Y` as close as possible to
/// `reference_up`.
pub fn solve_orientation(
    target: &TargetSample,
    viewpoint_location: DVec3,
    reference_up: DVec3,
) -> Orientation {
    let mut axis = target.normal;
    let flipped = axis.dot(target.center - viewpoint_location) > 0.0;
    if flipped {
        // Half turn about the target's up axis: the optical axis now faces the back side.
        axis = -axis;
    }

    let up = roll_reference(axis, reference_up.normalize());
    let x = up.cross(axis).normalize();
    let y = axis.cross(x);
    let rotation = DQuat::from_mat3(&DMat3::from_cols(x, y, axis)).normalize();

    Orientation {
        rotation,
        forward: -axis,
        flipped,
    }
}

fn roll_reference(axis: DVec3, up: DVec3) -> DVec3 {
    if axis.dot(up).abs() < PARALLEL_COS {
        return up;
    }
    if up.y.abs() < PARALLEL_COS {
        DVec3::Y
    } else {
        DVec3::Z
    }
}

#[cfg(test)]
#[path = "../../tests/unit/solve/orientation.rs"]
mod tests;
