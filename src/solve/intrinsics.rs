use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{SquinchError, SquinchResult};
use crate::projection::projector::ProjectedCorner;

/// Focal scale and optical-center offsets that frame the target exactly.
///
/// Shifts are expressed in units of the frame width, matching a horizontally fitted sensor.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Intrinsics {
    /// Focal length in the units of the reference sensor width.
    pub focal_scale: f64,
    /// Horizontal optical-center offset.
    pub shift_x: f64,
    /// Vertical optical-center offset.
    pub shift_y: f64,
    /// Horizontal extent of the projected corners in normalized viewpoint space.
    pub span: f64,
}

impl Intrinsics {
    /// Map a perspective-normalized point into frame coordinates.
    ///
    /// The frame spans `[-0.5, 0.5]` horizontally; vertically it spans `±0.5 / aspect` for a frame
    /// whose aspect matches the target footprint.
    pub fn frame_coords(&self, p: Point) -> Point {
        Point::new(p.x / self.span - self.shift_x, p.y / self.span - self.shift_y)
    }

    /// Horizontal field of view in radians implied by the focal scale.
    pub fn horizontal_fov(&self, reference_sensor_width: f64) -> f64 {
        2.0 * (reference_sensor_width / (2.0 * self.focal_scale)).atan()
    }
}

/// Solve intrinsics from the four projected corners.
///
/// Corners that hit the depth clamp mean the viewpoint sits in (or behind) the target plane,
/// where the target is seen edge-on; that is reported as [`SquinchError::ZeroSpan`].
pub fn solve_intrinsics(
    corners: &[ProjectedCorner; 4],
    reference_sensor_width: f64,
    span_epsilon: f64,
) -> SquinchResult<Intrinsics> {
    if corners.iter().any(|c| !c.projected.point.is_finite()) {
        return Err(SquinchError::validation("projected corners must be finite"));
    }
    if corners.iter().any(|c| c.projected.depth_clamped) {
        return Err(SquinchError::zero_span(0.0, span_epsilon));
    }

    let first = corners[0].projected.point;
    let bounds = corners[1..]
        .iter()
        .fold(Rect::from_points(first, first), |r, c| {
            r.union_pt(c.projected.point)
        });

    let (u_left, u_right) = (bounds.x0, bounds.x1);
    let span = u_right - u_left;
    if span.is_nan() || span < span_epsilon {
        return Err(SquinchError::zero_span(span, span_epsilon));
    }

    let mid_u = (u_left + u_right) / 2.0;
    let avg_v = corners.iter().map(|c| c.v()).sum::<f64>() / 4.0;

    Ok(Intrinsics {
        focal_scale: reference_sensor_width / span,
        shift_x: mid_u / span,
        shift_y: avg_v / span,
        span,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/solve/intrinsics.rs"]
mod tests;
