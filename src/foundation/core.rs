use crate::foundation::error::{SquinchError, SquinchResult};

pub use glam::{DMat3, DMat4, DQuat, DVec3};
pub use kurbo::{Point, Rect};

/// Absolute 0-based frame index on the host timeline.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)` on the host timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex,
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> SquinchResult<Self> {
        if start.0 > end.0 {
            return Err(SquinchError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Return `true` when the range has no frames.
    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    /// Return `true` when `f` is inside `[start, end)`.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }

    /// Expand the range into sample times, `subframes` evenly spaced samples per frame.
    ///
    /// `subframes == 0` is treated as one sample per frame.
    pub fn sample_times(self, subframes: u32) -> Vec<SampleTime> {
        let per_frame = subframes.max(1);
        let mut out = Vec::with_capacity((self.len_frames() as usize) * per_frame as usize);
        for f in self.start.0..self.end.0 {
            for s in 0..per_frame {
                out.push(SampleTime {
                    frame: FrameIndex(f),
                    subframe: f64::from(s) / f64::from(per_frame),
                });
            }
        }
        out
    }
}

/// One time sample: an integer frame plus a sub-frame offset in `[0, 1)`.
///
/// Render-time motion blur samples sub-frames while interactive preview usually does not, so the
/// two are carried as separate signals.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SampleTime {
    /// Integer frame.
    pub frame: FrameIndex,
    /// Sub-frame offset in `[0, 1)`.
    #[serde(default)]
    pub subframe: f64,
}

impl SampleTime {
    /// Sample at the start of `frame`.
    pub fn at_frame(frame: u64) -> Self {
        Self {
            frame: FrameIndex(frame),
            subframe: 0.0,
        }
    }

    /// Create a validated sample time.
    pub fn new(frame: u64, subframe: f64) -> SquinchResult<Self> {
        if !subframe.is_finite() || !(0.0..1.0).contains(&subframe) {
            return Err(SquinchError::validation("subframe must be in [0, 1)"));
        }
        Ok(Self {
            frame: FrameIndex(frame),
            subframe,
        })
    }

    /// Continuous time in frames.
    pub fn as_f64(self) -> f64 {
        self.frame.0 as f64 + self.subframe
    }
}

/// Rigid-plus-scale world pose (translation, rotation, scale).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pose {
    /// World-space translation.
    pub location: DVec3,
    /// World-space rotation.
    pub rotation: DQuat,
    /// Per-axis scale, default `(1, 1, 1)`.
    #[serde(default = "unit_scale")]
    pub scale: DVec3,
}

fn unit_scale() -> DVec3 {
    DVec3::ONE
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            location: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            scale: DVec3::ONE,
        }
    }
}

impl Pose {
    /// Unscaled pose at `location` with `rotation`.
    pub fn new(location: DVec3, rotation: DQuat) -> Self {
        Self {
            location,
            rotation,
            scale: DVec3::ONE,
        }
    }

    /// Pose translated to `location` with identity rotation.
    pub fn at(location: DVec3) -> Self {
        Self::new(location, DQuat::IDENTITY)
    }

    /// Return `true` when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.location.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }

    /// World matrix, applying scale then rotation then translation.
    pub fn to_mat4(self) -> DMat4 {
        DMat4::from_scale_rotation_translation(self.scale, self.rotation, self.location)
    }

    /// Map a world-space point into this pose's local space.
    pub fn world_to_local(self, p: DVec3) -> DVec3 {
        (self.rotation.inverse() * (p - self.location)) / self.scale
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
