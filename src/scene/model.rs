use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::foundation::config::FramingConfig;
use crate::foundation::core::{DMat4, DQuat, DVec3, Pose};
use crate::foundation::error::{SquinchError, SquinchResult};
use crate::geometry::target::CornerLabel;
use crate::scene::anim::Track;

/// JSON-facing description of one framing scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDef {
    /// Solver configuration.
    #[serde(default)]
    pub config: FramingConfig,
    /// Scene length in frames.
    pub duration: u64,
    /// Horizontal render resolution the derived vertical resolution is computed from.
    #[serde(default = "default_base_resolution_x")]
    pub base_resolution_x: u32,
    /// Planar target being framed.
    pub target: TargetDef,
    /// Moving viewpoint.
    pub viewpoint: ViewpointDef,
}

fn default_base_resolution_x() -> u32 {
    1920
}

/// Planar target: local mesh vertices plus an animated world transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetDef {
    /// Local-space vertices of the planar mesh (at least four).
    pub vertices: Vec<DVec3>,
    /// World transform of the target.
    #[serde(default)]
    pub transform: TransformDef,
    /// Local-space offsets applied to individual corner markers.
    #[serde(default)]
    pub marker_offsets: BTreeMap<CornerLabel, Track<DVec3>>,
}

/// Keyframed location, Euler rotation (degrees, XYZ order) and scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformDef {
    /// World location.
    pub location: Track<DVec3>,
    /// Euler rotation in degrees, applied X then Y then Z.
    pub rotation_deg: Track<DVec3>,
    /// Per-axis scale.
    pub scale: Track<DVec3>,
}

impl Default for TransformDef {
    fn default() -> Self {
        Self {
            location: Track::Constant(DVec3::ZERO),
            rotation_deg: Track::Constant(DVec3::ZERO),
            scale: Track::Constant(DVec3::ONE),
        }
    }
}

impl TransformDef {
    pub(crate) fn validate(&self) -> SquinchResult<()> {
        self.location.validate()?;
        self.rotation_deg.validate()?;
        self.scale.validate()
    }

    /// Resolve the pose at continuous time `t` (frames).
    pub fn sample(&self, t: f64) -> SquinchResult<Pose> {
        Ok(Pose {
            location: self.location.sample(t)?,
            rotation: euler_deg(self.rotation_deg.sample(t)?),
            scale: self.scale.sample(t)?,
        })
    }

    /// Resolve the world matrix at continuous time `t` (frames).
    pub fn sample_mat4(&self, t: f64) -> SquinchResult<DMat4> {
        let pose = self.sample(t)?;
        if pose.scale.abs().min_element() < 1e-12 {
            return Err(SquinchError::degenerate(format!(
                "target scale collapses an axis at t={t}"
            )));
        }
        Ok(pose.to_mat4())
    }
}

pub(crate) fn euler_deg(deg: DVec3) -> DQuat {
    DQuat::from_euler(
        glam::EulerRot::XYZ,
        deg.x.to_radians(),
        deg.y.to_radians(),
        deg.z.to_radians(),
    )
}

/// Viewpoint motion plus the host-side rotation the solver overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewpointDef {
    /// How the viewpoint location moves.
    pub motion: MotionDef,
    /// Rotation the host holds before the solved rotation is written back.
    #[serde(default = "zero_rotation")]
    pub rotation_deg: Track<DVec3>,
}

fn zero_rotation() -> Track<DVec3> {
    Track::Constant(DVec3::ZERO)
}

/// Viewpoint location source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionDef {
    /// Keyframed world location.
    Location(Track<DVec3>),
    /// Follow a polyline path driven by an animated parameter.
    Path(PathDef),
}

/// Polyline path with an animated arc-length parameter in `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathDef {
    /// Path parameter id the host exposes as a signal.
    #[serde(default)]
    pub id: u16,
    /// World-space path points (at least two).
    pub points: Vec<DVec3>,
    /// Normalized arc-length position along the path.
    pub offset: Track<f64>,
}

impl PathDef {
    pub(crate) fn validate(&self) -> SquinchResult<()> {
        if self.points.len() < 2 {
            return Err(SquinchError::validation("path needs at least two points"));
        }
        if self.points.iter().any(|p| !p.is_finite()) {
            return Err(SquinchError::validation("path points must be finite"));
        }
        if self.length() <= 0.0 {
            return Err(SquinchError::validation("path has zero length"));
        }
        self.offset.validate()
    }

    /// Total polyline length.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    /// World point at normalized arc length `s`, clamped to `[0, 1]`.
    pub fn point_at(&self, s: f64) -> DVec3 {
        let Some(&first) = self.points.first() else {
            return DVec3::ZERO;
        };
        let mut remaining = s.clamp(0.0, 1.0) * self.length();
        for w in self.points.windows(2) {
            let seg = w[0].distance(w[1]);
            if remaining <= seg && seg > 0.0 {
                return w[0].lerp(w[1], remaining / seg);
            }
            remaining -= seg;
        }
        self.points.last().copied().unwrap_or(first)
    }
}

impl SceneDef {
    pub(crate) fn validate(&self) -> SquinchResult<()> {
        self.config.validate()?;
        if self.duration == 0 {
            return Err(SquinchError::validation("scene duration must be > 0"));
        }
        if self.base_resolution_x < 2 {
            return Err(SquinchError::validation("base_resolution_x must be >= 2"));
        }
        if self.target.vertices.iter().any(|v| !v.is_finite()) {
            return Err(SquinchError::validation("target vertices must be finite"));
        }
        self.target.transform.validate()?;
        for track in self.target.marker_offsets.values() {
            track.validate()?;
        }
        match &self.viewpoint.motion {
            MotionDef::Location(track) => track.validate()?,
            MotionDef::Path(path) => path.validate()?,
        }
        self.viewpoint.rotation_deg.validate()
    }
}
