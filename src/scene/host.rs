use std::collections::BTreeMap;

use crate::eval::signal::SignalSnapshot;
use crate::foundation::core::{Pose, SampleTime};
use crate::foundation::error::SquinchResult;
use crate::geometry::target::{CornerLabel, PlanarTarget};
use crate::scene::document::Scene;
use crate::scene::model::{MotionDef, SceneDef, euler_deg};

/// Host collaborator that resolves every signal for a sample time.
///
/// Implementations must be pure in `time`: the same time yields the same snapshot, whichever
/// thread asks.
pub trait SampleSource: Send + Sync {
    /// Resolve the signal snapshot at `time`.
    fn snapshot(&self, time: SampleTime) -> SquinchResult<SignalSnapshot>;

    /// Path parameter ids the viewpoint motion depends on.
    fn path_parameters(&self) -> Vec<u16> {
        Vec::new()
    }
}

/// Stand-in host that evaluates a [`Scene`] description.
#[derive(Debug, Clone)]
pub struct SceneHost {
    def: SceneDef,
    target: PlanarTarget,
}

impl SceneHost {
    /// Validate the scene and set up its target.
    pub fn new(scene: &Scene) -> SquinchResult<Self> {
        scene.validate()?;
        let def = scene.def().clone();
        let target = PlanarTarget::from_local_vertices(&def.target.vertices)?;
        Ok(Self { def, target })
    }

    /// Target built from the scene's mesh vertices.
    pub fn target(&self) -> &PlanarTarget {
        &self.target
    }

    /// Scene description.
    pub fn def(&self) -> &SceneDef {
        &self.def
    }
}

impl SampleSource for SceneHost {
    fn snapshot(&self, time: SampleTime) -> SquinchResult<SignalSnapshot> {
        let t = time.as_f64();
        let target_world = self.def.target.transform.sample_mat4(t)?;

        let mut corners = *self.target.local_corners();
        for label in CornerLabel::ALL {
            let mut local = self.target.local_corner(label);
            if let Some(track) = self.def.target.marker_offsets.get(&label) {
                local += track.sample(t)?;
            }
            corners[label.index()] = target_world.transform_point3(local);
        }

        let mut path_parameters = BTreeMap::new();
        let location = match &self.def.viewpoint.motion {
            MotionDef::Location(track) => track.sample(t)?,
            MotionDef::Path(path) => {
                let s = path.offset.sample(t)?;
                path_parameters.insert(path.id, s);
                path.point_at(s)
            }
        };
        let rotation = euler_deg(self.def.viewpoint.rotation_deg.sample(t)?);

        Ok(SignalSnapshot {
            time,
            viewpoint: Pose::new(location, rotation),
            target_world,
            corners,
            path_parameters,
        })
    }

    fn path_parameters(&self) -> Vec<u16> {
        match &self.def.viewpoint.motion {
            MotionDef::Location(_) => Vec::new(),
            MotionDef::Path(path) => vec![path.id],
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/host.rs"]
mod tests;
