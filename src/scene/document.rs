use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::error::{SquinchError, SquinchResult};
use crate::scene::model::SceneDef;

/// Scene boundary object.
///
/// This is the JSON-facing, human-edited description of a target and a moving viewpoint. It is
/// validated before a [`crate::session::framing_session::FramingSession`] is built from it.
#[derive(Debug, Clone)]
pub struct Scene {
    def: SceneDef,
}

impl Scene {
    /// Parse a scene from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> SquinchResult<Self> {
        let def: SceneDef = serde_json::from_reader(r)
            .map_err(|e| SquinchError::serde(format!("parse scene JSON: {e}")))?;
        Ok(Self { def })
    }

    /// Parse a scene from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SquinchResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SquinchError::validation(format!("open scene JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Wrap a programmatically built description.
    pub fn from_def(def: SceneDef) -> Self {
        Self { def }
    }

    /// Validate configuration, tracks and path data.
    pub fn validate(&self) -> SquinchResult<()> {
        self.def.validate()
    }

    /// Declared duration in frames.
    pub fn duration_frames(&self) -> u64 {
        self.def.duration
    }

    /// Underlying description.
    pub fn def(&self) -> &SceneDef {
        &self.def
    }
}
