use crate::foundation::core::DVec3;
use crate::foundation::error::{SquinchError, SquinchResult};

/// Set-once solver configuration.
///
/// None of these values are per-sample signals: changing them requires building a new evaluator.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FramingConfig {
    /// Physical sensor width the render back end uses to interpret focal scale (e.g. 36mm).
    pub reference_sensor_width: f64,
    /// Smallest depth a projected point may have before it is clamped.
    pub depth_epsilon: f64,
    /// Smallest projected horizontal span accepted by the intrinsics solver.
    pub span_epsilon: f64,
    /// Up vector used to resolve viewpoint roll.
    pub reference_up: DVec3,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            reference_sensor_width: 36.0,
            depth_epsilon: 1e-4,
            span_epsilon: 1e-9,
            reference_up: DVec3::Z,
        }
    }
}

impl FramingConfig {
    /// Validate ranges; every scalar must be finite and strictly positive.
    pub fn validate(&self) -> SquinchResult<()> {
        fn positive(name: &str, v: f64) -> SquinchResult<()> {
            if !v.is_finite() || v <= 0.0 {
                return Err(SquinchError::validation(format!(
                    "{name} must be finite and > 0, got {v}"
                )));
            }
            Ok(())
        }

        positive("reference_sensor_width", self.reference_sensor_width)?;
        positive("depth_epsilon", self.depth_epsilon)?;
        positive("span_epsilon", self.span_epsilon)?;
        if !self.reference_up.is_finite() || self.reference_up.length_squared() < 1e-24 {
            return Err(SquinchError::validation(
                "reference_up must be a finite non-zero vector",
            ));
        }
        Ok(())
    }

    /// Normalized reference up vector.
    pub fn up(&self) -> DVec3 {
        self.reference_up.normalize()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
