/// Convenience result type used across squinch.
pub type SquinchResult<T> = Result<T, SquinchError>;

/// Top-level error taxonomy used by solver and evaluator APIs.
///
/// Per-sample failures (`DegenerateGeometry`, `ZeroSpan`) are reported for that sample only;
/// they never poison cached state for other samples.
#[derive(thiserror::Error, Debug)]
pub enum SquinchError {
    /// Invalid user-provided scene, configuration or snapshot data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Target footprint has zero area (collinear or coincident corners).
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Projected horizontal span is below the configured epsilon.
    #[error("zero projected span: {span:e} < {epsilon:e}")]
    ZeroSpan {
        /// Measured span in normalized viewpoint space.
        span: f64,
        /// Threshold the span was compared against.
        epsilon: f64,
    },

    /// A dependency declaration feeds a derived value back into itself.
    #[error("cyclic dependency: {path}")]
    CyclicDependency {
        /// Offending chain, rendered as `a -> b -> a`.
        path: String,
    },

    /// Errors while validating or sampling keyframed scene values.
    #[error("animation error: {0}")]
    Animation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SquinchError {
    /// Build a [`SquinchError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SquinchError::DegenerateGeometry`] value.
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::DegenerateGeometry(msg.into())
    }

    /// Build a [`SquinchError::ZeroSpan`] value.
    pub fn zero_span(span: f64, epsilon: f64) -> Self {
        Self::ZeroSpan { span, epsilon }
    }

    /// Build a [`SquinchError::CyclicDependency`] value.
    pub fn cyclic(path: impl Into<String>) -> Self {
        Self::CyclicDependency { path: path.into() }
    }

    /// Build a [`SquinchError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`SquinchError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for errors scoped to a single sample.
    pub fn is_per_sample(&self) -> bool {
        matches!(self, Self::DegenerateGeometry(_) | Self::ZeroSpan { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
