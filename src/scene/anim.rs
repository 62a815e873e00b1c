use crate::foundation::core::DVec3;
use crate::foundation::error::{SquinchError, SquinchResult};

/// Interpolation contract for keyframed scene values.
pub trait Animatable: Clone {
    /// Interpolate from `a` to `b` with normalized factor `t` in `[0, 1]`.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;

    /// Return `true` when every component is finite.
    fn is_finite(&self) -> bool;
}

impl Animatable for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }

    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }
}

impl Animatable for DVec3 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a.lerp(*b, t)
    }

    fn is_finite(&self) -> bool {
        DVec3::is_finite(*self)
    }
}

/// Easing functions used to map normalized keyframe progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// Linear interpolation.
    #[default]
    Linear,
    /// Quadratic ease-in.
    InQuad,
    /// Quadratic ease-out.
    OutQuad,
    /// Quadratic ease-in/out.
    InOutQuad,
    /// Cubic ease-in/out.
    InOutCubic,
}

impl Ease {
    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }
}

/// Interpolation strategy between keyframes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpMode {
    /// Hold the previous key value until the next keyframe.
    Hold,
    /// Interpolate between keyframes using [`Ease`].
    #[default]
    Linear,
}

/// One keyframe.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe<T> {
    /// Frame the key sits on.
    pub frame: u64,
    /// Value at `frame`.
    pub value: T,
    /// Easing applied toward the next keyframe.
    #[serde(default)]
    pub ease: Ease,
}

/// Keyframed value sampled at fractional frame times.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframes<T> {
    /// Keyframes sorted by `frame`.
    pub keys: Vec<Keyframe<T>>,
    /// Interpolation mode between adjacent keyframes.
    #[serde(default)]
    pub mode: InterpMode,
}

impl<T: Animatable> Keyframes<T> {
    /// Validate ordering and finiteness.
    pub fn validate(&self) -> SquinchResult<()> {
        if self.keys.is_empty() {
            return Err(SquinchError::animation("keyframes must have at least one key"));
        }
        if !self.keys.windows(2).all(|w| w[0].frame <= w[1].frame) {
            return Err(SquinchError::animation("keyframes must be sorted by frame"));
        }
        if let Some(k) = self.keys.iter().find(|k| !k.value.is_finite()) {
            return Err(SquinchError::animation(format!(
                "keyframe at frame {} has a non-finite value",
                k.frame
            )));
        }
        Ok(())
    }

    /// Sample at continuous time `t` (in frames). Clamps outside the key range.
    pub fn sample(&self, t: f64) -> SquinchResult<T> {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return Err(SquinchError::animation("keyframes has no keys"));
        };

        let idx = self.keys.partition_point(|k| k.frame as f64 <= t);
        if idx == 0 {
            return Ok(first.value.clone());
        }
        if idx >= self.keys.len() {
            return Ok(last.value.clone());
        }

        let a = &self.keys[idx - 1];
        let b = &self.keys[idx];
        let denom = b.frame.saturating_sub(a.frame);
        if denom == 0 {
            return Ok(a.value.clone());
        }

        match self.mode {
            InterpMode::Hold => Ok(a.value.clone()),
            InterpMode::Linear => {
                let p = (t - a.frame as f64) / denom as f64;
                Ok(T::lerp(&a.value, &b.value, a.ease.apply(p)))
            }
        }
    }
}

/// Scene value that is either constant or keyframed.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Track<T> {
    /// Keyframed value.
    Keyframes(Keyframes<T>),
    /// Value constant over time.
    Constant(T),
}

impl<T: Animatable> Track<T> {
    /// Validate keyframes or the constant value.
    pub fn validate(&self) -> SquinchResult<()> {
        match self {
            Self::Keyframes(k) => k.validate(),
            Self::Constant(v) if v.is_finite() => Ok(()),
            Self::Constant(_) => Err(SquinchError::animation("constant track value must be finite")),
        }
    }

    /// Sample at continuous time `t` (in frames).
    pub fn sample(&self, t: f64) -> SquinchResult<T> {
        match self {
            Self::Keyframes(k) => k.sample(t),
            Self::Constant(v) => Ok(v.clone()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/anim.rs"]
mod tests;
