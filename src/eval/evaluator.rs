//! Dependency-tracked framing evaluation.
//!
//! A [`FramingEvaluator`] is built once per target and shared (it is `Send + Sync`). Each caller
//! (interactive preview, a final-render worker) owns an [`EvalContext`] with its own cache slots,
//! so concurrent contexts never observe each other's intermediate state.

use std::fmt;
use std::sync::Arc;

use crate::eval::declaration::{DependencyDeclaration, DerivedValue};
use crate::eval::fingerprint::{SampleFingerprint, SampleKey, fingerprint_f64s};
use crate::eval::signal::{Signal, SignalReader, SignalSnapshot};
use crate::foundation::config::FramingConfig;
use crate::foundation::core::{DVec3, Pose, SampleTime};
use crate::foundation::error::{SquinchError, SquinchResult};
use crate::geometry::sampler::TargetSample;
use crate::geometry::target::PlanarTarget;
use crate::projection::projector::project_corners;
use crate::solve::intrinsics::{Intrinsics, solve_intrinsics};
use crate::solve::orientation::{Orientation, solve_orientation};

/// Caller an [`EvalContext`] evaluates for. Only used for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    /// Interactive viewport.
    Preview,
    /// Offline render worker.
    FinalRender,
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Preview => "preview",
            Self::FinalRender => "final_render",
        })
    }
}

/// Framing result for one sample.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct FramingSolution {
    /// Sample the solution belongs to.
    pub time: SampleTime,
    /// Viewpoint rotation.
    pub orientation: Orientation,
    /// Focal scale and shifts.
    pub intrinsics: Intrinsics,
    /// Fingerprint of every signal value the solution was derived from.
    pub fingerprint: SampleFingerprint,
}

impl FramingSolution {
    /// Viewpoint pose at `location` with the solved rotation.
    pub fn viewpoint_pose(&self, location: DVec3) -> Pose {
        self.orientation.pose_at(location)
    }

    /// Fingerprint over the raw bits of every output scalar.
    ///
    /// Two solutions are bit-identical iff their output fingerprints match.
    pub fn output_fingerprint(&self) -> SampleFingerprint {
        let q = self.orientation.rotation.to_array();
        let f = self.orientation.forward.to_array();
        let i = &self.intrinsics;
        fingerprint_f64s(&[
            q[0],
            q[1],
            q[2],
            q[3],
            f[0],
            f[1],
            f[2],
            if self.orientation.flipped { 1.0 } else { 0.0 },
            i.focal_scale,
            i.shift_x,
            i.shift_y,
            i.span,
        ])
    }
}

/// Cache activity counters for one context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    /// Derived values reused without recomputation.
    pub hits: u64,
    /// Derived values recomputed.
    pub recomputes: u64,
    /// Recomputations that failed.
    pub failures: u64,
}

/// Cache state of one derived value inside a context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    /// Holds a value computed from the stored key.
    Clean,
    /// Must be recomputed on next evaluation.
    Dirty,
}

#[derive(Clone, Copy, Debug)]
enum NodeValue {
    Orientation(Orientation),
    Intrinsics(Intrinsics),
}

#[derive(Debug)]
struct Slot {
    derived: DerivedValue,
    state: SlotState,
    key: Option<SampleKey>,
    value: Option<NodeValue>,
}

struct EvaluatorInner {
    target: PlanarTarget,
    config: FramingConfig,
    declaration: DependencyDeclaration,
}

/// Shared, read-only framing program for one target.
#[derive(Clone)]
pub struct FramingEvaluator {
    inner: Arc<EvaluatorInner>,
}

impl fmt::Debug for FramingEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FramingEvaluator")
            .field("footprint", &self.inner.target.footprint())
            .field("order", &self.inner.declaration.order())
            .finish()
    }
}

impl FramingEvaluator {
    /// Build an evaluator from a target, configuration and validated declaration.
    pub fn new(
        target: PlanarTarget,
        config: FramingConfig,
        declaration: DependencyDeclaration,
    ) -> SquinchResult<Self> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(EvaluatorInner {
                target,
                config,
                declaration,
            }),
        })
    }

    /// Build an evaluator using the standard declaration.
    pub fn with_standard_declaration(
        target: PlanarTarget,
        config: FramingConfig,
    ) -> SquinchResult<Self> {
        Self::new(target, config, DependencyDeclaration::standard()?)
    }

    /// Target being framed.
    pub fn target(&self) -> &PlanarTarget {
        &self.inner.target
    }

    /// Solver configuration.
    pub fn config(&self) -> &FramingConfig {
        &self.inner.config
    }

    /// Dependency declaration driving cache invalidation.
    pub fn declaration(&self) -> &DependencyDeclaration {
        &self.inner.declaration
    }

    /// Create a context with empty (dirty) cache slots.
    pub fn context(&self, kind: ContextKind) -> EvalContext {
        let slots: Vec<Slot> = self
            .inner
            .declaration
            .order()
            .iter()
            .map(|&derived| Slot {
                derived,
                state: SlotState::Dirty,
                key: None,
                value: None,
            })
            .collect();
        tracing::debug!(%kind, nodes = slots.len(), "registered evaluation context");
        EvalContext {
            evaluator: self.clone(),
            kind,
            slots,
            stats: CacheStats::default(),
        }
    }

    fn target_sample(&self, reader: &SignalReader<'_>) -> SquinchResult<TargetSample> {
        TargetSample::from_corners(&self.inner.target, &reader.target_world(), reader.corners())
    }

    fn compute(
        &self,
        derived: DerivedValue,
        reader: &SignalReader<'_>,
        orientation: Option<Orientation>,
    ) -> SquinchResult<NodeValue> {
        let cfg = &self.inner.config;
        match derived {
            DerivedValue::Orientation => {
                let sample = self.target_sample(reader)?;
                Ok(NodeValue::Orientation(solve_orientation(
                    &sample,
                    reader.viewpoint_location(),
                    cfg.up(),
                )))
            }
            DerivedValue::Intrinsics => {
                let Some(orientation) = orientation else {
                    return Err(SquinchError::validation(
                        "intrinsics evaluated before orientation",
                    ));
                };
                let sample = self.target_sample(reader)?;
                let pose = orientation.pose_at(reader.viewpoint_location());
                let corners = project_corners(&pose, &sample, cfg.depth_epsilon);
                Ok(NodeValue::Intrinsics(solve_intrinsics(
                    &corners,
                    cfg.reference_sensor_width,
                    cfg.span_epsilon,
                )?))
            }
        }
    }
}

/// Per-caller evaluation state.
///
/// Not shared between threads; create one per preview viewport or render worker.
#[derive(Debug)]
pub struct EvalContext {
    evaluator: FramingEvaluator,
    kind: ContextKind,
    slots: Vec<Slot>,
    stats: CacheStats,
}

impl EvalContext {
    /// Caller this context evaluates for.
    pub fn kind(&self) -> ContextKind {
        self.kind
    }

    /// Cache counters accumulated so far.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Current cache state of `derived`.
    pub fn state(&self, derived: DerivedValue) -> SlotState {
        self.slots
            .iter()
            .find(|s| s.derived == derived)
            .map_or(SlotState::Dirty, |s| s.state)
    }

    /// Mark every derived value depending on `signal` dirty. Returns how many were invalidated.
    ///
    /// Signals nothing depends on (such as the driven viewpoint rotation) invalidate nothing.
    pub fn mark_changed(&mut self, signal: Signal) -> usize {
        let decl = self.evaluator.declaration();
        let mut n = 0;
        for slot in &mut self.slots {
            if slot.state == SlotState::Clean && decl.depends_on(slot.derived, signal) {
                slot.state = SlotState::Dirty;
                n += 1;
            }
        }
        n
    }

    /// Drop every cached value.
    pub fn invalidate_all(&mut self) {
        for slot in &mut self.slots {
            slot.state = SlotState::Dirty;
        }
    }

    /// Evaluate the framing solution for one snapshot.
    ///
    /// Results are a pure function of the declared signal values: a cached value is reused only
    /// when its key matches the snapshot bit for bit. A failed computation leaves its slot dirty
    /// and empty; other slots keep their values.
    #[tracing::instrument(level = "trace", skip_all, fields(kind = %self.kind, frame = snapshot.time.frame.0))]
    pub fn evaluate(&mut self, snapshot: &SignalSnapshot) -> SquinchResult<FramingSolution> {
        if !snapshot.viewpoint.is_finite() {
            return Err(SquinchError::validation("snapshot viewpoint pose must be finite"));
        }
        let evaluator = self.evaluator.clone();
        let decl = evaluator.declaration();

        for pos in 0..self.slots.len() {
            let derived = self.slots[pos].derived;
            let signals = decl.signals_for(derived);
            let key = SampleKey::from_snapshot(snapshot, signals)?;

            let slot = &self.slots[pos];
            if slot.state == SlotState::Clean && slot.key.as_ref() == Some(&key) {
                self.stats.hits += 1;
                tracing::trace!(node = %derived, "cache hit");
                continue;
            }

            let reader = SignalReader::new(snapshot, signals);
            let upstream = self.orientation();
            self.stats.recomputes += 1;
            match evaluator.compute(derived, &reader, upstream) {
                Ok(value) => {
                    let slot = &mut self.slots[pos];
                    slot.value = Some(value);
                    slot.key = Some(key);
                    slot.state = SlotState::Clean;
                    tracing::trace!(node = %derived, "recomputed");
                }
                Err(e) => {
                    let slot = &mut self.slots[pos];
                    slot.value = None;
                    slot.key = None;
                    slot.state = SlotState::Dirty;
                    self.stats.failures += 1;
                    tracing::debug!(node = %derived, error = %e, "evaluation failed");
                    return Err(e);
                }
            }
        }

        let (Some(orientation), Some(intrinsics)) = (self.orientation(), self.intrinsics()) else {
            return Err(SquinchError::validation(
                "declaration does not produce orientation and intrinsics",
            ));
        };
        let fingerprint = self
            .slots
            .iter()
            .rev()
            .find_map(|s| s.key.as_ref().map(|k| k.fingerprint))
            .unwrap_or(SampleFingerprint { hi: 0, lo: 0 });

        Ok(FramingSolution {
            time: snapshot.time,
            orientation,
            intrinsics,
            fingerprint,
        })
    }

    fn orientation(&self) -> Option<Orientation> {
        self.slots.iter().find_map(|s| match (s.state, s.value) {
            (SlotState::Clean, Some(NodeValue::Orientation(o))) => Some(o),
            _ => None,
        })
    }

    fn intrinsics(&self) -> Option<Intrinsics> {
        self.slots.iter().find_map(|s| match (s.state, s.value) {
            (SlotState::Clean, Some(NodeValue::Intrinsics(i))) => Some(i),
            _ => None,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/evaluator.rs"]
mod tests;
