use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;

use crate::foundation::core::{DMat4, DVec3, Pose, SampleTime};
use crate::foundation::error::{SquinchError, SquinchResult};
use crate::geometry::target::CornerLabel;

/// Upstream value whose change must invalidate derived output.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Integer frame of the sample.
    Time,
    /// Sub-frame offset of the sample.
    Subframe,
    /// Viewpoint world location.
    ViewpointLocation,
    /// Viewpoint world rotation.
    ViewpointRotation,
    /// Target world transform.
    TargetTransform,
    /// World position of one corner marker.
    Corner(CornerLabel),
    /// Parameter of a path/curve the viewpoint motion depends on.
    PathParameter(u16),
}

impl Signal {
    /// Bit used by [`SignalReader`] read tracking. All path parameters share one bit.
    pub(crate) fn mask_bit(self) -> u32 {
        let i = match self {
            Self::Time => 0,
            Self::Subframe => 1,
            Self::ViewpointLocation => 2,
            Self::ViewpointRotation => 3,
            Self::TargetTransform => 4,
            Self::Corner(c) => 5 + c.index() as u32,
            Self::PathParameter(_) => 9,
        };
        1 << i
    }

    /// Stable tag byte written ahead of the signal's value in fingerprints.
    pub(crate) fn tag(self) -> u8 {
        match self {
            Self::Time => 0,
            Self::Subframe => 1,
            Self::ViewpointLocation => 2,
            Self::ViewpointRotation => 3,
            Self::TargetTransform => 4,
            Self::Corner(c) => 5 + c.index() as u8,
            Self::PathParameter(_) => 9,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Time => f.write_str("time"),
            Self::Subframe => f.write_str("subframe"),
            Self::ViewpointLocation => f.write_str("viewpoint.location"),
            Self::ViewpointRotation => f.write_str("viewpoint.rotation"),
            Self::TargetTransform => f.write_str("target.transform"),
            Self::Corner(c) => write!(f, "corner.{}", c.as_str()),
            Self::PathParameter(id) => write!(f, "path[{id}]"),
        }
    }
}

/// Resolved values of every signal for one time sample, supplied by the host.
///
/// The core never holds references into host state; it only sees these snapshots.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SignalSnapshot {
    /// Sample time.
    pub time: SampleTime,
    /// Viewpoint world pose as currently resolved by the host.
    pub viewpoint: Pose,
    /// Target world transform.
    pub target_world: DMat4,
    /// Corner marker world positions, indexed by [`CornerLabel::index`].
    pub corners: [DVec3; 4],
    /// Resolved path/curve parameters keyed by declaration id.
    #[serde(default)]
    pub path_parameters: BTreeMap<u16, f64>,
}

impl SignalSnapshot {
    /// Append the raw bit pattern of `signal`'s current value to `out`.
    pub(crate) fn write_words(&self, signal: Signal, out: &mut Vec<u64>) -> SquinchResult<()> {
        match signal {
            Signal::Time => out.push(self.time.frame.0),
            Signal::Subframe => out.push(self.time.subframe.to_bits()),
            Signal::ViewpointLocation => push_f64s(out, &self.viewpoint.location.to_array()),
            Signal::ViewpointRotation => push_f64s(out, &self.viewpoint.rotation.to_array()),
            Signal::TargetTransform => push_f64s(out, &self.target_world.to_cols_array()),
            Signal::Corner(c) => push_f64s(out, &self.corners[c.index()].to_array()),
            Signal::PathParameter(id) => {
                let Some(v) = self.path_parameters.get(&id) else {
                    return Err(SquinchError::validation(format!(
                        "snapshot is missing declared signal {signal}"
                    )));
                };
                out.push(v.to_bits());
            }
        }
        Ok(())
    }
}

fn push_f64s(out: &mut Vec<u64>, values: &[f64]) {
    out.extend(values.iter().map(|v| v.to_bits()));
}

/// Snapshot accessor that records which signals a computation reads.
///
/// Debug builds assert that every read was declared.
pub(crate) struct SignalReader<'a> {
    snapshot: &'a SignalSnapshot,
    declared_mask: u32,
    touched: Cell<u32>,
}

impl<'a> SignalReader<'a> {
    pub(crate) fn new(snapshot: &'a SignalSnapshot, declared: &[Signal]) -> Self {
        let declared_mask = declared.iter().fold(0, |m, s| m | s.mask_bit());
        Self {
            snapshot,
            declared_mask,
            touched: Cell::new(0),
        }
    }

    fn touch(&self, signal: Signal) {
        let bit = signal.mask_bit();
        debug_assert!(
            self.declared_mask & bit != 0,
            "undeclared signal read: {signal}"
        );
        self.touched.set(self.touched.get() | bit);
    }

    #[cfg(test)]
    pub(crate) fn touched_mask(&self) -> u32 {
        self.touched.get()
    }

    pub(crate) fn viewpoint_location(&self) -> DVec3 {
        self.touch(Signal::ViewpointLocation);
        self.snapshot.viewpoint.location
    }

    pub(crate) fn target_world(&self) -> DMat4 {
        self.touch(Signal::TargetTransform);
        self.snapshot.target_world
    }

    pub(crate) fn corners(&self) -> [DVec3; 4] {
        for c in CornerLabel::ALL {
            self.touch(Signal::Corner(c));
        }
        self.snapshot.corners
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/signal.rs"]
mod tests;
