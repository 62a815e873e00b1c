use std::fmt;

use xxhash_rust::xxh3::Xxh3;

use crate::eval::signal::{Signal, SignalSnapshot};
use crate::foundation::error::SquinchResult;

const XXH3_SEED: u64 = 0x5c1a_7e0d_93b4_f261;

/// Stable 128-bit fingerprint of the signal values a result was computed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SampleFingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

impl fmt::Display for SampleFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

/// Exact cache key for one derived value: the raw bits of every signal it depends on.
///
/// Equality compares the full word list, so a fingerprint collision can never produce a stale hit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SampleKey {
    pub(crate) fingerprint: SampleFingerprint,
    words: Vec<u64>,
}

impl SampleKey {
    pub(crate) fn from_snapshot(snapshot: &SignalSnapshot, signals: &[Signal]) -> SquinchResult<Self> {
        let mut words = Vec::with_capacity(signals.len() * 3);
        let mut h = StableHasher::new();
        for &s in signals {
            let at = words.len();
            snapshot.write_words(s, &mut words)?;
            h.write_u8(s.tag());
            if let Signal::PathParameter(id) = s {
                h.write_u16(id);
            }
            for &w in &words[at..] {
                h.write_u64(w);
            }
        }
        Ok(Self {
            fingerprint: h.finish(),
            words,
        })
    }
}

/// Fingerprint the raw bits of a sequence of output scalars.
pub(crate) fn fingerprint_f64s(values: &[f64]) -> SampleFingerprint {
    let mut h = StableHasher::new();
    h.write_u32(values.len() as u32);
    for &v in values {
        h.write_f64(v);
    }
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_u16(&mut self, v: u16) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn finish(self) -> SampleFingerprint {
        let v = self.inner.digest128();
        SampleFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/fingerprint.rs"]
mod tests;
