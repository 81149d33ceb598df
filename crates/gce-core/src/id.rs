//! Strongly-typed identifiers.

use std::fmt;

/// Identifies a zone (one well-mixed gas reservoir) within a model.
///
/// `ZoneId(n)` is the n-th zone of a multizone configuration, ordered
/// from the innermost annulus outward. Single-zone runs use `ZoneId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ZoneId(pub u32);

impl ZoneId {
    /// The zone as a `usize` index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ZoneId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies one tracer stellar population.
///
/// Allocated sequentially in formation order, so ids are also a
/// total order on formation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TracerId(pub u64);

impl fmt::Display for TracerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TracerId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Monotonically increasing timestep counter.
///
/// Step `n` covers the interval `[n dt, (n + 1) dt)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct StepIndex(pub u64);

impl StepIndex {
    /// Start time of this step in Gyr.
    pub fn time(self, dt: f64) -> f64 {
        self.0 as f64 * dt
    }
}

impl fmt::Display for StepIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StepIndex {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
