//! The migration scheme seam.

use std::fmt;
use std::sync::Arc;

use gce_core::{TracerId, ZoneId};

use crate::hydrodisk::Trajectory;

/// Decides which zone a tracer occupies.
///
/// Implementations may draw random numbers and persist per-tracer state
/// the first time a tracer is seen, but must thereafter return the same
/// zone for the same arguments.
pub trait MigrationScheme: Send {
    /// Zone occupied at `time` by tracer `tracer`, formed in `zone` at `tform`.
    fn assign(&mut self, tracer: TracerId, zone: ZoneId, tform: f64, time: f64) -> ZoneId;

    /// The persisted trajectory of a tracer, if this scheme keeps one.
    fn trajectory(&self, _tracer: TracerId) -> Option<&Trajectory> {
        None
    }
}

/// Every tracer stays where it formed.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMigration;

impl MigrationScheme for NoMigration {
    fn assign(&mut self, _tracer: TracerId, zone: ZoneId, _tform: f64, _time: f64) -> ZoneId {
        zone
    }
}

/// A user closure `(zone, tform, time) -> zone`.
#[derive(Clone)]
pub struct ZoneFunction {
    f: Arc<dyn Fn(ZoneId, f64, f64) -> ZoneId + Send + Sync>,
    n_zones: u32,
}

impl ZoneFunction {
    /// Wrap `f`; results are clamped to `0..n_zones`.
    pub fn new(n_zones: u32, f: impl Fn(ZoneId, f64, f64) -> ZoneId + Send + Sync + 'static) -> Self {
        Self {
            f: Arc::new(f),
            n_zones,
        }
    }
}

impl fmt::Debug for ZoneFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneFunction")
            .field("n_zones", &self.n_zones)
            .finish_non_exhaustive()
    }
}

impl MigrationScheme for ZoneFunction {
    fn assign(&mut self, _tracer: TracerId, zone: ZoneId, tform: f64, time: f64) -> ZoneId {
        let z = (self.f)(zone, tform, time);
        ZoneId(z.0.min(self.n_zones.saturating_sub(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_migration_is_identity() {
        let mut s = NoMigration;
        assert_eq!(s.assign(TracerId(7), ZoneId(3), 0.0, 5.0), ZoneId(3));
        assert!(s.trajectory(TracerId(7)).is_none());
    }

    #[test]
    fn zone_function_is_clamped() {
        let mut s = ZoneFunction::new(4, |z, tform, t| {
            if t - tform > 1.0 {
                ZoneId(z.0 + 10)
            } else {
                z
            }
        });
        assert_eq!(s.assign(TracerId(0), ZoneId(1), 0.0, 0.5), ZoneId(1));
        assert_eq!(s.assign(TracerId(0), ZoneId(1), 0.0, 2.0), ZoneId(3));
    }
}
