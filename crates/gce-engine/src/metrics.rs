//! Per-step performance metrics for the integrators.
//!
//! [`StepMetrics`] captures timing and bookkeeping counts for a single
//! step; [`RunMetrics`] accumulates them over a run.

/// Timing and bookkeeping collected during a single step.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default)]
pub struct StepMetrics {
    /// Wall-clock time for the entire step.
    pub total_us: u64,
    /// Time spent advancing each zone, in zone order.
    pub zone_us: Vec<u64>,
    /// Time spent in the migration pass.
    pub migration_us: u64,
    /// Tracers formed this step.
    pub tracers_formed: u64,
    /// Tracers whose zone changed during the migration pass.
    pub tracers_moved: u64,
    /// Numerical warnings raised this step.
    pub warnings: u64,
}

/// Totals over every step taken so far.
#[derive(Clone, Debug, Default)]
pub struct RunMetrics {
    /// Steps taken.
    pub steps: u64,
    /// Summed wall-clock time.
    pub total_us: u64,
    /// Summed time in the migration pass.
    pub migration_us: u64,
    /// Tracers formed.
    pub tracers_formed: u64,
    /// Zone changes applied by migration.
    pub tracers_moved: u64,
    /// Numerical warnings raised.
    pub warnings: u64,
    /// Metrics of the most recent step.
    pub last: StepMetrics,
}

impl RunMetrics {
    /// Fold one step into the totals.
    pub fn record(&mut self, step: StepMetrics) {
        self.steps += 1;
        self.total_us += step.total_us;
        self.migration_us += step.migration_us;
        self.tracers_formed += step.tracers_formed;
        self.tracers_moved += step.tracers_moved;
        self.warnings += step.warnings;
        self.last = step;
    }

    /// Mean wall-clock time per step, zero before the first step.
    pub fn mean_step_us(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.total_us as f64 / self.steps as f64
        }
    }
}
