//! Single-zone integrator state machine.
//!
//! [`SingleZone`] drives one [`Zone`] through its phases:
//!
//! ```text
//! ZoneConfig ──prepare──▶ Prepared ──step──▶ Running ──step──▶ Complete ──finalize──▶ RunOutput
//!                             │                 │
//!                             └──── error ──────┴──▶ Failed
//! ```
//!
//! The unconfigured phase is the [`ZoneConfig`] itself, and the finalized
//! phase is the immutable [`RunOutput`] that
//! [`finalize()`](SingleZone::finalize) returns by value, so neither
//! needs a runtime check. A failed integrator rejects every further call
//! with [`RunError::Failed`]; its history sink has been aborted rather
//! than finished, which leaves partial output flagged incomplete.

use std::time::Instant;

use gce_core::{
    ConfigError, HistoryRow, HistorySink, MdfTable, NumericalWarning, RunError, TracerId,
    TracerRecord, TracerSink, ZoneId,
};

use crate::config::ZoneConfig;
use crate::mdf::MdfBuilder;
use crate::metrics::{RunMetrics, StepMetrics};
use crate::tracer::Tracer;
use crate::zone::{MassBudget, Zone};

// ── Phase ─────────────────────────────────────────────────────────

/// Lifecycle phase of a [`SingleZone`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Validated and ready; no step taken.
    Prepared,
    /// At least one step taken, final output not yet reached.
    Running,
    /// Final output written; only [`SingleZone::finalize`] remains.
    Complete,
    /// A step failed; the integrator is unusable.
    Failed,
}

impl Phase {
    /// Lower-case name used in errors and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prepared => "prepared",
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }
}

// ── RunOutput ─────────────────────────────────────────────────────

/// Everything a finished single-zone run produced.
#[derive(Clone, Debug)]
pub struct RunOutput {
    /// Zone label.
    pub name: String,
    /// Rows in output order.
    pub history: Vec<HistoryRow>,
    /// Every tracer in formation order.
    pub tracers: Vec<TracerRecord>,
    /// Mass-weighted distribution of tracer abundances.
    pub mdf: MdfTable,
    /// Every recoverable warning raised.
    pub warnings: Vec<NumericalWarning>,
    /// Cumulative gas flows.
    pub budget: MassBudget,
    /// Timing totals.
    pub metrics: RunMetrics,
}

// ── SingleZone ────────────────────────────────────────────────────

/// One-zone chemical evolution model.
///
/// # Example
///
/// ```ignore
/// let config = ZoneConfig::builder().elements(&["fe", "o"]).build()?;
/// let mut model = SingleZone::prepare(config)?;
/// let mut history = HistoryWriter::create("onezone/history.out")?;
/// model.run(&mut history)?;
/// let output = model.finalize(&mut TracerWriter::create("onezone/tracers.out")?)?;
/// ```
pub struct SingleZone {
    zone: Zone,
    tracers: Vec<Tracer>,
    phase: Phase,
    metrics: RunMetrics,
}

impl SingleZone {
    /// Validate `config` and build every cached table.
    ///
    /// # Errors
    ///
    /// The first configuration violation found. No simulation work has
    /// been done when this fails.
    pub fn prepare(config: ZoneConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            zone: Zone::prepare(ZoneId(0), config)?,
            tracers: Vec::new(),
            phase: Phase::Prepared,
            metrics: RunMetrics::default(),
        })
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The underlying zone.
    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    /// Tracers formed so far.
    pub fn tracers(&self) -> &[Tracer] {
        &self.tracers
    }

    /// Cumulative metrics.
    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    fn fail(&mut self, sink: &mut dyn HistorySink, err: RunError) -> RunError {
        if let Err(e) = sink.abort() {
            log::warn!("zone {}: aborting history output failed: {e}", self.zone.id());
        }
        log::debug!(
            "zone {} failed at step {}: {err}",
            self.zone.id(),
            self.zone.step_index()
        );
        self.phase = Phase::Failed;
        err
    }

    /// Advance one step, writing a row to `sink` when an output time falls
    /// on it.
    ///
    /// The first call writes the column header. The call that writes the
    /// final row finishes the sink and moves to [`Phase::Complete`].
    ///
    /// # Errors
    ///
    /// - [`RunError::InvalidPhase`] once complete
    /// - [`RunError::Failed`] after an earlier failure
    /// - [`RunError::Io`], [`RunError::InvalidAttribute`] or
    ///   [`RunError::NonFinite`] from this step, which move the integrator
    ///   to [`Phase::Failed`]
    pub fn step(&mut self, sink: &mut dyn HistorySink) -> Result<StepMetrics, RunError> {
        match self.phase {
            Phase::Complete => {
                return Err(RunError::InvalidPhase {
                    expected: "prepared or running",
                    found: Phase::Complete.as_str(),
                })
            }
            Phase::Failed => return Err(RunError::Failed),
            Phase::Prepared => {
                let columns = HistoryRow::columns(&self.zone.config().elements);
                if let Err(e) = sink.begin(&columns) {
                    return Err(self.fail(sink, e.into()));
                }
                self.phase = Phase::Running;
                log::debug!("zone {} running", self.zone.id());
            }
            Phase::Running => {}
        }

        let start = Instant::now();
        let residents: Vec<&Tracer> = self.tracers.iter().collect();
        let first_id = TracerId(self.tracers.len() as u64);
        let result = self.zone.advance(&residents, first_id);
        drop(residents);
        let step = match result {
            Ok(step) => step,
            Err(e) => return Err(self.fail(sink, e)),
        };

        if let Some(row) = &step.row {
            let values = row.values(&self.zone.config().elements);
            if let Err(e) = sink.write_row(&values) {
                return Err(self.fail(sink, e.into()));
            }
        }
        let formed = step.formed.len() as u64;
        self.tracers.extend(step.formed);

        if step.complete {
            if let Err(e) = sink.finish() {
                return Err(self.fail(sink, e.into()));
            }
            self.phase = Phase::Complete;
        }

        let elapsed = start.elapsed().as_micros() as u64;
        let metrics = StepMetrics {
            total_us: elapsed,
            zone_us: vec![elapsed],
            migration_us: 0,
            tracers_formed: formed,
            tracers_moved: 0,
            warnings: step.warnings,
        };
        self.metrics.record(metrics.clone());
        Ok(metrics)
    }

    /// Step until the final output has been written.
    ///
    /// # Errors
    ///
    /// As [`step()`](Self::step).
    pub fn run(&mut self, sink: &mut dyn HistorySink) -> Result<(), RunError> {
        loop {
            self.step(sink)?;
            if self.phase == Phase::Complete {
                return Ok(());
            }
        }
    }

    /// Write the tracer table and return the immutable run output.
    ///
    /// # Errors
    ///
    /// [`RunError::InvalidPhase`] unless complete, or [`RunError::Io`]
    /// from the tracer sink.
    pub fn finalize(self, tracer_sink: &mut dyn TracerSink) -> Result<RunOutput, RunError> {
        if self.phase != Phase::Complete {
            return Err(match self.phase {
                Phase::Failed => RunError::Failed,
                other => RunError::InvalidPhase {
                    expected: Phase::Complete.as_str(),
                    found: other.as_str(),
                },
            });
        }
        let records: Vec<TracerRecord> = self.tracers.iter().map(|t| t.record(None, None)).collect();
        tracer_sink.write_tracers(&records)?;

        let budget = self.zone.budget();
        let (config, history, warnings) = self.zone.into_parts();
        let mdf = MdfBuilder::from_tracers(&config.elements, &config.mdf_bins, &self.tracers);
        log::debug!(
            "zone {} finalized: {} rows, {} tracers, {} warnings",
            config.name,
            history.len(),
            records.len(),
            warnings.len()
        );
        Ok(RunOutput {
            name: config.name,
            history,
            tracers: records,
            mdf,
            warnings,
            budget,
            metrics: self.metrics,
        })
    }
}

impl std::fmt::Debug for SingleZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleZone")
            .field("zone", &self.zone)
            .field("phase", &self.phase)
            .field("tracers", &self.tracers.len())
            .finish_non_exhaustive()
    }
}
