//! Multizone coupler.
//!
//! [`Multizone`] advances several zones on a shared clock and moves
//! tracers between them after every step. Zones never exchange gas: the
//! only coupling is through the tracers resident in each zone, whose
//! delayed enrichment (recycling, AGB winds, SN Ia) lands wherever they
//! currently are.
//!
//! # Step structure
//!
//! 1. group tracers by current zone
//! 2. advance every zone (fork-join over zones with the `parallel`
//!    feature, index order otherwise)
//! 3. write rows and collect new tracers in zone order
//! 4. unless in simple mode, ask the [`MigrationScheme`] where every
//!    tracer is at the end of the step
//!
//! Step 4 starts only after every zone has finished step 2, so the
//! result is identical with and without the `parallel` feature.

use std::fmt;
use std::io;
use std::time::Instant;

use gce_core::{
    ConfigError, HistoryRow, HistorySink, MdfTable, NumericalWarning, RunError, TracerId,
    TracerRecord, TracerSink, ZoneId,
};
use gce_migration::{MigrationScheme, NoMigration, RadialBins};

use crate::config::ZoneConfig;
use crate::mdf::MdfBuilder;
use crate::metrics::{RunMetrics, StepMetrics};
use crate::singlezone::Phase;
use crate::tracer::Tracer;
use crate::zone::{MassBudget, Zone, ZoneStep};

// ── MultizoneConfig ───────────────────────────────────────────────

/// Configuration of a multizone model.
pub struct MultizoneConfig {
    /// One configuration per zone, innermost first.
    pub zones: Vec<ZoneConfig>,
    /// Annulus edges; when set, each zone's area is taken from its annulus.
    pub bins: Option<RadialBins>,
    /// Where tracers go.
    pub migration: Box<dyn MigrationScheme>,
    /// Skip migration entirely; every zone evolves independently.
    pub simple: bool,
}

impl MultizoneConfig {
    /// Zones without migration or radial bins.
    pub fn new(zones: Vec<ZoneConfig>) -> Self {
        Self {
            zones,
            bins: None,
            migration: Box::new(NoMigration),
            simple: false,
        }
    }

    /// Set the radial bins.
    pub fn with_bins(mut self, bins: RadialBins) -> Self {
        self.bins = Some(bins);
        self
    }

    /// Set the migration scheme.
    pub fn with_migration(mut self, migration: impl MigrationScheme + 'static) -> Self {
        self.migration = Box::new(migration);
        self
    }

    /// Enable or disable simple mode.
    pub fn simple(mut self, simple: bool) -> Self {
        self.simple = simple;
        self
    }

    /// Validate the shared clock and zone count.
    ///
    /// Individual zones are validated when prepared.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Some(first) = self.zones.first() else {
            return Err(ConfigError::invalid("zones", "need at least one zone"));
        };
        for (i, z) in self.zones.iter().enumerate().skip(1) {
            if z.dt != first.dt {
                return Err(ConfigError::ZoneClockMismatch {
                    zone: i,
                    reason: format!("timestep {} differs from zone 0's {}", z.dt, first.dt),
                });
            }
            if z.output_times != first.output_times {
                return Err(ConfigError::ZoneClockMismatch {
                    zone: i,
                    reason: "output times differ from zone 0's".into(),
                });
            }
        }
        if let Some(bins) = &self.bins {
            if bins.n_zones() != self.zones.len() {
                return Err(ConfigError::invalid(
                    "bins",
                    format!(
                        "{} annuli for {} zones",
                        bins.n_zones(),
                        self.zones.len()
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for MultizoneConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultizoneConfig")
            .field("zones", &self.zones.len())
            .field("bins", &self.bins)
            .field("simple", &self.simple)
            .finish_non_exhaustive()
    }
}

// ── Outputs ───────────────────────────────────────────────────────

/// What one zone of a finished multizone run produced.
#[derive(Clone, Debug)]
pub struct ZoneOutput {
    /// Zone label.
    pub name: String,
    /// Rows in output order.
    pub history: Vec<HistoryRow>,
    /// Distribution of the tracers resident at the end of the run.
    pub mdf: MdfTable,
    /// Warnings raised in this zone.
    pub warnings: Vec<NumericalWarning>,
    /// Cumulative gas flows.
    pub budget: MassBudget,
}

/// Everything a finished multizone run produced.
#[derive(Clone, Debug)]
pub struct MultizoneOutput {
    /// Per-zone output, innermost first.
    pub zones: Vec<ZoneOutput>,
    /// Every tracer in formation order.
    pub tracers: Vec<TracerRecord>,
    /// Timing totals.
    pub metrics: RunMetrics,
}

// ── Multizone ─────────────────────────────────────────────────────

/// Several zones on a shared clock with tracer migration between them.
///
/// Goes through the same [`Phase`]s as a
/// [`SingleZone`](crate::SingleZone), with one history sink per zone.
pub struct Multizone {
    zones: Vec<Zone>,
    tracers: Vec<Tracer>,
    migration: Box<dyn MigrationScheme>,
    simple: bool,
    phase: Phase,
    metrics: RunMetrics,
}

impl Multizone {
    /// Validate every zone and the shared clock.
    ///
    /// # Errors
    ///
    /// The first violation found; zone-level errors come from the lowest
    /// numbered failing zone.
    pub fn prepare(config: MultizoneConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let MultizoneConfig {
            zones,
            bins,
            migration,
            simple,
        } = config;
        let mut prepared = Vec::with_capacity(zones.len());
        for (i, zc) in zones.into_iter().enumerate() {
            let id = ZoneId(i as u32);
            let mut zone = Zone::prepare(id, zc)?;
            if let Some(b) = &bins {
                zone.set_area(b.area(id));
            }
            prepared.push(zone);
        }
        log::debug!(
            "multizone prepared: {} zones, simple = {simple}",
            prepared.len()
        );
        Ok(Self {
            zones: prepared,
            tracers: Vec::new(),
            migration,
            simple,
            phase: Phase::Prepared,
            metrics: RunMetrics::default(),
        })
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Zones, innermost first.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Tracers formed so far, in id order.
    pub fn tracers(&self) -> &[Tracer] {
        &self.tracers
    }

    /// The migration scheme.
    pub fn migration(&self) -> &dyn MigrationScheme {
        self.migration.as_ref()
    }

    /// Cumulative metrics.
    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    fn fail<S: HistorySink>(&mut self, sinks: &mut [S], err: RunError) -> RunError {
        for (i, sink) in sinks.iter_mut().enumerate() {
            if let Err(e) = sink.abort() {
                log::warn!("zone {i}: aborting history output failed: {e}");
            }
        }
        log::debug!("multizone failed: {err}");
        self.phase = Phase::Failed;
        err
    }

    /// Advance every zone one step, then migrate.
    ///
    /// `sinks` holds one history sink per zone.
    ///
    /// # Errors
    ///
    /// As [`SingleZone::step`](crate::SingleZone::step); a sink count that
    /// does not match the zone count is reported as [`RunError::Io`] with
    /// [`io::ErrorKind::InvalidInput`] and fails the run.
    pub fn step<S: HistorySink>(&mut self, sinks: &mut [S]) -> Result<StepMetrics, RunError> {
        match self.phase {
            Phase::Complete => {
                return Err(RunError::InvalidPhase {
                    expected: "prepared or running",
                    found: Phase::Complete.as_str(),
                })
            }
            Phase::Failed => return Err(RunError::Failed),
            Phase::Prepared => {
                if sinks.len() != self.zones.len() {
                    let err = io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("{} history sinks for {} zones", sinks.len(), self.zones.len()),
                    );
                    return Err(self.fail(sinks, err.into()));
                }
                for i in 0..sinks.len() {
                    let columns = HistoryRow::columns(&self.zones[i].config().elements);
                    if let Err(e) = sinks[i].begin(&columns) {
                        return Err(self.fail(sinks, e.into()));
                    }
                }
                self.phase = Phase::Running;
            }
            Phase::Running => {}
        }

        let start = Instant::now();
        let n = self.zones.len();
        let mut first_ids = Vec::with_capacity(n);
        let mut next_id = self.tracers.len() as u64;
        for z in &self.zones {
            first_ids.push(TracerId(next_id));
            next_id += u64::from(z.config().n_stars);
        }

        let mut residents: Vec<Vec<&Tracer>> = vec![Vec::new(); n];
        for t in &self.tracers {
            residents[t.zone.index()].push(t);
        }
        let results = advance_all(&mut self.zones, &residents, &first_ids);
        drop(residents);

        let mut steps: Vec<ZoneStep> = Vec::with_capacity(n);
        let mut zone_us = Vec::with_capacity(n);
        for (result, us) in results {
            match result {
                Ok(step) => steps.push(step),
                Err(e) => return Err(self.fail(sinks, e)),
            }
            zone_us.push(us);
        }

        let mut formed = 0;
        let mut warnings = 0;
        let mut complete = true;
        for (i, step) in steps.into_iter().enumerate() {
            if let Some(row) = &step.row {
                let values = row.values(&self.zones[i].config().elements);
                if let Err(e) = sinks[i].write_row(&values) {
                    return Err(self.fail(sinks, e.into()));
                }
            }
            formed += step.formed.len() as u64;
            warnings += step.warnings;
            complete &= step.complete;
            self.tracers.extend(step.formed);
        }

        let mut moved = 0;
        let mut migration_us = 0;
        if complete {
            for i in 0..sinks.len() {
                if let Err(e) = sinks[i].finish() {
                    return Err(self.fail(sinks, e.into()));
                }
            }
            self.phase = Phase::Complete;
            log::debug!("multizone complete: {} tracers", self.tracers.len());
        } else if !self.simple {
            let mstart = Instant::now();
            moved = self.migrate();
            migration_us = mstart.elapsed().as_micros() as u64;
        }

        let metrics = StepMetrics {
            total_us: start.elapsed().as_micros() as u64,
            zone_us,
            migration_us,
            tracers_formed: formed,
            tracers_moved: moved,
            warnings,
        };
        self.metrics.record(metrics.clone());
        Ok(metrics)
    }

    /// Reassign every tracer's zone at the end of the step just taken.
    fn migrate(&mut self) -> u64 {
        let time = self.zones[0].time();
        let last = (self.zones.len() - 1) as u32;
        let mut moved = 0;
        for t in &mut self.tracers {
            let z = self
                .migration
                .assign(t.id, t.zone_origin, t.formation_time, time);
            let z = ZoneId(z.0.min(last));
            if z != t.zone {
                t.zone = z;
                moved += 1;
            }
        }
        log::trace!(
            "migration at t = {time:.4} Gyr: {moved} of {} tracers changed zone",
            self.tracers.len()
        );
        moved
    }

    /// Step until every zone has written its final output.
    ///
    /// # Errors
    ///
    /// As [`step()`](Self::step).
    pub fn run<S: HistorySink>(&mut self, sinks: &mut [S]) -> Result<(), RunError> {
        loop {
            self.step(sinks)?;
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
    pub fn finalize(self, tracer_sink: &mut dyn TracerSink) -> Result<MultizoneOutput, RunError> {
        if self.phase != Phase::Complete {
            return Err(match self.phase {
                Phase::Failed => RunError::Failed,
                other => RunError::InvalidPhase {
                    expected: Phase::Complete.as_str(),
                    found: other.as_str(),
                },
            });
        }
        let records: Vec<TracerRecord> = self
            .tracers
            .iter()
            .map(|t| {
                let traj = self.migration.trajectory(t.id);
                t.record(
                    traj.and_then(|tr| tr.analog_id()),
                    traj.and_then(|tr| tr.final_height()),
                )
            })
            .collect();
        tracer_sink.write_tracers(&records)?;

        let mut zones = Vec::with_capacity(self.zones.len());
        for zone in self.zones {
            let id = zone.id();
            let budget = zone.budget();
            let (config, history, warnings) = zone.into_parts();
            let mdf = MdfBuilder::from_tracers(
                &config.elements,
                &config.mdf_bins,
                self.tracers.iter().filter(|t| t.zone == id),
            );
            zones.push(ZoneOutput {
                name: config.name,
                history,
                mdf,
                warnings,
                budget,
            });
        }
        log::debug!(
            "multizone finalized: {} zones, {} tracers",
            zones.len(),
            records.len()
        );
        Ok(MultizoneOutput {
            zones,
            tracers: records,
            metrics: self.metrics,
        })
    }
}

impl fmt::Debug for Multizone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Multizone")
            .field("zones", &self.zones)
            .field("tracers", &self.tracers.len())
            .field("simple", &self.simple)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

type Advanced = (Result<ZoneStep, RunError>, u64);

fn advance_one(zone: &mut Zone, residents: &[&Tracer], first_id: TracerId) -> Advanced {
    let start = Instant::now();
    let result = zone.advance(residents, first_id);
    (result, start.elapsed().as_micros() as u64)
}

#[cfg(not(feature = "parallel"))]
fn advance_all(zones: &mut [Zone], residents: &[Vec<&Tracer>], first_ids: &[TracerId]) -> Vec<Advanced> {
    zones
        .iter_mut()
        .zip(residents)
        .zip(first_ids)
        .map(|((zone, res), &id)| advance_one(zone, res, id))
        .collect()
}

#[cfg(feature = "parallel")]
fn advance_all(zones: &mut [Zone], residents: &[Vec<&Tracer>], first_ids: &[TracerId]) -> Vec<Advanced> {
    use rayon::prelude::*;
    zones
        .par_iter_mut()
        .zip(residents.par_iter())
        .zip(first_ids.par_iter())
        .map(|((zone, res), &id)| advance_one(zone, res, id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::linspace_step;
    use gce_core::MemorySink;
    use gce_migration::ZoneFunction;

    fn zone(name: &str, end: f64) -> ZoneConfig {
        let mut cfg = ZoneConfig::default();
        cfg.name = name.into();
        cfg.output_times = linspace_step(0.0, end, 0.1);
        cfg
    }

    #[test]
    fn clock_mismatch_is_rejected() {
        let mut b = zone("b", 1.0);
        b.dt = 0.02;
        let cfg = MultizoneConfig::new(vec![zone("a", 1.0), b]);
        match Multizone::prepare(cfg) {
            Err(ConfigError::ZoneClockMismatch { zone: 1, .. }) => {}
            other => panic!("expected ZoneClockMismatch, got {other:?}"),
        }

        let cfg = MultizoneConfig::new(vec![zone("a", 1.0), zone("b", 2.0)]);
        assert!(matches!(
            Multizone::prepare(cfg),
            Err(ConfigError::ZoneClockMismatch { zone: 1, .. })
        ));
    }

    #[test]
    fn bin_count_must_match() {
        let cfg = MultizoneConfig::new(vec![zone("a", 1.0)])
            .with_bins(RadialBins::uniform(0.0, 4.0, 2).unwrap());
        assert!(matches!(
            Multizone::prepare(cfg),
            Err(ConfigError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn bins_set_zone_areas() {
        let cfg = MultizoneConfig::new(vec![zone("a", 0.2), zone("b", 0.2)])
            .with_bins(RadialBins::uniform(0.0, 2.0, 2).unwrap());
        let mz = Multizone::prepare(cfg).unwrap();
        let pi = std::f64::consts::PI;
        assert!((mz.zones()[0].config().area - pi).abs() < 1e-12);
        assert!((mz.zones()[1].config().area - 3.0 * pi).abs() < 1e-12);
    }

    #[test]
    fn simple_mode_matches_independent_single_zones() {
        let mut mz = Multizone::prepare(
            MultizoneConfig::new(vec![zone("a", 1.0), zone("b", 1.0)])
                .with_migration(ZoneFunction::new(2, |_, _, _| ZoneId(1)))
                .simple(true),
        )
        .unwrap();
        let mut sinks = vec![MemorySink::default(), MemorySink::default()];
        mz.run(&mut sinks).unwrap();
        assert!(mz.tracers().iter().all(|t| t.zone == t.zone_origin));

        let mut single = crate::SingleZone::prepare(zone("a", 1.0)).unwrap();
        let mut one = MemorySink::default();
        single.run(&mut one).unwrap();
        assert_eq!(sinks[0].rows, one.rows);
        assert_eq!(sinks[1].rows, one.rows);
    }

    #[test]
    fn migration_moves_delayed_enrichment() {
        // Everything formed in zone 0 moves to zone 1 immediately.
        let mut mz = Multizone::prepare(
            MultizoneConfig::new(vec![zone("a", 2.0), zone("b", 2.0)])
                .with_migration(ZoneFunction::new(2, |_, _, _| ZoneId(1))),
        )
        .unwrap();
        let mut sinks = vec![MemorySink::default(), MemorySink::default()];
        mz.run(&mut sinks).unwrap();
        assert!(mz.tracers().iter().all(|t| t.zone == ZoneId(1)));
        assert!(mz.metrics().tracers_moved > 0);

        let gas_a = mz.zones()[0].gas_mass();
        let gas_b = mz.zones()[1].gas_mass();
        assert!(gas_b > gas_a, "zone 1 receives every population's returns");
        let out = mz.finalize(&mut Vec::<TracerRecord>::new()).unwrap();
        assert!(out.zones[0].mdf.columns.values().all(|c| c.iter().all(|&d| d == 0.0)));
        assert!((out.zones[1].mdf.integral("[o/h]").unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn tracer_ids_interleave_by_zone() {
        let mut a = zone("a", 0.1);
        a.n_stars = 2;
        let mut b = zone("b", 0.1);
        b.n_stars = 3;
        let mut mz = Multizone::prepare(MultizoneConfig::new(vec![a, b])).unwrap();
        let mut sinks = vec![MemorySink::default(), MemorySink::default()];
        mz.step(&mut sinks).unwrap();
        let origins: Vec<u32> = mz.tracers().iter().map(|t| t.zone_origin.0).collect();
        assert_eq!(origins, [0, 0, 1, 1, 1]);
        let ids: Vec<u64> = mz.tracers().iter().map(|t| t.id.0).collect();
        assert_eq!(ids, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn wrong_sink_count_fails() {
        let mut mz =
            Multizone::prepare(MultizoneConfig::new(vec![zone("a", 0.1), zone("b", 0.1)])).unwrap();
        let mut sinks = vec![MemorySink::default()];
        match mz.step(&mut sinks) {
            Err(RunError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::InvalidInput),
            other => panic!("expected Io, got {other:?}"),
        }
        assert_eq!(mz.phase(), Phase::Failed);
    }
}
