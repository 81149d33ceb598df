//! Per-step population tables.
//!
//! Every quantity that depends only on a population's age is tabulated
//! once when a zone is prepared, indexed by age in whole steps. The step
//! loop then reduces to table lookups weighted by tracer mass.

use gce_core::ConfigError;
use gce_stellar::{
    cumulative_return_fraction, main_sequence_mass_fraction, DelayTimeDistribution, Imf,
    MassLifetimeRelation,
};

use crate::config::ZoneConfig;

/// Age-indexed return fractions, main sequence fractions, SN Ia step
/// fractions and turnoff masses.
///
/// Index `k` refers to a population formed `k` steps ago. Lookups past
/// the end of the run return the saturated value.
#[derive(Clone, Debug)]
pub struct PopulationTables {
    dt: f64,
    crf: Vec<f64>,
    msmf: Vec<f64>,
    ia: Vec<f64>,
    turnoff: Vec<f64>,
}

impl PopulationTables {
    /// Tabulate for `config` at its solar metallicity.
    ///
    /// # Errors
    ///
    /// Propagates delay-time distribution normalization failures.
    pub fn new(
        config: &ZoneConfig,
        imf: &Imf,
        mlr: &MassLifetimeRelation,
    ) -> Result<Self, ConfigError> {
        let dt = config.dt;
        let n = config.steps() as usize + 2;
        let z = config.z_solar;

        let crf = (0..n)
            .map(|k| cumulative_return_fraction(imf, mlr, k as f64 * dt, z, config.post_ms))
            .collect();
        let msmf = (0..n)
            .map(|k| main_sequence_mass_fraction(imf, mlr, k as f64 * dt, z))
            .collect();
        let turnoff = (0..n)
            .map(|k| mlr.turnoff_mass((k as f64 + 0.5) * dt, z, 0.0))
            .collect();

        let end = config.end_time().max(config.delay + dt);
        let dtd = DelayTimeDistribution::new(
            config.dtd.clone(),
            config.delay,
            end,
            &config.integrator,
        )?;
        let ia = dtd.step_fractions(dt, n);

        Ok(Self {
            dt,
            crf,
            msmf,
            ia,
            turnoff,
        })
    }

    /// Timestep the tables were built for.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Cumulative return fraction at an age of `k` steps.
    pub fn crf(&self, k: usize) -> f64 {
        saturated(&self.crf, k)
    }

    /// Fraction of a population's mass returned during its `k`-th step
    /// of life, from age `k dt` to `(k + 1) dt`.
    pub fn returned(&self, k: usize) -> f64 {
        (self.crf(k + 1) - self.crf(k)).max(0.0)
    }

    /// Fraction of a population's mass leaving the main sequence during
    /// its `k`-th step of life.
    pub fn agb_fraction(&self, k: usize) -> f64 {
        (saturated(&self.msmf, k) - saturated(&self.msmf, k + 1)).max(0.0)
    }

    /// Fraction of a population's SN Ia events occurring during its
    /// `k`-th step of life.
    pub fn ia_fraction(&self, k: usize) -> f64 {
        self.ia.get(k).copied().unwrap_or(0.0)
    }

    /// Turnoff mass in Msun at the midpoint of the `k`-th step of life.
    pub fn turnoff(&self, k: usize) -> f64 {
        saturated(&self.turnoff, k)
    }
}

fn saturated(table: &[f64], k: usize) -> f64 {
    table
        .get(k)
        .or_else(|| table.last())
        .copied()
        .unwrap_or(0.0)
}
