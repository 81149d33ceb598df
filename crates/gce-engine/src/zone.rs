//! One well-mixed zone and its per-step update.
//!
//! A [`Zone`] owns its gas state and configuration but not its stellar
//! populations: each call to [`advance()`](Zone::advance) receives the
//! tracers currently resident in the zone and hands back the ones formed
//! during the step. That split lets the multizone coupler move tracers
//! between zones without the zones knowing about each other.
//!
//! # Step order
//!
//! For step `n` covering `[t, t + dt)` with `t = n dt`:
//!
//! 1. star formation, outflow and recycling rates from the state at `t`
//! 2. infall from the driving function, or derived from the prescribed
//!    gas mass or star formation rate at `t + dt`
//! 3. if an output time falls within half a step of `t`, a
//!    [`HistoryRow`] of the state at `t`; after the last output the zone
//!    is complete and the update is not applied
//! 4. per-element enrichment, lock-up and ejection, clipped at zero
//! 5. new tracers at the ISM abundances of `t`

use std::collections::VecDeque;

use gce_core::{
    Abundances, ConfigError, HistoryRow, NumericalWarning, RunError, StepIndex, TracerId,
    WarningKind, ZoneId, YEARS_PER_GYR,
};
use gce_stellar::remnant::CCSN_THRESHOLD;
use gce_stellar::{Imf, MassLifetimeRelation};
use smallvec::SmallVec;

use crate::config::{Mode, Recycling, ZoneConfig};
use crate::tables::PopulationTables;
use crate::tracer::Tracer;

// ── MassBudget ────────────────────────────────────────────────────

/// Cumulative gas flows in Msun since `t = 0`.
///
/// Without clipping, `gas(t) = gas(0) + infall - formed + returned - outflow`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MassBudget {
    /// Gas accreted (negative infall subtracts).
    pub infall: f64,
    /// Gas turned into stars.
    pub formed: f64,
    /// Gas returned by dying stars.
    pub returned: f64,
    /// Gas ejected in outflows.
    pub outflow: f64,
}

// ── ZoneStep ──────────────────────────────────────────────────────

/// What one call to [`Zone::advance`] produced.
#[derive(Clone, Debug)]
pub struct ZoneStep {
    /// History row, when an output time fell on this step.
    pub row: Option<HistoryRow>,
    /// Tracers formed during the step, in id order.
    pub formed: Vec<Tracer>,
    /// Whether the final output has been written.
    pub complete: bool,
    /// Number of warnings raised during the step.
    pub warnings: u64,
}

/// Rates at the start of a step.
struct Rates {
    sfr: f64,
    ifr: f64,
    ofr: f64,
    eta: f64,
    tau_eff: f64,
    next_gas: f64,
    recycled: f64,
}

/// Per-resident weights for the current step, mass-weighted.
struct Resident<'a> {
    returned: f64,
    ia: f64,
    agb: f64,
    turnoff: f64,
    metallicity: f64,
    abundances: &'a [f64],
}

// ── Zone ──────────────────────────────────────────────────────────

/// A single zone's gas state and step loop.
pub struct Zone {
    id: ZoneId,
    config: ZoneConfig,
    tables: PopulationTables,
    step: StepIndex,
    gas_mass: f64,
    element_masses: Abundances,
    sfr_window: VecDeque<f64>,
    window: usize,
    next_output: usize,
    budget: MassBudget,
    initial_gas_mass: f64,
    warnings: Vec<NumericalWarning>,
    history: Vec<HistoryRow>,
    complete: bool,
}

impl Zone {
    /// Validate `config`, build the population tables and set up the
    /// initial state.
    ///
    /// # Errors
    ///
    /// The first configuration violation found, before any state is built.
    pub fn prepare(id: ZoneId, config: ZoneConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let imf = Imf::new(&config.imf, config.m_lower, config.m_upper)?;
        let mlr = MassLifetimeRelation::new(config.mlr.clone());
        mlr.validate(config.post_ms)?;
        let tables = PopulationTables::new(&config, &imf, &mlr)?;

        let gas_mass = match config.mode {
            Mode::Infall => config.initial_gas_mass,
            Mode::GasMass => config.driver.eval(0.0),
            Mode::StarFormation => gas_for_sfr(&config, config.driver.eval(0.0), 0.0),
        };
        if !(gas_mass.is_finite() && gas_mass >= 0.0) {
            return Err(ConfigError::invalid(
                "driver",
                format!("initial gas mass must be finite and non-negative, got {gas_mass}"),
            ));
        }
        let window = ((config.smoothing / config.dt).round() as usize).max(1);

        let mut zone = Self {
            id,
            element_masses: config.elements.zeros(),
            tables,
            step: StepIndex(0),
            gas_mass,
            sfr_window: VecDeque::with_capacity(window),
            window,
            next_output: 0,
            budget: MassBudget::default(),
            initial_gas_mass: gas_mass,
            warnings: Vec::new(),
            history: Vec::new(),
            complete: false,
            config,
        };
        for reason in zone.config.questionable() {
            zone.warn("config".into(), 0.0, WarningKind::QuestionableParameter { reason });
        }
        log::debug!(
            "zone {} ({}) prepared: mode {}, {} steps, Mgas(0) = {:e}",
            zone.id,
            zone.config.name,
            zone.config.mode,
            zone.config.steps(),
            zone.gas_mass
        );
        Ok(zone)
    }

    /// Zone identifier.
    pub fn id(&self) -> ZoneId {
        self.id
    }

    /// The validated configuration.
    pub fn config(&self) -> &ZoneConfig {
        &self.config
    }

    /// Age-indexed population tables.
    pub fn tables(&self) -> &PopulationTables {
        &self.tables
    }

    /// Index of the next step to take.
    pub fn step_index(&self) -> StepIndex {
        self.step
    }

    /// Simulation time at the start of the next step.
    pub fn time(&self) -> f64 {
        self.step.time(self.config.dt)
    }

    /// Current ISM gas mass in Msun.
    pub fn gas_mass(&self) -> f64 {
        self.gas_mass
    }

    /// Gas mass at `t = 0`.
    pub fn initial_gas_mass(&self) -> f64 {
        self.initial_gas_mass
    }

    /// Current ISM mass of each tracked element.
    pub fn element_masses(&self) -> &[f64] {
        &self.element_masses
    }

    /// Cumulative gas flows.
    pub fn budget(&self) -> MassBudget {
        self.budget
    }

    /// Every warning raised so far.
    pub fn warnings(&self) -> &[NumericalWarning] {
        &self.warnings
    }

    /// Rows emitted so far.
    pub fn history(&self) -> &[HistoryRow] {
        &self.history
    }

    /// Whether the final output has been emitted.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Consume the zone, keeping its configuration, rows and warnings.
    pub(crate) fn into_parts(self) -> (ZoneConfig, Vec<HistoryRow>, Vec<NumericalWarning>) {
        (self.config, self.history, self.warnings)
    }

    /// Override the zone area, in kpc².
    pub(crate) fn set_area(&mut self, area: f64) {
        self.config.area = area;
    }

    fn warn(&mut self, quantity: String, time: f64, kind: WarningKind) {
        let w = NumericalWarning {
            zone: self.id,
            step: self.step,
            time,
            quantity,
            kind,
        };
        log::warn!("{w}");
        self.warnings.push(w);
    }

    /// Mass fraction of each element in the ISM.
    fn mass_fractions(&self) -> Abundances {
        self.element_masses
            .iter()
            .map(|&m| if self.gas_mass > 0.0 { m / self.gas_mass } else { 0.0 })
            .collect()
    }

    /// Whether an output time falls on the current step, consuming every
    /// output time within half a step of it.
    fn take_output(&mut self, t: f64) -> bool {
        let times = &self.config.output_times;
        let half = 0.5 * self.config.dt;
        let first = self.next_output;
        while self.next_output < times.len() && times[self.next_output] <= t + half {
            self.next_output += 1;
        }
        let taken = self.next_output - first;
        if taken > 1 {
            log::debug!(
                "zone {}: {} output times fall within step {}, writing one row",
                self.id,
                taken,
                self.step
            );
        }
        taken > 0
    }

    fn rates(&self, t: f64, residents: &[Resident<'_>]) -> Result<Rates, RunError> {
        let cfg = &self.config;
        let scale = YEARS_PER_GYR * cfg.dt;
        let tau = self.checked("tau_star", cfg.tau_star.eval(t), |v| v > 0.0)?;
        let tau_eff = match &cfg.schmidt {
            Some(s) if self.gas_mass > 0.0 => s.timescale(tau, self.gas_mass),
            _ => tau,
        };
        let sfr = if self.gas_mass > 0.0 {
            self.gas_mass / (tau_eff * YEARS_PER_GYR)
        } else {
            0.0
        };
        let m_star = sfr * scale;

        let smoothed = if self.window > 1 {
            let sum: f64 = self.sfr_window.iter().sum::<f64>() + sfr;
            sum / (self.sfr_window.len() + 1) as f64
        } else {
            sfr
        };
        let eta = self.checked("eta", cfg.eta.eval(t), |v| v >= 0.0)?;
        let ofr = eta * smoothed;

        let recycled = match cfg.recycling {
            Recycling::Continuous => {
                residents.iter().map(|r| r.returned).sum::<f64>()
                    + m_star * self.tables.returned(0)
            }
            Recycling::Instantaneous(r) => r * m_star,
        };

        let (ifr, next_gas) = match cfg.mode {
            Mode::Infall => {
                let ifr = cfg.driver.eval(t);
                let next = self.gas_mass + (ifr - ofr) * scale - m_star + recycled;
                (ifr, next)
            }
            Mode::StarFormation | Mode::GasMass => {
                let t_next = t + cfg.dt;
                let target = match cfg.mode {
                    Mode::GasMass => cfg.driver.eval(t_next),
                    _ => gas_for_sfr(cfg, cfg.driver.eval(t_next), t_next),
                };
                let ifr = (target - self.gas_mass + m_star + ofr * scale - recycled) / scale;
                (ifr, target)
            }
        };
        Ok(Rates {
            sfr,
            ifr,
            ofr,
            eta,
            tau_eff,
            next_gas,
            recycled,
        })
    }

    /// `value` if it is finite and satisfies `ok`.
    fn checked(&self, name: &'static str, value: f64, ok: impl Fn(f64) -> bool) -> Result<f64, RunError> {
        if value.is_finite() && ok(value) {
            Ok(value)
        } else {
            Err(RunError::InvalidAttribute {
                name,
                value,
                step: self.step.0,
            })
        }
    }

    /// Take one step.
    ///
    /// `residents` are the tracers occupying this zone at the start of
    /// the step; tracers formed during the step get ids starting at
    /// `first_id`. Calling again after completion is a no-op returning
    /// an empty, complete step.
    ///
    /// # Errors
    ///
    /// - [`RunError::InvalidAttribute`] if `tau_star` evaluates to a
    ///   non-positive value, or `eta` or `enhancement` to a negative one
    /// - [`RunError::NonFinite`] if the gas mass or an element mass becomes
    ///   NaN or infinite
    ///
    /// The update is not applied in either case.
    pub fn advance(&mut self, residents: &[&Tracer], first_id: TracerId) -> Result<ZoneStep, RunError> {
        if self.complete {
            return Ok(ZoneStep {
                row: None,
                formed: Vec::new(),
                complete: true,
                warnings: 0,
            });
        }
        let warnings_before = self.warnings.len();
        let dt = self.config.dt;
        let scale = YEARS_PER_GYR * dt;
        let t = self.step.time(dt);
        let now = self.step;

        let weights: Vec<Resident<'_>> = residents
            .iter()
            .map(|tr| {
                let k = tr.age_steps(now);
                Resident {
                    returned: tr.mass * self.tables.returned(k),
                    ia: tr.mass * self.tables.ia_fraction(k),
                    agb: tr.mass * self.tables.agb_fraction(k),
                    turnoff: self.tables.turnoff(k),
                    metallicity: tr.metallicity,
                    abundances: &tr.abundances,
                }
            })
            .collect();
        let rates = self.rates(t, &weights)?;
        let m_star = rates.sfr * scale;

        let fractions = self.mass_fractions();
        let z = self.config.elements.scaled_metallicity(&fractions, self.config.z_solar);
        let zin: Abundances = self
            .config
            .elements
            .iter()
            .map(|e| self.config.zin.get(&e).map_or(0.0, |f| f.eval(t)))
            .collect();

        // 3. Output.
        let row = if self.take_output(t) {
            let stellar_mass = residents
                .iter()
                .map(|tr| tr.mass * (1.0 - self.tables.crf(tr.age_steps(now))))
                .sum();
            let row = HistoryRow {
                time: t,
                gas_mass: self.gas_mass,
                stellar_mass,
                sfr: rates.sfr,
                infall_rate: rates.ifr,
                outflow_rate: rates.ofr,
                eta: rates.eta,
                tau_star: rates.tau_eff,
                r_eff: if m_star > 0.0 { rates.recycled / m_star } else { 0.0 },
                element_masses: self.element_masses.clone(),
                infall_metallicity: zin.clone(),
            };
            self.history.push(row.clone());
            Some(row)
        } else {
            None
        };
        if self.next_output == self.config.output_times.len() {
            self.complete = true;
            log::debug!("zone {} complete at t = {t:.4} Gyr", self.id);
            return Ok(ZoneStep {
                row,
                formed: Vec::new(),
                complete: true,
                warnings: (self.warnings.len() - warnings_before) as u64,
            });
        }

        if rates.ifr < 0.0 {
            self.warn("ifr".into(), t, WarningKind::NegativeInfall { value: rates.ifr });
        }

        // 4. Enrichment.
        let enhancement = self.checked("enhancement", self.config.enhancement.eval(t), |v| v >= 0.0)?;
        let outflow_mass = rates.ofr * scale;
        let infall_mass = rates.ifr * scale;
        let mut next: SmallVec<[f64; 8]> = SmallVec::with_capacity(fractions.len());
        for (i, e) in self.config.elements.iter().enumerate() {
            let cfg = &self.config;
            let zx = fractions[i];
            let inflow = if infall_mass >= 0.0 {
                infall_mass * zin[i]
            } else {
                infall_mass * zx
            };
            let ccsn = cfg.entrainment.ccsn(e) * cfg.yields.ccsn_at(e, z) * m_star;

            let mut snia = m_star * self.tables.ia_fraction(0) * cfg.yields.snia_at(e, z);
            let mut agb = 0.0;
            let mut recycled = match cfg.recycling {
                Recycling::Continuous => m_star * self.tables.returned(0) * zx,
                Recycling::Instantaneous(r) => r * m_star * zx,
            };
            for r in &weights {
                if r.ia > 0.0 {
                    snia += r.ia * cfg.yields.snia_at(e, r.metallicity);
                }
                if r.agb > 0.0 && r.turnoff <= CCSN_THRESHOLD {
                    agb += r.agb * cfg.yields.agb_at(e, r.turnoff, r.metallicity);
                }
                if let Recycling::Continuous = cfg.recycling {
                    recycled += r.returned * r.abundances[i];
                }
            }
            snia *= cfg.entrainment.snia(e);
            agb *= cfg.entrainment.agb(e);

            let locked = m_star * zx;
            let ejected = outflow_mass * enhancement * zx;
            next.push(self.element_masses[i] + inflow + ccsn + snia + agb + recycled - locked - ejected);
        }

        let mut next_gas = rates.next_gas;
        if next_gas < 0.0 {
            self.warn("mgas".into(), t, WarningKind::ClippedNegative { value: next_gas });
            next_gas = 0.0;
            next.iter_mut().for_each(|m| *m = 0.0);
        }
        if !next_gas.is_finite() {
            return Err(RunError::NonFinite {
                quantity: "mgas".into(),
                step: now.0,
            });
        }
        for (i, e) in self.config.elements.iter().enumerate() {
            if !next[i].is_finite() {
                return Err(RunError::NonFinite {
                    quantity: format!("mass({e})"),
                    step: now.0,
                });
            }
        }
        for i in 0..next.len() {
            if next[i] < 0.0 {
                let e = self.config.elements.as_slice()[i];
                self.warn(format!("mass({e})"), t, WarningKind::ClippedNegative { value: next[i] });
                next[i] = 0.0;
            }
        }

        // 5. New populations.
        let n = self.config.n_stars;
        let formed: Vec<Tracer> = (0..n)
            .map(|j| Tracer {
                id: TracerId(first_id.0 + u64::from(j)),
                zone_origin: self.id,
                zone: self.id,
                formation_step: now,
                formation_time: t,
                mass: m_star / f64::from(n),
                metallicity: z,
                abundances: fractions.clone(),
            })
            .collect();

        self.budget.infall += infall_mass;
        self.budget.formed += m_star;
        self.budget.returned += rates.recycled;
        self.budget.outflow += outflow_mass;
        self.gas_mass = next_gas;
        self.element_masses = next;
        if self.window > 1 {
            if self.sfr_window.len() + 1 == self.window {
                self.sfr_window.pop_front();
            }
            self.sfr_window.push_back(rates.sfr);
        }
        self.step = StepIndex(now.0 + 1);

        Ok(ZoneStep {
            row,
            formed,
            complete: false,
            warnings: (self.warnings.len() - warnings_before) as u64,
        })
    }
}

impl std::fmt::Debug for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Zone")
            .field("id", &self.id)
            .field("name", &self.config.name)
            .field("step", &self.step)
            .field("gas_mass", &self.gas_mass)
            .field("complete", &self.complete)
            .finish_non_exhaustive()
    }
}

/// Gas mass sustaining `sfr` Msun/yr at time `t`.
fn gas_for_sfr(config: &ZoneConfig, sfr: f64, t: f64) -> f64 {
    let tau = config.tau_star.eval(t);
    match &config.schmidt {
        Some(s) => s.gas_for_sfr(sfr, tau),
        None => sfr * tau * YEARS_PER_GYR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{linspace_step, Schmidt};
    use gce_core::{Element, ElementSet, TimeFunction};

    fn config(end: f64) -> ZoneConfig {
        let mut cfg = ZoneConfig::default();
        cfg.output_times = linspace_step(0.0, end, 0.1);
        cfg
    }

    /// Run to completion, keeping every tracer resident.
    fn run(zone: &mut Zone) -> Vec<Tracer> {
        let mut tracers: Vec<Tracer> = Vec::new();
        loop {
            let refs: Vec<&Tracer> = tracers.iter().collect();
            let step = zone.advance(&refs, TracerId(tracers.len() as u64)).unwrap();
            tracers.extend(step.formed);
            if step.complete {
                return tracers;
            }
        }
    }

    #[test]
    fn rows_land_on_output_times() {
        let mut zone = Zone::prepare(ZoneId(0), config(1.0)).unwrap();
        let tracers = run(&mut zone);
        assert_eq!(zone.history().len(), 11);
        assert_eq!(tracers.len(), 100);
        for (row, want) in zone.history().iter().zip(linspace_step(0.0, 1.0, 0.1)) {
            assert!((row.time - want).abs() < 1e-9);
        }
        assert!(zone.is_complete());
    }

    #[test]
    fn advance_after_completion_is_a_no_op() {
        let mut zone = Zone::prepare(ZoneId(0), config(0.1)).unwrap();
        run(&mut zone);
        let gas = zone.gas_mass();
        let step = zone.advance(&[], TracerId(0)).unwrap();
        assert!(step.complete && step.row.is_none() && step.formed.is_empty());
        assert_eq!(zone.gas_mass(), gas);
    }

    #[test]
    fn dense_output_times_merge_into_one_row() {
        let mut cfg = config(0.1);
        cfg.output_times = vec![0.0, 0.001, 0.002, 0.05, 0.1];
        let mut zone = Zone::prepare(ZoneId(0), cfg).unwrap();
        run(&mut zone);
        assert_eq!(zone.history().len(), 3);
    }

    #[test]
    fn tracers_carry_formation_state() {
        let mut cfg = config(0.5);
        cfg.n_stars = 4;
        let mut zone = Zone::prepare(ZoneId(3), cfg).unwrap();
        let tracers = run(&mut zone);
        assert_eq!(tracers.len(), 200);
        let ids: Vec<u64> = tracers.iter().map(|t| t.id.0).collect();
        assert_eq!(ids, (0..200).collect::<Vec<_>>());
        assert!(tracers.iter().all(|t| t.zone_origin == ZoneId(3)));
        // The first populations form from pristine gas.
        assert_eq!(tracers[0].metallicity, 0.0);
        assert!(tracers[199].metallicity > 0.0);
        let a = &tracers[4];
        let b = &tracers[7];
        assert_eq!(a.mass, b.mass);
        assert_eq!(a.formation_step, b.formation_step);
    }

    #[test]
    fn gas_mode_follows_the_prescribed_mass() {
        let mut cfg = config(1.0);
        cfg.mode = Mode::GasMass;
        cfg.driver = TimeFunction::custom(|t| 5e9 + 1e9 * t);
        let mut zone = Zone::prepare(ZoneId(0), cfg).unwrap();
        run(&mut zone);
        for row in zone.history() {
            let want = 5e9 + 1e9 * row.time;
            assert!((row.gas_mass - want).abs() / want < 1e-9, "t = {}", row.time);
        }
    }

    #[test]
    fn sfr_mode_follows_the_prescribed_rate() {
        let mut cfg = config(1.0);
        cfg.mode = Mode::StarFormation;
        cfg.driver = TimeFunction::Constant(2.0);
        cfg.schmidt = Some(Schmidt::default());
        let mut zone = Zone::prepare(ZoneId(0), cfg).unwrap();
        run(&mut zone);
        for row in zone.history() {
            assert!((row.sfr - 2.0).abs() < 1e-9, "sfr = {}", row.sfr);
        }
    }

    #[test]
    fn falling_gas_prescription_warns_about_negative_infall() {
        let mut cfg = config(0.5);
        cfg.mode = Mode::GasMass;
        cfg.driver = TimeFunction::custom(|t| 6e9 * (-10.0 * t).exp());
        let mut zone = Zone::prepare(ZoneId(0), cfg).unwrap();
        run(&mut zone);
        assert!(zone
            .warnings()
            .iter()
            .any(|w| matches!(w.kind, WarningKind::NegativeInfall { .. })));
    }

    #[test]
    fn extreme_outflow_clips_gas_and_elements() {
        let mut cfg = config(0.5);
        cfg.eta = TimeFunction::Constant(500.0);
        let mut zone = Zone::prepare(ZoneId(0), cfg).unwrap();
        run(&mut zone);
        let kinds: Vec<&WarningKind> = zone.warnings().iter().map(|w| &w.kind).collect();
        assert!(kinds.iter().any(|k| matches!(k, WarningKind::QuestionableParameter { .. })));
        assert!(kinds.iter().any(|k| matches!(k, WarningKind::ClippedNegative { .. })));
        assert!(zone.element_masses().iter().all(|&m| m >= 0.0));
        assert!(zone.gas_mass() >= 0.0);
    }

    #[test]
    fn infall_metallicity_enriches_the_ism() {
        let mut cfg = config(0.2);
        cfg.yields = gce_yields::YieldConfiguration::new();
        cfg.eta = TimeFunction::Constant(0.0);
        cfg.zin.insert(Element::O, TimeFunction::Constant(1e-3));
        let mut zone = Zone::prepare(ZoneId(0), cfg).unwrap();
        run(&mut zone);
        let o = zone.config().elements.index_of(Element::O).unwrap();
        let fe = zone.config().elements.index_of(Element::Fe).unwrap();
        assert!(zone.element_masses()[o] > 0.0);
        assert_eq!(zone.element_masses()[fe], 0.0);
        let last = zone.history().last().unwrap();
        assert_eq!(last.infall_metallicity[o], 1e-3);
    }

    #[test]
    fn instantaneous_recycling_returns_a_fixed_fraction() {
        let mut cfg = config(0.3);
        cfg.recycling = Recycling::Instantaneous(0.4);
        let mut zone = Zone::prepare(ZoneId(0), cfg).unwrap();
        run(&mut zone);
        for row in &zone.history()[1..] {
            assert!((row.r_eff - 0.4).abs() < 1e-12);
        }
    }

    #[test]
    fn entrainment_zero_keeps_ccsn_products_out() {
        let mut cfg = config(0.1);
        cfg.entrainment.ccsn.insert(Element::O, 0.0);
        let mut zone = Zone::prepare(ZoneId(0), cfg).unwrap();
        run(&mut zone);
        let o = zone.config().elements.index_of(Element::O).unwrap();
        assert_eq!(zone.element_masses()[o], 0.0);
    }

    #[test]
    fn agb_winds_add_strontium() {
        let sr_after = |agb_retained: f64| {
            let mut cfg = config(2.0);
            cfg.elements = ElementSet::parse(&["o", "fe", "sr"]).unwrap();
            cfg.yields = gce_yields::presets::jw20();
            cfg.entrainment.agb.insert(Element::Sr, agb_retained);
            let mut zone = Zone::prepare(ZoneId(0), cfg).unwrap();
            run(&mut zone);
            let sr = zone.config().elements.index_of(Element::Sr).unwrap();
            zone.element_masses()[sr]
        };
        let with_agb = sr_after(1.0);
        let ccsn_only = sr_after(0.0);
        assert!(ccsn_only > 0.0);
        assert!(with_agb > 1.01 * ccsn_only, "{with_agb} vs {ccsn_only}");
    }

    fn outflow_after_sfr_jump(smoothing: f64) -> Vec<(f64, f64)> {
        let mut cfg = config(1.0);
        cfg.output_times = linspace_step(0.0, 1.0, 0.01);
        cfg.mode = Mode::StarFormation;
        cfg.driver = TimeFunction::custom(|t| if t < 0.505 { 1.0 } else { 3.0 });
        cfg.eta = TimeFunction::Constant(1.0);
        cfg.smoothing = smoothing;
        let mut zone = Zone::prepare(ZoneId(0), cfg).unwrap();
        run(&mut zone);
        zone.history()
            .iter()
            .skip_while(|r| r.sfr < 2.0)
            .map(|r| (r.sfr, r.outflow_rate))
            .collect()
    }

    #[test]
    fn instantaneous_outflow_follows_sfr() {
        let rows = outflow_after_sfr_jump(0.0);
        let (sfr, ofr) = rows[0];
        assert!((sfr - 3.0).abs() < 1e-9);
        assert!((ofr - 3.0).abs() < 1e-9, "{ofr}");
    }

    #[test]
    fn smoothed_outflow_ramps_over_the_window() {
        // A 0.2 Gyr window spans 20 steps.
        let rows = outflow_after_sfr_jump(0.2);
        assert!(rows.len() > 25);
        assert!((rows[0].1 - 1.1).abs() < 1e-9, "{}", rows[0].1);
        for w in rows[..20].windows(2) {
            assert!(w[1].1 > w[0].1);
        }
        assert!(rows[10].1 < 3.0 - 1e-6);
        assert!((rows[19].1 - 3.0).abs() < 1e-9, "{}", rows[19].1);
        assert!((rows[25].1 - 3.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_config_is_rejected_before_any_state() {
        let mut cfg = config(1.0);
        cfg.dt = -0.01;
        assert!(matches!(
            Zone::prepare(ZoneId(0), cfg),
            Err(ConfigError::InvalidTimestep { .. })
        ));
    }
}
