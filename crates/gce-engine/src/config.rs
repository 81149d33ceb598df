//! Zone configuration and validation.
//!
//! [`ZoneConfig`] is plain data with public fields and a [`Default`]
//! matching a Milky Way-like single-zone model. [`validate()`](ZoneConfig::validate)
//! checks every invariant before any simulation work; the integrators
//! call it again when preparing, so a hand-assembled config is never
//! trusted.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use gce_core::{ConfigError, Element, ElementSet, TimeFunction};
use gce_stellar::dtd::DEFAULT_DELAY;
use gce_stellar::imf::{DEFAULT_M_LOWER, DEFAULT_M_UPPER};
use gce_stellar::mlr::DEFAULT_POST_MS;
use gce_stellar::{DtdSpec, ImfSpec, Integrator, MlrSpec, QuadratureRule};
use gce_yields::{presets, YieldConfiguration};

/// Default initial ISM mass in Msun for infall-driven zones.
pub const DEFAULT_INITIAL_GAS_MASS: f64 = 6e9;

/// Default solar metallicity by mass.
pub const DEFAULT_Z_SOLAR: f64 = 0.014;

/// Mass-loading factors above this are reported as questionable.
const EXTREME_ETA: f64 = 100.0;

/// Age of the universe in Gyr, rounded.
const HUBBLE_TIME: f64 = 13.8;

// ── Mode ──────────────────────────────────────────────────────────

/// Which quantity the zone's driving function prescribes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Gas infall rate in Msun/yr.
    #[default]
    Infall,
    /// Star formation rate in Msun/yr.
    StarFormation,
    /// ISM gas mass in Msun.
    GasMass,
}

impl Mode {
    /// Keyword used in configuration text.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Infall => "ifr",
            Self::StarFormation => "sfr",
            Self::GasMass => "gas",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ifr" | "infall" => Ok(Self::Infall),
            "sfr" | "star_formation" => Ok(Self::StarFormation),
            "gas" => Ok(Self::GasMass),
            _ => Err(ConfigError::UnrecognizedKeyword {
                what: "mode".into(),
                keyword: s.to_string(),
            }),
        }
    }
}

// ── Recycling ─────────────────────────────────────────────────────

/// How stellar mass loss returns to the ISM.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Recycling {
    /// Each population returns mass as its stars die, following the
    /// cumulative return fraction.
    #[default]
    Continuous,
    /// A fixed fraction of each step's newly formed mass returns at once.
    Instantaneous(f64),
}

// ── Schmidt ───────────────────────────────────────────────────────

/// Kennicutt–Schmidt scaling of the star formation timescale.
///
/// `tau_eff = tau_star * (Mgas / reference_gas_mass)^(-index)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Schmidt {
    /// Power-law index. Default: 0.5.
    pub index: f64,
    /// Gas mass at which `tau_eff == tau_star`, in Msun. Default: 6e9.
    pub reference_gas_mass: f64,
}

impl Default for Schmidt {
    fn default() -> Self {
        Self {
            index: 0.5,
            reference_gas_mass: DEFAULT_INITIAL_GAS_MASS,
        }
    }
}

impl Schmidt {
    /// Effective timescale for a given gas mass.
    pub fn timescale(&self, tau_star: f64, gas_mass: f64) -> f64 {
        tau_star * (gas_mass / self.reference_gas_mass).powf(-self.index)
    }

    /// Gas mass that sustains `sfr` (Msun/yr) given `tau_star` (Gyr).
    pub fn gas_for_sfr(&self, sfr: f64, tau_star: f64) -> f64 {
        let k = sfr * tau_star * gce_core::YEARS_PER_GYR
            * self.reference_gas_mass.powf(self.index);
        k.powf(1.0 / (1.0 + self.index))
    }
}

// ── Entrainment ───────────────────────────────────────────────────

/// Fraction of each channel's fresh yield retained by the ISM.
///
/// Elements absent from a map retain everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Entrainment {
    /// Core-collapse supernovae.
    pub ccsn: IndexMap<Element, f64>,
    /// SN Ia.
    pub snia: IndexMap<Element, f64>,
    /// AGB winds.
    pub agb: IndexMap<Element, f64>,
}

impl Entrainment {
    /// Retained CCSN fraction of `element`.
    pub fn ccsn(&self, element: Element) -> f64 {
        self.ccsn.get(&element).copied().unwrap_or(1.0)
    }

    /// Retained SN Ia fraction of `element`.
    pub fn snia(&self, element: Element) -> f64 {
        self.snia.get(&element).copied().unwrap_or(1.0)
    }

    /// Retained AGB fraction of `element`.
    pub fn agb(&self, element: Element) -> f64 {
        self.agb.get(&element).copied().unwrap_or(1.0)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let channels = [("ccsn", &self.ccsn), ("snia", &self.snia), ("agb", &self.agb)];
        for (channel, map) in channels {
            for (e, f) in map {
                if !(0.0..=1.0).contains(f) {
                    return Err(ConfigError::invalid(
                        format!("entrainment.{channel}({e})"),
                        format!("must lie in [0, 1], got {f}"),
                    ));
                }
            }
        }
        Ok(())
    }
}

// ── ZoneConfig ────────────────────────────────────────────────────

/// Complete configuration of one zone.
///
/// Times in Gyr, masses in Msun, rates in Msun/yr.
#[derive(Clone, Debug)]
pub struct ZoneConfig {
    /// Label used in logs and output.
    pub name: String,
    /// What `driver` prescribes.
    pub mode: Mode,
    /// Infall rate, star formation rate or gas mass, per `mode`.
    pub driver: TimeFunction,
    /// Tracked elements.
    pub elements: ElementSet,
    /// Stellar initial mass function.
    pub imf: ImfSpec,
    /// Mass–lifetime relation.
    pub mlr: MlrSpec,
    /// SN Ia delay-time distribution.
    pub dtd: DtdSpec,
    /// Minimum SN Ia delay. Default: 0.15.
    pub delay: f64,
    /// Outflow mass-loading factor. Default: 2.5.
    pub eta: TimeFunction,
    /// Outflow metallicity relative to the ISM. Default: 1.
    pub enhancement: TimeFunction,
    /// Per-channel retained fractions.
    pub entrainment: Entrainment,
    /// Infall metallicity per element; absent elements fall in pristine.
    pub zin: IndexMap<Element, TimeFunction>,
    /// Stellar mass return.
    pub recycling: Recycling,
    /// ISM mass at `t = 0` for infall-driven zones. Default: 6e9.
    pub initial_gas_mass: f64,
    /// Width of the trailing window over which the outflow-driving star
    /// formation rate is averaged. Default: 0 (instantaneous).
    pub smoothing: f64,
    /// Star formation timescale. Default: 2.
    pub tau_star: TimeFunction,
    /// Optional Kennicutt–Schmidt scaling of `tau_star`.
    pub schmidt: Option<Schmidt>,
    /// Timestep. Default: 0.01.
    pub dt: f64,
    /// Times at which history rows are written; the last one ends the run.
    pub output_times: Vec<f64>,
    /// Lower IMF mass bound. Default: 0.08.
    pub m_lower: f64,
    /// Upper IMF mass bound. Default: 100.
    pub m_upper: f64,
    /// Post main sequence lifetime as a fraction of the main sequence
    /// lifetime. Default: 0.1.
    pub post_ms: f64,
    /// Solar metallicity by mass. Default: 0.014.
    pub z_solar: f64,
    /// Metallicity distribution bin edges in dex. Default: -3 to 1 by 0.05.
    pub mdf_bins: Vec<f64>,
    /// Tracers formed per step. Default: 1.
    pub n_stars: u32,
    /// Zone surface area in kpc².
    pub area: f64,
    /// Quadrature used to normalize the delay-time distribution and any
    /// custom IMF.
    pub integrator: Integrator,
    /// Nucleosynthetic yields.
    pub yields: YieldConfiguration,
}

/// `[start, start + step, ...]` up to and including `end` (to within half a step).
pub fn linspace_step(start: f64, end: f64, step: f64) -> Vec<f64> {
    let n = ((end - start) / step).round() as usize;
    (0..=n).map(|i| start + i as f64 * step).collect()
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            name: "onezone".into(),
            mode: Mode::Infall,
            driver: TimeFunction::Constant(9.1),
            elements: ElementSet::new([Element::Fe, Element::O])
                .unwrap_or_else(|_| unreachable!("two distinct elements")),
            imf: ImfSpec::Kroupa,
            mlr: MlrSpec::PowerLaw,
            dtd: DtdSpec::PowerLaw,
            delay: DEFAULT_DELAY,
            eta: TimeFunction::Constant(2.5),
            enhancement: TimeFunction::Constant(1.0),
            entrainment: Entrainment::default(),
            zin: IndexMap::new(),
            recycling: Recycling::Continuous,
            initial_gas_mass: DEFAULT_INITIAL_GAS_MASS,
            smoothing: 0.0,
            tau_star: TimeFunction::Constant(2.0),
            schmidt: None,
            dt: 0.01,
            output_times: linspace_step(0.0, 10.0, 0.01),
            m_lower: DEFAULT_M_LOWER,
            m_upper: DEFAULT_M_UPPER,
            post_ms: DEFAULT_POST_MS,
            z_solar: DEFAULT_Z_SOLAR,
            mdf_bins: linspace_step(-3.0, 1.0, 0.05),
            n_stars: 1,
            area: 1.0,
            integrator: Integrator::new(QuadratureRule::Simpson, 1e-6),
            yields: presets::waf17(),
        }
    }
}

impl ZoneConfig {
    /// Start a builder from the defaults.
    pub fn builder() -> ZoneConfigBuilder {
        ZoneConfigBuilder {
            config: Self::default(),
            elements: None,
        }
    }

    /// Time of the final output.
    pub fn end_time(&self) -> f64 {
        self.output_times.last().copied().unwrap_or(0.0)
    }

    /// Number of steps from `t = 0` to the final output.
    pub fn steps(&self) -> u64 {
        (self.end_time() / self.dt).round() as u64
    }

    /// SN Ia exponential e-folding time implied by `dtd`, if any.
    pub fn tau_ia(&self) -> Option<f64> {
        match self.dtd {
            DtdSpec::Exponential { tau } => Some(tau),
            _ => None,
        }
    }

    /// Validate all invariants.
    ///
    /// Checks that do not depend on building the IMF, MLR or DTD; those
    /// are validated as they are built during preparation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Clock.
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ConfigError::InvalidTimestep { value: self.dt });
        }
        if self.output_times.is_empty() {
            return Err(ConfigError::EmptyOutputTimes);
        }
        if !(self.output_times[0].is_finite() && self.output_times[0] >= 0.0) {
            return Err(ConfigError::NonMonotonicOutputTimes { index: 0 });
        }
        if let Some(i) = self
            .output_times
            .windows(2)
            .position(|w| !(w[1].is_finite() && w[1] > w[0]))
        {
            return Err(ConfigError::NonMonotonicOutputTimes { index: i + 1 });
        }

        // 2. Scalars.
        let non_negative = [
            ("initial_gas_mass", self.initial_gas_mass),
            ("smoothing", self.smoothing),
            ("delay", self.delay),
        ];
        for (name, v) in non_negative {
            if !(v.is_finite() && v >= 0.0) {
                return Err(ConfigError::invalid(
                    name,
                    format!("must be finite and non-negative, got {v}"),
                ));
            }
        }
        if !(self.z_solar > 0.0 && self.z_solar < 1.0) {
            return Err(ConfigError::invalid(
                "z_solar",
                format!("must lie in (0, 1), got {}", self.z_solar),
            ));
        }
        if !(self.area.is_finite() && self.area > 0.0) {
            return Err(ConfigError::invalid(
                "area",
                format!("must be finite and positive, got {}", self.area),
            ));
        }
        if self.n_stars == 0 {
            return Err(ConfigError::invalid("n_stars", "must be at least 1"));
        }
        if !(self.m_lower > 0.0 && self.m_lower < self.m_upper && self.m_upper.is_finite()) {
            return Err(ConfigError::InvalidMassRange {
                lower: self.m_lower,
                upper: self.m_upper,
            });
        }

        // 3. Functional attributes.
        self.driver.validate_min("driver", 0.0)?;
        self.eta.validate_min("eta", 0.0)?;
        self.enhancement.validate_min("enhancement", 0.0)?;
        self.tau_star.validate_positive("tau_star")?;
        for (e, z) in &self.zin {
            z.validate_fraction(&format!("zin({e})"))?;
        }
        self.entrainment.validate()?;
        if let Recycling::Instantaneous(r) = self.recycling {
            if !(0.0..1.0).contains(&r) {
                return Err(ConfigError::invalid(
                    "recycling",
                    format!("instantaneous return fraction must lie in [0, 1), got {r}"),
                ));
            }
        }
        if let Some(s) = &self.schmidt {
            if !s.index.is_finite() || !(s.reference_gas_mass.is_finite() && s.reference_gas_mass > 0.0)
            {
                return Err(ConfigError::invalid(
                    "schmidt",
                    format!(
                        "index must be finite and reference gas mass positive, got {} and {}",
                        s.index, s.reference_gas_mass
                    ),
                ));
            }
        }

        // 4. Binning, quadrature and yields.
        if self.mdf_bins.len() < 2 || self.mdf_bins.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(ConfigError::invalid(
                "mdf_bins",
                "need at least two strictly increasing edges",
            ));
        }
        self.integrator.validate()?;
        self.yields.validate(&self.elements)?;
        Ok(())
    }

    /// Parameter choices that are legal but rarely physical.
    pub(crate) fn questionable(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let TimeFunction::Constant(eta) = self.eta {
            if eta > EXTREME_ETA {
                out.push(format!("mass-loading factor {eta} exceeds {EXTREME_ETA}"));
            }
        }
        if self.dt > 0.1 {
            out.push(format!("timestep {} Gyr is coarse for SN Ia and AGB timescales", self.dt));
        }
        if let Some(tau) = self.tau_ia() {
            if tau > HUBBLE_TIME {
                out.push(format!("SN Ia e-folding time {tau} Gyr exceeds a Hubble time"));
            }
        }
        out
    }
}

// ── ZoneConfigBuilder ─────────────────────────────────────────────

/// Builder for [`ZoneConfig`].
///
/// Required field: `elements`.
pub struct ZoneConfigBuilder {
    config: ZoneConfig,
    elements: Option<Vec<String>>,
}

impl ZoneConfigBuilder {
    /// Set the zone label.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the tracked elements by symbol.
    pub fn elements<S: AsRef<str>>(mut self, symbols: &[S]) -> Self {
        self.elements = Some(symbols.iter().map(|s| s.as_ref().to_string()).collect());
        self
    }

    /// Set the driving mode and function.
    pub fn driver(mut self, mode: Mode, driver: impl Into<TimeFunction>) -> Self {
        self.config.mode = mode;
        self.config.driver = driver.into();
        self
    }

    /// Set the IMF.
    pub fn imf(mut self, imf: ImfSpec) -> Self {
        self.config.imf = imf;
        self
    }

    /// Set the mass–lifetime relation.
    pub fn mlr(mut self, mlr: MlrSpec) -> Self {
        self.config.mlr = mlr;
        self
    }

    /// Set the delay-time distribution and minimum delay.
    pub fn dtd(mut self, dtd: DtdSpec, delay: f64) -> Self {
        self.config.dtd = dtd;
        self.config.delay = delay;
        self
    }

    /// Set the outflow mass-loading factor.
    pub fn eta(mut self, eta: impl Into<TimeFunction>) -> Self {
        self.config.eta = eta.into();
        self
    }

    /// Set the star formation timescale.
    pub fn tau_star(mut self, tau_star: impl Into<TimeFunction>) -> Self {
        self.config.tau_star = tau_star.into();
        self
    }

    /// Enable the Kennicutt–Schmidt law.
    pub fn schmidt(mut self, schmidt: Schmidt) -> Self {
        self.config.schmidt = Some(schmidt);
        self
    }

    /// Set the recycling prescription.
    pub fn recycling(mut self, recycling: Recycling) -> Self {
        self.config.recycling = recycling;
        self
    }

    /// Set the initial gas mass.
    pub fn initial_gas_mass(mut self, mass: f64) -> Self {
        self.config.initial_gas_mass = mass;
        self
    }

    /// Set the outflow smoothing timescale.
    pub fn smoothing(mut self, smoothing: f64) -> Self {
        self.config.smoothing = smoothing;
        self
    }

    /// Set the timestep and output times.
    pub fn clock(mut self, dt: f64, output_times: Vec<f64>) -> Self {
        self.config.dt = dt;
        self.config.output_times = output_times;
        self
    }

    /// Set the number of tracers formed per step.
    pub fn n_stars(mut self, n: u32) -> Self {
        self.config.n_stars = n;
        self
    }

    /// Set the yields.
    pub fn yields(mut self, yields: YieldConfiguration) -> Self {
        self.config.yields = yields;
        self
    }

    /// Set the metallicity of infalling gas for one element.
    pub fn zin(mut self, element: Element, z: impl Into<TimeFunction>) -> Self {
        self.config.zin.insert(element, z.into());
        self
    }

    /// Build the configuration, validating all fields.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoElements`] if `elements` was never set, or the
    /// first violation found by [`ZoneConfig::validate`].
    pub fn build(self) -> Result<ZoneConfig, ConfigError> {
        let symbols = self.elements.ok_or(ConfigError::NoElements)?;
        let mut config = self.config;
        config.elements = ElementSet::parse(&symbols)?;
        config.validate()?;
        Ok(config)
    }
}
