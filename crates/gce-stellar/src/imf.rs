//! Stellar initial mass functions.
//!
//! An [`Imf`] is normalized so that `∫ M ξ(M) dM = 1` over its support:
//! [`Imf::weight`] is then the number of stars per unit mass interval
//! per solar mass of stars formed. Power-law forms integrate in closed
//! form; custom forms fall back to quadrature.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use gce_core::{ConfigError, ScalarFn};

use crate::quadrature::{Integrator, QuadratureRule};
use crate::remnant::{self, CCSN_THRESHOLD};

/// Default lower mass limit in Msun.
pub const DEFAULT_M_LOWER: f64 = 0.08;
/// Default upper mass limit in Msun.
pub const DEFAULT_M_UPPER: f64 = 100.0;

const KROUPA_BREAKS: [f64; 2] = [0.08, 0.5];
const KROUPA_SLOPES: [f64; 3] = [0.3, 1.3, 2.3];
const SALPETER_SLOPE: f64 = 2.35;

/// Samples used to reject custom IMFs that go negative.
const VALIDATION_SAMPLES: usize = 1000;

/// Which IMF to build.
///
/// Slopes follow the convention `ξ ∝ M^-slope`.
#[derive(Clone, Default)]
pub enum ImfSpec {
    /// Kroupa (2001): slopes 0.3, 1.3, 2.3 with breaks at 0.08 and 0.5 Msun.
    #[default]
    Kroupa,
    /// Salpeter (1955): a single slope of 2.35.
    Salpeter,
    /// A single power law.
    PowerLaw {
        /// Slope.
        slope: f64,
    },
    /// A continuous broken power law.
    BrokenPowerLaw {
        /// Break masses, strictly increasing.
        breaks: Vec<f64>,
        /// One more slope than there are breaks.
        slopes: Vec<f64>,
    },
    /// Arbitrary non-negative function of mass, unnormalized.
    Custom(ScalarFn),
}

impl ImfSpec {
    /// Wrap a closure.
    pub fn custom(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }
}

impl FromStr for ImfSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kroupa" => Ok(Self::Kroupa),
            "salpeter" => Ok(Self::Salpeter),
            _ => Err(ConfigError::UnrecognizedKeyword {
                what: "imf".into(),
                keyword: s.to_string(),
            }),
        }
    }
}

impl fmt::Debug for ImfSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kroupa => write!(f, "Kroupa"),
            Self::Salpeter => write!(f, "Salpeter"),
            Self::PowerLaw { slope } => write!(f, "PowerLaw({slope})"),
            Self::BrokenPowerLaw { breaks, slopes } => {
                write!(f, "BrokenPowerLaw({breaks:?}, {slopes:?})")
            }
            Self::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}

// ── Shapes ─────────────────────────────────────────────────────────

/// One power-law piece `coeff * M^-slope` on `[lo, hi]`.
#[derive(Clone, Copy, Debug)]
struct Segment {
    lo: f64,
    hi: f64,
    slope: f64,
    coeff: f64,
}

impl Segment {
    /// `∫ M^k * coeff * M^-slope dM` over `[a, b] ∩ [lo, hi]`.
    fn moment(&self, k: f64, a: f64, b: f64) -> f64 {
        let a = a.max(self.lo);
        let b = b.min(self.hi);
        if b <= a {
            return 0.0;
        }
        let p = k - self.slope + 1.0;
        if p.abs() < 1e-12 {
            self.coeff * (b / a).ln()
        } else {
            self.coeff * (b.powf(p) - a.powf(p)) / p
        }
    }
}

#[derive(Clone)]
enum Shape {
    Segments(Vec<Segment>),
    Custom { f: ScalarFn, integrator: Integrator },
}

impl Shape {
    fn raw(&self, m: f64) -> f64 {
        match self {
            Self::Segments(segs) => segs
                .iter()
                .find(|s| m >= s.lo && m <= s.hi)
                .map_or(0.0, |s| s.coeff * m.powf(-s.slope)),
            Self::Custom { f, .. } => f(m),
        }
    }

    fn moment(&self, k: f64, a: f64, b: f64) -> f64 {
        match self {
            Self::Segments(segs) => segs.iter().map(|s| s.moment(k, a, b)).sum(),
            Self::Custom { f, integrator } => {
                integrator.integrate(|m| m.powf(k) * f(m), a, b).value
            }
        }
    }
}

/// Continuous pieces for a broken power law restricted to `[lower, upper]`.
fn segments(breaks: &[f64], slopes: &[f64], lower: f64, upper: f64) -> Vec<Segment> {
    let mut out = Vec::with_capacity(slopes.len());
    let mut coeff = 1.0;
    for (i, &slope) in slopes.iter().enumerate() {
        if i > 0 {
            let b = breaks[i - 1];
            coeff *= b.powf(slope - slopes[i - 1]);
        }
        let lo = if i == 0 { 0.0 } else { breaks[i - 1] };
        let hi = breaks.get(i).copied().unwrap_or(f64::INFINITY);
        let lo = lo.max(lower);
        let hi = hi.min(upper);
        if hi > lo {
            out.push(Segment {
                lo,
                hi,
                slope,
                coeff,
            });
        }
    }
    out
}

// ── Imf ────────────────────────────────────────────────────────────

/// A normalized initial mass function on `[m_lower, m_upper]`.
#[derive(Clone)]
pub struct Imf {
    m_lower: f64,
    m_upper: f64,
    shape: Shape,
    norm: f64,
}

impl Imf {
    /// Build and normalize an IMF over `[m_lower, m_upper]`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidMassRange`] unless `0 < m_lower < m_upper`,
    /// [`ConfigError::NegativeImf`] if a custom form goes negative,
    /// [`ConfigError::InvalidParameter`] for malformed slopes or breaks
    /// or a custom form with no mass.
    pub fn new(spec: &ImfSpec, m_lower: f64, m_upper: f64) -> Result<Self, ConfigError> {
        if !(m_lower.is_finite() && m_upper.is_finite() && 0.0 < m_lower && m_lower < m_upper) {
            return Err(ConfigError::InvalidMassRange {
                lower: m_lower,
                upper: m_upper,
            });
        }
        let shape = match spec {
            ImfSpec::Kroupa => {
                Shape::Segments(segments(&KROUPA_BREAKS, &KROUPA_SLOPES, m_lower, m_upper))
            }
            ImfSpec::Salpeter => {
                Shape::Segments(segments(&[], &[SALPETER_SLOPE], m_lower, m_upper))
            }
            ImfSpec::PowerLaw { slope } => {
                check_slopes(std::slice::from_ref(slope))?;
                Shape::Segments(segments(&[], &[*slope], m_lower, m_upper))
            }
            ImfSpec::BrokenPowerLaw { breaks, slopes } => {
                check_slopes(slopes)?;
                if slopes.len() != breaks.len() + 1 {
                    return Err(ConfigError::invalid(
                        "imf",
                        format!(
                            "{} breaks need {} slopes, got {}",
                            breaks.len(),
                            breaks.len() + 1,
                            slopes.len()
                        ),
                    ));
                }
                let increasing = breaks.windows(2).all(|w| w[0] < w[1]);
                if !increasing || breaks.iter().any(|b| !b.is_finite() || *b <= 0.0) {
                    return Err(ConfigError::invalid(
                        "imf",
                        "break masses must be positive and strictly increasing",
                    ));
                }
                Shape::Segments(segments(breaks, slopes, m_lower, m_upper))
            }
            ImfSpec::Custom(f) => {
                check_custom(f, m_lower, m_upper)?;
                Shape::Custom {
                    f: Arc::clone(f),
                    integrator: Integrator {
                        rule: QuadratureRule::Simpson,
                        tolerance: 1e-6,
                        ..Integrator::default()
                    },
                }
            }
        };
        let total = shape.moment(1.0, m_lower, m_upper);
        if !(total.is_finite() && total > 0.0) {
            return Err(ConfigError::invalid(
                "imf",
                format!("total stellar mass must be finite and positive, got {total}"),
            ));
        }
        Ok(Self {
            m_lower,
            m_upper,
            shape,
            norm: 1.0 / total,
        })
    }

    /// Kroupa (2001) IMF.
    pub fn kroupa(m_lower: f64, m_upper: f64) -> Result<Self, ConfigError> {
        Self::new(&ImfSpec::Kroupa, m_lower, m_upper)
    }

    /// Salpeter (1955) IMF.
    pub fn salpeter(m_lower: f64, m_upper: f64) -> Result<Self, ConfigError> {
        Self::new(&ImfSpec::Salpeter, m_lower, m_upper)
    }

    /// A single power law `ξ ∝ M^-slope`.
    pub fn power_law(slope: f64, m_lower: f64, m_upper: f64) -> Result<Self, ConfigError> {
        Self::new(&ImfSpec::PowerLaw { slope }, m_lower, m_upper)
    }

    /// A continuous broken power law.
    pub fn broken_power_law(
        breaks: Vec<f64>,
        slopes: Vec<f64>,
        m_lower: f64,
        m_upper: f64,
    ) -> Result<Self, ConfigError> {
        Self::new(&ImfSpec::BrokenPowerLaw { breaks, slopes }, m_lower, m_upper)
    }

    /// A custom unnormalized IMF.
    pub fn custom(
        f: impl Fn(f64) -> f64 + Send + Sync + 'static,
        m_lower: f64,
        m_upper: f64,
    ) -> Result<Self, ConfigError> {
        Self::new(&ImfSpec::custom(f), m_lower, m_upper)
    }

    /// Lower mass limit.
    pub fn m_lower(&self) -> f64 {
        self.m_lower
    }

    /// Upper mass limit.
    pub fn m_upper(&self) -> f64 {
        self.m_upper
    }

    /// Normalized weight `ξ(M)`; zero outside the support.
    pub fn weight(&self, mass: f64) -> f64 {
        if mass < self.m_lower || mass > self.m_upper {
            return 0.0;
        }
        self.norm * self.shape.raw(mass)
    }

    /// `∫ ξ dM` over `[a, b]` clipped to the support: stars per Msun formed.
    pub fn number_integral(&self, a: f64, b: f64) -> f64 {
        self.moment(0.0, a, b)
    }

    /// `∫ M ξ dM` over `[a, b]` clipped to the support: fraction of mass formed.
    pub fn mass_integral(&self, a: f64, b: f64) -> f64 {
        self.moment(1.0, a, b)
    }

    /// Fraction of mass formed in stars in `[a, b]` that is returned to
    /// the ISM when they die.
    pub fn returned_mass_integral(&self, a: f64, b: f64) -> f64 {
        let a = a.max(remnant::zero_return_mass());
        if b <= a {
            return 0.0;
        }
        let mut total = 0.0;
        for (lo, hi) in [(a, b.min(CCSN_THRESHOLD)), (a.max(CCSN_THRESHOLD), b)] {
            if hi <= lo {
                continue;
            }
            let (intercept, slope) = remnant::linear_piece(lo);
            let number = self.number_integral(lo, hi);
            let mass = self.mass_integral(lo, hi);
            total += mass - (intercept * number + slope * mass);
        }
        total.max(0.0)
    }

    fn moment(&self, k: f64, a: f64, b: f64) -> f64 {
        let a = a.max(self.m_lower);
        let b = b.min(self.m_upper);
        if b <= a {
            return 0.0;
        }
        self.norm * self.shape.moment(k, a, b)
    }
}

impl fmt::Debug for Imf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match &self.shape {
            Shape::Segments(s) => format!("{} power-law segment(s)", s.len()),
            Shape::Custom { .. } => "custom".to_string(),
        };
        f.debug_struct("Imf")
            .field("m_lower", &self.m_lower)
            .field("m_upper", &self.m_upper)
            .field("shape", &shape)
            .finish()
    }
}

fn check_slopes(slopes: &[f64]) -> Result<(), ConfigError> {
    if slopes.is_empty() || slopes.iter().any(|s| !s.is_finite()) {
        return Err(ConfigError::invalid("imf", "slopes must be finite"));
    }
    Ok(())
}

fn check_custom(f: &ScalarFn, m_lower: f64, m_upper: f64) -> Result<(), ConfigError> {
    let (l0, l1) = (m_lower.ln(), m_upper.ln());
    for i in 0..VALIDATION_SAMPLES {
        let m = (l0 + (l1 - l0) * i as f64 / (VALIDATION_SAMPLES - 1) as f64).exp();
        let w = f(m);
        if w.is_nan() || w.is_infinite() {
            return Err(ConfigError::invalid("imf", format!("non-finite weight at {m} Msun")));
        }
        if w < 0.0 {
            return Err(ConfigError::NegativeImf { mass: m });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rel(a: f64, b: f64) -> f64 {
        ((a - b) / b).abs()
    }

    #[test]
    fn kroupa_is_normalized_by_mass() {
        let imf = Imf::kroupa(DEFAULT_M_LOWER, DEFAULT_M_UPPER).unwrap();
        assert!(rel(imf.mass_integral(0.0, 1e4), 1.0) < 1e-12);
    }

    #[test]
    fn kroupa_is_continuous_at_break() {
        let imf = Imf::kroupa(DEFAULT_M_LOWER, DEFAULT_M_UPPER).unwrap();
        assert!(rel(imf.weight(0.5 - 1e-9), imf.weight(0.5 + 1e-9)) < 1e-6);
    }

    #[test]
    fn salpeter_massive_star_fraction() {
        // ∫_8^100 M^-1.35 / ∫_0.08^100 M^-1.35 for Salpeter.
        let imf = Imf::salpeter(DEFAULT_M_LOWER, DEFAULT_M_UPPER).unwrap();
        let p = -0.35;
        let expect = (100f64.powf(p) - 8f64.powf(p)) / (100f64.powf(p) - 0.08f64.powf(p));
        assert!(rel(imf.mass_integral(8.0, 100.0), expect) < 1e-12);
    }

    #[test]
    fn weight_vanishes_outside_support() {
        let imf = Imf::kroupa(DEFAULT_M_LOWER, DEFAULT_M_UPPER).unwrap();
        assert_eq!(imf.weight(0.01), 0.0);
        assert_eq!(imf.weight(150.0), 0.0);
    }

    #[test]
    fn custom_matches_closed_form() {
        let closed = Imf::salpeter(DEFAULT_M_LOWER, DEFAULT_M_UPPER).unwrap();
        let custom = Imf::custom(|m| m.powf(-2.35), DEFAULT_M_LOWER, DEFAULT_M_UPPER).unwrap();
        assert!(rel(custom.weight(1.0), closed.weight(1.0)) < 1e-4);
        assert!(rel(custom.mass_integral(8.0, 100.0), closed.mass_integral(8.0, 100.0)) < 1e-4);
    }

    #[test]
    fn negative_custom_is_rejected() {
        match Imf::custom(|m| 1.0 - m, DEFAULT_M_LOWER, DEFAULT_M_UPPER) {
            Err(ConfigError::NegativeImf { mass }) => assert!(mass > 1.0),
            other => panic!("expected NegativeImf, got {other:?}"),
        }
    }

    #[test]
    fn bad_mass_range_is_rejected() {
        assert!(matches!(
            Imf::kroupa(10.0, 1.0),
            Err(ConfigError::InvalidMassRange { .. })
        ));
        assert!(matches!(
            Imf::kroupa(0.0, 100.0),
            Err(ConfigError::InvalidMassRange { .. })
        ));
    }

    #[test]
    fn broken_power_law_shape_checks() {
        assert!(Imf::broken_power_law(vec![0.5], vec![1.3], 0.08, 100.0).is_err());
        assert!(Imf::broken_power_law(vec![1.0, 0.5], vec![1.0, 2.0, 3.0], 0.08, 100.0).is_err());
        let kroupa = Imf::kroupa(0.08, 100.0).unwrap();
        let same = Imf::broken_power_law(vec![0.08, 0.5], vec![0.3, 1.3, 2.3], 0.08, 100.0).unwrap();
        assert!(rel(same.weight(3.0), kroupa.weight(3.0)) < 1e-12);
    }

    #[test]
    fn keywords_parse() {
        assert!(matches!("Kroupa".parse::<ImfSpec>(), Ok(ImfSpec::Kroupa)));
        assert!(matches!("salpeter".parse::<ImfSpec>(), Ok(ImfSpec::Salpeter)));
        assert!(matches!(
            "chabrier".parse::<ImfSpec>(),
            Err(ConfigError::UnrecognizedKeyword { .. })
        ));
    }

    #[test]
    fn returned_mass_is_below_mass_formed() {
        let imf = Imf::kroupa(DEFAULT_M_LOWER, DEFAULT_M_UPPER).unwrap();
        let r = imf.returned_mass_integral(0.0, 1e4);
        assert!(r > 0.3 && r < 0.6, "{r}");
    }

    proptest! {
        #[test]
        fn mass_integral_is_additive(split in 0.1f64..99.0) {
            let imf = Imf::kroupa(DEFAULT_M_LOWER, DEFAULT_M_UPPER).unwrap();
            let whole = imf.mass_integral(0.08, 100.0);
            let parts = imf.mass_integral(0.08, split) + imf.mass_integral(split, 100.0);
            prop_assert!((whole - parts).abs() < 1e-12);
        }
    }
}
