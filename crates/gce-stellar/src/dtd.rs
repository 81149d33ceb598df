//! SN Ia delay-time distributions.
//!
//! A [`DelayTimeDistribution`] is a density over delay time normalized
//! to unit integral on `[delay, end]`. The integrator consumes it through
//! [`DelayTimeDistribution::step_fractions`]: the fraction of a
//! population's SN Ia events falling in each timestep of its life.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use gce_core::{ConfigError, ScalarFn};

use crate::quadrature::{Integrator, QuadratureRule};

/// Default minimum delay before the first SN Ia, in Gyr.
pub const DEFAULT_DELAY: f64 = 0.15;
/// Default e-folding time of the exponential form, in Gyr.
pub const DEFAULT_TAU_IA: f64 = 1.5;

const POWER_LAW_INDEX: f64 = -1.1;

/// Sub-intervals per timestep when integrating bins.
const BIN_INTERVALS: usize = 16;

/// Which delay-time distribution to use.
#[derive(Clone, Default)]
pub enum DtdSpec {
    /// `R ∝ t^-1.1`.
    #[default]
    PowerLaw,
    /// `R ∝ exp(-t / tau)`.
    Exponential {
        /// e-folding time in Gyr.
        tau: f64,
    },
    /// Arbitrary non-negative function of delay time, unnormalized.
    Custom(ScalarFn),
}

impl DtdSpec {
    /// Wrap a closure.
    pub fn custom(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }
}

impl FromStr for DtdSpec {
    type Err = ConfigError;

    /// `"plaw"` or `"exp"`; the exponential form takes [`DEFAULT_TAU_IA`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plaw" | "powerlaw" => Ok(Self::PowerLaw),
            "exp" | "exponential" => Ok(Self::Exponential {
                tau: DEFAULT_TAU_IA,
            }),
            _ => Err(ConfigError::UnrecognizedKeyword {
                what: "delay-time distribution".into(),
                keyword: s.to_string(),
            }),
        }
    }
}

impl fmt::Debug for DtdSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PowerLaw => write!(f, "PowerLaw"),
            Self::Exponential { tau } => write!(f, "Exponential({tau})"),
            Self::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}

/// A normalized SN Ia delay-time distribution.
#[derive(Clone)]
pub struct DelayTimeDistribution {
    spec: DtdSpec,
    delay: f64,
    end: f64,
    norm: f64,
}

impl DelayTimeDistribution {
    /// Normalize `spec` over `[delay, end]` (Gyr).
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidParameter`] for a negative delay, an end not
    /// after the delay, a non-positive e-folding time, or a custom form
    /// that is negative or integrates to zero.
    pub fn new(
        spec: DtdSpec,
        delay: f64,
        end: f64,
        integrator: &Integrator,
    ) -> Result<Self, ConfigError> {
        if !(delay.is_finite() && delay >= 0.0) {
            return Err(ConfigError::invalid(
                "delay",
                format!("must be finite and non-negative, got {delay}"),
            ));
        }
        if !(end.is_finite() && end > delay) {
            return Err(ConfigError::invalid(
                "dtd",
                format!("domain end {end} must exceed the minimum delay {delay}"),
            ));
        }
        if let DtdSpec::Exponential { tau } = spec {
            if !(tau.is_finite() && tau > 0.0) {
                return Err(ConfigError::invalid(
                    "tau_ia",
                    format!("must be finite and positive, got {tau}"),
                ));
            }
        }
        let mut dtd = Self {
            spec,
            delay,
            end,
            norm: 1.0,
        };
        if let DtdSpec::Custom(f) = &dtd.spec {
            for i in 0..=100 {
                let t = delay + (end - delay) * i as f64 / 100.0;
                if f(t) < 0.0 {
                    return Err(ConfigError::invalid(
                        "dtd",
                        format!("rate is negative at {t} Gyr"),
                    ));
                }
            }
        }
        let total = integrator.integrate(|t| dtd.raw(t), delay, end).value;
        if !(total.is_finite() && total > 0.0) {
            return Err(ConfigError::invalid(
                "dtd",
                format!("integral over the domain must be finite and positive, got {total}"),
            ));
        }
        dtd.norm = 1.0 / total;
        Ok(dtd)
    }

    /// Normalize with a tight Simpson integrator.
    pub fn with_defaults(spec: DtdSpec, delay: f64, end: f64) -> Result<Self, ConfigError> {
        Self::new(spec, delay, end, &Integrator::new(QuadratureRule::Simpson, 1e-8))
    }

    fn raw(&self, t: f64) -> f64 {
        if t < self.delay {
            return 0.0;
        }
        match &self.spec {
            DtdSpec::PowerLaw => t.powf(POWER_LAW_INDEX),
            DtdSpec::Exponential { tau } => (-t / tau).exp(),
            DtdSpec::Custom(f) => f(t),
        }
    }

    /// Normalized density at delay `t` Gyr; zero before the minimum delay.
    pub fn rate(&self, t: f64) -> f64 {
        self.norm * self.raw(t)
    }

    /// Minimum delay in Gyr.
    pub fn delay(&self) -> f64 {
        self.delay
    }

    /// End of the normalization domain in Gyr.
    pub fn end(&self) -> f64 {
        self.end
    }

    /// `∫ rate` over `[k dt, (k + 1) dt]` for `k` in `0..steps`.
    pub fn step_fractions(&self, dt: f64, steps: usize) -> Vec<f64> {
        (0..steps)
            .map(|k| {
                let a = (k as f64 * dt).max(self.delay);
                let b = (k + 1) as f64 * dt;
                if b <= a {
                    0.0
                } else {
                    QuadratureRule::Simpson.composite(&|t| self.rate(t), a, b, BIN_INTERVALS)
                }
            })
            .collect()
    }
}

impl fmt::Debug for DelayTimeDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelayTimeDistribution")
            .field("spec", &self.spec)
            .field("delay", &self.delay)
            .field("end", &self.end)
            .field("norm", &self.norm)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forms() -> Vec<DtdSpec> {
        vec![
            DtdSpec::PowerLaw,
            DtdSpec::Exponential { tau: 1.5 },
            DtdSpec::custom(|t| 1.0 / (1.0 + t)),
        ]
    }

    #[test]
    fn every_form_is_normalized() {
        for spec in forms() {
            let dtd = DelayTimeDistribution::with_defaults(spec, DEFAULT_DELAY, 13.2).unwrap();
            let check = Integrator::new(QuadratureRule::Trapezoid, 1e-8)
                .integrate(|t| dtd.rate(t), DEFAULT_DELAY, 13.2);
            assert!((check.value - 1.0).abs() < 1e-5, "{dtd:?}: {}", check.value);
        }
    }

    #[test]
    fn zero_before_minimum_delay() {
        let dtd = DelayTimeDistribution::with_defaults(DtdSpec::PowerLaw, 0.15, 10.0).unwrap();
        assert_eq!(dtd.rate(0.1), 0.0);
        assert!(dtd.rate(0.15) > 0.0);
    }

    #[test]
    fn step_fractions_sum_to_one() {
        let dtd = DelayTimeDistribution::with_defaults(DtdSpec::PowerLaw, 0.15, 10.0).unwrap();
        let fr = dtd.step_fractions(0.01, 1000);
        assert!(fr[..14].iter().all(|&f| f == 0.0));
        let total: f64 = fr.iter().sum();
        assert!((total - 1.0).abs() < 1e-4, "{total}");
    }

    #[test]
    fn invalid_domains_are_rejected() {
        assert!(DelayTimeDistribution::with_defaults(DtdSpec::PowerLaw, -0.1, 10.0).is_err());
        assert!(DelayTimeDistribution::with_defaults(DtdSpec::PowerLaw, 0.15, 0.1).is_err());
        assert!(DelayTimeDistribution::with_defaults(
            DtdSpec::Exponential { tau: 0.0 },
            0.15,
            10.0
        )
        .is_err());
        assert!(DelayTimeDistribution::with_defaults(DtdSpec::custom(|_| -1.0), 0.15, 10.0).is_err());
    }

    #[test]
    fn keywords_parse() {
        assert!(matches!("plaw".parse::<DtdSpec>(), Ok(DtdSpec::PowerLaw)));
        match "exp".parse::<DtdSpec>() {
            Ok(DtdSpec::Exponential { tau }) => assert_eq!(tau, DEFAULT_TAU_IA),
            other => panic!("expected Exponential, got {other:?}"),
        }
        assert!("gaussian".parse::<DtdSpec>().is_err());
    }
}
