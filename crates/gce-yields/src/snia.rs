//! Type Ia supernova yields.

use indexmap::IndexMap;

use gce_core::{ConfigError, Element};
use gce_stellar::{DelayTimeDistribution, Integral, Integrator};

/// Default number of SN Ia explosions per Msun of stars formed.
pub const DEFAULT_IA_PER_MSUN: f64 = 2.2e-3;

/// An explosion model: ejected mass of each element per event.
#[derive(Clone, Debug, PartialEq)]
pub struct SniaModel {
    name: String,
    yields: IndexMap<Element, f64>,
}

impl SniaModel {
    /// Build a model from per-event masses in Msun.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NegativeYield`] for a negative or non-finite mass.
    pub fn new(name: impl Into<String>, yields: IndexMap<Element, f64>) -> Result<Self, ConfigError> {
        for (e, &m) in &yields {
            if !(m.is_finite() && m >= 0.0) {
                return Err(ConfigError::NegativeYield {
                    channel: "snia".into(),
                    element: e.symbol().into(),
                    value: m,
                });
            }
        }
        Ok(Self {
            name: name.into(),
            yields,
        })
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ejected mass of `element` per explosion; zero when absent.
    pub fn per_event(&self, element: Element) -> f64 {
        self.yields.get(&element).copied().unwrap_or(0.0)
    }

    /// Mass of `element` ejected per Msun of stars formed.
    ///
    /// `n_ia * m_x * ∫ DTD` over the distribution's domain. A model
    /// without the element returns an exact zero with a `NaN` error.
    pub fn imf_averaged_yield(
        &self,
        element: Element,
        dtd: &DelayTimeDistribution,
        n_ia: f64,
        integrator: &Integrator,
    ) -> Integral {
        let per_event = self.per_event(element);
        let frac = integrator.integrate(|t| dtd.rate(t), dtd.delay(), dtd.end());
        let value = n_ia * per_event * frac.value;
        Integral {
            value,
            error: if value == 0.0 { f64::NAN } else { frac.error },
            intervals: frac.intervals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gce_stellar::{DtdSpec, QuadratureRule};

    fn model() -> SniaModel {
        let mut y = IndexMap::new();
        y.insert(Element::Fe, 0.7);
        SniaModel::new("W7", y).unwrap()
    }

    #[test]
    fn iron_yield_scales_with_event_rate() {
        let dtd = DelayTimeDistribution::with_defaults(DtdSpec::PowerLaw, 0.15, 13.2).unwrap();
        let integ = Integrator::new(QuadratureRule::Simpson, 1e-6);
        let y = model().imf_averaged_yield(Element::Fe, &dtd, DEFAULT_IA_PER_MSUN, &integ);
        assert!((y.value - 2.2e-3 * 0.7).abs() / (2.2e-3 * 0.7) < 1e-4);
    }

    #[test]
    fn absent_element_is_exact_zero() {
        let dtd = DelayTimeDistribution::with_defaults(DtdSpec::PowerLaw, 0.15, 13.2).unwrap();
        let y = model().imf_averaged_yield(Element::Sr, &dtd, DEFAULT_IA_PER_MSUN, &Integrator::default());
        assert_eq!(y.value, 0.0);
        assert!(y.error.is_nan());
    }

    #[test]
    fn negative_mass_is_rejected() {
        let mut y = IndexMap::new();
        y.insert(Element::Fe, -0.1);
        assert!(matches!(
            SniaModel::new("bad", y),
            Err(ConfigError::NegativeYield { .. })
        ));
    }
}
