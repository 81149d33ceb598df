//! The per-element yield settings an integrator runs with.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use gce_core::{ConfigError, Element, ElementSet, ScalarFn};
use gce_stellar::Imf;

use crate::agb::AgbGrid;
use crate::ccsn::{imf_averaged_ccsn_yield, CcsnLibrary, CcsnRequest};
use crate::error::YieldError;
use crate::table::lerp;

/// Metallicities at which closures are probed for negative values.
const PROBE_Z: [f64; 5] = [0.0, 1e-4, 1e-3, 0.014, 0.03];
/// Progenitor masses at which AGB closures are probed.
const PROBE_M: [f64; 4] = [1.0, 2.0, 4.0, 7.0];

/// IMF-averaged yields tabulated against total metallicity `Z`.
///
/// Interpolated linearly in `Z`; held constant beyond the edges.
#[derive(Clone, Debug, PartialEq)]
pub struct MetallicityTable {
    z: Vec<f64>,
    y: Vec<f64>,
}

impl MetallicityTable {
    /// Build from parallel columns.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidParameter`] unless the columns are non-empty,
    /// equal in length, finite, and `z` is strictly increasing.
    pub fn new(z: Vec<f64>, y: Vec<f64>) -> Result<Self, ConfigError> {
        if z.is_empty() || z.len() != y.len() {
            return Err(ConfigError::invalid(
                "metallicity table",
                "need equal non-empty columns",
            ));
        }
        if z.iter().chain(&y).any(|v| !v.is_finite()) || z.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::invalid(
                "metallicity table",
                "entries must be finite with strictly increasing Z",
            ));
        }
        Ok(Self { z, y })
    }

    /// Tabulate a study's IMF-averaged yields at each `[M/H]` grid point.
    ///
    /// `Z = z_solar 10^[M/H]`. Grid points without the element contribute
    /// zero.
    pub fn from_ccsn(
        library: &CcsnLibrary,
        study: &str,
        element: Element,
        rotation: f64,
        imf: &Imf,
        z_solar: f64,
    ) -> Result<Self, YieldError> {
        let mut mh: Vec<f64> = library
            .study(study)?
            .grid_points()
            .into_iter()
            .filter(|&(_, r)| (r - rotation).abs() < 1e-9)
            .map(|(m, _)| m)
            .collect();
        mh.sort_by(f64::total_cmp);
        let mut z = Vec::with_capacity(mh.len());
        let mut y = Vec::with_capacity(mh.len());
        for m in mh {
            let mut req = CcsnRequest::new(element, study, imf);
            req.metallicity = m;
            req.rotation = rotation;
            z.push(z_solar * 10f64.powf(m));
            y.push(imf_averaged_ccsn_yield(library, &req)?.value);
        }
        Ok(Self::new(z, y)?)
    }

    /// Yield at metallicity `z`.
    pub fn eval(&self, z: f64) -> f64 {
        let n = self.z.len();
        if n == 1 || z <= self.z[0] {
            return self.y[0];
        }
        if z >= self.z[n - 1] {
            return self.y[n - 1];
        }
        let i = self.z.partition_point(|&v| v <= z) - 1;
        lerp(self.z[i], self.y[i], self.z[i + 1], self.y[i + 1], z)
    }

    fn min(&self) -> f64 {
        self.y.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

/// An IMF-averaged yield for the CCSN or SN Ia channel.
#[derive(Clone)]
pub enum ChannelYield {
    /// Independent of metallicity.
    Constant(f64),
    /// Interpolated in metallicity.
    Tabulated(MetallicityTable),
    /// Arbitrary function of metallicity.
    Custom(ScalarFn),
}

impl ChannelYield {
    /// Wrap a closure.
    pub fn custom(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Yield at metallicity `z`.
    pub fn eval(&self, z: f64) -> f64 {
        match self {
            Self::Constant(v) => *v,
            Self::Tabulated(t) => t.eval(z),
            Self::Custom(f) => f(z),
        }
    }

    fn min_value(&self) -> f64 {
        match self {
            Self::Constant(v) => *v,
            Self::Tabulated(t) => t.min(),
            Self::Custom(f) => PROBE_Z.iter().map(|&z| f(z)).fold(f64::INFINITY, f64::min),
        }
    }
}

impl From<f64> for ChannelYield {
    fn from(v: f64) -> Self {
        Self::Constant(v)
    }
}

impl fmt::Debug for ChannelYield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(v) => write!(f, "Constant({v})"),
            Self::Tabulated(t) => write!(f, "Tabulated({} points)", t.z.len()),
            Self::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}

/// A per-star AGB yield.
#[derive(Clone, Default)]
pub enum AgbYield {
    /// No AGB production.
    #[default]
    None,
    /// Interpolated from a grid.
    Grid(AgbGrid),
    /// Arbitrary function of `(mass, Z)`.
    Custom(Arc<dyn Fn(f64, f64) -> f64 + Send + Sync>),
}

impl AgbYield {
    /// Wrap a closure.
    pub fn custom(f: impl Fn(f64, f64) -> f64 + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Net yield, as a fraction of progenitor mass, of a star of `mass`
    /// Msun at metallicity `z`.
    pub fn eval(&self, mass: f64, z: f64) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Grid(g) => g.yield_at(mass, z),
            Self::Custom(f) => f(mass, z),
        }
    }

    /// Whether the channel produces nothing.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    fn min_value(&self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Grid(g) => g.min_yield(),
            Self::Custom(f) => PROBE_M
                .iter()
                .flat_map(|&m| PROBE_Z.iter().map(move |&z| (m, z)))
                .map(|(m, z)| f(m, z))
                .fold(f64::INFINITY, f64::min),
        }
    }
}

impl fmt::Debug for AgbYield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Grid(g) => write!(
                f,
                "Grid({} x {})",
                g.masses().len(),
                g.metallicities().len()
            ),
            Self::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}

/// Yields of every enrichment channel, per element.
///
/// Elements absent from a channel produce nothing through it.
#[derive(Clone, Debug, Default)]
pub struct YieldConfiguration {
    /// Core-collapse supernova IMF-averaged yields.
    pub ccsn: IndexMap<Element, ChannelYield>,
    /// SN Ia IMF-averaged yields.
    pub snia: IndexMap<Element, ChannelYield>,
    /// AGB per-star yields.
    pub agb: IndexMap<Element, AgbYield>,
}

impl YieldConfiguration {
    /// No yields in any channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the CCSN yield of `element`.
    pub fn with_ccsn(mut self, element: Element, y: impl Into<ChannelYield>) -> Self {
        self.ccsn.insert(element, y.into());
        self
    }

    /// Set the SN Ia yield of `element`.
    pub fn with_snia(mut self, element: Element, y: impl Into<ChannelYield>) -> Self {
        self.snia.insert(element, y.into());
        self
    }

    /// Set the AGB yield of `element`.
    pub fn with_agb(mut self, element: Element, y: AgbYield) -> Self {
        self.agb.insert(element, y);
        self
    }

    /// CCSN yield of `element` at `z`.
    pub fn ccsn_at(&self, element: Element, z: f64) -> f64 {
        self.ccsn.get(&element).map_or(0.0, |y| y.eval(z))
    }

    /// SN Ia yield of `element` at `z`.
    pub fn snia_at(&self, element: Element, z: f64) -> f64 {
        self.snia.get(&element).map_or(0.0, |y| y.eval(z))
    }

    /// AGB yield of `element` for a star of `mass` at `z`.
    pub fn agb_at(&self, element: Element, mass: f64, z: f64) -> f64 {
        self.agb.get(&element).map_or(0.0, |y| y.eval(mass, z))
    }

    /// Whether any tracked element has an AGB yield.
    pub fn has_agb(&self, elements: &ElementSet) -> bool {
        elements
            .iter()
            .any(|e| self.agb.get(&e).is_some_and(|y| !y.is_none()))
    }

    /// Reject negative or non-finite yields for the tracked elements.
    ///
    /// Constants and tables are checked exhaustively, closures at a
    /// fixed set of probe points.
    pub fn validate(&self, elements: &ElementSet) -> Result<(), ConfigError> {
        for e in elements.iter() {
            let checks = [
                ("ccsn", self.ccsn.get(&e).map(ChannelYield::min_value)),
                ("snia", self.snia.get(&e).map(ChannelYield::min_value)),
                ("agb", self.agb.get(&e).map(AgbYield::min_value)),
            ];
            for (channel, min) in checks {
                if let Some(v) = min {
                    if v.is_nan() || v < 0.0 {
                        return Err(ConfigError::NegativeYield {
                            channel: channel.into(),
                            element: e.symbol().into(),
                            value: v,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ccsn::CcsnStudy;
    use crate::table::MassYieldTable;

    #[test]
    fn metallicity_table_interpolates_and_clamps() {
        let t = MetallicityTable::new(vec![0.001, 0.01], vec![1.0, 2.0]).unwrap();
        assert_eq!(t.eval(0.0), 1.0);
        assert!((t.eval(0.0055) - 1.5).abs() < 1e-12);
        assert_eq!(t.eval(0.5), 2.0);
    }

    #[test]
    fn missing_elements_yield_nothing() {
        let cfg = YieldConfiguration::new().with_ccsn(Element::O, 0.015);
        assert_eq!(cfg.ccsn_at(Element::O, 0.0), 0.015);
        assert_eq!(cfg.ccsn_at(Element::Fe, 0.0), 0.0);
        assert_eq!(cfg.agb_at(Element::O, 2.0, 0.01), 0.0);
    }

    #[test]
    fn validate_rejects_negative_constant() {
        let set = ElementSet::parse(&["o"]).unwrap();
        let cfg = YieldConfiguration::new().with_snia(Element::O, -1e-4);
        match cfg.validate(&set) {
            Err(ConfigError::NegativeYield { channel, element, .. }) => {
                assert_eq!(channel, "snia");
                assert_eq!(element, "o");
            }
            other => panic!("expected NegativeYield, got {other:?}"),
        }
    }

    #[test]
    fn validate_probes_closures() {
        let set = ElementSet::parse(&["c"]).unwrap();
        let cfg = YieldConfiguration::new().with_agb(Element::C, AgbYield::custom(|m, _| 3.0 - m));
        assert!(cfg.validate(&set).is_err());
        let ok = YieldConfiguration::new().with_ccsn(Element::C, ChannelYield::custom(|z| 1e-3 + z));
        assert!(ok.validate(&set).is_ok());
    }

    #[test]
    fn validate_ignores_untracked_elements() {
        let set = ElementSet::parse(&["fe"]).unwrap();
        let cfg = YieldConfiguration::new().with_ccsn(Element::O, -1.0);
        assert!(cfg.validate(&set).is_ok());
    }

    #[test]
    fn table_from_study_grid() {
        let mut study = CcsnStudy::new("toy");
        for mh in [-1.0, 0.0] {
            let y = if mh < 0.0 { 0.5 } else { 1.0 };
            study.insert(
                mh,
                0.0,
                MassYieldTable::new(Element::O, vec![8.0, 100.0], vec![y, y]).unwrap(),
            );
        }
        let mut lib = CcsnLibrary::new();
        lib.insert(study);
        let imf = Imf::kroupa(0.08, 100.0).unwrap();
        let t = MetallicityTable::from_ccsn(&lib, "toy", Element::O, 0.0, &imf, 0.014).unwrap();
        let lo = t.eval(0.0014);
        let hi = t.eval(0.014);
        assert!((hi / lo - 2.0).abs() < 1e-3, "{lo} {hi}");
    }
}
