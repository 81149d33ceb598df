//! Output record types shared by the integrator and the writers.

use indexmap::IndexMap;

use crate::element::{log_ratio_to_hydrogen, Abundances, ElementSet};
use crate::id::{TracerId, ZoneId};

/// One row of a zone's time-series output.
///
/// Masses in Msun, rates in Msun/yr, times and timescales in Gyr.
/// `element_masses` and `infall_metallicity` are aligned with the
/// zone's [`ElementSet`].
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryRow {
    /// Simulation time.
    pub time: f64,
    /// ISM gas mass.
    pub gas_mass: f64,
    /// Mass in stars still alive (or in remnants not yet returned).
    pub stellar_mass: f64,
    /// Star formation rate.
    pub sfr: f64,
    /// Gas infall rate.
    pub infall_rate: f64,
    /// Gas outflow rate.
    pub outflow_rate: f64,
    /// Outflow mass-loading factor.
    pub eta: f64,
    /// Effective star formation efficiency timescale.
    pub tau_star: f64,
    /// Recycling rate divided by the star formation rate.
    pub r_eff: f64,
    /// ISM mass of each tracked element.
    pub element_masses: Abundances,
    /// Metallicity of infalling gas for each tracked element.
    pub infall_metallicity: Abundances,
}

impl HistoryRow {
    /// Column names in output order for a given element set.
    ///
    /// Scalars first, then `mass(x)`, `z_in(x)`, `z(x)` and `[x/h]`
    /// blocks, each in element order.
    pub fn columns(elements: &ElementSet) -> Vec<String> {
        let mut cols: Vec<String> = [
            "time", "mgas", "mstar", "sfr", "ifr", "ofr", "eta", "tau_star", "r_eff",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        for e in elements.iter() {
            cols.push(format!("mass({e})"));
        }
        for e in elements.iter() {
            cols.push(format!("z_in({e})"));
        }
        for e in elements.iter() {
            cols.push(format!("z({e})"));
        }
        for e in elements.iter() {
            cols.push(format!("[{e}/h]"));
        }
        cols
    }

    /// Mass fraction of each element in the ISM.
    pub fn mass_fractions(&self) -> Abundances {
        self.element_masses
            .iter()
            .map(|&m| if self.gas_mass > 0.0 { m / self.gas_mass } else { 0.0 })
            .collect()
    }

    /// Values matching [`HistoryRow::columns`].
    pub fn values(&self, elements: &ElementSet) -> Vec<f64> {
        let z = self.mass_fractions();
        let mut vals = vec![
            self.time,
            self.gas_mass,
            self.stellar_mass,
            self.sfr,
            self.infall_rate,
            self.outflow_rate,
            self.eta,
            self.tau_star,
            self.r_eff,
        ];
        vals.extend(self.element_masses.iter().copied());
        vals.extend(self.infall_metallicity.iter().copied());
        vals.extend(z.iter().copied());
        vals.extend(
            elements
                .iter()
                .zip(z.iter())
                .map(|(e, &zx)| log_ratio_to_hydrogen(e, zx)),
        );
        vals
    }
}

/// The final state of one tracer stellar population.
#[derive(Clone, Debug, PartialEq)]
pub struct TracerRecord {
    /// Tracer identifier (formation order).
    pub id: TracerId,
    /// Zone the population formed in.
    pub zone_origin: ZoneId,
    /// Zone the population occupies at the end of the run.
    pub zone_final: ZoneId,
    /// Formation time in Gyr.
    pub formation_time: f64,
    /// Initial stellar mass in Msun.
    pub mass: f64,
    /// Total metallicity of the ISM at formation.
    pub metallicity: f64,
    /// Identifier of the migration analog, when one was matched.
    pub analog: Option<u64>,
    /// Final height above the midplane in kpc, when an analog provides it.
    pub final_height: Option<f64>,
}

/// A metallicity distribution function.
///
/// `edges` has one more entry than each column. Each column holds a
/// bin-normalized probability density for one abundance ratio, keyed by
/// its label (`"[fe/h]"`, `"[o/fe]"`, ...), so that
/// `Σ density_i * (edges[i+1] - edges[i]) = 1` whenever any population
/// fell inside the binned range.
#[derive(Clone, Debug, PartialEq)]
pub struct MdfTable {
    /// Bin edges in dex, strictly increasing.
    pub edges: Vec<f64>,
    /// Density columns keyed by ratio label.
    pub columns: IndexMap<String, Vec<f64>>,
}

impl MdfTable {
    /// Number of bins.
    pub fn bin_count(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    /// Integral of a column over all bins; `None` for an unknown label.
    pub fn integral(&self, label: &str) -> Option<f64> {
        let col = self.columns.get(label)?;
        Some(
            col.iter()
                .zip(self.edges.windows(2))
                .map(|(d, w)| d * (w[1] - w[0]))
                .sum(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn row() -> HistoryRow {
        HistoryRow {
            time: 1.0,
            gas_mass: 1e9,
            stellar_mass: 5e8,
            sfr: 0.5,
            infall_rate: 1.0,
            outflow_rate: 1.25,
            eta: 2.5,
            tau_star: 2.0,
            r_eff: 0.3,
            element_masses: smallvec![5.7837e6, 0.0],
            infall_metallicity: smallvec![0.0, 0.0],
        }
    }

    #[test]
    fn columns_and_values_align() {
        let set = ElementSet::parse(&["o", "fe"]).unwrap();
        let cols = HistoryRow::columns(&set);
        let vals = row().values(&set);
        assert_eq!(cols.len(), vals.len());
        assert_eq!(cols[9], "mass(o)");
        assert_eq!(cols.last().unwrap(), "[fe/h]");
    }

    #[test]
    fn solar_oxygen_reports_zero_dex() {
        let set = ElementSet::parse(&["o", "fe"]).unwrap();
        let vals = row().values(&set);
        let oh = vals[vals.len() - 2];
        assert!(oh.abs() < 1e-10, "[o/h] = {oh}");
        assert_eq!(vals[vals.len() - 1], f64::NEG_INFINITY);
    }

    #[test]
    fn empty_zone_has_zero_mass_fractions() {
        let mut r = row();
        r.gas_mass = 0.0;
        assert!(r.mass_fractions().iter().all(|&z| z == 0.0));
    }

    #[test]
    fn mdf_integral_sums_bins() {
        let mut columns = IndexMap::new();
        columns.insert("[fe/h]".to_string(), vec![5.0, 5.0]);
        let mdf = MdfTable {
            edges: vec![0.0, 0.1, 0.2],
            columns,
        };
        assert_eq!(mdf.bin_count(), 2);
        assert!((mdf.integral("[fe/h]").unwrap() - 1.0).abs() < 1e-12);
        assert!(mdf.integral("[o/h]").is_none());
    }
}
