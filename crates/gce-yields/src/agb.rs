//! AGB net yields over a rectilinear `(mass, Z)` grid.

use gce_core::ConfigError;

use crate::table::lerp;

/// Net yields of one element tabulated on a full `(mass, Z)` grid.
///
/// Interpolation is bilinear. Metallicities beyond the grid clamp to
/// the nearest tabulated value; masses beyond it extrapolate linearly
/// from the edge segment.
#[derive(Clone, Debug, PartialEq)]
pub struct AgbGrid {
    masses: Vec<f64>,
    metallicities: Vec<f64>,
    /// Row-major: `yields[iz * masses.len() + im]`.
    yields: Vec<f64>,
}

impl AgbGrid {
    /// Build a grid from `(mass, Z, yield)` triples in any order.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidParameter`] unless every `(mass, Z)` pair of
    /// the distinct masses and metallicities appears exactly once.
    pub fn from_triples(triples: &[(f64, f64, f64)]) -> Result<Self, ConfigError> {
        if triples
            .iter()
            .any(|(m, z, y)| !(m.is_finite() && z.is_finite() && y.is_finite()))
        {
            return Err(ConfigError::invalid("agb grid", "non-finite entry"));
        }
        let mut masses: Vec<f64> = triples.iter().map(|t| t.0).collect();
        let mut metallicities: Vec<f64> = triples.iter().map(|t| t.1).collect();
        masses.sort_by(f64::total_cmp);
        masses.dedup();
        metallicities.sort_by(f64::total_cmp);
        metallicities.dedup();
        let (nm, nz) = (masses.len(), metallicities.len());
        if nm == 0 || nm * nz != triples.len() {
            return Err(ConfigError::invalid(
                "agb grid",
                format!(
                    "{} rows do not fill a {nm} x {nz} mass-metallicity grid",
                    triples.len()
                ),
            ));
        }
        let mut yields = vec![f64::NAN; nm * nz];
        for &(m, z, y) in triples {
            let im = masses.partition_point(|&v| v < m);
            let iz = metallicities.partition_point(|&v| v < z);
            let slot = &mut yields[iz * nm + im];
            if !slot.is_nan() {
                return Err(ConfigError::invalid(
                    "agb grid",
                    format!("duplicate entry at M = {m}, Z = {z}"),
                ));
            }
            *slot = y;
        }
        Ok(Self {
            masses,
            metallicities,
            yields,
        })
    }

    /// Distinct tabulated masses, ascending.
    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    /// Distinct tabulated metallicities, ascending.
    pub fn metallicities(&self) -> &[f64] {
        &self.metallicities
    }

    /// Smallest tabulated yield.
    pub fn min_yield(&self) -> f64 {
        self.yields.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Net yield of a star of `mass` Msun at metallicity `z`.
    pub fn yield_at(&self, mass: f64, z: f64) -> f64 {
        let nz = self.metallicities.len();
        let z = z.clamp(self.metallicities[0], self.metallicities[nz - 1]);
        let (iz0, iz1) = bracket(&self.metallicities, z);
        let lo = self.along_mass(iz0, mass);
        if iz0 == iz1 {
            return lo;
        }
        let hi = self.along_mass(iz1, mass);
        lerp(self.metallicities[iz0], lo, self.metallicities[iz1], hi, z)
    }

    fn along_mass(&self, iz: usize, mass: f64) -> f64 {
        let nm = self.masses.len();
        let row = &self.yields[iz * nm..(iz + 1) * nm];
        if nm == 1 {
            return row[0];
        }
        let i = if mass <= self.masses[0] {
            0
        } else if mass >= self.masses[nm - 1] {
            nm - 2
        } else {
            self.masses.partition_point(|&m| m <= mass) - 1
        };
        lerp(self.masses[i], row[i], self.masses[i + 1], row[i + 1], mass)
    }
}

/// Indices of the grid points around `x`, which lies within the grid.
fn bracket(grid: &[f64], x: f64) -> (usize, usize) {
    let n = grid.len();
    if n == 1 || x <= grid[0] {
        return (0, 0);
    }
    if x >= grid[n - 1] {
        return (n - 1, n - 1);
    }
    let hi = grid.partition_point(|&v| v <= x);
    (hi - 1, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> AgbGrid {
        AgbGrid::from_triples(&[
            (1.0, 0.001, 1.0),
            (3.0, 0.001, 3.0),
            (1.0, 0.02, 2.0),
            (3.0, 0.02, 6.0),
        ])
        .unwrap()
    }

    #[test]
    fn bilinear_in_interior() {
        let g = grid();
        let z = 0.0105;
        // Halfway in Z at M = 2: rows give 2.0 and 4.0.
        assert!((g.yield_at(2.0, z) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn metallicity_clamps() {
        let g = grid();
        assert_eq!(g.yield_at(1.0, 0.0), 1.0);
        assert_eq!(g.yield_at(3.0, 0.05), 6.0);
    }

    #[test]
    fn mass_extrapolates_linearly() {
        let g = grid();
        assert!((g.yield_at(5.0, 0.001) - 5.0).abs() < 1e-12);
        assert!((g.yield_at(0.5, 0.02) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn incomplete_grid_is_rejected() {
        assert!(AgbGrid::from_triples(&[(1.0, 0.001, 1.0), (3.0, 0.02, 1.0)]).is_err());
        assert!(AgbGrid::from_triples(&[]).is_err());
        assert!(AgbGrid::from_triples(&[(1.0, 0.001, 1.0), (1.0, 0.001, 2.0)]).is_err());
    }
}
