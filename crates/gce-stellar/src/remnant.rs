//! Initial–final mass relation (Kalirai et al. 2008).

/// Progenitor mass above which the remnant is a neutron star.
pub const CCSN_THRESHOLD: f64 = 8.0;

/// Remnant mass assigned to core-collapse progenitors.
pub const NEUTRON_STAR_MASS: f64 = 1.4;

const WD_INTERCEPT: f64 = 0.394;
const WD_SLOPE: f64 = 0.109;

/// Remnant mass in Msun left by a star of initial mass `mass`.
pub fn remnant_mass(mass: f64) -> f64 {
    if mass >= CCSN_THRESHOLD {
        NEUTRON_STAR_MASS
    } else {
        WD_INTERCEPT + WD_SLOPE * mass
    }
}

/// Mass returned to the ISM by a star of initial mass `mass`.
///
/// Zero below the crossover where the white-dwarf relation would
/// exceed the initial mass.
pub fn returned_mass(mass: f64) -> f64 {
    (mass - remnant_mass(mass)).max(0.0)
}

/// Initial mass at which the white-dwarf relation equals the initial mass.
pub fn zero_return_mass() -> f64 {
    WD_INTERCEPT / (1.0 - WD_SLOPE)
}

/// Coefficients `(a, b)` with `remnant = a + b M` on the side of
/// [`CCSN_THRESHOLD`] that `mass` falls on.
pub(crate) fn linear_piece(mass: f64) -> (f64, f64) {
    if mass >= CCSN_THRESHOLD {
        (NEUTRON_STAR_MASS, 0.0)
    } else {
        (WD_INTERCEPT, WD_SLOPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_dwarf_branch() {
        assert!((remnant_mass(1.0) - 0.503).abs() < 1e-12);
        assert!((remnant_mass(7.9) - (0.394 + 0.109 * 7.9)).abs() < 1e-12);
    }

    #[test]
    fn neutron_star_branch() {
        assert_eq!(remnant_mass(8.0), 1.4);
        assert_eq!(remnant_mass(40.0), 1.4);
    }

    #[test]
    fn low_mass_stars_return_nothing() {
        assert_eq!(returned_mass(0.2), 0.0);
        assert!(returned_mass(zero_return_mass()).abs() < 1e-12);
        assert!(returned_mass(1.0) > 0.0);
    }
}
