//! Mass budget of a single-age stellar population.

use crate::imf::Imf;
use crate::mlr::MassLifetimeRelation;

/// Fraction of a population's initial mass returned to the ISM by `age` Gyr.
///
/// Non-decreasing in age and bounded in `[0, 1]`.
pub fn cumulative_return_fraction(
    imf: &Imf,
    mlr: &MassLifetimeRelation,
    age: f64,
    metallicity: f64,
    post_ms: f64,
) -> f64 {
    if age <= 0.0 {
        return 0.0;
    }
    let turnoff = mlr.turnoff_mass(age, metallicity, post_ms);
    imf
        .returned_mass_integral(turnoff, imf.m_upper())
        .clamp(0.0, 1.0)
}

/// Fraction of a population's initial mass still in main sequence stars
/// at `age` Gyr.
///
/// Non-increasing in age and bounded in `[0, 1]`.
pub fn main_sequence_mass_fraction(
    imf: &Imf,
    mlr: &MassLifetimeRelation,
    age: f64,
    metallicity: f64,
) -> f64 {
    if age <= 0.0 {
        return 1.0;
    }
    let turnoff = mlr.turnoff_mass(age, metallicity, 0.0);
    imf.mass_integral(imf.m_lower(), turnoff).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imf::{DEFAULT_M_LOWER, DEFAULT_M_UPPER};
    use crate::mlr::MlrSpec;
    use proptest::prelude::*;

    fn setup() -> (Imf, MassLifetimeRelation) {
        (
            Imf::kroupa(DEFAULT_M_LOWER, DEFAULT_M_UPPER).unwrap(),
            MassLifetimeRelation::new(MlrSpec::PowerLaw),
        )
    }

    #[test]
    fn newborn_population() {
        let (imf, mlr) = setup();
        assert_eq!(cumulative_return_fraction(&imf, &mlr, 0.0, 0.014, 0.1), 0.0);
        assert_eq!(main_sequence_mass_fraction(&imf, &mlr, 0.0, 0.014), 1.0);
    }

    #[test]
    fn old_kroupa_population_returns_about_forty_percent() {
        let (imf, mlr) = setup();
        let crf = cumulative_return_fraction(&imf, &mlr, 10.0, 0.014, 0.1);
        assert!(crf > 0.3 && crf < 0.5, "{crf}");
    }

    #[test]
    fn most_mass_is_in_long_lived_stars_after_a_gyr() {
        let (imf, mlr) = setup();
        let msmf = main_sequence_mass_fraction(&imf, &mlr, 1.0, 0.014);
        assert!(msmf > 0.5 && msmf < 0.9, "{msmf}");
    }

    proptest! {
        #[test]
        fn crf_and_msmf_are_monotone(age in 1e-3f64..13.0, dage in 1e-3f64..2.0) {
            let (imf, mlr) = setup();
            let (a, b) = (age, age + dage);
            let crf_a = cumulative_return_fraction(&imf, &mlr, a, 0.014, 0.1);
            let crf_b = cumulative_return_fraction(&imf, &mlr, b, 0.014, 0.1);
            prop_assert!(crf_b >= crf_a);
            prop_assert!((0.0..=1.0).contains(&crf_b));
            let ms_a = main_sequence_mass_fraction(&imf, &mlr, a, 0.014);
            let ms_b = main_sequence_mass_fraction(&imf, &mlr, b, 0.014);
            prop_assert!(ms_b <= ms_a);
            prop_assert!((0.0..=1.0).contains(&ms_b));
        }
    }
}
