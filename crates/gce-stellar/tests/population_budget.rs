//! Integration test: stellar population mass budget across relations.
//!
//! For every built-in mass-lifetime relation and both closed-form IMFs,
//! the cumulative return fraction and main sequence mass fraction must
//! stay bounded, move in opposite directions with age, and never
//! account for more mass than was formed.

use gce_stellar::imf::{DEFAULT_M_LOWER, DEFAULT_M_UPPER};
use gce_stellar::{
    cumulative_return_fraction, main_sequence_mass_fraction, Imf, MassLifetimeRelation, MlrSpec,
};

fn relations() -> Vec<MassLifetimeRelation> {
    vec![
        MassLifetimeRelation::new(MlrSpec::PowerLaw),
        MassLifetimeRelation::new(MlrSpec::Rvn96),
        MassLifetimeRelation::new(MlrSpec::Hpt2000),
    ]
}

fn imfs() -> Vec<Imf> {
    vec![
        Imf::kroupa(DEFAULT_M_LOWER, DEFAULT_M_UPPER).unwrap(),
        Imf::salpeter(DEFAULT_M_LOWER, DEFAULT_M_UPPER).unwrap(),
    ]
}

#[test]
fn budget_is_bounded_and_monotone() {
    let ages: Vec<f64> = (0..=130).map(|i| i as f64 * 0.1).collect();
    for imf in imfs() {
        for mlr in relations() {
            let mut prev_crf = 0.0;
            let mut prev_msmf = 1.0;
            for &age in &ages {
                let crf = cumulative_return_fraction(&imf, &mlr, age, 0.014, 0.1);
                let msmf = main_sequence_mass_fraction(&imf, &mlr, age, 0.014);
                assert!(crf >= prev_crf - 1e-12, "{:?} crf at {age}", mlr.spec());
                assert!(msmf <= prev_msmf + 1e-12, "{:?} msmf at {age}", mlr.spec());
                assert!(crf + msmf <= 1.0 + 1e-9, "{:?} at {age}", mlr.spec());
                prev_crf = crf;
                prev_msmf = msmf;
            }
        }
    }
}

#[test]
fn massive_stars_return_mass_within_first_ten_myr() {
    let imf = Imf::kroupa(DEFAULT_M_LOWER, DEFAULT_M_UPPER).unwrap();
    for mlr in relations() {
        let early = cumulative_return_fraction(&imf, &mlr, 0.01, 0.014, 0.1);
        assert!(early > 0.0, "{:?}", mlr.spec());
    }
}
