//! Integration test: gas mass bookkeeping of a single zone.
//!
//! After every step the ISM mass must equal the initial mass plus
//! cumulative infall and returns minus cumulative star formation and
//! outflow, unless a negative gas mass was clipped. No mass, rate or
//! element mass may ever be negative.

use gce_core::{HistorySink, MemorySink, WarningKind};
use gce_engine::{linspace_step, Mode, SingleZone, ZoneConfig};
use gce_test_utils::fixtures::toy_yields;
use proptest::prelude::*;

fn config(mode: Mode, driver: f64, eta: f64, tau: f64) -> ZoneConfig {
    ZoneConfig::builder()
        .elements(&["o", "mg", "fe"])
        .driver(mode, driver)
        .eta(eta)
        .tau_star(tau)
        .clock(0.01, linspace_step(0.0, 2.0, 0.1))
        .yields(toy_yields())
        .build()
        .unwrap()
}

fn budget_residual(sz: &SingleZone) -> f64 {
    let zone = sz.zone();
    let b = zone.budget();
    let expected = zone.initial_gas_mass() + b.infall - b.formed + b.returned - b.outflow;
    (zone.gas_mass() - expected).abs() / expected.abs().max(1.0)
}

fn clipped_gas(sz: &SingleZone) -> bool {
    sz.zone()
        .warnings()
        .iter()
        .any(|w| w.quantity == "mgas" && matches!(w.kind, WarningKind::ClippedNegative { .. }))
}

fn run_checked(config: ZoneConfig, sink: &mut dyn HistorySink) -> SingleZone {
    let mut sz = SingleZone::prepare(config).unwrap();
    while !sz.zone().is_complete() {
        sz.step(sink).unwrap();
        if !clipped_gas(&sz) {
            let r = budget_residual(&sz);
            assert!(r < 1e-9, "budget off by {r:e} at step {}", sz.zone().step_index());
        }
        assert!(sz.zone().gas_mass() >= 0.0);
        assert!(sz.zone().element_masses().iter().all(|&m| m >= 0.0));
    }
    sz
}

#[test]
fn infall_mode_conserves_gas_without_outflow() {
    let mut sink = MemorySink::default();
    let sz = run_checked(config(Mode::Infall, 9.1, 0.0, 2.0), &mut sink);
    assert_eq!(sz.zone().budget().outflow, 0.0);
    assert!(sz.zone().budget().returned > 0.0);
    assert!(sz.zone().warnings().is_empty());
}

#[test]
fn infall_mode_conserves_gas_with_outflow() {
    let mut sink = MemorySink::default();
    let sz = run_checked(config(Mode::Infall, 9.1, 2.5, 2.0), &mut sink);
    assert!(sz.zone().budget().outflow > 0.0);
}

#[test]
fn driven_modes_balance_through_the_infall_rate() {
    for (mode, driver) in [(Mode::StarFormation, 3.0), (Mode::GasMass, 5e9)] {
        let mut sink = MemorySink::default();
        let sz = run_checked(config(mode, driver, 1.0, 2.0), &mut sink);
        assert!(sz.zone().budget().infall > 0.0, "{mode}");
    }
}

#[test]
fn gas_mode_tracks_a_falling_driver() {
    let mut cfg = config(Mode::GasMass, 0.0, 0.0, 2.0);
    cfg.driver = gce_core::TimeFunction::custom(|t| 6e9 * (-t).exp());
    let mut sink = MemorySink::default();
    let sz = run_checked(cfg, &mut sink);
    let gas = sz.zone().gas_mass();
    assert!((gas - 6e9 * (-2.0f64).exp()).abs() / gas < 1e-9);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn nothing_goes_negative(
        infall in 0.0f64..30.0,
        eta in 0.0f64..60.0,
        tau in 0.3f64..10.0,
        gas in 0.0f64..1e10,
    ) {
        let mut cfg = config(Mode::Infall, infall, eta, tau);
        cfg.initial_gas_mass = gas;
        let mut sink = MemorySink::default();
        let sz = run_checked(cfg, &mut sink);
        for row in sz.zone().history() {
            prop_assert!(row.gas_mass >= 0.0);
            prop_assert!(row.stellar_mass >= 0.0);
            prop_assert!(row.sfr >= 0.0);
            prop_assert!(row.outflow_rate >= 0.0);
            prop_assert!(row.element_masses.iter().all(|&m| m >= 0.0));
        }
        for t in sz.tracers() {
            prop_assert!(t.mass >= 0.0);
            prop_assert!(t.metallicity >= 0.0);
        }
    }
}
