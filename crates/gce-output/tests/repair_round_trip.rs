//! Integration test: history file → repaired interpolant.
//!
//! Writes a zone history through the sink interface, reads it back and
//! rebuilds each column as a function of time. The rebuilt functions
//! must reproduce every sampled value exactly and stay monotone between
//! samples of a monotone column.

use gce_core::{ElementSet, HistoryRow, HistorySink};
use gce_output::{read_history, HistoryTable, HistoryWriter, RepairedFunction};
use proptest::prelude::*;
use smallvec::smallvec;

fn row(t: f64) -> HistoryRow {
    HistoryRow {
        time: t,
        gas_mass: 6e9 * (-t / 3.0).exp() + 1e9,
        stellar_mass: 4e9 * (1.0 - (-t / 2.0).exp()),
        sfr: 3.0 * (-t / 3.0).exp() + 0.5,
        infall_rate: 9.1,
        outflow_rate: 0.0,
        eta: 0.0,
        tau_star: 2.0,
        r_eff: 0.3 * (1.0 - (-t).exp()),
        element_masses: smallvec![1e6 * t, 2e5 * t * t],
        infall_metallicity: smallvec![0.0, 0.0],
    }
}

fn written(times: &[f64]) -> HistoryTable {
    let set = ElementSet::parse(&["o", "fe"]).unwrap();
    let mut w = HistoryWriter::new(Vec::new());
    w.begin(&HistoryRow::columns(&set)).unwrap();
    for &t in times {
        w.write_row(&row(t).values(&set)).unwrap();
    }
    w.finish().unwrap();
    read_history(w.into_inner().as_slice()).unwrap()
}

#[test]
fn history_columns_repair_exactly() {
    let times: Vec<f64> = (1..=1000).map(|k| k as f64 * 0.01).collect();
    let table = written(&times);
    assert!(table.complete);
    for name in ["mgas", "mstar", "sfr", "mass(o)", "z(fe)"] {
        let f = RepairedFunction::from_history(&table, name).unwrap();
        let col = table.column(name).unwrap();
        for (t, v) in times.iter().zip(&col) {
            assert_eq!(f.eval(*t), *v, "{name} at t = {t}");
        }
    }
}

#[test]
fn unknown_column_is_reported() {
    let table = written(&[0.1, 0.2]);
    assert!(RepairedFunction::from_history(&table, "mass(sr)").is_err());
}

proptest! {
    #[test]
    fn monotone_columns_interpolate_monotonically(
        n in 2usize..200,
        dt in 0.001f64..0.1,
        probes in prop::collection::vec(0.0f64..1.0, 2..64),
    ) {
        let times: Vec<f64> = (1..=n).map(|k| k as f64 * dt).collect();
        let table = written(&times);
        // Gas mass falls, stellar mass rises.
        let falling = RepairedFunction::from_history(&table, "mgas").unwrap();
        let rising = RepairedFunction::from_history(&table, "mstar").unwrap();
        let (lo, hi) = (times[0], times[n - 1]);
        let mut ts: Vec<f64> = probes.iter().map(|p| (lo + p * (hi - lo)).min(hi)).collect();
        ts.sort_by(f64::total_cmp);
        for w in ts.windows(2) {
            prop_assert!(falling.eval(w[0]) >= falling.eval(w[1]));
            prop_assert!(rising.eval(w[0]) <= rising.eval(w[1]));
        }
    }
}
