//! Criterion micro-benchmarks for IMF integrals, lifetime inversion and
//! yield averaging.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use gce_bench::synthetic_ccsn_library;
use gce_core::Element;
use gce_stellar::{cumulative_return_fraction, Imf, MassLifetimeRelation, MlrSpec};
use gce_yields::{imf_averaged_ccsn_yield, CcsnRequest};

fn bench_turnoff_mass(c: &mut Criterion) {
    for (name, spec) in [
        ("power_law", MlrSpec::PowerLaw),
        ("rvn96", MlrSpec::Rvn96),
        ("hpt2000", MlrSpec::Hpt2000),
    ] {
        let mlr = MassLifetimeRelation::new(spec);
        c.bench_function(&format!("turnoff_mass_{name}"), |b| {
            b.iter(|| black_box(mlr.turnoff_mass(black_box(1.3), 0.014, 0.1)));
        });
    }
}

fn bench_return_fraction_table(c: &mut Criterion) {
    let imf = Imf::kroupa(0.08, 100.0).unwrap();
    let mlr = MassLifetimeRelation::new(MlrSpec::PowerLaw);
    c.bench_function("crf_1000_steps", |b| {
        b.iter(|| {
            let total: f64 = (0..1000)
                .map(|k| cumulative_return_fraction(&imf, &mlr, k as f64 * 0.01, 0.014, 0.1))
                .sum();
            black_box(total)
        });
    });
}

fn bench_ccsn_yield(c: &mut Criterion) {
    let library = synthetic_ccsn_library().unwrap();
    let imf = Imf::kroupa(0.08, 100.0).unwrap();
    c.bench_function("imf_averaged_ccsn_yield_o", |b| {
        let request = CcsnRequest::new(Element::O, "bench", &imf);
        b.iter(|| black_box(imf_averaged_ccsn_yield(&library, &request).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_turnoff_mass,
    bench_return_fraction_table,
    bench_ccsn_yield
);
criterion_main!(benches);
