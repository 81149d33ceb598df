//! Integration test: zone sequences produced by analog migration.
//!
//! For a fixed seed and catalog, querying a tracer at increasing times
//! must start in its formation zone, end in the zone of its final
//! radius, and move monotonically in between (no zone is revisited).

use std::sync::Arc;

use gce_core::{TracerId, ZoneId};
use gce_migration::{AnalogCatalog, HydroDiskMigration, MigrationMode, MigrationScheme, RadialBins};
use proptest::prelude::*;

/// A synthetic catalog covering 0–10 kpc and 0–10 Gyr on a coarse grid,
/// with final radii alternating inward and outward.
fn catalog() -> Arc<AnalogCatalog> {
    let mut text = String::new();
    let mut id = 0;
    for it in 0..=20 {
        for ir in 0..=20 {
            let t = it as f64 * 0.5;
            let r = ir as f64 * 0.5;
            let rf = if id % 2 == 0 { (r + 3.0).min(10.0) } else { (r - 2.5).max(0.0) };
            text.push_str(&format!("{id} {t} {r} {rf} 0 0.1 0 220 0 1\n"));
            id += 1;
        }
    }
    Arc::new(AnalogCatalog::parse(&text).unwrap())
}

fn scheme(mode: MigrationMode, seed: u64) -> HydroDiskMigration {
    let bins = RadialBins::uniform(0.0, 10.0, 10).unwrap();
    HydroDiskMigration::new(catalog(), bins, mode, 10.0)
        .unwrap()
        .with_seed(seed)
}

fn sequence(s: &mut HydroDiskMigration, id: u64, zone: u32, tform: f64) -> Vec<ZoneId> {
    let steps = 50;
    (0..=steps)
        .map(|k| {
            let t = if k == steps {
                10.0
            } else {
                tform + (10.0 - tform) * k as f64 / steps as f64
            };
            s.assign(TracerId(id), ZoneId(zone), tform, t)
        })
        .collect()
}

proptest! {
    #[test]
    fn zone_sequence_is_monotone(
        seed in any::<u64>(),
        id in 0u64..10_000,
        zone in 0u32..10,
        tform in 0.0f64..9.0,
        mode in prop_oneof![
            Just(MigrationMode::Linear),
            Just(MigrationMode::Sudden),
            Just(MigrationMode::Diffusion),
        ],
    ) {
        let mut s = scheme(mode, seed);
        let seq = sequence(&mut s, id, zone, tform);
        let traj = *s.trajectory(TracerId(id)).unwrap();
        prop_assert_eq!(seq[0], ZoneId(zone));
        prop_assert_eq!(*seq.last().unwrap(), s.bins().zone_of(traj.final_radius));
        let outward = traj.final_radius >= traj.birth_radius;
        for w in seq.windows(2) {
            if outward {
                prop_assert!(w[1] >= w[0]);
            } else {
                prop_assert!(w[1] <= w[0]);
            }
        }
    }

    #[test]
    fn replay_with_same_seed_is_identical(seed in any::<u64>(), id in 0u64..1000) {
        let mut a = scheme(MigrationMode::Diffusion, seed);
        let mut b = scheme(MigrationMode::Diffusion, seed);
        prop_assert_eq!(sequence(&mut a, id, 4, 1.0), sequence(&mut b, id, 4, 1.0));
    }
}
