//! Benchmark profiles for the chemical evolution toolkit.
//!
//! - [`reference_zone`]: a 10 Gyr single zone with 0.01 Gyr steps and
//!   O, Mg and Fe tracked
//! - [`reference_multizone`]: `n` such zones over a 0–20 kpc disk with
//!   diffusion migration along a synthetic catalog
//! - [`synthetic_catalog`]: a deterministic star particle catalog
//! - [`synthetic_ccsn_library`]: a one-study CCSN yield library

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use gce_core::{ConfigError, Element};
use gce_engine::{linspace_step, MultizoneConfig, ZoneConfig};
use gce_migration::{Analog, AnalogCatalog, CatalogError, HydroDiskMigration, MigrationMode, RadialBins};
use gce_yields::{CcsnLibrary, CcsnStudy, MassYieldTable};

/// Disk extent in kpc.
pub const DISK_RADIUS: f64 = 20.0;

/// Single zone: constant infall, default yields, 10 Gyr at 0.01 Gyr.
pub fn reference_zone(n_stars: u32) -> Result<ZoneConfig, ConfigError> {
    ZoneConfig::builder()
        .elements(&["o", "mg", "fe"])
        .clock(0.01, linspace_step(0.0, 10.0, 0.01))
        .n_stars(n_stars)
        .build()
}

/// `n` reference zones of equal width with diffusion migration.
///
/// Zones use a coarser 0.05 Gyr step so a full run stays tractable at
/// large `n`.
pub fn reference_multizone(n: usize, seed: u64) -> Result<MultizoneConfig, ConfigError> {
    let end = 10.0;
    let bins = RadialBins::uniform(0.0, DISK_RADIUS, n)?;
    let catalog = synthetic_catalog(end, seed).map_err(|e| ConfigError::invalid("catalog", e.to_string()))?;
    let migration = HydroDiskMigration::new(catalog, bins.clone(), MigrationMode::Diffusion, end)?.with_seed(seed);
    let zones = (0..n)
        .map(|i| {
            ZoneConfig::builder()
                .name(format!("zone{i}"))
                .elements(&["o", "fe"])
                .clock(0.05, linspace_step(0.0, end, 0.05))
                .build()
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(MultizoneConfig::new(zones)
        .with_bins(bins)
        .with_migration(migration))
}

/// One particle every 0.25 kpc and 0.1 Gyr with a pseudo-random final
/// radius within 4 kpc of its birth radius.
pub fn synthetic_catalog(t_max: f64, seed: u64) -> Result<Arc<AnalogCatalog>, CatalogError> {
    let nr = (DISK_RADIUS / 0.25) as u64;
    let nt = (t_max / 0.1).round() as u64;
    let mut analogs = Vec::with_capacity(((nr + 1) * (nt + 1)) as usize);
    for it in 0..=nt {
        for ir in 0..=nr {
            let id = it * (nr + 1) + ir;
            let radius = ir as f64 * 0.25;
            let hash = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(id.wrapping_mul(1442695040888963407));
            let u = (hash >> 11) as f64 / (1u64 << 53) as f64;
            let final_radius = (radius + 8.0 * (u - 0.5)).clamp(0.0, DISK_RADIUS - 1e-6);
            analogs.push(Analog {
                id,
                formation_time: it as f64 * 0.1,
                formation_radius: radius,
                final_radius,
                formation_height: 0.0,
                final_height: 0.5 * u,
                radial_velocity: 0.0,
                azimuthal_velocity: 220.0,
                vertical_velocity: 0.0,
                decomposition: 1,
            });
        }
    }
    Ok(Arc::new(AnalogCatalog::new(analogs)?))
}

/// A study named `"bench"` with O and Fe tables at solar metallicity,
/// no rotation, on a 13-mass grid from 8 to 120 Msun.
pub fn synthetic_ccsn_library() -> Result<CcsnLibrary, ConfigError> {
    let masses: Vec<f64> = vec![
        8.0, 10.0, 12.0, 15.0, 18.0, 20.0, 25.0, 30.0, 40.0, 50.0, 60.0, 80.0, 120.0,
    ];
    let oxygen: Vec<f64> = masses.iter().map(|m| 0.02 * (m / 8.0).powf(1.5)).collect();
    let iron: Vec<f64> = masses.iter().map(|m| 0.07 * (8.0 / m).sqrt()).collect();
    let mut study = CcsnStudy::new("bench");
    study.insert(0.0, 0.0, MassYieldTable::new(Element::O, masses.clone(), oxygen)?);
    study.insert(0.0, 0.0, MassYieldTable::new(Element::Fe, masses, iron)?);
    let mut library = CcsnLibrary::new();
    library.insert(study);
    Ok(library)
}
