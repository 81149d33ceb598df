//! Reusable yield and catalog fixtures.
//!
//! - [`toy_yields`]: round-number metallicity-independent yields for
//!   O, Mg and Fe, easy to check by hand.
//! - [`analog_grid`]: a synthetic star particle catalog on a regular
//!   `(radius, time)` grid with caller-chosen final radii.
//! - [`outward_catalog`]: a two-zone catalog where every particle born
//!   inside 2 kpc alternates between staying put and moving outward.

use std::sync::Arc;

use gce_core::Element;
use gce_migration::{Analog, AnalogCatalog};
use gce_yields::YieldConfiguration;

/// CCSN O, Mg, Fe and SN Ia Fe yields of 0.01, 0.001, 0.001 and 0.002.
pub fn toy_yields() -> YieldConfiguration {
    YieldConfiguration::new()
        .with_ccsn(Element::O, 0.01)
        .with_ccsn(Element::Mg, 0.001)
        .with_ccsn(Element::Fe, 0.001)
        .with_snia(Element::Fe, 0.002)
}

/// A particle formed at `(radius, time)` that ends at `final_radius`.
pub fn analog(id: u64, time: f64, radius: f64, final_radius: f64) -> Analog {
    Analog {
        id,
        formation_time: time,
        formation_radius: radius,
        final_radius,
        formation_height: 0.0,
        final_height: 0.1 + 0.01 * (id % 10) as f64,
        radial_velocity: 0.0,
        azimuthal_velocity: 220.0,
        vertical_velocity: 0.0,
        decomposition: 1,
    }
}

/// Particles every `dr` kpc in `[0, r_max]` and every `dt` Gyr in
/// `[0, t_max]`, with final radius `final_radius(id, radius, time)`.
///
/// # Panics
///
/// If the grid is empty.
pub fn analog_grid(
    r_max: f64,
    dr: f64,
    t_max: f64,
    dt: f64,
    final_radius: impl Fn(u64, f64, f64) -> f64,
) -> Arc<AnalogCatalog> {
    let nr = (r_max / dr).round() as usize;
    let nt = (t_max / dt).round() as usize;
    let mut analogs = Vec::with_capacity((nr + 1) * (nt + 1));
    let mut id = 0;
    for it in 0..=nt {
        for ir in 0..=nr {
            let t = it as f64 * dt;
            let r = ir as f64 * dr;
            analogs.push(analog(id, t, r, final_radius(id, r, t)));
            id += 1;
        }
    }
    Arc::new(AnalogCatalog::new(analogs).expect("grid catalog is not empty"))
}

/// Two zones split at 2 kpc over `[0, 4]` kpc: inner particles with
/// even ids stay at their birth radius, odd ids move out to 3 kpc.
/// Outer particles stay put.
pub fn outward_catalog(t_max: f64) -> Arc<AnalogCatalog> {
    analog_grid(4.0, 0.05, t_max, 0.05, |id, r, _| {
        if r < 2.0 && id % 2 == 1 {
            3.0
        } else {
            r
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gce_core::ElementSet;
    use gce_migration::MatchWindow;

    #[test]
    fn toy_yields_validate() {
        let set = ElementSet::parse(&["o", "mg", "fe"]).unwrap();
        assert!(toy_yields().validate(&set).is_ok());
        assert_eq!(toy_yields().snia_at(Element::O, 0.014), 0.0);
    }

    #[test]
    fn grid_covers_the_requested_box() {
        let cat = analog_grid(2.0, 0.5, 1.0, 0.5, |_, r, _| r);
        assert_eq!(cat.len(), 5 * 3);
        let a = cat.nearest(1.0, 0.5, MatchWindow::default()).unwrap();
        assert_eq!(a.formation_radius, 1.0);
        assert_eq!(a.formation_time, 0.5);
    }

    #[test]
    fn outward_catalog_moves_half_the_inner_particles() {
        let cat = outward_catalog(1.0);
        let inner: Vec<&Analog> = cat
            .analogs()
            .iter()
            .filter(|a| a.formation_radius < 2.0)
            .collect();
        let moved = inner.iter().filter(|a| a.final_radius >= 2.0).count();
        let ratio = moved as f64 / inner.len() as f64;
        assert!((ratio - 0.5).abs() < 0.05, "{ratio}");
    }
}
