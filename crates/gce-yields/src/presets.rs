//! Ready-made yield configurations.
//!
//! Each preset is a pure function returning a fresh
//! [`YieldConfiguration`]; callers adjust the result as needed.

use gce_core::Element;

use crate::config::{AgbYield, YieldConfiguration};

/// Metallicity-independent yields after Weinberg, Andrews & Freudenburg
/// (2017): oxygen and magnesium from core collapse only, iron from both
/// channels.
pub fn waf17() -> YieldConfiguration {
    YieldConfiguration::new()
        .with_ccsn(Element::O, 0.015)
        .with_ccsn(Element::Mg, 0.0012)
        .with_ccsn(Element::Fe, 0.0012)
        .with_snia(Element::O, 0.0)
        .with_snia(Element::Mg, 0.0)
        .with_snia(Element::Fe, 0.0017)
}

/// Yields after Johnson & Weinberg (2020): the WAF17 oxygen and iron
/// yields plus strontium from core collapse and AGB stars.
pub fn jw20() -> YieldConfiguration {
    YieldConfiguration::new()
        .with_ccsn(Element::O, 0.015)
        .with_ccsn(Element::Fe, 0.0012)
        .with_ccsn(Element::Sr, 3.5e-8)
        .with_snia(Element::Fe, 0.0017)
        .with_agb(Element::Sr, AgbYield::custom(strontium_agb))
}

/// Fractional AGB strontium yield peaking for 2–3 Msun progenitors and
/// falling with metallicity.
fn strontium_agb(mass: f64, z: f64) -> f64 {
    if !(1.0..=8.0).contains(&mass) {
        return 0.0;
    }
    let shape = (-(mass - 2.5).powi(2) / 2.0).exp();
    let metal = (0.014 / z.max(1e-4)).min(10.0).sqrt();
    2e-8 * shape * metal
}
