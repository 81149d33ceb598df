//! Stellar population physics for chemical evolution models.
//!
//! Everything here is a pure function of its configuration: the initial
//! mass function ([`Imf`]), the mass-lifetime relation
//! ([`MassLifetimeRelation`]), remnant masses, the SN Ia delay-time
//! distribution ([`DelayTimeDistribution`]), and the composite
//! quadrature rules and bisection root finder they are built on.
//!
//! Units: masses in Msun, times in Gyr.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dtd;
pub mod imf;
pub mod mlr;
pub mod population;
pub mod quadrature;
pub mod remnant;
pub mod root;

pub use dtd::{DelayTimeDistribution, DtdSpec};
pub use imf::{Imf, ImfSpec};
pub use mlr::{MassLifetimeRelation, MlrSpec, LIFETIME_FLOOR_GYR};
pub use population::{cumulative_return_fraction, main_sequence_mass_fraction};
pub use quadrature::{Integral, Integrator, QuadratureRule};
pub use remnant::remnant_mass;
pub use root::Bisection;
