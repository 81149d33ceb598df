//! Stellar radial migration for multizone models.
//!
//! A [`MigrationScheme`] decides which zone each tracer population
//! occupies at each time. [`HydroDiskMigration`] moves tracers along
//! trajectories drawn from an [`AnalogCatalog`] of star particles from a
//! hydrodynamical disk simulation; [`NoMigration`] and [`ZoneFunction`]
//! cover the trivial and user-defined cases.
//!
//! # Determinism
//!
//! Every random draw for a tracer comes from a ChaCha8 stream seeded
//! with `seed ^ tracer_id`, so a tracer's trajectory depends only on the
//! seed, its id and its formation zone and time, never on the order in
//! which tracers are visited.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod analog;
pub mod bins;
pub mod error;
pub mod hydrodisk;
pub mod scheme;

pub use analog::{Analog, AnalogCatalog, MatchWindow};
pub use bins::RadialBins;
pub use error::CatalogError;
pub use hydrodisk::{HydroDiskMigration, MigrationMode, Trajectory};
pub use scheme::{MigrationScheme, NoMigration, ZoneFunction};
