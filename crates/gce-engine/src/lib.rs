//! Single-zone and multizone chemical evolution integrators.
//!
//! # Architecture
//!
//! - [`ZoneConfig`] describes one zone and validates itself before any
//!   work is done
//! - [`Zone`] holds a zone's gas state and takes one fixed-size step at
//!   a time, given the tracer populations resident in it
//! - [`SingleZone`] drives one zone through its lifecycle phases and
//!   writes output through the [`HistorySink`](gce_core::HistorySink)
//!   and [`TracerSink`](gce_core::TracerSink) traits
//! - [`Multizone`] couples several zones on a shared clock and moves
//!   tracers between them through a
//!   [`MigrationScheme`](gce_migration::MigrationScheme)
//!
//! Times are in Gyr, masses in Msun and rates in Msun/yr throughout.
//!
//! # Features
//!
//! - `parallel`: advance the zones of a multizone step on the rayon
//!   thread pool. Results are identical to the sequential path.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod mdf;
pub mod metrics;
pub mod multizone;
pub mod singlezone;
pub mod tables;
pub mod tracer;
pub mod zone;

pub use config::{
    linspace_step, Entrainment, Mode, Recycling, Schmidt, ZoneConfig, ZoneConfigBuilder,
};
pub use mdf::MdfBuilder;
pub use metrics::{RunMetrics, StepMetrics};
pub use multizone::{Multizone, MultizoneConfig, MultizoneOutput, ZoneOutput};
pub use singlezone::{Phase, RunOutput, SingleZone};
pub use tables::PopulationTables;
pub use tracer::Tracer;
pub use zone::{MassBudget, Zone, ZoneStep};
