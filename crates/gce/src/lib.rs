//! Galactic chemical evolution: one-zone and multizone models with
//! stellar migration.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all sub-crates. For most users, adding `gce` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use gce::prelude::*;
//!
//! // One zone fed by 9.1 Msun/yr of pristine gas for 1 Gyr.
//! let config = ZoneConfig::builder()
//!     .name("onezone")
//!     .elements(&["o", "fe"])
//!     .driver(Mode::Infall, 9.1)
//!     .clock(0.01, gce::engine::linspace_step(0.0, 1.0, 0.1))
//!     .build()
//!     .unwrap();
//! let mut model = SingleZone::prepare(config).unwrap();
//! let mut history = HistoryWriter::new(Vec::new());
//! model.run(&mut history).unwrap();
//! let output = model.finalize(&mut Vec::<TracerRecord>::new()).unwrap();
//! assert_eq!(output.history.len(), 11);
//! assert!(output.history[10].gas_mass > 0.0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `gce-core` | Elements, IDs, time functions, records, sink traits, errors |
//! | [`stellar`] | `gce-stellar` | IMFs, mass–lifetime relations, SN Ia delay times, quadrature |
//! | [`yields`] | `gce-yields` | Yield tables, IMF-averaged yields, yield presets |
//! | [`migration`] | `gce-migration` | Analog catalogs, radial bins, migration schemes |
//! | [`engine`] | `gce-engine` | Single-zone and multizone integrators |
//! | [`output`] | `gce-output` | Text output readers and writers, function repair |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`gce-core`).
///
/// Contains the element registry, [`types::TimeFunction`], output
/// records, the [`types::HistorySink`] and [`types::TracerSink`] traits,
/// and the error taxonomy.
pub use gce_core as types;

/// Stellar population physics (`gce-stellar`).
///
/// [`stellar::Imf`], [`stellar::MassLifetimeRelation`],
/// [`stellar::DelayTimeDistribution`] and the population mass budget.
pub use gce_stellar as stellar;

/// Nucleosynthetic yields (`gce-yields`).
///
/// Tabulated CCSN, SN Ia and AGB yields and the per-element
/// [`yields::YieldConfiguration`] consumed by the integrators.
pub use gce_yields as yields;

/// Stellar migration (`gce-migration`).
///
/// The [`migration::MigrationScheme`] trait and the analog-matching
/// [`migration::HydroDiskMigration`] scheme.
pub use gce_migration as migration;

/// Integrators (`gce-engine`).
///
/// [`engine::SingleZone`] for one zone, [`engine::Multizone`] for a disk
/// of coupled zones.
pub use gce_engine as engine;

/// Output formats (`gce-output`).
///
/// Write histories with [`output::HistoryWriter`], read them back with
/// [`output::read_history`], and rebuild drivers with
/// [`output::repair_function`].
pub use gce_output as output;

/// Common imports for typical usage.
///
/// ```rust
/// use gce::prelude::*;
/// ```
///
/// This imports the configuration builders, integrators, sink traits and
/// writers, and the error types.
pub mod prelude {
    // Core types and traits
    pub use gce_core::{
        Element, ElementSet, HistoryRow, HistorySink, MdfTable, MemorySink, TimeFunction,
        TracerId, TracerRecord, TracerSink, ZoneId,
    };

    // Errors and warnings
    pub use gce_core::{ConfigError, LookupError, NumericalWarning, RunError, WarningKind};

    // Stellar physics
    pub use gce_stellar::{DtdSpec, ImfSpec, MlrSpec};

    // Yields
    pub use gce_yields::{presets, YieldConfiguration};

    // Migration
    pub use gce_migration::{
        AnalogCatalog, HydroDiskMigration, MigrationMode, MigrationScheme, RadialBins,
    };

    // Engine
    pub use gce_engine::{
        Mode, Multizone, MultizoneConfig, Phase, RunOutput, SingleZone, StepMetrics, ZoneConfig,
    };

    // Output
    pub use gce_output::{read_history, repair_function, HistoryWriter, TracerWriter};
}
