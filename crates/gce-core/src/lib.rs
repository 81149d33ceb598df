//! Core types and traits for galactic chemical evolution models.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the workspace: the
//! closed set of tracked elements and their solar abundances, strongly
//! typed identifiers, the error taxonomy, functional attributes that
//! accept either a constant or a closure, output record types, and the
//! sink traits the integrator writes through.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod attr;
pub mod element;
pub mod error;
pub mod id;
pub mod record;
pub mod traits;
pub mod warning;

pub use attr::{ScalarFn, TimeFunction};
pub use element::{
    log_ratio, log_ratio_to_hydrogen, Abundances, Element, ElementSet, HYDROGEN_MASS_FRACTION,
};
pub use error::{ConfigError, LookupError, RunError};
pub use id::{StepIndex, TracerId, ZoneId};
pub use record::{HistoryRow, MdfTable, TracerRecord};
pub use traits::{HistorySink, MemorySink, TracerSink};
pub use warning::{NumericalWarning, WarningKind};

/// Conversion factor between Gyr-denominated times and yr-denominated rates.
///
/// Driving functions and timescales are expressed in Gyr, rates in Msun/yr.
pub const YEARS_PER_GYR: f64 = 1e9;
