//! Nucleosynthetic yields for chemical evolution models.
//!
//! Three enrichment channels are modelled. Core-collapse supernova
//! yields come from per-progenitor-mass tables ([`MassYieldTable`])
//! grouped into studies ([`CcsnLibrary`]) and are averaged over the IMF
//! by [`imf_averaged_ccsn_yield`]. AGB yields are a rectilinear
//! `(mass, Z)` grid ([`AgbGrid`]). SN Ia yields are fixed per-event
//! masses ([`SniaModel`]) scaled by the number of explosions per unit
//! mass formed.
//!
//! Integrators never see tables directly: they receive a
//! [`YieldConfiguration`], an explicit per-element value object that
//! presets ([`presets`]) build and callers may modify.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod agb;
pub mod ccsn;
pub mod config;
pub mod error;
pub mod parse;
pub mod presets;
pub mod snia;
pub mod table;

pub use agb::AgbGrid;
pub use ccsn::{imf_averaged_ccsn_yield, CcsnLibrary, CcsnRequest, CcsnStudy};
pub use config::{AgbYield, ChannelYield, MetallicityTable, YieldConfiguration};
pub use error::YieldError;
pub use parse::{parse_agb_table, parse_mass_yield_table, parse_snia_table};
pub use snia::{SniaModel, DEFAULT_IA_PER_MSUN};
pub use table::{Extrapolation, MassYieldTable};
