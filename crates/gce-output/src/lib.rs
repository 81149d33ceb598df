//! Text output formats for chemical evolution runs.
//!
//! Every format is whitespace-delimited text with a `#`-prefixed header
//! naming the columns, so the files stay readable by any table loader.
//!
//! # Architecture
//!
//! - [`HistoryWriter`] streams a zone's time series through the
//!   [`HistorySink`](gce_core::HistorySink) trait and terminates it
//!   with a `# complete` trailer; [`read_history`] reports whether the
//!   trailer was found
//! - [`TracerWriter`] and [`read_tracers`] handle the final tracer table
//! - [`write_mdf`] and [`read_mdf`] handle metallicity distributions
//! - [`repair_function`] rebuilds a piecewise-linear function from
//!   sampled output, exact at the samples
//!
//! Values are written with Rust's shortest round-trip exponent
//! formatting, so a read-back file holds bit-identical numbers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod history;
pub mod mdf;
pub mod repair;
pub mod tracers;

pub use error::OutputError;
pub use history::{read_history, HistoryTable, HistoryWriter, COMPLETE_MARKER};
pub use mdf::{read_mdf, write_mdf};
pub use repair::{repair_function, RepairedFunction};
pub use tracers::{load_tracers, read_tracers, TracerWriter};

/// Parse one numeric token, reporting the line on failure.
pub(crate) fn parse_value(line: usize, tok: &str) -> Result<f64, OutputError> {
    tok.parse::<f64>().map_err(|_| OutputError::Malformed {
        line,
        detail: format!("invalid number '{tok}'"),
    })
}
