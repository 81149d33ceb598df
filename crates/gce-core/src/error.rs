//! Error types for chemical evolution models.
//!
//! Organized by when the failure is discovered: configuration errors are
//! raised before any simulation work begins, lookup errors when a table
//! query names a combination the data does not contain, and run errors
//! once integration has started.

use std::error::Error;
use std::fmt;
use std::io;

// ── LookupError ───────────────────────────────────────────────────

/// A query for a parameter combination absent from the underlying data.
///
/// Deterministic and never retried.
#[derive(Clone, Debug, PartialEq)]
pub enum LookupError {
    /// The study is known but does not tabulate this combination.
    YieldGridMissing {
        /// Study name.
        study: String,
        /// Element symbol.
        element: String,
        /// Logarithmic metallicity `[M/H]` of the requested grid.
        metallicity: f64,
        /// Rotational velocity of the requested grid, in km/s.
        rotation: f64,
    },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::YieldGridMissing {
                study,
                element,
                metallicity,
                rotation,
            } => write!(
                f,
                "study '{study}' has no yields for element '{element}' at \
                 [M/H] = {metallicity} and rotation {rotation} km/s"
            ),
        }
    }
}

impl Error for LookupError {}

// ── ConfigError ────────────────────────────────────────────────────

/// Invalid parameters discovered before simulation start.
///
/// Always raised while preparing a model, never mid-run: an integrator
/// never partially runs against an invalid configuration.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// An element symbol outside the supported set.
    UnrecognizedElement {
        /// The offending symbol as given.
        symbol: String,
    },
    /// The same element listed twice.
    DuplicateElement {
        /// The repeated symbol.
        symbol: String,
    },
    /// No elements were configured.
    NoElements,
    /// The timestep is NaN, infinite, zero or negative.
    InvalidTimestep {
        /// The invalid value.
        value: f64,
    },
    /// No output times were requested.
    EmptyOutputTimes,
    /// The output time grid is not strictly increasing, or starts before zero.
    NonMonotonicOutputTimes {
        /// Index of the first offending entry.
        index: usize,
    },
    /// A keyword naming a built-in form was not recognized.
    UnrecognizedKeyword {
        /// The family being selected (e.g. `"imf"`).
        what: String,
        /// The keyword as given.
        keyword: String,
    },
    /// A yield study name is not known to the library.
    UnrecognizedStudy {
        /// The study name as given.
        study: String,
    },
    /// A scalar parameter violates its domain.
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Description of the violation.
        reason: String,
    },
    /// A yield resolved to a negative value.
    NegativeYield {
        /// Enrichment channel (`"ccsn"`, `"snia"` or `"agb"`).
        channel: String,
        /// Element symbol.
        element: String,
        /// The negative value.
        value: f64,
    },
    /// The IMF evaluated negative somewhere in its support.
    NegativeImf {
        /// Stellar mass at which the weight was negative.
        mass: f64,
    },
    /// Lower mass bound is not below the upper bound, or not positive.
    InvalidMassRange {
        /// Lower bound in Msun.
        lower: f64,
        /// Upper bound in Msun.
        upper: f64,
    },
    /// Zones of a multizone model disagree on their clock.
    ZoneClockMismatch {
        /// Index of the first zone that disagrees with zone 0.
        zone: usize,
        /// Description of the mismatch.
        reason: String,
    },
    /// A table lookup failed while preparing.
    Lookup(LookupError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedElement { symbol } => {
                write!(f, "unrecognized element '{symbol}'")
            }
            Self::DuplicateElement { symbol } => {
                write!(f, "element '{symbol}' listed more than once")
            }
            Self::NoElements => write!(f, "no elements configured"),
            Self::InvalidTimestep { value } => {
                write!(f, "dt must be finite and positive, got {value}")
            }
            Self::EmptyOutputTimes => write!(f, "no output times requested"),
            Self::NonMonotonicOutputTimes { index } => write!(
                f,
                "output times must be non-negative and strictly increasing \
                 (violated at index {index})"
            ),
            Self::UnrecognizedKeyword { what, keyword } => {
                write!(f, "unrecognized {what} keyword '{keyword}'")
            }
            Self::UnrecognizedStudy { study } => {
                write!(f, "unrecognized yield study '{study}'")
            }
            Self::InvalidParameter { name, reason } => {
                write!(f, "invalid parameter '{name}': {reason}")
            }
            Self::NegativeYield {
                channel,
                element,
                value,
            } => write!(f, "negative {channel} yield for '{element}': {value}"),
            Self::NegativeImf { mass } => {
                write!(f, "IMF is negative at {mass} Msun")
            }
            Self::InvalidMassRange { lower, upper } => write!(
                f,
                "mass range must satisfy 0 < lower < upper, got [{lower}, {upper}]"
            ),
            Self::ZoneClockMismatch { zone, reason } => {
                write!(f, "zone {zone} clock mismatch: {reason}")
            }
            Self::Lookup(e) => write!(f, "lookup: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Lookup(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LookupError> for ConfigError {
    fn from(e: LookupError) -> Self {
        Self::Lookup(e)
    }
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidParameter`].
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

// ── RunError ───────────────────────────────────────────────────────

/// Failures after a model has been prepared.
///
/// `Io` is fatal: the run aborts and any partial output is left
/// unterminated so readers can tell it apart from a completed run.
#[derive(Debug)]
pub enum RunError {
    /// Writing output failed.
    Io(io::Error),
    /// An operation was called in the wrong lifecycle phase.
    InvalidPhase {
        /// Phase(s) the operation requires.
        expected: &'static str,
        /// The phase the integrator was in.
        found: &'static str,
    },
    /// A state quantity became NaN or infinite.
    NonFinite {
        /// Name of the quantity.
        quantity: String,
        /// Step at which it was detected.
        step: u64,
    },
    /// A time-dependent parameter evaluated outside its allowed range.
    InvalidAttribute {
        /// Name of the parameter.
        name: &'static str,
        /// The offending value.
        value: f64,
        /// Step at which it was evaluated.
        step: u64,
    },
    /// The integrator previously failed and accepts no further work.
    Failed,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "output I/O failed: {e}"),
            Self::InvalidPhase { expected, found } => {
                write!(f, "operation requires phase {expected}, integrator is {found}")
            }
            Self::NonFinite { quantity, step } => {
                write!(f, "{quantity} became non-finite at step {step}")
            }
            Self::InvalidAttribute { name, value, step } => {
                write!(f, "{name} evaluated to {value} at step {step}")
            }
            Self::Failed => write!(f, "integrator has failed"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RunError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_error_chains_through_config_error() {
        let inner = LookupError::YieldGridMissing {
            study: "LC18".into(),
            element: "fe".into(),
            metallicity: -1.0,
            rotation: 150.0,
        };
        let err = ConfigError::from(inner.clone());
        assert!(err.to_string().contains("LC18"));
        let src = err.source().expect("lookup error is the source");
        assert_eq!(src.to_string(), inner.to_string());
    }

    #[test]
    fn run_error_wraps_io() {
        let err = RunError::from(io::Error::new(io::ErrorKind::Other, "disk full"));
        assert!(err.to_string().contains("disk full"));
        assert!(err.source().is_some());
    }

    #[test]
    fn invalid_shorthand_formats_name_and_reason() {
        let err = ConfigError::invalid("eta", "must be finite");
        assert_eq!(err.to_string(), "invalid parameter 'eta': must be finite");
    }
}
