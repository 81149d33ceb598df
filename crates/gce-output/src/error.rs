//! Error types for the output formats.

use std::fmt;
use std::io;

/// Errors from writing, reading or reconstructing output.
#[derive(Debug)]
pub enum OutputError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The stream has no `#` header line.
    MissingHeader,
    /// A row could not be decoded.
    Malformed {
        /// 1-based line number.
        line: usize,
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// A requested column is not in the header.
    UnknownColumn {
        /// The column name as given.
        name: String,
    },
    /// Samples cannot define an interpolant.
    InvalidSamples {
        /// Description of the problem.
        reason: String,
    },
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::MissingHeader => write!(f, "missing '#' header line"),
            Self::Malformed { line, detail } => write!(f, "line {line}: {detail}"),
            Self::UnknownColumn { name } => write!(f, "no column named '{name}'"),
            Self::InvalidSamples { reason } => write!(f, "invalid samples: {reason}"),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for OutputError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
