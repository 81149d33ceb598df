//! Errors raised while loading or querying yield data.

use std::fmt;
use std::io;
use std::path::PathBuf;

use gce_core::{ConfigError, LookupError};

/// Errors from yield loading, parsing and lookup.
#[derive(Debug)]
pub enum YieldError {
    /// Unknown study, element or invalid request.
    Config(ConfigError),
    /// The study does not tabulate the requested combination.
    Lookup(LookupError),
    /// Reading a table file failed.
    Io {
        /// File or directory being read.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// A table's contents are malformed.
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        detail: String,
    },
}

impl fmt::Display for YieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "{e}"),
            Self::Lookup(e) => write!(f, "{e}"),
            Self::Io { path, source } => write!(f, "reading {}: {source}", path.display()),
            Self::Parse { line, detail } => write!(f, "line {line}: {detail}"),
        }
    }
}

impl std::error::Error for YieldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Lookup(e) => Some(e),
            Self::Io { source, .. } => Some(source),
            Self::Parse { .. } => None,
        }
    }
}

impl From<ConfigError> for YieldError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<LookupError> for YieldError {
    fn from(e: LookupError) -> Self {
        Self::Lookup(e)
    }
}

impl YieldError {
    pub(crate) fn parse(line: usize, detail: impl Into<String>) -> Self {
        Self::Parse {
            line,
            detail: detail.into(),
        }
    }
}
