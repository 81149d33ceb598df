//! Errors raised while loading an analog catalog.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors from reading or parsing an analog catalog.
#[derive(Debug)]
pub enum CatalogError {
    /// The catalog file could not be read.
    Io {
        /// Catalog path.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// A record is malformed.
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        detail: String,
    },
    /// The catalog holds no records.
    Empty,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "reading analog catalog {}: {source}", path.display())
            }
            Self::Parse { line, detail } => write!(f, "analog catalog line {line}: {detail}"),
            Self::Empty => write!(f, "analog catalog has no records"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
