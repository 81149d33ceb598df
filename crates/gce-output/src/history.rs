//! Zone time-series files.
//!
//! ```text
//! # time mgas mstar sfr ...
//! 1e-2 5.9e9 ...
//! ...
//! # complete
//! ```
//!
//! The trailer is written only by [`HistorySink::finish`]. A run that
//! aborts leaves its rows in place without it, and [`read_history`]
//! reports such a file as incomplete.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use gce_core::HistorySink;

use crate::error::OutputError;
use crate::parse_value;

/// Final line of a completed history file.
pub const COMPLETE_MARKER: &str = "# complete";

/// Writes a zone history to a byte stream.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production
/// code can use `BufWriter<File>`.
pub struct HistoryWriter<W: Write> {
    writer: W,
    columns: usize,
    rows_written: u64,
}

impl<W: Write> HistoryWriter<W> {
    /// Wrap a sink; nothing is written until `begin`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            columns: 0,
            rows_written: 0,
        }
    }

    /// Number of rows written so far.
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Consume the writer and return the underlying `Write` sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl HistoryWriter<BufWriter<File>> {
    /// Create (or truncate) a history file at `path`.
    pub fn create(path: &Path) -> Result<Self, OutputError> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> HistorySink for HistoryWriter<W> {
    fn begin(&mut self, columns: &[String]) -> io::Result<()> {
        if let Some(bad) = columns.iter().find(|c| c.is_empty() || c.contains(char::is_whitespace)) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("column name '{bad}' is empty or contains whitespace"),
            ));
        }
        self.columns = columns.len();
        writeln!(self.writer, "# {}", columns.join(" "))
    }

    fn write_row(&mut self, values: &[f64]) -> io::Result<()> {
        if values.len() != self.columns {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("row has {} values, header has {} columns", values.len(), self.columns),
            ));
        }
        let mut line = String::with_capacity(values.len() * 12);
        for (i, v) in values.iter().enumerate() {
            if i > 0 {
                line.push(' ');
            }
            line.push_str(&format!("{v:e}"));
        }
        writeln!(self.writer, "{line}")?;
        self.rows_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        writeln!(self.writer, "{COMPLETE_MARKER}")?;
        self.writer.flush()
    }

    fn abort(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// A history read back from text.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryTable {
    /// Column names from the header.
    pub columns: Vec<String>,
    /// Rows aligned with `columns`.
    pub rows: Vec<Vec<f64>>,
    /// Whether the `# complete` trailer was present.
    pub complete: bool,
}

impl HistoryTable {
    /// Read and parse a history file.
    pub fn load(path: &Path) -> Result<Self, OutputError> {
        read_history(BufReader::new(File::open(path)?))
    }

    /// Position of a column by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Every value in one column.
    ///
    /// # Errors
    ///
    /// [`OutputError::UnknownColumn`] if the header lacks `name`.
    pub fn column(&self, name: &str) -> Result<Vec<f64>, OutputError> {
        let i = self.index_of(name).ok_or_else(|| OutputError::UnknownColumn {
            name: name.to_string(),
        })?;
        Ok(self.rows.iter().map(|r| r[i]).collect())
    }
}

/// Parse a history stream.
///
/// The first `#` line is the header. Other `#` lines are ignored except
/// the completion trailer, which must be the last non-blank line.
pub fn read_history(reader: impl BufRead) -> Result<HistoryTable, OutputError> {
    let mut columns: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    let mut complete = false;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if complete {
            return Err(OutputError::Malformed {
                line: i + 1,
                detail: "content after completion trailer".into(),
            });
        }
        if trimmed == COMPLETE_MARKER {
            complete = true;
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix('#') {
            if columns.is_none() {
                columns = Some(rest.split_whitespace().map(str::to_string).collect());
            }
            continue;
        }
        let Some(cols) = &columns else {
            return Err(OutputError::MissingHeader);
        };
        let row = trimmed
            .split_whitespace()
            .map(|tok| parse_value(i + 1, tok))
            .collect::<Result<Vec<_>, _>>()?;
        if row.len() != cols.len() {
            return Err(OutputError::Malformed {
                line: i + 1,
                detail: format!("expected {} values, got {}", cols.len(), row.len()),
            });
        }
        rows.push(row);
    }
    let columns = columns.ok_or(OutputError::MissingHeader)?;
    Ok(HistoryTable {
        columns,
        rows,
        complete,
    })
}
