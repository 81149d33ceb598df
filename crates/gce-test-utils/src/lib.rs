//! Test fixtures and mock sinks for chemical evolution development.
//!
//! Provides sinks that fail on demand ([`FailingSink`]) or record every
//! call ([`RecordingSink`]), and the catalog and yield fixtures in
//! [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::io;

use gce_core::HistorySink;

/// Which sink call a [`RecordingSink`] saw.
#[derive(Clone, Debug, PartialEq)]
pub enum SinkCall {
    Begin(Vec<String>),
    Row(Vec<f64>),
    Finish,
    Abort,
}

/// A [`HistorySink`] that records every call in order.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows written, in order.
    pub fn rows(&self) -> Vec<&[f64]> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SinkCall::Row(r) => Some(r.as_slice()),
                _ => None,
            })
            .collect()
    }

    /// Whether the last call was `finish`.
    pub fn finished(&self) -> bool {
        self.calls.last() == Some(&SinkCall::Finish)
    }

    /// Whether `abort` was called.
    pub fn aborted(&self) -> bool {
        self.calls.contains(&SinkCall::Abort)
    }
}

impl HistorySink for RecordingSink {
    fn begin(&mut self, columns: &[String]) -> io::Result<()> {
        self.calls.push(SinkCall::Begin(columns.to_vec()));
        Ok(())
    }

    fn write_row(&mut self, values: &[f64]) -> io::Result<()> {
        self.calls.push(SinkCall::Row(values.to_vec()));
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.calls.push(SinkCall::Finish);
        Ok(())
    }

    fn abort(&mut self) -> io::Result<()> {
        self.calls.push(SinkCall::Abort);
        Ok(())
    }
}

/// A [`HistorySink`] that fails deterministically after N rows.
///
/// Everything before the failure is forwarded to an inner
/// [`RecordingSink`] for inspection.
#[derive(Clone, Debug)]
pub struct FailingSink {
    pub inner: RecordingSink,
    rows_before_failure: usize,
    rows: usize,
}

impl FailingSink {
    /// Accept `rows_before_failure` rows, then fail every write.
    pub fn new(rows_before_failure: usize) -> Self {
        Self {
            inner: RecordingSink::new(),
            rows_before_failure,
            rows: 0,
        }
    }
}

impl HistorySink for FailingSink {
    fn begin(&mut self, columns: &[String]) -> io::Result<()> {
        self.inner.begin(columns)
    }

    fn write_row(&mut self, values: &[f64]) -> io::Result<()> {
        if self.rows >= self.rows_before_failure {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("failing sink: refused row {}", self.rows + 1),
            ));
        }
        self.rows += 1;
        self.inner.write_row(values)
    }

    fn finish(&mut self) -> io::Result<()> {
        self.inner.finish()
    }

    fn abort(&mut self) -> io::Result<()> {
        self.inner.abort()
    }
}
