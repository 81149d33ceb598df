//! Sink traits the integrator writes output through.
//!
//! These decouple the engine from any particular file format: the
//! engine writes through `&mut dyn HistorySink` rather than referencing
//! a concrete writer, and tests substitute in-memory sinks.

use std::io;

use crate::record::{HistoryRow, TracerRecord};

/// Append-only destination for a zone's time-series output.
///
/// The integrator calls [`begin`](HistorySink::begin) once, then
/// [`write_row`](HistorySink::write_row) once per output time, then
/// exactly one of [`finish`](HistorySink::finish) (the run completed)
/// or [`abort`](HistorySink::abort) (the run failed; output left in place
/// but flagged incomplete).
pub trait HistorySink {
    /// Record the column names, in the order `write_row` values follow.
    fn begin(&mut self, columns: &[String]) -> io::Result<()>;

    /// Append one row of values aligned with the columns.
    fn write_row(&mut self, values: &[f64]) -> io::Result<()>;

    /// Mark the output complete and flush.
    fn finish(&mut self) -> io::Result<()>;

    /// Flush what has been written without marking it complete.
    fn abort(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Destination for the final tracer particle table.
pub trait TracerSink {
    /// Write every tracer, in formation order.
    fn write_tracers(&mut self, tracers: &[TracerRecord]) -> io::Result<()>;
}

/// A [`HistorySink`] that keeps everything in memory.
///
/// Used when a caller only wants the returned rows, and by tests.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    /// Columns passed to `begin`.
    pub columns: Vec<String>,
    /// Rows passed to `write_row`.
    pub rows: Vec<Vec<f64>>,
    /// Whether `finish` was called.
    pub finished: bool,
}

impl HistorySink for MemorySink {
    fn begin(&mut self, columns: &[String]) -> io::Result<()> {
        self.columns = columns.to_vec();
        Ok(())
    }

    fn write_row(&mut self, values: &[f64]) -> io::Result<()> {
        self.rows.push(values.to_vec());
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.finished = true;
        Ok(())
    }
}

impl TracerSink for Vec<TracerRecord> {
    fn write_tracers(&mut self, tracers: &[TracerRecord]) -> io::Result<()> {
        self.extend_from_slice(tracers);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_records_everything() {
        let mut sink = MemorySink::default();
        sink.begin(&["time".to_string()]).unwrap();
        sink.write_row(&[0.5]).unwrap();
        sink.abort().unwrap();
        assert!(!sink.finished);
        sink.finish().unwrap();
        assert_eq!(sink.rows, vec![vec![0.5]]);
        assert!(sink.finished);
    }
}
