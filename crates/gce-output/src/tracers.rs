//! The final tracer table.
//!
//! One row per tracer in formation order:
//!
//! ```text
//! # id zone_origin zone_final tform mass z analog z_final
//! ```
//!
//! A tracer without a migration analog has `-` in the `analog` column
//! and `NaN` in `z_final`.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use gce_core::{TracerId, TracerRecord, TracerSink, ZoneId};

use crate::error::OutputError;
use crate::parse_value;

/// Header line of a tracer table.
const HEADER: &str = "# id zone_origin zone_final tform mass z analog z_final";

const COLUMNS: usize = 8;

/// Writes tracer tables to a byte stream.
pub struct TracerWriter<W: Write> {
    writer: W,
}

impl<W: Write> TracerWriter<W> {
    /// Wrap a sink.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consume the writer and return the underlying `Write` sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl TracerWriter<BufWriter<File>> {
    /// Create (or truncate) a tracer file at `path`.
    pub fn create(path: &Path) -> Result<Self, OutputError> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> TracerSink for TracerWriter<W> {
    fn write_tracers(&mut self, tracers: &[TracerRecord]) -> io::Result<()> {
        writeln!(self.writer, "{HEADER}")?;
        for t in tracers {
            let analog = t.analog.map_or_else(|| "-".to_string(), |a| a.to_string());
            let height = t.final_height.unwrap_or(f64::NAN);
            writeln!(
                self.writer,
                "{} {} {} {:e} {:e} {:e} {} {:e}",
                t.id, t.zone_origin, t.zone_final, t.formation_time, t.mass, t.metallicity, analog,
                height
            )?;
        }
        self.writer.flush()
    }
}

/// Parse a tracer table.
pub fn read_tracers(reader: impl BufRead) -> Result<Vec<TracerRecord>, OutputError> {
    let mut out = Vec::new();
    let mut header = false;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with('#') {
            header = true;
            continue;
        }
        if !header {
            return Err(OutputError::MissingHeader);
        }
        out.push(parse_row(i + 1, trimmed)?);
    }
    Ok(out)
}

/// Read and parse a tracer file.
pub fn load_tracers(path: &Path) -> Result<Vec<TracerRecord>, OutputError> {
    read_tracers(BufReader::new(File::open(path)?))
}

fn parse_row(line: usize, text: &str) -> Result<TracerRecord, OutputError> {
    let toks: Vec<&str> = text.split_whitespace().collect();
    if toks.len() != COLUMNS {
        return Err(OutputError::Malformed {
            line,
            detail: format!("expected {COLUMNS} columns, got {}", toks.len()),
        });
    }
    let integer = |tok: &str| {
        tok.parse::<u64>().map_err(|_| OutputError::Malformed {
            line,
            detail: format!("invalid integer '{tok}'"),
        })
    };
    let zone = |tok: &str| -> Result<ZoneId, OutputError> {
        let v = integer(tok)?;
        u32::try_from(v).map(ZoneId).map_err(|_| OutputError::Malformed {
            line,
            detail: format!("zone index {v} out of range"),
        })
    };
    let analog = match toks[6] {
        "-" => None,
        tok => Some(integer(tok)?),
    };
    let height = parse_value(line, toks[7])?;
    Ok(TracerRecord {
        id: TracerId(integer(toks[0])?),
        zone_origin: zone(toks[1])?,
        zone_final: zone(toks[2])?,
        formation_time: parse_value(line, toks[3])?,
        mass: parse_value(line, toks[4])?,
        metallicity: parse_value(line, toks[5])?,
        analog,
        final_height: (!height.is_nan()).then_some(height),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, analog: Option<u64>) -> TracerRecord {
        TracerRecord {
            id: TracerId(id),
            zone_origin: ZoneId(2),
            zone_final: ZoneId(5),
            formation_time: 0.01 * id as f64,
            mass: 3.3e6,
            metallicity: 0.0123,
            analog,
            final_height: analog.map(|_| -0.25),
        }
    }

    #[test]
    fn table_reads_back() {
        let tracers = vec![record(0, None), record(1, Some(77))];
        let mut w = TracerWriter::new(Vec::new());
        w.write_tracers(&tracers).unwrap();
        let buf = w.into_inner();
        assert!(String::from_utf8_lossy(&buf).starts_with(HEADER));
        assert_eq!(read_tracers(buf.as_slice()).unwrap(), tracers);
    }

    #[test]
    fn malformed_rows_report_line() {
        let text = format!("{HEADER}\n0 1 1 0 1 0 - NaN\n0 1 x 0 1 0 - NaN\n");
        match read_tracers(text.as_bytes()) {
            Err(OutputError::Malformed { line: 3, .. }) => {}
            other => panic!("expected malformed line 3, got {other:?}"),
        }
        assert!(matches!(
            read_tracers("0 1 1 0 1 0 - NaN\n".as_bytes()),
            Err(OutputError::MissingHeader)
        ));
    }
}
