//! Metallicity distribution function tables.
//!
//! ```text
//! # bin_min bin_max dn/d[fe/h] dn/d[o/h] dn/d[o/fe]
//! -3e0 -2.95e0 0e0 0e0 0e0
//! ```

use std::io::{BufRead, Write};

use indexmap::IndexMap;

use gce_core::MdfTable;

use crate::error::OutputError;
use crate::parse_value;

const DENSITY_PREFIX: &str = "dn/d";

/// Write an MDF with one row per bin.
pub fn write_mdf(mut writer: impl Write, mdf: &MdfTable) -> Result<(), OutputError> {
    let mut header = String::from("# bin_min bin_max");
    for label in mdf.columns.keys() {
        header.push(' ');
        header.push_str(DENSITY_PREFIX);
        header.push_str(label);
    }
    writeln!(writer, "{header}")?;
    for (i, w) in mdf.edges.windows(2).enumerate() {
        let mut line = format!("{:e} {:e}", w[0], w[1]);
        for col in mdf.columns.values() {
            line.push_str(&format!(" {:e}", col[i]));
        }
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Parse an MDF written by [`write_mdf`].
///
/// Bins must be contiguous: each `bin_min` equals the previous `bin_max`.
pub fn read_mdf(reader: impl BufRead) -> Result<MdfTable, OutputError> {
    let mut labels: Option<Vec<String>> = None;
    let mut edges: Vec<f64> = Vec::new();
    let mut cols: Vec<Vec<f64>> = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix('#') {
            if labels.is_none() {
                let names: Vec<&str> = rest.split_whitespace().collect();
                if names.len() < 2 || names[0] != "bin_min" || names[1] != "bin_max" {
                    return Err(OutputError::Malformed {
                        line: i + 1,
                        detail: "header must start with 'bin_min bin_max'".into(),
                    });
                }
                let parsed = names[2..]
                    .iter()
                    .map(|n| {
                        n.strip_prefix(DENSITY_PREFIX)
                            .map(str::to_string)
                            .ok_or_else(|| OutputError::Malformed {
                                line: i + 1,
                                detail: format!("column '{n}' lacks the '{DENSITY_PREFIX}' prefix"),
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                cols = vec![Vec::new(); parsed.len()];
                labels = Some(parsed);
            }
            continue;
        }
        if labels.is_none() {
            return Err(OutputError::MissingHeader);
        }
        let vals = trimmed
            .split_whitespace()
            .map(|tok| parse_value(i + 1, tok))
            .collect::<Result<Vec<_>, _>>()?;
        if vals.len() != cols.len() + 2 {
            return Err(OutputError::Malformed {
                line: i + 1,
                detail: format!("expected {} values, got {}", cols.len() + 2, vals.len()),
            });
        }
        match edges.last() {
            None => edges.push(vals[0]),
            Some(&prev) if prev == vals[0] => {}
            Some(&prev) => {
                return Err(OutputError::Malformed {
                    line: i + 1,
                    detail: format!("bin starts at {} but previous bin ended at {prev}", vals[0]),
                })
            }
        }
        edges.push(vals[1]);
        for (col, v) in cols.iter_mut().zip(&vals[2..]) {
            col.push(*v);
        }
    }
    let labels = labels.ok_or(OutputError::MissingHeader)?;
    let columns: IndexMap<String, Vec<f64>> = labels.into_iter().zip(cols).collect();
    Ok(MdfTable { edges, columns })
}
