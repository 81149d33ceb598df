//! Star particle catalogs and nearest-analog matching.
//!
//! Each record describes one star particle from a hydrodynamical
//! simulation: when and where it formed, and where it ended up. A
//! tracer formed at radius `r` and time `t` borrows the trajectory of
//! the closest particle in `(r, t)`.

use std::fs;
use std::path::Path;

use crate::error::CatalogError;

/// Columns in a catalog record.
const COLUMNS: usize = 10;

/// One star particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Analog {
    /// Particle identifier.
    pub id: u64,
    /// Formation time in Gyr.
    pub formation_time: f64,
    /// Galactocentric radius at formation in kpc.
    pub formation_radius: f64,
    /// Galactocentric radius at the end of the simulation in kpc.
    pub final_radius: f64,
    /// Height above the midplane at formation in kpc.
    pub formation_height: f64,
    /// Height above the midplane at the end of the simulation in kpc.
    pub final_height: f64,
    /// Radial velocity in km/s.
    pub radial_velocity: f64,
    /// Azimuthal velocity in km/s.
    pub azimuthal_velocity: f64,
    /// Vertical velocity in km/s.
    pub vertical_velocity: f64,
    /// Kinematic decomposition tag (thin disk, thick disk, bulge, ...).
    pub decomposition: i32,
}

/// Half-widths of the search window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchWindow {
    /// Radius half-width in kpc.
    pub radius: f64,
    /// Time half-width in Gyr.
    pub time: f64,
}

impl Default for MatchWindow {
    /// ±0.3 kpc, ±0.25 Gyr.
    fn default() -> Self {
        Self {
            radius: 0.3,
            time: 0.25,
        }
    }
}

impl MatchWindow {
    /// The window with both half-widths doubled.
    pub fn doubled(self) -> Self {
        Self {
            radius: 2.0 * self.radius,
            time: 2.0 * self.time,
        }
    }
}

/// An immutable catalog of star particles, sorted by formation time.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalogCatalog {
    analogs: Vec<Analog>,
}

impl AnalogCatalog {
    /// Build a catalog from records in any order.
    pub fn new(mut analogs: Vec<Analog>) -> Result<Self, CatalogError> {
        if analogs.is_empty() {
            return Err(CatalogError::Empty);
        }
        analogs.sort_by(|a, b| {
            a.formation_time
                .total_cmp(&b.formation_time)
                .then(a.id.cmp(&b.id))
        });
        Ok(Self { analogs })
    }

    /// Parse the whitespace-delimited text format.
    ///
    /// One record per line: `id tform rform rfinal zform zfinal vrad vphi
    /// vz decomp`. Lines starting with `#` and blank lines are skipped.
    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        let mut analogs = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            analogs.push(parse_record(i + 1, line)?);
        }
        Self::new(analogs)
    }

    /// Read and parse a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::parse(&text)?;
        log::debug!("loaded {} analogs from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.analogs.len()
    }

    /// Always `false`; construction rejects empty catalogs.
    pub fn is_empty(&self) -> bool {
        self.analogs.is_empty()
    }

    /// Records sorted by formation time.
    pub fn analogs(&self) -> &[Analog] {
        &self.analogs
    }

    /// Closest record within `window` of `(radius, time)`.
    ///
    /// Distance is `sqrt((Δr / window.radius)² + (Δt / window.time)²)`;
    /// ties go to the earlier-sorted record.
    pub fn nearest(&self, radius: f64, time: f64, window: MatchWindow) -> Option<&Analog> {
        let start = self
            .analogs
            .partition_point(|a| a.formation_time < time - window.time);
        let mut best: Option<(f64, &Analog)> = None;
        for a in &self.analogs[start..] {
            let dt = a.formation_time - time;
            if dt > window.time {
                break;
            }
            let dr = a.formation_radius - radius;
            if dr.abs() > window.radius {
                continue;
            }
            let d = (dr / window.radius).hypot(dt / window.time);
            if best.is_none_or(|(bd, _)| d < bd) {
                best = Some((d, a));
            }
        }
        best.map(|(_, a)| a)
    }

    /// Match with `window`, retrying once with the window doubled.
    pub fn find(&self, radius: f64, time: f64, window: MatchWindow) -> Option<&Analog> {
        self.nearest(radius, time, window)
            .or_else(|| self.nearest(radius, time, window.doubled()))
    }
}

fn parse_record(line_no: usize, line: &str) -> Result<Analog, CatalogError> {
    let toks: Vec<&str> = line.split_whitespace().collect();
    if toks.len() != COLUMNS {
        return Err(CatalogError::Parse {
            line: line_no,
            detail: format!("expected {COLUMNS} columns, got {}", toks.len()),
        });
    }
    let bad = |what: &str, tok: &str| CatalogError::Parse {
        line: line_no,
        detail: format!("invalid {what} '{tok}'"),
    };
    let id = toks[0].parse::<u64>().map_err(|_| bad("id", toks[0]))?;
    let mut vals = [0.0f64; 8];
    for (v, tok) in vals.iter_mut().zip(toks[1..9].iter().copied()) {
        *v = tok.parse::<f64>().map_err(|_| bad("value", tok))?;
        if !v.is_finite() {
            return Err(bad("value", tok));
        }
    }
    let decomposition = toks[9].parse::<i32>().map_err(|_| bad("decomposition tag", toks[9]))?;
    Ok(Analog {
        id,
        formation_time: vals[0],
        formation_radius: vals[1],
        final_radius: vals[2],
        formation_height: vals[3],
        final_height: vals[4],
        radial_velocity: vals[5],
        azimuthal_velocity: vals[6],
        vertical_velocity: vals[7],
        decomposition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "\
# id tform rform rfinal zform zfinal vrad vphi vz decomp
1 1.00 4.00 6.00 0.0 0.1 0 220 0 1
2 1.10 4.10 3.00 0.0 0.2 0 220 0 1
3 5.00 8.00 8.50 0.0 0.3 0 220 0 2
";

    #[test]
    fn parse_sorts_and_skips_comments() {
        let cat = AnalogCatalog::parse(TEXT).unwrap();
        assert_eq!(cat.len(), 3);
        assert_eq!(cat.analogs()[2].id, 3);
        assert_eq!(cat.analogs()[1].final_height, 0.2);
    }

    #[test]
    fn nearest_uses_normalized_distance() {
        let cat = AnalogCatalog::parse(TEXT).unwrap();
        // Equal time offsets, so the smaller radius offset wins.
        let a = cat.nearest(4.08, 1.05, MatchWindow::default()).unwrap();
        assert_eq!(a.id, 2);
    }

    #[test]
    fn doubled_window_is_tried_once() {
        let cat = AnalogCatalog::parse(TEXT).unwrap();
        assert!(cat.nearest(8.5, 5.0, MatchWindow::default()).is_none());
        assert_eq!(cat.find(8.5, 5.0, MatchWindow::default()).unwrap().id, 3);
        assert!(cat.find(9.5, 5.0, MatchWindow::default()).is_none());
    }

    #[test]
    fn malformed_records_report_line() {
        match AnalogCatalog::parse("# header\n1 2 3\n") {
            Err(CatalogError::Parse { line: 2, .. }) => {}
            other => panic!("expected parse error on line 2, got {other:?}"),
        }
        assert!(matches!(AnalogCatalog::parse("# nothing\n"), Err(CatalogError::Empty)));
    }
}
