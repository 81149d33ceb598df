//! Core-collapse supernova yield studies and their IMF averages.
//!
//! A study tabulates yields on a grid of `([M/H], rotation)` pairs, with
//! one [`MassYieldTable`] per element at each grid point. On disk a
//! library is laid out as
//!
//! ```text
//! <root>/<study>/FeH<[M/H]>/v<rotation>/<element>.dat
//! ```
//!
//! e.g. `yields/LC18/FeH-1/v150/fe.dat`.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use gce_core::{ConfigError, Element, LookupError};
use gce_stellar::{Imf, Integral, Integrator};

use crate::error::YieldError;
use crate::parse::parse_mass_yield_table;
use crate::table::MassYieldTable;

/// Default lower progenitor mass of core-collapse supernovae, in Msun.
pub const DEFAULT_CCSN_M_LOWER: f64 = 8.0;
/// Default upper progenitor mass of core-collapse supernovae, in Msun.
pub const DEFAULT_CCSN_M_UPPER: f64 = 100.0;

const GRID_TOLERANCE: f64 = 1e-9;

#[derive(Clone, Debug, PartialEq)]
struct GridPoint {
    metallicity: f64,
    rotation: f64,
    tables: IndexMap<Element, MassYieldTable>,
}

/// One yield study.
#[derive(Clone, Debug, PartialEq)]
pub struct CcsnStudy {
    name: String,
    grid: Vec<GridPoint>,
}

impl CcsnStudy {
    /// An empty study.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            grid: Vec::new(),
        }
    }

    /// Study name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add or replace the table for its element at `([M/H], rotation)`.
    pub fn insert(&mut self, metallicity: f64, rotation: f64, table: MassYieldTable) {
        let idx = match self.position(metallicity, rotation) {
            Some(i) => i,
            None => {
                self.grid.push(GridPoint {
                    metallicity,
                    rotation,
                    tables: IndexMap::new(),
                });
                self.grid.len() - 1
            }
        };
        self.grid[idx].tables.insert(table.element(), table);
    }

    /// Tabulated `([M/H], rotation)` pairs in insertion order.
    pub fn grid_points(&self) -> Vec<(f64, f64)> {
        self.grid.iter().map(|g| (g.metallicity, g.rotation)).collect()
    }

    /// The table for `element` at `([M/H], rotation)`.
    ///
    /// `Ok(None)` when the grid point exists but the study has no yields
    /// for the element there.
    ///
    /// # Errors
    ///
    /// [`LookupError::YieldGridMissing`] when the grid point itself is
    /// not tabulated.
    pub fn table(
        &self,
        element: Element,
        metallicity: f64,
        rotation: f64,
    ) -> Result<Option<&MassYieldTable>, LookupError> {
        let idx = self
            .position(metallicity, rotation)
            .ok_or_else(|| LookupError::YieldGridMissing {
                study: self.name.clone(),
                element: element.symbol().into(),
                metallicity,
                rotation,
            })?;
        Ok(self.grid[idx].tables.get(&element))
    }

    /// Load a study from `dir`, named after the directory.
    ///
    /// Sub-directories that do not match `FeH<x>/v<y>` and files that do
    /// not name a known element are ignored.
    pub fn load_dir(dir: &Path) -> Result<Self, YieldError> {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut study = Self::new(name);
        for feh in read_dir(dir)? {
            let Some(mh) = numeric_suffix(&feh, "FeH") else {
                continue;
            };
            for vdir in read_dir(&feh)? {
                let Some(rot) = numeric_suffix(&vdir, "v") else {
                    continue;
                };
                for file in read_dir(&vdir)? {
                    if file.extension().and_then(|e| e.to_str()) != Some("dat") {
                        continue;
                    }
                    let Some(element) = file
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .and_then(|s| s.parse::<Element>().ok())
                    else {
                        log::debug!("skipping {}: not an element table", file.display());
                        continue;
                    };
                    let text = fs::read_to_string(&file).map_err(|source| YieldError::Io {
                        path: file.clone(),
                        source,
                    })?;
                    study.insert(mh, rot, parse_mass_yield_table(&text, element)?);
                }
            }
        }
        log::debug!(
            "loaded CCSN study '{}': {} grid points",
            study.name,
            study.grid.len()
        );
        Ok(study)
    }

    fn position(&self, metallicity: f64, rotation: f64) -> Option<usize> {
        self.grid.iter().position(|g| {
            (g.metallicity - metallicity).abs() < GRID_TOLERANCE
                && (g.rotation - rotation).abs() < GRID_TOLERANCE
        })
    }
}

fn read_dir(dir: &Path) -> Result<Vec<PathBuf>, YieldError> {
    let io_err = |source| YieldError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        out.push(entry.map_err(io_err)?.path());
    }
    out.sort();
    Ok(out)
}

fn numeric_suffix(path: &Path, prefix: &str) -> Option<f64> {
    path.file_name()?
        .to_str()?
        .strip_prefix(prefix)?
        .parse()
        .ok()
}

/// A collection of named studies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CcsnLibrary {
    studies: IndexMap<String, CcsnStudy>,
}

impl CcsnLibrary {
    /// An empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a study. Names are case-insensitive.
    pub fn insert(&mut self, study: CcsnStudy) {
        self.studies.insert(study.name.to_ascii_uppercase(), study);
    }

    /// Look up a study by name.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnrecognizedStudy`] if no study has that name.
    pub fn study(&self, name: &str) -> Result<&CcsnStudy, ConfigError> {
        self.studies
            .get(&name.to_ascii_uppercase())
            .ok_or_else(|| ConfigError::UnrecognizedStudy {
                study: name.to_string(),
            })
    }

    /// Study names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.studies.values().map(|s| s.name.as_str())
    }

    /// Load every sub-directory of `root` as a study.
    pub fn load_dir(root: &Path) -> Result<Self, YieldError> {
        let mut lib = Self::new();
        for dir in read_dir(root)? {
            if dir.is_dir() {
                lib.insert(CcsnStudy::load_dir(&dir)?);
            }
        }
        Ok(lib)
    }
}

/// Parameters of an IMF-averaged CCSN yield calculation.
#[derive(Clone, Debug)]
pub struct CcsnRequest<'a> {
    /// Element to average.
    pub element: Element,
    /// Study name.
    pub study: &'a str,
    /// Logarithmic metallicity `[M/H]` of the grid point.
    pub metallicity: f64,
    /// Rotational velocity of the grid point, in km/s.
    pub rotation: f64,
    /// Lower progenitor mass.
    pub m_lower: f64,
    /// Upper progenitor mass.
    pub m_upper: f64,
    /// IMF to weight by.
    pub imf: &'a Imf,
    /// Quadrature settings.
    pub integrator: Integrator,
}

impl<'a> CcsnRequest<'a> {
    /// Solar metallicity, non-rotating, 8–100 Msun, default quadrature.
    pub fn new(element: Element, study: &'a str, imf: &'a Imf) -> Self {
        Self {
            element,
            study,
            metallicity: 0.0,
            rotation: 0.0,
            m_lower: DEFAULT_CCSN_M_LOWER,
            m_upper: DEFAULT_CCSN_M_UPPER,
            imf,
            integrator: Integrator::default(),
        }
    }
}

/// Mass of `request.element` ejected by core-collapse supernovae per Msun
/// of stars formed.
///
/// `∫ Y(M) ξ(M) dM` over `[m_lower, m_upper]`, with `ξ` normalized so that
/// `∫ M ξ dM = 1` over the full IMF support. An element the study does
/// not tabulate at the grid point, or tabulates as all zeros, yields an
/// exact zero with a `NaN` error.
///
/// # Errors
///
/// [`YieldError::Config`] for an unknown study or a bad mass range,
/// [`YieldError::Lookup`] for a grid point the study lacks.
pub fn imf_averaged_ccsn_yield(
    library: &CcsnLibrary,
    request: &CcsnRequest<'_>,
) -> Result<Integral, YieldError> {
    let (lo, hi) = (request.m_lower, request.m_upper);
    if !(lo.is_finite() && hi.is_finite() && 0.0 < lo && lo < hi) {
        return Err(ConfigError::InvalidMassRange {
            lower: lo,
            upper: hi,
        }
        .into());
    }
    request.integrator.validate()?;
    let study = library.study(request.study)?;
    let table = study.table(request.element, request.metallicity, request.rotation)?;
    let Some(table) = table.filter(|t| !t.is_zero()) else {
        return Ok(Integral {
            value: 0.0,
            error: f64::NAN,
            intervals: 0,
        });
    };
    Ok(request
        .integrator
        .integrate(|m| table.yield_at(m) * request.imf.weight(m), lo, hi))
}
