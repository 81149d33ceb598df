//! One-dimensional yield tables over progenitor mass.

use gce_core::{ConfigError, Element};

/// Behaviour beyond the first and last tabulated masses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Extrapolation {
    /// Hold the edge value.
    #[default]
    Nearest,
    /// Continue the edge segment's slope.
    Linear,
}

/// Yield of one element as a function of progenitor mass.
///
/// Yields are ejected masses in Msun per star. Masses are strictly
/// increasing.
#[derive(Clone, Debug, PartialEq)]
pub struct MassYieldTable {
    element: Element,
    masses: Vec<f64>,
    yields: Vec<f64>,
    extrapolation: Extrapolation,
}

impl MassYieldTable {
    /// Build a table from parallel mass and yield columns.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidParameter`] if the columns are empty, differ
    /// in length, contain non-finite values, or the masses are not
    /// strictly increasing.
    pub fn new(element: Element, masses: Vec<f64>, yields: Vec<f64>) -> Result<Self, ConfigError> {
        if masses.is_empty() || masses.len() != yields.len() {
            return Err(ConfigError::invalid(
                "yield table",
                format!(
                    "need equal non-empty columns, got {} masses and {} yields",
                    masses.len(),
                    yields.len()
                ),
            ));
        }
        if masses.iter().chain(&yields).any(|v| !v.is_finite()) {
            return Err(ConfigError::invalid("yield table", "non-finite entry"));
        }
        if masses.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::invalid(
                "yield table",
                "masses must be strictly increasing",
            ));
        }
        Ok(Self {
            element,
            masses,
            yields,
            extrapolation: Extrapolation::default(),
        })
    }

    /// Set the extrapolation policy.
    pub fn with_extrapolation(mut self, extrapolation: Extrapolation) -> Self {
        self.extrapolation = extrapolation;
        self
    }

    /// Element the table describes.
    pub fn element(&self) -> Element {
        self.element
    }

    /// Tabulated progenitor masses.
    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    /// Tabulated yields.
    pub fn yields(&self) -> &[f64] {
        &self.yields
    }

    /// Whether every tabulated yield is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.yields.iter().all(|&y| y == 0.0)
    }

    /// Yield at `mass`, interpolating linearly between tabulated masses.
    pub fn yield_at(&self, mass: f64) -> f64 {
        let n = self.masses.len();
        if n == 1 {
            return self.yields[0];
        }
        let seg = if mass <= self.masses[0] {
            if self.extrapolation == Extrapolation::Nearest {
                return self.yields[0];
            }
            0
        } else if mass >= self.masses[n - 1] {
            if self.extrapolation == Extrapolation::Nearest {
                return self.yields[n - 1];
            }
            n - 2
        } else {
            self.masses.partition_point(|&m| m <= mass) - 1
        };
        lerp(
            self.masses[seg],
            self.yields[seg],
            self.masses[seg + 1],
            self.yields[seg + 1],
            mass,
        )
    }
}

/// Straight line through `(x0, y0)` and `(x1, y1)` evaluated at `x`.
pub(crate) fn lerp(x0: f64, y0: f64, x1: f64, y1: f64, x: f64) -> f64 {
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}
