//! The closed set of tracked elements and their solar abundances.

use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Mass fraction of hydrogen in the solar photosphere.
///
/// Used as the reference for `[X/H]` logarithmic abundance ratios.
pub const HYDROGEN_MASS_FRACTION: f64 = 0.7381;

/// Per-element values aligned with an [`ElementSet`].
///
/// Uses `SmallVec<[f64; 8]>` so that the common case of a handful of
/// tracked elements never touches the heap.
pub type Abundances = SmallVec<[f64; 8]>;

macro_rules! elements {
    ($( $variant:ident => ($sym:literal, $z:literal, $solar:literal) ),+ $(,)?) => {
        /// A chemical element the integrator knows how to track.
        ///
        /// The set is closed: symbols are validated against it when a
        /// configuration is built, never at step time.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Element {
            $(
                #[doc = concat!("`", $sym, "` (Z = ", stringify!($z), ").")]
                $variant,
            )+
        }

        impl Element {
            /// Every supported element in order of atomic number.
            pub const ALL: &'static [Element] = &[$(Element::$variant),+];

            /// Lowercase chemical symbol, e.g. `"fe"`.
            pub fn symbol(self) -> &'static str {
                match self {
                    $(Element::$variant => $sym,)+
                }
            }

            /// Atomic number.
            pub fn atomic_number(self) -> u32 {
                match self {
                    $(Element::$variant => $z,)+
                }
            }

            /// Solar photospheric mass fraction (Asplund et al. 2009).
            pub fn solar_mass_fraction(self) -> f64 {
                match self {
                    $(Element::$variant => $solar,)+
                }
            }
        }
    };
}

elements! {
    He => ("he", 2, 2.5145e-01),
    C  => ("c", 6, 2.3861e-03),
    N  => ("n", 7, 6.9897e-04),
    O  => ("o", 8, 5.7837e-03),
    Ne => ("ne", 10, 1.2678e-03),
    Na => ("na", 11, 2.9489e-05),
    Mg => ("mg", 12, 7.1419e-04),
    Al => ("al", 13, 5.6129e-05),
    Si => ("si", 14, 6.7079e-04),
    P  => ("p", 15, 5.8764e-06),
    S  => ("s", 16, 3.1195e-04),
    Cl => ("cl", 17, 8.2743e-06),
    Ar => ("ar", 18, 7.4065e-05),
    K  => ("k", 19, 3.0922e-06),
    Ca => ("ca", 20, 6.4717e-05),
    Sc => ("sc", 21, 4.6871e-08),
    Ti => ("ti", 22, 3.1488e-06),
    V  => ("v", 23, 3.2003e-07),
    Cr => ("cr", 24, 1.6753e-05),
    Mn => ("mn", 25, 1.0914e-05),
    Fe => ("fe", 26, 1.3035e-03),
    Co => ("co", 27, 4.2508e-06),
    Ni => ("ni", 28, 7.1895e-05),
    Cu => ("cu", 29, 7.2645e-07),
    Zn => ("zn", 30, 1.7521e-06),
    Sr => ("sr", 38, 4.7942e-08),
    Y  => ("y", 39, 1.0643e-08),
    Zr => ("zr", 40, 2.5599e-08),
    Ba => ("ba", 56, 1.5342e-08),
    La => ("la", 57, 1.2908e-09),
    Ce => ("ce", 58, 3.9320e-09),
    Eu => ("eu", 63, 3.7140e-10),
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Element {
    type Err = ConfigError;

    /// Parse a chemical symbol, case-insensitively (`"Fe"`, `"fe"`, `"FE"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Element::ALL
            .iter()
            .copied()
            .find(|e| e.symbol() == lower)
            .ok_or_else(|| ConfigError::UnrecognizedElement {
                symbol: s.to_string(),
            })
    }
}

/// An ordered, duplicate-free set of tracked elements.
///
/// The order is fixed at construction and defines the column order of
/// every per-element output, the layout of [`Abundances`] vectors, and
/// the `[X/Y]` pairs reported in metallicity distribution functions
/// (`X` always precedes `Y`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementSet {
    elements: Vec<Element>,
}

impl ElementSet {
    /// Build a set from already-parsed elements.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoElements`] if `elements` is empty,
    /// [`ConfigError::DuplicateElement`] if any element repeats.
    pub fn new(elements: impl IntoIterator<Item = Element>) -> Result<Self, ConfigError> {
        let mut out: Vec<Element> = Vec::new();
        for e in elements {
            if out.contains(&e) {
                return Err(ConfigError::DuplicateElement {
                    symbol: e.symbol().to_string(),
                });
            }
            out.push(e);
        }
        if out.is_empty() {
            return Err(ConfigError::NoElements);
        }
        Ok(Self { elements: out })
    }

    /// Parse a set from chemical symbols.
    pub fn parse<S: AsRef<str>>(symbols: &[S]) -> Result<Self, ConfigError> {
        let parsed = symbols
            .iter()
            .map(|s| s.as_ref().parse::<Element>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(parsed)
    }

    /// Number of tracked elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Always `false` for a validated set; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Position of `element` in the set, if tracked.
    pub fn index_of(&self, element: Element) -> Option<usize> {
        self.elements.iter().position(|&e| e == element)
    }

    /// Whether `element` is tracked.
    pub fn contains(&self, element: Element) -> bool {
        self.index_of(element).is_some()
    }

    /// Iterate in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = Element> + '_ {
        self.elements.iter().copied()
    }

    /// Slice view in configuration order.
    pub fn as_slice(&self) -> &[Element] {
        &self.elements
    }

    /// All `(x, y)` index pairs with `x` before `y`.
    pub fn ratio_pairs(&self) -> Vec<(usize, usize)> {
        let n = self.elements.len();
        let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                pairs.push((i, j));
            }
        }
        pairs
    }

    /// A zeroed [`Abundances`] vector sized for this set.
    pub fn zeros(&self) -> Abundances {
        smallvec::smallvec![0.0; self.elements.len()]
    }

    /// Solar mass fractions in set order.
    pub fn solar(&self) -> Abundances {
        self.elements.iter().map(|e| e.solar_mass_fraction()).collect()
    }

    /// Scaled total metallicity from per-element mass fractions.
    ///
    /// `Z = z_solar * Σ Z_x / Σ Z_x,⊙` over the tracked elements. Returns
    /// zero for a pristine composition.
    pub fn scaled_metallicity(&self, mass_fractions: &[f64], z_solar: f64) -> f64 {
        let solar: f64 = self.elements.iter().map(|e| e.solar_mass_fraction()).sum();
        let sum: f64 = mass_fractions.iter().sum();
        z_solar * sum / solar
    }
}

/// Logarithmic abundance ratio `[X/H]` for a mass fraction of `element`.
///
/// Returns `-inf` for a zero mass fraction, which callers binning into
/// histograms must treat as out of range.
pub fn log_ratio_to_hydrogen(element: Element, mass_fraction: f64) -> f64 {
    (mass_fraction / element.solar_mass_fraction()).log10()
}

/// Logarithmic abundance ratio `[X/Y]` from two mass fractions.
pub fn log_ratio(x: Element, zx: f64, y: Element, zy: f64) -> f64 {
    log_ratio_to_hydrogen(x, zx) - log_ratio_to_hydrogen(y, zy)
}
