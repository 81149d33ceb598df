//! Metallicity distribution functions.
//!
//! [`MdfBuilder`] histograms tracer abundances at formation into `[X/H]`
//! columns for every tracked element and `[X/Y]` columns for every
//! ordered pair, weighted by tracer mass, then normalizes each column to
//! a probability density.

use indexmap::IndexMap;

use gce_core::{log_ratio, log_ratio_to_hydrogen, ElementSet, MdfTable};

use crate::tracer::Tracer;

/// Accumulates weighted abundance histograms.
#[derive(Clone, Debug)]
pub struct MdfBuilder {
    elements: ElementSet,
    edges: Vec<f64>,
    pairs: Vec<(usize, usize)>,
    counts: IndexMap<String, Vec<f64>>,
}

impl MdfBuilder {
    /// Empty histograms over `edges` (validated, strictly increasing).
    pub fn new(elements: &ElementSet, edges: &[f64]) -> Self {
        let bins = edges.len().saturating_sub(1);
        let pairs = elements.ratio_pairs();
        let slice = elements.as_slice();
        let mut counts = IndexMap::new();
        for e in elements.iter() {
            counts.insert(format!("[{e}/h]"), vec![0.0; bins]);
        }
        for &(i, j) in &pairs {
            counts.insert(format!("[{}/{}]", slice[i], slice[j]), vec![0.0; bins]);
        }
        Self {
            elements: elements.clone(),
            edges: edges.to_vec(),
            pairs,
            counts,
        }
    }

    fn bin_of(&self, value: f64) -> Option<usize> {
        if !value.is_finite() {
            return None;
        }
        let (lo, hi) = (self.edges[0], self.edges[self.edges.len() - 1]);
        if value < lo || value >= hi {
            return None;
        }
        Some(self.edges.partition_point(|&e| e <= value) - 1)
    }

    /// Add one population with element mass fractions `abundances`.
    ///
    /// Ratios that are undefined or fall outside the binned range are
    /// skipped for that column only.
    pub fn add(&mut self, abundances: &[f64], weight: f64) {
        let slice = self.elements.as_slice();
        let mut values = Vec::with_capacity(self.counts.len());
        for (e, &z) in slice.iter().zip(abundances) {
            values.push(log_ratio_to_hydrogen(*e, z));
        }
        for &(i, j) in &self.pairs {
            values.push(log_ratio(slice[i], abundances[i], slice[j], abundances[j]));
        }
        let bins: Vec<Option<usize>> = values.iter().map(|&v| self.bin_of(v)).collect();
        for (col, bin) in self.counts.values_mut().zip(bins) {
            if let Some(b) = bin {
                col[b] += weight;
            }
        }
    }

    /// Mass-weighted distribution of `tracers`.
    pub fn from_tracers<'a>(
        elements: &ElementSet,
        edges: &[f64],
        tracers: impl IntoIterator<Item = &'a Tracer>,
    ) -> MdfTable {
        let mut builder = Self::new(elements, edges);
        for t in tracers {
            if t.mass > 0.0 {
                builder.add(&t.abundances, t.mass);
            }
        }
        builder.finish()
    }

    /// Normalize to densities integrating to one.
    ///
    /// Columns with nothing in range stay all zero.
    pub fn finish(self) -> MdfTable {
        let widths: Vec<f64> = self.edges.windows(2).map(|w| w[1] - w[0]).collect();
        let columns = self
            .counts
            .into_iter()
            .map(|(label, col)| {
                let total: f64 = col.iter().sum();
                let density = if total > 0.0 {
                    col.iter().zip(&widths).map(|(c, w)| c / (total * w)).collect()
                } else {
                    col
                };
                (label, density)
            })
            .collect();
        MdfTable {
            edges: self.edges,
            columns,
        }
    }
}
