//! Radial binning of a disk into annular zones.

use std::f64::consts::PI;

use gce_core::{ConfigError, ZoneId};

/// Annulus edges in kpc; zone `i` spans `[edges[i], edges[i + 1])`.
#[derive(Clone, Debug, PartialEq)]
pub struct RadialBins {
    edges: Vec<f64>,
}

impl RadialBins {
    /// Validate and wrap bin edges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidParameter`] unless there are at least two
    /// finite, non-negative, strictly increasing edges.
    pub fn new(edges: Vec<f64>) -> Result<Self, ConfigError> {
        if edges.len() < 2 {
            return Err(ConfigError::invalid(
                "radial_bins",
                "need at least two edges",
            ));
        }
        if edges.iter().any(|e| !e.is_finite() || *e < 0.0) || edges.windows(2).any(|w| w[0] >= w[1])
        {
            return Err(ConfigError::invalid(
                "radial_bins",
                "edges must be finite, non-negative and strictly increasing",
            ));
        }
        Ok(Self { edges })
    }

    /// `n` equal-width annuli over `[inner, outer]`.
    pub fn uniform(inner: f64, outer: f64, n: usize) -> Result<Self, ConfigError> {
        if n == 0 {
            return Err(ConfigError::invalid("radial_bins", "need at least one zone"));
        }
        let width = (outer - inner) / n as f64;
        Self::new((0..=n).map(|i| inner + i as f64 * width).collect())
    }

    /// Number of zones.
    pub fn n_zones(&self) -> usize {
        self.edges.len() - 1
    }

    /// Bin edges.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Inner and outer radius of `zone`.
    ///
    /// # Panics
    ///
    /// If `zone` is out of range.
    pub fn annulus(&self, zone: ZoneId) -> (f64, f64) {
        let i = zone.index();
        (self.edges[i], self.edges[i + 1])
    }

    /// Area of `zone` in kpc².
    pub fn area(&self, zone: ZoneId) -> f64 {
        let (r0, r1) = self.annulus(zone);
        PI * (r1 * r1 - r0 * r0)
    }

    /// Zone containing `radius`; radii beyond either end map to the edge zone.
    pub fn zone_of(&self, radius: f64) -> ZoneId {
        let n = self.n_zones();
        let i = self.edges.partition_point(|&e| e <= radius);
        ZoneId(i.saturating_sub(1).min(n - 1) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zone_lookup_and_clamping() {
        let bins = RadialBins::new(vec![0.0, 2.0, 4.0, 8.0]).unwrap();
        assert_eq!(bins.zone_of(1.0), ZoneId(0));
        assert_eq!(bins.zone_of(2.0), ZoneId(1));
        assert_eq!(bins.zone_of(7.99), ZoneId(2));
        assert_eq!(bins.zone_of(8.0), ZoneId(2));
        assert_eq!(bins.zone_of(30.0), ZoneId(2));
        assert_eq!(bins.zone_of(-1.0), ZoneId(0));
    }

    #[test]
    fn annulus_area() {
        let bins = RadialBins::uniform(0.0, 2.0, 2).unwrap();
        assert!((bins.area(ZoneId(1)) - 3.0 * PI).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_edges() {
        assert!(RadialBins::new(vec![1.0]).is_err());
        assert!(RadialBins::new(vec![0.0, 2.0, 1.0]).is_err());
        assert!(RadialBins::new(vec![-1.0, 2.0]).is_err());
        assert!(RadialBins::uniform(0.0, 1.0, 0).is_err());
    }

    proptest! {
        #[test]
        fn zone_contains_radius(r in 0.0f64..19.99) {
            let bins = RadialBins::uniform(0.0, 20.0, 200).unwrap();
            let (lo, hi) = bins.annulus(bins.zone_of(r));
            prop_assert!(lo <= r && r < hi);
        }
    }
}
