//! Rebuilding functions from sampled output.
//!
//! A run's driving functions may be arbitrary closures, which cannot be
//! written to disk. Their sampled values can, and [`repair_function`]
//! turns those samples back into a callable: piecewise linear between
//! samples, exact at them, and extended linearly past either end.

use std::sync::Arc;

use gce_core::TimeFunction;

use crate::error::OutputError;
use crate::history::HistoryTable;

/// A piecewise-linear interpolant through `(x, y)` samples.
#[derive(Clone, Debug, PartialEq)]
pub struct RepairedFunction {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

/// Build a [`RepairedFunction`] from samples.
///
/// # Errors
///
/// [`OutputError::InvalidSamples`] if the slices differ in length, hold
/// fewer than two points, contain non-finite values, or `xs` is not
/// strictly increasing.
pub fn repair_function(xs: &[f64], ys: &[f64]) -> Result<RepairedFunction, OutputError> {
    RepairedFunction::new(xs.to_vec(), ys.to_vec())
}

impl RepairedFunction {
    /// Validate and take ownership of samples. See [`repair_function`].
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self, OutputError> {
        let invalid = |reason: String| OutputError::InvalidSamples { reason };
        if xs.len() != ys.len() {
            return Err(invalid(format!(
                "{} x values but {} y values",
                xs.len(),
                ys.len()
            )));
        }
        if xs.len() < 2 {
            return Err(invalid(format!("need at least two samples, got {}", xs.len())));
        }
        if let Some(i) = xs.iter().chain(&ys).position(|v| !v.is_finite()) {
            return Err(invalid(format!("non-finite value at position {i}")));
        }
        if let Some(i) = xs.windows(2).position(|w| w[0] >= w[1]) {
            return Err(invalid(format!("x not strictly increasing at index {}", i + 1)));
        }
        Ok(Self { xs, ys })
    }

    /// Rebuild a history column as a function of `time`.
    pub fn from_history(table: &HistoryTable, column: &str) -> Result<Self, OutputError> {
        Self::new(table.column("time")?, table.column(column)?)
    }

    /// Sample abscissae.
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    /// Sample ordinates.
    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    /// Evaluate at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        let n = self.xs.len();
        // Number of samples at or left of x.
        let k = self.xs.partition_point(|&v| v <= x);
        if k > 0 && self.xs[k - 1] == x {
            return self.ys[k - 1];
        }
        let seg = k.clamp(1, n - 1) - 1;
        let (x0, x1) = (self.xs[seg], self.xs[seg + 1]);
        let (y0, y1) = (self.ys[seg], self.ys[seg + 1]);
        let y = y0 + (y1 - y0) * ((x - x0) / (x1 - x0));
        if k == 0 || k == n {
            y
        } else {
            y.clamp(y0.min(y1), y0.max(y1))
        }
    }

    /// Wrap as a [`TimeFunction`] so it can drive a new run.
    pub fn into_time_function(self) -> TimeFunction {
        let f = Arc::new(self);
        TimeFunction::custom(move |t| f.eval(t))
    }
}
