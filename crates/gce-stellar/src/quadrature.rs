//! Composite Newton–Cotes quadrature with interval doubling.
//!
//! [`Integrator::integrate`] evaluates a composite rule at
//! `min_intervals`, then doubles the number of sub-intervals until two
//! successive estimates agree to within `tolerance` (relative) or
//! `max_intervals` is reached. The relative difference between the last
//! two estimates is reported as the error.

use std::fmt;
use std::str::FromStr;

use gce_core::ConfigError;

/// A composite quadrature rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum QuadratureRule {
    /// Left Riemann sum.
    Euler,
    /// Composite midpoint rule.
    Midpoint,
    /// Composite trapezoid rule.
    Trapezoid,
    /// Composite Simpson's rule.
    #[default]
    Simpson,
}

impl QuadratureRule {
    /// Keyword naming the rule.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Euler => "euler",
            Self::Midpoint => "midpoint",
            Self::Trapezoid => "trapezoid",
            Self::Simpson => "simpson",
        }
    }

    /// Composite estimate of `∫_a^b f` over `n` equal sub-intervals.
    ///
    /// Simpson's rule rounds `n` up to the next even number.
    pub fn composite(self, f: &impl Fn(f64) -> f64, a: f64, b: f64, n: usize) -> f64 {
        let n = match self {
            Self::Simpson => (n.max(2) + 1) & !1,
            _ => n.max(1),
        };
        let h = (b - a) / n as f64;
        match self {
            Self::Euler => (0..n).map(|i| f(a + i as f64 * h)).sum::<f64>() * h,
            Self::Midpoint => (0..n).map(|i| f(a + (i as f64 + 0.5) * h)).sum::<f64>() * h,
            Self::Trapezoid => {
                let inner: f64 = (1..n).map(|i| f(a + i as f64 * h)).sum();
                h * (0.5 * (f(a) + f(b)) + inner)
            }
            Self::Simpson => {
                let mut sum = f(a) + f(b);
                for i in 1..n {
                    let w = if i % 2 == 1 { 4.0 } else { 2.0 };
                    sum += w * f(a + i as f64 * h);
                }
                sum * h / 3.0
            }
        }
    }
}

impl fmt::Display for QuadratureRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for QuadratureRule {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euler" => Ok(Self::Euler),
            "midpoint" => Ok(Self::Midpoint),
            "trapezoid" | "trapezoidal" => Ok(Self::Trapezoid),
            "simpson" => Ok(Self::Simpson),
            _ => Err(ConfigError::UnrecognizedKeyword {
                what: "quadrature rule".into(),
                keyword: s.to_string(),
            }),
        }
    }
}

/// Result of a numerical integration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Integral {
    /// Estimated value of the integral.
    pub value: f64,
    /// Relative difference between the last two estimates.
    ///
    /// `NaN` when the integrand vanished identically (the value is then
    /// exactly zero); callers test for a zero value, not a NaN error.
    pub error: f64,
    /// Number of sub-intervals used for the final estimate.
    pub intervals: usize,
}

impl Integral {
    /// An exact zero, e.g. over an empty range.
    pub fn zero() -> Self {
        Self {
            value: 0.0,
            error: 0.0,
            intervals: 0,
        }
    }
}

/// Adaptive composite integrator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Integrator {
    /// Composite rule to apply.
    pub rule: QuadratureRule,
    /// Target relative error between successive estimates.
    pub tolerance: f64,
    /// Sub-intervals of the first estimate.
    pub min_intervals: usize,
    /// Upper bound on sub-intervals.
    pub max_intervals: usize,
}

impl Default for Integrator {
    fn default() -> Self {
        Self {
            rule: QuadratureRule::Simpson,
            tolerance: 1e-3,
            min_intervals: 64,
            max_intervals: 1 << 20,
        }
    }
}

impl Integrator {
    /// An integrator with the given rule and default bounds.
    pub fn new(rule: QuadratureRule, tolerance: f64) -> Self {
        Self {
            rule,
            tolerance,
            ..Self::default()
        }
    }

    /// Check the tolerance and interval bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 || self.tolerance >= 1.0 {
            return Err(ConfigError::invalid(
                "tolerance",
                format!("must lie in (0, 1), got {}", self.tolerance),
            ));
        }
        if self.min_intervals == 0 || self.min_intervals > self.max_intervals {
            return Err(ConfigError::invalid(
                "intervals",
                format!(
                    "need 0 < min_intervals <= max_intervals, got {} and {}",
                    self.min_intervals, self.max_intervals
                ),
            ));
        }
        Ok(())
    }

    /// Integrate `f` over `[a, b]`.
    ///
    /// Returns [`Integral::zero`] when `b <= a`.
    pub fn integrate(&self, f: impl Fn(f64) -> f64, a: f64, b: f64) -> Integral {
        if b <= a {
            return Integral::zero();
        }
        let mut n = self.min_intervals.max(1);
        let mut old = self.rule.composite(&f, a, b, n);
        loop {
            n *= 2;
            let new = self.rule.composite(&f, a, b, n);
            if new == 0.0 && old == 0.0 {
                return Integral {
                    value: 0.0,
                    error: f64::NAN,
                    intervals: n,
                };
            }
            let error = ((new - old) / new).abs();
            if error <= self.tolerance || n >= self.max_intervals {
                return Integral {
                    value: new,
                    error,
                    intervals: n,
                };
            }
            old = new;
        }
    }
}
