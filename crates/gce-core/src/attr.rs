//! Functional attributes: parameters that are either a constant or a
//! function of time.
//!
//! Attributes such as the outflow mass-loading factor or the star
//! formation timescale accept a plain number or an arbitrary closure.
//! They are resolved once when a model is prepared; the integrator only
//! ever calls [`TimeFunction::eval`].

use std::fmt;
use std::sync::Arc;

use crate::error::ConfigError;

/// A shareable unary function `f64 -> f64`.
///
/// `Send + Sync` so zones holding closures can be advanced in parallel.
pub type ScalarFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// A scalar parameter that may vary with time (in Gyr).
#[derive(Clone)]
pub enum TimeFunction {
    /// The same value at every time.
    Constant(f64),
    /// An arbitrary function of time.
    Custom(ScalarFn),
}

impl TimeFunction {
    /// Wrap a closure.
    pub fn custom(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Evaluate at time `t` (Gyr).
    pub fn eval(&self, t: f64) -> f64 {
        match self {
            Self::Constant(v) => *v,
            Self::Custom(f) => f(t),
        }
    }

    /// Whether the value is a constant.
    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }

    /// Check a constant against `[min, +inf)`.
    ///
    /// Closures are not evaluated here; the integrator checks the value
    /// they return at every step.
    pub fn validate_min(&self, name: &str, min: f64) -> Result<(), ConfigError> {
        if let Self::Constant(v) = self {
            if !v.is_finite() || *v < min {
                return Err(ConfigError::invalid(
                    name,
                    format!("must be finite and >= {min}, got {v}"),
                ));
            }
        }
        Ok(())
    }

    /// Check a constant against `(0, +inf)`.
    pub fn validate_positive(&self, name: &str) -> Result<(), ConfigError> {
        if let Self::Constant(v) = self {
            if !v.is_finite() || *v <= 0.0 {
                return Err(ConfigError::invalid(
                    name,
                    format!("must be finite and positive, got {v}"),
                ));
            }
        }
        Ok(())
    }

    /// Check a constant against `[0, 1]`.
    pub fn validate_fraction(&self, name: &str) -> Result<(), ConfigError> {
        if let Self::Constant(v) = self {
            if !(0.0..=1.0).contains(v) {
                return Err(ConfigError::invalid(
                    name,
                    format!("must lie in [0, 1], got {v}"),
                ));
            }
        }
        Ok(())
    }
}

impl From<f64> for TimeFunction {
    fn from(v: f64) -> Self {
        Self::Constant(v)
    }
}

impl fmt::Debug for TimeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(v) => write!(f, "Constant({v})"),
            Self::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_ignores_time() {
        let f = TimeFunction::from(2.5);
        assert_eq!(f.eval(0.0), 2.5);
        assert_eq!(f.eval(13.2), 2.5);
        assert!(f.is_constant());
    }

    #[test]
    fn custom_evaluates_closure() {
        let f = TimeFunction::custom(|t| 2.0 * t);
        assert_eq!(f.eval(3.0), 6.0);
        assert!(!f.is_constant());
        assert_eq!(format!("{f:?}"), "Custom(<fn>)");
    }

    #[test]
    fn validation_only_checks_constants() {
        assert!(TimeFunction::from(-1.0).validate_min("eta", 0.0).is_err());
        assert!(TimeFunction::from(f64::NAN).validate_positive("tau_star").is_err());
        assert!(TimeFunction::from(1.5).validate_fraction("entrainment").is_err());
        assert!(TimeFunction::custom(|_| -1.0).validate_min("eta", 0.0).is_ok());
    }
}
