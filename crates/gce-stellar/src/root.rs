//! Bisection root finding.

/// Bisection on a bracketing interval.
///
/// Stops when the bracket width falls below `tolerance` times the
/// magnitude of the midpoint, or after `max_iterations` halvings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bisection {
    /// Relative tolerance on the root.
    pub tolerance: f64,
    /// Maximum number of halvings.
    pub max_iterations: u32,
}

impl Default for Bisection {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 200,
        }
    }
}

impl Bisection {
    /// Find `x` in `[lo, hi]` with `f(x) = 0`.
    ///
    /// Returns `None` if `f(lo)` and `f(hi)` have the same strict sign.
    /// An exact zero at either end is returned directly.
    pub fn solve(&self, f: impl Fn(f64) -> f64, lo: f64, hi: f64) -> Option<f64> {
        let (mut lo, mut hi) = (lo.min(hi), lo.max(hi));
        let mut f_lo = f(lo);
        let f_hi = f(hi);
        if f_lo == 0.0 {
            return Some(lo);
        }
        if f_hi == 0.0 {
            return Some(hi);
        }
        if f_lo.signum() == f_hi.signum() {
            return None;
        }
        for _ in 0..self.max_iterations {
            let mid = 0.5 * (lo + hi);
            if (hi - lo) <= self.tolerance * mid.abs() {
                return Some(mid);
            }
            let f_mid = f(mid);
            if f_mid == 0.0 {
                return Some(mid);
            }
            if f_mid.signum() == f_lo.signum() {
                lo = mid;
                f_lo = f_mid;
            } else {
                hi = mid;
            }
        }
        Some(0.5 * (lo + hi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_square_root_of_two() {
        let x = Bisection::default().solve(|x| x * x - 2.0, 0.0, 2.0).unwrap();
        assert!((x - std::f64::consts::SQRT_2).abs() < 2e-6);
    }

    #[test]
    fn decreasing_function_is_fine() {
        let x = Bisection::default().solve(|x| 1.0 / x - 0.25, 0.5, 10.0).unwrap();
        assert!((x - 4.0).abs() / 4.0 < 1e-6);
    }

    #[test]
    fn no_sign_change_is_none() {
        assert!(Bisection::default().solve(|x| x * x + 1.0, -1.0, 1.0).is_none());
    }

    #[test]
    fn iteration_cap_still_returns_midpoint() {
        let b = Bisection {
            tolerance: 0.0,
            max_iterations: 3,
        };
        let x = b.solve(|x| x - 0.3, 0.0, 1.0).unwrap();
        assert!((x - 0.3).abs() <= 0.125);
    }
}
