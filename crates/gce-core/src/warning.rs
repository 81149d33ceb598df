//! Recoverable numerical warnings.
//!
//! Numerical edge cases inside a step are recovered locally
//! (clip-and-continue) and reported as a [`NumericalWarning`] that names
//! the zone, step, time and quantity involved.

use std::fmt;

use crate::id::{StepIndex, ZoneId};

/// What kind of recoverable condition occurred.
#[derive(Clone, Debug, PartialEq)]
pub enum WarningKind {
    /// A mass would have gone negative and was clipped to zero.
    ClippedNegative {
        /// The value before clipping.
        value: f64,
    },
    /// Gas or SFR mode implied a negative infall rate.
    NegativeInfall {
        /// The implied rate in Msun/yr.
        value: f64,
    },
    /// A parameter outside the range usually considered physical.
    QuestionableParameter {
        /// Description of the concern.
        reason: String,
    },
}

/// A recoverable condition attributable to one step and quantity.
#[derive(Clone, Debug, PartialEq)]
pub struct NumericalWarning {
    /// Zone in which it occurred.
    pub zone: ZoneId,
    /// Step at which it occurred.
    pub step: StepIndex,
    /// Simulation time in Gyr.
    pub time: f64,
    /// The quantity involved, e.g. `"mass(fe)"`.
    pub quantity: String,
    /// What happened.
    pub kind: WarningKind,
}

impl fmt::Display for NumericalWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "zone {} step {} (t = {:.4} Gyr): {}: ",
            self.zone, self.step, self.time, self.quantity
        )?;
        match &self.kind {
            WarningKind::ClippedNegative { value } => {
                write!(f, "negative value {value:e} clipped to zero")
            }
            WarningKind::NegativeInfall { value } => {
                write!(f, "implied infall rate {value:e} Msun/yr is negative")
            }
            WarningKind::QuestionableParameter { reason } => f.write_str(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_zone_step_and_quantity() {
        let w = NumericalWarning {
            zone: ZoneId(3),
            step: StepIndex(12),
            time: 0.12,
            quantity: "mass(fe)".into(),
            kind: WarningKind::ClippedNegative { value: -1e-3 },
        };
        let msg = w.to_string();
        assert!(msg.contains("zone 3"));
        assert!(msg.contains("step 12"));
        assert!(msg.contains("mass(fe)"));
        assert!(msg.contains("clipped"));
    }
}
