//! Tracer stellar populations.

use gce_core::{Abundances, StepIndex, TracerId, TracerRecord, ZoneId};

/// One coeval population formed in one zone during one step.
///
/// `abundances` holds the ISM mass fraction of each tracked element at
/// formation, aligned with the zone's element set. Recycled and
/// AGB-processed gas returns at these abundances.
#[derive(Clone, Debug, PartialEq)]
pub struct Tracer {
    /// Formation order across the whole model.
    pub id: TracerId,
    /// Zone it formed in.
    pub zone_origin: ZoneId,
    /// Zone it currently occupies.
    pub zone: ZoneId,
    /// Step during which it formed.
    pub formation_step: StepIndex,
    /// Formation time in Gyr.
    pub formation_time: f64,
    /// Initial mass in Msun.
    pub mass: f64,
    /// Scaled total metallicity at formation.
    pub metallicity: f64,
    /// Element mass fractions at formation.
    pub abundances: Abundances,
}

impl Tracer {
    /// Age in whole steps at the start of step `now`.
    pub fn age_steps(&self, now: StepIndex) -> usize {
        now.0.saturating_sub(self.formation_step.0) as usize
    }

    /// Output record with migration metadata attached.
    pub fn record(&self, analog: Option<u64>, final_height: Option<f64>) -> TracerRecord {
        TracerRecord {
            id: self.id,
            zone_origin: self.zone_origin,
            zone_final: self.zone,
            formation_time: self.formation_time,
            mass: self.mass,
            metallicity: self.metallicity,
            analog,
            final_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn age_counts_whole_steps() {
        let t = Tracer {
            id: TracerId(7),
            zone_origin: ZoneId(1),
            zone: ZoneId(2),
            formation_step: StepIndex(10),
            formation_time: 0.1,
            mass: 1e7,
            metallicity: 0.01,
            abundances: smallvec![0.005, 0.001],
        };
        assert_eq!(t.age_steps(StepIndex(10)), 0);
        assert_eq!(t.age_steps(StepIndex(25)), 15);
        assert_eq!(t.age_steps(StepIndex(3)), 0);

        let r = t.record(Some(42), None);
        assert_eq!(r.zone_origin, ZoneId(1));
        assert_eq!(r.zone_final, ZoneId(2));
        assert_eq!(r.analog, Some(42));
    }
}
