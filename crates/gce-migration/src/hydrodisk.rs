//! Analog-driven radial migration.
//!
//! When a tracer is first assigned (at its formation time) it draws a
//! birth radius uniformly within its formation annulus and is matched
//! to the nearest catalog analog in `(radius, time)`. The analog's final
//! radius becomes the tracer's; without an analog the tracer keeps its
//! birth radius. The radius at later times then follows the configured
//! [`MigrationMode`] from birth radius to final radius, and the zone is
//! whichever annulus contains it.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use gce_core::{ConfigError, TracerId, ZoneId};

use crate::analog::{Analog, AnalogCatalog, MatchWindow};
use crate::bins::RadialBins;
use crate::scheme::MigrationScheme;

/// How a tracer's radius moves between birth and the end of the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum MigrationMode {
    /// Linear in elapsed time.
    #[default]
    Linear,
    /// Jumps to the final radius at a uniformly drawn time.
    Sudden,
    /// Proportional to the square root of elapsed time.
    Diffusion,
}

impl fmt::Display for MigrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Linear => "linear",
            Self::Sudden => "sudden",
            Self::Diffusion => "diffusion",
        })
    }
}

impl FromStr for MigrationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "sudden" => Ok(Self::Sudden),
            "diffusion" => Ok(Self::Diffusion),
            _ => Err(ConfigError::UnrecognizedKeyword {
                what: "migration mode".into(),
                keyword: s.to_string(),
            }),
        }
    }
}

/// The persisted path of one tracer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trajectory {
    /// Zone the tracer formed in.
    pub birth_zone: ZoneId,
    /// Formation time in Gyr.
    pub formation_time: f64,
    /// Radius at formation in kpc.
    pub birth_radius: f64,
    /// Radius at the end of the run in kpc.
    pub final_radius: f64,
    /// Time of the jump under [`MigrationMode::Sudden`].
    pub migration_time: f64,
    /// The matched analog, if any.
    pub analog: Option<Analog>,
}

impl Trajectory {
    /// Radius at `time` for a run ending at `end_time`.
    pub fn radius_at(&self, mode: MigrationMode, time: f64, end_time: f64) -> f64 {
        let span = end_time - self.formation_time;
        let frac = if span > 0.0 {
            ((time - self.formation_time) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };
        if frac >= 1.0 {
            return self.final_radius;
        }
        let shift = self.final_radius - self.birth_radius;
        match mode {
            MigrationMode::Linear => self.birth_radius + shift * frac,
            MigrationMode::Diffusion => self.birth_radius + shift * frac.sqrt(),
            MigrationMode::Sudden => {
                if time < self.migration_time {
                    self.birth_radius
                } else {
                    self.final_radius
                }
            }
        }
    }

    /// Identifier of the matched analog.
    pub fn analog_id(&self) -> Option<u64> {
        self.analog.map(|a| a.id)
    }

    /// Final height of the matched analog.
    pub fn final_height(&self) -> Option<f64> {
        self.analog.map(|a| a.final_height)
    }
}

/// Migration along trajectories borrowed from a star particle catalog.
#[derive(Clone, Debug)]
pub struct HydroDiskMigration {
    catalog: Arc<AnalogCatalog>,
    bins: RadialBins,
    mode: MigrationMode,
    window: MatchWindow,
    end_time: f64,
    seed: u64,
    trajectories: IndexMap<TracerId, Trajectory>,
}

impl HydroDiskMigration {
    /// A scheme over `bins` for a run ending at `end_time` Gyr.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidParameter`] for a non-positive end time.
    pub fn new(
        catalog: Arc<AnalogCatalog>,
        bins: RadialBins,
        mode: MigrationMode,
        end_time: f64,
    ) -> Result<Self, ConfigError> {
        if !(end_time.is_finite() && end_time > 0.0) {
            return Err(ConfigError::invalid(
                "end_time",
                format!("must be finite and positive, got {end_time}"),
            ));
        }
        Ok(Self {
            catalog,
            bins,
            mode,
            window: MatchWindow::default(),
            end_time,
            seed: 0,
            trajectories: IndexMap::new(),
        })
    }

    /// Set the RNG seed (default: 0).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the initial analog search window.
    pub fn with_window(mut self, window: MatchWindow) -> Self {
        self.window = window;
        self
    }

    /// Migration mode.
    pub fn mode(&self) -> MigrationMode {
        self.mode
    }

    /// Radial bins.
    pub fn bins(&self) -> &RadialBins {
        &self.bins
    }

    /// Number of tracers with a persisted trajectory.
    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    /// Whether no tracer has been assigned yet.
    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    fn draw(&self, tracer: TracerId, zone: ZoneId, tform: f64) -> Trajectory {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed ^ tracer.0);
        let (inner, outer) = self.bins.annulus(zone);
        let birth_radius = inner + (outer - inner) * rng.random::<f64>();
        let u: f64 = rng.random();
        let migration_time = if self.end_time > tform {
            tform + (self.end_time - tform) * u
        } else {
            self.end_time
        };
        let analog = self.catalog.find(birth_radius, tform, self.window).copied();
        if analog.is_none() {
            log::trace!(
                "tracer {tracer}: no analog near r = {birth_radius:.2} kpc, t = {tform:.3} Gyr; not migrating"
            );
        }
        let final_radius = analog.map_or(birth_radius, |a| a.final_radius);
        Trajectory {
            birth_zone: zone,
            formation_time: tform,
            birth_radius,
            final_radius,
            migration_time,
            analog,
        }
    }
}

impl MigrationScheme for HydroDiskMigration {
    fn assign(&mut self, tracer: TracerId, zone: ZoneId, tform: f64, time: f64) -> ZoneId {
        let traj = match self.trajectories.get(&tracer) {
            Some(t) => *t,
            None => {
                let t = self.draw(tracer, zone, tform);
                self.trajectories.insert(tracer, t);
                t
            }
        };
        self.bins
            .zone_of(traj.radius_at(self.mode, time, self.end_time))
    }

    fn trajectory(&self, tracer: TracerId) -> Option<&Trajectory> {
        self.trajectories.get(&tracer)
    }
}
