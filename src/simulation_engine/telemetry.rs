use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, VecDeque};

use crate::control_system::intersection::{IntersectionId, Telemetry};
use crate::error::ControlError;

/// Unvalidated sensor reading as delivered by a feed. May be negative or non-finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawTelemetry {
    pub vehicles: i64,
    pub avg_speed: f64,
}

impl RawTelemetry {
    pub fn new(vehicles: i64, avg_speed: f64) -> Self {
        Self {
            vehicles,
            avg_speed,
        }
    }

    pub fn validate(&self, id: IntersectionId) -> Result<(), ControlError> {
        if self.vehicles < 0 || !self.avg_speed.is_finite() || self.avg_speed < 0.0 {
            return Err(ControlError::InvalidTelemetry {
                id,
                vehicles: self.vehicles,
                avg_speed: self.avg_speed,
            });
        }
        Ok(())
    }

    /// Negative counts and negative or non-finite speeds become zero.
    pub fn clamped(&self) -> Telemetry {
        let avg_speed = if self.avg_speed.is_finite() {
            self.avg_speed.max(0.0)
        } else {
            0.0
        };
        Telemetry {
            vehicles: self.vehicles.clamp(0, u32::MAX as i64) as u32,
            avg_speed,
        }
    }
}

impl From<Telemetry> for RawTelemetry {
    fn from(telemetry: Telemetry) -> Self {
        Self {
            vehicles: telemetry.vehicles as i64,
            avg_speed: telemetry.avg_speed,
        }
    }
}

/// Source of per-tick sensor readings.
pub trait TelemetryProvider: Send {
    fn sample(&mut self, id: IntersectionId, previous: Telemetry) -> RawTelemetry;
}

/// Random walk around the previous reading, standing in for real detectors.
pub struct RandomTelemetry {
    rng: StdRng,
}

impl RandomTelemetry {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryProvider for RandomTelemetry {
    fn sample(&mut self, _id: IntersectionId, previous: Telemetry) -> RawTelemetry {
        // The vehicle count is left unclamped; sanitising it is the controller's job.
        let vehicles = previous.vehicles as i64 + self.rng.random_range(-5..5);
        let speed_delta = f64::from(self.rng.random_range(-3i32..3));
        let avg_speed = (previous.avg_speed + speed_delta).clamp(5.0, 50.0);
        RawTelemetry {
            vehicles,
            avg_speed,
        }
    }
}

/// Deterministic feed for tests and replays. Repeats the previous reading once a queue runs dry.
#[derive(Debug, Default, Clone)]
pub struct ScriptedTelemetry {
    queued: HashMap<IntersectionId, VecDeque<RawTelemetry>>,
}

impl ScriptedTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: IntersectionId, reading: RawTelemetry) -> &mut Self {
        self.queued.entry(id).or_default().push_back(reading);
        self
    }

    pub fn with_sequence<I>(mut self, id: IntersectionId, readings: I) -> Self
    where
        I: IntoIterator<Item = RawTelemetry>,
    {
        self.queued.entry(id).or_default().extend(readings);
        self
    }

    pub fn remaining(&self, id: IntersectionId) -> usize {
        self.queued.get(&id).map_or(0, VecDeque::len)
    }
}

impl TelemetryProvider for ScriptedTelemetry {
    fn sample(&mut self, id: IntersectionId, previous: Telemetry) -> RawTelemetry {
        self.queued
            .get_mut(&id)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| previous.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_readings_are_reported_and_clamped() {
        let raw = RawTelemetry::new(-4, -2.5);
        assert!(matches!(
            raw.validate(IntersectionId(1)),
            Err(ControlError::InvalidTelemetry { vehicles: -4, .. })
        ));
        assert_eq!(
            raw.clamped(),
            Telemetry {
                vehicles: 0,
                avg_speed: 0.0
            }
        );
    }

    #[test]
    fn nan_speed_becomes_zero() {
        let raw = RawTelemetry::new(3, f64::NAN);
        assert!(raw.validate(IntersectionId(1)).is_err());
        assert_eq!(raw.clamped().avg_speed, 0.0);
    }

    #[test]
    fn scripted_feed_replays_then_holds() {
        let id = IntersectionId(4);
        let mut feed =
            ScriptedTelemetry::new().with_sequence(id, [RawTelemetry::new(10, 30.0)]);
        let previous = Telemetry {
            vehicles: 2,
            avg_speed: 40.0,
        };
        assert_eq!(feed.sample(id, previous), RawTelemetry::new(10, 30.0));
        assert_eq!(feed.remaining(id), 0);
        assert_eq!(feed.sample(id, previous), RawTelemetry::new(2, 40.0));
    }

    #[test]
    fn seeded_random_walk_is_reproducible_and_bounded() {
        let previous = Telemetry {
            vehicles: 20,
            avg_speed: 30.0,
        };
        let mut a = RandomTelemetry::seeded(7);
        let mut b = RandomTelemetry::seeded(7);
        for _ in 0..50 {
            let left = a.sample(IntersectionId(1), previous);
            let right = b.sample(IntersectionId(1), previous);
            assert_eq!(left, right);
            assert!((15..25).contains(&left.vehicles));
            assert!((5.0..=50.0).contains(&left.avg_speed));
        }
    }
}
