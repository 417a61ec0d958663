use crate::control_system::intersection::{ControlMode, Intersection, LightState};
use crate::global_variables::{
    ADAPTIVE_GREEN_FACTOR, ADAPTIVE_GREEN_MAX, ADAPTIVE_GREEN_MIN, ADAPTIVE_RED_FACTOR,
    ADAPTIVE_RED_MAX, ADAPTIVE_RED_MIN, CYCLE_MANUAL, MANUAL_PHASE_SECONDS, YELLOW_SECONDS,
};

/// Duration of the phase being entered plus the advisory cycle length to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTiming {
    pub duration: u32,
    pub cycle_length: u32,
}

/// Computes how long an intersection stays in the phase it is entering.
pub trait TimingPolicy {
    fn phase_timing(&self, intersection: &Intersection, entering: LightState) -> PhaseTiming;
}

/// Demand-responsive timing driven by the vehicle count.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdaptiveTiming;

/// Fixed timing for operator-controlled intersections. Ignores telemetry.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualTiming;

fn scaled(vehicles: u32, factor: f64, min: u32, max: u32) -> u32 {
    let raw = (vehicles as f64 * factor).round();
    (raw as u32).clamp(min, max)
}

impl TimingPolicy for AdaptiveTiming {
    fn phase_timing(&self, intersection: &Intersection, entering: LightState) -> PhaseTiming {
        let vehicles = intersection.telemetry().vehicles;
        let duration = match entering {
            LightState::Yellow => YELLOW_SECONDS,
            LightState::Red => scaled(
                vehicles,
                ADAPTIVE_RED_FACTOR,
                ADAPTIVE_RED_MIN,
                ADAPTIVE_RED_MAX,
            ),
            LightState::Green => scaled(
                vehicles,
                ADAPTIVE_GREEN_FACTOR,
                ADAPTIVE_GREEN_MIN,
                ADAPTIVE_GREEN_MAX,
            ),
        };
        PhaseTiming {
            duration,
            cycle_length: intersection.status().cycle_length(),
        }
    }
}

impl TimingPolicy for ManualTiming {
    fn phase_timing(&self, _intersection: &Intersection, entering: LightState) -> PhaseTiming {
        let duration = match entering {
            LightState::Yellow => YELLOW_SECONDS,
            LightState::Green | LightState::Red => MANUAL_PHASE_SECONDS,
        };
        PhaseTiming {
            duration,
            cycle_length: CYCLE_MANUAL,
        }
    }
}

/// The policy governing an intersection in the given control mode.
pub fn policy_for(mode: ControlMode) -> &'static dyn TimingPolicy {
    match mode {
        ControlMode::Adaptive => &AdaptiveTiming,
        ControlMode::Manual => &ManualTiming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_system::intersection::{IntersectionId, Telemetry};

    fn with_vehicles(vehicles: u32, avg_speed: f64) -> Intersection {
        Intersection::new(
            IntersectionId(1),
            "Main & Broadway",
            LightState::Red,
            1,
            Telemetry {
                vehicles,
                avg_speed,
            },
        )
    }

    #[test]
    fn adaptive_green_scales_with_demand() {
        let timing = AdaptiveTiming.phase_timing(&with_vehicles(20, 35.0), LightState::Green);
        assert_eq!(timing.duration, 40);
        assert_eq!(timing.cycle_length, 60);
    }

    #[test]
    fn adaptive_green_clamps() {
        assert_eq!(
            AdaptiveTiming
                .phase_timing(&with_vehicles(3, 35.0), LightState::Green)
                .duration,
            30
        );
        assert_eq!(
            AdaptiveTiming
                .phase_timing(&with_vehicles(70, 35.0), LightState::Green)
                .duration,
            90
        );
    }

    #[test]
    fn adaptive_red_rounds_and_clamps() {
        // 17 * 1.5 = 25.5 rounds to 26
        assert_eq!(
            AdaptiveTiming
                .phase_timing(&with_vehicles(17, 35.0), LightState::Red)
                .duration,
            26
        );
        assert_eq!(
            AdaptiveTiming
                .phase_timing(&with_vehicles(0, 35.0), LightState::Red)
                .duration,
            20
        );
        assert_eq!(
            AdaptiveTiming
                .phase_timing(&with_vehicles(100, 35.0), LightState::Red)
                .duration,
            60
        );
    }

    #[test]
    fn adaptive_cycle_follows_status() {
        let congested = AdaptiveTiming.phase_timing(&with_vehicles(30, 35.0), LightState::Red);
        assert_eq!(congested.cycle_length, 90);
        let critical = AdaptiveTiming.phase_timing(&with_vehicles(45, 8.0), LightState::Red);
        assert_eq!(critical.cycle_length, 120);
    }

    #[test]
    fn yellow_is_fixed_in_every_mode() {
        let busy = with_vehicles(80, 5.0);
        assert_eq!(AdaptiveTiming.phase_timing(&busy, LightState::Yellow).duration, 5);
        assert_eq!(ManualTiming.phase_timing(&busy, LightState::Yellow).duration, 5);
    }

    #[test]
    fn manual_ignores_telemetry() {
        let quiet = ManualTiming.phase_timing(&with_vehicles(0, 50.0), LightState::Green);
        let busy = ManualTiming.phase_timing(&with_vehicles(90, 3.0), LightState::Green);
        assert_eq!(quiet, busy);
        assert_eq!(quiet.duration, 60);
        assert_eq!(quiet.cycle_length, 120);
    }
}
