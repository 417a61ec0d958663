use serde::{Deserialize, Serialize};
use std::fmt;

use crate::global_variables::{
    CONGESTED_SPEED, CONGESTED_VEHICLES, CRITICAL_SPEED, CRITICAL_VEHICLES, CYCLE_CONGESTED,
    CYCLE_CRITICAL, CYCLE_MANUAL, CYCLE_OPTIMAL,
};

/// Unique identifier for a signalised intersection ("Traffic Light N").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IntersectionId(pub u8);

impl fmt::Display for IntersectionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Traffic Light {}", self.0)
    }
}

/// Possible states of a traffic light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightState {
    Green,
    Yellow,
    Red,
}

impl LightState {
    /// The single cyclic successor of every phase.
    pub const fn successor(self) -> LightState {
        match self {
            LightState::Green => LightState::Yellow,
            LightState::Yellow => LightState::Red,
            LightState::Red => LightState::Green,
        }
    }
}

impl fmt::Display for LightState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            LightState::Green => "green",
            LightState::Yellow => "yellow",
            LightState::Red => "red",
        };
        f.write_str(label)
    }
}

/// Congestion classification derived from the latest telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficStatus {
    Optimal,
    Congested,
    Critical,
}

impl TrafficStatus {
    /// First match wins: critical, then congested, else optimal.
    pub fn classify(telemetry: Telemetry) -> Self {
        if telemetry.vehicles > CRITICAL_VEHICLES || telemetry.avg_speed < CRITICAL_SPEED {
            TrafficStatus::Critical
        } else if telemetry.vehicles > CONGESTED_VEHICLES || telemetry.avg_speed < CONGESTED_SPEED
        {
            TrafficStatus::Congested
        } else {
            TrafficStatus::Optimal
        }
    }

    /// Advisory cycle length for an adaptive intersection in this state.
    pub fn cycle_length(self) -> u32 {
        match self {
            TrafficStatus::Critical => CYCLE_CRITICAL,
            TrafficStatus::Congested => CYCLE_CONGESTED,
            TrafficStatus::Optimal => CYCLE_OPTIMAL,
        }
    }
}

/// Who computes the next phase and its duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    #[default]
    Adaptive,
    Manual,
}

/// Validated sensor reading. Always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Telemetry {
    pub vehicles: u32,
    pub avg_speed: f64,
}

/// Represents a signalised intersection and its control state.
#[derive(Debug, Clone)]
pub struct Intersection {
    /// Unique identifier, also the key used by the route registry.
    pub id: IntersectionId,
    /// Display label.
    pub name: String,
    light_state: LightState,
    time_remaining: u32,
    telemetry: Telemetry,
    status: TrafficStatus,
    control: ControlMode,
    manual_phase: Option<LightState>,
    cycle_length: u32,
}

impl Intersection {
    pub fn new(
        id: IntersectionId,
        name: &str,
        light_state: LightState,
        time_remaining: u32,
        telemetry: Telemetry,
    ) -> Self {
        let status = TrafficStatus::classify(telemetry);
        Self {
            id,
            name: name.to_string(),
            light_state,
            time_remaining,
            telemetry,
            status,
            control: ControlMode::Adaptive,
            manual_phase: None,
            cycle_length: status.cycle_length(),
        }
    }

    /// Builder-style helper used when seeding intersections that start under operator control.
    pub fn with_control(mut self, control: ControlMode, manual_phase: Option<LightState>) -> Self {
        self.set_control(control, manual_phase);
        self
    }

    pub fn light_state(&self) -> LightState {
        self.light_state
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn telemetry(&self) -> Telemetry {
        self.telemetry
    }

    pub fn status(&self) -> TrafficStatus {
        self.status
    }

    pub fn control(&self) -> ControlMode {
        self.control
    }

    pub fn manual_phase(&self) -> Option<LightState> {
        self.manual_phase
    }

    pub fn cycle_length(&self) -> u32 {
        self.cycle_length
    }

    /// Stores fresh telemetry and reclassifies in the same step, so status is never stale.
    pub fn apply_telemetry(&mut self, telemetry: Telemetry) {
        self.telemetry = telemetry;
        self.status = TrafficStatus::classify(telemetry);
    }

    /// Replaces the operator selection as given. Switching back to adaptive forgets the
    /// operator phase. The reported cycle follows the new mode straight away; phase timers
    /// are left alone until the next transition.
    pub fn set_control(&mut self, control: ControlMode, manual_phase: Option<LightState>) {
        self.control = control;
        match control {
            ControlMode::Manual => {
                self.manual_phase = manual_phase;
                self.cycle_length = CYCLE_MANUAL;
            }
            ControlMode::Adaptive => {
                self.manual_phase = None;
                self.cycle_length = self.status.cycle_length();
            }
        }
    }

    /// Counts down one second. Returns true when the current phase has expired.
    pub fn countdown(&mut self) -> bool {
        self.time_remaining = self.time_remaining.saturating_sub(1);
        self.time_remaining == 0
    }

    /// The phase the intersection enters on its next transition.
    /// Manual intersections go to the operator's phase, or hold the current one when unset.
    /// Amber is never held: a manual intersection in Yellow with no phase set moves on to Red.
    pub fn next_phase(&self) -> LightState {
        match (self.control, self.manual_phase) {
            (ControlMode::Adaptive, _) => self.light_state.successor(),
            (ControlMode::Manual, Some(phase)) => phase,
            (ControlMode::Manual, None) if self.light_state == LightState::Yellow => {
                self.light_state.successor()
            }
            (ControlMode::Manual, None) => self.light_state,
        }
    }

    pub fn enter_phase(&mut self, phase: LightState, duration: u32, cycle_length: u32) {
        self.light_state = phase;
        self.time_remaining = duration;
        self.cycle_length = cycle_length;
    }
}
