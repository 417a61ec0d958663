// src/shared_data.rs

use crate::control_system::intersection::{
    ControlMode, Intersection, IntersectionId, LightState, TrafficStatus,
};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Read-only projection of one intersection, handed to displays and loggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectionView {
    pub id: IntersectionId,
    pub name: String,
    pub phase: LightState,
    pub time_remaining: u32,
    pub vehicles: u32,
    pub avg_speed: f64,
    pub status: TrafficStatus,
    pub control_mode: ControlMode,
    pub manual_phase: Option<LightState>,
    pub cycle_length: u32,
    /// True while the intersection lies on the active emergency route.
    pub priority: bool,
}

impl IntersectionView {
    pub fn from_intersection(intersection: &Intersection, priority: bool) -> Self {
        let telemetry = intersection.telemetry();
        Self {
            id: intersection.id,
            name: intersection.name.clone(),
            phase: intersection.light_state(),
            time_remaining: intersection.time_remaining(),
            vehicles: telemetry.vehicles,
            avg_speed: telemetry.avg_speed,
            status: intersection.status(),
            control_mode: intersection.control(),
            manual_phase: intersection.manual_phase(),
            cycle_length: intersection.cycle_length(),
            priority,
        }
    }
}

/// Seconds since the Unix epoch; zero if the clock is before it.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}
