use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::control_system::intersection::{IntersectionId, LightState};
use crate::control_system::routes::RouteRegistry;
use crate::control_system::timing_policy::PhaseTiming;
use crate::global_variables::{
    EMERGENCY_MIN_SECONDS, PRIORITY_CYCLE, PRIORITY_GREEN_SECONDS, PRIORITY_RED_SECONDS,
};

/// Process-wide emergency configuration. Replaced as a whole on every toggle, never mutated,
/// so a tick always sees `active`, the route and its priority set from the same toggle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmergencyState {
    active: bool,
    selected_route: Option<String>,
    priority: BTreeSet<IntersectionId>,
}

impl EmergencyState {
    pub fn inactive() -> Self {
        Self::default()
    }

    /// Activates emergency mode. A missing, blank or unknown route leaves the priority set empty.
    pub fn activate(registry: &RouteRegistry, route: Option<&str>) -> Self {
        let selected_route = route
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        let priority = selected_route
            .as_deref()
            .map(|name| registry.intersections_for(name).iter().copied().collect())
            .unwrap_or_default();
        Self {
            active: true,
            selected_route,
            priority,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn selected_route(&self) -> Option<&str> {
        self.selected_route.as_deref()
    }

    pub fn is_priority(&self, id: IntersectionId) -> bool {
        self.active && self.priority.contains(&id)
    }

    pub fn priority_intersections(&self) -> impl Iterator<Item = IntersectionId> + '_ {
        self.priority.iter().copied()
    }

    /// Applied last, on top of whatever the governing policy produced.
    /// Yellow keeps its fixed duration; only the advisory cycle is compressed.
    pub fn apply(
        &self,
        id: IntersectionId,
        entering: LightState,
        timing: PhaseTiming,
    ) -> PhaseTiming {
        if !self.active {
            return timing;
        }
        if self.priority.contains(&id) {
            let duration = match entering {
                LightState::Red => PRIORITY_RED_SECONDS,
                LightState::Green => PRIORITY_GREEN_SECONDS,
                LightState::Yellow => timing.duration,
            };
            return PhaseTiming {
                duration,
                cycle_length: PRIORITY_CYCLE,
            };
        }
        let duration = match entering {
            LightState::Yellow => timing.duration,
            LightState::Red | LightState::Green => compress(timing.duration),
        };
        PhaseTiming {
            duration,
            cycle_length: compress(timing.cycle_length),
        }
    }
}

fn compress(seconds: u32) -> u32 {
    (seconds / 2).max(EMERGENCY_MIN_SECONDS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmergencyVehicleKind {
    Ambulance,
    FireTruck,
    Police,
}

impl fmt::Display for EmergencyVehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EmergencyVehicleKind::Ambulance => write!(f, "Ambulance"),
            EmergencyVehicleKind::FireTruck => write!(f, "Fire Truck"),
            EmergencyVehicleKind::Police => write!(f, "Police"),
        }
    }
}

/// Vehicle dispatched along a route. Informational only, it does not affect timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyVehicle {
    pub id: String,
    pub kind: EmergencyVehicleKind,
    pub route_name: String,
    pub priority: u8,
    pub eta_minutes: u32,
}
