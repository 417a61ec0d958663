use crate::control_system::emergency::{EmergencyVehicle, EmergencyVehicleKind};
use crate::control_system::intersection::{
    ControlMode, Intersection, IntersectionId, LightState, Telemetry,
};
use crate::control_system::routes::Route;

pub const HOSPITAL_ROUTE_A: &str = "Hospital Route A - Central to General Hospital";
pub const FIRE_STATION_ROUTE_B: &str = "Fire Station Route B - Downtown to Industrial";
pub const POLICE_ROUTE_C: &str = "Police Route C - Precinct to Highway Access";
pub const AMBULANCE_ROUTE_D: &str = "Ambulance Route D - Medical Center to Airport";

fn seed(
    id: u8,
    name: &str,
    light_state: LightState,
    time_remaining: u32,
    vehicles: u32,
    avg_speed: f64,
) -> Intersection {
    Intersection::new(
        IntersectionId(id),
        name,
        light_state,
        time_remaining,
        Telemetry {
            vehicles,
            avg_speed,
        },
    )
}

/// The downtown network: six signalised intersections.
/// Park & Oak and Downtown Hub start under operator control.
pub fn create_intersections() -> Vec<Intersection> {
    vec![
        seed(1, "Main & Broadway", LightState::Green, 35, 12, 35.0),
        seed(2, "Central & 5th", LightState::Red, 28, 28, 18.0),
        seed(3, "Park & Oak", LightState::Green, 42, 8, 40.0)
            .with_control(ControlMode::Manual, None),
        seed(4, "Market & Union", LightState::Red, 15, 45, 8.0),
        seed(5, "River & Pine", LightState::Yellow, 5, 15, 32.0),
        seed(6, "Downtown Hub", LightState::Green, 60, 34, 22.0)
            .with_control(ControlMode::Manual, None),
    ]
}

pub fn create_routes() -> Vec<Route> {
    vec![
        Route::new(
            HOSPITAL_ROUTE_A,
            vec![IntersectionId(1), IntersectionId(2), IntersectionId(6)],
        ),
        Route::new(
            FIRE_STATION_ROUTE_B,
            vec![IntersectionId(6), IntersectionId(4), IntersectionId(5)],
        ),
        Route::new(
            POLICE_ROUTE_C,
            vec![IntersectionId(3), IntersectionId(4), IntersectionId(1)],
        ),
        Route::new(
            AMBULANCE_ROUTE_D,
            vec![IntersectionId(5), IntersectionId(2), IntersectionId(3)],
        ),
    ]
}

fn vehicle(
    id: &str,
    kind: EmergencyVehicleKind,
    route_name: &str,
    priority: u8,
    eta_minutes: u32,
) -> EmergencyVehicle {
    EmergencyVehicle {
        id: id.to_string(),
        kind,
        route_name: route_name.to_string(),
        priority,
        eta_minutes,
    }
}

pub fn create_emergency_vehicles() -> Vec<EmergencyVehicle> {
    vec![
        vehicle("AMBULANCE-001", EmergencyVehicleKind::Ambulance, HOSPITAL_ROUTE_A, 1, 3),
        vehicle("FIRE-TRUCK-005", EmergencyVehicleKind::FireTruck, FIRE_STATION_ROUTE_B, 2, 7),
        vehicle("POLICE-003", EmergencyVehicleKind::Police, POLICE_ROUTE_C, 1, 5),
        vehicle("AMBULANCE-002", EmergencyVehicleKind::Ambulance, AMBULANCE_ROUTE_D, 1, 4),
    ]
}
