//! Signal control for a small downtown network: per-intersection phase state machines,
//! adaptive and manual timing, and route-based emergency priority.

pub mod config;
pub mod control_system;
pub mod error;
pub mod global_variables;
pub mod monitoring;
pub mod persistence;
pub mod shared_data;
pub mod simulation_engine;

pub use config::SignalConfig;
pub use control_system::intersection::{
    ControlMode, Intersection, IntersectionId, LightState, Telemetry, TrafficStatus,
};
pub use control_system::traffic_light_controller::{
    run_update_loop, ControlCommand, TrafficLightController,
};
pub use error::ControlError;
pub use shared_data::IntersectionView;
