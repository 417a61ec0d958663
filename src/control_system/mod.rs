// control_system/mod.rs
pub mod emergency;
pub mod intersection;
pub mod routes;
pub mod timing_policy;
pub mod traffic_light_controller;
