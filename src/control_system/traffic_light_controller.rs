use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval, MissedTickBehavior};

use crate::config::SignalConfig;
use crate::control_system::emergency::{EmergencyState, EmergencyVehicle};
use crate::control_system::intersection::{ControlMode, Intersection, IntersectionId, LightState};
use crate::control_system::routes::RouteRegistry;
use crate::control_system::timing_policy::policy_for;
use crate::error::ControlError;
use crate::monitoring::history::TrendHistory;
use crate::monitoring::snapshot_log::log_snapshot;
use crate::shared_data::IntersectionView;
use crate::simulation_engine::intersections::{
    create_emergency_vehicles, create_intersections, create_routes,
};
use crate::simulation_engine::telemetry::{RandomTelemetry, TelemetryProvider};

/// External events delivered to the update loop between ticks.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    SetControlMode {
        id: IntersectionId,
        mode: ControlMode,
        manual_phase: Option<LightState>,
    },
    SetEmergency {
        active: bool,
        route: Option<String>,
    },
    Shutdown,
}

pub struct TrafficLightController {
    intersections: BTreeMap<IntersectionId, Intersection>,
    routes: RouteRegistry,
    vehicles: Vec<EmergencyVehicle>,
    emergency: Arc<EmergencyState>,
    telemetry: Box<dyn TelemetryProvider>,
    history: TrendHistory,
    ticks: u64,
    invalid_readings: u64,
}

impl TrafficLightController {
    pub fn new(
        intersections: Vec<Intersection>,
        routes: RouteRegistry,
        telemetry: Box<dyn TelemetryProvider>,
    ) -> Self {
        let intersections = intersections
            .into_iter()
            .map(|intersection| (intersection.id, intersection))
            .collect();
        Self {
            intersections,
            routes,
            vehicles: Vec::new(),
            emergency: Arc::new(EmergencyState::inactive()),
            telemetry,
            history: TrendHistory::new(crate::global_variables::DEFAULT_HISTORY_CAPACITY),
            ticks: 0,
            invalid_readings: 0,
        }
    }

    /// Builds the seeded downtown network fed by random telemetry.
    pub fn initialize(config: &SignalConfig) -> Result<Self, ControlError> {
        let routes = RouteRegistry::new(create_routes())?;
        let telemetry = match config.telemetry_seed {
            Some(seed) => RandomTelemetry::seeded(seed),
            None => RandomTelemetry::new(),
        };
        let controller = Self::new(create_intersections(), routes, Box::new(telemetry))
            .with_history_capacity(config.history_capacity)
            .with_emergency_vehicles(create_emergency_vehicles());
        info!(
            "Controller initialised with {} intersections and {} routes",
            controller.intersections.len(),
            controller.routes.routes().len()
        );
        Ok(controller)
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history.set_capacity(capacity);
        self
    }

    pub fn with_emergency_vehicles(mut self, vehicles: Vec<EmergencyVehicle>) -> Self {
        self.vehicles = vehicles;
        self
    }

    /// Advances every intersection by one simulated second.
    /// The emergency state is captured once so the whole network sees the same value.
    pub fn tick(&mut self) {
        let emergency = Arc::clone(&self.emergency);
        for intersection in self.intersections.values_mut() {
            let raw = self
                .telemetry
                .sample(intersection.id, intersection.telemetry());
            if let Err(e) = raw.validate(intersection.id) {
                warn!("{}; clamping to zero", e);
                self.invalid_readings += 1;
            }
            intersection.apply_telemetry(raw.clamped());
            self.history.record(intersection.id, intersection.telemetry());

            if intersection.countdown() {
                Self::transition(intersection, &emergency);
            }
        }
        self.ticks += 1;
    }

    // Governing policy first, emergency override last.
    fn transition(intersection: &mut Intersection, emergency: &EmergencyState) {
        let from = intersection.light_state();
        let entering = intersection.next_phase();
        let timing = policy_for(intersection.control()).phase_timing(intersection, entering);
        let timing = emergency.apply(intersection.id, entering, timing);
        intersection.enter_phase(entering, timing.duration, timing.cycle_length);
        debug!(
            "{} {} -> {} for {}s (cycle {}s, {:?}, {:?})",
            intersection.id,
            from,
            entering,
            timing.duration,
            timing.cycle_length,
            intersection.control(),
            intersection.status()
        );
    }

    /// Operator console entry point. Unknown ids and an operator-selected Yellow leave every
    /// intersection untouched.
    pub fn set_control_mode(
        &mut self,
        id: IntersectionId,
        mode: ControlMode,
        manual_phase: Option<LightState>,
    ) -> Result<(), ControlError> {
        let intersection = self
            .intersections
            .get_mut(&id)
            .ok_or(ControlError::UnknownIntersection(id))?;
        if mode == ControlMode::Manual && manual_phase == Some(LightState::Yellow) {
            return Err(ControlError::InvalidManualPhase {
                id,
                phase: LightState::Yellow,
            });
        }
        intersection.set_control(mode, manual_phase);
        info!(
            "{} switched to {:?} (manual phase {:?})",
            id,
            mode,
            intersection.manual_phase()
        );
        Ok(())
    }

    /// Swaps in a new emergency state. Takes effect at each intersection's next transition;
    /// phases already in flight run out.
    ///
    /// An unknown route still activates emergency mode, without priority intersections,
    /// and is reported back as `UnknownRoute`.
    pub fn set_emergency(&mut self, active: bool, route: Option<&str>) -> Result<(), ControlError> {
        if !active {
            if self.emergency.is_active() {
                info!("Emergency mode deactivated");
            }
            self.emergency = Arc::new(EmergencyState::inactive());
            return Ok(());
        }

        let state = EmergencyState::activate(&self.routes, route);
        let unknown = state
            .selected_route()
            .filter(|name| !self.routes.contains(name))
            .map(str::to_string);
        self.emergency = Arc::new(state);

        match unknown {
            Some(name) => {
                warn!("Emergency route '{}' not found; no priority intersections", name);
                Err(ControlError::UnknownRoute(name))
            }
            None => {
                info!(
                    "Emergency mode active (route: {})",
                    self.emergency.selected_route().unwrap_or("none")
                );
                Ok(())
            }
        }
    }

    pub fn apply_command(&mut self, command: ControlCommand) -> Result<(), ControlError> {
        match command {
            ControlCommand::SetControlMode {
                id,
                mode,
                manual_phase,
            } => self.set_control_mode(id, mode, manual_phase),
            ControlCommand::SetEmergency { active, route } => {
                self.set_emergency(active, route.as_deref())
            }
            ControlCommand::Shutdown => Ok(()),
        }
    }

    pub fn snapshot(&self) -> Vec<IntersectionView> {
        self.intersections
            .values()
            .map(|intersection| {
                IntersectionView::from_intersection(
                    intersection,
                    self.emergency.is_priority(intersection.id),
                )
            })
            .collect()
    }

    pub fn intersection(&self, id: IntersectionId) -> Option<&Intersection> {
        self.intersections.get(&id)
    }

    pub fn intersections(&self) -> impl Iterator<Item = &Intersection> {
        self.intersections.values()
    }

    pub fn emergency_state(&self) -> Arc<EmergencyState> {
        Arc::clone(&self.emergency)
    }

    pub fn routes(&self) -> &RouteRegistry {
        &self.routes
    }

    /// Vehicle dispatched on the selected emergency route, if any.
    pub fn dispatched_vehicle(&self) -> Option<&EmergencyVehicle> {
        let route = self.emergency.selected_route()?;
        self.vehicles
            .iter()
            .find(|vehicle| vehicle.route_name == route)
    }

    pub fn history(&self) -> &TrendHistory {
        &self.history
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn invalid_readings(&self) -> u64 {
        self.invalid_readings
    }
}

/// Drives `tick()` at a fixed period and applies commands between ticks.
/// Intended to be spawned as a tokio task; returns on `Shutdown` or when every sender is gone.
pub async fn run_update_loop(
    controller: Arc<Mutex<TrafficLightController>>,
    mut commands: mpsc::Receiver<ControlCommand>,
    tick_period: Duration,
    snapshot_csv: Option<PathBuf>,
) {
    let mut ticker = interval(tick_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let snapshot = {
                    let mut ctrl = controller.lock().await;
                    ctrl.tick();
                    snapshot_csv.as_ref().map(|_| (ctrl.ticks(), ctrl.snapshot()))
                };
                // The file write happens off the runtime, with the controller unlocked.
                if let (Some(path), Some((tick, views))) = (snapshot_csv.clone(), snapshot) {
                    let written =
                        tokio::task::spawn_blocking(move || log_snapshot(&path, tick, &views)).await;
                    match written {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => warn!("Failed to log snapshot: {}", e),
                        Err(e) => warn!("Snapshot writer failed: {}", e),
                    }
                }
            }
            command = commands.recv() => {
                match command {
                    Some(ControlCommand::Shutdown) | None => {
                        info!("Update loop stopping");
                        break;
                    }
                    Some(command) => {
                        let mut ctrl = controller.lock().await;
                        if let Err(e) = ctrl.apply_command(command) {
                            warn!("Command rejected: {}", e);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_system::intersection::Telemetry;
    use crate::control_system::routes::Route;
    use crate::simulation_engine::telemetry::{RawTelemetry, ScriptedTelemetry};

    fn single(light_state: LightState, time_remaining: u32, vehicles: u32) -> TrafficLightController {
        let intersection = Intersection::new(
            IntersectionId(1),
            "Main & Broadway",
            light_state,
            time_remaining,
            Telemetry {
                vehicles,
                avg_speed: 35.0,
            },
        );
        let routes = RouteRegistry::new(vec![Route::new("R", vec![IntersectionId(1)])])
            .expect("valid routes");
        TrafficLightController::new(vec![intersection], routes, Box::new(ScriptedTelemetry::new()))
    }

    fn phase(ctrl: &TrafficLightController) -> (LightState, u32) {
        let intersection = ctrl.intersection(IntersectionId(1)).expect("seeded");
        (intersection.light_state(), intersection.time_remaining())
    }

    #[test]
    fn countdown_then_transition() {
        let mut ctrl = single(LightState::Green, 2, 20);
        ctrl.tick();
        assert_eq!(phase(&ctrl), (LightState::Green, 1));
        ctrl.tick();
        assert_eq!(phase(&ctrl), (LightState::Yellow, 5));
        assert_eq!(ctrl.ticks(), 2);
    }

    #[test]
    fn full_adaptive_cycle() {
        let mut ctrl = single(LightState::Yellow, 1, 20);
        ctrl.tick();
        assert_eq!(phase(&ctrl), (LightState::Red, 30));
        for _ in 0..30 {
            ctrl.tick();
        }
        assert_eq!(phase(&ctrl), (LightState::Green, 40));
    }

    #[test]
    fn invalid_telemetry_is_clamped_and_counted() {
        let intersection = Intersection::new(
            IntersectionId(7),
            "x",
            LightState::Red,
            10,
            Telemetry::default(),
        );
        let feed = ScriptedTelemetry::new()
            .with_sequence(IntersectionId(7), [RawTelemetry::new(-3, -1.0)]);
        let mut ctrl =
            TrafficLightController::new(vec![intersection], RouteRegistry::default(), Box::new(feed));
        ctrl.tick();
        let view = &ctrl.snapshot()[0];
        assert_eq!(view.vehicles, 0);
        assert_eq!(view.avg_speed, 0.0);
        assert_eq!(ctrl.invalid_readings(), 1);
        assert_eq!(view.time_remaining, 9);
    }

    #[test]
    fn unknown_intersection_is_reported() {
        let mut ctrl = single(LightState::Green, 5, 10);
        let result = ctrl.set_control_mode(IntersectionId(9), ControlMode::Manual, None);
        assert!(matches!(result, Err(ControlError::UnknownIntersection(IntersectionId(9)))));
        assert_eq!(
            ctrl.intersection(IntersectionId(1)).map(Intersection::control),
            Some(ControlMode::Adaptive)
        );
    }

    #[test]
    fn deactivation_clears_route() {
        let mut ctrl = single(LightState::Green, 5, 10);
        ctrl.set_emergency(true, Some("R")).expect("known route");
        assert!(ctrl.snapshot()[0].priority);
        ctrl.set_emergency(false, Some("R")).expect("deactivate");
        let state = ctrl.emergency_state();
        assert!(!state.is_active());
        assert_eq!(state.selected_route(), None);
        assert!(!ctrl.snapshot()[0].priority);
    }

    #[test]
    fn operator_cannot_hold_amber() {
        let mut ctrl = single(LightState::Green, 5, 10);
        let result =
            ctrl.set_control_mode(IntersectionId(1), ControlMode::Manual, Some(LightState::Yellow));
        assert!(matches!(
            result,
            Err(ControlError::InvalidManualPhase {
                id: IntersectionId(1),
                phase: LightState::Yellow,
            })
        ));
        assert_eq!(
            ctrl.intersection(IntersectionId(1)).map(Intersection::control),
            Some(ControlMode::Adaptive)
        );
    }

    #[test]
    fn runtime_mode_switch_reports_the_manual_cycle_at_once() {
        let mut ctrl = single(LightState::Green, 30, 10);
        assert_eq!(ctrl.snapshot()[0].cycle_length, 60);
        ctrl.set_control_mode(IntersectionId(1), ControlMode::Manual, None)
            .expect("known id");
        let view = &ctrl.snapshot()[0];
        assert_eq!(view.cycle_length, 120);
        assert_eq!(view.time_remaining, 30);
    }

    #[test]
    fn shutdown_command_is_a_noop_for_the_controller() {
        let mut ctrl = single(LightState::Green, 5, 10);
        assert!(ctrl.apply_command(ControlCommand::Shutdown).is_ok());
    }
}
