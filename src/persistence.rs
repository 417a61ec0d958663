use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use crate::control_system::intersection::{ControlMode, IntersectionId, LightState};
use crate::control_system::traffic_light_controller::TrafficLightController;
use crate::error::ControlError;

/// Operator selection for one intersection, as stored between restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlModeRecord {
    pub id: IntersectionId,
    pub mode: ControlMode,
    #[serde(default)]
    pub manual_phase: Option<LightState>,
}

impl ControlModeRecord {
    fn validate(&self, controller: &TrafficLightController) -> Result<(), ControlError> {
        if controller.intersection(self.id).is_none() {
            return Err(ControlError::UnknownIntersection(self.id));
        }
        if self.mode == ControlMode::Adaptive && self.manual_phase.is_some() {
            return Err(ControlError::InvalidRecord {
                id: self.id,
                reason: "manual phase set on an adaptive intersection".to_string(),
            });
        }
        Ok(())
    }
}

/// Emergency toggle as stored between restarts. Deactivation stores no route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmergencyRecord {
    pub active: bool,
    #[serde(default)]
    pub route: Option<String>,
}

/// Outcome of a restore: how many records were applied and why the rest were skipped.
#[derive(Debug, Default)]
pub struct RestoreReport {
    pub applied: usize,
    pub rejected: Vec<ControlError>,
}

pub fn control_mode_records(controller: &TrafficLightController) -> Vec<ControlModeRecord> {
    controller
        .intersections()
        .map(|intersection| ControlModeRecord {
            id: intersection.id,
            mode: intersection.control(),
            manual_phase: intersection.manual_phase(),
        })
        .collect()
}

pub fn save_control_modes(
    controller: &TrafficLightController,
    path: &Path,
) -> Result<(), ControlError> {
    let records = control_mode_records(controller);
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &records)?;
    info!("Saved {} control-mode records to {:?}", records.len(), path);
    Ok(())
}

/// Validates every record before applying it. A bad record is skipped, not fatal.
pub fn restore_control_modes(
    controller: &mut TrafficLightController,
    path: &Path,
) -> Result<RestoreReport, ControlError> {
    let raw = fs::read_to_string(path)?;
    let records: Vec<ControlModeRecord> = serde_json::from_str(&raw)?;
    let mut report = RestoreReport::default();

    for record in records {
        let applied = record.validate(controller).and_then(|()| {
            controller.set_control_mode(record.id, record.mode, record.manual_phase)
        });
        match applied {
            Ok(()) => report.applied += 1,
            Err(e) => {
                warn!("Skipping stored control mode: {}", e);
                report.rejected.push(e);
            }
        }
    }
    info!(
        "Restored {} control-mode records ({} rejected)",
        report.applied,
        report.rejected.len()
    );
    Ok(report)
}

pub fn emergency_record(controller: &TrafficLightController) -> EmergencyRecord {
    let state = controller.emergency_state();
    EmergencyRecord {
        active: state.is_active(),
        route: state.selected_route().map(str::to_string),
    }
}

pub fn save_emergency_state(
    controller: &TrafficLightController,
    path: &Path,
) -> Result<(), ControlError> {
    let record = emergency_record(controller);
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &record)?;
    info!(
        "Saved emergency state (active: {}, route: {:?}) to {:?}",
        record.active, record.route, path
    );
    Ok(())
}

/// Replays the stored toggle through the controller. A stored route that no longer exists
/// still activates emergency mode without priority intersections, and is reported as rejected.
pub fn restore_emergency_state(
    controller: &mut TrafficLightController,
    path: &Path,
) -> Result<RestoreReport, ControlError> {
    let raw = fs::read_to_string(path)?;
    let record: EmergencyRecord = serde_json::from_str(&raw)?;
    let mut report = RestoreReport::default();
    match controller.set_emergency(record.active, record.route.as_deref()) {
        Ok(()) => report.applied += 1,
        Err(e) => {
            warn!("Stored emergency route not restored: {}", e);
            report.rejected.push(e);
        }
    }
    Ok(report)
}
