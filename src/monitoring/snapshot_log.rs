use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;

use crate::control_system::intersection::{ControlMode, LightState, TrafficStatus};
use crate::error::ControlError;
use crate::shared_data::{current_timestamp, IntersectionView};

/// One CSV row per intersection per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub timestamp: u64,
    pub tick: u64,
    pub intersection: String,
    pub phase: LightState,
    pub time_remaining: u32,
    pub vehicles: u32,
    pub avg_speed: f64,
    pub status: TrafficStatus,
    pub control_mode: ControlMode,
    pub cycle_length: u32,
    pub priority: bool,
}

impl SnapshotRecord {
    pub fn new(timestamp: u64, tick: u64, view: &IntersectionView) -> Self {
        Self {
            timestamp,
            tick,
            intersection: view.id.to_string(),
            phase: view.phase,
            time_remaining: view.time_remaining,
            vehicles: view.vehicles,
            avg_speed: view.avg_speed,
            status: view.status,
            control_mode: view.control_mode,
            cycle_length: view.cycle_length,
            priority: view.priority,
        }
    }
}

// Appends to the file, writing the header only when the file is new.
fn log_to_csv<T: Serialize>(path: &Path, records: &[T]) -> Result<(), ControlError> {
    let file_exists = path.exists();
    let file = OpenOptions::new().append(true).create(true).open(path)?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn log_snapshot(path: &Path, tick: u64, views: &[IntersectionView]) -> Result<(), ControlError> {
    let timestamp = current_timestamp();
    let records: Vec<SnapshotRecord> = views
        .iter()
        .map(|view| SnapshotRecord::new(timestamp, tick, view))
        .collect();
    log_to_csv(path, &records)
}

pub fn read_snapshots(path: &Path) -> Result<Vec<SnapshotRecord>, ControlError> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        records.push(result?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_system::intersection::IntersectionId;
    use std::fs;

    fn view(id: u8) -> IntersectionView {
        IntersectionView {
            id: IntersectionId(id),
            name: format!("Junction {}", id),
            phase: LightState::Red,
            time_remaining: 12,
            vehicles: 30,
            avg_speed: 18.5,
            status: TrafficStatus::Congested,
            control_mode: ControlMode::Adaptive,
            manual_phase: None,
            cycle_length: 90,
            priority: id == 2,
        }
    }

    #[test]
    fn appends_rows_with_a_single_header() {
        let path = std::env::temp_dir().join(format!(
            "signal_control_snapshot_{}.csv",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);

        log_snapshot(&path, 1, &[view(1), view(2)]).expect("first write");
        log_snapshot(&path, 2, &[view(1)]).expect("second write");

        let records = read_snapshots(&path).expect("read back");
        let _ = fs::remove_file(&path);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].intersection, "Traffic Light 1");
        assert!(records[1].priority);
        assert_eq!(records[2].tick, 2);
        assert_eq!(records[2].status, TrafficStatus::Congested);
    }
}
