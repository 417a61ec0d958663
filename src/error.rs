use thiserror::Error;

use crate::control_system::intersection::{IntersectionId, LightState};

/// Errors reported by the signal controller. None of them stop the tick loop.
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("unknown emergency route '{0}'")]
    UnknownRoute(String),

    #[error("unknown intersection {0}")]
    UnknownIntersection(IntersectionId),

    #[error("invalid telemetry for {id}: vehicles={vehicles}, avg_speed={avg_speed}")]
    InvalidTelemetry {
        id: IntersectionId,
        vehicles: i64,
        avg_speed: f64,
    },

    #[error("{id} cannot be held in {phase} by an operator")]
    InvalidManualPhase { id: IntersectionId, phase: LightState },

    #[error("invalid route definition: {0}")]
    InvalidRoute(String),

    #[error("invalid control-mode record for {id}: {reason}")]
    InvalidRecord { id: IntersectionId, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
