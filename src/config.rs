use log::info;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ControlError;
use crate::global_variables::{CONFIG_ENV_VAR, DEFAULT_HISTORY_CAPACITY, DEFAULT_TICK_MILLIS};

/// Runtime settings. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Wall-clock length of one simulated second.
    pub tick_millis: u64,
    /// Samples kept per intersection for trend display.
    pub history_capacity: usize,
    /// Seed for the random telemetry feed; entropy when absent.
    pub telemetry_seed: Option<u64>,
    /// Append every tick's snapshot to this CSV file.
    pub snapshot_csv: Option<PathBuf>,
    /// Where operator control-mode selections are saved and restored.
    pub control_modes_path: Option<PathBuf>,
    /// Where the emergency toggle and its route are saved and restored.
    pub emergency_state_path: Option<PathBuf>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            tick_millis: DEFAULT_TICK_MILLIS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            telemetry_seed: None,
            snapshot_csv: None,
            control_modes_path: None,
            emergency_state_path: None,
        }
    }
}

impl SignalConfig {
    pub fn from_file(path: &Path) -> Result<Self, ControlError> {
        let raw = fs::read_to_string(path)?;
        let config: SignalConfig = serde_json::from_str(&raw)?;
        Ok(config.normalized())
    }

    /// Loads the file named by `SIGNAL_CONFIG`, or the defaults when it is unset.
    pub fn from_env() -> Result<Self, ControlError> {
        match env::var_os(CONFIG_ENV_VAR) {
            Some(path) => {
                info!("Loading signal config from {:?}", path);
                Self::from_file(Path::new(&path))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    fn normalized(mut self) -> Self {
        self.tick_millis = self.tick_millis.max(1);
        self.history_capacity = self.history_capacity.max(1);
        self
    }
}
