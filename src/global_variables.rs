// Configuration
pub const CONFIG_ENV_VAR: &str = "SIGNAL_CONFIG";
pub const DEFAULT_TICK_MILLIS: u64 = 1000;
pub const DEFAULT_HISTORY_CAPACITY: usize = 60;

// Status classification thresholds
pub const CRITICAL_VEHICLES: u32 = 40;
pub const CRITICAL_SPEED: f64 = 10.0;
pub const CONGESTED_VEHICLES: u32 = 25;
pub const CONGESTED_SPEED: f64 = 20.0;

// Phase durations (seconds)
pub const YELLOW_SECONDS: u32 = 5;
pub const ADAPTIVE_RED_MIN: u32 = 20;
pub const ADAPTIVE_RED_MAX: u32 = 60;
pub const ADAPTIVE_RED_FACTOR: f64 = 1.5;
pub const ADAPTIVE_GREEN_MIN: u32 = 30;
pub const ADAPTIVE_GREEN_MAX: u32 = 90;
pub const ADAPTIVE_GREEN_FACTOR: f64 = 2.0;
pub const MANUAL_PHASE_SECONDS: u32 = 60;

// Advisory cycle lengths (seconds)
pub const CYCLE_OPTIMAL: u32 = 60;
pub const CYCLE_CONGESTED: u32 = 90;
pub const CYCLE_CRITICAL: u32 = 120;
pub const CYCLE_MANUAL: u32 = 2 * MANUAL_PHASE_SECONDS;

// Emergency override (seconds)
pub const EMERGENCY_MIN_SECONDS: u32 = 10;
pub const PRIORITY_RED_SECONDS: u32 = 10;
pub const PRIORITY_GREEN_SECONDS: u32 = 45;
pub const PRIORITY_CYCLE: u32 = PRIORITY_RED_SECONDS + YELLOW_SECONDS + PRIORITY_GREEN_SECONDS;
