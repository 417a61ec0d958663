pub mod history;
pub mod operator_console;
pub mod snapshot_log;
