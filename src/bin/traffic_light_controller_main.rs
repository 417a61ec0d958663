use log::{error, info, warn};
use signal_control::monitoring::operator_console::run_console;
use signal_control::persistence::{
    restore_control_modes, restore_emergency_state, save_control_modes, save_emergency_state,
};
use signal_control::{run_update_loop, SignalConfig, TrafficLightController};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = SignalConfig::from_env().unwrap_or_else(|e| {
        warn!("Falling back to default config: {}", e);
        SignalConfig::default()
    });
    let mut controller = match TrafficLightController::initialize(&config) {
        Ok(controller) => controller,
        Err(e) => {
            error!("Controller error: {}", e);
            return;
        }
    };
    if let Some(path) = config.control_modes_path.as_deref().filter(|p| p.exists()) {
        if let Err(e) = restore_control_modes(&mut controller, path) {
            warn!("Could not restore control modes: {}", e);
        }
    }
    if let Some(path) = config.emergency_state_path.as_deref().filter(|p| p.exists()) {
        if let Err(e) = restore_emergency_state(&mut controller, path) {
            warn!("Could not restore emergency state: {}", e);
        }
    }

    println!("Starting traffic controller...");
    let controller = Arc::new(Mutex::new(controller));
    let (tx, rx) = mpsc::channel(32);

    let update_loop = tokio::spawn(run_update_loop(
        Arc::clone(&controller),
        rx,
        config.tick_period(),
        config.snapshot_csv.clone(),
    ));
    let console_controller = Arc::clone(&controller);
    let console = tokio::task::spawn_blocking(move || run_console(console_controller, tx));

    let (loop_result, console_result) = tokio::join!(update_loop, console);
    if let Err(e) = loop_result {
        error!("Update loop failed: {}", e);
    }
    if let Err(e) = console_result {
        error!("Console failed: {}", e);
    }

    let controller = controller.lock().await;
    if let Some(path) = &config.control_modes_path {
        if let Err(e) = save_control_modes(&controller, path) {
            error!("Could not save control modes: {}", e);
        }
    }
    if let Some(path) = &config.emergency_state_path {
        if let Err(e) = save_emergency_state(&controller, path) {
            error!("Could not save emergency state: {}", e);
        }
    }
    info!("Traffic controller stopped");
}
