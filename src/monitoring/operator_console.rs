use std::io::{stdin, stdout, BufRead, Write};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use crate::control_system::intersection::{ControlMode, IntersectionId, LightState};
use crate::control_system::traffic_light_controller::{ControlCommand, TrafficLightController};

/// A parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleAction {
    Status,
    Routes,
    Send(ControlCommand),
    Help,
}

// Amber is never an operator phase; it only appears between green and red.
fn parse_phase(word: &str) -> Result<LightState, String> {
    match word.to_ascii_lowercase().as_str() {
        "green" => Ok(LightState::Green),
        "red" => Ok(LightState::Red),
        "yellow" => Err("yellow cannot be held; choose green or red".to_string()),
        other => Err(format!("unknown phase '{}'", other)),
    }
}

/// Parses one operator command:
/// `status`, `routes`, `mode <id> adaptive`, `mode <id> manual [phase]`,
/// `emergency on [route name]`, `emergency off`, `quit`.
pub fn parse_command(line: &str) -> Result<ConsoleAction, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] | ["help"] => Ok(ConsoleAction::Help),
        ["status"] => Ok(ConsoleAction::Status),
        ["routes"] => Ok(ConsoleAction::Routes),
        ["quit"] | ["exit"] => Ok(ConsoleAction::Send(ControlCommand::Shutdown)),
        ["mode", id, mode, rest @ ..] => {
            let id = id
                .parse::<u8>()
                .map(IntersectionId)
                .map_err(|_| format!("invalid intersection id '{}'", id))?;
            let (mode, manual_phase) = match (*mode, rest) {
                ("adaptive", []) => (ControlMode::Adaptive, None),
                ("manual", []) => (ControlMode::Manual, None),
                ("manual", [phase]) => (ControlMode::Manual, Some(parse_phase(phase)?)),
                _ => {
                    return Err("usage: mode <id> adaptive | mode <id> manual [phase]".to_string())
                }
            };
            Ok(ConsoleAction::Send(ControlCommand::SetControlMode {
                id,
                mode,
                manual_phase,
            }))
        }
        ["emergency", "off"] => Ok(ConsoleAction::Send(ControlCommand::SetEmergency {
            active: false,
            route: None,
        })),
        ["emergency", "on", route @ ..] => {
            let route = if route.is_empty() {
                None
            } else {
                Some(route.join(" "))
            };
            Ok(ConsoleAction::Send(ControlCommand::SetEmergency {
                active: true,
                route,
            }))
        }
        _ => Err(format!("unrecognised command '{}'", line.trim())),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  status                      show every intersection");
    println!("  routes                      list emergency routes");
    println!("  mode <id> adaptive          return an intersection to adaptive timing");
    println!("  mode <id> manual [phase]    operator control, optional green|red");
    println!("  emergency on [route name]   activate emergency priority");
    println!("  emergency off               deactivate emergency priority");
    println!("  quit                        stop the controller");
}

fn print_status(controller: &TrafficLightController) {
    let emergency = controller.emergency_state();
    if emergency.is_active() {
        println!(
            "EMERGENCY MODE ACTIVE (route: {})",
            emergency.selected_route().unwrap_or("none")
        );
        if let Some(vehicle) = controller.dispatched_vehicle() {
            println!(
                "  {} {} priority {} ETA {} min",
                vehicle.kind, vehicle.id, vehicle.priority, vehicle.eta_minutes
            );
        }
    }
    let history = controller.history();
    for view in controller.snapshot() {
        println!(
            "{:<16} {:<22} {:>6} {:>3}s  vehicles {:>3} (avg {:>5.1})  speed {:>5.1}  {:?}/{:?} cycle {}s{}",
            view.id.to_string(),
            view.name,
            view.phase.to_string(),
            view.time_remaining,
            view.vehicles,
            history.average_vehicles_for(view.id),
            view.avg_speed,
            view.status,
            view.control_mode,
            view.cycle_length,
            if view.priority { "  PRIORITY" } else { "" }
        );
    }
}

/// Blocking console loop; run it on `spawn_blocking`. Returns once `quit` is sent or stdin closes.
pub fn run_console(
    controller: Arc<Mutex<TrafficLightController>>,
    commands: mpsc::Sender<ControlCommand>,
) {
    print_help();
    let stdin = stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        let _ = stdout().flush();
        let line = match lines.next() {
            Some(Ok(line)) => line,
            _ => {
                let _ = commands.blocking_send(ControlCommand::Shutdown);
                break;
            }
        };
        match parse_command(&line) {
            Ok(ConsoleAction::Help) => print_help(),
            Ok(ConsoleAction::Status) => print_status(&controller.blocking_lock()),
            Ok(ConsoleAction::Routes) => {
                for route in controller.blocking_lock().routes().routes() {
                    let stops: Vec<String> =
                        route.intersections.iter().map(|id| id.to_string()).collect();
                    println!("{}: {}", route.name, stops.join(" -> "));
                }
            }
            Ok(ConsoleAction::Send(command)) => {
                let stop = command == ControlCommand::Shutdown;
                if commands.blocking_send(command).is_err() || stop {
                    break;
                }
            }
            Err(e) => eprintln!("{}", e),
        }
    }
}
