//! ## Startup helpers
//!
//! - [parse_args]: reads `key::value` command line arguments into [LaunchOptions] and
//!   switches the print toggles in [config].
//! - [build_monitors] / [sim_elevators]: the initial set of elevators.

use std::env;

use crate::config;
use crate::model::{ElevatorState, ElevatorTiming};
use crate::monitor::ElevatorMonitor;
use crate::print;
use crate::simulator::SimElevator;

/// What the binary should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Dispatcher with a TCP listener, actuators connect from elsewhere.
    Server,
    /// Dispatcher and simulated building in one process.
    Sim,
    /// Simulated building connecting to a dispatcher at the given address.
    Actuators(String),
}

/// Options collected from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    #[allow(missing_docs)]
    pub mode: Mode,
    /// Number of elevators, named `Elevator-A`, `Elevator-B`, ...
    pub num_elevators: u8,
    /// Number of floors, numbered from 0.
    pub num_floors: u8,
    /// Address the dispatcher listens on in [Mode::Server].
    pub listen_addr: String,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Server,
            num_elevators: config::DEFAULT_NUM_ELEVATORS,
            num_floors: config::DEFAULT_NUM_FLOORS,
            listen_addr: config::LISTEN_ADDR.to_string(),
        }
    }
}

fn set_toggle(toggle: &std::sync::Mutex<bool>, on: bool) {
    if let Ok(mut value) = toggle.lock() {
        *value = on;
    }
}

/// Reads the program arguments, see [parse_arg_list].
pub fn parse_args() -> LaunchOptions {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_arg_list(&args)
}

/// Parses `args` (without the program name).
///
/// ## Arguments
/// `print_status::true/false` &rarr; Status table after every event
/// `print_json::true/false` &rarr; Status as JSON after every event
/// `print_err::true/false` &rarr; Error messages
/// `print_warn::true/false` &rarr; Warnings
/// `print_ok::true/false` &rarr; Success messages
/// `print_info::true/false` &rarr; Info messages
/// `print_else::true/false` &rarr; Dispatcher decisions and simulator chatter
/// `debug` &rarr; Only error messages are shown
/// `sim` &rarr; Run dispatcher and simulated building in one process
/// `actuators::<addr>` &rarr; Run the simulated building against a remote dispatcher
/// `actuators` &rarr; Same, against [config::DEFAULT_DISPATCHER_ADDR]
/// `elevators::<n>` &rarr; Number of elevators
/// `floors::<n>` &rarr; Number of floors
/// `listen::<addr>` &rarr; Listen address of the dispatcher
/// `help` &rarr; Displays all possible arguments without starting the program
pub fn parse_arg_list(args: &[String]) -> LaunchOptions {
    let mut options = LaunchOptions::default();

    for arg in args {
        let parts: Vec<&str> = arg.splitn(2, "::").collect();
        if parts.len() == 2 {
            let key = parts[0].to_lowercase();
            let value = parts[1];
            let is_true = value.to_lowercase() == "true";

            match key.as_str() {
                "print_status" => set_toggle(&config::PRINT_STATUS_ON, is_true),
                "print_json" => set_toggle(&config::PRINT_STATUS_JSON_ON, is_true),
                "print_err" => set_toggle(&config::PRINT_ERR_ON, is_true),
                "print_warn" => set_toggle(&config::PRINT_WARN_ON, is_true),
                "print_ok" => set_toggle(&config::PRINT_OK_ON, is_true),
                "print_info" => set_toggle(&config::PRINT_INFO_ON, is_true),
                "print_else" => set_toggle(&config::PRINT_ELSE_ON, is_true),
                "actuators" => options.mode = Mode::Actuators(value.to_string()),
                "listen" => options.listen_addr = value.to_string(),
                "elevators" => match value.parse::<u8>() {
                    Ok(n) if (1..=26).contains(&n) => options.num_elevators = n,
                    _ => print::warn(format!("Invalid number of elevators: {}", value)),
                },
                "floors" => match value.parse::<u8>() {
                    Ok(n) if n >= 2 => options.num_floors = n,
                    _ => print::warn(format!("Invalid number of floors: {}", value)),
                },
                _ => print::warn(format!("Unknown argument: {}", arg)),
            }
        } else {
            match arg.to_lowercase().as_str() {
                "sim" => options.mode = Mode::Sim,
                "actuators" => options.mode = Mode::Actuators(config::DEFAULT_DISPATCHER_ADDR.to_string()),
                "debug" => {
                    set_toggle(&config::PRINT_STATUS_ON, false);
                    set_toggle(&config::PRINT_STATUS_JSON_ON, false);
                    set_toggle(&config::PRINT_WARN_ON, false);
                    set_toggle(&config::PRINT_OK_ON, false);
                    set_toggle(&config::PRINT_INFO_ON, false);
                    set_toggle(&config::PRINT_ELSE_ON, false);
                }
                "help" => {
                    println!("Available arguments:");
                    println!("  print_status::true/false");
                    println!("  print_json::true/false");
                    println!("  print_err::true/false");
                    println!("  print_warn::true/false");
                    println!("  print_ok::true/false");
                    println!("  print_info::true/false");
                    println!("  print_else::true/false");
                    println!("  debug (only errors are shown)");
                    println!("  sim (dispatcher and simulated building in one process)");
                    println!("  actuators::<addr> (simulated building, remote dispatcher)");
                    println!("  actuators (same, dispatcher on {})", config::DEFAULT_DISPATCHER_ADDR);
                    println!("  elevators::<n>");
                    println!("  floors::<n>");
                    println!("  listen::<addr>");
                    std::process::exit(0);
                }
                _ => print::warn(format!("Unknown argument: {}", arg)),
            }
        }
    }

    options
}

/// Name of elevator number `idx`: `Elevator-A`, `Elevator-B`, ...
pub fn elevator_name(idx: u8) -> String {
    format!("{}-{}", config::ELEVATOR_NAME_PREFIX, (b'A' + idx % 26) as char)
}

/// One monitor per elevator, all idle at the start floor.
pub fn build_monitors(options: &LaunchOptions) -> Vec<ElevatorMonitor> {
    (0..options.num_elevators)
        .map(|idx| {
            ElevatorMonitor::new(
                elevator_name(idx),
                ElevatorState::new(config::DEFAULT_START_FLOOR, ElevatorTiming::default()),
            )
        })
        .collect()
}

/// Simulated cars matching [build_monitors].
pub fn sim_elevators(options: &LaunchOptions) -> Vec<SimElevator> {
    (0..options.num_elevators)
        .map(|idx| SimElevator::new(elevator_name(idx), config::DEFAULT_START_FLOOR))
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_without_arguments() {
        assert_eq!(parse_arg_list(&[]), LaunchOptions::default());
    }

    #[test]
    fn building_size_and_mode() {
        let options = parse_arg_list(&args(&["sim", "elevators::3", "floors::6"]));
        assert_eq!(options.mode, Mode::Sim);
        assert_eq!(options.num_elevators, 3);
        assert_eq!(options.num_floors, 6);
    }

    #[test]
    fn actuator_address_keeps_port() {
        let options = parse_arg_list(&args(&["actuators::10.0.0.2:50100"]));
        assert_eq!(options.mode, Mode::Actuators("10.0.0.2:50100".to_string()));
    }

    #[test]
    fn bare_actuators_uses_default_address() {
        let options = parse_arg_list(&args(&["actuators"]));
        assert_eq!(options.mode, Mode::Actuators(config::DEFAULT_DISPATCHER_ADDR.to_string()));
    }

    #[test]
    fn invalid_counts_are_ignored() {
        let options = parse_arg_list(&args(&["elevators::0", "floors::many"]));
        assert_eq!(options.num_elevators, config::DEFAULT_NUM_ELEVATORS);
        assert_eq!(options.num_floors, config::DEFAULT_NUM_FLOORS);
    }

    #[test]
    fn monitors_get_letter_names() {
        let options = LaunchOptions { num_elevators: 3, ..LaunchOptions::default() };
        let names: Vec<String> = build_monitors(&options).iter().map(|m| m.name().to_string()).collect();
        assert_eq!(names, vec!["Elevator-A", "Elevator-B", "Elevator-C"]);
    }
}
