//! ## Printing Module
//!
//! This module is only here to make logging in the terminal easier to read.
//! It prints in appropriate colors depending on the situation, and provides a
//! status table of all elevator monitors.
//!
//! Every category can be switched on/off at runtime through the toggles in [config].
use crate::config;
use crate::monitor::MonitorSnapshot;
use crate::model::{Dirn, DoorStatus, ElevatorStatus};
use ansi_term::Colour::{self, Blue, Green, Purple, Red, Yellow};

use prettytable::{format, Cell, Row, Table};
use std::sync::Mutex;
use unicode_width::UnicodeWidthStr;

/// Reads a print toggle. A poisoned toggle counts as switched on.
fn enabled(toggle: &Mutex<bool>) -> bool {
    toggle.lock().map(|on| *on).unwrap_or(true)
}

/// Prints an error message in red to the terminal.
///
/// If `PRINT_ERR_ON` is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[ERROR\]:   {}", msg
///
/// ## Example
/// ```
/// use elevatorpro_dispatch::print;
///
/// print::err("Something went wrong!".to_string());
/// ```
pub fn err(msg: String) {
    if enabled(&config::PRINT_ERR_ON) {
        println!("{}{}\n", Red.paint("[ERROR]:   "), Red.paint(msg));
    }
}

/// Prints a warning message in yellow to the terminal.
///
/// If `PRINT_WARN_ON` is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[WARNING\]: {}", msg
pub fn warn(msg: String) {
    if enabled(&config::PRINT_WARN_ON) {
        println!("{}{}\n", Yellow.paint("[WARNING]: "), Yellow.paint(msg));
    }
}

/// Prints a success message in green to the terminal.
///
/// If `PRINT_OK_ON` is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[OK\]:      {}", msg
pub fn ok(msg: String) {
    if enabled(&config::PRINT_OK_ON) {
        println!("{}{}\n", Green.paint("[OK]:      "), Green.paint(msg));
    }
}

/// Prints an informational message in light blue to the terminal.
///
/// If `PRINT_INFO_ON` is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[INFO\]:    {}", msg
pub fn info(msg: String) {
    let light_blue = Colour::RGB(102, 178, 255);
    if enabled(&config::PRINT_INFO_ON) {
        println!("{}{}\n", light_blue.paint("[INFO]:    "), light_blue.paint(msg));
    }
}

/// Prints a dispatcher decision in pink to the terminal.
///
/// If `PRINT_ELSE_ON` is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[DISPATCH\]:{}", msg
pub fn dispatch(msg: String) {
    let pink = Colour::RGB(255, 51, 255);
    if enabled(&config::PRINT_ELSE_ON) {
        println!("{}{}\n", pink.paint("[DISPATCH]:"), pink.paint(msg));
    }
}

/// Prints chatter from the simulated elevators and floors in orange to the terminal.
///
/// If `PRINT_ELSE_ON` is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[ELEVATOR\]:{}", msg
pub fn elevator(msg: String) {
    let orange = Colour::RGB(153, 76, 0);
    if enabled(&config::PRINT_ELSE_ON) {
        println!("{}{}\n", orange.paint("[ELEVATOR]:"), orange.paint(msg));
    }
}

/// Reports a broken invariant, in rainbow colours so it stands out in a busy log.
///
/// Used when something happens that should be impossible by construction.
pub fn cosmic_err(what: String) {
    const RAINBOW: [Colour; 6] = [Red, Yellow, Green, Colour::Cyan, Blue, Purple];

    let message = format!("[ERROR]: Cosmic rays flipped a bit! 👽 ⚛️ 🔄 1️⃣ 0️⃣  IN: {}", what);
    let painted: String = message
        .chars()
        .enumerate()
        .map(|(i, c)| RAINBOW[i % RAINBOW.len()].paint(c.to_string()).to_string())
        .collect();
    println!("{}", painted);
}

/// Pads the input text to a fixed display width using spaces.
///
/// Accounts for characters that take more than one column.
fn pad_text(text: &str, width: usize) -> String {
    let visible_width = UnicodeWidthStr::width(text);
    let padding = width.saturating_sub(visible_width);
    format!("{}{}", text, " ".repeat(padding))
}

fn floor_list(floors: &[u8]) -> String {
    if floors.is_empty() {
        return "-".to_string();
    }
    floors.iter().map(|f| f.to_string()).collect::<Vec<String>>().join(", ")
}

fn motor_label(snapshot: &MonitorSnapshot) -> String {
    match (snapshot.status, snapshot.direction) {
        (ElevatorStatus::OutOfService, _) => Red.bold().paint("Out of service").to_string(),
        (ElevatorStatus::Stop, _) => Green.paint("Stopped").to_string(),
        (ElevatorStatus::Move, Dirn::Up) => Yellow.paint("⬆️  Moving").to_string(),
        (ElevatorStatus::Move, Dirn::Down) => Yellow.paint("⬇️  Moving").to_string(),
        (ElevatorStatus::Move, Dirn::Stay) => Red.paint("Not moving").to_string(),
    }
}

/// Logs the state of every monitor to the terminal as a colorized table.
///
/// Does nothing unless `PRINT_STATUS_ON` is set.
pub fn status(snapshots: &[MonitorSnapshot]) {
    if !enabled(&config::PRINT_STATUS_ON) {
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);

    println!("{}", Purple.bold().paint("DISPATCHER STATUS"));

    table.add_row(Row::new(vec![
        Cell::new(&Blue.bold().paint("Elevator").to_string()),
        Cell::new(&Blue.bold().paint("Floor").to_string()),
        Cell::new(&Blue.bold().paint("Motor").to_string()),
        Cell::new(&Blue.bold().paint("Door").to_string()),
        Cell::new(&Blue.bold().paint("Queue").to_string()),
        Cell::new(&Blue.bold().paint("Pickups").to_string()),
        Cell::new(&Blue.bold().paint("Destinations").to_string()),
    ]));

    for snapshot in snapshots {
        let name = Yellow.bold().paint(pad_text(&snapshot.name, 12)).to_string();
        let door = match snapshot.door_status {
            DoorStatus::Open => Yellow.paint("Open").to_string(),
            DoorStatus::Close => Green.paint("Closed").to_string(),
        };
        let queue = format!("{} x {}", snapshot.queue_len, snapshot.queue_direction);

        table.add_row(Row::new(vec![
            Cell::new(&name),
            Cell::new(&snapshot.current_floor.to_string()),
            Cell::new(&motor_label(snapshot)),
            Cell::new(&door),
            Cell::new(&queue),
            Cell::new(&floor_list(&snapshot.pickup_floors)),
            Cell::new(&floor_list(&snapshot.destination_floors)),
        ]));
    }

    table.printstd();
    print!("\n\n");
}

/// Dumps the state of every monitor as pretty JSON.
///
/// Does nothing unless `PRINT_STATUS_JSON_ON` is set.
pub fn status_json(snapshots: &[MonitorSnapshot]) {
    if !enabled(&config::PRINT_STATUS_JSON_ON) {
        return;
    }

    match serde_json::to_string_pretty(snapshots) {
        Ok(json) => println!("{}\n", json),
        Err(e) => err(format!("Could not serialize status: {}", e)),
    }
}
