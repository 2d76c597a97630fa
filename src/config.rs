//! # config.rs – Centralized Parameter Store
//!
//! This module holds all static program parameters used throughout the dispatcher.
//! Keeping configuration in one place makes tuning, experimentation, and testing easier.
//!
//! Values here are defaults. Some of them (number of elevators, number of floors,
//! listen address) can be overridden at startup, see [crate::init::parse_args].

use std::sync::Mutex;
use std::time::Duration;
use once_cell::sync::Lazy;

//
// ──────────────────────────────────────────────────────────────
//   1. NETWORK SETTINGS
// ──────────────────────────────────────────────────────────────
//

/// Address the dispatcher listens on for actuator connections
pub static LISTEN_ADDR: &str = "0.0.0.0:50100";

/// Address actuators connect to when started in `actuators` mode without an explicit address
pub static DEFAULT_DISPATCHER_ADDR: &str = "127.0.0.1:50100";

/// Max size of one frame on the wire (length prefix is a `u16`)
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;

/// Delay before a failed actuator connection is retried
pub const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(500);

//
// ──────────────────────────────────────────────────────────────
//   2. SYSTEM & ELEVATOR PARAMETERS
// ──────────────────────────────────────────────────────────────
//

/// Default number of floors in the building
pub const DEFAULT_NUM_FLOORS: u8 = 10;

/// Default number of elevators in the building
pub const DEFAULT_NUM_ELEVATORS: u8 = 2;

/// Floor every elevator starts at, and returns to when idle
pub const DEFAULT_START_FLOOR: u8 = 0;

/// Prefix used to generate elevator names (`Elevator-A`, `Elevator-B`, ...)
pub static ELEVATOR_NAME_PREFIX: &str = "Elevator";

//
// ──────────────────────────────────────────────────────────────
//   3. TIMING & TIMEOUTS & INTERVALS
// ──────────────────────────────────────────────────────────────
//

/// Nominal travel time between two adjacent floors
pub const TIME_BETWEEN_FLOORS: Duration = Duration::from_millis(1500);

/// Time passengers are given to enter/leave while the door is open
pub const PASSENGER_WAIT_TIME: Duration = Duration::from_millis(3000);

/// Time it takes to open or close the door
pub const DOOR_OPERATION_TIME: Duration = Duration::from_millis(1000);

/// A watchdog fires when an operation takes longer than `nominal * WATCHDOG_FACTOR`
pub const WATCHDOG_FACTOR: f64 = 1.25;

/// Time between generated passengers in the simulated building
pub const SIM_PASSENGER_INTERVAL: Duration = Duration::from_secs(4);

//
// ──────────────────────────────────────────────────────────────
//   4. CHANNELS
// ──────────────────────────────────────────────────────────────
//

/// Capacity of the dispatcher's inbound event queue
pub const INBOUND_QUEUE_CAPACITY: usize = 300;

/// Capacity of the channels feeding an actuator's events and passengers
pub const ACTUATOR_CHANNEL_CAPACITY: usize = 100;

/// Capacity of the route registration channel
pub const ROUTE_CHANNEL_CAPACITY: usize = 100;

//
// ──────────────────────────────────────────────────────────────
//   5. LOGGING CONFIGURATION
// ──────────────────────────────────────────────────────────────
//

/// Enable/disable printing of the status table after every event
pub static PRINT_STATUS_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(false));

/// Enable/disable dumping the status as JSON after every event
pub static PRINT_STATUS_JSON_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(false));

/// Enable/disable printing of errors
pub static PRINT_ERR_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable printing of warnings
pub static PRINT_WARN_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable printing of success messages
pub static PRINT_OK_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable printing of general info
pub static PRINT_INFO_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable dispatcher decisions and actuator chatter
pub static PRINT_ELSE_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));
