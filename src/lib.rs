#![warn(missing_docs)]
//! # Elevator dispatch coordinator
//!
//! This library decides which elevator serves which pickup request, in what order, and detects
//! and recovers from actuators that stop responding.
//!
//! ## Overview
//! - **Config**: Handles configuration settings.
//! - **Model**: Elevator state and trips.
//! - **Messages**: Events into and commands out of the dispatcher.
//! - **Monitor**: Per-elevator admission control and next-action inference.
//! - **Watchdog**: Deadlines on every commanded action.
//! - **Dispatcher**: The event loop tying it all together.
//! - **Network**: Command routing and TCP transport to the actuators.
//! - **Simulator**: Simulated elevators and floors.

/// Global variables
pub mod config;

/// Initialize functions
pub mod init;

/// Print functions with color coding
pub mod print;

/// Elevator state and trips.
pub mod model;

/// Events, commands and their wire format.
pub mod messages;

/// Per-elevator admission control.
pub mod monitor;

/// Deadlines on commanded actions.
pub mod watchdog;

/// The central event loop.
pub mod dispatcher;

/// Command routing and TCP transport.
pub mod network;

/// Simulated actuators.
pub mod simulator;
