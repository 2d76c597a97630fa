//! ## Messages exchanged between the dispatcher and the actuators
//!
//! The dispatcher consumes [`Event`]s from a single inbound queue and emits [`Command`]s.
//! Both are sum types so every message kind is handled by an exhaustive `match`.
//!
//! | Message | Direction |
//! |---|---|
//! | [`Event::TripRequest`] | floor → dispatcher |
//! | [`Event::ArrivalNotice`] / [`Command::ArrivalNotice`] | elevator → dispatcher → floor |
//! | [`Event::DoorStatus`] / [`Command::Door`] | elevator ↔ dispatcher |
//! | [`Event::MotorStatus`] / [`Command::Motor`] | elevator ↔ dispatcher |
//! | [`Event::DestinationRequest`] | floor/elevator → dispatcher |
//! | [`Command::Wait`] / [`Event::WaitComplete`] | dispatcher ↔ elevator |
//! | [`Command::Lamp`] | dispatcher → floor/elevator |
//! | [`Event::WatchdogFired`] | watchdog timer → dispatcher (never on the wire) |
//!
//! On the wire every message travels inside a [`Frame`], see [`serial`].

pub mod serial;

use serde::{Serialize, Deserialize};
use std::fmt;
use std::time::SystemTime;

use crate::model::{Dirn, DoorStatus};
use crate::watchdog::WatchdogKind;

/// Names the actuator a command is meant for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// An elevator car, by name.
    Elevator(String),
    /// A floor panel, by floor number.
    Floor(u8),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Elevator(name) => write!(f, "{}", name),
            Target::Floor(floor) => write!(f, "Floor-{}", floor),
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Which lamp a [`Command::Lamp`] addresses.
pub enum LampKind {
    /// Destination button lamp inside the car.
    Destination(u8),
    /// Direction lamp on a floor panel.
    Hall(Dirn),
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LampStatus {
    On,
    Off,
}

/// Everything the dispatcher loop consumes.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// A passenger pressed a direction button on a floor.
    TripRequest {
        pickup_floor: u8,
        direction: Dirn,
        timestamp: SystemTime,
    },
    /// An elevator reached a floor.
    ArrivalNotice {
        elevator: String,
        floor: u8,
        direction: Dirn,
    },
    /// Confirmation of a [`Command::Door`].
    DoorStatus {
        elevator: String,
        action: DoorStatus,
    },
    /// Confirmation of a [`Command::Motor`].
    MotorStatus {
        elevator: String,
        action: Dirn,
    },
    /// A passenger picked up on `pickup_floor` asked to go to `destination_floor`.
    DestinationRequest {
        elevator: String,
        pickup_floor: u8,
        destination_floor: u8,
    },
    /// Confirmation that a [`Command::Wait`] has run out.
    WaitComplete {
        elevator: String,
    },
    /// A watchdog deadline passed without the expected confirmation.
    WatchdogFired {
        elevator: String,
        kind: WatchdogKind,
        id: u64,
    },
}

impl Event {
    /// Name of the elevator the event concerns, `None` for trip requests.
    pub fn elevator(&self) -> Option<&str> {
        match self {
            Event::TripRequest { .. } => None,
            Event::ArrivalNotice { elevator, .. }
            | Event::DoorStatus { elevator, .. }
            | Event::MotorStatus { elevator, .. }
            | Event::DestinationRequest { elevator, .. }
            | Event::WaitComplete { elevator }
            | Event::WatchdogFired { elevator, .. } => Some(elevator),
        }
    }
}

/// Everything the dispatcher sends to actuators. Sending is fire-and-forget.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Door {
        elevator: String,
        action: DoorStatus,
    },
    Motor {
        elevator: String,
        action: Dirn,
    },
    Wait {
        elevator: String,
    },
    /// Tells a floor that `elevator` has stopped there with its door open.
    ArrivalNotice {
        floor: u8,
        elevator: String,
        direction: Dirn,
    },
    Lamp {
        target: Target,
        kind: LampKind,
        status: LampStatus,
    },
}

impl Command {
    /// The actuator this command must be routed to.
    pub fn target(&self) -> Target {
        match self {
            Command::Door { elevator, .. }
            | Command::Motor { elevator, .. }
            | Command::Wait { elevator } => Target::Elevator(elevator.clone()),
            Command::ArrivalNotice { floor, .. } => Target::Floor(*floor),
            Command::Lamp { target, .. } => target.clone(),
        }
    }
}

/// Unit of transfer on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Frame {
    /// First frame on every actuator connection.
    Register(Target),
    /// Actuator → dispatcher.
    Event(Event),
    /// Dispatcher → actuator.
    Command(Command),
}
