//! ## Elevator data model
//!
//! Plain data types shared by the monitor, the dispatcher and the actuators.
//!
//! - [`Dirn`]: direction of travel, also used as motor action and as the committed queue direction.
//! - [`ElevatorStatus`]: motor status, with [`ElevatorStatus::OutOfService`] as terminal fault state.
//! - [`DoorStatus`]: door state, also used as door action.
//! - [`ElevatorTiming`]: timing constants of one elevator.
//! - [`ElevatorState`]: the physical/simulated state of one elevator.
//! - [`trip::Trip`]: one passenger movement request.

pub mod trip;

use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::config;

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Direction an elevator is travelling, or the direction its queue is committed to.
pub enum Dirn {
    Down,
    Stay,
    Up,
}

impl Dirn {
    /// Direction to travel from `from` to reach `to`. [`Dirn::Stay`] if already there.
    pub fn towards(from: u8, to: u8) -> Dirn {
        if to > from {
            Dirn::Up
        } else if to < from {
            Dirn::Down
        } else {
            Dirn::Stay
        }
    }

    /// Next floor when moving one floor in this direction from `floor`.
    pub fn step(self, floor: u8) -> u8 {
        match self {
            Dirn::Up => floor.saturating_add(1),
            Dirn::Down => floor.saturating_sub(1),
            Dirn::Stay => floor,
        }
    }
}

impl fmt::Display for Dirn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dirn::Up => write!(f, "UP"),
            Dirn::Down => write!(f, "DOWN"),
            Dirn::Stay => write!(f, "STAY"),
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Motor status of an elevator. `OutOfService` is never left again.
pub enum ElevatorStatus {
    Stop,
    Move,
    OutOfService,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Door status, also used as the action in door commands and confirmations.
pub enum DoorStatus {
    Open,
    Close,
}

impl fmt::Display for DoorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoorStatus::Open => write!(f, "OPEN"),
            DoorStatus::Close => write!(f, "CLOSE"),
        }
    }
}

/// Timing constants of one elevator, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElevatorTiming {
    /// Travel time between two adjacent floors.
    pub time_between_floors: Duration,
    /// Time the elevator waits for passengers at a stop.
    pub passenger_wait_time: Duration,
    /// Time to open or close the door.
    pub door_operation_time: Duration,
}

impl ElevatorTiming {
    /// Time added to a pickup estimate for every stop made before the pickup: open, wait, close.
    pub fn time_per_stop(&self) -> Duration {
        self.door_operation_time * 2 + self.passenger_wait_time
    }
}

impl Default for ElevatorTiming {
    fn default() -> Self {
        Self {
            time_between_floors: config::TIME_BETWEEN_FLOORS,
            passenger_wait_time: config::PASSENGER_WAIT_TIME,
            door_operation_time: config::DOOR_OPERATION_TIME,
        }
    }
}

/// Represents the physical state of one elevator as last reported by its actuator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElevatorState {
    /// Floor the elevator starts at and returns to when it runs out of work.
    pub start_floor: u8,

    /// Floor of the last arrival notice.
    pub current_floor: u8,

    /// Physical direction of travel.
    /// Default: [Dirn::Stay]
    pub direction: Dirn,

    /// Default: [ElevatorStatus::Stop]
    pub status: ElevatorStatus,

    /// Default: [DoorStatus::Close]
    pub door_status: DoorStatus,

    /// Destination lamps inside the car, floor -> lit.
    pub lamps: BTreeMap<u8, bool>,

    /// Timing constants.
    pub timing: ElevatorTiming,
}

impl ElevatorState {
    /// Creates an idle elevator standing at `start_floor` with its door closed.
    pub fn new(start_floor: u8, timing: ElevatorTiming) -> Self {
        Self {
            start_floor,
            current_floor: start_floor,
            direction: Dirn::Stay,
            status: ElevatorStatus::Stop,
            door_status: DoorStatus::Close,
            lamps: BTreeMap::new(),
            timing,
        }
    }

    /// `true` once the elevator has been declared out of service.
    pub fn is_out_of_service(&self) -> bool {
        self.status == ElevatorStatus::OutOfService
    }

    /// Sets the destination lamp for `floor`.
    pub fn set_lamp(&mut self, floor: u8, lit: bool) {
        self.lamps.insert(floor, lit);
    }
}

impl Default for ElevatorState {
    fn default() -> Self {
        Self::new(config::DEFAULT_START_FLOOR, ElevatorTiming::default())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn towards_and_step() {
        assert_eq!(Dirn::towards(2, 5), Dirn::Up);
        assert_eq!(Dirn::towards(5, 2), Dirn::Down);
        assert_eq!(Dirn::towards(3, 3), Dirn::Stay);
        assert_eq!(Dirn::Down.step(0), 0);
        assert_eq!(Dirn::Up.step(4), 5);
    }

    #[test]
    fn stop_time_is_open_wait_close() {
        let timing = ElevatorTiming {
            time_between_floors: Duration::from_secs(2),
            passenger_wait_time: Duration::from_secs(3),
            door_operation_time: Duration::from_secs(1),
        };
        assert_eq!(timing.time_per_stop(), Duration::from_secs(5));
    }
}
