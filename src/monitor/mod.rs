//! ## Elevator Monitor
//!
//! The monitor is the dispatcher's model of one elevator. It owns the [`ElevatorState`]
//! reported by the elevator, the queue of [`Trip`]s assigned to it and the floors it has
//! committed to stop at.
//!
//! It answers two kinds of questions:
//! - **Admission**: can this elevator take a trip, and how soon can it be at the pickup floor
//!   ([`ElevatorMonitor::estimate_pickup_time`], [`ElevatorMonitor::add_trip_request`]).
//! - **Next action**: should the elevator stop at this floor, and which way should it go next
//!   ([`ElevatorMonitor::is_stop_required`], [`ElevatorMonitor::next_elevator_direction`]).
//!
//! # Queue direction
//! `queue_direction` is the direction the current batch of trips is served in. It differs from
//! the physical direction while the elevator travels to the first pickup. It is
//! [`Dirn::Stay`] exactly when the queue is empty.

pub mod request;

use serde::{Serialize, Deserialize};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use crate::model::trip::Trip;
use crate::model::{Dirn, DoorStatus, ElevatorState, ElevatorStatus};
use crate::print;

/// Reason a destination request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationError {
    /// The elevator is out of service.
    OutOfService,
    /// The elevator has no trips, so there is no direction to go in.
    NoQueueDirection,
    /// The destination is not ahead of the elevator in its queue direction.
    NotAhead {
        /// Floor of the elevator when the request was made.
        current_floor: u8,
        /// Requested destination.
        destination_floor: u8,
        /// Committed queue direction.
        queue_direction: Dirn,
    },
}

impl fmt::Display for DestinationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfService => write!(f, "elevator is out of service"),
            Self::NoQueueDirection => write!(f, "elevator has no trips"),
            Self::NotAhead { current_floor, destination_floor, queue_direction } => write!(
                f,
                "floor {} is not ahead of floor {} going {}",
                destination_floor, current_floor, queue_direction
            ),
        }
    }
}

impl std::error::Error for DestinationError {}

/// Serializable summary of a monitor, published for printing and observers.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorSnapshot {
    pub name: String,
    pub current_floor: u8,
    pub direction: Dirn,
    pub status: ElevatorStatus,
    pub door_status: DoorStatus,
    pub queue_direction: Dirn,
    pub queue_len: usize,
    pub pickup_floors: Vec<u8>,
    pub destination_floors: Vec<u8>,
}

/// Admission control and next-action inference for one elevator.
#[derive(Debug, Clone)]
pub struct ElevatorMonitor {
    name: String,
    state: ElevatorState,
    queue: Vec<Trip>,
    pickup_floors: BTreeSet<u8>,
    destination_floors: BTreeSet<u8>,
    queue_direction: Dirn,
}

impl ElevatorMonitor {
    /// Creates a monitor for the elevator `name` with an empty queue.
    pub fn new(name: impl Into<String>, state: ElevatorState) -> Self {
        Self {
            name: name.into(),
            state,
            queue: Vec::new(),
            pickup_floors: BTreeSet::new(),
            destination_floors: BTreeSet::new(),
            queue_direction: Dirn::Stay,
        }
    }

    #[allow(missing_docs)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[allow(missing_docs)]
    pub fn state(&self) -> &ElevatorState {
        &self.state
    }

    /// Mutable access to the physical state, updated from actuator confirmations.
    pub fn state_mut(&mut self) -> &mut ElevatorState {
        &mut self.state
    }

    #[allow(missing_docs)]
    pub fn queue(&self) -> &[Trip] {
        &self.queue
    }

    #[allow(missing_docs)]
    pub fn pickup_floors(&self) -> &BTreeSet<u8> {
        &self.pickup_floors
    }

    #[allow(missing_docs)]
    pub fn destination_floors(&self) -> &BTreeSet<u8> {
        &self.destination_floors
    }

    #[allow(missing_docs)]
    pub fn queue_direction(&self) -> Dirn {
        self.queue_direction
    }

    /// Estimates how long until the elevator can be at the trip's pickup floor.
    ///
    /// ## Returns
    /// - `None` if the elevator cannot serve the trip.
    /// - Empty queue: travel time from the current floor.
    /// - En-route trip: travel time plus one stop time for every scheduled floor on the way.
    pub fn estimate_pickup_time(&self, trip: &Trip) -> Option<Duration> {
        if self.state.is_out_of_service() {
            return None;
        }

        let distance = self.state.current_floor.abs_diff(trip.pickup_floor()) as u32;
        let travel_time = self.state.timing.time_between_floors * distance;

        if self.queue.is_empty() {
            return Some(travel_time);
        }
        if !self.is_trip_en_route(trip) {
            return None;
        }

        let stops = request::interim_stops(
            self.pickup_floors.union(&self.destination_floors),
            self.state.current_floor,
            trip.pickup_floor(),
            self.queue_direction,
        ) as u32;
        Some(travel_time + self.state.timing.time_per_stop() * stops)
    }

    /// Decides if `trip` can join the current, non-empty queue.
    ///
    /// The trip must go the same way as the queue, and the elevator must already be heading
    /// that way (physically, or as its next move), or already be committed to stop at the
    /// pickup floor. An elevator at the pickup floor only accepts while stopped with its door
    /// open. Elsewhere, a pickup floor the elevator has already passed is refused.
    pub fn is_trip_en_route(&self, trip: &Trip) -> bool {
        if trip.direction() != self.queue_direction {
            return false;
        }

        let heading_queue_direction = self.state.direction == self.queue_direction
            || self.next_elevator_direction() == self.queue_direction
            || self.pickup_floors.contains(&trip.pickup_floor());
        if !heading_queue_direction {
            return false;
        }

        if self.state.current_floor == trip.pickup_floor() {
            return self.state.status == ElevatorStatus::Stop && self.state.door_status == DoorStatus::Open;
        }

        !request::has_passed(self.state.current_floor, trip.pickup_floor(), self.queue_direction)
    }

    /// Adds `trip` to the queue if the elevator can take it.
    ///
    /// An empty queue takes any trip and commits to its direction. A non-empty queue only takes
    /// en-route trips, see [`ElevatorMonitor::is_trip_en_route`]. The pickup floor is scheduled
    /// unless the elevator is already stopped there.
    ///
    /// Returns `true` if the trip was accepted.
    pub fn add_trip_request(&mut self, trip: Trip) -> bool {
        if self.state.is_out_of_service() {
            return false;
        }

        if self.queue.is_empty() {
            self.queue_direction = trip.direction();
        } else if !self.is_trip_en_route(&trip) {
            return false;
        }

        let stopped_here = self.state.current_floor == trip.pickup_floor() && self.state.status == ElevatorStatus::Stop;
        if !stopped_here {
            self.pickup_floors.insert(trip.pickup_floor());
        }
        self.queue.push(trip);
        true
    }

    /// Registers the destination of a passenger picked up at `pickup_floor`.
    ///
    /// The destination must lie strictly ahead in the queue direction. On success the floor
    /// is scheduled, its lamp is lit, and the destination is attached to the first trip from
    /// `pickup_floor` that has none yet.
    pub fn add_destination(&mut self, pickup_floor: u8, destination_floor: u8) -> Result<(), DestinationError> {
        if self.state.is_out_of_service() {
            return Err(DestinationError::OutOfService);
        }
        if self.queue_direction == Dirn::Stay {
            return Err(DestinationError::NoQueueDirection);
        }
        if !request::is_ahead(self.state.current_floor, destination_floor, self.queue_direction) {
            return Err(DestinationError::NotAhead {
                current_floor: self.state.current_floor,
                destination_floor,
                queue_direction: self.queue_direction,
            });
        }

        self.destination_floors.insert(destination_floor);
        self.state.set_lamp(destination_floor, true);

        match self
            .queue
            .iter_mut()
            .find(|trip| trip.pickup_floor() == pickup_floor && trip.destination_floor().is_none())
        {
            Some(trip) => {
                trip.set_destination(destination_floor);
            }
            None => print::warn(format!(
                "{}: destination {} has no waiting trip from floor {}",
                self.name, destination_floor, pickup_floor
            )),
        }
        Ok(())
    }

    /// Decides if the elevator must stop at `floor`.
    ///
    /// Stops at destination floors when travelling in the queue direction, at the start floor
    /// when out of work, and at every pickup floor.
    pub fn is_stop_required(&self, floor: u8) -> bool {
        (self.destination_floors.contains(&floor) && self.state.direction == self.queue_direction)
            || (self.queue_direction == Dirn::Stay && floor == self.state.start_floor)
            || self.pickup_floors.contains(&floor)
    }

    /// Direction the elevator should move in next.
    ///
    /// - Empty queue: back towards the start floor, [Dirn::Stay] when there.
    /// - Floors scheduled: first into the span of scheduled floors, see
    ///   [`request::direction_into_span`].
    /// - Nothing scheduled yet: the queue direction.
    pub fn next_elevator_direction(&self) -> Dirn {
        if self.queue.is_empty() {
            return Dirn::towards(self.state.current_floor, self.state.start_floor);
        }

        request::direction_into_span(
            &self.pickup_floors,
            &self.destination_floors,
            self.state.current_floor,
            self.queue_direction,
        )
        .unwrap_or(self.queue_direction)
    }

    /// Updates the queue after the elevator has stopped at its current floor.
    ///
    /// Trips with this floor as destination are completed and returned. A pickup at this floor
    /// is marked as done, the trip stays queued until its destination is reached.
    pub fn stop_occurred(&mut self) -> Vec<Trip> {
        let floor = self.state.current_floor;
        let mut completed = Vec::new();

        if self.destination_floors.remove(&floor) {
            let (done, remaining): (Vec<Trip>, Vec<Trip>) = self
                .queue
                .drain(..)
                .partition(|trip| trip.destination_floor() == Some(floor));
            self.queue = remaining;
            completed = done;
            self.state.set_lamp(floor, false);

            if self.queue.is_empty() {
                self.queue_direction = Dirn::Stay;
            }
        }

        self.pickup_floors.remove(&floor);
        completed
    }

    /// `true` while a passenger picked up at the current floor has not given a destination.
    pub fn is_waiting_for_destination_request(&self) -> bool {
        self.queue_direction != Dirn::Stay
            && self
                .queue
                .iter()
                .any(|trip| trip.pickup_floor() == self.state.current_floor && trip.destination_floor().is_none())
    }

    /// Removes every queued trip that has not been picked up yet and returns them for
    /// reassignment. Trips already picked up stay where they are.
    pub fn unassign_pending_trip_requests(&mut self) -> Vec<Trip> {
        let pickup_floors = std::mem::take(&mut self.pickup_floors);
        let (unassigned, kept): (Vec<Trip>, Vec<Trip>) = self
            .queue
            .drain(..)
            .partition(|trip| pickup_floors.contains(&trip.pickup_floor()));
        self.queue = kept;

        if self.queue.is_empty() {
            self.queue_direction = Dirn::Stay;
        }
        unassigned
    }

    /// Serializable summary of the monitor.
    pub fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            name: self.name.clone(),
            current_floor: self.state.current_floor,
            direction: self.state.direction,
            status: self.state.status,
            door_status: self.state.door_status,
            queue_direction: self.queue_direction,
            queue_len: self.queue.len(),
            pickup_floors: self.pickup_floors.iter().copied().collect(),
            destination_floors: self.destination_floors.iter().copied().collect(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElevatorTiming;

    fn timing() -> ElevatorTiming {
        ElevatorTiming {
            time_between_floors: Duration::from_secs(2),
            passenger_wait_time: Duration::from_secs(3),
            door_operation_time: Duration::from_secs(1),
        }
    }

    fn monitor_at(floor: u8) -> ElevatorMonitor {
        let mut state = ElevatorState::new(0, timing());
        state.current_floor = floor;
        ElevatorMonitor::new("Elevator-A", state)
    }

    #[test]
    fn empty_queue_accepts_and_commits_direction() {
        let mut monitor = monitor_at(0);
        assert!(monitor.add_trip_request(Trip::new(1, 6, Dirn::Down)));
        assert_eq!(monitor.queue_direction(), Dirn::Down);
        assert!(monitor.pickup_floors().contains(&6));
    }

    #[test]
    fn pickup_at_current_floor_is_not_scheduled() {
        let mut monitor = monitor_at(3);
        assert_eq!(monitor.estimate_pickup_time(&Trip::new(1, 3, Dirn::Up)), Some(Duration::ZERO));
        assert!(monitor.add_trip_request(Trip::new(1, 3, Dirn::Up)));
        assert!(monitor.pickup_floors().is_empty());
        assert!(monitor.is_waiting_for_destination_request());
    }

    #[test]
    fn pickup_behind_moving_elevator_is_scheduled() {
        let mut monitor = monitor_at(3);
        monitor.state_mut().status = ElevatorStatus::Move;
        monitor.state_mut().direction = Dirn::Down;
        assert!(monitor.add_trip_request(Trip::new(1, 3, Dirn::Up)));
        assert!(monitor.pickup_floors().contains(&3));
    }

    #[test]
    fn estimate_on_empty_queue_is_travel_time() {
        let monitor = monitor_at(1);
        assert_eq!(monitor.estimate_pickup_time(&Trip::new(1, 5, Dirn::Down)), Some(Duration::from_secs(8)));
    }

    #[test]
    fn en_route_estimate_adds_interim_stops() {
        let mut monitor = monitor_at(1);
        monitor.state_mut().direction = Dirn::Up;
        monitor.state_mut().status = ElevatorStatus::Move;
        assert!(monitor.add_trip_request(Trip::new(1, 3, Dirn::Up)));
        assert!(monitor.add_trip_request(Trip::new(2, 2, Dirn::Up)));

        // Floors 2 and 3 lie between 1 and 5: 4 floors * 2 s + 2 stops * (1 + 3 + 1) s
        assert_eq!(monitor.estimate_pickup_time(&Trip::new(3, 5, Dirn::Up)), Some(Duration::from_secs(18)));
    }

    #[test]
    fn opposite_direction_is_refused() {
        let mut monitor = monitor_at(1);
        monitor.add_trip_request(Trip::new(1, 4, Dirn::Up));
        let trip = Trip::new(2, 6, Dirn::Down);
        assert_eq!(monitor.estimate_pickup_time(&trip), None);
        assert!(!monitor.add_trip_request(trip));
    }

    #[test]
    fn passed_pickup_is_refused() {
        let mut monitor = monitor_at(5);
        monitor.state_mut().direction = Dirn::Up;
        monitor.state_mut().status = ElevatorStatus::Move;
        monitor.add_trip_request(Trip::new(1, 8, Dirn::Up));
        assert!(!monitor.is_trip_en_route(&Trip::new(2, 3, Dirn::Up)));
        assert!(monitor.is_trip_en_route(&Trip::new(3, 7, Dirn::Up)));
    }

    #[test]
    fn passing_through_pickup_floor_is_refused() {
        let mut monitor = monitor_at(4);
        monitor.state_mut().direction = Dirn::Up;
        monitor.state_mut().status = ElevatorStatus::Move;
        monitor.add_trip_request(Trip::new(1, 8, Dirn::Up));
        assert!(!monitor.is_trip_en_route(&Trip::new(2, 4, Dirn::Up)));

        monitor.state_mut().status = ElevatorStatus::Stop;
        monitor.state_mut().door_status = DoorStatus::Open;
        assert!(monitor.is_trip_en_route(&Trip::new(2, 4, Dirn::Up)));
    }

    #[test]
    fn destination_round_trip() {
        let mut monitor = monitor_at(0);
        monitor.add_trip_request(Trip::new(1, 2, Dirn::Up));
        monitor.state_mut().current_floor = 2;
        monitor.stop_occurred();

        assert!(monitor.add_destination(2, 7).is_ok());
        assert!(monitor.destination_floors().contains(&7));
        assert_eq!(monitor.queue()[0].destination_floor(), Some(7));
        assert_eq!(monitor.queue()[0].direction(), Dirn::Up);
        assert_eq!(monitor.state().lamps.get(&7), Some(&true));
    }

    #[test]
    fn destination_behind_is_refused() {
        let mut monitor = monitor_at(4);
        monitor.add_trip_request(Trip::new(1, 4, Dirn::Up));
        assert_eq!(
            monitor.add_destination(4, 2),
            Err(DestinationError::NotAhead { current_floor: 4, destination_floor: 2, queue_direction: Dirn::Up })
        );
        assert!(monitor.destination_floors().is_empty());
    }

    #[test]
    fn destination_refused_when_out_of_service() {
        let mut monitor = monitor_at(4);
        monitor.add_trip_request(Trip::new(1, 4, Dirn::Up));
        monitor.state_mut().status = ElevatorStatus::OutOfService;
        assert_eq!(monitor.add_destination(4, 6), Err(DestinationError::OutOfService));
    }

    #[test]
    fn stop_rule_clauses() {
        let mut monitor = monitor_at(3);
        // Idle: only the start floor
        assert!(monitor.is_stop_required(0));
        assert!(!monitor.is_stop_required(2));

        monitor.add_trip_request(Trip::new(1, 3, Dirn::Up));
        monitor.add_destination(3, 6).expect("destination");
        monitor.add_trip_request(Trip::new(2, 5, Dirn::Up));

        // Destination only counts while moving in the queue direction
        monitor.state_mut().direction = Dirn::Down;
        assert!(!monitor.is_stop_required(6));
        monitor.state_mut().direction = Dirn::Up;
        assert!(monitor.is_stop_required(6));
        assert!(monitor.is_stop_required(5));
        assert!(!monitor.is_stop_required(0));
    }

    #[test]
    fn next_direction_scenarios() {
        let mut monitor = monitor_at(4);
        monitor.state_mut().direction = Dirn::Up;
        monitor.state_mut().status = ElevatorStatus::Move;
        monitor.add_trip_request(Trip::new(1, 5, Dirn::Up));
        monitor.destination_floors.insert(8);
        assert_eq!(monitor.next_elevator_direction(), Dirn::Up);

        let idle_away = monitor_at(6);
        assert_eq!(idle_away.next_elevator_direction(), Dirn::Down);
        let idle_home = monitor_at(0);
        assert_eq!(idle_home.next_elevator_direction(), Dirn::Stay);
    }

    #[test]
    fn stop_completes_trips_and_clears_queue_direction() {
        let mut monitor = monitor_at(2);
        monitor.state_mut().door_status = DoorStatus::Open;
        assert!(monitor.add_trip_request(Trip::new(1, 2, Dirn::Up)));
        assert!(monitor.add_trip_request(Trip::new(2, 2, Dirn::Up)));
        monitor.add_destination(2, 5).expect("first");
        monitor.add_destination(2, 5).expect("second");

        monitor.state_mut().current_floor = 5;
        let completed = monitor.stop_occurred();
        assert_eq!(completed.len(), 2);
        assert!(monitor.queue().is_empty());
        assert_eq!(monitor.queue_direction(), Dirn::Stay);
        assert_eq!(monitor.state().lamps.get(&5), Some(&false));
    }

    #[test]
    fn unassign_returns_only_trips_not_picked_up() {
        let mut monitor = monitor_at(1);
        monitor.add_trip_request(Trip::new(1, 1, Dirn::Up));
        monitor.add_destination(1, 9).expect("destination");
        monitor.add_trip_request(Trip::new(2, 4, Dirn::Up));

        let unassigned = monitor.unassign_pending_trip_requests();
        assert_eq!(unassigned.iter().map(Trip::id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(monitor.queue().len(), 1);
        assert!(monitor.pickup_floors().is_empty());
        assert_eq!(monitor.queue_direction(), Dirn::Up);
    }
}
