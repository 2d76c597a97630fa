//! ## Dispatcher
//!
//! The dispatcher is the single consumer of the inbound event queue. It owns every
//! [`ElevatorMonitor`], the pool of trips no elevator could take yet, and the
//! [`WatchdogRegistry`].
//!
//! # Per-elevator state machine
//! ```text
//!  TripRequest ──► select elevator ──► (idle elsewhere) Door CLOSE
//!                                      (idle here)     ArrivalNotice → floor, Wait
//!  Door CLOSE ok ──► Motor <next> ──► ArrivalNotice ──► stop required? ── no ──► Motor <next>
//!                                                        │ yes
//!                                                        ▼
//!                                Motor STAY ok ──► Door OPEN ──► Door OPEN ok ──► Wait
//!  WaitComplete ──► waiting for destination? Wait : Door CLOSE (or idle at start floor)
//! ```
//! Every motor and door command is guarded by a watchdog. A move that never arrives puts the
//! elevator permanently out of service and hands its not yet picked up trips to the others.
//! A door that never confirms is commanded again. A confirmation nobody is waiting for, such
//! as the second answer to a resent door command, changes nothing.
//!
//! Hall lamps on a floor follow the call: lit when the trip request comes in, turned off when
//! an elevator announces its arrival in that direction.
//!
//! Events are handled one at a time, in arrival order. Nothing in here blocks: commands are
//! pushed on an unbounded channel and watchdog timers live in their own tasks.

pub mod planning;

use tokio::sync::{mpsc, watch};

use crate::messages::{Command, Event, LampKind, LampStatus, Target};
use crate::model::trip::Trip;
use crate::model::{Dirn, DoorStatus, ElevatorStatus};
use crate::monitor::{ElevatorMonitor, MonitorSnapshot};
use crate::print;
use crate::watchdog::{WatchdogKind, WatchdogRegistry};

/// Central coordinator for all elevators.
#[derive(Debug)]
pub struct Dispatcher {
    monitors: Vec<ElevatorMonitor>,
    pending_trips: Vec<Trip>,
    watchdogs: WatchdogRegistry,
    commands_tx: mpsc::UnboundedSender<Command>,
    status_tx: Option<watch::Sender<Vec<MonitorSnapshot>>>,
    next_trip_id: u64,
}

impl Dispatcher {
    /// Creates a dispatcher.
    ///
    /// ## Parameters
    /// - `monitors`: One monitor per elevator, names must be unique.
    /// - `events_tx`: Sender to the dispatcher's own inbound queue, used by the watchdogs.
    /// - `commands_tx`: Outbound commands, routed to the actuators by the transport.
    pub fn new(monitors: Vec<ElevatorMonitor>, events_tx: mpsc::Sender<Event>, commands_tx: mpsc::UnboundedSender<Command>) -> Self {
        Self {
            monitors,
            pending_trips: Vec::new(),
            watchdogs: WatchdogRegistry::new(events_tx),
            commands_tx,
            status_tx: None,
            next_trip_id: 1,
        }
    }

    /// Publishes fresh snapshots on `status_tx` after every handled event.
    pub fn with_status_watch(mut self, status_tx: watch::Sender<Vec<MonitorSnapshot>>) -> Self {
        status_tx.send_replace(self.snapshots());
        self.status_tx = Some(status_tx);
        self
    }

    #[allow(missing_docs)]
    pub fn monitors(&self) -> &[ElevatorMonitor] {
        &self.monitors
    }

    /// Monitor of the elevator called `name`.
    pub fn monitor(&self, name: &str) -> Option<&ElevatorMonitor> {
        self.monitors.iter().find(|monitor| monitor.name() == name)
    }

    /// Trips waiting for an elevator.
    pub fn pending_trips(&self) -> &[Trip] {
        &self.pending_trips
    }

    #[allow(missing_docs)]
    pub fn watchdogs(&self) -> &WatchdogRegistry {
        &self.watchdogs
    }

    /// Snapshot of every monitor, in construction order.
    pub fn snapshots(&self) -> Vec<MonitorSnapshot> {
        self.monitors.iter().map(ElevatorMonitor::snapshot).collect()
    }

    /// Serial event loop.
    ///
    /// Handles events from `events_rx` in arrival order until the queue closes or
    /// `shutdown_rx` changes.
    pub async fn run(mut self, mut events_rx: mpsc::Receiver<Event>, mut shutdown_rx: watch::Receiver<bool>) {
        print::ok(format!("Dispatcher running with {} elevators", self.monitors.len()));
        loop {
            tokio::select! {
                event = events_rx.recv() => {
                    match event {
                        Some(event) => self.handle_event(event),
                        None => {
                            print::warn("Inbound queue closed, dispatcher stops".to_string());
                            break;
                        }
                    }
                }
                _ = shutdown_rx.changed() => {
                    print::info("Dispatcher shutting down".to_string());
                    break;
                }
            }
        }
    }

    /// Handles one inbound event to completion.
    ///
    /// ## Note
    /// Must be called from within a tokio runtime, watchdogs are spawned as tasks.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::TripRequest { pickup_floor, direction, .. } => self.on_trip_request(pickup_floor, direction),
            Event::ArrivalNotice { elevator, floor, .. } => self.on_arrival(&elevator, floor),
            Event::MotorStatus { elevator, action } => self.on_motor_status(&elevator, action),
            Event::DoorStatus { elevator, action } => self.on_door_status(&elevator, action),
            Event::DestinationRequest { elevator, pickup_floor, destination_floor } => {
                self.on_destination_request(&elevator, pickup_floor, destination_floor)
            }
            Event::WaitComplete { elevator } => self.on_wait_complete(&elevator),
            Event::WatchdogFired { elevator, kind, id } => self.on_watchdog_fired(&elevator, kind, id),
        }
        self.publish_status();
    }

    /// Runs elevator selection for `trip`. A trip no elevator can take goes to the pending pool.
    fn submit_trip(&mut self, trip: Trip) {
        let idx = match planning::select_elevator(&self.monitors, &trip) {
            Some(idx) => idx,
            None => {
                print::info(format!("No elevator can take trip {} now, trip is pending", trip));
                self.pending_trips.push(trip);
                return;
            }
        };

        let monitor = &mut self.monitors[idx];
        if !monitor.add_trip_request(trip.clone()) {
            print::cosmic_err(format!("{} gave an estimate for trip {} but refused it", monitor.name(), trip));
            self.pending_trips.push(trip);
            return;
        }
        print::dispatch(format!("Trip {} assigned to {}", trip, monitor.name()));

        let name = monitor.name().to_string();
        let state = monitor.state();
        let stopped = state.status == ElevatorStatus::Stop;
        let idle = stopped && state.direction == Dirn::Stay;
        let at_pickup = state.current_floor == trip.pickup_floor();
        let first_trip = monitor.queue().len() == 1;
        let door_time = state.timing.door_operation_time;

        // A car stopped mid-route with its door open is already waiting, the floor only needs to know
        if at_pickup && (idle || (stopped && state.door_status == DoorStatus::Open)) {
            self.announce_arrival(trip.pickup_floor(), &name, trip.direction());
            if idle && first_trip {
                self.send(Command::Wait { elevator: name });
            }
        } else if idle && first_trip {
            self.send(Command::Door { elevator: name.clone(), action: DoorStatus::Close });
            self.watchdogs.arm(&name, WatchdogKind::CloseDoor, door_time);
        }
    }

    fn on_trip_request(&mut self, pickup_floor: u8, direction: Dirn) {
        if direction == Dirn::Stay {
            print::warn(format!("Trip request from floor {} without direction dropped", pickup_floor));
            return;
        }

        let trip = Trip::new(self.next_trip_id, pickup_floor, direction);
        self.next_trip_id += 1;
        print::info(format!("Trip request {}", trip));
        self.send(hall_lamp(pickup_floor, direction, LampStatus::On));
        self.submit_trip(trip);
    }

    /// Tells the floor which elevator is there and which way it goes, and clears the hall lamp.
    fn announce_arrival(&self, floor: u8, elevator: &str, direction: Dirn) {
        self.send(Command::ArrivalNotice { floor, elevator: elevator.to_string(), direction });
        if direction != Dirn::Stay {
            self.send(hall_lamp(floor, direction, LampStatus::Off));
        }
    }

    fn on_arrival(&mut self, elevator: &str, floor: u8) {
        let idx = match self.active_monitor(elevator) {
            Some(idx) => idx,
            None => return,
        };
        self.watchdogs.cancel(elevator, WatchdogKind::Move);

        let monitor = &mut self.monitors[idx];
        monitor.state_mut().current_floor = floor;
        let next = monitor.next_elevator_direction();

        if monitor.is_stop_required(floor) || next == Dirn::Stay {
            print::dispatch(format!("{}: stopping at floor {}", elevator, floor));
            self.send(Command::Motor { elevator: elevator.to_string(), action: Dirn::Stay });
            return;
        }

        monitor.state_mut().direction = next;
        let floor_time = monitor.state().timing.time_between_floors;
        self.send(Command::Motor { elevator: elevator.to_string(), action: next });
        self.watchdogs.arm(elevator, WatchdogKind::Move, floor_time);
    }

    fn on_motor_status(&mut self, elevator: &str, action: Dirn) {
        let idx = match self.active_monitor(elevator) {
            Some(idx) => idx,
            None => return,
        };
        let monitor = &mut self.monitors[idx];

        if action != Dirn::Stay {
            monitor.state_mut().status = ElevatorStatus::Move;
            monitor.state_mut().direction = action;
            return;
        }

        monitor.state_mut().status = ElevatorStatus::Stop;
        let floor = monitor.state().current_floor;
        let door_time = monitor.state().timing.door_operation_time;
        let completed = monitor.stop_occurred();

        for trip in &completed {
            print::ok(format!("{}: trip {} completed", elevator, trip));
        }
        if !completed.is_empty() {
            self.send(Command::Lamp {
                target: Target::Elevator(elevator.to_string()),
                kind: LampKind::Destination(floor),
                status: LampStatus::Off,
            });
        }

        self.send(Command::Door { elevator: elevator.to_string(), action: DoorStatus::Open });
        self.watchdogs.arm(elevator, WatchdogKind::OpenDoor, door_time);
    }

    fn on_door_status(&mut self, elevator: &str, action: DoorStatus) {
        let idx = match self.active_monitor(elevator) {
            Some(idx) => idx,
            None => return,
        };
        let expected = self.watchdogs.cancel(elevator, WatchdogKind::for_door(action));
        if !expected && self.monitors[idx].state().door_status == action {
            print::info(format!("{}: door already {}, repeated confirmation ignored", elevator, action));
            return;
        }

        match action {
            DoorStatus::Open => {
                self.monitors[idx].state_mut().door_status = DoorStatus::Open;
                self.drain_pending_into(idx);

                let monitor = &self.monitors[idx];
                let floor = monitor.state().current_floor;
                let direction = monitor.queue_direction();
                self.announce_arrival(floor, elevator, direction);
                self.send(Command::Wait { elevator: elevator.to_string() });
            }
            DoorStatus::Close => {
                let monitor = &mut self.monitors[idx];
                monitor.state_mut().door_status = DoorStatus::Close;
                let next = monitor.next_elevator_direction();

                if next == Dirn::Stay {
                    monitor.state_mut().direction = Dirn::Stay;
                    print::info(format!("{}: idle at floor {}", elevator, monitor.state().current_floor));
                    return;
                }

                monitor.state_mut().direction = next;
                monitor.state_mut().status = ElevatorStatus::Move;
                let floor_time = monitor.state().timing.time_between_floors;
                self.send(Command::Motor { elevator: elevator.to_string(), action: next });
                self.watchdogs.arm(elevator, WatchdogKind::Move, floor_time);
            }
        }
    }

    /// Offers every pending trip to the elevator at `idx`. An empty queue takes the first,
    /// the rest must be en route.
    fn drain_pending_into(&mut self, idx: usize) {
        if self.pending_trips.is_empty() {
            return;
        }

        let monitor = &mut self.monitors[idx];
        let pending = std::mem::take(&mut self.pending_trips);
        for trip in pending {
            if monitor.add_trip_request(trip.clone()) {
                print::dispatch(format!("Pending trip {} assigned to {}", trip, monitor.name()));
            } else {
                self.pending_trips.push(trip);
            }
        }
    }

    fn on_destination_request(&mut self, elevator: &str, pickup_floor: u8, destination_floor: u8) {
        let idx = match self.active_monitor(elevator) {
            Some(idx) => idx,
            None => return,
        };

        match self.monitors[idx].add_destination(pickup_floor, destination_floor) {
            Ok(()) => {
                print::dispatch(format!("{}: destination {} from floor {}", elevator, destination_floor, pickup_floor));
                self.send(Command::Lamp {
                    target: Target::Elevator(elevator.to_string()),
                    kind: LampKind::Destination(destination_floor),
                    status: LampStatus::On,
                });
            }
            Err(e) => print::warn(format!("{}: destination request dropped: {}", elevator, e)),
        }
    }

    fn on_wait_complete(&mut self, elevator: &str) {
        let idx = match self.active_monitor(elevator) {
            Some(idx) => idx,
            None => return,
        };
        let monitor = &mut self.monitors[idx];

        if monitor.is_waiting_for_destination_request() {
            self.send(Command::Wait { elevator: elevator.to_string() });
            return;
        }

        if monitor.queue().is_empty() && monitor.state().current_floor == monitor.state().start_floor {
            monitor.state_mut().direction = Dirn::Stay;
            print::info(format!("{}: idle at start floor {}", elevator, monitor.state().start_floor));
            return;
        }

        // Remaining trips, or the way back to the start floor
        let door_time = monitor.state().timing.door_operation_time;
        self.send(Command::Door { elevator: elevator.to_string(), action: DoorStatus::Close });
        self.watchdogs.arm(elevator, WatchdogKind::CloseDoor, door_time);
    }

    fn on_watchdog_fired(&mut self, elevator: &str, kind: WatchdogKind, id: u64) {
        let idx = match self.active_monitor(elevator) {
            Some(idx) => idx,
            None => return,
        };
        let nominal = match self.watchdogs.confirm_fired(elevator, kind, id) {
            Some(nominal) => nominal,
            None => {
                print::info(format!("{}: stale {} watchdog #{} ignored", elevator, kind, id));
                return;
            }
        };

        match kind {
            WatchdogKind::Move => {
                print::err(format!("{}: no arrival in time, elevator is out of service", elevator));
                let monitor = &mut self.monitors[idx];
                monitor.state_mut().status = ElevatorStatus::OutOfService;
                let orphans = monitor.unassign_pending_trip_requests();
                if !monitor.queue().is_empty() {
                    print::warn(format!(
                        "{}: {} picked up trips abandoned in the car",
                        elevator,
                        monitor.queue().len()
                    ));
                }

                for trip in orphans {
                    print::dispatch(format!("Reassigning trip {} from {}", trip, elevator));
                    self.submit_trip(trip);
                }
            }
            WatchdogKind::OpenDoor | WatchdogKind::CloseDoor => {
                let action = match kind {
                    WatchdogKind::OpenDoor => DoorStatus::Open,
                    _ => DoorStatus::Close,
                };
                print::warn(format!("{}: door did not {} in time, retrying", elevator, action));
                self.send(Command::Door { elevator: elevator.to_string(), action });
                self.watchdogs.arm(elevator, kind, nominal);
            }
        }
    }

    /// Index of the monitor called `elevator`, if it exists and is in service.
    fn active_monitor(&self, elevator: &str) -> Option<usize> {
        let idx = match self.monitors.iter().position(|monitor| monitor.name() == elevator) {
            Some(idx) => idx,
            None => {
                print::warn(format!("Event for unknown elevator {} ignored", elevator));
                return None;
            }
        };

        if self.monitors[idx].state().is_out_of_service() {
            print::info(format!("{}: out of service, event ignored", elevator));
            return None;
        }
        Some(idx)
    }

    fn send(&self, command: Command) {
        if self.commands_tx.send(command).is_err() {
            print::err("Command channel closed, command dropped".to_string());
        }
    }

    fn publish_status(&self) {
        let snapshots = self.snapshots();
        print::status(&snapshots);
        print::status_json(&snapshots);
        if let Some(status_tx) = &self.status_tx {
            status_tx.send_replace(snapshots);
        }
    }
}

fn hall_lamp(floor: u8, direction: Dirn, status: LampStatus) -> Command {
    Command::Lamp { target: Target::Floor(floor), kind: LampKind::Hall(direction), status }
}
