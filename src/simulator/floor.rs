//! Simulated floor panel with waiting passengers.

use std::time::SystemTime;
use tokio::sync::mpsc;

use crate::messages::{Command, Event};
use crate::model::Dirn;
use crate::network::ActuatorLink;
use crate::print;

/// A person arriving at a floor who wants to go to `destination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Passenger {
    /// Floor the passenger wants to go to.
    pub destination: u8,
}

/// Sends a trip request for `pickup_floor` to the dispatcher.
pub async fn request_trip(events_tx: &mpsc::Sender<Event>, pickup_floor: u8, direction: Dirn) -> anyhow::Result<()> {
    events_tx
        .send(Event::TripRequest { pickup_floor, direction, timestamp: SystemTime::now() })
        .await
        .map_err(|_| anyhow::anyhow!("Dispatcher queue closed"))
}

/// Runs the simulated panel of `floor` until its command channel closes.
///
/// Every passenger received on `passengers` presses the direction button. When an elevator
/// reports its arrival going in a passenger's direction, the passenger boards and enters the
/// destination.
pub async fn run(floor: u8, mut link: ActuatorLink, mut passengers: mpsc::Receiver<Passenger>) {
    let mut waiting: Vec<(Dirn, u8)> = Vec::new();
    let mut passengers_open = true;

    loop {
        tokio::select! {
            passenger = passengers.recv(), if passengers_open => {
                let passenger = match passenger {
                    Some(passenger) => passenger,
                    None => {
                        passengers_open = false;
                        continue;
                    }
                };

                let direction = Dirn::towards(floor, passenger.destination);
                if direction == Dirn::Stay {
                    print::warn(format!("Floor-{}: passenger is already at floor {}", floor, passenger.destination));
                    continue;
                }
                waiting.push((direction, passenger.destination));
                print::elevator(format!("Floor-{}: passenger to floor {} presses {}", floor, passenger.destination, direction));
                if let Err(e) = request_trip(&link.events_tx, floor, direction).await {
                    print::err(format!("Floor-{}: {}", floor, e));
                    break;
                }
            }
            command = link.commands_rx.recv() => {
                match command {
                    Some(Command::ArrivalNotice { elevator, direction, .. }) => {
                        let (boarding, staying): (Vec<(Dirn, u8)>, Vec<(Dirn, u8)>) =
                            waiting.drain(..).partition(|(dirn, _)| *dirn == direction);
                        waiting = staying;

                        for (_, destination) in boarding {
                            print::elevator(format!("Floor-{}: passenger boards {} to floor {}", floor, elevator, destination));
                            let request = Event::DestinationRequest {
                                elevator: elevator.clone(),
                                pickup_floor: floor,
                                destination_floor: destination,
                            };
                            if link.events_tx.send(request).await.is_err() {
                                return;
                            }
                        }
                    }
                    Some(Command::Lamp { kind, status, .. }) => {
                        print::elevator(format!("Floor-{}: lamp {:?} {:?}", floor, kind, status));
                    }
                    Some(other) => print::warn(format!("Floor-{}: unexpected command {:?}", floor, other)),
                    None => break,
                }
            }
        }
    }
    print::info(format!("Floor-{}: simulator stopped", floor));
}
