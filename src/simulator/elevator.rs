//! Simulated elevator car.
//!
//! Echoes every command with the matching confirmation after the nominal operation time,
//! and sends exactly one arrival notice per floor travelled.

use tokio::time::sleep;

use crate::messages::{Command, Event};
use crate::model::{Dirn, ElevatorTiming};
use crate::network::ActuatorLink;
use crate::print;

/// Faults a simulated elevator can be started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimFault {
    /// Motor commands are ignored, the car never moves.
    StuckMotor,
    /// Door commands are ignored, the door never confirms.
    StuckDoor,
}

/// Runs the simulated elevator `name` until its command channel closes.
///
/// ## Parameters
/// - `name`: Elevator name, must match the dispatcher's monitor.
/// - `start_floor`: Floor the car is standing at.
/// - `timing`: Operation times to simulate.
/// - `link`: Connection to the dispatcher.
/// - `fault`: Optional injected fault.
pub async fn run(name: String, start_floor: u8, timing: ElevatorTiming, mut link: ActuatorLink, fault: Option<SimFault>) {
    let mut floor = start_floor;

    while let Some(command) = link.commands_rx.recv().await {
        let reply = match command {
            Command::Door { action, .. } => {
                if fault == Some(SimFault::StuckDoor) {
                    print::elevator(format!("{}: door stuck, ignoring {}", name, action));
                    continue;
                }
                sleep(timing.door_operation_time).await;
                print::elevator(format!("{}: door {} at floor {}", name, action, floor));
                Event::DoorStatus { elevator: name.clone(), action }
            }
            Command::Motor { action, .. } => {
                if fault == Some(SimFault::StuckMotor) {
                    print::elevator(format!("{}: motor stuck, ignoring {}", name, action));
                    continue;
                }
                if !send(&link, Event::MotorStatus { elevator: name.clone(), action }).await {
                    break;
                }
                if action == Dirn::Stay {
                    continue;
                }

                sleep(timing.time_between_floors).await;
                floor = action.step(floor);
                print::elevator(format!("{}: arrived at floor {} going {}", name, floor, action));
                Event::ArrivalNotice { elevator: name.clone(), floor, direction: action }
            }
            Command::Wait { .. } => {
                sleep(timing.passenger_wait_time).await;
                Event::WaitComplete { elevator: name.clone() }
            }
            Command::Lamp { kind, status, .. } => {
                print::elevator(format!("{}: lamp {:?} {:?}", name, kind, status));
                continue;
            }
            Command::ArrivalNotice { floor, .. } => {
                print::warn(format!("{}: arrival notice for floor {} routed to a car", name, floor));
                continue;
            }
        };

        if !send(&link, reply).await {
            break;
        }
    }
    print::info(format!("{}: simulator stopped", name));
}

async fn send(link: &ActuatorLink, event: Event) -> bool {
    link.events_tx.send(event).await.is_ok()
}
