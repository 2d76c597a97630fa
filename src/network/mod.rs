//! ## Network module
//!
//! This module moves messages between the dispatcher and the actuators (elevator cars and
//! floor panels). The dispatcher itself never knows where an actuator lives: it pushes
//! [`Command`]s on one channel, and the [router](run_router) forwards each command to the
//! actuator named by [`Command::target`].
//!
//! ## Sub-modules
//! - [tcp_network]: actuators connected over TCP.
//!
//! ## Key Features
//! - One uniform handle, [`ActuatorLink`], for in-process and TCP actuators.
//! - Actuators register a [`Route`] for their [`Target`]; re-registering replaces the old route.
//! - Every registered actuator gets its commands in order and without loss. Per-actuator
//!   channels are unbounded, so a slow actuator never stalls the router.
//! - Commands for unknown or disconnected targets are logged and dropped. The dispatcher's
//!   watchdogs notice the missing confirmation.

pub mod tcp_network;

use std::collections::HashMap;
use tokio::sync::{mpsc, watch};

use crate::messages::{Command, Event, Target};
use crate::print;

/// Registration of an actuator at the router.
#[derive(Debug)]
pub struct Route {
    /// The actuator commands are routed to.
    pub target: Target,
    /// Where the router delivers the actuator's commands.
    pub tx: mpsc::UnboundedSender<Command>,
}

/// Everything an actuator needs to talk to the dispatcher.
#[derive(Debug)]
pub struct ActuatorLink {
    /// Sender to the dispatcher's inbound queue (directly, or through a TCP connection).
    pub events_tx: mpsc::Sender<Event>,
    /// Commands routed to this actuator.
    pub commands_rx: mpsc::UnboundedReceiver<Command>,
}

/// Wires an in-process actuator.
///
/// ## Returns
/// - The [`Route`] to register at the router.
/// - The [`ActuatorLink`] to hand to the actuator.
pub fn local_link(target: Target, events_tx: mpsc::Sender<Event>) -> (Route, ActuatorLink) {
    let (tx, commands_rx) = mpsc::unbounded_channel();
    (Route { target, tx }, ActuatorLink { events_tx, commands_rx })
}

/// Forwards dispatcher commands to registered actuators.
///
/// ## Parameters
/// - `commands_rx`: Outbound commands from the dispatcher.
/// - `routes_rx`: Actuator registrations.
/// - `shutdown_rx`: Stops the router when changed.
///
/// ## Behavior
/// Registrations are handled before commands, so an actuator that registers and then
/// triggers a command is always reachable. Commands queue up for an actuator that is not
/// reading yet, the router never waits on a slow actuator.
pub async fn run_router(
    mut commands_rx: mpsc::UnboundedReceiver<Command>,
    mut routes_rx: mpsc::Receiver<Route>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut routes: HashMap<Target, mpsc::UnboundedSender<Command>> = HashMap::new();
    let mut accepting_routes = true;

    loop {
        tokio::select! {
            biased;
            route = routes_rx.recv(), if accepting_routes => {
                match route {
                    Some(Route { target, tx }) => {
                        if routes.insert(target.clone(), tx).is_some() {
                            print::info(format!("{} registered again, old route replaced", target));
                        } else {
                            print::ok(format!("{} registered", target));
                        }
                    }
                    None => accepting_routes = false,
                }
            }
            _ = shutdown_rx.changed() => {
                print::info("Router shutting down".to_string());
                break;
            }
            command = commands_rx.recv() => {
                match command {
                    Some(command) => forward(&mut routes, command),
                    None => {
                        print::warn("Command channel closed, router stops".to_string());
                        break;
                    }
                }
            }
        }
    }
}

fn forward(routes: &mut HashMap<Target, mpsc::UnboundedSender<Command>>, command: Command) {
    let target = command.target();
    let tx = match routes.get(&target) {
        Some(tx) => tx,
        None => {
            print::warn(format!("No route to {}, dropping {:?}", target, command));
            return;
        }
    };

    if let Err(e) = tx.send(command) {
        print::warn(format!("{} disconnected, dropping {:?} and removing route", target, e.0));
        routes.remove(&target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dirn, DoorStatus};
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn commands_reach_their_target_only() {
        let (events_tx, _events_rx) = mpsc::channel(10);
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (routes_tx, routes_rx) = mpsc::channel(10);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let (route_a, mut link_a) = local_link(Target::Elevator("Elevator-A".to_string()), events_tx.clone());
        let (route_floor, mut link_floor) = local_link(Target::Floor(2), events_tx);
        routes_tx.send(route_a).await.expect("route");
        routes_tx.send(route_floor).await.expect("route");
        tokio::spawn(run_router(commands_rx, routes_rx, shutdown_rx));

        let door = Command::Door { elevator: "Elevator-A".to_string(), action: DoorStatus::Open };
        let arrival = Command::ArrivalNotice { floor: 2, elevator: "Elevator-A".to_string(), direction: Dirn::Up };
        commands_tx.send(door.clone()).expect("send");
        commands_tx.send(arrival.clone()).expect("send");

        assert_eq!(link_a.commands_rx.recv().await, Some(door));
        assert_eq!(link_floor.commands_rx.recv().await, Some(arrival));
        assert!(timeout(Duration::from_millis(50), link_a.commands_rx.recv()).await.is_err());
    }

    #[test]
    fn closed_route_is_removed() {
        let mut routes = HashMap::new();
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        routes.insert(Target::Floor(1), tx);

        forward(&mut routes, Command::ArrivalNotice { floor: 1, elevator: "Elevator-B".to_string(), direction: Dirn::Down });
        assert!(routes.is_empty());
    }

    #[tokio::test]
    async fn backlog_for_a_busy_actuator_is_kept_in_order() {
        let (events_tx, _events_rx) = mpsc::channel(10);
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (routes_tx, routes_rx) = mpsc::channel(10);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let (route, mut link) = local_link(Target::Elevator("Elevator-A".to_string()), events_tx);
        routes_tx.send(route).await.expect("route");
        tokio::spawn(run_router(commands_rx, routes_rx, shutdown_rx));

        // The car is busy and reads nothing until the whole backlog is routed
        let backlog = crate::config::ACTUATOR_CHANNEL_CAPACITY * 3;
        for _ in 0..backlog {
            commands_tx.send(Command::Motor { elevator: "Elevator-A".to_string(), action: Dirn::Up }).expect("send");
        }
        commands_tx.send(Command::Wait { elevator: "Elevator-A".to_string() }).expect("send");
        tokio::time::sleep(Duration::from_millis(50)).await;

        for _ in 0..backlog {
            assert_eq!(
                link.commands_rx.recv().await,
                Some(Command::Motor { elevator: "Elevator-A".to_string(), action: Dirn::Up })
            );
        }
        assert_eq!(link.commands_rx.recv().await, Some(Command::Wait { elevator: "Elevator-A".to_string() }));
    }
}
