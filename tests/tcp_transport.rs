//! Actuator connected to the dispatcher side over a real TCP socket.

use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;

use elevatorpro_dispatch::messages::{Command, Event, Target};
use elevatorpro_dispatch::model::{Dirn, DoorStatus};
use elevatorpro_dispatch::network::{self, tcp_network};
use elevatorpro_dispatch::watchdog::WatchdogKind;

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn events_and_commands_cross_the_socket() {
    let listener = tcp_network::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr").to_string();

    let (events_tx, mut events_rx) = mpsc::channel(10);
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let (routes_tx, routes_rx) = mpsc::channel(10);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(tcp_network::listener_task(listener, events_tx, routes_tx));
    tokio::spawn(network::run_router(commands_rx, routes_rx, shutdown_rx));

    let target = Target::Elevator("Elevator-A".to_string());
    let mut link = tcp_network::connect_actuator(&addr, target).await.expect("connect");

    // Watchdog events are the dispatcher's own, the wire may not inject them
    link.events_tx
        .send(Event::WatchdogFired { elevator: "Elevator-A".to_string(), kind: WatchdogKind::Move, id: 1 })
        .await
        .expect("send");
    let door = Event::DoorStatus { elevator: "Elevator-A".to_string(), action: DoorStatus::Close };
    link.events_tx.send(door.clone()).await.expect("send");

    let received = timeout(WAIT, events_rx.recv()).await.expect("event in time");
    assert_eq!(received, Some(door));

    let motor = Command::Motor { elevator: "Elevator-A".to_string(), action: Dirn::Up };
    commands_tx.send(Command::Wait { elevator: "Elevator-B".to_string() }).expect("send");
    commands_tx.send(motor.clone()).expect("send");

    let received = timeout(WAIT, link.commands_rx.recv()).await.expect("command in time");
    assert_eq!(received, Some(motor));
}

#[tokio::test]
async fn unreachable_dispatcher_is_an_error() {
    let listener = tcp_network::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr").to_string();
    drop(listener);

    assert!(tcp_network::connect_actuator(&addr, Target::Floor(0)).await.is_err());
}
