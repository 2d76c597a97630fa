//! Dispatcher, router and simulated building in one runtime, with paused time.

use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;

use elevatorpro_dispatch::config;
use elevatorpro_dispatch::dispatcher::Dispatcher;
use elevatorpro_dispatch::model::{Dirn, ElevatorState, ElevatorStatus, ElevatorTiming};
use elevatorpro_dispatch::monitor::{ElevatorMonitor, MonitorSnapshot};
use elevatorpro_dispatch::network;
use elevatorpro_dispatch::simulator::elevator::SimFault;
use elevatorpro_dispatch::simulator::{self, Building, SimElevator};

const NUM_FLOORS: u8 = 6;

struct Running {
    building: Building,
    status_rx: watch::Receiver<Vec<MonitorSnapshot>>,
    _shutdown_tx: watch::Sender<bool>,
}

async fn start(elevators: Vec<SimElevator>) -> Running {
    let monitors = elevators
        .iter()
        .map(|sim| ElevatorMonitor::new(sim.name.clone(), ElevatorState::new(sim.start_floor, ElevatorTiming::default())))
        .collect();

    let (events_tx, events_rx) = mpsc::channel(config::INBOUND_QUEUE_CAPACITY);
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let (routes_tx, routes_rx) = mpsc::channel(config::ROUTE_CHANNEL_CAPACITY);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (status_tx, status_rx) = watch::channel(Vec::new());

    let dispatcher = Dispatcher::new(monitors, events_tx.clone(), commands_tx).with_status_watch(status_tx);
    tokio::spawn(dispatcher.run(events_rx, shutdown_rx.clone()));
    tokio::spawn(network::run_router(commands_rx, routes_rx, shutdown_rx));

    let building = simulator::spawn_local_building(elevators, NUM_FLOORS, events_tx, &routes_tx)
        .await
        .expect("building");

    Running { building, status_rx, _shutdown_tx: shutdown_tx }
}

/// Waits until `done` holds for a published status, or panics after a minute of simulated time.
async fn wait_for<F>(status_rx: &mut watch::Receiver<Vec<MonitorSnapshot>>, what: &str, mut done: F) -> Vec<MonitorSnapshot>
where
    F: FnMut(&[MonitorSnapshot]) -> bool,
{
    let result = timeout(Duration::from_secs(60), async {
        loop {
            {
                let status = status_rx.borrow_and_update();
                if done(&status) {
                    return status.clone();
                }
            }
            status_rx.changed().await.expect("dispatcher stopped");
        }
    })
    .await;

    match result {
        Ok(status) => status,
        Err(_) => panic!("timed out waiting for {}: {:?}", what, status_rx.borrow()),
    }
}

fn find<'a>(status: &'a [MonitorSnapshot], name: &str) -> &'a MonitorSnapshot {
    status.iter().find(|snapshot| snapshot.name == name).expect("known elevator")
}

fn parked_at_start(snapshot: &MonitorSnapshot) -> bool {
    snapshot.queue_len == 0 && snapshot.current_floor == 0 && snapshot.direction == Dirn::Stay
}

#[tokio::test(start_paused = true)]
async fn passenger_is_carried_and_elevator_returns() {
    let mut running = start(vec![SimElevator::new("Elevator-A", 0), SimElevator::new("Elevator-B", 0)]).await;
    running.building.add_passenger(3, 5).await.expect("passenger");

    wait_for(&mut running.status_rx, "trip assignment", |status| find(status, "Elevator-A").queue_len == 1).await;
    wait_for(&mut running.status_rx, "destination", |status| {
        find(status, "Elevator-A").destination_floors.contains(&5)
    })
    .await;
    wait_for(&mut running.status_rx, "delivery at floor 5", |status| {
        let a = find(status, "Elevator-A");
        a.queue_len == 0 && a.current_floor == 5
    })
    .await;

    let status = wait_for(&mut running.status_rx, "return to start floor", |status| status.iter().all(parked_at_start)).await;
    assert!(status.iter().all(|snapshot| snapshot.status == ElevatorStatus::Stop));
}

#[tokio::test(start_paused = true)]
async fn stuck_motor_hands_trip_to_other_elevator() {
    let mut faulty = SimElevator::new("Elevator-A", 0);
    faulty.fault = Some(SimFault::StuckMotor);
    let mut running = start(vec![faulty, SimElevator::new("Elevator-B", 0)]).await;
    running.building.add_passenger(3, 5).await.expect("passenger");

    wait_for(&mut running.status_rx, "reassignment", |status| {
        find(status, "Elevator-A").status == ElevatorStatus::OutOfService && find(status, "Elevator-B").queue_len == 1
    })
    .await;
    wait_for(&mut running.status_rx, "destination on B", |status| {
        find(status, "Elevator-B").destination_floors.contains(&5)
    })
    .await;

    let status = wait_for(&mut running.status_rx, "B back home", |status| parked_at_start(find(status, "Elevator-B"))).await;
    let a = find(&status, "Elevator-A");
    assert_eq!(a.status, ElevatorStatus::OutOfService);
    assert_eq!(a.queue_len, 0);
}
