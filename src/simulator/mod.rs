//! ## Simulator
//!
//! Stand-ins for the physical actuators, used by the `sim` and `actuators` launch modes and
//! by the end-to-end tests.
//!
//! ## Sub-modules
//! - [elevator]: a car that confirms door, motor and wait commands after the nominal time.
//! - [floor]: a floor panel where passengers request trips and board arriving cars.
//!
//! Both only talk through an [`ActuatorLink`], so they run the same in-process and over TCP.

pub mod elevator;
pub mod floor;

use anyhow::Context;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::config;
use crate::messages::{Event, Target};
use crate::model::ElevatorTiming;
use crate::network::{self, ActuatorLink, Route};
use crate::print;
use elevator::SimFault;
use floor::Passenger;

/// Description of one simulated elevator.
#[derive(Debug, Clone)]
pub struct SimElevator {
    /// Name, must match the dispatcher's monitor.
    pub name: String,
    /// Floor the car starts at.
    pub start_floor: u8,
    /// Operation times to simulate.
    pub timing: ElevatorTiming,
    /// Optional injected fault.
    pub fault: Option<SimFault>,
}

impl SimElevator {
    /// A healthy elevator with default timing.
    pub fn new(name: impl Into<String>, start_floor: u8) -> Self {
        Self {
            name: name.into(),
            start_floor,
            timing: ElevatorTiming::default(),
            fault: None,
        }
    }
}

/// Handles to a running simulated building.
#[derive(Debug)]
pub struct Building {
    /// One task per simulated actuator.
    pub handles: Vec<JoinHandle<()>>,
    passenger_txs: HashMap<u8, mpsc::Sender<Passenger>>,
}

impl Building {
    /// Lets a passenger arrive at `floor`, heading for `destination`.
    pub async fn add_passenger(&self, floor: u8, destination: u8) -> anyhow::Result<()> {
        let tx = self
            .passenger_txs
            .get(&floor)
            .with_context(|| format!("Floor {} is not part of the building", floor))?;
        tx.send(Passenger { destination })
            .await
            .map_err(|_| anyhow::anyhow!("Floor {} simulator has stopped", floor))
    }

    /// Number of simulated floors.
    pub fn num_floors(&self) -> u8 {
        self.passenger_txs.len() as u8
    }
}

/// Every actuator target of a building, elevators first.
pub fn building_targets(elevators: &[SimElevator], num_floors: u8) -> Vec<Target> {
    elevators
        .iter()
        .map(|elevator| Target::Elevator(elevator.name.clone()))
        .chain((0..num_floors).map(Target::Floor))
        .collect()
}

/// Spawns one task per elevator and floor.
///
/// ## Parameters
/// - `elevators`: Simulated cars.
/// - `num_floors`: Floors `0..num_floors` get a panel.
/// - `links`: One link per target of [building_targets].
///
/// ## Returns
/// The running [Building], or an error if a link is missing.
pub fn spawn_building(elevators: Vec<SimElevator>, num_floors: u8, mut links: HashMap<Target, ActuatorLink>) -> anyhow::Result<Building> {
    let mut handles = Vec::new();
    let mut passenger_txs = HashMap::new();

    for elevator in elevators {
        let link = links
            .remove(&Target::Elevator(elevator.name.clone()))
            .with_context(|| format!("No link for {}", elevator.name))?;
        handles.push(tokio::spawn(elevator::run(
            elevator.name,
            elevator.start_floor,
            elevator.timing,
            link,
            elevator.fault,
        )));
    }

    for floor_no in 0..num_floors {
        let link = links
            .remove(&Target::Floor(floor_no))
            .with_context(|| format!("No link for floor {}", floor_no))?;
        let (tx, rx) = mpsc::channel(config::ACTUATOR_CHANNEL_CAPACITY);
        passenger_txs.insert(floor_no, tx);
        handles.push(tokio::spawn(floor::run(floor_no, link, rx)));
    }

    Ok(Building { handles, passenger_txs })
}

/// Spawns a building whose actuators live in this process.
///
/// Every actuator is registered at the router through `routes_tx` before this returns.
pub async fn spawn_local_building(
    elevators: Vec<SimElevator>,
    num_floors: u8,
    events_tx: mpsc::Sender<Event>,
    routes_tx: &mpsc::Sender<Route>,
) -> anyhow::Result<Building> {
    let mut links = HashMap::new();
    for target in building_targets(&elevators, num_floors) {
        let (route, link) = network::local_link(target.clone(), events_tx.clone());
        routes_tx.send(route).await.map_err(|_| anyhow::anyhow!("Router is gone"))?;
        links.insert(target, link);
    }
    spawn_building(elevators, num_floors, links)
}

/// Generates a fixed, repeating stream of passengers, one every `interval`.
///
/// The sequence walks the building so that both directions and every floor get traffic.
pub async fn demo_traffic(building: &Building, interval: Duration) -> anyhow::Result<()> {
    let num_floors = building.num_floors();
    if num_floors < 2 {
        print::warn("Demo traffic needs at least two floors".to_string());
        return Ok(());
    }

    let mut step: u32 = 0;
    loop {
        let from = ((step * 3) % num_floors as u32) as u8;
        let to = ((step * 7 + 1) % num_floors as u32) as u8;
        step = step.wrapping_add(1);
        if from == to {
            continue;
        }

        building.add_passenger(from, to).await?;
        sleep(interval).await;
    }
}
