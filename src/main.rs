use std::collections::HashMap;

use futures::future;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use elevatorpro_dispatch::dispatcher::Dispatcher;
use elevatorpro_dispatch::init::{self, LaunchOptions, Mode};
use elevatorpro_dispatch::network::{self, tcp_network};
use elevatorpro_dispatch::{config, print, simulator};


#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = init::parse_args();
    print::info(format!(
        "Starting in {:?} mode: {} elevators, {} floors",
        options.mode, options.num_elevators, options.num_floors
    ));

    match options.mode.clone() {
        Mode::Actuators(addr) => run_actuators(&options, &addr).await,
        Mode::Server | Mode::Sim => run_dispatcher(&options).await,
    }
}

/// Runs the dispatcher, with TCP actuators (`Mode::Server`) or an in-process building (`Mode::Sim`).
async fn run_dispatcher(options: &LaunchOptions) -> anyhow::Result<()> {
    /* START ----------- Channels ----------- */
    let (events_tx, events_rx) = mpsc::channel(config::INBOUND_QUEUE_CAPACITY);
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let (routes_tx, routes_rx) = mpsc::channel(config::ROUTE_CHANNEL_CAPACITY);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    /* END ------------- Channels ----------- */

    let dispatcher = Dispatcher::new(init::build_monitors(options), events_tx.clone(), commands_tx);
    let mut critical_tasks: Vec<JoinHandle<()>> = Vec::new();

    /* START ----------- Critical tasks ----------- */
    {
        let shutdown_rx = shutdown_rx.clone();
        critical_tasks.push(tokio::spawn(async move {
            dispatcher.run(events_rx, shutdown_rx).await;
        }));
    }
    {
        let shutdown_rx = shutdown_rx.clone();
        critical_tasks.push(tokio::spawn(async move {
            network::run_router(commands_rx, routes_rx, shutdown_rx).await;
        }));
    }

    if options.mode == Mode::Sim {
        let building = simulator::spawn_local_building(
            init::sim_elevators(options),
            options.num_floors,
            events_tx.clone(),
            &routes_tx,
        )
        .await?;
        critical_tasks.push(tokio::spawn(async move {
            if let Err(e) = simulator::demo_traffic(&building, config::SIM_PASSENGER_INTERVAL).await {
                print::err(format!("Passenger generator stopped: {:#}", e));
            }
        }));
    } else {
        let listener = tcp_network::bind(&options.listen_addr).await?;
        let events_tx = events_tx.clone();
        let routes_tx = routes_tx.clone();
        critical_tasks.push(tokio::spawn(async move {
            tcp_network::listener_task(listener, events_tx, routes_tx).await;
        }));
    }
    /* END ------------- Critical tasks ----------- */

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            print::info("Ctrl-C received, shutting down".to_string());
        }
        (result, idx, _) = future::select_all(critical_tasks.iter_mut()) => {
            print::err(format!("Critical task {} stopped: {:?}", idx, result));
        }
    }

    let _ = shutdown_tx.send(true);
    Ok(())
}

/// Runs a simulated building against a dispatcher at `addr`.
async fn run_actuators(options: &LaunchOptions, addr: &str) -> anyhow::Result<()> {
    let elevators = init::sim_elevators(options);

    let mut links = HashMap::new();
    for target in simulator::building_targets(&elevators, options.num_floors) {
        let link = tcp_network::connect_actuator_retrying(addr, target.clone()).await;
        links.insert(target, link);
    }
    let building = simulator::spawn_building(elevators, options.num_floors, links)?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            print::info("Ctrl-C received, shutting down".to_string());
            Ok(())
        }
        result = simulator::demo_traffic(&building, config::SIM_PASSENGER_INTERVAL) => result,
    }
}
