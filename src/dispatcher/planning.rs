//! Elevator selection for new trip requests.
//!
//! Every monitor is asked for a pickup estimate. Elevators that are already working
//! (their next move is not [`Dirn::Stay`]) are preferred over idle ones, so idle elevators are
//! only woken up when no busy elevator can take the trip on its way.

use std::time::Duration;

use crate::model::trip::Trip;
use crate::model::Dirn;
use crate::monitor::ElevatorMonitor;

/// Category of a candidate. Ordered so that `Busy` wins over `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Availability {
    Idle,
    Busy,
}

fn availability(monitor: &ElevatorMonitor) -> Availability {
    if monitor.next_elevator_direction() == Dirn::Stay {
        Availability::Idle
    } else {
        Availability::Busy
    }
}

/// Picks the monitor that should serve `trip`.
///
/// ## Returns
/// - Index into `monitors` of the chosen elevator.
/// - `None` if no elevator can take the trip right now.
///
/// ## Rules
/// - Elevators without an estimate are skipped.
/// - A busy elevator beats an idle one regardless of estimate.
/// - Within the same category the lowest estimate wins, ties go to the earlier monitor.
pub fn select_elevator(monitors: &[ElevatorMonitor], trip: &Trip) -> Option<usize> {
    let mut best: Option<(usize, Availability, Duration)> = None;

    for (idx, monitor) in monitors.iter().enumerate() {
        let estimate = match monitor.estimate_pickup_time(trip) {
            Some(estimate) => estimate,
            None => continue,
        };
        let category = availability(monitor);

        let better = match best {
            None => true,
            Some((_, best_category, best_estimate)) => {
                category > best_category || (category == best_category && estimate < best_estimate)
            }
        };
        if better {
            best = Some((idx, category, estimate));
        }
    }

    best.map(|(idx, _, _)| idx)
}
