//! Stateless floor-scan helpers used by the monitor.
//!
//! Every function here works on a snapshot (current floor, committed direction, scheduled
//! floors) and returns a plain value, so the rules can be tested in isolation.

use std::collections::BTreeSet;

use crate::model::Dirn;

/// Counts the scheduled floors the elevator stops at before reaching `pickup_floor`.
///
/// - [Dirn::Up]: floors above `current_floor` and below `pickup_floor`.
/// - [Dirn::Down]: floors below `current_floor` down to and including `pickup_floor`.
/// - [Dirn::Stay]: no interim stops.
///
/// The two directions are not mirror images: going down, the pickup floor itself
/// is counted if it is already scheduled.
pub fn interim_stops<'a, I>(scheduled: I, current_floor: u8, pickup_floor: u8, queue_direction: Dirn) -> usize
where
    I: IntoIterator<Item = &'a u8>,
{
    scheduled
        .into_iter()
        .filter(|&&floor| match queue_direction {
            Dirn::Up => floor > current_floor && floor < pickup_floor,
            Dirn::Down => floor < current_floor && floor >= pickup_floor,
            Dirn::Stay => false,
        })
        .count()
}

/// `true` if the elevator has already passed `floor` when travelling in `direction`.
pub fn has_passed(current_floor: u8, floor: u8, direction: Dirn) -> bool {
    match direction {
        Dirn::Up => current_floor > floor,
        Dirn::Down => current_floor < floor,
        Dirn::Stay => false,
    }
}

/// `true` if `floor` lies strictly ahead of `current_floor` in `direction`.
pub fn is_ahead(current_floor: u8, floor: u8, direction: Dirn) -> bool {
    match direction {
        Dirn::Up => floor > current_floor,
        Dirn::Down => floor < current_floor,
        Dirn::Stay => false,
    }
}

/// Chooses the direction that first brings the elevator into the span of scheduled floors,
/// before it starts serving them in `queue_direction`.
///
/// - Committed up: go down while above the lowest scheduled floor, otherwise up.
/// - Committed down: go up while below the highest scheduled floor, otherwise down.
///
/// Returns `None` if nothing is scheduled.
pub fn direction_into_span(pickup_floors: &BTreeSet<u8>, destination_floors: &BTreeSet<u8>, current_floor: u8, queue_direction: Dirn) -> Option<Dirn> {
    let lowest = pickup_floors.iter().chain(destination_floors.iter()).min()?;
    let highest = pickup_floors.iter().chain(destination_floors.iter()).max()?;

    match queue_direction {
        Dirn::Up => Some(if current_floor > *lowest { Dirn::Down } else { Dirn::Up }),
        Dirn::Down => Some(if current_floor < *highest { Dirn::Up } else { Dirn::Down }),
        Dirn::Stay => Some(Dirn::Stay),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn set(floors: &[u8]) -> BTreeSet<u8> {
        floors.iter().copied().collect()
    }

    #[test]
    fn interim_stops_up_excludes_both_ends() {
        let scheduled = set(&[3, 4, 6, 8]);
        assert_eq!(interim_stops(&scheduled, 3, 8, Dirn::Up), 2);
    }

    #[test]
    fn interim_stops_down_includes_pickup() {
        let scheduled = set(&[1, 2, 5, 7]);
        assert_eq!(interim_stops(&scheduled, 7, 2, Dirn::Down), 2);
        assert_eq!(interim_stops(&scheduled, 7, 3, Dirn::Down), 1);
    }

    #[test]
    fn passed_and_ahead() {
        assert!(has_passed(5, 3, Dirn::Up));
        assert!(!has_passed(5, 3, Dirn::Down));
        assert!(is_ahead(5, 3, Dirn::Down));
        assert!(!is_ahead(5, 5, Dirn::Up));
        assert!(!is_ahead(5, 9, Dirn::Stay));
    }

    #[test]
    fn span_direction_goes_to_lowest_floor_first_when_committed_up() {
        let pickups = set(&[5]);
        let dests = set(&[8]);
        assert_eq!(direction_into_span(&pickups, &dests, 4, Dirn::Up), Some(Dirn::Up));
        assert_eq!(direction_into_span(&pickups, &dests, 6, Dirn::Up), Some(Dirn::Down));
        assert_eq!(direction_into_span(&pickups, &dests, 5, Dirn::Up), Some(Dirn::Up));
    }

    #[test]
    fn span_direction_goes_to_highest_floor_first_when_committed_down() {
        let pickups = set(&[6]);
        let dests = set(&[]);
        assert_eq!(direction_into_span(&pickups, &dests, 0, Dirn::Down), Some(Dirn::Up));
        assert_eq!(direction_into_span(&pickups, &dests, 6, Dirn::Down), Some(Dirn::Down));
        assert_eq!(direction_into_span(&set(&[]), &dests, 6, Dirn::Down), None);
    }
}
