//! Trip: a pickup request with a destination that becomes known later.

use serde::{Serialize, Deserialize};
use std::fmt;

use super::Dirn;

/// One passenger movement request.
///
/// The pickup floor and direction never change after creation.
/// The destination is set exactly once, after the elevator has stopped for pickup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    id: u64,
    pickup_floor: u8,
    direction: Dirn,
    destination_floor: Option<u8>,
}

impl Trip {
    /// Creates a trip from a floor request.
    ///
    /// ## Parameters
    /// - `id`: Unique trip id, assigned by the dispatcher.
    /// - `pickup_floor`: Floor the request was made on.
    /// - `direction`: Requested direction, [Dirn::Up] or [Dirn::Down].
    pub fn new(id: u64, pickup_floor: u8, direction: Dirn) -> Self {
        Self {
            id,
            pickup_floor,
            direction,
            destination_floor: None,
        }
    }

    /// Creates a trip where the destination is already known. The direction is inferred:
    /// [Dirn::Up] if the destination is above the pickup, [Dirn::Down] otherwise.
    pub fn with_destination(id: u64, pickup_floor: u8, destination_floor: u8) -> Self {
        let direction = if destination_floor > pickup_floor { Dirn::Up } else { Dirn::Down };
        Self {
            id,
            pickup_floor,
            direction,
            destination_floor: Some(destination_floor),
        }
    }

    #[allow(missing_docs)]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[allow(missing_docs)]
    pub fn pickup_floor(&self) -> u8 {
        self.pickup_floor
    }

    #[allow(missing_docs)]
    pub fn direction(&self) -> Dirn {
        self.direction
    }

    #[allow(missing_docs)]
    pub fn destination_floor(&self) -> Option<u8> {
        self.destination_floor
    }

    /// Sets the destination. Returns `false` if a destination was already set.
    pub fn set_destination(&mut self, destination_floor: u8) -> bool {
        if self.destination_floor.is_some() {
            return false;
        }
        self.destination_floor = Some(destination_floor);
        true
    }
}

impl fmt::Display for Trip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.destination_floor {
            Some(dest) => write!(f, "trip #{} ({} {} -> {})", self.id, self.direction, self.pickup_floor, dest),
            None => write!(f, "trip #{} ({} from {})", self.id, self.direction, self.pickup_floor),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_is_set_only_once() {
        let mut trip = Trip::new(1, 2, Dirn::Up);
        assert_eq!(trip.destination_floor(), None);
        assert!(trip.set_destination(7));
        assert!(!trip.set_destination(9));
        assert_eq!(trip.destination_floor(), Some(7));
        assert_eq!(trip.direction(), Dirn::Up);
    }

    #[test]
    fn direction_is_inferred_from_destination() {
        assert_eq!(Trip::with_destination(1, 2, 7).direction(), Dirn::Up);
        assert_eq!(Trip::with_destination(2, 7, 2).direction(), Dirn::Down);
        // Same floor is not "above", so it counts as down
        assert_eq!(Trip::with_destination(3, 4, 4).direction(), Dirn::Down);
    }
}
