//! ## Watchdogs guarding commanded actions
//!
//! Every command the dispatcher sends to an elevator (move one floor, open door, close door)
//! is guarded by a deadline. If the matching confirmation does not arrive within
//! `nominal duration * WATCHDOG_FACTOR`, an [`Event::WatchdogFired`] is injected into the
//! dispatcher's inbound queue. The timer task never touches elevator state itself.
//!
//! At most one watchdog is live per elevator. Arming a new one replaces the old one.
//!
//! Every armed watchdog gets a fresh id. A fault event is only acted upon if its id still
//! matches the live entry, see [`WatchdogRegistry::confirm_fired`], so a timer that fired at the
//! same time as the confirmation arrived is discarded.

use serde::{Serialize, Deserialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::config;
use crate::messages::Event;
use crate::model::DoorStatus;
use crate::print;

/// The confirmation a watchdog is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WatchdogKind {
    /// An arrival notice after a motor command.
    Move,
    /// A door-open confirmation.
    OpenDoor,
    /// A door-close confirmation.
    CloseDoor,
}

impl WatchdogKind {
    /// Watchdog kind guarding a door command with the given action.
    pub fn for_door(action: DoorStatus) -> Self {
        match action {
            DoorStatus::Open => WatchdogKind::OpenDoor,
            DoorStatus::Close => WatchdogKind::CloseDoor,
        }
    }
}

impl fmt::Display for WatchdogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchdogKind::Move => write!(f, "ELEVATOR_MOVE"),
            WatchdogKind::OpenDoor => write!(f, "ELEVATOR_OPEN_DOOR"),
            WatchdogKind::CloseDoor => write!(f, "ELEVATOR_CLOSE_DOOR"),
        }
    }
}

/// One live watchdog.
#[derive(Debug)]
struct WatchdogEntry {
    id: u64,
    kind: WatchdogKind,
    nominal: Duration,
    handle: JoinHandle<()>,
}

/// Keeps track of the live watchdog of every elevator.
#[derive(Debug)]
pub struct WatchdogRegistry {
    entries: HashMap<String, WatchdogEntry>,
    fault_tx: mpsc::Sender<Event>,
    next_id: u64,
}

impl WatchdogRegistry {
    /// Creates an empty registry. Fired watchdogs are sent on `fault_tx`,
    /// which should be a sender to the dispatcher's inbound queue.
    pub fn new(fault_tx: mpsc::Sender<Event>) -> Self {
        Self {
            entries: HashMap::new(),
            fault_tx,
            next_id: 1,
        }
    }

    /// Arms a watchdog for `elevator`, replacing any watchdog already live for it.
    ///
    /// ## Parameters
    /// - `elevator`: Name of the elevator.
    /// - `kind`: The confirmation that cancels this watchdog.
    /// - `nominal`: Nominal duration of the guarded operation.
    ///
    /// ## Returns
    /// - The id of the new watchdog.
    ///
    /// ## Note
    /// Must be called from within a tokio runtime, the timer runs as a spawned task.
    pub fn arm(&mut self, elevator: &str, kind: WatchdogKind, nominal: Duration) -> u64 {
        if let Some(old) = self.entries.remove(elevator) {
            old.handle.abort();
            print::warn(format!("{}: {} watchdog #{} replaced by {}", elevator, old.kind, old.id, kind));
        }

        let id = self.next_id;
        self.next_id += 1;

        let deadline = nominal.mul_f64(config::WATCHDOG_FACTOR);
        let fault_tx = self.fault_tx.clone();
        let name = elevator.to_string();
        let handle = tokio::spawn(async move {
            sleep(deadline).await;
            let _ = fault_tx.send(Event::WatchdogFired { elevator: name, kind, id }).await;
        });

        self.entries.insert(elevator.to_string(), WatchdogEntry { id, kind, nominal, handle });
        id
    }

    /// Cancels the live watchdog of `elevator` if it is of the given kind.
    ///
    /// Returns `true` if a watchdog was cancelled. Cancelling twice, or cancelling after the
    /// watchdog has fired and been handled, is a no-op.
    pub fn cancel(&mut self, elevator: &str, kind: WatchdogKind) -> bool {
        match self.entries.get(elevator) {
            Some(entry) if entry.kind == kind => {
                if let Some(entry) = self.entries.remove(elevator) {
                    entry.handle.abort();
                }
                true
            }
            _ => false,
        }
    }

    /// Checks a fired watchdog against the registry and removes it.
    ///
    /// ## Returns
    /// - `Some(nominal)` if the watchdog `id` is still the live one for `elevator`.
    ///   The nominal duration is returned so the same watchdog can be re-armed.
    /// - `None` if the watchdog was cancelled or replaced before its event was handled.
    pub fn confirm_fired(&mut self, elevator: &str, kind: WatchdogKind, id: u64) -> Option<Duration> {
        match self.entries.get(elevator) {
            Some(entry) if entry.id == id && entry.kind == kind => {
                self.entries.remove(elevator).map(|entry| entry.nominal)
            }
            _ => None,
        }
    }

    /// Kind of the live watchdog of `elevator`, if any.
    pub fn live(&self, elevator: &str) -> Option<WatchdogKind> {
        self.entries.get(elevator).map(|entry| entry.kind)
    }

    /// Number of live watchdogs.
    pub fn live_count(&self) -> usize {
        self.entries.len()
    }
}

impl Drop for WatchdogRegistry {
    fn drop(&mut self) {
        for (_, entry) in self.entries.drain() {
            entry.handle.abort();
        }
    }
}
