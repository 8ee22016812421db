//! External observation hook.
//!
//! The controller core depends on nothing outside itself for trace
//! recording, power estimation, or metrics export — those concerns
//! implement this one narrow trait and are handed to the controller at
//! construction. Every method has a no-op default, so an observer only
//! needs to implement the events it actually cares about.

use crate::common::{Bank, Command, Rank};
use crate::powerdown::RankPowerState;

/// External observer of controller pipeline events.
///
/// All methods take `&mut self` so an observer (a trace writer, a power
/// model accumulator) can maintain its own running state without
/// additional synchronization — the controller is single-threaded
/// cooperative, so there is never a concurrent call.
pub trait ControllerObserver: std::fmt::Debug {
    /// Called immediately after the controller issues `command`.
    fn on_command_issued(&mut self, _command: Command, _bank: Bank, _now: u64) {}

    /// Called when a request is accepted into a channel's scheduler
    /// queue.
    fn on_request_queued(&mut self, _request_id: u64, _now: u64) {}

    /// Called when a request's final response phase completes and it is
    /// released.
    fn on_request_completed(&mut self, _request_id: u64, _now: u64) {}

    /// Called when the refresh manager issues a refresh command.
    fn on_refresh_issued(&mut self, _command: Command, _rank: Rank, _now: u64) {}

    /// Called when a rank transitions power state.
    fn on_power_state_changed(&mut self, _rank: Rank, _new_state: RankPowerState, _now: u64) {}
}

/// An observer that discards every event; the default when no external
/// trace/power/metrics consumer is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl ControllerObserver for NullObserver {}
