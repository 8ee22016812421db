//! Per-channel request scheduling.
//!
//! A scheduler owns the pending-request queue for one channel and answers
//! the questions a bank machine's `evaluate()` needs to pick its next
//! command: is there a request for this bank, would a further row hit
//! follow it, is there any other pending request for this bank at all.
//!
//! Bank machines never hold a scheduler reference as a field — the
//! controller loop passes `&dyn Scheduler` into `evaluate()` on every
//! call, the same way the host's top-level `Simulator` keeps its CPU and
//! pipeline dispatcher as sibling fields rather than threading a
//! back-reference between them, to avoid a borrow-splitting cycle. See
//! `crate::bank`.

mod fifo;
mod fr_fcfs;
mod fr_fcfs_grp;

pub use fifo::FifoScheduler;
pub use fr_fcfs::FrFcfsScheduler;
pub use fr_fcfs_grp::FrFcfsGrpScheduler;

use crate::common::{Bank, Row};
use crate::request::{Direction, Request};

/// Scheduling policy surface a bank machine queries once per evaluation.
///
/// Implementations own the channel's request queue; `store_request` and
/// `remove_request` are the only mutating operations, both driven by the
/// controller loop (ingress and retirement respectively).
pub trait Scheduler: std::fmt::Debug {
    /// Reports whether the queue has room for one more incoming request.
    #[must_use]
    fn has_buffer_space(&self) -> bool;

    /// Enqueues a request that has just been accepted from the arbiter.
    fn store_request(&mut self, request: Request);

    /// Removes a request once its final command has retired it, by id.
    fn remove_request(&mut self, request_id: u64);

    /// Returns the request, if any, that `bank` should attempt next.
    ///
    /// `keep_trans` mirrors the bank machine's own `keep_trans` flag: when
    /// set, the scheduler is expected (but not required) to keep returning
    /// the same in-flight request until it retires, since the bank machine
    /// will only adopt a different request if it targets the currently
    /// open row.
    #[must_use]
    fn get_next_request(&self, bank: Bank, open_row: Row, keep_trans: bool) -> Option<Request>;

    /// Reports whether another pending request for `bank` would hit
    /// `row`, other than the one a bank machine is currently holding.
    #[must_use]
    fn has_further_row_hit(&self, bank: Bank, row: Row, direction: Direction) -> bool;

    /// Reports whether `bank` has any further pending request in
    /// `direction` at all.
    #[must_use]
    fn has_further_request(&self, bank: Bank, direction: Direction) -> bool;

    /// Per-sub-queue occupancy, reported to observers.
    #[must_use]
    fn get_buffer_depth(&self) -> Vec<u32>;
}
