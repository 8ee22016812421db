//! Initiator-side arbiter: routes requests from N initiator threads into
//! the channel pipeline and re-sequences their responses.
//!
//! All three variants ([`ArbiterKind::Simple`], [`ArbiterKind::Fifo`],
//! [`ArbiterKind::Reorder`]) share one port surface and the same
//! response-ordering mechanism (see [`ReorderBuffer`]); they differ only
//! in how many transactions a thread may have outstanding at once.
//! [`Arbiter`] is deliberately a single struct rather than one type per
//! variant, mirroring [`crate::bank::BankMachine`]'s page-policy enum: the
//! admission rule is the only thing that varies, so a `match` on
//! `ArbiterKind` inside one `admit` reads more plainly than three nearly
//! identical trait impls.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::trace;

pub use crate::config::ArbiterKind;
use crate::common::Thread;
use crate::request::Request;

/// Per-thread bookkeeping that lets responses be released in arrival
/// order even when the channel completes them out of order.
///
/// `outstanding` is the arrival-ordered queue of admitted ids;
/// `completed` is the set of ids the channel has already finished but
/// that have not yet reached the head of their thread's queue. This is
/// the mechanism both the FIFO and Reorder arbiter variants use: FIFO
/// additionally restricts *admission* to arrival order (via
/// `max_active_transactions`), while Reorder tracks ids individually and
/// lets the channel dispatch them in any order — but both resequence
/// completions identically, so the buffer is shared code rather than
/// duplicated per variant.
#[derive(Debug, Clone, Default)]
struct ReorderBuffer {
    outstanding: HashMap<Thread, VecDeque<u64>>,
    completed: HashMap<Thread, HashSet<u64>>,
}

impl ReorderBuffer {
    fn outstanding_count(&self, thread: Thread) -> usize {
        self.outstanding.get(&thread).map_or(0, VecDeque::len)
    }

    fn admit(&mut self, thread: Thread, request_id: u64) {
        self.outstanding.entry(thread).or_default().push_back(request_id);
    }

    /// Records that `request_id` has completed, and returns the ids (in
    /// order) newly eligible for release: `request_id` itself if it was
    /// the head of its thread's queue, plus any ids behind it that had
    /// already completed and were only waiting on it.
    fn complete(&mut self, thread: Thread, request_id: u64) -> Vec<u64> {
        self.completed.entry(thread).or_default().insert(request_id);

        let mut ready = Vec::new();
        let Some(queue) = self.outstanding.get_mut(&thread) else {
            return ready;
        };
        let done = self.completed.entry(thread).or_default();
        while let Some(&front) = queue.front() {
            if !done.remove(&front) {
                break;
            }
            ready.push(front);
            let _ = queue.pop_front();
        }
        ready
    }
}

/// Routes initiator requests into the channel pipeline and re-sequences
/// their responses per thread.
///
/// Owns no channel/scheduler state itself — `admit` only decides whether
/// a `BEGIN_REQ` may proceed to `END_REQ` (i.e. whether the controller
/// should be handed the request at all); the host glues `complete` to
/// whatever notifies it of a channel's `BEGIN_RESP`
/// ([`crate::observer::ControllerObserver::on_request_completed`] in the
/// common case).
#[derive(Debug, Clone)]
pub struct Arbiter {
    kind: ArbiterKind,
    max_active_transactions: u32,
    buffer: ReorderBuffer,
}

impl Arbiter {
    /// Creates an arbiter of the given kind. `max_active_transactions` is
    /// ignored for [`ArbiterKind::Simple`], which always allows exactly
    /// one outstanding transaction per thread.
    #[must_use]
    pub fn new(kind: ArbiterKind, max_active_transactions: u32) -> Self {
        Self {
            kind,
            max_active_transactions,
            buffer: ReorderBuffer::default(),
        }
    }

    fn limit(&self) -> u32 {
        match self.kind {
            ArbiterKind::Simple => 1,
            ArbiterKind::Fifo | ArbiterKind::Reorder => self.max_active_transactions,
        }
    }

    /// Number of transactions currently outstanding for `thread`.
    #[must_use]
    pub fn outstanding(&self, thread: Thread) -> usize {
        self.buffer.outstanding_count(thread)
    }

    /// Decides whether `request`'s `BEGIN_REQ` may proceed to `END_REQ`
    /// now.
    ///
    /// Returns `true` and records the request as outstanding if the
    /// originating thread is under its active-transaction limit; returns
    /// `false` (withholding `END_REQ`, per the controller's back-pressure
    /// contract) otherwise. The caller is expected to retry on a later
    /// tick once some of the thread's outstanding requests have
    /// completed.
    #[must_use]
    pub fn admit(&mut self, request: &Request) -> bool {
        if self.buffer.outstanding_count(request.thread) >= self.limit() as usize {
            trace!(thread = ?request.thread, id = request.id, "arbiter back-pressure");
            return false;
        }
        self.buffer.admit(request.thread, request.id);
        true
    }

    /// Records that `request_id` (issued by `thread`) has completed
    /// downstream, and returns the ids now eligible for `BEGIN_RESP`/
    /// `END_RESP` delivery to the initiator, in the order they must be
    /// delivered.
    ///
    /// For [`ArbiterKind::Simple`] this is always a single-element (or
    /// empty) vector, since at most one transaction per thread is ever
    /// outstanding. For `Fifo` and `Reorder` it may release more than one
    /// id at once, if later completions had already arrived while an
    /// earlier one was still in flight.
    #[must_use]
    pub fn complete(&mut self, thread: Thread, request_id: u64) -> Vec<u64> {
        self.buffer.complete(thread, request_id)
    }

    /// Blocking transport bypass: admits and immediately completes
    /// `request_id` for `thread`, skipping arbitration entirely.
    ///
    /// Intended only for debug use (per the transport contract in the
    /// crate's external interfaces) — it ignores the active-transaction
    /// limit and does not interact with `admit`/`complete` bookkeeping for
    /// any other in-flight request on the same thread.
    pub fn blocking_transaction(&mut self, thread: Thread, request_id: u64) {
        trace!(?thread, request_id, "blocking transport bypass");
        self.buffer.admit(thread, request_id);
        let _ = self.buffer.complete(thread, request_id);
    }
}
