//! Grouped first-ready, first-come-first-served scheduler.
//!
//! Behaves like [`super::FrFcfsScheduler`] with one difference: while a
//! bank machine is mid-burst on a row (`keep_trans` set), this scheduler
//! stays "sticky" to that row — it keeps handing back further hits on it
//! even if an older, different-row request is waiting — instead of
//! re-evaluating row-hit-vs-FCFS from scratch on every call. This avoids
//! thrashing between two row groups that are each individually row-hit
//! eligible.

use std::collections::HashMap;

use super::Scheduler;
use crate::common::{Bank, Row};
use crate::request::{Direction, Request};

/// Per-bank queues with row-group stickiness while a transaction burst is
/// in flight.
#[derive(Debug)]
pub struct FrFcfsGrpScheduler {
    capacity: usize,
    total: usize,
    per_bank: HashMap<Bank, Vec<Request>>,
}

impl FrFcfsGrpScheduler {
    /// Creates an empty grouped FR-FCFS scheduler with a channel-wide
    /// capacity of `capacity` requests.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            total: 0,
            per_bank: HashMap::new(),
        }
    }

    fn bank_queue(&self, bank: Bank) -> &[Request] {
        self.per_bank.get(&bank).map_or(&[], Vec::as_slice)
    }
}

impl Scheduler for FrFcfsGrpScheduler {
    fn has_buffer_space(&self) -> bool {
        self.total < self.capacity
    }

    fn store_request(&mut self, request: Request) {
        self.total += 1;
        self.per_bank
            .entry(request.decoded.bank)
            .or_default()
            .push(request);
    }

    fn remove_request(&mut self, request_id: u64) {
        for queue in self.per_bank.values_mut() {
            let before = queue.len();
            queue.retain(|r| r.id != request_id);
            self.total -= before - queue.len();
        }
    }

    fn get_next_request(&self, bank: Bank, open_row: Row, keep_trans: bool) -> Option<Request> {
        let queue = self.bank_queue(bank);
        if keep_trans {
            if let Some(sticky) = queue
                .iter()
                .filter(|r| r.decoded.row == open_row)
                .min_by_key(|r| r.time_of_generation)
            {
                return Some(sticky.clone());
            }
        }
        let row_hit = queue
            .iter()
            .filter(|r| r.decoded.row == open_row)
            .min_by_key(|r| r.time_of_generation);
        row_hit
            .or_else(|| queue.iter().min_by_key(|r| r.time_of_generation))
            .cloned()
    }

    fn has_further_row_hit(&self, bank: Bank, row: Row, direction: Direction) -> bool {
        self.bank_queue(bank)
            .iter()
            .any(|r| r.decoded.row == row && r.direction == direction)
    }

    fn has_further_request(&self, bank: Bank, direction: Direction) -> bool {
        self.bank_queue(bank).iter().any(|r| r.direction == direction)
    }

    fn get_buffer_depth(&self) -> Vec<u32> {
        let mut banks: Vec<_> = self.per_bank.keys().copied().collect();
        banks.sort();
        banks
            .into_iter()
            .map(|b| u32::try_from(self.bank_queue(b).len()).unwrap_or(u32::MAX))
            .collect()
    }
}
