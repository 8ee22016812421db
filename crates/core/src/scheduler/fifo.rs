//! Strict FIFO scheduler: one global, per-channel arrival-ordered queue.
//!
//! A bank machine can only be handed the head of the queue, and only once
//! that head targets its own bank — FIFO never reorders around a busy
//! bank to find row hits elsewhere, trading locality for the simplest
//! possible fairness guarantee.

use std::collections::VecDeque;

use super::Scheduler;
use crate::common::{Bank, Row};
use crate::request::{Direction, Request};

/// Global arrival-ordered request queue for one channel.
#[derive(Debug)]
pub struct FifoScheduler {
    capacity: usize,
    queue: VecDeque<Request>,
}

impl FifoScheduler {
    /// Creates an empty FIFO scheduler with room for `capacity` requests.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            queue: VecDeque::new(),
        }
    }
}

impl Scheduler for FifoScheduler {
    fn has_buffer_space(&self) -> bool {
        self.queue.len() < self.capacity
    }

    fn store_request(&mut self, request: Request) {
        self.queue.push_back(request);
    }

    fn remove_request(&mut self, request_id: u64) {
        self.queue.retain(|r| r.id != request_id);
    }

    fn get_next_request(&self, bank: Bank, _open_row: Row, _keep_trans: bool) -> Option<Request> {
        let head = self.queue.front()?;
        (head.decoded.bank == bank).then(|| head.clone())
    }

    fn has_further_row_hit(&self, bank: Bank, row: Row, direction: Direction) -> bool {
        self.queue
            .iter()
            .skip(1)
            .any(|r| r.decoded.bank == bank && r.decoded.row == row && r.direction == direction)
    }

    fn has_further_request(&self, bank: Bank, direction: Direction) -> bool {
        self.queue
            .iter()
            .skip(1)
            .any(|r| r.decoded.bank == bank && r.direction == direction)
    }

    fn get_buffer_depth(&self) -> Vec<u32> {
        vec![u32::try_from(self.queue.len()).unwrap_or(u32::MAX)]
    }
}
