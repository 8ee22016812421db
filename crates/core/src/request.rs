//! Requests flowing through the controller pipeline.
//!
//! A `Request` is created by the arbiter when an initiator issues
//! `BEGIN_REQ`, handed to exactly one channel's scheduler, matched to one
//! bank machine, driven through a sequence of DRAM commands, and finally
//! released after its response phase completes.

use crate::common::{Bank, BankGroup, Channel, Column, Rank, Row, Stack, Thread};

/// Direction of a request: which way data moves across the data bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Initiator reads data from DRAM.
    Read,
    /// Initiator writes data to DRAM.
    Write,
}

/// Decoded addressing coordinates for a request within its channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decoded {
    /// Rank targeted by the request.
    pub rank: Rank,
    /// Bank group targeted by the request.
    pub bank_group: BankGroup,
    /// Physical bank targeted by the request.
    pub bank: Bank,
    /// Die stack targeted by the request (HBM only; `Stack(0)` otherwise).
    pub stack: Stack,
    /// Row targeted by the request.
    pub row: Row,
    /// Column targeted by the request.
    pub column: Column,
}

/// A single initiator request as it flows through the channel pipeline.
///
/// Ownership: created by the arbiter, referenced (not cloned) by the
/// scheduler's queue and by at most one bank machine's `current_request`
/// slot at a time, and released back to the arbiter once its response
/// phase completes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    /// Monotonically increasing identifier, unique per `(thread, channel)`
    /// pair, assigned by the arbiter on ingress.
    pub id: u64,
    /// Initiator thread this request originated from.
    pub thread: Thread,
    /// Channel this request was routed to.
    pub channel: Channel,
    /// Raw byte address as seen by the initiator, before channel/rank/bank
    /// decoding.
    pub address: u64,
    /// Burst length, in data-bus beats.
    pub burst_length: u32,
    /// Read or write.
    pub direction: Direction,
    /// Decoded addressing coordinates within the channel.
    pub decoded: Decoded,
    /// Whether this write only updates a subset of the burst's bytes and
    /// must therefore be issued as a masked write (`MWR`/`MWRA`).
    pub masked: bool,
    /// Absolute controller time, in clock cycles, at which this request
    /// was generated (used for age-based scheduler tie-breaks and
    /// latency reporting).
    pub time_of_generation: u64,
}

impl Request {
    /// Creates a new request for a decoded address.
    ///
    /// # Arguments
    ///
    /// * `id` - Monotonically increasing per-thread identifier.
    /// * `thread` - Originating initiator thread.
    /// * `channel` - Destination channel.
    /// * `address` - Raw byte address.
    /// * `burst_length` - Burst length in data-bus beats.
    /// * `direction` - Read or write.
    /// * `decoded` - Decoded channel/rank/bank/row/column coordinates.
    /// * `time_of_generation` - Absolute cycle the request was created at.
    ///
    /// # Returns
    ///
    /// A new, unmasked `Request`.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        id: u64,
        thread: Thread,
        channel: Channel,
        address: u64,
        burst_length: u32,
        direction: Direction,
        decoded: Decoded,
        time_of_generation: u64,
    ) -> Self {
        Self {
            id,
            thread,
            channel,
            address,
            burst_length,
            direction,
            decoded,
            masked: false,
            time_of_generation,
        }
    }

    /// Reports whether this request is a row hit against `open_row`.
    #[must_use]
    pub fn is_row_hit(&self, open_row: Row) -> bool {
        self.decoded.row == open_row
    }
}
