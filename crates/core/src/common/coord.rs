//! DRAM addressing coordinates.
//!
//! This module defines strong types for every level of the DRAM addressing
//! hierarchy to prevent accidental mixing of, say, a bank index with a rank
//! index. It provides the following:
//! 1. **Type Safety:** Distinguishes channel/rank/bank-group/bank/row/column/
//!    stack/thread at compile time.
//! 2. **Plain Construction:** Each coordinate is a thin `u32` newtype; the
//!    controller never performs arithmetic that mixes two coordinate types.

/// Index of a memory channel.
///
/// Channels are fully independent: each owns its own scheduler, bank
/// machines, and timing checker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Channel(pub u32);

/// Index of a rank within a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rank(pub u32);

/// Index of a bank group within a rank.
///
/// Bank groups only exist on DDR4-and-later-class parts; for families
/// without the concept `MemSpec` reports exactly one bank group per rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BankGroup(pub u32);

/// Index of a physical bank within a bank group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bank(pub u32);

/// Index of a die stack, used only by HBM-class parts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stack(pub u32);

/// Index of the currently open (or to-be-opened) row within a bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Row(pub u64);

/// Index of the column targeted by a CAS command within the open row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Column(pub u64);

/// Index of an initiator thread, used by the arbiter to track per-thread
/// ordering and outstanding-transaction limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Thread(pub u32);

/// The full set of coordinates a decoded request resolves to within one
/// channel.
///
/// `stack` is `Stack(0)` for every family that does not define stacked dies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BankId {
    /// Rank this bank belongs to.
    pub rank: Rank,
    /// Bank group this bank belongs to.
    pub bank_group: BankGroup,
    /// Physical bank index within the bank group.
    pub bank: Bank,
    /// Die stack this bank belongs to (HBM only).
    pub stack: Stack,
}

impl BankId {
    /// Creates a coordinate bundle for a bank on stack 0.
    ///
    /// # Arguments
    ///
    /// * `rank` - Rank the bank belongs to.
    /// * `bank_group` - Bank group the bank belongs to.
    /// * `bank` - Physical bank index.
    ///
    /// # Returns
    ///
    /// A `BankId` with `stack` set to `Stack(0)`.
    #[must_use]
    pub const fn new(rank: Rank, bank_group: BankGroup, bank: Bank) -> Self {
        Self {
            rank,
            bank_group,
            bank,
            stack: Stack(0),
        }
    }
}
