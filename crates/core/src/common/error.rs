//! Controller error types.
//!
//! This module defines the fallible outcomes the controller pipeline can
//! produce. It provides:
//! 1. **Fatal construction errors:** geometry or command-table
//!    inconsistencies discovered when a `MemSpec`/`Controller` is built.
//! 2. **Runtime protocol violations:** a command proposed or issued that the
//!    timing checker's own table would not yet permit — always a bug, never
//!    routine control flow.
//!
//! Routine, recoverable conditions (back-pressure, refresh deferral) are
//! deliberately **not** part of this enum; they are observed as controller
//! state, never as an `Err`.

use thiserror::Error;

use super::command::Command;
use super::coord::{Bank, Rank};

/// Errors the controller pipeline can report.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// The timing checker was asked to reason about a command with no rows
    /// in the active family's constraint table.
    #[error("command {0} has no constraint-table entry for the active DRAM family")]
    UnknownCommand(Command),

    /// `MemSpec` geometry is internally inconsistent (for example,
    /// `banks_per_rank` not divisible by `banks_per_group`).
    #[error("inconsistent memory specification: {0}")]
    InconsistentMemSpec(String),

    /// A bank machine proposed, or the controller issued, a command the
    /// checker's own table would not yet permit at the given time.
    #[error("protocol violation: {cmd} on rank {rank:?} bank {bank:?} at cycle {now}: {reason}")]
    ProtocolViolation {
        /// The command that violated a timing constraint.
        cmd: Command,
        /// Rank the command targeted.
        rank: Rank,
        /// Bank the command targeted.
        bank: Bank,
        /// Simulation time, in controller clock cycles, the violation was
        /// detected at.
        now: u64,
        /// Human-readable description of the constraint that was violated.
        reason: String,
    },

    /// The refresh manager exceeded its configured postponement budget for
    /// a rank. Carried as a value, not raised as a panic: the controller
    /// handles this by forcing an immediate refresh and continuing.
    #[error(
        "refresh overrun on rank {rank:?}: {postponed} refreshes postponed, limit was {limit}"
    )]
    RefreshOverrun {
        /// Rank whose refresh budget was exceeded.
        rank: Rank,
        /// Number of refreshes currently postponed.
        postponed: u32,
        /// The configured `refresh_max_postponed` limit.
        limit: u32,
    },
}

/// Convenience alias for controller operations that can fail.
pub type ControllerResult<T> = Result<T, ControllerError>;
