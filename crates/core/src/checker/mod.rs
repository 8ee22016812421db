//! Timing checker: the clock oracle every bank machine and the controller
//! loop consult before issuing a command.
//!
//! The checker is a pure function of its table state: given a proposed
//! command and the bank it targets, [`TimingChecker::time_to_satisfy_constraints`]
//! returns the earliest absolute cycle the command may legally issue, and
//! [`TimingChecker::insert`] folds a just-issued command back into the
//! table so future queries account for it. Vendor families differ only in
//! which rows of the underlying constraint table are populated and what
//! their delays resolve to from [`MemSpec`](crate::memspec::MemSpec) — see
//! [`table`] for the declarative edge list this module is generated from.

mod table;

use crate::common::{BankId, Command, CommandClass, ControllerError, ControllerResult};
use crate::memspec::MemSpec;
use table::TimingTable;

/// Per-channel timing oracle.
///
/// Owns one [`TimingTable`] and a reference-counted view of the channel's
/// [`MemSpec`]; stateless beyond that table, so a checker can be rebuilt
/// from scratch by replaying a command log (see the crate's timing-table
/// proptests).
#[derive(Debug, Clone)]
pub struct TimingChecker {
    memspec: MemSpec,
    table: TimingTable,
}

impl TimingChecker {
    /// Creates a fresh checker with an empty table; every command is
    /// initially legal at cycle 0.
    #[must_use]
    pub fn new(memspec: MemSpec) -> Self {
        Self {
            memspec,
            table: TimingTable::new(),
        }
    }

    /// Returns the earliest absolute cycle `cmd`, targeting `bank`, may be
    /// issued without violating any JEDEC timing constraint currently on
    /// record.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::UnknownCommand`] if `cmd` is a
    /// refresh-management command and the active family does not define
    /// one.
    pub fn time_to_satisfy_constraints(
        &self,
        cmd: Command,
        bank: BankId,
    ) -> ControllerResult<u64> {
        self.reject_unsupported(cmd)?;
        Ok(table::earliest_time(&self.table, &self.memspec, cmd, bank))
    }

    /// Folds a just-issued command into the table so future queries
    /// observe it.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::UnknownCommand`] under the same
    /// condition as [`Self::time_to_satisfy_constraints`].
    pub fn insert(&mut self, cmd: Command, bank: BankId, time: u64) -> ControllerResult<()> {
        self.reject_unsupported(cmd)?;
        table::insert(&mut self.table, &self.memspec, cmd, bank, time);
        Ok(())
    }

    fn reject_unsupported(&self, cmd: Command) -> ControllerResult<()> {
        let is_refresh_management = matches!(
            cmd,
            Command::Rfmab | Command::Rfmpb | Command::Rfmp2b | Command::Rfmsb
        );
        if is_refresh_management && !self.memspec.family.has_refresh_management() {
            return Err(ControllerError::UnknownCommand(cmd));
        }
        if cmd.class() == CommandClass::None {
            return Err(ControllerError::UnknownCommand(cmd));
        }
        Ok(())
    }
}
