//! Per-bank state machine and page-management policies.
//!
//! One [`BankMachine`] exists per physical bank. Every controller tick it
//! is asked to `evaluate()` against the channel's scheduler and propose a
//! single next command; once the controller actually issues that command
//! it calls back into `update()` to transition the bank's own state.
//!
//! The four concrete page policies ([`PagePolicy::Open`],
//! [`PagePolicy::Closed`], [`PagePolicy::OpenAdaptive`],
//! [`PagePolicy::ClosedAdaptive`]) only differ in `evaluate()`'s decision
//! tree; everything else — construction, `update()`, `block()`, the
//! read-only state queries — is shared.

use crate::common::{Bank, BankGroup, Command, Rank};
use crate::memspec::MemSpec;
use crate::request::{Direction, Request};
use crate::scheduler::Scheduler;

/// Open/closed state of a bank's sense amplifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BankState {
    /// No row is open; an `ACT` is required before any CAS command.
    Precharged,
    /// A row is open (`open_row`) and ready for CAS commands.
    Activated,
}

/// Page-management policy selecting which page policy's `evaluate()` a
/// bank machine runs.
///
/// Kept as an enum rather than a trait object: every policy shares the
/// same constructor and state transitions, and switching on the policy
/// inside one `evaluate()` reads at least as clearly as dynamic dispatch
/// here, with no virtual-call overhead in the controller's hottest path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PagePolicy {
    /// Keep the row open after a CAS; only close it on a row miss.
    #[default]
    Open,
    /// Always auto-precharge: close the row as part of every CAS.
    Closed,
    /// Keep the row open unless the scheduler reports no further row hit
    /// pending, in which case auto-precharge.
    OpenAdaptive,
    /// Auto-precharge unless the scheduler reports a further row hit
    /// pending, in which case keep the row open.
    ClosedAdaptive,
}

/// One physical bank's command-proposal state machine.
#[derive(Debug)]
pub struct BankMachine {
    policy: PagePolicy,
    state: BankState,
    open_row: crate::common::Row,
    bank: Bank,
    bank_group: BankGroup,
    rank: Rank,
    refresh_management: bool,
    refresh_management_counter: u64,
    next_command: Command,
    current_request: Option<Request>,
    blocked: bool,
    sleeping: bool,
    keep_trans: bool,
}

impl BankMachine {
    /// Creates a bank machine for the `global_index`-th bank of the
    /// channel (i.e. counting every bank of every rank in order), deriving
    /// its rank and bank-group coordinates from `memspec`'s geometry.
    ///
    /// `bank` itself is kept as `global_index`, not a within-group index:
    /// the scheduler's per-bank queues (`crate::scheduler`) and the
    /// refresh manager's round-robin target (`crate::refresh`) both index
    /// by `Bank` alone, with no separate rank component, so `Bank` must be
    /// unique across every bank of the channel, not just within one rank
    /// or one bank group.
    #[must_use]
    pub fn new(
        policy: PagePolicy,
        memspec: &MemSpec,
        global_index: u32,
        refresh_management: bool,
    ) -> Self {
        let banks_per_rank = memspec.banks_per_rank();
        let rank = Rank(global_index / banks_per_rank);
        let within_rank = global_index % banks_per_rank;
        let bank_group = BankGroup(within_rank / memspec.banks_per_group);
        let bank = Bank(global_index);
        Self {
            policy,
            state: BankState::Precharged,
            open_row: crate::common::Row(0),
            bank,
            bank_group,
            rank,
            refresh_management,
            refresh_management_counter: 0,
            next_command: Command::Nop,
            current_request: None,
            blocked: false,
            sleeping: false,
            keep_trans: false,
        }
    }

    /// Re-evaluates this bank's candidate command against `scheduler`.
    ///
    /// Mirrors the original's per-policy `evaluate()` overrides: all four
    /// policies share the "fetch a candidate, adopt or keep the current
    /// payload, dispatch on bank state" skeleton and only differ in the
    /// row-hit branch.
    pub fn evaluate(&mut self, scheduler: &dyn Scheduler, memspec: &MemSpec) {
        self.next_command = Command::Nop;

        if self.sleeping || self.blocked {
            return;
        }

        let Some(candidate) = scheduler.get_next_request(self.bank, self.open_row, self.keep_trans)
        else {
            return;
        };

        if self.keep_trans {
            debug_assert!(self.current_request.is_some());
            if candidate.decoded.row == self.open_row {
                self.current_request = Some(candidate);
            }
        } else {
            self.current_request = Some(candidate);
        }

        let Some(request) = self.current_request.clone() else {
            return;
        };

        match self.state {
            BankState::Precharged => self.next_command = Command::Act,
            BankState::Activated => {
                self.next_command = self.evaluate_activated(&request, scheduler, memspec);
            }
        }
    }

    fn evaluate_activated(
        &self,
        request: &Request,
        scheduler: &dyn Scheduler,
        _memspec: &MemSpec,
    ) -> Command {
        if request.decoded.row != self.open_row {
            return Command::Prepb;
        }

        let masked = MemSpec::requires_masked_write(request.masked);
        match self.policy {
            PagePolicy::Open => cas_command(request, masked, false),
            PagePolicy::Closed => cas_command(request, masked, true),
            PagePolicy::OpenAdaptive => {
                let stay_open = !(scheduler.has_further_request(self.bank, request.direction)
                    && !scheduler.has_further_row_hit(self.bank, self.open_row, request.direction));
                cas_command(request, masked, !stay_open)
            }
            PagePolicy::ClosedAdaptive => {
                let stay_open =
                    scheduler.has_further_row_hit(self.bank, self.open_row, request.direction);
                cas_command(request, masked, !stay_open)
            }
        }
    }

    /// Returns the most recently evaluated candidate command and the
    /// request it targets, if any.
    #[must_use]
    pub fn next_command(&self) -> (Command, Option<&Request>) {
        (self.next_command, self.current_request.as_ref())
    }

    /// Transitions bank state following the issue of `command`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if a sleep-entry or sleep-exit command is
    /// issued while `keep_trans` is set, mirroring the original's
    /// assertion that a bank is never put to sleep mid-burst.
    pub fn update(&mut self, command: Command, memspec: &MemSpec) {
        match command {
            Command::Act => {
                self.state = BankState::Activated;
                if let Some(request) = &self.current_request {
                    self.open_row = request.decoded.row;
                }
                self.keep_trans = true;
                self.refresh_management_counter += 1;
            }
            Command::Prepb | Command::Presb | Command::Preab => {
                self.state = BankState::Precharged;
                self.keep_trans = false;
            }
            Command::Rd | Command::Wr | Command::Mwr => {
                self.current_request = None;
                self.keep_trans = false;
            }
            Command::Rda | Command::Wra | Command::Mwra => {
                self.state = BankState::Precharged;
                self.current_request = None;
                self.keep_trans = false;
            }
            Command::Pdea | Command::Pdep | Command::Srefen => {
                debug_assert!(!self.keep_trans);
                self.sleeping = true;
            }
            Command::Refpb | Command::Refp2b | Command::Refsb | Command::Refab => {
                self.sleeping = false;
                self.blocked = false;
                if self.refresh_management {
                    self.refresh_management_counter =
                        self.refresh_management_counter.saturating_sub(memspec.raadec);
                }
            }
            Command::Rfmpb | Command::Rfmp2b | Command::Rfmsb | Command::Rfmab => {
                debug_assert!(!self.keep_trans);
                self.sleeping = false;
                self.blocked = false;
                if self.refresh_management {
                    self.refresh_management_counter =
                        self.refresh_management_counter.saturating_sub(memspec.raaimt);
                }
            }
            Command::Pdxa | Command::Pdxp => {
                debug_assert!(!self.keep_trans);
                self.sleeping = false;
            }
            Command::Nop => {}
        }
    }

    /// Returns this bank's refresh-management activation counter, used by
    /// [`crate::refresh::RefreshManager`] to decide when a refresh
    /// management command is due.
    #[must_use]
    pub const fn refresh_management_counter(&self) -> u64 {
        self.refresh_management_counter
    }

    /// Forces this bank's next candidate to `NOP`, reserving it for an
    /// upcoming refresh.
    pub fn block(&mut self) {
        self.blocked = true;
        self.next_command = Command::Nop;
    }

    /// Rank this bank belongs to.
    #[must_use]
    pub const fn rank(&self) -> Rank {
        self.rank
    }

    /// Bank group this bank belongs to.
    #[must_use]
    pub const fn bank_group(&self) -> BankGroup {
        self.bank_group
    }

    /// This bank's own index.
    #[must_use]
    pub const fn bank(&self) -> Bank {
        self.bank
    }

    /// The currently open row, meaningful only when
    /// [`Self::is_activated`].
    #[must_use]
    pub const fn open_row(&self) -> crate::common::Row {
        self.open_row
    }

    /// Reports whether the bank has no in-flight request.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.current_request.is_none()
    }

    /// Reports whether the bank's sense amplifiers currently hold an open
    /// row.
    #[must_use]
    pub const fn is_activated(&self) -> bool {
        matches!(self.state, BankState::Activated)
    }

    /// Reports whether the bank is currently precharged.
    #[must_use]
    pub const fn is_precharged(&self) -> bool {
        matches!(self.state, BankState::Precharged)
    }

    /// Reports whether the bank is asleep (power-down or self-refresh).
    #[must_use]
    pub const fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Reports whether the bank is blocked for an upcoming refresh.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        self.blocked
    }
}

fn cas_command(request: &Request, masked: bool, auto_precharge: bool) -> Command {
    match (request.direction, masked, auto_precharge) {
        (Direction::Read, _, false) => Command::Rd,
        (Direction::Read, _, true) => Command::Rda,
        (Direction::Write, false, false) => Command::Wr,
        (Direction::Write, true, false) => Command::Mwr,
        (Direction::Write, false, true) => Command::Wra,
        (Direction::Write, true, true) => Command::Mwra,
    }
}
