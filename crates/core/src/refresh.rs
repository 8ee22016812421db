//! Refresh scheduling.
//!
//! The refresh manager tracks a leaky per-rank budget driven by `tREFI`
//! and decides when to insert a refresh command, which banks that command
//! must claim, and how far the controller may defer or pull in a refresh
//! before it is forced through.

use tracing::{debug, warn};

use crate::common::{Bank, Command, Rank};
use crate::config::RefreshPolicy;
use crate::memspec::MemSpec;

/// Per-rank refresh bookkeeping.
#[derive(Debug, Clone)]
struct RankRefreshState {
    /// Absolute cycle the next refresh is nominally due at.
    due_at: u64,
    /// Refreshes currently postponed past their nominal due time.
    postponed: u32,
    /// Refreshes issued ahead of their nominal due time.
    pulled_in: u32,
    /// Next bank to target for per-bank-granularity refresh policies,
    /// round-robin.
    next_bank: u32,
}

impl RankRefreshState {
    fn new(t_refi: u64) -> Self {
        Self {
            due_at: t_refi,
            postponed: 0,
            pulled_in: 0,
            next_bank: 0,
        }
    }
}

/// Decision the refresh manager hands back to the controller loop each
/// tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDecision {
    /// No refresh is due yet for this rank.
    None,
    /// A refresh should be issued now, naming the command and, for
    /// per-bank granularity, the single bank it targets.
    Issue { command: Command, bank: Option<Bank> },
}

/// Tracks refresh due-times and budgets for every rank in a channel.
#[derive(Debug, Clone)]
pub struct RefreshManager {
    policy: RefreshPolicy,
    banks_per_rank: u32,
    t_refi: u64,
    max_postponed: u32,
    max_pulledin: u32,
    ranks: Vec<RankRefreshState>,
}

impl RefreshManager {
    /// Creates a refresh manager for `rank_count` ranks under `policy`.
    #[must_use]
    pub fn new(policy: RefreshPolicy, memspec: &MemSpec, rank_count: u32) -> Self {
        Self {
            policy,
            banks_per_rank: memspec.banks_per_rank(),
            t_refi: memspec.t_refi,
            max_postponed: memspec.refresh_max_postponed,
            max_pulledin: memspec.refresh_max_pulledin,
            ranks: (0..rank_count)
                .map(|_| RankRefreshState::new(memspec.t_refi))
                .collect(),
        }
    }

    /// Returns this manager's refresh command for `rank`, naming the
    /// target bank for per-bank-granularity policies.
    ///
    /// Called once per tick per rank by the controller loop, after every
    /// bank machine has had a chance to propose its own candidate; a
    /// refresh only pre-empts bank machines once all the banks it needs
    /// are idle, which the controller enforces by calling
    /// [`Self::blocked_banks`] and [`crate::bank::BankMachine::block`]
    /// ahead of issuing.
    pub fn poll(&mut self, rank: Rank, now: u64) -> RefreshDecision {
        let state = &self.ranks[rank.0 as usize];
        if now < state.due_at {
            return RefreshDecision::None;
        }

        let command = self.refresh_command();
        let bank = self.refresh_bank(rank);
        debug!(?rank, ?command, ?bank, now, "refresh due");
        RefreshDecision::Issue { command, bank }
    }

    /// Returns the banks a refresh for `rank` must claim before it may
    /// issue: every bank for all-bank policies, or the single round-robin
    /// target for per-bank policies.
    #[must_use]
    pub fn blocked_banks(&self, rank: Rank) -> Vec<Bank> {
        match self.policy {
            RefreshPolicy::AllBank => (0..self.banks_per_rank)
                .map(|b| Bank(rank.0 * self.banks_per_rank + b))
                .collect(),
            RefreshPolicy::PerBank | RefreshPolicy::SameBank => {
                self.refresh_bank(rank).into_iter().collect()
            }
            RefreshPolicy::PerTwoBank => {
                let state = &self.ranks[rank.0 as usize];
                let base = rank.0 * self.banks_per_rank;
                vec![
                    Bank(base + state.next_bank % self.banks_per_rank),
                    Bank(base + (state.next_bank + 1) % self.banks_per_rank),
                ]
            }
        }
    }

    fn refresh_command(&self) -> Command {
        match self.policy {
            RefreshPolicy::AllBank => Command::Refab,
            RefreshPolicy::PerBank => Command::Refpb,
            RefreshPolicy::PerTwoBank => Command::Refp2b,
            RefreshPolicy::SameBank => Command::Refsb,
        }
    }

    fn refresh_bank(&self, rank: Rank) -> Option<Bank> {
        if self.policy == RefreshPolicy::AllBank {
            return None;
        }
        let state = &self.ranks[rank.0 as usize];
        Some(Bank(rank.0 * self.banks_per_rank + state.next_bank))
    }

    /// Records that a refresh for `rank` was actually issued at `now`,
    /// advancing the round-robin bank pointer and the next due time.
    pub fn record_issued(&mut self, rank: Rank, now: u64) {
        let state = &mut self.ranks[rank.0 as usize];
        if now > state.due_at {
            state.postponed = state.postponed.saturating_sub(1);
        } else {
            state.pulled_in += 1;
        }
        state.next_bank = (state.next_bank + per_command_bank_step(self.policy)) % self.banks_per_rank.max(1);
        state.due_at = now + self.t_refi;
    }

    /// Advances every rank's postponement counter for one tick that
    /// passed without a refresh being issued, and reports whether any
    /// rank has exceeded its postponement budget.
    ///
    /// # Returns
    ///
    /// The ranks, if any, whose postponement budget is exhausted and must
    /// be forced through immediately regardless of bank activity.
    pub fn tick(&mut self, now: u64) -> Vec<Rank> {
        let mut overrun = Vec::new();
        for (idx, state) in self.ranks.iter_mut().enumerate() {
            if now >= state.due_at {
                state.postponed += 1;
                if state.postponed > self.max_postponed {
                    warn!(rank = idx, postponed = state.postponed, limit = self.max_postponed, "refresh overrun, forcing");
                    overrun.push(Rank(u32::try_from(idx).unwrap_or(u32::MAX)));
                }
            }
        }
        overrun
    }

    /// Reports whether `rank` may have one of its refreshes pulled in
    /// ahead of schedule (used by idle-time refresh insertion).
    #[must_use]
    pub fn can_pull_in(&self, rank: Rank) -> bool {
        self.ranks[rank.0 as usize].pulled_in < self.max_pulledin
    }

    /// Current postponement count for `rank`, for reporting an overrun
    /// returned by [`Self::tick`].
    #[must_use]
    pub fn postponed(&self, rank: Rank) -> u32 {
        self.ranks[rank.0 as usize].postponed
    }

    /// The configured postponement budget every rank is held to.
    #[must_use]
    pub const fn max_postponed(&self) -> u32 {
        self.max_postponed
    }

    /// Absolute cycle `rank`'s next refresh is nominally due at, regardless
    /// of whether it has been polled yet this tick.
    ///
    /// Used by the controller loop to fold an upcoming refresh into its
    /// next-wake-time calculation even on a tick where nothing was due and
    /// so [`Self::poll`] never produced a candidate.
    #[must_use]
    pub fn next_due(&self, rank: Rank) -> u64 {
        self.ranks[rank.0 as usize].due_at
    }
}

const fn per_command_bank_step(policy: RefreshPolicy) -> u32 {
    match policy {
        RefreshPolicy::PerTwoBank => 2,
        _ => 1,
    }
}
