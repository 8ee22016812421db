//! Rank power-down and self-refresh state machine.
//!
//! One [`PowerDownController`] tracks a single rank's low-power state,
//! driven purely by idleness timers read from
//! [`crate::config::PowerDownConfig`]. It proposes entry/exit commands the
//! same way a bank machine proposes CAS commands: the controller loop
//! asks, checks the result against the timing checker, and calls
//! [`Self::update`] once the command actually issues.

use tracing::trace;

use crate::common::Command;
use crate::config::PowerDownConfig;

/// A rank's current low-power state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RankPowerState {
    /// At least one bank is activated and the rank has been accessed
    /// recently.
    Active,
    /// Every bank is idle but may still hold an open row; CKE deasserted.
    ActivePowerDown,
    /// Every bank is idle and precharged; CKE deasserted.
    PrechargedPowerDown,
    /// Rank is in self-refresh; the DRAM refreshes itself without
    /// controller intervention.
    SelfRefresh,
}

/// Per-rank power state machine.
#[derive(Debug, Clone)]
pub struct PowerDownController {
    config: PowerDownConfig,
    state: RankPowerState,
    idle_since: Option<u64>,
}

impl PowerDownController {
    /// Creates a power-down controller for one rank, starting `Active`.
    #[must_use]
    pub fn new(config: PowerDownConfig) -> Self {
        Self {
            config,
            state: RankPowerState::Active,
            idle_since: None,
        }
    }

    /// Current power state.
    #[must_use]
    pub const fn state(&self) -> RankPowerState {
        self.state
    }

    /// Records that the rank had activity at `now` (a command targeting
    /// one of its banks), resetting the idle timer and, if asleep,
    /// proposing the matching exit command.
    pub fn note_activity(&mut self, now: u64) {
        self.idle_since = Some(now);
    }

    /// Evaluates whether a power-state transition command should be
    /// proposed, given that every bank in the rank is currently
    /// `all_banks_idle` / `all_banks_precharged`.
    #[must_use]
    pub fn evaluate(
        &self,
        now: u64,
        all_banks_idle: bool,
        all_banks_precharged: bool,
    ) -> Option<Command> {
        use crate::config::PowerDownPolicy::{Active, Off, Precharged, SelfRefresh, Staggered};

        if self.config.policy == Off {
            return None;
        }

        let idle_for = self.idle_since.map_or(0, |since| now.saturating_sub(since));

        match self.state {
            RankPowerState::Active => {
                if !all_banks_idle || idle_for < self.config.power_down_idle_cycles {
                    return None;
                }
                if all_banks_precharged {
                    return Some(Command::Pdep);
                }
                if matches!(self.config.policy, Active | Precharged | SelfRefresh | Staggered) {
                    return Some(Command::Pdea);
                }
                None
            }
            RankPowerState::ActivePowerDown => None,
            RankPowerState::PrechargedPowerDown => {
                if matches!(self.config.policy, Precharged | SelfRefresh)
                    && idle_for >= self.config.self_refresh_idle_cycles
                {
                    return Some(Command::Srefen);
                }
                None
            }
            RankPowerState::SelfRefresh => None,
        }
    }

    /// Proposes an exit command for a sleeping rank that just saw fresh
    /// activity demand; `None` if the rank is not currently asleep.
    #[must_use]
    pub const fn evaluate_exit(&self) -> Option<Command> {
        match self.state {
            RankPowerState::ActivePowerDown => Some(Command::Pdxa),
            RankPowerState::PrechargedPowerDown => Some(Command::Pdxp),
            RankPowerState::SelfRefresh => Some(Command::Srefex),
            RankPowerState::Active => None,
        }
    }

    /// Transitions state following the issue of a power command.
    pub fn update(&mut self, command: Command, now: u64) {
        self.state = match command {
            Command::Pdea => RankPowerState::ActivePowerDown,
            Command::Pdep => RankPowerState::PrechargedPowerDown,
            Command::Srefen => RankPowerState::SelfRefresh,
            Command::Pdxa | Command::Pdxp | Command::Srefex => RankPowerState::Active,
            _ => return,
        };
        trace!(?command, new_state = ?self.state, now, "power state transition");
        self.idle_since = Some(now);
    }
}
