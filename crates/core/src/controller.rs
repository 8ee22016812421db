//! The controller loop: per-channel command arbitration.
//!
//! [`Controller`] owns one channel's full pipeline — scheduler, bank
//! machines, timing checker, refresh manager, and power-down state — and
//! drives them through [`Controller::tick`], the single entry point a host
//! discrete-event kernel calls once per simulated cycle (or, for a
//! tickless kernel, once per returned wake time).
//!
//! `tick` gathers every legal candidate command from the bank machines,
//! the refresh manager, and the power-down controller, picks the earliest
//! one the timing checker admits, issues it, and repeats until the
//! channel's per-cycle command-bus budget is exhausted. This mirrors the
//! original's per-cycle command-decode loop: propose, pick, issue, retire
//! — just expressed without a shared mutable global clock object.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::{debug, warn};

use crate::bank::{BankMachine, PagePolicy};
use crate::checker::TimingChecker;
use crate::common::{
    BankId, Channel, Command, CommandClass, ControllerError, ControllerResult, Rank,
};
use crate::config::{McConfig, SchedulerKind};
use crate::memspec::MemSpec;
use crate::observer::ControllerObserver;
use crate::powerdown::PowerDownController;
use crate::refresh::{RefreshDecision, RefreshManager};
use crate::request::{Direction, Request};
use crate::scheduler::{FifoScheduler, FrFcfsGrpScheduler, FrFcfsScheduler, Scheduler};

/// Where a proposed [`Candidate`] came from, used only to break ties
/// between commands the checker admits at the same cycle.
///
/// Order of priority mirrors §9.1(a)'s resolution of the tie-break open
/// question: a bank machine's own candidate wins over a forced refresh
/// precharge, which wins over the refresh command itself, which wins over
/// a power-state transition — and within a class, lower bank/rank index
/// wins. Power-down loses every tie deliberately: a rank should never
/// enter a low-power state while there is other issuable work for the
/// same cycle.
///
/// This ordering is overridden by [`Candidate::urgent`]: once a rank's
/// postponed-refresh budget is exhausted, its `ForcedPrecharge`/`Refresh`
/// candidates are promoted to the same tie-break tier as ordinary bank
/// candidates, so they can no longer lose an indefinite string of ties to
/// unrelated bank traffic (§4.7's refresh-starvation contract).
#[derive(Debug, Clone, Copy)]
enum CandidateSource {
    /// A bank machine's own `evaluate()` output, indexed by bank (which is
    /// also that bank's index into [`Controller::bank_machines`]).
    Bank(u32),
    /// A `PREPB` synthesized to drain a bank the refresh manager has
    /// claimed but which is still activated.
    ForcedPrecharge(u32),
    /// The refresh manager's own refresh command for a rank.
    Refresh(Rank),
    /// A power-down entry or exit command for a rank.
    PowerDown(Rank),
}

fn priority(source: CandidateSource, urgent: bool) -> (u8, u32) {
    if urgent {
        return match source {
            CandidateSource::Bank(idx) | CandidateSource::ForcedPrecharge(idx) => (0, idx),
            CandidateSource::Refresh(rank) => (0, rank.0),
            CandidateSource::PowerDown(rank) => (3, rank.0),
        };
    }
    match source {
        CandidateSource::Bank(idx) => (0, idx),
        CandidateSource::ForcedPrecharge(idx) => (1, idx),
        CandidateSource::Refresh(rank) => (2, rank.0),
        CandidateSource::PowerDown(rank) => (3, rank.0),
    }
}

/// One legally-timed command a tick could issue.
#[derive(Debug, Clone)]
struct Candidate {
    source: CandidateSource,
    cmd: Command,
    bank_id: BankId,
    /// The request this command would retire, for CAS candidates issued by
    /// a bank machine; `None` for every other source.
    request: Option<Request>,
    /// Earliest cycle the checker admits `cmd` at.
    time: u64,
    /// Set for `ForcedPrecharge`/`Refresh` candidates belonging to a rank
    /// whose postponed-refresh budget is exhausted; promotes the
    /// candidate's tie-break tier to match ordinary bank candidates.
    urgent: bool,
}

/// Drives one memory channel's command pipeline.
///
/// Construction wires up the scheduler, bank machines, timing checker,
/// refresh manager, and per-rank power-down controllers from one
/// [`MemSpec`] and [`McConfig`]; everything afterward happens through
/// [`Self::enqueue`] and [`Self::tick`].
#[derive(Debug)]
pub struct Controller {
    channel: Channel,
    memspec: MemSpec,
    scheduler: Box<dyn Scheduler>,
    bank_machines: Vec<BankMachine>,
    checker: TimingChecker,
    refresh: RefreshManager,
    power_down: Vec<PowerDownController>,
    pending_completions: BinaryHeap<Reverse<(u64, u64)>>,
    observer: Box<dyn ControllerObserver>,
}

impl Controller {
    /// Builds a controller for `channel` from a populated `memspec` and
    /// `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::InconsistentMemSpec`] if `memspec`'s
    /// geometry fails [`MemSpec::validate`].
    pub fn new(
        channel: Channel,
        memspec: MemSpec,
        config: &McConfig,
        observer: Box<dyn ControllerObserver>,
    ) -> ControllerResult<Self> {
        memspec.validate()?;

        let scheduler: Box<dyn Scheduler> = match config.scheduler.kind {
            SchedulerKind::Fifo => Box::new(FifoScheduler::new(config.request_buffer_size)),
            SchedulerKind::FrFcfs => Box::new(FrFcfsScheduler::new(config.request_buffer_size)),
            SchedulerKind::FrFcfsGrp => {
                Box::new(FrFcfsGrpScheduler::new(config.request_buffer_size))
            }
        };

        let page_policy: PagePolicy = config.page_policy.into();
        let total_banks = memspec.ranks * memspec.banks_per_rank();
        let bank_machines = (0..total_banks)
            .map(|idx| BankMachine::new(page_policy, &memspec, idx, config.refresh_management))
            .collect();

        let refresh = RefreshManager::new(config.refresh.policy, &memspec, memspec.ranks);
        let power_down = (0..memspec.ranks)
            .map(|_| PowerDownController::new(config.power_down.clone()))
            .collect();
        let checker = TimingChecker::new(memspec.clone());

        Ok(Self {
            channel,
            memspec,
            scheduler,
            bank_machines,
            checker,
            refresh,
            power_down,
            pending_completions: BinaryHeap::new(),
            observer,
        })
    }

    /// The channel this controller drives.
    #[must_use]
    pub const fn channel(&self) -> Channel {
        self.channel
    }

    /// Reports whether the scheduler currently has room for another
    /// request.
    #[must_use]
    pub fn has_buffer_space(&self) -> bool {
        self.scheduler.has_buffer_space()
    }

    /// Per-sub-queue scheduler occupancy, for observers.
    #[must_use]
    pub fn buffer_depth(&self) -> Vec<u32> {
        self.scheduler.get_buffer_depth()
    }

    /// Attempts to admit `request` into this channel's scheduler.
    ///
    /// Returns `true` if accepted, in which case the caller may return
    /// `END_REQ` immediately; `false` if the scheduler's buffer is full,
    /// in which case the caller must withhold `END_REQ` and retry on a
    /// later tick, per the back-pressure contract in the crate's external
    /// interfaces.
    pub fn enqueue(&mut self, request: Request, now: u64) -> bool {
        if !self.scheduler.has_buffer_space() {
            return false;
        }
        self.observer.on_request_queued(request.id, now);
        self.scheduler.store_request(request);
        true
    }

    /// Advances this channel by one cycle at absolute time `now`.
    ///
    /// Drains any read completions scheduled for `now` or earlier,
    /// updates refresh bookkeeping, then repeatedly selects and issues the
    /// earliest-admissible candidate command until the channel's per-cycle
    /// command-bus budget is exhausted. Returns the next absolute cycle at
    /// which calling `tick` again could do useful work; a host kernel is
    /// free to call `tick` more often than this (every candidate consults
    /// the checker fresh) but must never call it later.
    ///
    /// # Errors
    ///
    /// Only returns `Err` for [`ControllerError::ProtocolViolation`],
    /// which indicates an internal inconsistency between a candidate's
    /// computed time and the cycle it is issued at — never routine
    /// back-pressure or refresh deferral, which this method handles
    /// internally.
    pub fn tick(&mut self, now: u64) -> ControllerResult<u64> {
        self.drain_completions(now);
        let overrun_ranks = self.refresh.tick(now);
        for &rank in &overrun_ranks {
            let error = ControllerError::RefreshOverrun {
                rank,
                postponed: self.refresh.postponed(rank),
                limit: self.refresh.max_postponed(),
            };
            warn!(%error, "forcing refresh through after postponement budget exhausted");
        }

        let split_bus = self.memspec.family.has_stacks();
        let mut ras_issued = false;
        let mut cas_issued = false;
        let mut next_wake = u64::MAX;

        loop {
            let candidates = self.collect_candidates(now, &overrun_ranks);
            let mut best: Option<Candidate> = None;
            let mut bus_blocked_ready = false;

            for candidate in candidates {
                let class_busy = match candidate.cmd.class() {
                    CommandClass::Cas => cas_issued,
                    _ => ras_issued,
                };

                if candidate.time > now {
                    next_wake = next_wake.min(candidate.time);
                    continue;
                }
                if class_busy {
                    bus_blocked_ready = true;
                    continue;
                }

                let better = match &best {
                    None => true,
                    Some(current) => {
                        (candidate.time, priority(candidate.source, candidate.urgent))
                            < (current.time, priority(current.source, current.urgent))
                    }
                };
                if better {
                    best = Some(candidate);
                }
            }

            if bus_blocked_ready {
                next_wake = next_wake.min(now + 1);
            }

            let Some(chosen) = best else { break };
            match chosen.cmd.class() {
                CommandClass::Cas => cas_issued = true,
                _ => ras_issued = true,
            }
            self.issue(chosen, now)?;

            let done = if split_bus {
                ras_issued && cas_issued
            } else {
                true
            };
            if done {
                break;
            }
        }

        for rank_idx in 0..self.memspec.ranks {
            let due = self.refresh.next_due(Rank(rank_idx));
            next_wake = next_wake.min(due.max(now + 1));
        }

        Ok(if next_wake == u64::MAX {
            now + 1
        } else {
            next_wake
        })
    }

    /// Removes and reports every read completion scheduled for `now` or
    /// earlier.
    ///
    /// Exposed separately from [`Self::tick`] (which calls this
    /// internally) so a test harness can observe exactly which request
    /// ids a given cycle released, without re-deriving it from observer
    /// callbacks.
    pub fn drain_completions(&mut self, now: u64) -> Vec<u64> {
        let mut completed = Vec::new();
        while let Some(&Reverse((time, request_id))) = self.pending_completions.peek() {
            if time > now {
                break;
            }
            let _ = self.pending_completions.pop();
            self.observer.on_request_completed(request_id, now);
            completed.push(request_id);
        }
        completed
    }

    fn collect_candidates(&mut self, now: u64, overrun_ranks: &[Rank]) -> Vec<Candidate> {
        let mut out = Vec::new();

        let scheduler: &dyn Scheduler = self.scheduler.as_ref();
        for (idx, bm) in self.bank_machines.iter_mut().enumerate() {
            bm.evaluate(scheduler, &self.memspec);
            let (cmd, request) = bm.next_command();
            if cmd == Command::Nop {
                continue;
            }
            let bank_id = BankId::new(bm.rank(), bm.bank_group(), bm.bank());
            if let Ok(time) = self.checker.time_to_satisfy_constraints(cmd, bank_id) {
                out.push(Candidate {
                    source: CandidateSource::Bank(u32::try_from(idx).unwrap_or(u32::MAX)),
                    cmd,
                    bank_id,
                    request: request.cloned(),
                    time,
                    urgent: false,
                });
            }
        }

        for rank_idx in 0..self.memspec.ranks {
            let rank = Rank(rank_idx);
            let urgent = overrun_ranks.contains(&rank);
            self.collect_refresh_candidates(rank, now, urgent, &mut out);
            self.collect_power_down_candidates(rank, now, &mut out);
        }

        out
    }

    fn collect_refresh_candidates(
        &mut self,
        rank: Rank,
        now: u64,
        urgent: bool,
        out: &mut Vec<Candidate>,
    ) {
        let decision = self.refresh.poll(rank, now);
        let RefreshDecision::Issue { command, .. } = decision else {
            return;
        };

        let claimed = self.refresh.blocked_banks(rank);
        for &bank in &claimed {
            if let Some(bm) = self.bank_machines.get_mut(bank.0 as usize) {
                bm.block();
            }
        }

        let all_ready = claimed.iter().all(|&bank| {
            self.bank_machines
                .get(bank.0 as usize)
                .is_some_and(|bm| bm.is_idle() && bm.is_precharged())
        });

        if all_ready {
            let Some(&first) = claimed.first() else {
                return;
            };
            if let Some(bm) = self.bank_machines.get(first.0 as usize) {
                let bank_id = BankId::new(bm.rank(), bm.bank_group(), bm.bank());
                if let Ok(time) = self.checker.time_to_satisfy_constraints(command, bank_id) {
                    out.push(Candidate {
                        source: CandidateSource::Refresh(rank),
                        cmd: command,
                        bank_id,
                        request: None,
                        time,
                        urgent,
                    });
                }
            }
            return;
        }

        for &bank in &claimed {
            let Some(bm) = self.bank_machines.get(bank.0 as usize) else {
                continue;
            };
            if bm.is_idle() && bm.is_activated() {
                let bank_id = BankId::new(bm.rank(), bm.bank_group(), bm.bank());
                if let Ok(time) = self
                    .checker
                    .time_to_satisfy_constraints(Command::Prepb, bank_id)
                {
                    out.push(Candidate {
                        source: CandidateSource::ForcedPrecharge(bank.0),
                        cmd: Command::Prepb,
                        bank_id,
                        request: None,
                        time,
                        urgent,
                    });
                }
            }
        }
    }

    fn collect_power_down_candidates(&mut self, rank: Rank, now: u64, out: &mut Vec<Candidate>) {
        let rank_banks: Vec<usize> = self
            .bank_machines
            .iter()
            .enumerate()
            .filter(|(_, bm)| bm.rank() == rank)
            .map(|(idx, _)| idx)
            .collect();
        let Some(&first) = rank_banks.first() else {
            return;
        };

        let all_idle = rank_banks.iter().all(|&idx| self.bank_machines[idx].is_idle());
        let all_precharged = rank_banks
            .iter()
            .all(|&idx| self.bank_machines[idx].is_idle() && self.bank_machines[idx].is_precharged());

        let power_down = &self.power_down[rank.0 as usize];
        let cmd = if power_down.state() == crate::powerdown::RankPowerState::Active {
            power_down.evaluate(now, all_idle, all_precharged)
        } else if self.rank_has_pending_request(rank) {
            power_down.evaluate_exit()
        } else {
            None
        };

        let Some(cmd) = cmd else { return };
        let bm = &self.bank_machines[first];
        let bank_id = BankId::new(bm.rank(), bm.bank_group(), bm.bank());
        if let Ok(time) = self.checker.time_to_satisfy_constraints(cmd, bank_id) {
            out.push(Candidate {
                source: CandidateSource::PowerDown(rank),
                cmd,
                bank_id,
                request: None,
                time,
                urgent: false,
            });
        }
    }

    fn rank_has_pending_request(&self, rank: Rank) -> bool {
        self.bank_machines
            .iter()
            .filter(|bm| bm.rank() == rank)
            .any(|bm| {
                let bank = bm.bank();
                self.scheduler.has_further_request(bank, Direction::Read)
                    || self.scheduler.has_further_request(bank, Direction::Write)
            })
    }

    fn issue(&mut self, candidate: Candidate, now: u64) -> ControllerResult<()> {
        let Candidate {
            source,
            cmd,
            bank_id,
            request,
            time,
            urgent: _,
        } = candidate;

        if time != now {
            return Err(ControllerError::ProtocolViolation {
                cmd,
                rank: bank_id.rank,
                bank: bank_id.bank,
                now,
                reason: "candidate time diverged from the cycle it was issued at".to_owned(),
            });
        }

        self.checker.insert(cmd, bank_id, now)?;
        self.observer.on_command_issued(cmd, bank_id.bank, now);
        debug!(?cmd, bank = ?bank_id.bank, now, "command issued");

        match source {
            CandidateSource::Bank(idx) => {
                if let Some(bm) = self.bank_machines.get_mut(idx as usize) {
                    bm.update(cmd, &self.memspec);
                }
                self.power_down[bank_id.rank.0 as usize].note_activity(now);
                if cmd.class() == CommandClass::Cas {
                    if let Some(req) = request {
                        self.scheduler.remove_request(req.id);
                        self.schedule_completion(cmd, &req, now);
                    }
                }
            }
            CandidateSource::ForcedPrecharge(idx) => {
                if let Some(bm) = self.bank_machines.get_mut(idx as usize) {
                    bm.update(cmd, &self.memspec);
                }
            }
            CandidateSource::Refresh(rank) => {
                for bank in self.refresh.blocked_banks(rank) {
                    if let Some(bm) = self.bank_machines.get_mut(bank.0 as usize) {
                        bm.update(cmd, &self.memspec);
                    }
                }
                self.refresh.record_issued(rank, now);
                self.observer.on_refresh_issued(cmd, rank, now);
            }
            CandidateSource::PowerDown(rank) => {
                for bm in self
                    .bank_machines
                    .iter_mut()
                    .filter(|bm| bm.rank() == rank)
                {
                    bm.update(cmd, &self.memspec);
                }
                let power_down = &mut self.power_down[rank.0 as usize];
                power_down.update(cmd, now);
                let new_state = power_down.state();
                self.observer.on_power_state_changed(rank, new_state, now);
            }
        }

        Ok(())
    }

    fn schedule_completion(&mut self, cmd: Command, request: &Request, now: u64) {
        match request.direction {
            Direction::Read => {
                if let Some((_, end)) = self.memspec.data_strobe_interval(cmd, now) {
                    self.pending_completions.push(Reverse((end, request.id)));
                } else {
                    self.observer.on_request_completed(request.id, now);
                }
            }
            Direction::Write => {
                self.observer.on_request_completed(request.id, now);
            }
        }
    }
}
