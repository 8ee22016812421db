//! The declarative constraint table the timing checker is built from.
//!
//! Every row below corresponds to one JEDEC inter-command timing parameter.
//! Families differ only in which rows apply (a family missing a parameter,
//! such as `tRRDL` on a part with no bank groups, simply never reaches the
//! corresponding branch) and what each delay resolves to from
//! [`MemSpec`](crate::memspec::MemSpec). This module has no public API
//! beyond [`earliest_time`] and [`insert`]; [`super::TimingChecker`] is the
//! crate-facing surface.

use std::collections::{HashMap, VecDeque};

use crate::common::{BankGroup, BankId, Command, CommandClass, Rank, Stack};
use crate::memspec::MemSpec;

/// Size of the four-activate window, in entries.
const FAW_WINDOW_LEN: usize = 4;

#[derive(Debug, Clone, Default)]
struct BankTimes {
    last_act: Option<u64>,
    last_pre: Option<u64>,
    last_read: Option<u64>,
    last_write: Option<u64>,
    last_refpb: Option<u64>,
}

#[derive(Debug, Clone, Default)]
struct GroupTimes {
    last_act: Option<u64>,
    last_read: Option<u64>,
    last_write: Option<u64>,
}

#[derive(Debug, Clone, Default)]
struct RankTimes {
    last_act: Option<u64>,
    last_pre: Option<u64>,
    last_read: Option<u64>,
    last_write: Option<u64>,
    last_refab: Option<u64>,
    /// Last `PDXA`/`PDXP` (power-down exit) issue time, gating the next
    /// command behind `tXP`.
    last_pd_exit: Option<u64>,
    /// Last `SREFEN` (self-refresh entry) issue time, gating `SREFEX`
    /// behind the minimum CKE pulse width `tCKESR`.
    last_sref_entry: Option<u64>,
    /// Last `SREFEX` (self-refresh exit) issue time, gating the next
    /// command behind `tXS`.
    last_sref_exit: Option<u64>,
    faw_window: VecDeque<u64>,
}

#[derive(Debug, Clone, Default)]
struct BusTimes {
    command_bus_free_at: u64,
    ras_bus_free_at: u64,
    cas_bus_free_at: u64,
}

/// Mutable timing state for one channel.
///
/// Keyed by the coordinate scope each row of commentary in this module's
/// doc comment names: per bank, per bank-group, per rank, and the channel's
/// shared bus(es).
#[derive(Debug, Clone, Default)]
pub(super) struct TimingTable {
    bank: HashMap<BankId, BankTimes>,
    group: HashMap<(Rank, Stack, BankGroup), GroupTimes>,
    rank: HashMap<(Rank, Stack), RankTimes>,
    bus: BusTimes,
}

impl TimingTable {
    pub(super) fn new() -> Self {
        Self::default()
    }

    fn bank_times(&self, bank: BankId) -> BankTimes {
        self.bank.get(&bank).cloned().unwrap_or_default()
    }

    fn group_times(&self, bank: BankId) -> GroupTimes {
        self.group
            .get(&(bank.rank, bank.stack, bank.bank_group))
            .cloned()
            .unwrap_or_default()
    }

    fn rank_times(&self, bank: BankId) -> RankTimes {
        self.rank
            .get(&(bank.rank, bank.stack))
            .cloned()
            .unwrap_or_default()
    }
}

/// Returns the earliest absolute cycle `cmd`, targeting `bank`, satisfies
/// every constraint row currently on record.
pub(super) fn earliest_time(table: &TimingTable, spec: &MemSpec, cmd: Command, bank: BankId) -> u64 {
    let b = table.bank_times(bank);
    let g = table.group_times(bank);
    let r = table.rank_times(bank);

    let mut t = bus_ready(table, spec, cmd);

    match cmd {
        Command::Act => {
            t = t.max(after(b.last_act, spec.t_rc));
            t = t.max(after(b.last_pre, spec.t_rp));
            t = t.max(after(r.last_pre, spec.t_rp));
            t = t.max(after(b.last_refpb, spec.t_rfc_pb));
            t = t.max(after(r.last_refab, spec.t_rfc));
            t = t.max(after(r.last_pd_exit, spec.t_xp));
            t = t.max(after(r.last_sref_exit, spec.t_xs));
            if spec.family.has_bank_groups() {
                t = t.max(after(g.last_act, spec.t_rrd_l));
            }
            t = t.max(after(r.last_act, spec.t_rrd_s));
            if r.faw_window.len() >= FAW_WINDOW_LEN {
                let oldest = r.faw_window[r.faw_window.len() - FAW_WINDOW_LEN];
                t = t.max(oldest + spec.t_faw);
            }
        }
        Command::Rd | Command::Rda => {
            t = t.max(after(b.last_act, spec.t_rcd));
            if spec.family.has_bank_groups() {
                t = t.max(after(g.last_read, spec.t_ccd_l));
            }
            t = t.max(after(r.last_read, spec.t_ccd_s));
            t = t.max(after(r.last_write, spec.t_wtr));
            t = t.max(after(r.last_pd_exit, spec.t_xp));
            t = t.max(after(r.last_sref_exit, spec.t_xs));
        }
        Command::Wr | Command::Wra | Command::Mwr | Command::Mwra => {
            t = t.max(after(b.last_act, spec.t_rcd));
            if spec.family.has_bank_groups() {
                t = t.max(after(g.last_write, spec.t_ccd_l));
            }
            t = t.max(after(r.last_write, spec.t_ccd_s));
            t = t.max(after(r.last_read, spec.t_rtw));
            t = t.max(after(r.last_pd_exit, spec.t_xp));
            t = t.max(after(r.last_sref_exit, spec.t_xs));
        }
        Command::Prepb => {
            t = t.max(after(b.last_act, spec.t_ras));
            t = t.max(after(b.last_read, spec.t_rtp));
            t = t.max(after(b.last_write, spec.t_wr));
            t = t.max(after(r.last_pd_exit, spec.t_xp));
        }
        Command::Preab | Command::Presb => {
            t = t.max(after(r.last_act, spec.t_ras));
            t = t.max(after(r.last_read, spec.t_rtp));
            t = t.max(after(r.last_write, spec.t_wr));
            t = t.max(after(r.last_pd_exit, spec.t_xp));
        }
        Command::Srefex => {
            t = t.max(after(r.last_sref_entry, spec.t_ckesr));
        }
        Command::Refab
        | Command::Refpb
        | Command::Refp2b
        | Command::Refsb
        | Command::Rfmab
        | Command::Rfmpb
        | Command::Rfmp2b
        | Command::Rfmsb
        | Command::Pdea
        | Command::Pdxa
        | Command::Pdep
        | Command::Pdxp
        | Command::Srefen
        | Command::Nop => {}
    }

    t
}

/// Folds a just-issued command into the table.
pub(super) fn insert(table: &mut TimingTable, spec: &MemSpec, cmd: Command, bank: BankId, time: u64) {
    let length = spec.command_length(cmd);
    update_bus(table, spec, cmd, time, length);

    let b = table.bank.entry(bank).or_default();
    let g = table
        .group
        .entry((bank.rank, bank.stack, bank.bank_group))
        .or_default();
    let r = table.rank.entry((bank.rank, bank.stack)).or_default();

    match cmd {
        Command::Act => {
            b.last_act = Some(time);
            g.last_act = Some(time);
            r.last_act = Some(time);
            r.faw_window.push_back(time);
            while r.faw_window.len() > FAW_WINDOW_LEN {
                let _ = r.faw_window.pop_front();
            }
        }
        Command::Rd | Command::Rda => {
            b.last_read = Some(time);
            g.last_read = Some(time);
            r.last_read = Some(time);
            if cmd.auto_precharges() {
                b.last_pre = Some(time + spec.t_rtp);
            }
        }
        Command::Wr | Command::Wra | Command::Mwr | Command::Mwra => {
            b.last_write = Some(time);
            g.last_write = Some(time);
            r.last_write = Some(time);
            if cmd.auto_precharges() {
                b.last_pre = Some(time + spec.t_wr);
            }
        }
        Command::Prepb => {
            b.last_pre = Some(time);
        }
        Command::Preab | Command::Presb => {
            r.last_pre = Some(time);
        }
        Command::Refab => {
            r.last_refab = Some(time);
        }
        Command::Refpb | Command::Refp2b | Command::Refsb => {
            b.last_refpb = Some(time);
        }
        Command::Pdxa | Command::Pdxp => {
            r.last_pd_exit = Some(time);
        }
        Command::Srefen => {
            r.last_sref_entry = Some(time);
        }
        Command::Srefex => {
            r.last_sref_exit = Some(time);
        }
        Command::Rfmab
        | Command::Rfmpb
        | Command::Rfmp2b
        | Command::Rfmsb
        | Command::Pdea
        | Command::Pdep
        | Command::Nop => {}
    }
}

fn bus_ready(table: &TimingTable, spec: &MemSpec, cmd: Command) -> u64 {
    if !spec.family.has_stacks() {
        table.bus.command_bus_free_at
    } else if cmd.class() == CommandClass::Cas {
        table.bus.cas_bus_free_at
    } else {
        table.bus.ras_bus_free_at
    }
}

fn update_bus(table: &mut TimingTable, spec: &MemSpec, cmd: Command, time: u64, length: u64) {
    let free_at = time + length;
    if cmd.class() == CommandClass::Cas {
        table.bus.cas_bus_free_at = free_at;
        if !spec.family.has_stacks() {
            table.bus.command_bus_free_at = free_at;
        }
    } else {
        table.bus.ras_bus_free_at = free_at;
        if !spec.family.has_stacks() {
            table.bus.command_bus_free_at = free_at;
        }
    }
}

fn after(last: Option<u64>, delay: u64) -> u64 {
    last.map_or(0, |t| t + delay)
}
