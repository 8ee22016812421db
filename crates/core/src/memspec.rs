//! DRAM memory specification: JEDEC timing constants and bank geometry.
//!
//! `MemSpec` is read-only configuration consumed by every other module in
//! this crate. It is not this crate's job to parse a JSON/XML DRAM
//! specification file into one — a `MemSpec` is handed over already
//! populated — but the type itself, its derived geometry, and the small
//! set of command-shape queries (`command_length`, `requires_masked_write`)
//! live here because the timing checker and bank machines depend on them.

use serde::Deserialize;

use crate::common::{Command, ControllerError, ControllerResult};

/// Baseline timing constants shared by the bundled example specifications.
///
/// These mirror a representative DDR4-2400 part; real specifications are
/// expected to override every field via deserialization.
mod defaults {
    /// Controller clock period, in picoseconds.
    pub const T_CK_PS: u64 = 833;

    /// ACT-to-RD/WR delay (row-to-column).
    pub const T_RCD: u64 = 14;
    /// Row precharge time.
    pub const T_RP: u64 = 14;
    /// Row active time (ACT to PRE minimum).
    pub const T_RAS: u64 = 32;
    /// Row cycle time (ACT to ACT, same bank).
    pub const T_RC: u64 = 46;
    /// Read-to-precharge delay.
    pub const T_RTP: u64 = 8;
    /// Write recovery time.
    pub const T_WR: u64 = 16;
    /// Write-to-read turnaround, same rank.
    pub const T_WTR: u64 = 8;
    /// Read-to-write turnaround, same rank.
    pub const T_RTW: u64 = 4;
    /// CAS-to-CAS delay, same bank group.
    pub const T_CCD_L: u64 = 6;
    /// CAS-to-CAS delay, different bank group.
    pub const T_CCD_S: u64 = 4;
    /// ACT-to-ACT delay, different bank group, same rank.
    pub const T_RRD_L: u64 = 6;
    /// ACT-to-ACT delay, different bank group or no bank groups, same rank.
    pub const T_RRD_S: u64 = 5;
    /// Four-activate window.
    pub const T_FAW: u64 = 22;
    /// All-bank refresh cycle time.
    pub const T_RFC: u64 = 350;
    /// Per-bank refresh cycle time.
    pub const T_RFC_PB: u64 = 90;
    /// Average refresh interval.
    pub const T_REFI: u64 = 7800;
    /// Exit power-down to first valid command.
    pub const T_XP: u64 = 8;
    /// Exit self-refresh to first valid command.
    pub const T_XS: u64 = 360;
    /// CKE minimum pulse width during self-refresh.
    pub const T_CKESR: u64 = 9;
    /// CAS burst duration on the data bus, in controller cycles.
    pub const BURST_DURATION: u64 = 4;

    /// Ranks per channel.
    pub const RANKS: u32 = 1;
    /// Bank groups per rank.
    pub const BANK_GROUPS: u32 = 4;
    /// Banks per bank group.
    pub const BANKS_PER_GROUP: u32 = 4;
    /// Rows per bank.
    pub const ROWS: u64 = 65536;
    /// Columns per row.
    pub const COLUMNS: u64 = 1024;
    /// Maximum postponed refreshes before the refresh manager forces one.
    pub const REFRESH_MAX_POSTPONED: u32 = 8;
    /// Maximum refreshes the refresh manager may pull in early.
    pub const REFRESH_MAX_PULLEDIN: u32 = 8;
    /// Rolling-accumulated-activate decrement from an ordinary refresh.
    pub const RAADEC: u64 = 64;
    /// Rolling-accumulated-activate decrement from a refresh-management
    /// command.
    pub const RAAIMT: u64 = 128;
}

/// DRAM device family.
///
/// The constraint table builder (`crate::checker::table`) switches on this
/// to decide which rows apply; it is otherwise inert data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Family {
    /// DDR3 SDRAM: no bank groups.
    Ddr3,
    /// DDR4 SDRAM: introduces bank groups and masked writes.
    #[default]
    Ddr4,
    /// DDR5 SDRAM: adds same-bank refresh and refresh-management commands.
    Ddr5,
    /// LPDDR4: mobile low-power part, per-bank refresh only.
    Lpddr4,
    /// LPDDR5: mobile low-power part with bank groups.
    Lpddr5,
    /// Graphics DDR6: very high bank-group count, no rank concept.
    Gddr6,
    /// High Bandwidth Memory generation 2: stacked dies, split RAS/CAS
    /// pseudo-channels.
    Hbm2,
}

impl Family {
    /// Reports whether this family defines bank groups (and therefore the
    /// `tCCDL`/`tCCDS`/`tRRDL`/`tRRDS` distinction).
    #[must_use]
    pub const fn has_bank_groups(self) -> bool {
        !matches!(self, Self::Ddr3 | Self::Lpddr4)
    }

    /// Reports whether this family defines die stacks (HBM only).
    #[must_use]
    pub const fn has_stacks(self) -> bool {
        matches!(self, Self::Hbm2)
    }

    /// Reports whether this family supports refresh-management commands
    /// (RFM family), introduced with DDR5.
    #[must_use]
    pub const fn has_refresh_management(self) -> bool {
        matches!(self, Self::Ddr5)
    }
}

/// A fully populated DRAM timing and geometry specification.
///
/// # Examples
///
/// Deserializing a specification from JSON:
///
/// ```
/// use dramsys_core::memspec::MemSpec;
///
/// let json = r#"{
///     "family": "Ddr4",
///     "t_ck_ps": 833,
///     "t_rcd": 14, "t_rp": 14, "t_ras": 32, "t_rc": 46,
///     "t_rtp": 8, "t_wr": 16, "t_wtr": 8, "t_rtw": 4,
///     "t_ccd_l": 6, "t_ccd_s": 4, "t_rrd_l": 6, "t_rrd_s": 5,
///     "t_faw": 22, "t_rfc": 350, "t_rfc_pb": 90, "t_refi": 7800,
///     "t_xp": 8, "t_xs": 360, "t_ckesr": 9, "burst_duration": 4,
///     "ranks": 1, "bank_groups": 4, "banks_per_group": 4,
///     "rows": 65536, "columns": 1024,
///     "refresh_max_postponed": 8, "refresh_max_pulledin": 8
/// }"#;
///
/// let spec: MemSpec = serde_json::from_str(json).unwrap();
/// assert_eq!(spec.banks_per_rank(), 16);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct MemSpec {
    /// Device family; selects the applicable constraint-table rows.
    #[serde(default)]
    pub family: Family,

    /// Controller clock period, in picoseconds.
    #[serde(default = "MemSpec::default_t_ck_ps")]
    pub t_ck_ps: u64,

    /// ACT-to-RD/WR delay.
    #[serde(default = "MemSpec::default_t_rcd")]
    pub t_rcd: u64,
    /// Row precharge time.
    #[serde(default = "MemSpec::default_t_rp")]
    pub t_rp: u64,
    /// Row active time.
    #[serde(default = "MemSpec::default_t_ras")]
    pub t_ras: u64,
    /// Row cycle time.
    #[serde(default = "MemSpec::default_t_rc")]
    pub t_rc: u64,
    /// Read-to-precharge delay.
    #[serde(default = "MemSpec::default_t_rtp")]
    pub t_rtp: u64,
    /// Write recovery time.
    #[serde(default = "MemSpec::default_t_wr")]
    pub t_wr: u64,
    /// Write-to-read turnaround, same rank.
    #[serde(default = "MemSpec::default_t_wtr")]
    pub t_wtr: u64,
    /// Read-to-write turnaround, same rank.
    #[serde(default = "MemSpec::default_t_rtw")]
    pub t_rtw: u64,
    /// CAS-to-CAS delay, same bank group.
    #[serde(default = "MemSpec::default_t_ccd_l")]
    pub t_ccd_l: u64,
    /// CAS-to-CAS delay, different bank group.
    #[serde(default = "MemSpec::default_t_ccd_s")]
    pub t_ccd_s: u64,
    /// ACT-to-ACT delay, same bank group.
    #[serde(default = "MemSpec::default_t_rrd_l")]
    pub t_rrd_l: u64,
    /// ACT-to-ACT delay, different bank group.
    #[serde(default = "MemSpec::default_t_rrd_s")]
    pub t_rrd_s: u64,
    /// Four-activate window.
    #[serde(default = "MemSpec::default_t_faw")]
    pub t_faw: u64,
    /// All-bank refresh cycle time.
    #[serde(default = "MemSpec::default_t_rfc")]
    pub t_rfc: u64,
    /// Per-bank refresh cycle time.
    #[serde(default = "MemSpec::default_t_rfc_pb")]
    pub t_rfc_pb: u64,
    /// Average refresh interval.
    #[serde(default = "MemSpec::default_t_refi")]
    pub t_refi: u64,
    /// Exit power-down to first valid command.
    #[serde(default = "MemSpec::default_t_xp")]
    pub t_xp: u64,
    /// Exit self-refresh to first valid command.
    #[serde(default = "MemSpec::default_t_xs")]
    pub t_xs: u64,
    /// CKE minimum pulse width during self-refresh.
    #[serde(default = "MemSpec::default_t_ckesr")]
    pub t_ckesr: u64,
    /// CAS burst duration on the data bus, in controller cycles.
    #[serde(default = "MemSpec::default_burst_duration")]
    pub burst_duration: u64,

    /// Ranks per channel.
    #[serde(default = "MemSpec::default_ranks")]
    pub ranks: u32,
    /// Bank groups per rank (1 if the family has no bank-group concept).
    #[serde(default = "MemSpec::default_bank_groups")]
    pub bank_groups: u32,
    /// Banks per bank group.
    #[serde(default = "MemSpec::default_banks_per_group")]
    pub banks_per_group: u32,
    /// Rows per bank.
    #[serde(default = "MemSpec::default_rows")]
    pub rows: u64,
    /// Columns per row.
    #[serde(default = "MemSpec::default_columns")]
    pub columns: u64,

    /// Maximum refreshes the refresh manager may postpone before forcing
    /// one through.
    #[serde(default = "MemSpec::default_refresh_max_postponed")]
    pub refresh_max_postponed: u32,
    /// Maximum refreshes the refresh manager may issue ahead of schedule.
    #[serde(default = "MemSpec::default_refresh_max_pulledin")]
    pub refresh_max_pulledin: u32,

    /// Rolling-accumulated-activate decrement applied to a bank's
    /// refresh-management counter by an ordinary refresh (DDR5 RFM
    /// feature). Meaningless for families without refresh management.
    #[serde(default = "MemSpec::default_raadec")]
    pub raadec: u64,
    /// Rolling-accumulated-activate decrement applied by an explicit
    /// refresh-management command (DDR5 RFM feature).
    #[serde(default = "MemSpec::default_raaimt")]
    pub raaimt: u64,
}

impl MemSpec {
    fn default_t_ck_ps() -> u64 {
        defaults::T_CK_PS
    }
    fn default_t_rcd() -> u64 {
        defaults::T_RCD
    }
    fn default_t_rp() -> u64 {
        defaults::T_RP
    }
    fn default_t_ras() -> u64 {
        defaults::T_RAS
    }
    fn default_t_rc() -> u64 {
        defaults::T_RC
    }
    fn default_t_rtp() -> u64 {
        defaults::T_RTP
    }
    fn default_t_wr() -> u64 {
        defaults::T_WR
    }
    fn default_t_wtr() -> u64 {
        defaults::T_WTR
    }
    fn default_t_rtw() -> u64 {
        defaults::T_RTW
    }
    fn default_t_ccd_l() -> u64 {
        defaults::T_CCD_L
    }
    fn default_t_ccd_s() -> u64 {
        defaults::T_CCD_S
    }
    fn default_t_rrd_l() -> u64 {
        defaults::T_RRD_L
    }
    fn default_t_rrd_s() -> u64 {
        defaults::T_RRD_S
    }
    fn default_t_faw() -> u64 {
        defaults::T_FAW
    }
    fn default_t_rfc() -> u64 {
        defaults::T_RFC
    }
    fn default_t_rfc_pb() -> u64 {
        defaults::T_RFC_PB
    }
    fn default_t_refi() -> u64 {
        defaults::T_REFI
    }
    fn default_t_xp() -> u64 {
        defaults::T_XP
    }
    fn default_t_xs() -> u64 {
        defaults::T_XS
    }
    fn default_t_ckesr() -> u64 {
        defaults::T_CKESR
    }
    fn default_burst_duration() -> u64 {
        defaults::BURST_DURATION
    }
    fn default_ranks() -> u32 {
        defaults::RANKS
    }
    fn default_bank_groups() -> u32 {
        defaults::BANK_GROUPS
    }
    fn default_banks_per_group() -> u32 {
        defaults::BANKS_PER_GROUP
    }
    fn default_rows() -> u64 {
        defaults::ROWS
    }
    fn default_columns() -> u64 {
        defaults::COLUMNS
    }
    fn default_refresh_max_postponed() -> u32 {
        defaults::REFRESH_MAX_POSTPONED
    }
    fn default_refresh_max_pulledin() -> u32 {
        defaults::REFRESH_MAX_PULLEDIN
    }
    fn default_raadec() -> u64 {
        defaults::RAADEC
    }
    fn default_raaimt() -> u64 {
        defaults::RAAIMT
    }

    /// Validates internal geometry consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::InconsistentMemSpec`] if any geometry
    /// field is zero, or if the family does not support the configured
    /// bank-group/stack combination.
    pub fn validate(&self) -> ControllerResult<()> {
        if self.ranks == 0 || self.bank_groups == 0 || self.banks_per_group == 0 {
            return Err(ControllerError::InconsistentMemSpec(
                "ranks, bank_groups, and banks_per_group must all be non-zero".to_owned(),
            ));
        }
        if !self.family.has_bank_groups() && self.bank_groups != 1 {
            return Err(ControllerError::InconsistentMemSpec(format!(
                "{:?} has no bank-group concept but bank_groups = {}",
                self.family, self.bank_groups
            )));
        }
        Ok(())
    }

    /// Number of physical banks per rank.
    #[must_use]
    pub const fn banks_per_rank(&self) -> u32 {
        self.bank_groups * self.banks_per_group
    }

    /// Duration, in controller clock cycles, that `cmd` occupies its bus.
    ///
    /// CAS commands occupy the data bus for `burst_duration` cycles; every
    /// other command is treated as a single-cycle command-bus occupant.
    #[must_use]
    pub const fn command_length(&self, cmd: Command) -> u64 {
        match cmd.class() {
            crate::common::CommandClass::Cas => self.burst_duration,
            _ => 1,
        }
    }

    /// The data-strobe window `cmd` occupies on the data bus, in absolute
    /// controller cycles.
    ///
    /// Returns `None` for non-CAS commands, which have no data-bus
    /// footprint. This crate has no separate CAS-latency field; the strobe
    /// is taken to open `t_rcd` cycles after the command issues, the same
    /// approximation the bundled DDR4-2400 defaults make (`tRCD == CL`).
    #[must_use]
    pub const fn data_strobe_interval(&self, cmd: Command, issue_time: u64) -> Option<(u64, u64)> {
        if !matches!(cmd.class(), crate::common::CommandClass::Cas) {
            return None;
        }
        let start = issue_time + self.t_rcd;
        Some((start, start + self.burst_duration))
    }

    /// Reports whether the given write command should be substituted with
    /// its masked-write variant.
    ///
    /// A write is masked whenever the request's byte-enable mask does not
    /// cover the entire burst — i.e. it is a sub-burst partial write. This
    /// crate's `Request` carries that as an explicit flag rather than a
    /// byte mask, since the mask computation itself belongs to the
    /// initiator side.
    #[must_use]
    pub const fn requires_masked_write(masked: bool) -> bool {
        masked
    }
}
