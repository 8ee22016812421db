//! DRAM command enumeration and classification.
//!
//! This module defines the closed set of JEDEC commands the controller may
//! issue to a channel, plus the bus class each belongs to. The timing
//! checker and bank machines never invent a command outside this set.

use std::fmt;

/// A DRAM command the controller may issue on a channel.
///
/// This enumeration spans the command sets of every family `MemSpec`
/// supports; a given family's constraint table only has rows for the
/// subset it actually uses (for example, `Rfmab`/`Rfmpb` only appear for
/// DDR5-class families).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// No operation; never issued, only used as a bank machine's idle
    /// candidate.
    Nop,
    /// Activate: opens a row into the bank's sense amplifiers.
    Act,
    /// Column read, row stays open afterward.
    Rd,
    /// Column write, row stays open afterward.
    Wr,
    /// Masked column write (partial-beat write), row stays open afterward.
    Mwr,
    /// Column read with auto-precharge.
    Rda,
    /// Column write with auto-precharge.
    Wra,
    /// Masked column write with auto-precharge.
    Mwra,
    /// Precharge a single bank.
    Prepb,
    /// Precharge every bank in the rank.
    Preab,
    /// Precharge a single bank group's worth of banks (x16 DDR5 class).
    Presb,
    /// All-bank refresh.
    Refab,
    /// Per-bank refresh.
    Refpb,
    /// Per-two-bank refresh.
    Refp2b,
    /// Same-bank refresh (across bank groups).
    Refsb,
    /// Refresh-management command, all-bank.
    Rfmab,
    /// Refresh-management command, per-bank.
    Rfmpb,
    /// Refresh-management command, per-two-bank.
    Rfmp2b,
    /// Refresh-management command, same-bank.
    Rfmsb,
    /// Enter active power-down.
    Pdea,
    /// Exit active power-down.
    Pdxa,
    /// Enter precharged power-down.
    Pdep,
    /// Exit precharged power-down.
    Pdxp,
    /// Enter self-refresh.
    Srefen,
    /// Exit self-refresh.
    Srefex,
}

/// The bus (or internal FSM) class a command belongs to, used by the
/// timing checker to pick the right occupancy track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandClass {
    /// Row-address-strobe commands: ACT and the PRE family.
    Ras,
    /// Column-address-strobe commands: RD/WR and their auto-precharge and
    /// masked variants.
    Cas,
    /// Refresh and refresh-management commands.
    Refresh,
    /// Power-down and self-refresh entry/exit commands.
    PowerDown,
    /// No-op; has no bus footprint.
    None,
}

impl Command {
    /// Classifies the command into its bus/FSM category.
    ///
    /// # Returns
    ///
    /// The `CommandClass` the timing checker should charge this command's
    /// occupancy against.
    #[must_use]
    pub const fn class(self) -> CommandClass {
        match self {
            Self::Nop => CommandClass::None,
            Self::Act | Self::Prepb | Self::Preab | Self::Presb => CommandClass::Ras,
            Self::Rd | Self::Wr | Self::Mwr | Self::Rda | Self::Wra | Self::Mwra => {
                CommandClass::Cas
            }
            Self::Refab
            | Self::Refpb
            | Self::Refp2b
            | Self::Refsb
            | Self::Rfmab
            | Self::Rfmpb
            | Self::Rfmp2b
            | Self::Rfmsb => CommandClass::Refresh,
            Self::Pdea | Self::Pdxa | Self::Pdep | Self::Pdxp | Self::Srefen | Self::Srefex => {
                CommandClass::PowerDown
            }
        }
    }

    /// Reports whether this command carries an implicit auto-precharge,
    /// closing its bank's row once the burst completes.
    #[must_use]
    pub const fn auto_precharges(self) -> bool {
        matches!(self, Self::Rda | Self::Wra | Self::Mwra)
    }

    /// Reports whether this command is a write-direction CAS command
    /// (including masked and auto-precharge variants).
    #[must_use]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Wr | Self::Wra | Self::Mwr | Self::Mwra)
    }

    /// Reports whether this command is a read-direction CAS command
    /// (including the auto-precharge variant).
    #[must_use]
    pub const fn is_read(self) -> bool {
        matches!(self, Self::Rd | Self::Rda)
    }

    /// Reports whether this command is an all-bank precharge or refresh,
    /// i.e. it affects every bank in the rank rather than a single bank.
    #[must_use]
    pub const fn is_all_bank(self) -> bool {
        matches!(self, Self::Preab | Self::Refab)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nop => "NOP",
            Self::Act => "ACT",
            Self::Rd => "RD",
            Self::Wr => "WR",
            Self::Mwr => "MWR",
            Self::Rda => "RDA",
            Self::Wra => "WRA",
            Self::Mwra => "MWRA",
            Self::Prepb => "PREPB",
            Self::Preab => "PREAB",
            Self::Presb => "PRESB",
            Self::Refab => "REFAB",
            Self::Refpb => "REFPB",
            Self::Refp2b => "REFP2B",
            Self::Refsb => "REFSB",
            Self::Rfmab => "RFMAB",
            Self::Rfmpb => "RFMPB",
            Self::Rfmp2b => "RFMP2B",
            Self::Rfmsb => "RFMSB",
            Self::Pdea => "PDEA",
            Self::Pdxa => "PDXA",
            Self::Pdep => "PDEP",
            Self::Pdxp => "PDXP",
            Self::Srefen => "SREFEN",
            Self::Srefex => "SREFEX",
        };
        write!(f, "{name}")
    }
}
