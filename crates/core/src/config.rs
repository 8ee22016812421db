//! Memory controller configuration.
//!
//! This module defines every configuration knob the controller pipeline
//! consumes, independent of the DRAM timing specification itself
//! ([`crate::memspec::MemSpec`]). It provides:
//! 1. **Defaults:** baseline controller-policy constants.
//! 2. **Policy enums:** page policy, scheduler, arbiter, refresh
//!    granularity, and power-down policy selectors.
//! 3. **`McConfig`:** the root, hierarchical, `serde`-deserializable
//!    configuration structure.

use serde::Deserialize;

/// Default configuration constants for the memory controller.
mod defaults {
    /// Per-channel scheduler request-buffer capacity.
    pub const REQUEST_BUFFER_SIZE: usize = 64;
    /// Maximum outstanding transactions per initiator thread.
    pub const MAX_ACTIVE_TRANSACTIONS: u32 = 16;
    /// Forward arbitration delay, in controller clock cycles.
    pub const ARBITRATION_DELAY_FW: u64 = 1;
    /// Backward arbitration delay, in controller clock cycles.
    pub const ARBITRATION_DELAY_BW: u64 = 1;
    /// Byte offset added to every decoded address before channel/rank/bank
    /// decoding.
    pub const ADDRESS_OFFSET: u64 = 0;
    /// Idle cycles before a rank is considered for power-down entry.
    pub const POWER_DOWN_IDLE_CYCLES: u64 = 32;
    /// Idle cycles before a rank in precharged power-down is considered
    /// for self-refresh entry.
    pub const SELF_REFRESH_IDLE_CYCLES: u64 = 1024;
}

/// Page-management policy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PagePolicyKind {
    /// See [`crate::bank::PagePolicy::Open`].
    #[default]
    Open,
    /// See [`crate::bank::PagePolicy::Closed`].
    Closed,
    /// See [`crate::bank::PagePolicy::OpenAdaptive`].
    OpenAdaptive,
    /// See [`crate::bank::PagePolicy::ClosedAdaptive`].
    ClosedAdaptive,
}

impl From<PagePolicyKind> for crate::bank::PagePolicy {
    fn from(kind: PagePolicyKind) -> Self {
        match kind {
            PagePolicyKind::Open => Self::Open,
            PagePolicyKind::Closed => Self::Closed,
            PagePolicyKind::OpenAdaptive => Self::OpenAdaptive,
            PagePolicyKind::ClosedAdaptive => Self::ClosedAdaptive,
        }
    }
}

/// Request scheduler policy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum SchedulerKind {
    /// Strict arrival-order scheduling, no row-hit reordering.
    Fifo,
    /// First-ready, first-come-first-served: prefer row hits.
    #[default]
    FrFcfs,
    /// First-ready, first-come-first-served with row-group stickiness.
    FrFcfsGrp,
}

/// Initiator-side arbiter policy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ArbiterKind {
    /// One outstanding transaction per thread, strict pass-through.
    Simple,
    /// Per-thread FIFO up to `max_active_transactions`.
    #[default]
    Fifo,
    /// Per-thread reorder buffer; responses re-sequenced to issue order.
    Reorder,
}

/// Refresh granularity selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum RefreshPolicy {
    /// Refresh every bank in a rank with a single command.
    #[default]
    AllBank,
    /// Refresh one bank at a time, round-robin.
    PerBank,
    /// Refresh two banks at a time, round-robin.
    PerTwoBank,
    /// Refresh the same bank across every bank group simultaneously.
    SameBank,
}

/// Rank power-down policy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PowerDownPolicy {
    /// Never enter a low-power state.
    #[default]
    Off,
    /// Enter active power-down only; never precharged power-down or
    /// self-refresh.
    Active,
    /// Enter precharged power-down once every bank is idle and
    /// precharged.
    Precharged,
    /// Enter self-refresh after an extended precharged-power-down idle
    /// period.
    SelfRefresh,
    /// Stagger power-down entry across ranks to avoid a simultaneous
    /// rank-wide current spike.
    Staggered,
}

/// Root memory-controller configuration.
///
/// # Examples
///
/// ```
/// use dramsys_core::config::{McConfig, SchedulerKind};
///
/// let config = McConfig::default();
/// assert_eq!(config.scheduler.kind, SchedulerKind::FrFcfs);
/// assert_eq!(config.request_buffer_size, 64);
/// ```
///
/// Deserializing from JSON:
///
/// ```
/// use dramsys_core::config::{ArbiterKind, McConfig, PagePolicyKind};
///
/// let json = r#"{
///     "page_policy": "ClosedAdaptive",
///     "scheduler": { "kind": "FrFcfsGrp" },
///     "arbiter": { "kind": "Reorder", "max_active_transactions": 32 },
///     "refresh": { "policy": "PerBank" },
///     "power_down": { "policy": "SelfRefresh" }
/// }"#;
///
/// let config: McConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.page_policy, PagePolicyKind::ClosedAdaptive);
/// assert_eq!(config.arbiter.kind, ArbiterKind::Reorder);
/// assert_eq!(config.arbiter.max_active_transactions, 32);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct McConfig {
    /// Page-management policy applied to every bank machine.
    #[serde(default)]
    pub page_policy: PagePolicyKind,

    /// Per-channel scheduler request-buffer capacity.
    #[serde(default = "McConfig::default_request_buffer_size")]
    pub request_buffer_size: usize,

    /// Whether refresh-management counters and commands are modeled
    /// (DDR5 RFM feature).
    #[serde(default)]
    pub refresh_management: bool,

    /// Scheduler configuration.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Arbiter configuration.
    #[serde(default)]
    pub arbiter: ArbiterConfig,

    /// Refresh manager configuration.
    #[serde(default)]
    pub refresh: RefreshConfig,

    /// Power-down/self-refresh policy configuration.
    #[serde(default)]
    pub power_down: PowerDownConfig,
}

impl McConfig {
    fn default_request_buffer_size() -> usize {
        defaults::REQUEST_BUFFER_SIZE
    }
}

impl Default for McConfig {
    fn default() -> Self {
        Self {
            page_policy: PagePolicyKind::default(),
            request_buffer_size: defaults::REQUEST_BUFFER_SIZE,
            refresh_management: false,
            scheduler: SchedulerConfig::default(),
            arbiter: ArbiterConfig::default(),
            refresh: RefreshConfig::default(),
            power_down: PowerDownConfig::default(),
        }
    }
}

/// Scheduler selection and sizing.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Which scheduling policy to instantiate.
    #[serde(default)]
    pub kind: SchedulerKind,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            kind: SchedulerKind::default(),
        }
    }
}

/// Arbiter selection and sizing.
#[derive(Debug, Clone, Deserialize)]
pub struct ArbiterConfig {
    /// Which arbitration policy to instantiate.
    #[serde(default)]
    pub kind: ArbiterKind,

    /// Maximum outstanding transactions per initiator thread (FIFO and
    /// Reorder variants only).
    #[serde(default = "ArbiterConfig::default_max_active_transactions")]
    pub max_active_transactions: u32,

    /// Forward arbitration delay, in controller clock cycles.
    #[serde(default = "ArbiterConfig::default_arbitration_delay_fw")]
    pub arbitration_delay_fw: u64,

    /// Backward arbitration delay, in controller clock cycles.
    #[serde(default = "ArbiterConfig::default_arbitration_delay_bw")]
    pub arbitration_delay_bw: u64,

    /// Byte offset added to every address before channel/rank/bank
    /// decoding.
    #[serde(default = "ArbiterConfig::default_address_offset")]
    pub address_offset: u64,
}

impl ArbiterConfig {
    fn default_max_active_transactions() -> u32 {
        defaults::MAX_ACTIVE_TRANSACTIONS
    }
    fn default_arbitration_delay_fw() -> u64 {
        defaults::ARBITRATION_DELAY_FW
    }
    fn default_arbitration_delay_bw() -> u64 {
        defaults::ARBITRATION_DELAY_BW
    }
    fn default_address_offset() -> u64 {
        defaults::ADDRESS_OFFSET
    }
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            kind: ArbiterKind::default(),
            max_active_transactions: defaults::MAX_ACTIVE_TRANSACTIONS,
            arbitration_delay_fw: defaults::ARBITRATION_DELAY_FW,
            arbitration_delay_bw: defaults::ARBITRATION_DELAY_BW,
            address_offset: defaults::ADDRESS_OFFSET,
        }
    }
}

/// Refresh manager configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// Refresh granularity.
    #[serde(default)]
    pub policy: RefreshPolicy,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            policy: RefreshPolicy::default(),
        }
    }
}

/// Power-down / self-refresh policy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PowerDownConfig {
    /// Which power-down policy to apply.
    #[serde(default)]
    pub policy: PowerDownPolicy,

    /// Idle cycles before a rank is considered for active power-down
    /// entry.
    #[serde(default = "PowerDownConfig::default_power_down_idle_cycles")]
    pub power_down_idle_cycles: u64,

    /// Idle cycles before a rank in precharged power-down is considered
    /// for self-refresh entry.
    #[serde(default = "PowerDownConfig::default_self_refresh_idle_cycles")]
    pub self_refresh_idle_cycles: u64,
}

impl PowerDownConfig {
    fn default_power_down_idle_cycles() -> u64 {
        defaults::POWER_DOWN_IDLE_CYCLES
    }
    fn default_self_refresh_idle_cycles() -> u64 {
        defaults::SELF_REFRESH_IDLE_CYCLES
    }
}

impl Default for PowerDownConfig {
    fn default() -> Self {
        Self {
            policy: PowerDownPolicy::default(),
            power_down_idle_cycles: defaults::POWER_DOWN_IDLE_CYCLES,
            self_refresh_idle_cycles: defaults::SELF_REFRESH_IDLE_CYCLES,
        }
    }
}
