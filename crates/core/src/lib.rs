//! Cycle-accurate DRAM subsystem simulator library.
//!
//! This crate implements a per-channel JEDEC DRAM memory controller with
//! the following:
//! 1. **Common:** Strongly typed addressing coordinates, the closed set of
//!    DRAM commands, and the controller's error types.
//! 2. **MemSpec:** Deserializable JEDEC timing and geometry specification
//!    (DDR3 through LPDDR5/GDDR6/HBM2).
//! 3. **Config:** Hierarchical controller configuration — page policy,
//!    scheduler, arbiter, refresh, and power-down selection.
//! 4. **Bank:** Per-bank page-policy state machines.
//! 5. **Checker:** The declarative JEDEC timing constraint table and the
//!    clock oracle built on top of it.
//! 6. **Scheduler:** Per-channel request queueing (FIFO, FR-FCFS,
//!    FR-FCFS-Grp).
//! 7. **Refresh:** Per-rank refresh due-time tracking and budget
//!    enforcement.
//! 8. **Power-down:** Per-rank low-power state machine.
//! 9. **Arbiter:** Initiator-side admission control and response
//!    resequencing.
//! 10. **Controller:** The per-channel command arbitration loop tying
//!     every other module together.
//! 11. **Observer:** The external event hook trace/power/metrics
//!     consumers implement.

/// Strongly typed coordinates, the DRAM command set, and error types.
pub mod common;
/// Memory controller configuration: policies and the hierarchical
/// `McConfig` structure.
pub mod config;
/// DRAM timing and geometry specification (`MemSpec`).
pub mod memspec;
/// Requests flowing through the controller pipeline.
pub mod request;
/// External observation hook (`ControllerObserver`).
pub mod observer;
/// Per-bank page-policy state machines.
pub mod bank;
/// Declarative JEDEC timing constraint table and clock oracle.
pub mod checker;
/// Per-channel request scheduling policies.
pub mod scheduler;
/// Per-rank refresh due-time tracking.
pub mod refresh;
/// Per-rank power-down and self-refresh state machine.
pub mod powerdown;
/// Initiator-side arbiter.
pub mod arbiter;
/// The per-channel controller loop.
pub mod controller;

/// Initiator-side arbiter; routes requests into a channel and resequences
/// their responses.
pub use crate::arbiter::Arbiter;
/// Per-bank page-management policy and state machine.
pub use crate::bank::{BankMachine, PagePolicy};
/// The per-channel command arbitration loop.
pub use crate::controller::Controller;
/// Root memory-controller configuration; use `McConfig::default()` or
/// deserialize from JSON.
pub use crate::config::McConfig;
/// A fully populated DRAM timing and geometry specification.
pub use crate::memspec::MemSpec;
/// A single initiator request as it flows through the channel pipeline.
pub use crate::request::Request;
