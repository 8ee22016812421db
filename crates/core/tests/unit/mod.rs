//! Unit-style tests for individual modules, exercised through the crate's
//! public API from outside the crate.



/// Per-bank page-policy state machine behavior.
pub mod bank;

/// Declarative timing constraint table and clock oracle.
pub mod checker;

/// FIFO, FR-FCFS, and FR-FCFS-Grp scheduling policies.
pub mod scheduler;

/// Per-rank refresh due-time tracking and budgets.
pub mod refresh;

/// Per-rank power-down and self-refresh state machine.
pub mod powerdown;

/// Initiator-side arbiter admission and response resequencing.
pub mod arbiter;
