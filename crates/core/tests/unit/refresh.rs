use dramsys_core::common::{Command, Rank};
use dramsys_core::config::RefreshPolicy;
use dramsys_core::refresh::{RefreshDecision, RefreshManager};

use crate::common::harness;

#[test]
fn no_refresh_due_before_trefi_elapses() {
    let spec = harness::memspec("{}");
    let mut manager = RefreshManager::new(RefreshPolicy::AllBank, &spec, 1);

    assert_eq!(manager.poll(Rank(0), 0), RefreshDecision::None);
    assert_eq!(manager.poll(Rank(0), spec.t_refi - 1), RefreshDecision::None);
}

#[test]
fn all_bank_refresh_is_due_at_trefi_and_targets_no_single_bank() {
    let spec = harness::memspec("{}");
    let mut manager = RefreshManager::new(RefreshPolicy::AllBank, &spec, 1);

    match manager.poll(Rank(0), spec.t_refi) {
        RefreshDecision::Issue { command, bank } => {
            assert_eq!(command, Command::Refab);
            assert_eq!(bank, None);
        }
        RefreshDecision::None => panic!("refresh must be due at t_refi"),
    }
}

#[test]
fn per_bank_refresh_round_robins_across_banks() {
    let spec = harness::memspec(r#"{"bank_groups": 2, "banks_per_group": 2}"#);
    let mut manager = RefreshManager::new(RefreshPolicy::PerBank, &spec, 1);

    let RefreshDecision::Issue { bank: first, .. } = manager.poll(Rank(0), spec.t_refi) else {
        panic!("refresh must be due");
    };
    manager.record_issued(Rank(0), spec.t_refi);

    let RefreshDecision::Issue { bank: second, .. } = manager.poll(Rank(0), 2 * spec.t_refi)
    else {
        panic!("second refresh must be due");
    };

    assert_ne!(first, second);
}

#[test]
fn record_issued_advances_next_due_time_by_trefi() {
    let spec = harness::memspec("{}");
    let mut manager = RefreshManager::new(RefreshPolicy::AllBank, &spec, 1);

    manager.record_issued(Rank(0), spec.t_refi);
    assert_eq!(manager.next_due(Rank(0)), 2 * spec.t_refi);
}

#[test]
fn tick_flags_overrun_once_postponed_budget_is_exceeded() {
    let spec = harness::memspec(r#"{"refresh_max_postponed": 2}"#);
    let mut manager = RefreshManager::new(RefreshPolicy::AllBank, &spec, 1);

    let mut overruns = Vec::new();
    for cycle in 0..4 {
        overruns = manager.tick(spec.t_refi + cycle);
    }

    assert_eq!(overruns, vec![Rank(0)]);
}

#[test]
fn a_refresh_issued_ahead_of_schedule_counts_against_the_pulled_in_budget() {
    let spec = harness::memspec(r#"{"refresh_max_pulledin": 1}"#);
    let mut manager = RefreshManager::new(RefreshPolicy::AllBank, &spec, 1);

    assert!(manager.can_pull_in(Rank(0)));
    manager.record_issued(Rank(0), 0);
    assert!(!manager.can_pull_in(Rank(0)));
}
