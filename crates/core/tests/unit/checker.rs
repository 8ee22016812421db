use dramsys_core::checker::TimingChecker;
use dramsys_core::common::{Bank, BankGroup, BankId, Command, ControllerError, Rank, Stack};
use rstest::rstest;

use crate::common::harness;

fn bank_id() -> BankId {
    BankId::new(Rank(0), BankGroup(0), Bank(0))
}

#[test]
fn every_command_is_legal_at_cycle_zero_on_an_empty_table() {
    let checker = TimingChecker::new(harness::memspec("{}"));
    assert_eq!(
        checker.time_to_satisfy_constraints(Command::Act, bank_id()).unwrap(),
        0
    );
}

#[test]
fn read_after_activate_must_wait_at_least_trcd() {
    let spec = harness::memspec("{}");
    let mut checker = TimingChecker::new(spec.clone());
    checker.insert(Command::Act, bank_id(), 0).unwrap();

    let earliest = checker.time_to_satisfy_constraints(Command::Rd, bank_id()).unwrap();
    assert_eq!(earliest, spec.t_rcd);
}

#[test]
fn precharge_after_activate_must_wait_at_least_tras() {
    let spec = harness::memspec("{}");
    let mut checker = TimingChecker::new(spec.clone());
    checker.insert(Command::Act, bank_id(), 0).unwrap();

    let earliest = checker.time_to_satisfy_constraints(Command::Prepb, bank_id()).unwrap();
    assert_eq!(earliest, spec.t_ras);
}

#[test]
fn fifth_activate_in_a_rank_must_respect_the_faw_window() {
    let spec = harness::memspec("{}");
    let mut checker = TimingChecker::new(spec.clone());
    let banks = [
        BankId::new(Rank(0), BankGroup(0), Bank(0)),
        BankId::new(Rank(0), BankGroup(1), Bank(1)),
        BankId::new(Rank(0), BankGroup(2), Bank(2)),
        BankId::new(Rank(0), BankGroup(3), Bank(3)),
    ];

    let mut t = 0;
    for bank in &banks {
        checker.insert(Command::Act, *bank, t).unwrap();
        t += spec.t_rrd_l;
    }

    let fifth_bank = BankId::new(Rank(0), BankGroup(0), Bank(4));
    let earliest = checker.time_to_satisfy_constraints(Command::Act, fifth_bank).unwrap();
    assert!(earliest >= spec.t_faw);
}

#[test]
fn reject_unsupported_refuses_refresh_management_on_a_family_without_it() {
    let checker = TimingChecker::new(harness::memspec(r#"{"family": "Ddr4"}"#));
    assert!(matches!(
        checker.time_to_satisfy_constraints(Command::Rfmab, bank_id()),
        Err(ControllerError::UnknownCommand(Command::Rfmab))
    ));
}

#[rstest]
#[case("Ddr3")]
#[case("Ddr4")]
#[case("Lpddr4")]
#[case("Lpddr5")]
#[case("Gddr6")]
fn only_ddr5_accepts_refresh_management_commands(#[case] family: &str) {
    let json = format!(r#"{{"family": "{family}"}}"#);
    let checker = TimingChecker::new(harness::memspec(&json));
    assert!(checker.time_to_satisfy_constraints(Command::Rfmab, bank_id()).is_err());
}

#[test]
fn activate_after_power_down_exit_must_wait_at_least_txp() {
    let spec = harness::memspec("{}");
    let mut checker = TimingChecker::new(spec.clone());
    checker.insert(Command::Pdxa, bank_id(), 0).unwrap();

    let earliest = checker.time_to_satisfy_constraints(Command::Act, bank_id()).unwrap();
    assert_eq!(earliest, spec.t_xp);
}

#[test]
fn activate_after_self_refresh_exit_must_wait_at_least_txs() {
    let spec = harness::memspec("{}");
    let mut checker = TimingChecker::new(spec.clone());
    checker.insert(Command::Srefex, bank_id(), 0).unwrap();

    let earliest = checker.time_to_satisfy_constraints(Command::Act, bank_id()).unwrap();
    assert_eq!(earliest, spec.t_xs);
}

#[test]
fn self_refresh_exit_must_wait_at_least_tckesr_after_entry() {
    let spec = harness::memspec("{}");
    let mut checker = TimingChecker::new(spec.clone());
    checker.insert(Command::Srefen, bank_id(), 0).unwrap();

    let earliest = checker.time_to_satisfy_constraints(Command::Srefex, bank_id()).unwrap();
    assert_eq!(earliest, spec.t_ckesr);
}

#[test]
fn checker_is_a_pure_function_of_its_table_state() {
    let spec = harness::memspec("{}");
    let mut a = TimingChecker::new(spec.clone());
    let mut b = TimingChecker::new(spec.clone());

    for (cmd, time) in [(Command::Act, 0), (Command::Rd, spec.t_rcd)] {
        a.insert(cmd, bank_id(), time).unwrap();
        b.insert(cmd, bank_id(), time).unwrap();
    }

    assert_eq!(
        a.time_to_satisfy_constraints(Command::Prepb, bank_id()).unwrap(),
        b.time_to_satisfy_constraints(Command::Prepb, bank_id()).unwrap()
    );
}
