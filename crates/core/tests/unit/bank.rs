use dramsys_core::bank::{BankMachine, PagePolicy};
use dramsys_core::common::Command;
use dramsys_core::scheduler::{FifoScheduler, Scheduler};

use crate::common::harness;

fn fifo_with(requests: Vec<dramsys_core::request::Request>) -> FifoScheduler {
    let mut scheduler = FifoScheduler::new(16);
    for request in requests {
        scheduler.store_request(request);
    }
    scheduler
}

#[test]
fn precharged_bank_always_proposes_activate() {
    let spec = harness::memspec("{}");
    let mut bank = BankMachine::new(PagePolicy::Open, &spec, 0, false);
    let scheduler = fifo_with(vec![harness::read_request(1, 0, 5, 0)]);

    bank.evaluate(&scheduler, &spec);

    assert_eq!(bank.next_command().0, Command::Act);
}

#[test]
fn open_policy_issues_plain_rd_on_a_row_hit_and_keeps_the_row_open() {
    let spec = harness::memspec("{}");
    let mut bank = BankMachine::new(PagePolicy::Open, &spec, 0, false);
    let scheduler = fifo_with(vec![harness::read_request(1, 0, 5, 0)]);

    bank.evaluate(&scheduler, &spec);
    assert_eq!(bank.next_command().0, Command::Act);
    bank.update(Command::Act, &spec);
    assert!(bank.is_activated());
    assert_eq!(bank.open_row().0, 5);

    bank.evaluate(&scheduler, &spec);
    assert_eq!(bank.next_command().0, Command::Rd);
}

#[test]
fn row_miss_against_an_open_row_proposes_precharge() {
    let spec = harness::memspec("{}");
    let mut bank = BankMachine::new(PagePolicy::Open, &spec, 0, false);

    let hit_scheduler = fifo_with(vec![harness::read_request(1, 0, 5, 0)]);
    bank.evaluate(&hit_scheduler, &spec);
    bank.update(Command::Act, &spec);
    bank.evaluate(&hit_scheduler, &spec);
    bank.update(Command::Rd, &spec);
    assert_eq!(bank.open_row().0, 5);

    let miss_scheduler = fifo_with(vec![harness::read_request(2, 0, 6, 1)]);
    bank.evaluate(&miss_scheduler, &spec);

    assert_eq!(bank.next_command().0, Command::Prepb);
}

#[test]
fn closed_policy_auto_precharges_every_read() {
    let spec = harness::memspec("{}");
    let mut bank = BankMachine::new(PagePolicy::Closed, &spec, 0, false);
    let scheduler = fifo_with(vec![harness::read_request(1, 0, 5, 0)]);
    bank.evaluate(&scheduler, &spec);
    bank.update(Command::Act, &spec);

    bank.evaluate(&scheduler, &spec);
    assert_eq!(bank.next_command().0, Command::Rda);
}

#[test]
fn a_blocked_bank_never_proposes_a_command() {
    let spec = harness::memspec("{}");
    let mut bank = BankMachine::new(PagePolicy::Open, &spec, 0, false);
    let scheduler = fifo_with(vec![harness::read_request(1, 0, 5, 0)]);

    bank.block();
    bank.evaluate(&scheduler, &spec);

    assert_eq!(bank.next_command().0, Command::Nop);
    assert!(bank.is_blocked());
}

#[test]
fn bank_index_is_global_not_within_rank() {
    let spec = harness::memspec(r#"{"ranks": 2, "bank_groups": 2, "banks_per_group": 2}"#);
    let last_of_rank_zero = BankMachine::new(PagePolicy::Open, &spec, 3, false);
    let first_of_rank_one = BankMachine::new(PagePolicy::Open, &spec, 4, false);

    assert_eq!(last_of_rank_zero.rank().0, 0);
    assert_eq!(first_of_rank_one.rank().0, 1);
    assert_ne!(last_of_rank_zero.bank(), first_of_rank_one.bank());
}
