use dramsys_core::common::{Bank, Row};
use dramsys_core::request::Direction;
use dramsys_core::scheduler::{FifoScheduler, FrFcfsGrpScheduler, FrFcfsScheduler, Scheduler};

use crate::common::harness;

#[test]
fn fifo_only_returns_the_head_of_queue_and_only_for_its_own_bank() {
    let mut scheduler = FifoScheduler::new(4);
    scheduler.store_request(harness::read_request(1, 0, 5, 0));
    scheduler.store_request(harness::read_request(2, 1, 7, 1));

    assert!(scheduler.get_next_request(Bank(1), Row(7), false).is_none());
    assert_eq!(
        scheduler.get_next_request(Bank(0), Row(5), false).unwrap().id,
        1
    );
}

#[test]
fn fifo_reports_buffer_space_against_capacity() {
    let mut scheduler = FifoScheduler::new(1);
    assert!(scheduler.has_buffer_space());
    scheduler.store_request(harness::read_request(1, 0, 0, 0));
    assert!(!scheduler.has_buffer_space());
}

#[test]
fn fr_fcfs_prefers_a_row_hit_over_an_older_row_miss() {
    let mut scheduler = FrFcfsScheduler::new(4);
    scheduler.store_request(harness::read_request(1, 0, 9, 0));
    scheduler.store_request(harness::read_request(2, 0, 5, 1));

    let picked = scheduler.get_next_request(Bank(0), Row(5), false).unwrap();
    assert_eq!(picked.id, 2);
}

#[test]
fn fr_fcfs_falls_back_to_oldest_request_on_an_all_miss_bank() {
    let mut scheduler = FrFcfsScheduler::new(4);
    scheduler.store_request(harness::read_request(1, 0, 9, 5));
    scheduler.store_request(harness::read_request(2, 0, 11, 1));

    let picked = scheduler.get_next_request(Bank(0), Row(0), false).unwrap();
    assert_eq!(picked.id, 2, "older request (time_of_generation=1) must win");
}

#[test]
fn fr_fcfs_has_further_row_hit_ignores_other_banks() {
    let mut scheduler = FrFcfsScheduler::new(4);
    scheduler.store_request(harness::read_request(1, 1, 5, 0));

    assert!(!scheduler.has_further_row_hit(Bank(0), Row(5), Direction::Read));
    assert!(scheduler.has_further_row_hit(Bank(1), Row(5), Direction::Read));
}

#[test]
fn fr_fcfs_grp_stays_sticky_to_the_open_row_while_keep_trans_is_set() {
    let mut scheduler = FrFcfsGrpScheduler::new(4);
    scheduler.store_request(harness::read_request(1, 0, 5, 0));
    scheduler.store_request(harness::read_request(2, 0, 9, 1));

    // Without keep_trans, row 9 (its own miss candidate would be FCFS,
    // but row 5 is still the documented row-hit-first tie-break).
    let picked = scheduler.get_next_request(Bank(0), Row(5), false).unwrap();
    assert_eq!(picked.id, 1);

    // With keep_trans set, the sticky branch must still prefer the row-5
    // hit even if it were not already the FCFS winner.
    let picked_sticky = scheduler.get_next_request(Bank(0), Row(5), true).unwrap();
    assert_eq!(picked_sticky.id, 1);
}

#[test]
fn remove_request_drops_only_the_named_id() {
    let mut scheduler = FrFcfsScheduler::new(4);
    scheduler.store_request(harness::read_request(1, 0, 5, 0));
    scheduler.store_request(harness::read_request(2, 0, 5, 1));

    scheduler.remove_request(1);

    let remaining = scheduler.get_buffer_depth();
    assert_eq!(remaining, vec![1]);
}
