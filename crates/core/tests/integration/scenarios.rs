//! End-to-end controller scenarios, one per literal case named in this
//! crate's testable-properties documentation.

use dramsys_core::arbiter::Arbiter;
use dramsys_core::common::{Command, Thread};
use dramsys_core::config::{ArbiterKind, McConfig, PagePolicyKind, RefreshPolicy};
use dramsys_core::memspec::MemSpec;

use crate::common::harness;

fn single_bank_spec_and_config() -> (MemSpec, McConfig) {
    let spec = harness::memspec(r#"{"ranks": 1, "bank_groups": 1, "banks_per_group": 1}"#);
    let mut config = McConfig::default();
    config.page_policy = PagePolicyKind::Open;
    (spec, config)
}

/// Runs `tick` from `now = 0` until `done` returns `true` or `limit` cycles
/// pass, returning the last `now` reached.
fn run_until(mut controller: dramsys_core::Controller, limit: u64, mut done: impl FnMut() -> bool) -> u64 {
    let mut now = 0;
    while !done() {
        assert!(now < limit, "scenario did not resolve within {limit} cycles");
        now = controller.tick(now).expect("tick must not protocol-violate");
    }
    now
}

#[test]
fn scenario_1_single_read_open_page() {
    let (spec, config) = single_bank_spec_and_config();
    let t_rcd = spec.t_rcd;
    let (mut controller, observer) = harness::controller(spec, &config);

    assert!(controller.enqueue(harness::read_request(1, 0, 0, 0), 0));

    run_until(controller, 10_000, || !observer.completed.borrow().is_empty());

    let commands = observer.commands.borrow();
    assert_eq!(commands[0].0, Command::Act);
    assert_eq!(commands[0].2, 0, "ACT must issue at t=0, nothing else is pending");

    let rd = commands
        .iter()
        .find(|(cmd, ..)| *cmd == Command::Rd)
        .expect("an RD must follow the ACT");
    assert_eq!(rd.2, t_rcd, "RD must wait exactly tRCD after the ACT");

    assert_eq!(observer.completed.borrow().as_slice(), [1]);
}

#[test]
fn scenario_2_read_then_write_same_bank_row_miss() {
    let (spec, config) = single_bank_spec_and_config();
    let t_rp = spec.t_rp;
    let (mut controller, observer) = harness::controller(spec, &config);

    assert!(controller.enqueue(harness::read_request(1, 0, 0, 0), 0));
    assert!(controller.enqueue(harness::write_request(2, 0, 1, 0), 0));

    run_until(controller, 10_000, || observer.completed.borrow().len() == 2);

    let commands = observer.commands.borrow();
    let act_positions: Vec<usize> = commands
        .iter()
        .enumerate()
        .filter(|(_, (cmd, ..))| *cmd == Command::Act)
        .map(|(idx, _)| idx)
        .collect();
    assert_eq!(act_positions.len(), 2, "row miss must re-activate the bank");

    let prepb = commands
        .iter()
        .find(|(cmd, ..)| *cmd == Command::Prepb)
        .expect("row miss must precharge before the second ACT");

    let second_act = commands[act_positions[1]];
    assert!(
        second_act.2 >= prepb.2 + t_rp,
        "second ACT must wait at least tRP after the precharge"
    );

    let wr = commands
        .iter()
        .find(|(cmd, ..)| matches!(cmd, Command::Wr | Command::Wra))
        .expect("the write must eventually issue");
    assert!(wr.2 >= second_act.2, "WR must follow the second ACT");
}

#[test]
fn scenario_3_faw_throttles_a_fifth_activate_in_the_same_rank() {
    let spec = harness::memspec(r#"{"ranks": 1, "bank_groups": 5, "banks_per_group": 1}"#);
    let t_faw = spec.t_faw;
    let mut config = McConfig::default();
    config.page_policy = PagePolicyKind::Open;
    let (mut controller, observer) = harness::controller(spec, &config);

    for bank in 0..5 {
        assert!(controller.enqueue(harness::read_request(bank, bank as u32, bank, 0), 0));
    }

    run_until(controller, 10_000, || observer.completed.borrow().len() == 5);

    let acts: Vec<u64> = observer
        .commands
        .borrow()
        .iter()
        .filter(|(cmd, ..)| *cmd == Command::Act)
        .map(|(_, _, time)| *time)
        .collect();
    assert_eq!(acts.len(), 5);

    assert!(
        acts[4] - acts[0] >= t_faw,
        "the fifth ACT in the rank must respect the four-activate window: {acts:?}"
    );
}

#[test]
fn scenario_4_all_bank_refresh_does_not_preempt_an_in_flight_cas_burst() {
    let mut spec = harness::memspec(r#"{"ranks": 1, "bank_groups": 2, "banks_per_group": 1}"#);
    spec.t_refi = 40;
    let mut config = McConfig::default();
    config.page_policy = PagePolicyKind::Open;
    config.refresh.policy = RefreshPolicy::AllBank;
    let t_rfc = spec.t_rfc;
    let (mut controller, observer) = harness::controller(spec, &config);

    for id in 0..8 {
        assert!(controller.enqueue(harness::read_request(id, (id % 2) as u32, id, 0), 0));
    }

    run_until(controller, 5_000, || !observer.refreshes.borrow().is_empty());

    let refab_time = observer.refreshes.borrow()[0].2;

    // No ACT may issue in [refab_time, refab_time + tRFC): the whole rank is
    // unavailable until the refresh cycle completes.
    let violating_act = observer
        .commands
        .borrow()
        .iter()
        .find(|(cmd, _, time)| *cmd == Command::Act && *time > refab_time && *time < refab_time + t_rfc)
        .cloned();
    assert!(
        violating_act.is_none(),
        "no ACT may issue before REFAB + tRFC elapses: {violating_act:?}"
    );
}

#[test]
fn scenario_5_reorder_arbiter_preserves_per_thread_issue_order_despite_out_of_order_completion() {
    let spec = harness::memspec(r#"{"ranks": 1, "bank_groups": 2, "banks_per_group": 1}"#);
    let mut config = McConfig::default();
    config.page_policy = PagePolicyKind::Open;
    let (mut controller, observer) = harness::controller(spec, &config);
    let mut arbiter = Arbiter::new(ArbiterKind::Reorder, 8);

    // Two threads, three reads each, deliberately targeting different banks
    // so the channel can complete them in an interleaved, non-issue order.
    let mut requests = Vec::new();
    for seq in 0..3u64 {
        requests.push((0u32, harness::read_request(seq * 2, 0, seq, 0)));
        requests.push((1u32, harness::read_request(seq * 2 + 1, 1, seq, 0)));
    }

    for (thread, request) in requests {
        assert!(arbiter.admit(&request));
        assert!(controller.enqueue(request, 0));
        let _ = thread;
    }

    run_until(controller, 10_000, || observer.completed.borrow().len() == 6);

    let mut per_thread_release: Vec<(u32, u64)> = Vec::new();
    for &id in observer.completed.borrow().iter() {
        let thread = (id % 2) as u32;
        for released in arbiter.complete(Thread(thread), id) {
            per_thread_release.push((thread, released));
        }
    }

    let thread0: Vec<u64> = per_thread_release.iter().filter(|(t, _)| *t == 0).map(|(_, id)| *id).collect();
    let thread1: Vec<u64> = per_thread_release.iter().filter(|(t, _)| *t == 1).map(|(_, id)| *id).collect();

    // The channel may complete these out of issue order, but the Reorder
    // arbiter must still release each thread's responses in strict arrival
    // (here, ascending id) order.
    assert_eq!(thread0, vec![0, 2, 4]);
    assert_eq!(thread1, vec![1, 3, 5]);
}

#[test]
fn scenario_6_back_pressure_admits_more_only_once_buffer_space_frees_up() {
    let spec = harness::memspec(r#"{"ranks": 1, "bank_groups": 1, "banks_per_group": 1}"#);
    let mut config = McConfig::default();
    config.request_buffer_size = 4;
    let (mut controller, observer) = harness::controller(spec, &config);

    let mut admitted = 0;
    for id in 0..6 {
        if controller.enqueue(harness::read_request(id, 0, id, 0), 0) {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 4, "only the first four requests fit the buffer");

    // Drain until at least one slot frees up, then the fifth must succeed.
    let mut now = 0;
    while observer.completed.borrow().is_empty() {
        now = controller.tick(now).expect("tick must not protocol-violate");
        assert!(now < 10_000, "scenario did not resolve");
    }
    assert!(
        controller.enqueue(harness::read_request(4, 0, 4, now), now),
        "a freed slot must admit the fifth request"
    );
}
