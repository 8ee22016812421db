use dramsys_core::arbiter::Arbiter;
use dramsys_core::common::{Bank, BankGroup, Channel, Column, Rank, Row, Stack, Thread};
use dramsys_core::config::ArbiterKind;
use dramsys_core::request::{Decoded, Direction, Request};
use rstest::rstest;

fn req(id: u64, thread: u32) -> Request {
    Request::new(
        id,
        Thread(thread),
        Channel(0),
        0,
        8,
        Direction::Read,
        Decoded {
            rank: Rank(0),
            bank_group: BankGroup(0),
            bank: Bank(0),
            stack: Stack(0),
            row: Row(0),
            column: Column(0),
        },
        0,
    )
}

#[rstest]
#[case(ArbiterKind::Fifo)]
#[case(ArbiterKind::Reorder)]
fn both_queueing_variants_release_completions_in_arrival_order(#[case] kind: ArbiterKind) {
    let mut arbiter = Arbiter::new(kind, 4);
    for id in 1..=3 {
        assert!(arbiter.admit(&req(id, 0)));
    }

    assert!(arbiter.complete(Thread(0), 2).is_empty());
    assert_eq!(arbiter.complete(Thread(0), 1), vec![1, 2]);
    assert_eq!(arbiter.complete(Thread(0), 3), vec![3]);
}

#[test]
fn blocking_transaction_admits_and_completes_in_one_step() {
    let mut arbiter = Arbiter::new(ArbiterKind::Simple, 1);
    arbiter.blocking_transaction(Thread(0), 99);
    // The id was admitted and immediately released, so a normal request is
    // free to follow on the same thread right away.
    assert!(arbiter.admit(&req(1, 0)));
}
