use dramsys_core::common::Command;
use dramsys_core::config::{PowerDownConfig, PowerDownPolicy};
use dramsys_core::powerdown::{PowerDownController, RankPowerState};

fn config(policy: PowerDownPolicy) -> PowerDownConfig {
    PowerDownConfig {
        policy,
        power_down_idle_cycles: 4,
        self_refresh_idle_cycles: 8,
    }
}

#[test]
fn off_policy_never_proposes_a_transition() {
    let controller = PowerDownController::new(config(PowerDownPolicy::Off));
    assert_eq!(controller.evaluate(1_000, true, true), None);
}

#[test]
fn active_rank_stays_active_until_the_idle_timer_elapses() {
    let mut controller = PowerDownController::new(config(PowerDownPolicy::Precharged));
    controller.note_activity(0);

    assert_eq!(controller.evaluate(3, true, true), None);
    assert_eq!(controller.evaluate(4, true, true), Some(Command::Pdep));
}

#[test]
fn every_bank_idle_but_not_precharged_enters_active_power_down() {
    let mut controller = PowerDownController::new(config(PowerDownPolicy::Active));
    controller.note_activity(0);

    assert_eq!(controller.evaluate(4, true, false), Some(Command::Pdea));
}

#[test]
fn precharged_power_down_escalates_to_self_refresh_after_the_extended_idle_window() {
    let mut controller = PowerDownController::new(config(PowerDownPolicy::SelfRefresh));
    controller.update(Command::Pdep, 0);

    assert_eq!(controller.evaluate(7, true, true), None);
    assert_eq!(controller.evaluate(8, true, true), Some(Command::Srefen));
}

#[test]
fn update_tracks_state_transitions_for_entry_and_exit_commands() {
    let mut controller = PowerDownController::new(config(PowerDownPolicy::SelfRefresh));
    assert_eq!(controller.state(), RankPowerState::Active);

    controller.update(Command::Pdep, 0);
    assert_eq!(controller.state(), RankPowerState::PrechargedPowerDown);
    assert_eq!(controller.evaluate_exit(), Some(Command::Pdxp));

    controller.update(Command::Srefen, 10);
    assert_eq!(controller.state(), RankPowerState::SelfRefresh);
    assert_eq!(controller.evaluate_exit(), Some(Command::Srefex));

    controller.update(Command::Srefex, 20);
    assert_eq!(controller.state(), RankPowerState::Active);
    assert_eq!(controller.evaluate_exit(), None);
}
