use rack_core::mocks::{ScriptedController, ScriptedManager};
use rack_core::{MotionCfg, RackError, run};
use rack_driver::{SimulatedManager, SimulatedRack};
use rack_traits::clock::test_clock::TestClock;
use rack_traits::{MonotonicClock, RawMessage};
use std::time::Duration;

const SERIAL: &str = "50837825";

fn bench_manager() -> ScriptedManager {
    ScriptedManager::new()
        .with_device("40000001", "Piezo Rack Module")
        .with_device(SERIAL, "Stepper Rack Module")
}

fn happy_controller() -> ScriptedController {
    ScriptedController::new().with_messages([RawMessage::homed(1), RawMessage::move_complete(1)])
}

#[test]
fn full_sequence_reports_final_position() {
    let mut mgr = bench_manager();
    let ctl = happy_controller();
    let clock = TestClock::new();
    let cfg = MotionCfg {
        position: 0,
        ..MotionCfg::default()
    };
    let report = run(&mut mgr, ctl, &cfg, &clock).expect("workflow");
    assert_eq!(report.serial, SERIAL);
    // moved to position 0; report echoes the last position read
    assert_eq!(report.final_position, 0);
}

#[test]
fn settle_delay_elapses_before_homing() {
    let mut mgr = bench_manager();
    let ctl = happy_controller();
    let clock = TestClock::new();
    run(&mut mgr, ctl, &MotionCfg::default(), &clock).expect("workflow");
    assert!(
        clock.elapsed() >= Duration::from_millis(3_000),
        "settle delay must be honored, got {:?}",
        clock.elapsed()
    );
}

#[test]
fn velocity_only_written_when_positive() {
    // velocity = 0: no get/set velocity calls
    let mut mgr = bench_manager();
    let ctl = happy_controller();
    let log = ctl.log();
    run(&mut mgr, ctl, &MotionCfg::default(), &TestClock::new()).expect("workflow");
    assert!(
        !log.lock().unwrap().iter().any(|l| l.starts_with("get_vel")),
        "velocity must not be touched when configured as 0"
    );

    // velocity > 0: read then write with acceleration unchanged
    let mut mgr = bench_manager();
    let ctl = happy_controller();
    let log = ctl.log();
    let cfg = MotionCfg {
        velocity: 1_500,
        ..MotionCfg::default()
    };
    run(&mut mgr, ctl, &cfg, &TestClock::new()).expect("workflow");
    let entries = log.lock().unwrap().clone();
    assert!(entries.iter().any(|l| l.starts_with("get_vel")));
    assert!(entries.iter().any(|l| l == "set_vel ch=1 acc=2048 vel=1500"));
}

#[test]
fn workflow_order_and_release() {
    let mut mgr = bench_manager();
    let ctl = happy_controller();
    let log = ctl.log();
    run(&mut mgr, ctl, &MotionCfg::default(), &TestClock::new()).expect("workflow");
    let entries = log.lock().unwrap().clone();
    let idx = |needle: &str| {
        entries
            .iter()
            .position(|l| l.starts_with(needle))
            .unwrap_or_else(|| panic!("{needle} missing from {entries:?}"))
    };
    assert!(idx("open") < idx("start_polling"));
    assert!(idx("start_polling") < idx("home"));
    assert!(idx("home") < idx("move_to"));
    assert!(idx("move_to") < idx("get_position"));
    assert!(idx("get_position") < idx("stop_polling"));
    assert!(idx("stop_polling") < idx("close"));
}

#[test]
fn missing_device_is_not_found() {
    let mut mgr = ScriptedManager::new().with_device("40000001", "Piezo Rack Module");
    let ctl = ScriptedController::new();
    let err = run(&mut mgr, ctl, &MotionCfg::default(), &TestClock::new()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RackError>(),
        Some(RackError::NotFound(s)) if s == SERIAL
    ));
}

#[test]
fn open_failure_aborts_before_motion() {
    let mut mgr = bench_manager();
    let ctl = ScriptedController::new().fail_open();
    let log = ctl.log();
    let err = run(&mut mgr, ctl, &MotionCfg::default(), &TestClock::new()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RackError>(),
        Some(RackError::Open(_, _))
    ));
    assert!(
        !log.lock().unwrap().iter().any(|l| l.starts_with("home")),
        "no motion after failed open"
    );
}

#[test]
fn end_to_end_with_simulated_driver() {
    let mut mgr = SimulatedManager::bench();
    let rack = SimulatedRack::new(SERIAL).with_travel(Duration::from_millis(2));
    let cfg = MotionCfg {
        settle_ms: 10,
        velocity: 2_000,
        position: 0,
        wait_timeout_ms: 2_000,
        ..MotionCfg::default()
    };
    let report = run(&mut mgr, rack, &cfg, &MonotonicClock::new()).expect("workflow");
    assert_eq!(report.serial, SERIAL);
    assert_eq!(report.final_position, 0);
}
