use rack_core::mocks::ScriptedController;
use rack_core::{Completion, RackError, Session};
use rack_traits::{RawMessage, VelocityParams};
use std::time::Duration;

const SERIAL: &str = "50837825";

fn unrelated(msg_type: u16, msg_id: u16) -> RawMessage {
    RawMessage {
        msg_type,
        msg_id,
        data: 0,
    }
}

#[test]
fn open_failure_is_surfaced() {
    let ctl = ScriptedController::new().fail_open();
    let err = Session::open(ctl, SERIAL, 1).unwrap_err();
    match err.downcast_ref::<RackError>() {
        Some(RackError::Open(serial, reason)) => {
            assert_eq!(serial, SERIAL);
            assert!(reason.contains("claim refused"));
        }
        other => panic!("expected Open error, got {other:?}"),
    }
}

#[test]
fn wait_terminates_on_single_homed_message_and_not_before() {
    let ctl = ScriptedController::new().with_messages([RawMessage::homed(1)]);
    let log = ctl.log();
    let mut session = Session::open(ctl, SERIAL, 1).expect("open");
    session.home().expect("home");
    let msg = session.wait_for(Completion::Homed).expect("homed");
    assert_eq!((msg.msg_type, msg.msg_id), (2, 0));
    // Exactly one delivery consumed the one scripted message.
    let deliveries = log
        .lock()
        .unwrap()
        .iter()
        .filter(|l| l.starts_with("deliver"))
        .count();
    assert_eq!(deliveries, 1);
}

#[test]
fn wait_discards_unrelated_messages_and_keeps_blocking() {
    let ctl = ScriptedController::new().with_messages([
        unrelated(1, 0),
        unrelated(2, 5),
        unrelated(0, 1),
        RawMessage::homed(1),
    ]);
    let log = ctl.log();
    let mut session = Session::open(ctl, SERIAL, 1).expect("open");
    session.home().expect("home");
    let msg = session.wait_for(Completion::Homed).expect("homed");
    assert_eq!(msg.msg_id, 0);
    let deliveries = log
        .lock()
        .unwrap()
        .iter()
        .filter(|l| l.starts_with("deliver"))
        .count();
    assert_eq!(deliveries, 4, "three unrelated messages discarded first");
}

#[test]
fn move_complete_is_not_accepted_as_homed() {
    let ctl = ScriptedController::new()
        .with_messages([RawMessage::move_complete(1), RawMessage::homed(1)]);
    let mut session = Session::open(ctl, SERIAL, 1).expect("open");
    session.home().expect("home");
    // The (2,1) tuple must be discarded while waiting for (2,0).
    let msg = session.wait_for(Completion::Homed).expect("homed");
    assert_eq!((msg.msg_type, msg.msg_id), (2, 0));
}

#[test]
fn wait_timeout_maps_to_typed_error() {
    let ctl = ScriptedController::new(); // no messages scripted
    let mut session = Session::open(ctl, SERIAL, 1)
        .expect("open")
        .with_wait_timeout(Some(Duration::from_millis(10)));
    let err = session.wait_for(Completion::Homed).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RackError>(),
        Some(RackError::WaitTimeout)
    ));
}

#[test]
fn commands_clear_queue_first() {
    let ctl = ScriptedController::new();
    let log = ctl.log();
    let mut session = Session::open(ctl, SERIAL, 1).expect("open");
    session.home().expect("home");
    session.move_to(500).expect("move");
    let entries = log.lock().unwrap().clone();
    let idx = |needle: &str| {
        entries
            .iter()
            .position(|l| l.starts_with(needle))
            .unwrap_or_else(|| panic!("{needle} missing from {entries:?}"))
    };
    assert!(idx("clear_queue") < idx("home ch=1"));
    assert!(
        entries
            .iter()
            .filter(|l| l.starts_with("clear_queue"))
            .count()
            == 2,
        "each command clears the queue"
    );
    assert!(idx("home ch=1") < idx("move_to ch=1 pos=500"));
}

#[test]
fn set_velocity_preserves_acceleration() {
    let ctl = ScriptedController::new().with_velocity_params(VelocityParams {
        acceleration: 777,
        max_velocity: 10_000,
    });
    let log = ctl.log();
    let mut session = Session::open(ctl, SERIAL, 1).expect("open");
    session.set_velocity(1_234).expect("set velocity");
    let entries = log.lock().unwrap().clone();
    assert!(entries.iter().any(|l| l.starts_with("get_vel")));
    assert!(
        entries.iter().any(|l| l == "set_vel ch=1 acc=777 vel=1234"),
        "acceleration must be written back unchanged: {entries:?}"
    );
}

#[test]
fn release_stops_polling_then_closes_once() {
    let ctl = ScriptedController::new();
    let log = ctl.log();
    let mut session = Session::open(ctl, SERIAL, 1).expect("open");
    session
        .start_polling(Duration::from_millis(200))
        .expect("polling");
    session.release();
    drop(session); // drop after explicit release must not re-release
    let entries = log.lock().unwrap().clone();
    let stop = entries.iter().position(|l| l.starts_with("stop_polling"));
    let close = entries.iter().position(|l| l == "close");
    assert!(stop.expect("stop_polling") < close.expect("close"));
    assert_eq!(entries.iter().filter(|l| *l == "close").count(), 1);
}

#[test]
fn drop_releases_without_explicit_call() {
    let ctl = ScriptedController::new();
    let log = ctl.log();
    {
        let mut session = Session::open(ctl, SERIAL, 1).expect("open");
        session
            .start_polling(Duration::from_millis(200))
            .expect("polling");
    }
    let entries = log.lock().unwrap().clone();
    assert!(entries.iter().any(|l| l.starts_with("stop_polling")));
    assert!(entries.iter().any(|l| l == "close"));
}
