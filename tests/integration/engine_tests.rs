//! Engine interlock ordering: credential, then switch ON, then motor.

use std::sync::Arc;

use carguard::app::events::{AppEvent, Device, StartRefusal};
use carguard::app::menu::MenuAction;
use carguard::app::ports::SwitchState;
use carguard::app::service::{MenuController, Tick};
use carguard::config::{DEFAULT_ALLOWED_UIDS, SystemConfig};
use carguard::error::{ActuatorError, ReaderFault};
use carguard::events::{Key, KeyQueue};
use carguard::security::access::{AccessControl, AccessError, CredentialId};
use carguard::security::engine::{EngineController, EngineState, SafetyCheck};

use crate::mock_hw::{HwCall, RecordingHardware, RecordingSink};

const DRIVER: u64 = 470_912_245_720;

fn allow_list() -> AccessControl {
    AccessControl::new(DEFAULT_ALLOWED_UIDS.map(CredentialId::from), 800)
}

fn running(hw: &mut RecordingHardware) -> EngineController {
    let mut engine = EngineController::new(true, 100);
    hw.sim.push_credential(Ok(DRIVER));
    hw.sim.push_switch([Ok(SwitchState::On)]);
    let t = engine.start(&allow_list(), hw).unwrap();
    assert!(t.changed);
    engine
}

#[test]
fn motor_runs_only_after_credential_and_switch() {
    let mut hw = RecordingHardware::new();
    let mut engine = EngineController::new(true, 100);
    hw.sim.push_credential(Ok(DRIVER));
    hw.sim.push_switch([Ok(SwitchState::Off), Ok(SwitchState::Off), Ok(SwitchState::On)]);

    let t = engine.start(&allow_list(), &mut hw).unwrap();
    assert!(t.changed);
    assert_eq!(t.motor, Ok(()));
    assert_eq!(engine.state(), EngineState::Running);

    let cred = hw.position(|c| matches!(c, HwCall::CredentialRead(Ok(_)))).unwrap();
    let on = hw
        .position(|c| *c == HwCall::SwitchRead(Ok(SwitchState::On)))
        .unwrap();
    let motor = hw.position(|c| *c == HwCall::Motor(100)).unwrap();
    assert!(cred < on && on < motor, "order was {:?}", hw.calls);
    assert_eq!(hw.motor_commands(), vec![100]);
    assert!(hw.sim.screens().iter().any(|s| s.0 == "Turn slide switch"));
}

#[test]
fn denied_credential_never_touches_switch_or_motor() {
    let mut hw = RecordingHardware::new();
    let mut engine = EngineController::new(true, 100);
    hw.sim.push_credential(Ok(123));

    let err = engine.start(&allow_list(), &mut hw).unwrap_err();
    assert_eq!(err, AccessError::Denied(CredentialId::from(123)));
    assert_eq!(engine.state(), EngineState::Stopped);
    assert!(hw.motor_commands().is_empty());
    assert!(!hw.calls.iter().any(|c| matches!(c, HwCall::SwitchRead(_))));
}

#[test]
fn reader_fault_fails_closed() {
    let mut hw = RecordingHardware::new();
    let mut engine = EngineController::new(true, 100);
    hw.sim.push_credential(Err(ReaderFault::Disconnected));

    let err = engine.start(&allow_list(), &mut hw).unwrap_err();
    assert_eq!(err, AccessError::ReaderFault(ReaderFault::Disconnected));
    assert_eq!(engine.state(), EngineState::Stopped);
    assert!(hw.motor_commands().is_empty());
}

#[test]
fn credential_check_can_be_disabled() {
    let mut hw = RecordingHardware::new();
    let mut engine = EngineController::new(false, 100);
    hw.sim.push_switch([Ok(SwitchState::On)]);

    let t = engine.start(&allow_list(), &mut hw).unwrap();
    assert!(t.changed);
    assert!(!hw.calls.iter().any(|c| matches!(c, HwCall::CredentialRead(_))));
}

#[test]
fn one_forced_stop_per_off_edge() {
    let mut hw = RecordingHardware::new();
    let mut engine = running(&mut hw);
    hw.sim.push_switch([Ok(SwitchState::On), Ok(SwitchState::Off)]);

    assert_eq!(engine.enforce_switch_safety(&mut hw), SafetyCheck::Ok);
    assert_eq!(engine.enforce_switch_safety(&mut hw), SafetyCheck::ForcedStop(Ok(())));
    for _ in 0..5 {
        assert_eq!(engine.enforce_switch_safety(&mut hw), SafetyCheck::Ok);
    }
    assert_eq!(hw.motor_commands(), vec![100, 0]);
    assert_eq!(engine.state(), EngineState::Stopped);
}

#[test]
fn stop_when_stopped_is_noop() {
    let mut hw = RecordingHardware::new();
    let mut engine = EngineController::new(true, 100);
    let t = engine.stop(&mut hw);
    assert!(!t.changed);
    assert!(hw.motor_commands().is_empty());
}

#[test]
fn controller_reports_start_refusal() {
    let queue = Arc::new(KeyQueue::new());
    let mut hw = RecordingHardware::new();
    let mut sink = RecordingSink::default();
    let mut mc = MenuController::new(&SystemConfig::default(), Arc::clone(&queue), &mut hw);
    mc.start(&mut hw, &mut sink);

    hw.sim.push_credential(Ok(5));
    queue.push(Key::Digit(1));
    queue.push(Key::Digit(1));
    mc.tick(&mut hw, &mut sink);
    assert_eq!(mc.tick(&mut hw, &mut sink), Tick::Dispatched(MenuAction::ToggleEngine));

    assert!(!mc.engine().is_running());
    assert!(sink.events.contains(&AppEvent::EngineStartFailed(StartRefusal::Denied(
        CredentialId::from(5)
    ))));
}

#[test]
fn controller_forces_stop_and_reports_motor_fault() {
    let queue = Arc::new(KeyQueue::new());
    let mut hw = RecordingHardware::new();
    let mut sink = RecordingSink::default();
    let mut mc = MenuController::new(&SystemConfig::default(), Arc::clone(&queue), &mut hw);
    mc.start(&mut hw, &mut sink);

    hw.sim.push_credential(Ok(DRIVER));
    hw.sim.push_switch([Ok(SwitchState::On)]);
    queue.push(Key::Digit(1));
    queue.push(Key::Digit(1));
    mc.tick(&mut hw, &mut sink);
    mc.tick(&mut hw, &mut sink);
    assert!(mc.engine().is_running());
    assert!(sink.events.contains(&AppEvent::EngineStarted));

    hw.sim.fail_motor(true);
    hw.sim.push_switch([Ok(SwitchState::Off)]);
    for _ in 0..3 {
        mc.tick(&mut hw, &mut sink);
    }
    assert!(!mc.engine().is_running());
    assert_eq!(sink.count(|e| *e == AppEvent::EngineStopped { forced: true }), 1);
    assert!(sink.events.contains(&AppEvent::ActuatorFault {
        device: Device::Motor,
        error: ActuatorError::PwmWriteFailed,
    }));
}
