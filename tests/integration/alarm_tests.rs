//! Intrusion → alarm → clear, end to end.

use std::sync::Arc;

use carguard::adapters::sim::SimHardware;
use carguard::app::events::AppEvent;
use carguard::app::menu::MenuPage;
use carguard::app::service::{MenuController, Tick};
use carguard::config::{DEFAULT_ALLOWED_UIDS, SystemConfig};
use carguard::events::{Key, KeyQueue};
use carguard::security::access::{AccessControl, CredentialId};
use carguard::security::alarm::{AlarmModal, AlarmState};
use carguard::security::intrusion::{IntrusionMonitor, IntrusionState, PollOutcome, TriggerEdge};

use crate::mock_hw::{RecordingHardware, RecordingSink, SharedEvents, SharedSink};

const OWNER: u64 = 966_206_689_390;

fn allow_list() -> AccessControl {
    AccessControl::new(DEFAULT_ALLOWED_UIDS.map(CredentialId::from), 800)
}

fn controller() -> (MenuController, Arc<KeyQueue>, SimHardware, RecordingSink) {
    let queue = Arc::new(KeyQueue::new());
    let mut hw = SimHardware::new();
    let mut sink = RecordingSink::default();
    let mut mc = MenuController::new(&SystemConfig::default(), Arc::clone(&queue), &mut hw);
    mc.start(&mut hw, &mut sink);
    (mc, queue, hw, sink)
}

#[test]
fn falling_edge_scenario_raises_and_clears() {
    let access = allow_list();
    let mut alarm = AlarmModal::new();
    let mut monitor = IntrusionMonitor::new(TriggerEdge::Falling, 60);
    let mut hw = SimHardware::new();
    hw.push_motion([Ok(true), Ok(false), Ok(false)]);
    hw.push_credential(Ok(OWNER));

    assert_eq!(monitor.poll(true, &mut alarm, &mut hw), PollOutcome::Armed);
    assert_eq!(monitor.baseline(), Some(true));

    let before = hw.elapsed_ms();
    assert_eq!(monitor.poll(true, &mut alarm, &mut hw), PollOutcome::Triggered);
    assert!(hw.elapsed_ms() - before >= 60, "re-sample must wait the hold");
    assert!(alarm.is_active());
    assert!(hw.buzzer_on());

    assert_eq!(monitor.run_alarm(&mut alarm, &access, &mut hw), CredentialId::from(OWNER));

    assert_eq!(alarm.state(), AlarmState::Inactive);
    assert!(alarm.take_return_to_menu());
    assert!(!alarm.take_return_to_menu(), "signal is consumed once");
    assert!(!hw.buzzer_on());
    assert_eq!(monitor.state(), IntrusionState::Armed);
    assert_eq!(monitor.baseline(), Some(false));
    assert!(hw.screens().iter().any(|s| s.0 == "!!! ALARM !!!"));
}

#[test]
fn glitch_shorter_than_hold_is_ignored() {
    let mut alarm = AlarmModal::new();
    let mut monitor = IntrusionMonitor::new(TriggerEdge::Falling, 60);
    let mut hw = SimHardware::new();
    hw.push_motion([Ok(true), Ok(false), Ok(true)]);

    monitor.poll(true, &mut alarm, &mut hw);
    assert_eq!(monitor.poll(true, &mut alarm, &mut hw), PollOutcome::Quiet);
    assert_eq!(alarm.state(), AlarmState::Inactive);
    assert_eq!(hw.pending_credentials(), 0);
}

#[test]
fn denied_cards_keep_alarm_until_owner() {
    let access = allow_list();
    let mut alarm = AlarmModal::new();
    let mut hw = SimHardware::new();
    hw.push_credential(Ok(1));
    hw.push_credential(Ok(2));
    hw.push_credential(Ok(OWNER));

    assert_eq!(alarm.run(&access, &mut hw), CredentialId::from(OWNER));
    assert_eq!(hw.pending_credentials(), 0);
    assert!(!alarm.is_active());
}

#[test]
fn controller_returns_to_main_menu_after_alarm() {
    let (mut mc, queue, mut hw, mut sink) = controller();
    hw.push_motion([Ok(true), Ok(true), Ok(false), Ok(false)]);
    hw.push_credential(Ok(42));
    hw.push_credential(Ok(OWNER));

    queue.push(Key::Digit(1));
    assert_eq!(mc.tick(&mut hw, &mut sink), Tick::Dispatched(carguard::app::menu::MenuAction::EnterIdleMenu));
    assert_eq!(mc.page(), MenuPage::Idle(0));
    assert_eq!(mc.tick(&mut hw, &mut sink), Tick::Idle);

    // Keys typed while the alarm is up must not leak into the menu.
    queue.push(Key::Digit(2));
    queue.push(Key::Digit(2));
    assert_eq!(mc.tick(&mut hw, &mut sink), Tick::ReturnedToMenu);
    assert_eq!(mc.page(), MenuPage::Main);
    assert!(queue.is_empty());
    assert!(mc.door().is_locked());

    let raised = sink.events.iter().position(|e| *e == AppEvent::AlarmRaised);
    let cleared = sink
        .events
        .iter()
        .position(|e| *e == AppEvent::AlarmCleared(CredentialId::from(OWNER)));
    assert!(matches!((raised, cleared), (Some(r), Some(c)) if r < c));
    assert!(sink.events.contains(&AppEvent::KeysDropped(2)));
    assert_eq!(hw.last_screen(), Some(("1. Initialize".into(), "2. Lock/Unlock".into())));
}

#[test]
fn unlocked_door_never_alarms() {
    let (mut mc, queue, mut hw, mut sink) = controller();
    queue.push(Key::Digit(2));
    mc.tick(&mut hw, &mut sink);
    assert!(!mc.door().is_locked());

    hw.push_motion([Ok(true), Ok(false), Ok(false), Ok(true), Ok(false)]);
    for _ in 0..5 {
        assert_eq!(mc.tick(&mut hw, &mut sink), Tick::Idle);
    }
    assert_eq!(mc.intrusion().state(), IntrusionState::Disarmed);
    assert_eq!(sink.count(|e| *e == AppEvent::AlarmRaised), 0);
}

#[test]
fn alarm_is_announced_before_the_first_clearing_read() {
    let events = SharedEvents::default();
    let mut sink = SharedSink(events.clone());
    let mut hw = RecordingHardware::new().observing(events.clone());
    let queue = Arc::new(KeyQueue::new());
    let mut mc = MenuController::new(&SystemConfig::default(), Arc::clone(&queue), &mut hw);
    mc.start(&mut hw, &mut sink);

    hw.sim.push_motion([Ok(true), Ok(false), Ok(false)]);
    hw.sim.push_credential(Ok(1));
    hw.sim.push_credential(Ok(2));
    hw.sim.push_credential(Ok(OWNER));

    assert_eq!(mc.tick(&mut hw, &mut sink), Tick::Idle);
    assert_eq!(mc.tick(&mut hw, &mut sink), Tick::ReturnedToMenu);

    assert_eq!(hw.events_at_read.len(), 3);
    for seen in &hw.events_at_read {
        assert_eq!(seen.last(), Some(&AppEvent::AlarmRaised));
    }
    assert_eq!(
        *events.borrow(),
        vec![
            AppEvent::Started { door_locked: true },
            AppEvent::AlarmRaised,
            AppEvent::AlarmCleared(CredentialId::from(OWNER)),
        ]
    );
}
