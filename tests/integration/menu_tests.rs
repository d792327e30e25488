//! Menu navigation and dispatch through the controller.

use std::sync::Arc;

use carguard::adapters::sim::SimHardware;
use carguard::app::events::{AppEvent, Device};
use carguard::app::menu::{MenuAction, MenuPage};
use carguard::app::ports::SwitchState;
use carguard::app::service::{MenuController, Tick};
use carguard::config::SystemConfig;
use carguard::error::ActuatorError;
use carguard::events::{Key, KeyQueue};

use crate::mock_hw::RecordingSink;

struct Rig {
    mc: MenuController,
    queue: Arc<KeyQueue>,
    hw: SimHardware,
    sink: RecordingSink,
}

impl Rig {
    fn new() -> Self {
        Self::with_config(&SystemConfig::default())
    }

    fn with_config(config: &SystemConfig) -> Self {
        let queue = Arc::new(KeyQueue::new());
        let mut hw = SimHardware::new();
        let mut sink = RecordingSink::default();
        let mut mc = MenuController::new(config, Arc::clone(&queue), &mut hw);
        mc.start(&mut hw, &mut sink);
        Self { mc, queue, hw, sink }
    }

    fn press(&mut self, keys: &[Key]) -> Vec<Tick> {
        keys.iter()
            .map(|&k| {
                self.queue.push(k);
                self.mc.tick(&mut self.hw, &mut self.sink)
            })
            .collect()
    }
}

#[test]
fn boot_waits_for_switch_off_then_shows_ready() {
    let queue = Arc::new(KeyQueue::new());
    let mut hw = SimHardware::new();
    hw.push_switch([Ok(SwitchState::On), Ok(SwitchState::On), Ok(SwitchState::Off)]);
    let mut sink = RecordingSink::default();
    let mut mc = MenuController::new(&SystemConfig::default(), queue, &mut hw);
    mc.start(&mut hw, &mut sink);

    let firsts: Vec<&str> = hw.screens().iter().map(|s| s.0.as_str()).collect();
    let prompt = firsts.iter().position(|l| *l == "Turn slide switch").unwrap();
    let ok = firsts.iter().position(|l| *l == "OK: Switch OFF").unwrap();
    let ready = firsts.iter().position(|l| *l == "System Ready").unwrap();
    assert!(prompt < ok && ok < ready);
    assert_eq!(hw.last_screen(), Some(("1. Initialize".into(), "2. Lock/Unlock".into())));
}

#[test]
fn main_menu_toggles_door() {
    let mut rig = Rig::new();
    assert_eq!(rig.hw.servo_angle(), Some(0.0));

    assert_eq!(rig.press(&[Key::Digit(2)]), vec![Tick::Dispatched(MenuAction::ToggleDoor)]);
    assert!(!rig.mc.door().is_locked());
    assert_eq!(rig.hw.servo_angle(), Some(90.0));
    assert!(rig.hw.screens().iter().any(|s| s.0 == "Door Unlocked"));

    rig.press(&[Key::Digit(2)]);
    assert!(rig.mc.door().is_locked());
    assert_eq!(
        rig.sink.events.iter().filter(|e| matches!(e, AppEvent::DoorChanged { .. })).count(),
        2
    );
}

#[test]
fn servo_fault_still_flips_logical_state() {
    let mut rig = Rig::new();
    rig.hw.fail_servo(true);
    rig.press(&[Key::Digit(2)]);

    assert!(!rig.mc.door().is_locked());
    assert!(rig.sink.events.contains(&AppEvent::ActuatorFault {
        device: Device::Servo,
        error: ActuatorError::PwmWriteFailed,
    }));
    assert!(rig.sink.events.contains(&AppEvent::DoorChanged { locked: false }));
    assert!(rig.hw.screens().iter().any(|s| s.0 == "Servo error"));
}

#[test]
fn keys_bound_elsewhere_are_ignored() {
    let mut rig = Rig::new();
    assert_eq!(rig.press(&[Key::Digit(5)]), vec![Tick::Ignored(Key::Digit(5))]);
    assert_eq!(rig.press(&[Key::Hash]), vec![Tick::Ignored(Key::Hash)]);
    assert_eq!(rig.mc.page(), MenuPage::Main);

    rig.press(&[Key::Digit(1)]);
    assert_eq!(rig.press(&[Key::Digit(3)]), vec![Tick::Ignored(Key::Digit(3))]);
    assert_eq!(rig.mc.page(), MenuPage::Idle(0));
}

#[test]
fn check_sensors_shows_three_screens_then_redraws() {
    let mut rig = Rig::new();
    rig.hw.push_analog([Ok(812)]);
    rig.hw.push_moisture([Ok(true)]);
    rig.press(&[Key::Digit(1), Key::Hash]);
    let before = rig.hw.screens().len();

    assert_eq!(rig.press(&[Key::Digit(3)]), vec![Tick::Dispatched(MenuAction::CheckSensors)]);
    let shown = &rig.hw.screens()[before..];
    assert_eq!(shown.len(), 4);
    assert_eq!(shown[0], ("Amb:22.0C L:812".into(), "Humid:45.0%".into()));
    assert_eq!(shown[1], ("Light ON  - Dark".into(), "Level: 812".into()));
    assert_eq!(shown[2], ("Rain Detected".into(), "Wipers ON".into()));
    assert_eq!(shown[3], ("3. Check Sensors".into(), "4. Initialise Mobile Conn".into()));
    assert_eq!(rig.hw.cabin_light(), Some(true));
}

#[test]
fn placeholder_actions_show_their_screen() {
    let mut rig = Rig::new();
    rig.press(&[Key::Digit(1), Key::Hash, Key::Digit(4)]);
    assert!(rig.hw.screens().iter().any(|s| s.0 == "Init Mobile Conn"));

    rig.press(&[Key::Hash, Key::Digit(5)]);
    assert!(rig.hw.screens().iter().any(|s| s.0 == "Low Power Mode"));
    assert_eq!(rig.mc.page(), MenuPage::Idle(2));
}

#[test]
fn power_off_without_engine_returns_to_main() {
    let mut rig = Rig::new();
    rig.press(&[Key::Digit(1), Key::Star, Key::Digit(6)]);
    assert_eq!(rig.mc.page(), MenuPage::Main);
    assert!(rig.hw.screens().iter().any(|s| s.0 == "Powering Off"));
    assert!(!rig.sink.events.iter().any(|e| matches!(e, AppEvent::EngineStopped { .. })));
}

#[test]
fn start_unlocked_when_configured() {
    let config = SystemConfig {
        start_locked: false,
        ..SystemConfig::default()
    };
    let rig = Rig::with_config(&config);
    assert!(!rig.mc.door().is_locked());
    assert_eq!(rig.hw.servo_angle(), Some(90.0));
    assert!(rig.sink.events.contains(&AppEvent::Started { door_locked: false }));
}
