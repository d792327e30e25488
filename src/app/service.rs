//! Menu controller — the foreground control loop.
//!
//! [`MenuController`] owns every security controller and the consumer end
//! of the key queue.  All I/O flows through the port traits passed into
//! each call, so the whole loop runs against scripted hardware in tests.
//!
//! ```text
//!  KeyQueue ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!               │        MenuController         │
//!  Hardware ◀──▶│ Door · Engine · Intrusion ·   │
//!               │ Alarm · Access · Environment  │
//!               └──────────────────────────────┘
//! ```
//!
//! Each [`tick`](MenuController::tick) runs, in order: the slide-switch
//! safety check, one intrusion poll, the alarm (announced with
//! `AlarmRaised`, then held until a credential clears it), and at most
//! one key dispatch.
//!
//! Dispatch is blocking: while an engine start waits for a credential or
//! the slide switch, no other key is handled and the intrusion monitor is
//! not polled.  The door therefore cannot change during a start.

use std::sync::Arc;

use log::{debug, info};

use crate::config::SystemConfig;
use crate::events::{Key, KeyQueue};
use crate::security::access::{AccessControl, AccessError};
use crate::security::alarm::AlarmModal;
use crate::security::door::DoorLock;
use crate::security::engine::{EngineController, EngineTransition, SafetyCheck};
use crate::security::intrusion::{IntrusionMonitor, PollOutcome};
use crate::sensors::environment::EnvironmentMonitor;

use super::events::{AppEvent, Device, StartRefusal};
use super::menu::{action_for, step_page, MenuAction, MenuPage};
use super::ports::{EventSink, Hardware};

const BOOT_DWELL_MS: u32 = 1000;
const DOOR_MAIN_DWELL_MS: u32 = 400;
const DOOR_IDLE_DWELL_MS: u32 = 200;
const ENGINE_DWELL_MS: u32 = 1000;
const MOBILE_DWELL_MS: u32 = 1200;
const LOW_POWER_DWELL_MS: u32 = 1000;
const POWER_OFF_DWELL_MS: u32 = 500;

/// What one [`MenuController::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// No key arrived within the poll timeout.
    Idle,
    /// An alarm was cleared; the controller is back on the main menu.
    ReturnedToMenu,
    /// A key was dispatched to its bound action.
    Dispatched(MenuAction),
    /// A key arrived but is not bound on the current page.
    Ignored(Key),
}

pub struct MenuController {
    access: AccessControl,
    door: DoorLock,
    engine: EngineController,
    intrusion: IntrusionMonitor,
    alarm: AlarmModal,
    environment: EnvironmentMonitor,
    queue: Arc<KeyQueue>,
    page: MenuPage,
    key_poll_timeout_ms: u32,
    sensor_screen_ms: u32,
    evicted_seen: u32,
    tick_count: u64,
}

impl MenuController {
    /// Build every controller from `config`.  Drives the door servo to its
    /// configured start position.
    pub fn new(config: &SystemConfig, queue: Arc<KeyQueue>, hw: &mut impl Hardware) -> Self {
        Self {
            access: AccessControl::new(config.allowed_credentials.iter().cloned(), config.denied_dwell_ms),
            door: DoorLock::new(config, hw),
            engine: EngineController::new(config.require_credential_at_start, config.switch_poll_ms),
            intrusion: IntrusionMonitor::new(config.trigger_edge, config.debounce_hold_ms),
            alarm: AlarmModal::new(),
            environment: EnvironmentMonitor::from_config(config),
            queue,
            page: MenuPage::Main,
            key_poll_timeout_ms: config.key_poll_timeout_ms,
            sensor_screen_ms: config.sensor_screen_ms,
            evicted_seen: 0,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Wait for the slide switch to be OFF, show the boot screen and draw
    /// the main menu.
    pub fn start(&mut self, hw: &mut impl Hardware, sink: &mut impl EventSink) {
        if let Some(error) = self.door.take_boot_fault() {
            sink.emit(&AppEvent::ActuatorFault {
                device: Device::Servo,
                error,
            });
        }
        self.engine.ensure_switch_off_at_launch(hw);
        hw.show("System Ready", "Press 1 to Start");
        hw.delay_ms(BOOT_DWELL_MS);
        self.page = MenuPage::Main;
        self.redraw(hw);
        sink.emit(&AppEvent::Started {
            door_locked: self.door.is_locked(),
        });
        info!("MenuController started, door locked={}", self.door.is_locked());
    }

    // ── Per-tick orchestration ────────────────────────────────

    pub fn tick(&mut self, hw: &mut impl Hardware, sink: &mut impl EventSink) -> Tick {
        self.tick_count += 1;
        self.report_evictions(sink);

        // 1. Slide-switch interlock
        match self.engine.enforce_switch_safety(hw) {
            SafetyCheck::Ok => {}
            SafetyCheck::ForcedStop(motor) => {
                if let Err(error) = motor {
                    sink.emit(&AppEvent::ActuatorFault {
                        device: Device::Motor,
                        error,
                    });
                }
                sink.emit(&AppEvent::EngineStopped { forced: true });
                self.redraw(hw);
            }
            SafetyCheck::SensorFault(error) => sink.emit(&AppEvent::SensorFault {
                device: Device::SlideSwitch,
                error,
            }),
        }

        // 2. Intrusion
        match self.intrusion.poll(self.door.is_locked(), &mut self.alarm, hw) {
            PollOutcome::SensorFault(error) => sink.emit(&AppEvent::SensorFault {
                device: Device::MotionSensor,
                error,
            }),
            PollOutcome::Triggered => sink.emit(&AppEvent::AlarmRaised),
            PollOutcome::Skipped
            | PollOutcome::Disarmed
            | PollOutcome::Armed
            | PollOutcome::Quiet => {}
        }

        // 3. Alarm owns the input path until cleared
        if self.alarm.is_active() {
            self.drain_keys(sink);
            let id = self.intrusion.run_alarm(&mut self.alarm, &self.access, hw);
            sink.emit(&AppEvent::AlarmCleared(id));
        }
        if self.alarm.take_return_to_menu() {
            info!("MenuController: alarm cleared, returning to main menu");
            self.page = MenuPage::Main;
            self.drain_keys(sink);
            self.redraw(hw);
            return Tick::ReturnedToMenu;
        }

        // 4. At most one key
        let Some(key) = self.queue.pop_timeout(self.key_poll_timeout_ms, hw) else {
            return Tick::Idle;
        };
        match action_for(self.page, key) {
            Some(action) => {
                debug!("MenuController: '{}' on {:?} -> {:?}", key.symbol(), self.page, action);
                self.dispatch(action, hw, sink);
                Tick::Dispatched(action)
            }
            None => {
                debug!("MenuController: '{}' ignored on {:?}", key.symbol(), self.page);
                Tick::Ignored(key)
            }
        }
    }

    // ── Dispatch ──────────────────────────────────────────────

    fn dispatch(&mut self, action: MenuAction, hw: &mut impl Hardware, sink: &mut impl EventSink) {
        match action {
            MenuAction::EnterIdleMenu => {
                self.page = MenuPage::Idle(0);
            }
            MenuAction::ToggleDoor => {
                let (locked, result) = self.door.toggle_lock(hw);
                if let Err(error) = result {
                    sink.emit(&AppEvent::ActuatorFault {
                        device: Device::Servo,
                        error,
                    });
                }
                sink.emit(&AppEvent::DoorChanged { locked });
                hw.delay_ms(match self.page {
                    MenuPage::Main => DOOR_MAIN_DWELL_MS,
                    MenuPage::Idle(_) => DOOR_IDLE_DWELL_MS,
                });
            }
            MenuAction::ToggleEngine => {
                let was_running = self.engine.is_running();
                match self.engine.toggle(&self.access, hw) {
                    Ok(t) => self.report_engine(t, was_running, sink),
                    Err(AccessError::Denied(id)) => {
                        sink.emit(&AppEvent::EngineStartFailed(StartRefusal::Denied(id)));
                    }
                    Err(AccessError::ReaderFault(fault)) => {
                        sink.emit(&AppEvent::EngineStartFailed(StartRefusal::ReaderFault(fault)));
                    }
                }
                hw.delay_ms(ENGINE_DWELL_MS);
            }
            MenuAction::CheckSensors => {
                self.environment.display_all(hw, self.sensor_screen_ms);
            }
            MenuAction::MobileConnection => {
                hw.show("Init Mobile Conn", "");
                hw.delay_ms(MOBILE_DWELL_MS);
            }
            MenuAction::LowPowerMode => {
                hw.show("Low Power Mode", "");
                hw.delay_ms(LOW_POWER_DWELL_MS);
            }
            MenuAction::PowerOff => {
                hw.show("Powering Off", "");
                if self.engine.is_running() {
                    let t = self.engine.stop(hw);
                    self.report_engine(t, true, sink);
                    hw.delay_ms(POWER_OFF_DWELL_MS);
                }
                hw.clear();
                self.page = MenuPage::Main;
            }
            MenuAction::PreviousPage | MenuAction::NextPage => {
                if let MenuPage::Idle(page) = self.page {
                    self.page = MenuPage::Idle(step_page(page, action == MenuAction::NextPage));
                }
            }
        }
        self.redraw(hw);
    }

    fn report_engine(&self, t: EngineTransition, was_running: bool, sink: &mut impl EventSink) {
        if let Err(error) = t.motor {
            sink.emit(&AppEvent::ActuatorFault {
                device: Device::Motor,
                error,
            });
        }
        if t.changed {
            sink.emit(&if was_running {
                AppEvent::EngineStopped { forced: false }
            } else {
                AppEvent::EngineStarted
            });
        }
    }

    fn drain_keys(&self, sink: &mut impl EventSink) {
        let dropped = self.queue.drain();
        if dropped > 0 {
            sink.emit(&AppEvent::KeysDropped(dropped));
        }
    }

    fn report_evictions(&mut self, sink: &mut impl EventSink) {
        let evicted = self.queue.evicted();
        if evicted != self.evicted_seen {
            sink.emit(&AppEvent::KeysDropped(evicted.wrapping_sub(self.evicted_seen) as usize));
            self.evicted_seen = evicted;
        }
    }

    fn redraw(&self, hw: &mut impl Hardware) {
        let (line1, line2) = self.page.lines();
        hw.show(line1, line2);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn page(&self) -> MenuPage {
        self.page
    }

    pub fn door(&self) -> &DoorLock {
        &self.door
    }

    pub fn engine(&self) -> &EngineController {
        &self.engine
    }

    pub fn intrusion(&self) -> &IntrusionMonitor {
        &self.intrusion
    }

    pub fn alarm(&self) -> &AlarmModal {
        &self.alarm
    }

    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    /// Mutable allow-list access, for runtime replacement.
    pub fn access_mut(&mut self) -> &mut AccessControl {
        &mut self.access
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}
