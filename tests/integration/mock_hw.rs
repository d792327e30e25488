//! Recording hardware for integration tests.
//!
//! Wraps [`SimHardware`] and records every actuator command and every
//! input read in order, so tests can assert on the sequence the
//! controllers produced (e.g. "motor only after switch ON").

use std::cell::RefCell;
use std::rc::Rc;

use carguard::adapters::sim::SimHardware;
use carguard::app::events::AppEvent;
use carguard::app::ports::{
    BuzzerPort, ClimateReading, CredentialReader, DisplayPort, EnvironmentPort, EventSink,
    MotionSensorPort, MotorPort, ServoPort, SwitchPort, SwitchState,
};
use carguard::error::{ActuatorError, ReaderFault, SensorError};
use embedded_hal::delay::DelayNs;

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HwCall {
    Servo(f32),
    Motor(u8),
    Buzzer(bool),
    CredentialRead(Result<u64, ReaderFault>),
    SwitchRead(Result<SwitchState, SensorError>),
}

// ── RecordingHardware ─────────────────────────────────────────

pub struct RecordingHardware {
    pub sim: SimHardware,
    pub calls: Vec<HwCall>,
    /// Snapshot of `observed` taken at every credential read.
    pub events_at_read: Vec<Vec<AppEvent>>,
    observed: Option<SharedEvents>,
}

#[allow(dead_code)]
impl RecordingHardware {
    pub fn new() -> Self {
        Self {
            sim: SimHardware::new(),
            calls: Vec::new(),
            events_at_read: Vec::new(),
            observed: None,
        }
    }

    /// Watch an event log shared with a [`SharedSink`].
    pub fn observing(mut self, events: SharedEvents) -> Self {
        self.observed = Some(events);
        self
    }

    pub fn motor_commands(&self) -> Vec<u8> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::Motor(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    /// Index of the first call matching `pred`.
    pub fn position(&self, pred: impl Fn(&HwCall) -> bool) -> Option<usize> {
        self.calls.iter().position(pred)
    }
}

impl DelayNs for RecordingHardware {
    fn delay_ns(&mut self, ns: u32) {
        self.sim.delay_ns(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.sim.delay_ms(ms);
    }
}

impl DisplayPort for RecordingHardware {
    fn clear(&mut self) {
        self.sim.clear();
    }

    fn write_line(&mut self, row: u8, text: &str) {
        self.sim.write_line(row, text);
    }
}

impl ServoPort for RecordingHardware {
    fn set_servo_angle(&mut self, degrees: f32) -> Result<(), ActuatorError> {
        self.calls.push(HwCall::Servo(degrees));
        self.sim.set_servo_angle(degrees)
    }
}

impl MotorPort for RecordingHardware {
    fn set_motor_speed(&mut self, percent: u8) -> Result<(), ActuatorError> {
        self.calls.push(HwCall::Motor(percent));
        self.sim.set_motor_speed(percent)
    }
}

impl BuzzerPort for RecordingHardware {
    fn set_buzzer(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.calls.push(HwCall::Buzzer(on));
        self.sim.set_buzzer(on)
    }
}

impl CredentialReader for RecordingHardware {
    fn read_credential(&mut self) -> Result<u64, ReaderFault> {
        if let Some(events) = &self.observed {
            self.events_at_read.push(events.borrow().clone());
        }
        let read = self.sim.read_credential();
        self.calls.push(HwCall::CredentialRead(read));
        read
    }
}

impl SwitchPort for RecordingHardware {
    fn read_switch(&mut self) -> Result<SwitchState, SensorError> {
        let read = self.sim.read_switch();
        self.calls.push(HwCall::SwitchRead(read));
        read
    }
}

impl MotionSensorPort for RecordingHardware {
    fn read_motion(&mut self) -> Result<bool, SensorError> {
        self.sim.read_motion()
    }
}

impl EnvironmentPort for RecordingHardware {
    fn read_analog(&mut self, channel: u8) -> Result<u16, SensorError> {
        self.sim.read_analog(channel)
    }

    fn read_climate(&mut self) -> Result<ClimateReading, SensorError> {
        self.sim.read_climate()
    }

    fn read_moisture(&mut self) -> Result<bool, SensorError> {
        self.sim.read_moisture()
    }

    fn set_cabin_light(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.sim.set_cabin_light(on)
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

/// Event log shared between a sink and the hardware under test.
pub type SharedEvents = Rc<RefCell<Vec<AppEvent>>>;

pub struct SharedSink(pub SharedEvents);

impl EventSink for SharedSink {
    fn emit(&mut self, event: &AppEvent) {
        self.0.borrow_mut().push(event.clone());
    }
}
