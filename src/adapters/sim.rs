//! Scripted host-side hardware.
//!
//! [`SimHardware`] implements every port trait from scripted input queues
//! and records every output, so controller flows can be driven and
//! inspected on the host.  Time is simulated: delays advance a counter
//! instead of sleeping.
//!
//! Input scripts are consumed in order.  Once a sensor script runs out the
//! last value repeats; a credential read with nothing scripted panics,
//! since on real hardware it would block forever.  A wait loop that keeps
//! reading past the end of a script also panics after
//! [`EXHAUSTED_READ_LIMIT`] reads instead of hanging the test run.

use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;

use crate::app::ports::{
    BuzzerPort, ClimateReading, CredentialReader, DisplayPort, EnvironmentPort, MotionSensorPort,
    MotorPort, ServoPort, SwitchPort, SwitchState,
};
use crate::error::{ActuatorError, ReaderFault, SensorError};

/// Reads allowed past the end of a script before the simulation gives up.
pub const EXHAUSTED_READ_LIMIT: u32 = 100_000;

// ── Simulated delay ───────────────────────────────────────────

/// Delay provider that only counts simulated time.
#[derive(Debug, Default, Clone)]
pub struct SimDelay {
    elapsed_ns: u64,
}

impl SimDelay {
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns / 1_000_000
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.elapsed_ns += u64::from(ms) * 1_000_000;
    }
}

// ── Scripted input ────────────────────────────────────────────

#[derive(Debug)]
struct Script<T: Clone> {
    name: &'static str,
    pending: VecDeque<T>,
    last: T,
    reads: u32,
    exhausted_reads: u32,
}

impl<T: Clone> Script<T> {
    fn new(name: &'static str, initial: T) -> Self {
        Self {
            name,
            pending: VecDeque::new(),
            last: initial,
            reads: 0,
            exhausted_reads: 0,
        }
    }

    fn next(&mut self) -> T {
        self.reads += 1;
        if let Some(v) = self.pending.pop_front() {
            self.exhausted_reads = 0;
            self.last = v;
        } else {
            self.exhausted_reads += 1;
            assert!(
                self.exhausted_reads <= EXHAUSTED_READ_LIMIT,
                "sim: {} script exhausted, the caller is waiting for input that never comes",
                self.name
            );
        }
        self.last.clone()
    }
}

// ── SimHardware ───────────────────────────────────────────────

pub struct SimHardware {
    delay: SimDelay,

    screens: Vec<(String, String)>,
    servo_angle: Option<f32>,
    motor_speed: Option<u8>,
    buzzer: bool,
    cabin_light: Option<bool>,

    credentials: VecDeque<Result<u64, ReaderFault>>,
    switch: Script<Result<SwitchState, SensorError>>,
    motion: Script<Result<bool, SensorError>>,
    analog: Script<Result<u16, SensorError>>,
    climate: Script<Result<ClimateReading, SensorError>>,
    moisture: Script<Result<bool, SensorError>>,

    fail_servo: bool,
    fail_motor: bool,
    fail_buzzer: bool,
}

impl Default for SimHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHardware {
    /// Switch OFF, no motion, bright cabin, dry, 22 °C / 45 %RH.
    pub fn new() -> Self {
        Self {
            delay: SimDelay::default(),
            screens: Vec::new(),
            servo_angle: None,
            motor_speed: None,
            buzzer: false,
            cabin_light: None,
            credentials: VecDeque::new(),
            switch: Script::new("switch", Ok(SwitchState::Off)),
            motion: Script::new("motion", Ok(false)),
            analog: Script::new("analog", Ok(100)),
            climate: Script::new(
                "climate",
                Ok(ClimateReading {
                    celsius: 22.0,
                    humidity_pct: 45.0,
                }),
            ),
            moisture: Script::new("moisture", Ok(false)),
            fail_servo: false,
            fail_motor: false,
            fail_buzzer: false,
        }
    }

    // ── Scripting ─────────────────────────────────────────────

    pub fn push_credential(&mut self, read: Result<u64, ReaderFault>) {
        self.credentials.push_back(read);
    }

    pub fn push_switch(&mut self, reads: impl IntoIterator<Item = Result<SwitchState, SensorError>>) {
        self.switch.pending.extend(reads);
    }

    pub fn push_motion(&mut self, reads: impl IntoIterator<Item = Result<bool, SensorError>>) {
        self.motion.pending.extend(reads);
    }

    pub fn push_analog(&mut self, reads: impl IntoIterator<Item = Result<u16, SensorError>>) {
        self.analog.pending.extend(reads);
    }

    pub fn push_climate(&mut self, reads: impl IntoIterator<Item = Result<ClimateReading, SensorError>>) {
        self.climate.pending.extend(reads);
    }

    pub fn push_moisture(&mut self, reads: impl IntoIterator<Item = Result<bool, SensorError>>) {
        self.moisture.pending.extend(reads);
    }

    pub fn fail_servo(&mut self, fail: bool) {
        self.fail_servo = fail;
    }

    pub fn fail_motor(&mut self, fail: bool) {
        self.fail_motor = fail;
    }

    pub fn fail_buzzer(&mut self, fail: bool) {
        self.fail_buzzer = fail;
    }

    // ── Inspection ────────────────────────────────────────────

    /// Every screen drawn since construction, one entry per `clear()`.
    pub fn screens(&self) -> &[(String, String)] {
        &self.screens
    }

    pub fn last_screen(&self) -> Option<(String, String)> {
        self.screens.last().cloned()
    }

    pub fn servo_angle(&self) -> Option<f32> {
        self.servo_angle
    }

    pub fn motor_speed(&self) -> Option<u8> {
        self.motor_speed
    }

    /// Last commanded buzzer level (a failed command does not change it).
    pub fn buzzer_on(&self) -> bool {
        self.buzzer
    }

    pub fn cabin_light(&self) -> Option<bool> {
        self.cabin_light
    }

    pub fn pending_credentials(&self) -> usize {
        self.credentials.len()
    }

    pub fn motion_reads(&self) -> u32 {
        self.motion.reads
    }

    pub fn switch_reads(&self) -> u32 {
        self.switch.reads
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.delay.elapsed_ms()
    }
}

impl DelayNs for SimHardware {
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

impl DisplayPort for SimHardware {
    fn clear(&mut self) {
        self.screens.push((String::new(), String::new()));
    }

    fn write_line(&mut self, row: u8, text: &str) {
        if self.screens.is_empty() {
            self.screens.push((String::new(), String::new()));
        }
        if let Some(screen) = self.screens.last_mut() {
            match row {
                1 => screen.0 = text.to_owned(),
                _ => screen.1 = text.to_owned(),
            }
        }
    }
}

impl ServoPort for SimHardware {
    fn set_servo_angle(&mut self, degrees: f32) -> Result<(), ActuatorError> {
        if self.fail_servo {
            return Err(ActuatorError::PwmWriteFailed);
        }
        self.servo_angle = Some(degrees);
        Ok(())
    }
}

impl MotorPort for SimHardware {
    fn set_motor_speed(&mut self, percent: u8) -> Result<(), ActuatorError> {
        if self.fail_motor {
            return Err(ActuatorError::PwmWriteFailed);
        }
        self.motor_speed = Some(percent.min(100));
        Ok(())
    }
}

impl BuzzerPort for SimHardware {
    fn set_buzzer(&mut self, on: bool) -> Result<(), ActuatorError> {
        if self.fail_buzzer {
            return Err(ActuatorError::GpioWriteFailed);
        }
        self.buzzer = on;
        Ok(())
    }
}

impl CredentialReader for SimHardware {
    fn read_credential(&mut self) -> Result<u64, ReaderFault> {
        match self.credentials.pop_front() {
            Some(read) => read,
            None => panic!("sim: credential read with no card scripted"),
        }
    }
}

impl SwitchPort for SimHardware {
    fn read_switch(&mut self) -> Result<SwitchState, SensorError> {
        self.switch.next()
    }
}

impl MotionSensorPort for SimHardware {
    fn read_motion(&mut self) -> Result<bool, SensorError> {
        self.motion.next()
    }
}

impl EnvironmentPort for SimHardware {
    fn read_analog(&mut self, _channel: u8) -> Result<u16, SensorError> {
        self.analog.next()
    }

    fn read_climate(&mut self) -> Result<ClimateReading, SensorError> {
        self.climate.next()
    }

    fn read_moisture(&mut self) -> Result<bool, SensorError> {
        self.moisture.next()
    }

    fn set_cabin_light(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.cabin_light = Some(on);
        Ok(())
    }
}
