//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns every actuator driver and GPIO input and exposes them through the
//! port traits the security controllers consume.  The display, credential
//! reader and environment sensors arrive as trait objects so that boards
//! without them (or with different parts) can plug in whatever they have.
//!
//! ```text
//!   ServoDriver ─┐
//!   MotorDriver ─┤
//!   Buzzer ──────┤
//!   MotionSensor ┼──▶ HardwareAdapter ──▶ impl Hardware ──▶ MenuController
//!   SlideSwitch ─┤
//!   dyn Display ─┤
//!   dyn Reader ──┤
//!   dyn Env ─────┘
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::pwm::SetDutyCycle;
use log::debug;

use crate::app::ports::{
    BuzzerPort, ClimateReading, CredentialReader, DisplayPort, EnvironmentPort, MotionSensorPort,
    MotorPort, ServoPort, SwitchPort, SwitchState,
};
use crate::drivers::buzzer::Buzzer;
use crate::drivers::motor::MotorDriver;
use crate::drivers::servo::ServoDriver;
use crate::error::{ActuatorError, ReaderFault, SensorError};
use crate::sensors::motion::MotionSensor;
use crate::sensors::switch::SlideSwitch;

/// PWM and GPIO outputs.
pub struct Actuators<Srv: SetDutyCycle, Mot: SetDutyCycle, Bz: OutputPin> {
    pub servo: ServoDriver<Srv>,
    pub motor: MotorDriver<Mot>,
    pub buzzer: Buzzer<Bz>,
}

/// GPIO inputs polled by the control loop.
pub struct Inputs<Ir: InputPin, Sw: InputPin> {
    pub motion: MotionSensor<Ir>,
    pub switch: SlideSwitch<Sw>,
}

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<Srv, Mot, Bz, Ir, Sw, D>
where
    Srv: SetDutyCycle,
    Mot: SetDutyCycle,
    Bz: OutputPin,
    Ir: InputPin,
    Sw: InputPin,
    D: DelayNs,
{
    actuators: Actuators<Srv, Mot, Bz>,
    inputs: Inputs<Ir, Sw>,
    display: Box<dyn DisplayPort>,
    reader: Box<dyn CredentialReader>,
    environment: Box<dyn EnvironmentPort>,
    delay: D,
}

impl<Srv, Mot, Bz, Ir, Sw, D> HardwareAdapter<Srv, Mot, Bz, Ir, Sw, D>
where
    Srv: SetDutyCycle,
    Mot: SetDutyCycle,
    Bz: OutputPin,
    Ir: InputPin,
    Sw: InputPin,
    D: DelayNs,
{
    pub fn new(
        actuators: Actuators<Srv, Mot, Bz>,
        inputs: Inputs<Ir, Sw>,
        display: Box<dyn DisplayPort>,
        reader: Box<dyn CredentialReader>,
        delay: D,
    ) -> Self {
        Self {
            actuators,
            inputs,
            display,
            reader,
            environment: Box::new(UnwiredEnvironment),
            delay,
        }
    }

    /// Attach environment sensors (light ADC, climate, moisture).
    #[must_use]
    pub fn with_environment(mut self, environment: Box<dyn EnvironmentPort>) -> Self {
        self.environment = environment;
        self
    }

    pub fn actuators(&self) -> &Actuators<Srv, Mot, Bz> {
        &self.actuators
    }
}

// ── Actuator ports ────────────────────────────────────────────

impl<Srv, Mot, Bz, Ir, Sw, D> ServoPort for HardwareAdapter<Srv, Mot, Bz, Ir, Sw, D>
where
    Srv: SetDutyCycle,
    Mot: SetDutyCycle,
    Bz: OutputPin,
    Ir: InputPin,
    Sw: InputPin,
    D: DelayNs,
{
    fn set_servo_angle(&mut self, degrees: f32) -> Result<(), ActuatorError> {
        self.actuators.servo.set_angle(degrees)
    }
}

impl<Srv, Mot, Bz, Ir, Sw, D> MotorPort for HardwareAdapter<Srv, Mot, Bz, Ir, Sw, D>
where
    Srv: SetDutyCycle,
    Mot: SetDutyCycle,
    Bz: OutputPin,
    Ir: InputPin,
    Sw: InputPin,
    D: DelayNs,
{
    fn set_motor_speed(&mut self, percent: u8) -> Result<(), ActuatorError> {
        self.actuators.motor.set_speed(percent)
    }
}

impl<Srv, Mot, Bz, Ir, Sw, D> BuzzerPort for HardwareAdapter<Srv, Mot, Bz, Ir, Sw, D>
where
    Srv: SetDutyCycle,
    Mot: SetDutyCycle,
    Bz: OutputPin,
    Ir: InputPin,
    Sw: InputPin,
    D: DelayNs,
{
    fn set_buzzer(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.actuators.buzzer.set(on)
    }
}

// ── Input ports ───────────────────────────────────────────────

impl<Srv, Mot, Bz, Ir, Sw, D> SwitchPort for HardwareAdapter<Srv, Mot, Bz, Ir, Sw, D>
where
    Srv: SetDutyCycle,
    Mot: SetDutyCycle,
    Bz: OutputPin,
    Ir: InputPin,
    Sw: InputPin,
    D: DelayNs,
{
    fn read_switch(&mut self) -> Result<SwitchState, SensorError> {
        self.inputs.switch.read()
    }
}

impl<Srv, Mot, Bz, Ir, Sw, D> MotionSensorPort for HardwareAdapter<Srv, Mot, Bz, Ir, Sw, D>
where
    Srv: SetDutyCycle,
    Mot: SetDutyCycle,
    Bz: OutputPin,
    Ir: InputPin,
    Sw: InputPin,
    D: DelayNs,
{
    fn read_motion(&mut self) -> Result<bool, SensorError> {
        self.inputs.motion.read()
    }
}

impl<Srv, Mot, Bz, Ir, Sw, D> CredentialReader for HardwareAdapter<Srv, Mot, Bz, Ir, Sw, D>
where
    Srv: SetDutyCycle,
    Mot: SetDutyCycle,
    Bz: OutputPin,
    Ir: InputPin,
    Sw: InputPin,
    D: DelayNs,
{
    fn read_credential(&mut self) -> Result<u64, ReaderFault> {
        self.reader.read_credential()
    }
}

impl<Srv, Mot, Bz, Ir, Sw, D> EnvironmentPort for HardwareAdapter<Srv, Mot, Bz, Ir, Sw, D>
where
    Srv: SetDutyCycle,
    Mot: SetDutyCycle,
    Bz: OutputPin,
    Ir: InputPin,
    Sw: InputPin,
    D: DelayNs,
{
    fn read_analog(&mut self, channel: u8) -> Result<u16, SensorError> {
        self.environment.read_analog(channel)
    }

    fn read_climate(&mut self) -> Result<ClimateReading, SensorError> {
        self.environment.read_climate()
    }

    fn read_moisture(&mut self) -> Result<bool, SensorError> {
        self.environment.read_moisture()
    }

    fn set_cabin_light(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.environment.set_cabin_light(on)
    }
}

// ── Display and timing ────────────────────────────────────────

impl<Srv, Mot, Bz, Ir, Sw, D> DisplayPort for HardwareAdapter<Srv, Mot, Bz, Ir, Sw, D>
where
    Srv: SetDutyCycle,
    Mot: SetDutyCycle,
    Bz: OutputPin,
    Ir: InputPin,
    Sw: InputPin,
    D: DelayNs,
{
    fn clear(&mut self) {
        self.display.clear();
    }

    fn write_line(&mut self, row: u8, text: &str) {
        self.display.write_line(row, text);
    }
}

impl<Srv, Mot, Bz, Ir, Sw, D> DelayNs for HardwareAdapter<Srv, Mot, Bz, Ir, Sw, D>
where
    Srv: SetDutyCycle,
    Mot: SetDutyCycle,
    Bz: OutputPin,
    Ir: InputPin,
    Sw: InputPin,
    D: DelayNs,
{
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

// ── Unwired environment ───────────────────────────────────────

/// Placeholder for boards without environment sensors: every read is
/// `Unavailable` (rendered as `N/A`), the cabin light command is dropped.
#[derive(Debug, Default)]
pub struct UnwiredEnvironment;

impl EnvironmentPort for UnwiredEnvironment {
    fn read_analog(&mut self, _channel: u8) -> Result<u16, SensorError> {
        Err(SensorError::Unavailable)
    }

    fn read_climate(&mut self) -> Result<ClimateReading, SensorError> {
        Err(SensorError::Unavailable)
    }

    fn read_moisture(&mut self) -> Result<bool, SensorError> {
        Err(SensorError::Unavailable)
    }

    fn set_cabin_light(&mut self, on: bool) -> Result<(), ActuatorError> {
        debug!("cabin light {} (not wired)", if on { "on" } else { "off" });
        Ok(())
    }
}
