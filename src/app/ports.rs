//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ security controllers / MenuController
//! ```
//!
//! Driven adapters (display, servo, motor, buzzer, RFID reader, switches,
//! sensors, storage) implement these traits.  The controllers consume them
//! via generics, so the domain core never touches hardware directly.
//!
//! Method names are distinct across ports so one adapter can implement all
//! of them and be passed around as a single `&mut impl Hardware`, which
//! sidesteps double mutable borrows in flows that touch several devices.
//! Delays go through [`embedded_hal::delay::DelayNs`].

use embedded_hal::delay::DelayNs;

use crate::error::{ActuatorError, ReaderFault, SensorError};
use crate::events::Key;

// ───────────────────────────────────────────────────────────────
// Display (16×2 character LCD)
// ───────────────────────────────────────────────────────────────

pub trait DisplayPort {
    fn clear(&mut self);

    /// Write `text` on `row` (1-based).  Overlong text is truncated by the adapter.
    fn write_line(&mut self, row: u8, text: &str);

    /// Clear and draw up to two lines; empty lines are skipped.
    fn show(&mut self, line1: &str, line2: &str) {
        self.clear();
        if !line1.is_empty() {
            self.write_line(1, line1);
        }
        if !line2.is_empty() {
            self.write_line(2, line2);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Actuators
// ───────────────────────────────────────────────────────────────

/// Door lock servo.
pub trait ServoPort {
    /// Move to `degrees` (already clamped to 0–180 by the caller).
    fn set_servo_angle(&mut self, degrees: f32) -> Result<(), ActuatorError>;
}

/// Engine DC motor.
pub trait MotorPort {
    /// Set motor output (0–100 %).
    fn set_motor_speed(&mut self, percent: u8) -> Result<(), ActuatorError>;
}

/// Alarm buzzer.
pub trait BuzzerPort {
    fn set_buzzer(&mut self, on: bool) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Inputs
// ───────────────────────────────────────────────────────────────

/// Proximity (RFID) credential reader.
pub trait CredentialReader {
    /// Block until a card is presented and return its UID.
    fn read_credential(&mut self) -> Result<u64, ReaderFault>;
}

/// Position of the engine slide switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchState {
    On,
    Off,
}

pub trait SwitchPort {
    fn read_switch(&mut self) -> Result<SwitchState, SensorError>;
}

/// IR obstacle sensor line level (`true` = high).  Common modules are
/// active-low, so an approaching object shows as a falling edge.
pub trait MotionSensorPort {
    fn read_motion(&mut self) -> Result<bool, SensorError>;
}

/// Temperature and relative humidity from the climate sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    pub celsius: f32,
    pub humidity_pct: f32,
}

/// Cabin environment: ADC, climate sensor, rain sensor and cabin light.
pub trait EnvironmentPort {
    /// Raw 10-bit ADC reading (0–1023) on `channel`.
    fn read_analog(&mut self, channel: u8) -> Result<u16, SensorError>;

    fn read_climate(&mut self) -> Result<ClimateReading, SensorError>;

    /// `true` = moisture detected on the rain sensor.
    fn read_moisture(&mut self) -> Result<bool, SensorError>;

    fn set_cabin_light(&mut self, on: bool) -> Result<(), ActuatorError>;
}

/// Physical keypad.  Runs on the producer task, never on the control loop.
pub trait KeySource {
    /// Scan continuously, invoking `on_key` once per discrete press.
    fn scan_blocking(&mut self, on_key: &mut dyn FnMut(Key));
}

/// Everything the control loop drives.
pub trait Hardware:
    DisplayPort
    + ServoPort
    + MotorPort
    + BuzzerPort
    + CredentialReader
    + SwitchPort
    + MotionSensorPort
    + EnvironmentPort
    + DelayNs
{
}

impl<T> Hardware for T where
    T: DisplayPort
        + ServoPort
        + MotorPort
        + BuzzerPort
        + CredentialReader
        + SwitchPort
        + MotionSensorPort
        + EnvironmentPort
        + DelayNs
{
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage, used by the user registry.
///
/// Keys are namespaced to prevent collisions between subsystems.  Write
/// operations MUST be atomic — no partial writes on power loss.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full, or the value exceeds the caller's buffer.
    Full,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
