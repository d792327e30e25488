//! Unified error types for the CarGuard controller.
//!
//! A single `Error` enum that every subsystem converts into, so the
//! control loop handles faults uniformly. All variants are `Copy` and are
//! caught at the call site: none of them unwind the control loop.
//!
//! | Kind            | Policy                                              |
//! |-----------------|-----------------------------------------------------|
//! | `SensorError`   | non-fatal, reading treated as unknown, retried      |
//! | `ActuatorError` | reported, logical state still updates               |
//! | `ReaderFault`   | aborts the current credential attempt (fail-closed) |
//! | `ConfigError`   | values clamped; structural errors rejected          |
//! | `StorageError`  | registry/config unavailable, controller still runs  |

use core::fmt;

use crate::app::ports::StorageError;

// ---------------------------------------------------------------------------
// Top-level controller error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned invalid data.
    Sensor(SensorError),
    /// An actuator command failed.
    Actuator(ActuatorError),
    /// The credential reader failed.
    Reader(ReaderFault),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// Persistent storage failed.
    Storage(StorageError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Reader(e) => write!(f, "reader: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC read returned an error.
    AdcReadFailed,
    /// GPIO read returned an error.
    GpioReadFailed,
    /// Sensor answered but the frame was invalid (e.g. DHT11 checksum).
    InvalidReading,
    /// No driver is wired for this sensor.
    Unavailable,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
            Self::InvalidReading => write!(f, "invalid reading"),
            Self::Unavailable => write!(f, "sensor unavailable"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// PWM duty-cycle write failed.
    PwmWriteFailed,
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Reader faults
// ---------------------------------------------------------------------------

/// The credential reader could not deliver an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderFault {
    /// No reader is attached, or it stopped answering.
    Disconnected,
    /// The reader answered with a frame that is not a UID.
    BadFrame,
}

impl fmt::Display for ReaderFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "reader disconnected"),
            Self::BadFrame => write!(f, "malformed UID frame"),
        }
    }
}

impl From<ReaderFault> for Error {
    fn from(e: ReaderFault) -> Self {
        Self::Reader(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The document could not be parsed.
    Malformed,
    /// A replacement allow-list was empty; use `AccessControl::clear` instead.
    EmptyAllowList,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed configuration"),
            Self::EmptyAllowList => write!(f, "allow-list must not be empty"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Controller-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_config(raw: &str) -> Result<crate::config::SystemConfig> {
        Ok(crate::config::SystemConfig::from_json(raw)?)
    }

    #[test]
    fn leaf_errors_convert_and_display() {
        let e: Error = ReaderFault::BadFrame.into();
        assert_eq!(e, Error::Reader(ReaderFault::BadFrame));
        assert_eq!(e.to_string(), "reader: malformed UID frame");
        assert_eq!(Error::from(StorageError::Full).to_string(), "storage: storage full");
    }

    #[test]
    fn question_mark_lifts_config_errors() {
        assert_eq!(parse_config("{ nope").unwrap_err(), Error::Config(ConfigError::Malformed));
        assert!(parse_config("{}").is_ok());
    }
}
