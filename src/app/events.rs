//! Outbound application events.
//!
//! The [`MenuController`](super::service::MenuController) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them (serial log today).

use crate::error::{ActuatorError, ReaderFault, SensorError};
use crate::security::access::CredentialId;

/// Which device an [`AppEvent::ActuatorFault`] or
/// [`AppEvent::SensorFault`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Servo,
    Motor,
    Buzzer,
    SlideSwitch,
    MotionSensor,
    CredentialReader,
}

/// Why an engine start was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartRefusal {
    Denied(CredentialId),
    ReaderFault(ReaderFault),
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The controller has started (carries the initial lock state).
    Started { door_locked: bool },

    /// The door lock changed logical state.
    DoorChanged { locked: bool },

    /// The engine reached Running.
    EngineStarted,

    /// The engine stopped; `forced` when the slide-switch interlock did it.
    EngineStopped { forced: bool },

    /// An engine start request was refused at the credential step.
    EngineStartFailed(StartRefusal),

    /// A confirmed IR edge raised the alarm.
    AlarmRaised,

    /// The alarm was cleared by an allowed credential.
    AlarmCleared(CredentialId),

    /// A sensor read failed (non-fatal, retried next tick).
    SensorFault { device: Device, error: SensorError },

    /// An actuator command failed (logical state still updated).
    ActuatorFault { device: Device, error: ActuatorError },

    /// Keys discarded (drained during the alarm or evicted on overflow).
    KeysDropped(usize),
}
