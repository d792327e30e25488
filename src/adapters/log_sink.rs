//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC on target, stderr on the host).

use log::{info, warn};

use crate::app::events::{AppEvent, StartRefusal};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { door_locked } => {
                info!("START | door_locked={}", door_locked);
            }
            AppEvent::DoorChanged { locked } => {
                info!("DOOR  | locked={}", locked);
            }
            AppEvent::EngineStarted => {
                info!("ENGINE | running");
            }
            AppEvent::EngineStopped { forced } => {
                info!("ENGINE | stopped forced={}", forced);
            }
            AppEvent::EngineStartFailed(StartRefusal::Denied(id)) => {
                warn!("ENGINE | start refused, credential {} denied", id);
            }
            AppEvent::EngineStartFailed(StartRefusal::ReaderFault(fault)) => {
                warn!("ENGINE | start refused, {}", fault);
            }
            AppEvent::AlarmRaised => {
                warn!("ALARM | raised");
            }
            AppEvent::AlarmCleared(id) => {
                info!("ALARM | cleared by {}", id);
            }
            AppEvent::SensorFault { device, error } => {
                warn!("FAULT | sensor {:?}: {}", device, error);
            }
            AppEvent::ActuatorFault { device, error } => {
                warn!("FAULT | actuator {:?}: {}", device, error);
            }
            AppEvent::KeysDropped(n) => {
                info!("KEYS  | dropped {}", n);
            }
        }
    }
}
