//! Engine start/stop interlock.
//!
//! ```text
//!  Stopped ──start()──▶ AwaitingCredential ──granted──▶ AwaitingSwitch ──switch ON──▶ Running
//!     ▲                        │ denied / fault                                          │
//!     └────────────────────────┘                                                         │
//!     └───────────────────────── stop() / switch OFF while running ◀────────────────────┘
//! ```
//!
//! The order is strict: a credential first, then the slide switch.  A
//! switch that is already ON when the credential is granted counts as
//! observed ON.  Both waits block the control loop with no timeout.

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::app::ports::{CredentialReader, DisplayPort, MotorPort, SwitchPort, SwitchState};
use crate::error::{ActuatorError, SensorError};
use crate::security::access::{AccessControl, AccessError, Prompt};

const START_PROMPT: Prompt<'static> = Prompt::new("Tap RFID Card", "");
const FULL_SPEED: u8 = 100;
const STOPPED_DWELL_MS: u32 = 1000;
const SWITCH_OK_DWELL_MS: u32 = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Stopped,
    AwaitingCredential,
    AwaitingSwitch,
    Running,
}

/// Outcome of a start or stop request that was not refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct EngineTransition {
    /// `false` when the engine was already in the requested state.
    pub changed: bool,
    /// Motor command result; the logical state changes regardless.
    pub motor: Result<(), ActuatorError>,
}

impl EngineTransition {
    const UNCHANGED: Self = Self {
        changed: false,
        motor: Ok(()),
    };
}

/// Result of [`EngineController::enforce_switch_safety`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyCheck {
    /// Not running, or running with the switch ON.
    Ok,
    /// The switch read OFF while running; the engine was stopped.
    ForcedStop(Result<(), ActuatorError>),
    /// The switch could not be read; nothing changed.
    SensorFault(SensorError),
}

pub struct EngineController {
    state: EngineState,
    require_credential: bool,
    switch_poll_ms: u32,
}

impl EngineController {
    pub fn new(require_credential: bool, switch_poll_ms: u32) -> Self {
        Self {
            state: EngineState::Stopped,
            require_credential,
            switch_poll_ms: switch_poll_ms.max(1),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    /// Stop if running, otherwise start.
    pub fn toggle<H>(&mut self, access: &AccessControl, hw: &mut H) -> Result<EngineTransition, AccessError>
    where
        H: CredentialReader + SwitchPort + MotorPort + DisplayPort + DelayNs,
    {
        if self.is_running() {
            Ok(self.stop(hw))
        } else {
            self.start(access, hw)
        }
    }

    /// Credential, then switch ON, then motor at full speed.
    pub fn start<H>(&mut self, access: &AccessControl, hw: &mut H) -> Result<EngineTransition, AccessError>
    where
        H: CredentialReader + SwitchPort + MotorPort + DisplayPort + DelayNs,
    {
        if self.is_running() {
            return Ok(EngineTransition::UNCHANGED);
        }

        self.transition(EngineState::AwaitingCredential);
        if self.require_credential {
            if let Err(e) = access.authenticate_once(START_PROMPT, hw) {
                warn!("Engine: start refused ({e})");
                self.transition(EngineState::Stopped);
                return Err(e);
            }
        } else {
            debug!("Engine: credential check disabled");
        }

        self.transition(EngineState::AwaitingSwitch);
        self.wait_for_switch(SwitchState::On, ("Turn slide switch", "ON to start"), hw);

        let motor = hw.set_motor_speed(FULL_SPEED);
        if let Err(e) = motor {
            warn!("Engine: motor start failed ({e})");
        }
        self.transition(EngineState::Running);
        hw.show("Engine started", "Drive safely");
        Ok(EngineTransition {
            changed: true,
            motor,
        })
    }

    /// Motor to zero.  A no-op when already stopped.
    pub fn stop<H>(&mut self, hw: &mut H) -> EngineTransition
    where
        H: MotorPort + DisplayPort + DelayNs,
    {
        if self.state == EngineState::Stopped {
            return EngineTransition::UNCHANGED;
        }

        let motor = hw.set_motor_speed(0);
        if let Err(e) = motor {
            warn!("Engine: motor stop failed ({e})");
        }
        hw.show("Engine stopped", "");
        hw.delay_ms(STOPPED_DWELL_MS);
        self.transition(EngineState::Stopped);
        EngineTransition {
            changed: true,
            motor,
        }
    }

    /// Stop immediately if running and the switch reads OFF.
    pub fn enforce_switch_safety<H>(&mut self, hw: &mut H) -> SafetyCheck
    where
        H: SwitchPort + MotorPort + DisplayPort + DelayNs,
    {
        if !self.is_running() {
            return SafetyCheck::Ok;
        }
        match hw.read_switch() {
            Ok(SwitchState::On) => SafetyCheck::Ok,
            Ok(SwitchState::Off) => {
                warn!("Engine: slide switch OFF while running, forcing stop");
                SafetyCheck::ForcedStop(self.stop(hw).motor)
            }
            Err(e) => {
                debug!("Engine: switch read failed ({e})");
                SafetyCheck::SensorFault(e)
            }
        }
    }

    /// Block until the slide switch reads OFF.  Called once before the UI starts.
    pub fn ensure_switch_off_at_launch<H>(&self, hw: &mut H)
    where
        H: SwitchPort + DisplayPort + DelayNs,
    {
        if self.wait_for_switch(SwitchState::Off, ("Turn slide switch", "OFF to begin"), hw) {
            hw.show("OK: Switch OFF", "");
            hw.delay_ms(SWITCH_OK_DWELL_MS);
            hw.clear();
        }
    }

    /// Poll until the switch reads `target`.  Read faults count as "not
    /// yet".  Returns `true` if the prompt had to be shown.
    fn wait_for_switch<H>(&self, target: SwitchState, prompt: (&str, &str), hw: &mut H) -> bool
    where
        H: SwitchPort + DisplayPort + DelayNs,
    {
        if hw.read_switch() == Ok(target) {
            return false;
        }
        info!("Engine: waiting for slide switch {:?}", target);
        hw.show(prompt.0, prompt.1);
        loop {
            hw.delay_ms(self.switch_poll_ms);
            match hw.read_switch() {
                Ok(state) if state == target => return true,
                Ok(_) => {}
                Err(e) => debug!("Engine: switch read failed ({e})"),
            }
        }
    }

    fn transition(&mut self, next: EngineState) {
        info!("Engine: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
