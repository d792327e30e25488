//! Door lock controller.
//!
//! Owns the logical lock state and the two servo target angles.  The
//! logical state always follows the command: a servo fault is reported
//! but never rolls `locked` back, so physical and logical state may
//! diverge until the next successful command.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::app::ports::{DisplayPort, ServoPort};
use crate::config::{clamp_angle, SystemConfig};
use crate::error::ActuatorError;

const STATE_DWELL_MS: u32 = 800;
const ANGLES_DWELL_MS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoorState {
    pub locked: bool,
    pub lock_angle: f32,
    pub unlock_angle: f32,
}

pub struct DoorLock {
    state: DoorState,
    settle_ms: u32,
    boot_fault: Option<ActuatorError>,
}

impl DoorLock {
    /// Build and drive the servo to the configured start position.
    ///
    /// A servo fault here does not stop construction: the door comes up
    /// with the configured logical state and the fault is held for
    /// [`take_boot_fault`](Self::take_boot_fault).
    pub fn new<H>(config: &SystemConfig, hw: &mut H) -> Self
    where
        H: ServoPort + DisplayPort + DelayNs,
    {
        let mut door = Self {
            state: DoorState {
                locked: config.start_locked,
                lock_angle: clamp_angle(config.lock_angle_deg),
                unlock_angle: clamp_angle(config.unlock_angle_deg),
            },
            settle_ms: config.servo_settle_ms,
            boot_fault: None,
        };
        door.boot_fault = door.apply(hw).err();
        info!("Door: initialised, locked={}", door.state.locked);
        door.show_state(hw);
        door
    }

    /// Servo fault from the initial positioning, reported once.
    pub fn take_boot_fault(&mut self) -> Option<ActuatorError> {
        self.boot_fault.take()
    }

    pub fn state(&self) -> DoorState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state.locked
    }

    /// Current servo target for the logical state.
    pub fn target_angle(&self) -> f32 {
        if self.state.locked {
            self.state.lock_angle
        } else {
            self.state.unlock_angle
        }
    }

    pub fn lock<H>(&mut self, hw: &mut H) -> Result<(), ActuatorError>
    where
        H: ServoPort + DisplayPort + DelayNs,
    {
        self.set_locked(true, hw)
    }

    pub fn unlock<H>(&mut self, hw: &mut H) -> Result<(), ActuatorError>
    where
        H: ServoPort + DisplayPort + DelayNs,
    {
        self.set_locked(false, hw)
    }

    /// Flip the lock.  Returns the new logical state alongside any servo fault.
    pub fn toggle_lock<H>(&mut self, hw: &mut H) -> (bool, Result<(), ActuatorError>)
    where
        H: ServoPort + DisplayPort + DelayNs,
    {
        let target = !self.state.locked;
        let result = self.set_locked(target, hw);
        (target, result)
    }

    /// Clamp and store new angles, then re-apply the current target.
    pub fn set_angles<H>(&mut self, lock_deg: f32, unlock_deg: f32, hw: &mut H) -> Result<(), ActuatorError>
    where
        H: ServoPort + DisplayPort + DelayNs,
    {
        self.state.lock_angle = clamp_angle(lock_deg);
        self.state.unlock_angle = clamp_angle(unlock_deg);
        let result = self.apply(hw);
        hw.show(
            "Angles set",
            &format!("L:{} U:{}", self.state.lock_angle as u8, self.state.unlock_angle as u8),
        );
        hw.delay_ms(ANGLES_DWELL_MS);
        result
    }

    fn set_locked<H>(&mut self, locked: bool, hw: &mut H) -> Result<(), ActuatorError>
    where
        H: ServoPort + DisplayPort + DelayNs,
    {
        let prev = self.state.locked;
        self.state.locked = locked;
        info!("Door: locked {} -> {}", prev, locked);
        let result = self.apply(hw);
        self.show_state(hw);
        result
    }

    fn show_state(&self, hw: &mut (impl DisplayPort + DelayNs)) {
        hw.show(if self.state.locked { "Door Locked" } else { "Door Unlocked" }, "");
        hw.delay_ms(STATE_DWELL_MS);
    }

    fn apply<H>(&self, hw: &mut H) -> Result<(), ActuatorError>
    where
        H: ServoPort + DisplayPort + DelayNs,
    {
        let result = hw.set_servo_angle(self.target_angle());
        if let Err(e) = result {
            warn!("Door: servo command failed ({e}), logical state kept");
            hw.show("Servo error", &e.to_string());
        }
        hw.delay_ms(self.settle_ms);
        result
    }
}
