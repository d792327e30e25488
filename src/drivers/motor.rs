//! Engine motor driver (single-direction, PWM speed).
//!
//! Speed is a percentage, 0 = stopped, 100 = full duty.
//!
//! ## Safety contract
//!
//! The motor must never run with the slide switch OFF.  Enforced by the
//! engine controller; this driver is a dumb actuator.
//!
//! ## Dual-target design
//!
//! Generic over [`SetDutyCycle`]: an `LedcDriver` on ESP-IDF, a mock
//! channel on the host.

use embedded_hal::pwm::SetDutyCycle;

use crate::error::ActuatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorState {
    Stopped,
    Running { duty: u8 },
}

pub struct MotorDriver<P: SetDutyCycle> {
    pwm: P,
    state: MotorState,
}

impl<P: SetDutyCycle> MotorDriver<P> {
    pub fn new(pwm: P) -> Self {
        Self {
            pwm,
            state: MotorState::Stopped,
        }
    }

    pub fn set_speed(&mut self, percent: u8) -> Result<(), ActuatorError> {
        let duty = percent.min(100);
        if duty == 0 {
            return self.stop();
        }
        self.pwm
            .set_duty_cycle_percent(duty)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.state = MotorState::Running { duty };
        Ok(())
    }

    /// Zero duty.  The state is `Stopped` even if the write fails, so the
    /// next command retries from a known baseline.
    pub fn stop(&mut self) -> Result<(), ActuatorError> {
        self.state = MotorState::Stopped;
        self.pwm
            .set_duty_cycle_fully_off()
            .map_err(|_| ActuatorError::PwmWriteFailed)
    }

    pub fn state(&self) -> MotorState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.state, MotorState::Stopped)
    }

    pub fn current_duty(&self) -> u8 {
        match self.state {
            MotorState::Stopped => 0,
            MotorState::Running { duty } => duty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::servo::mock::MockPwm;

    #[test]
    fn full_speed_is_full_duty() {
        let mut motor = MotorDriver::new(MockPwm::default());
        motor.set_speed(100).unwrap();
        assert_eq!(motor.pwm.duty, u16::MAX);
        assert_eq!(motor.state(), MotorState::Running { duty: 100 });
    }

    #[test]
    fn speed_is_clamped_to_100() {
        let mut motor = MotorDriver::new(MockPwm::default());
        motor.set_speed(250).unwrap();
        assert_eq!(motor.current_duty(), 100);
    }

    #[test]
    fn zero_speed_stops() {
        let mut motor = MotorDriver::new(MockPwm::default());
        motor.set_speed(60).unwrap();
        assert!(motor.is_running());
        motor.set_speed(0).unwrap();
        assert!(!motor.is_running());
        assert_eq!(motor.pwm.duty, 0);
    }

    #[test]
    fn failed_stop_still_marks_stopped() {
        let mut motor = MotorDriver::new(MockPwm::default());
        motor.set_speed(100).unwrap();
        motor.pwm.fail = true;
        assert_eq!(motor.stop(), Err(ActuatorError::PwmWriteFailed));
        assert_eq!(motor.state(), MotorState::Stopped);
    }
}
