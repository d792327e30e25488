//! Hobby servo driver (door lock bolt).
//!
//! Standard 50 Hz servo signal: a 0.5 ms pulse is 0°, a 2.5 ms pulse is
//! 180°, linear in between.  The PWM channel must already be configured
//! for 50 Hz (LEDC timer on ESP-IDF).
//!
//! ## Dual-target design
//!
//! Generic over [`SetDutyCycle`]: on ESP-IDF this is an `LedcDriver`; on
//! the host any mock channel works.

use embedded_hal::pwm::SetDutyCycle;
use log::debug;

use crate::error::ActuatorError;

/// Servo frame period at 50 Hz.
pub const PERIOD_US: u16 = 20_000;
const MIN_PULSE_US: u16 = 500;
const MAX_PULSE_US: u16 = 2_500;

pub struct ServoDriver<P: SetDutyCycle> {
    pwm: P,
    min_pulse_us: u16,
    max_pulse_us: u16,
    angle: Option<f32>,
}

impl<P: SetDutyCycle> ServoDriver<P> {
    pub fn new(pwm: P) -> Self {
        Self::with_pulse_range(pwm, MIN_PULSE_US, MAX_PULSE_US)
    }

    /// Custom end-stop pulses for servos that do not span 0.5–2.5 ms.
    pub fn with_pulse_range(pwm: P, min_pulse_us: u16, max_pulse_us: u16) -> Self {
        let max_pulse_us = max_pulse_us.clamp(min_pulse_us, PERIOD_US);
        Self {
            pwm,
            min_pulse_us,
            max_pulse_us,
            angle: None,
        }
    }

    /// Pulse width for `degrees` (clamped to 0–180).
    pub fn pulse_us(&self, degrees: f32) -> u16 {
        let deg = if degrees.is_finite() { degrees.clamp(0.0, 180.0) } else { 0.0 };
        let span = f32::from(self.max_pulse_us - self.min_pulse_us);
        self.min_pulse_us + (span * deg / 180.0).round() as u16
    }

    pub fn set_angle(&mut self, degrees: f32) -> Result<(), ActuatorError> {
        let pulse = self.pulse_us(degrees);
        self.pwm
            .set_duty_cycle_fraction(pulse, PERIOD_US)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        debug!("servo: {:.1} deg ({} us)", degrees, pulse);
        self.angle = Some(degrees);
        Ok(())
    }

    /// Last successfully commanded angle.
    pub fn angle(&self) -> Option<f32> {
        self.angle
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use embedded_hal::pwm::{ErrorKind, ErrorType, SetDutyCycle};

    /// PWM channel with a 16-bit resolution that records the last duty.
    #[derive(Debug, Default)]
    pub struct MockPwm {
        pub duty: u16,
        pub fail: bool,
    }

    #[derive(Debug)]
    pub struct MockPwmError;

    impl embedded_hal::pwm::Error for MockPwmError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    impl ErrorType for MockPwm {
        type Error = MockPwmError;
    }

    impl SetDutyCycle for MockPwm {
        fn max_duty_cycle(&self) -> u16 {
            u16::MAX
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            if self.fail {
                return Err(MockPwmError);
            }
            self.duty = duty;
            Ok(())
        }
    }
}
