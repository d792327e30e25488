//! IR obstacle sensor input.
//!
//! Reports the raw line level; edge interpretation belongs to the
//! intrusion monitor.

use embedded_hal::digital::InputPin;

use crate::error::SensorError;

pub struct MotionSensor<P: InputPin> {
    pin: P,
    last: Option<bool>,
}

impl<P: InputPin> MotionSensor<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, last: None }
    }

    pub fn read(&mut self) -> Result<bool, SensorError> {
        let level = self.pin.is_high().map_err(|_| SensorError::GpioReadFailed)?;
        self.last = Some(level);
        Ok(level)
    }

    /// Last successful reading.
    pub fn last(&self) -> Option<bool> {
        self.last
    }
}
