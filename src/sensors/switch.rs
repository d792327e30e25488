//! Engine slide switch.
//!
//! Wired to a pull-up input; which level means ON depends on how the
//! switch is mounted, so the polarity is a constructor argument.

use embedded_hal::digital::InputPin;

use crate::app::ports::SwitchState;
use crate::error::SensorError;

pub struct SlideSwitch<P: InputPin> {
    pin: P,
    on_when_high: bool,
}

impl<P: InputPin> SlideSwitch<P> {
    pub fn new(pin: P, on_when_high: bool) -> Self {
        Self { pin, on_when_high }
    }

    pub fn read(&mut self) -> Result<SwitchState, SensorError> {
        let high = self.pin.is_high().map_err(|_| SensorError::GpioReadFailed)?;
        Ok(if high == self.on_when_high { SwitchState::On } else { SwitchState::Off })
    }
}
