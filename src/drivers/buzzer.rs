//! Alarm buzzer (active buzzer on a push-pull GPIO, active high).

use embedded_hal::digital::OutputPin;

use crate::error::ActuatorError;

pub struct Buzzer<P: OutputPin> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> Buzzer<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, on: false }
    }

    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        let res = if on { self.pin.set_high() } else { self.pin.set_low() };
        res.map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.on = on;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorType, OutputPin};

    /// Output pin that remembers its level.
    #[derive(Debug, Default)]
    pub struct MockOutput {
        pub high: bool,
    }

    impl ErrorType for MockOutput {
        type Error = Infallible;
    }

    impl OutputPin for MockOutput {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            Ok(())
        }
    }
}
