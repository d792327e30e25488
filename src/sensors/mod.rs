//! Sensor inputs.
//!
//! `motion` and `switch` wrap single GPIO inputs; `environment` turns the
//! environment port's readings into the cabin-check screens.

pub mod environment;
pub mod motion;
pub mod switch;
