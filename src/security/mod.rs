//! Security core: access control, door lock, engine interlock, intrusion
//! monitor and the modal alarm.
//!
//! Every controller here is owned by the
//! [`MenuController`](crate::app::service::MenuController) and mutated only
//! from the control loop.  Hardware is passed in per call through the port
//! traits in [`crate::app::ports`].

pub mod access;
pub mod alarm;
pub mod door;
pub mod engine;
pub mod intrusion;
