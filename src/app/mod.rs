//! Application core — pure domain logic, zero I/O.
//!
//! The menu controller, its page table and the outbound events.  All
//! interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod events;
pub mod menu;
pub mod ports;
pub mod service;
