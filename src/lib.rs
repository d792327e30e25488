//! CarGuard firmware library.
//!
//! Exposes the controllers, drivers and adapters for the firmware binary
//! and for host-side integration testing. All ESP-IDF-specific code is
//! guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod registry;
pub mod security;

pub mod adapters;
pub mod drivers;
pub mod sensors;
