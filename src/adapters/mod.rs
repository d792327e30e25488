//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements                  | Connects to                |
//! |--------------|-----------------------------|----------------------------|
//! | `hardware`   | Servo/Motor/Buzzer ports    | embedded-hal PWM and GPIO  |
//! |              | Switch/MotionSensor ports   |                            |
//! |              | Display/Reader/Env ports    | boxed trait objects        |
//! | `console`    | CredentialReader            | line stream (serial/stdin) |
//! |              | DisplayPort                 | log output                 |
//! | `log_sink`   | EventSink                   | serial log output          |
//! | `nvs`        | StoragePort                 | NVS / in-memory store      |
//! | `sim`        | every hardware port         | scripted host simulation   |
//!
//! `sim` is test scaffolding: built for unit tests and with the `sim`
//! feature, never in firmware images.

pub mod console;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
