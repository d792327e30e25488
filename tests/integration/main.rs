//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! through the public API against scripted hardware.  All tests run on
//! the host (x86_64) with no real hardware required.

mod alarm_tests;
mod engine_tests;
mod menu_tests;
mod mock_hw;
mod registry_tests;
