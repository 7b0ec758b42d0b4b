//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters. Everything runs on the host with no camera and
//! no network; the end-to-end tests use a loopback stream socket.

mod end_to_end_tests;
mod mock_hw;
mod service_tests;
