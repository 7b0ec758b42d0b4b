//! Application core — command handling over injected ports.
//!
//! This module contains the request/response rules of the colorimetry
//! server: which command triggers which pipeline and what goes back on
//! the wire. All interaction with the camera, the publish service and the
//! log happens through **port traits** defined in [`ports`], keeping this
//! layer testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
