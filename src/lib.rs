//! Colorimetry server library.
//!
//! Exposes the command core, the capture and classification pipelines
//! and the transport adapters for the binary and for integration tests.

#![deny(unused_must_use)]

pub mod app;
pub mod capture;
pub mod classify;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod model;
pub mod session;
pub mod shutdown;
pub mod transport;

pub mod adapters;
