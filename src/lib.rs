//! PerfBoost library
//!
//! This module exposes the telemetry sampling loops, turbo boost control
//! and their hardware collaborators for the binaries and tests.

pub mod core;
pub mod hardware;
pub mod monitor;
pub mod overlay;
pub mod periodic;
