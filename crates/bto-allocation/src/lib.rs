//! Allocation engine for build-to-order flat projects, with the configuration, telemetry and
//! error plumbing shared by the service binaries.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
