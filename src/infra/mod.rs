//! Runtime bootstrap: telemetry installation and client-level errors.

pub mod error;
pub mod telemetry;
