//! Provider implementations that translate the shared [`telemetry_metrics`]
//! interfaces into shell commands executed over a [`crate::runner::CommandRunner`].

pub mod darwin;
pub mod linux;
