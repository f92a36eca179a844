//! Logging setup shared by the cdc binaries and tests.

pub mod tracing;
