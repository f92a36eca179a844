//! Test doubles for exercising pipelines without a CDC listener or an output device.
//!
//! - [`source`] - sources replaying a script of records, failures and stalls
//! - [`sink`] - sinks failing on demand

pub mod sink;
pub mod source;
