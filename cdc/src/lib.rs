//! Streaming of change-data-capture records from a source to a sink.
//!
//! A [`pipeline::Pipeline`] runs a source worker and a sink worker connected by a bounded record
//! queue. Both workers share a [`concurrency::cancel::CancellationSignal`], which is triggered by
//! the first failure, by an interrupt, or by the caller.

mod macros;

pub mod concurrency;
pub mod error;
pub mod pipeline;
pub mod sink;
pub mod source;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;
pub mod workers;
