//! Concurrency primitives coordinating the source and sink workers of a pipeline.
//!
//! The two workers share exactly two things:
//!
//! - A [`cancel::CancellationSignal`], a one-shot flag which either worker, the pipeline, or an
//!   operating system interrupt can trigger. Every suspension point of a worker races against it.
//! - A bounded record queue ([`queue::create_record_queue`]) which hands records from the source
//!   worker to the sink worker in order and applies backpressure when the sink falls behind.
//!
//! Cancellation is cooperative: a worker notices it at its next suspension point and returns
//! without an error.

pub mod cancel;
pub mod interrupt;
pub mod queue;
