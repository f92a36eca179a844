//! Workers running the two halves of a pipeline.
//!
//! The [`source::SourceWorker`] pulls records from a stream source into the record queue, the
//! [`sink::SinkWorker`] drains the queue into a sink. Each runs in its own task, spawned by the
//! pipeline.

pub mod base;
pub mod sink;
pub mod source;
