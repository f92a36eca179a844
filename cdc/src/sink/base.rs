use std::future::Future;

use crate::error::CdcResult;
use crate::types::Record;

/// Trait for output devices receiving the records of a pipeline.
///
/// The sink worker calls [`StreamSink::write_record`] once per record, in the order records were
/// produced, and waits for each write to complete before popping the next record. Writes are
/// never raced against cancellation: a write that was issued always completes.
///
/// A failed write terminates the sink worker and is surfaced unmodified as the pipeline result,
/// unless the pipeline was already cancelled.
/// Records written before the failure are not rolled back.
pub trait StreamSink {
    /// Returns the name of the sink.
    fn name() -> &'static str;

    /// Writes a single record to the output device.
    fn write_record(&mut self, record: Record) -> impl Future<Output = CdcResult<()>> + Send;
}
