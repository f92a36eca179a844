use std::future::Future;

use crate::error::CdcResult;
use crate::types::Record;

/// Trait for systems that produce change-data-capture records.
///
/// [`StreamSource`] is a pull interface: the source worker repeatedly calls
/// [`StreamSource::next_record`] and pushes every returned record into the record queue.
/// `Ok(None)` signals that the stream is exhausted, an error signals that the stream cannot
/// continue. The error is surfaced unmodified as the pipeline result.
///
/// The returned future is raced against the pipeline cancellation signal and dropped when the
/// signal fires, so implementations must tolerate being interrupted at any await point. After
/// cancellation the source is not polled again.
pub trait StreamSource {
    /// Returns the name of the source.
    fn name() -> &'static str;

    /// Returns the next record of the stream, or `None` when the stream is exhausted.
    fn next_record(&mut self) -> impl Future<Output = CdcResult<Option<Record>>> + Send;
}
