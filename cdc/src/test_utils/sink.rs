use crate::bail;
use crate::error::{CdcResult, ErrorKind};
use crate::sink::StreamSink;
use crate::sink::memory::MemorySink;
use crate::types::Record;

/// [`StreamSink`] which accepts a number of records and fails on every write after that.
///
/// Accepted records are stored in a [`MemorySink`], available through [`FailingSink::written`].
#[derive(Debug, Clone)]
pub struct FailingSink {
    accepted: usize,
    written: MemorySink,
}

impl FailingSink {
    /// Creates a sink failing once `accepted` records have been written.
    pub fn new(accepted: usize) -> Self {
        Self {
            accepted,
            written: MemorySink::new(),
        }
    }

    /// Returns the sink storing the accepted records.
    pub fn written(&self) -> MemorySink {
        self.written.clone()
    }
}

impl StreamSink for FailingSink {
    fn name() -> &'static str {
        "failing"
    }

    async fn write_record(&mut self, record: Record) -> CdcResult<()> {
        if self.accepted == 0 {
            bail!(
                ErrorKind::SinkError,
                "Sink rejected the record",
                format!("Record of {} bytes rejected", record.len())
            );
        }

        self.accepted -= 1;
        self.written.write_record(record).await
    }
}
