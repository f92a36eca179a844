use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::debug;

use crate::error::CdcResult;
use crate::sink::StreamSink;
use crate::types::Record;

/// In-memory sink collecting every written record.
///
/// [`MemorySink`] is useful for tests and for embedding a pipeline in a process which consumes
/// the records itself. Clones share the same storage, so a clone kept by the caller observes the
/// records written by the pipeline.
#[derive(Debug, Clone)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<Record>>>,
    written_tx: Arc<watch::Sender<usize>>,
}

impl MemorySink {
    pub fn new() -> Self {
        let (written_tx, _) = watch::channel(0);

        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            written_tx: Arc::new(written_tx),
        }
    }

    /// Returns a copy of all records written so far, in write order.
    pub async fn records(&self) -> Vec<Record> {
        self.records.lock().await.clone()
    }

    /// Returns the concatenation of all records written so far, as an output device would see it.
    pub async fn output(&self) -> Vec<u8> {
        let records = self.records.lock().await;
        records
            .iter()
            .flat_map(|record| record.as_bytes().iter().copied())
            .collect()
    }

    /// Waits until at least `count` records have been written.
    pub async fn wait_for_records(&self, count: usize) {
        let mut written_rx = self.written_tx.subscribe();
        // The sender is kept alive by `self`, so waiting can't fail with a closed channel.
        let _ = written_rx.wait_for(|written| *written >= count).await;
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamSink for MemorySink {
    fn name() -> &'static str {
        "memory"
    }

    async fn write_record(&mut self, record: Record) -> CdcResult<()> {
        let mut records = self.records.lock().await;
        records.push(record);

        let written = records.len();
        self.written_tx.send_replace(written);

        debug!(written, "record written to memory sink");

        Ok(())
    }
}
