use tracing::{info, warn};

use crate::concurrency::cancel::CancellationSignal;
use crate::concurrency::queue::{PushOutcome, RecordQueueTx};
use crate::error::CdcResult;
use crate::source::StreamSource;

/// Worker moving records from a [`StreamSource`] into the record queue.
///
/// The worker stops when the source is exhausted, when the source fails, or when the
/// cancellation signal fires. The queue is closed on every exit path: explicitly once the loop
/// ends, and by the drop of the producer half if the worker unwinds.
#[derive(Debug)]
pub struct SourceWorker<S> {
    source: S,
    queue_tx: RecordQueueTx,
    cancellation: CancellationSignal,
}

impl<S> SourceWorker<S>
where
    S: StreamSource + Send,
{
    pub fn new(source: S, queue_tx: RecordQueueTx, cancellation: CancellationSignal) -> Self {
        Self {
            source,
            queue_tx,
            cancellation,
        }
    }

    /// Runs the worker until the stream ends.
    ///
    /// Returns the error of the source unmodified. Cancellation is not an error.
    pub async fn run(mut self) -> CdcResult<()> {
        info!(source = S::name(), "starting source worker");

        let result = self.produce().await;
        self.queue_tx.close();

        result
    }

    async fn produce(&mut self) -> CdcResult<()> {
        let mut produced: u64 = 0;

        loop {
            let next_record = tokio::select! {
                biased;

                _ = self.cancellation.cancelled() => {
                    info!(produced, "source worker cancelled");
                    return Ok(());
                }
                next_record = self.source.next_record() => next_record?,
            };

            let Some(record) = next_record else {
                info!(produced, "source exhausted, stopping source worker");
                return Ok(());
            };

            match self.queue_tx.push(record).await? {
                PushOutcome::Pushed => produced += 1,
                PushOutcome::Cancelled => {
                    info!(produced, "source worker cancelled while pushing a record");
                    return Ok(());
                }
                PushOutcome::Disconnected => {
                    warn!(produced, "sink worker is gone, stopping source worker");
                    return Ok(());
                }
            }
        }
    }
}
