use tracing::{info, warn};

use crate::concurrency::cancel::CancellationSignal;
use crate::concurrency::queue::RecordQueueRx;
use crate::error::CdcResult;
use crate::sink::StreamSink;

/// Worker draining the record queue into a [`StreamSink`].
///
/// The worker stops at the end of the stream or when the cancellation signal fires. A failed
/// write stops it immediately and is returned unmodified, unless the signal had already fired:
/// the output device going away during a shutdown is part of the shutdown.
#[derive(Debug)]
pub struct SinkWorker<K> {
    sink: K,
    queue_rx: RecordQueueRx,
    cancellation: CancellationSignal,
}

impl<K> SinkWorker<K>
where
    K: StreamSink + Send,
{
    pub fn new(sink: K, queue_rx: RecordQueueRx, cancellation: CancellationSignal) -> Self {
        Self {
            sink,
            queue_rx,
            cancellation,
        }
    }

    /// Runs the worker until the stream ends or the pipeline is cancelled.
    pub async fn run(mut self) -> CdcResult<()> {
        info!(sink = K::name(), "starting sink worker");

        let mut written: u64 = 0;

        while let Some(record) = self.queue_rx.pop().await {
            if let Err(err) = self.sink.write_record(record).await {
                if !self.cancellation.is_triggered() {
                    return Err(err);
                }

                warn!(written, error = %err, "sink write failed after cancellation, stopping sink worker");
                return Ok(());
            }

            written += 1;
        }

        if self.cancellation.is_triggered() {
            info!(written, "sink worker cancelled");
        } else {
            info!(written, "end of stream reached, stopping sink worker");
        }

        Ok(())
    }
}
