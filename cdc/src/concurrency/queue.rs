//! Bounded single-producer single-consumer record queue.
//!
//! The queue is split into a producer half ([`RecordQueueTx`]) and a consumer half
//! ([`RecordQueueRx`]). Both halves observe the pipeline [`CancellationSignal`], so neither a
//! blocked push nor a blocked pop can outlive a cancellation.

use std::num::NonZeroUsize;
use tokio::sync::mpsc;
use tracing::debug;

use crate::bail;
use crate::concurrency::cancel::CancellationSignal;
use crate::error::{CdcResult, ErrorKind};
use crate::types::Record;

/// Result of a [`RecordQueueTx::push`] which did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The record was handed over to the queue.
    Pushed,
    /// The pipeline was cancelled before the record could be handed over.
    Cancelled,
    /// The consumer half was dropped, so nobody will ever receive the record.
    Disconnected,
}

/// Returns the default queue capacity, sized to the available parallelism of the host.
pub fn default_queue_capacity() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Creates a bounded record queue holding at most `capacity` records.
///
/// A `capacity` of zero is raised to one, since the queue must be able to hold a record for the
/// handoff to make progress.
pub fn create_record_queue(
    capacity: usize,
    cancellation: CancellationSignal,
) -> (RecordQueueTx, RecordQueueRx) {
    let capacity = capacity.max(1);
    let (tx, rx) = mpsc::channel(capacity);

    let queue_tx = RecordQueueTx {
        tx: Some(tx),
        capacity,
        cancellation: cancellation.clone(),
    };
    let queue_rx = RecordQueueRx {
        rx,
        capacity,
        cancellation,
    };

    (queue_tx, queue_rx)
}

/// Producer half of the record queue.
///
/// Dropping the producer closes the queue, so the consumer always observes the end of the stream
/// no matter how the producer exits.
#[derive(Debug)]
pub struct RecordQueueTx {
    tx: Option<mpsc::Sender<Record>>,
    capacity: usize,
    cancellation: CancellationSignal,
}

impl RecordQueueTx {
    /// Pushes a record, waiting while the queue is full.
    ///
    /// Returns [`PushOutcome::Cancelled`] as soon as the cancellation signal fires, even if the
    /// push was blocked on a full queue. Fails with [`ErrorKind::InvalidState`] when called after
    /// [`RecordQueueTx::close`].
    pub async fn push(&self, record: Record) -> CdcResult<PushOutcome> {
        let Some(tx) = &self.tx else {
            bail!(
                ErrorKind::InvalidState,
                "Record pushed to a closed queue",
                "The producer must not push records after closing the record queue"
            );
        };

        tokio::select! {
            biased;

            _ = self.cancellation.cancelled() => Ok(PushOutcome::Cancelled),
            result = tx.send(record) => match result {
                Ok(()) => Ok(PushOutcome::Pushed),
                Err(_) => Ok(PushOutcome::Disconnected),
            },
        }
    }

    /// Closes the queue.
    ///
    /// Records already in the queue stay available to the consumer. Idempotent: only the first
    /// call has an effect and returns `true`.
    pub fn close(&mut self) -> bool {
        if self.tx.take().is_some() {
            debug!("record queue closed by the producer");
            return true;
        }

        false
    }

    /// Returns whether the queue was closed by this producer.
    pub fn is_closed(&self) -> bool {
        self.tx.is_none()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Drop for RecordQueueTx {
    fn drop(&mut self) {
        self.close();
    }
}

/// Consumer half of the record queue.
#[derive(Debug)]
pub struct RecordQueueRx {
    rx: mpsc::Receiver<Record>,
    capacity: usize,
    cancellation: CancellationSignal,
}

impl RecordQueueRx {
    /// Pops the next record, waiting while the queue is empty and open.
    ///
    /// Returns `None` once the queue is closed and drained, or when the cancellation signal fires
    /// while the queue is empty. Records already buffered are still handed out after
    /// cancellation, which is bounded by the queue capacity since the producer stops pushing.
    /// End of stream is not an error.
    pub async fn pop(&mut self) -> Option<Record> {
        tokio::select! {
            biased;

            record = self.rx.recv() => record,
            _ = self.cancellation.cancelled() => None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    #[tokio::test]
    async fn records_are_popped_in_push_order() {
        let (mut tx, mut rx) = create_record_queue(4, CancellationSignal::new());

        for payload in ["a", "b", "c"] {
            assert_eq!(tx.push(payload.into()).await.unwrap(), PushOutcome::Pushed);
        }
        tx.close();

        assert_eq!(rx.pop().await, Some("a".into()));
        assert_eq!(rx.pop().await, Some("b".into()));
        assert_eq!(rx.pop().await, Some("c".into()));
        assert_eq!(rx.pop().await, None);
    }

    #[tokio::test]
    async fn full_queue_blocks_producer_until_a_pop() {
        let capacity = 2;
        let (tx, mut rx) = create_record_queue(capacity, CancellationSignal::new());

        for payload in ["a", "b"] {
            assert_eq!(tx.push(payload.into()).await.unwrap(), PushOutcome::Pushed);
        }

        let producer = tokio::spawn(async move {
            let outcome = tx.push("c".into()).await;
            (tx, outcome)
        });

        sleep(Duration::from_millis(50)).await;
        assert!(!producer.is_finished(), "push beyond capacity must block");

        assert_eq!(rx.pop().await, Some("a".into()));

        let (_tx, outcome) = timeout(Duration::from_secs(1), producer)
            .await
            .expect("producer must be unblocked by the pop")
            .unwrap();
        assert_eq!(outcome.unwrap(), PushOutcome::Pushed);

        assert_eq!(rx.pop().await, Some("b".into()));
        assert_eq!(rx.pop().await, Some("c".into()));
    }

    #[tokio::test]
    async fn cancellation_unblocks_a_pending_push() {
        let cancellation = CancellationSignal::new();
        let (tx, _rx) = create_record_queue(1, cancellation.clone());

        assert_eq!(tx.push("a".into()).await.unwrap(), PushOutcome::Pushed);

        let producer = tokio::spawn(async move { tx.push("b".into()).await });
        sleep(Duration::from_millis(20)).await;
        assert!(!producer.is_finished());

        cancellation.trigger();

        let outcome = timeout(Duration::from_secs(1), producer)
            .await
            .expect("cancellation must unblock the push")
            .unwrap();
        assert_eq!(outcome.unwrap(), PushOutcome::Cancelled);
    }

    #[tokio::test]
    async fn cancellation_unblocks_a_pending_pop() {
        let cancellation = CancellationSignal::new();
        let (_tx, mut rx) = create_record_queue(1, cancellation.clone());

        let consumer = tokio::spawn(async move { rx.pop().await });
        sleep(Duration::from_millis(20)).await;
        assert!(!consumer.is_finished());

        cancellation.trigger();

        let record = timeout(Duration::from_secs(1), consumer)
            .await
            .expect("cancellation must unblock the pop")
            .unwrap();
        assert_eq!(record, None);
    }

    #[tokio::test]
    async fn buffered_records_are_drained_after_cancellation() {
        let cancellation = CancellationSignal::new();
        let (tx, mut rx) = create_record_queue(2, cancellation.clone());

        tx.push("a".into()).await.unwrap();
        cancellation.trigger();

        assert_eq!(tx.push("b".into()).await.unwrap(), PushOutcome::Cancelled);
        assert_eq!(rx.pop().await, Some("a".into()));
        assert_eq!(rx.pop().await, None);
    }

    #[tokio::test]
    async fn push_after_close_fails() {
        let (mut tx, _rx) = create_record_queue(1, CancellationSignal::new());

        assert!(tx.close());
        assert!(!tx.close());
        assert!(tx.is_closed());

        let err = tx.push("a".into()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn dropping_the_producer_ends_the_stream() {
        let (tx, mut rx) = create_record_queue(2, CancellationSignal::new());

        tx.push("a".into()).await.unwrap();
        drop(tx);

        assert_eq!(rx.pop().await, Some("a".into()));
        assert_eq!(rx.pop().await, None);
    }

    #[tokio::test]
    async fn push_reports_a_dropped_consumer() {
        let (tx, rx) = create_record_queue(1, CancellationSignal::new());
        drop(rx);

        assert_eq!(
            tx.push("a".into()).await.unwrap(),
            PushOutcome::Disconnected
        );
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let (tx, rx) = create_record_queue(0, CancellationSignal::new());

        assert_eq!(tx.capacity(), 1);
        assert_eq!(rx.capacity(), 1);
        assert!(default_queue_capacity() >= 1);
    }
}
