use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use crate::cdc_error;
use crate::error::{CdcError, CdcResult, ErrorKind};

/// Classification of pipeline workers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WorkerType {
    /// Worker pulling records from the stream source into the queue.
    Source,
    /// Worker writing records from the queue to the sink.
    Sink,
}

impl WorkerType {
    fn panic_error_kind(&self) -> ErrorKind {
        match self {
            WorkerType::Source => ErrorKind::SourceWorkerPanic,
            WorkerType::Sink => ErrorKind::SinkWorkerPanic,
        }
    }
}

impl fmt::Display for WorkerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerType::Source => f.write_str("source"),
            WorkerType::Sink => f.write_str("sink"),
        }
    }
}

/// Runs a worker future to completion, tagging its result with `worker_type`.
///
/// A panic inside the worker is caught and converted into a worker panic error, so that it takes
/// part in the pipeline error handling like any other failure.
pub async fn run_worker<F>(worker_type: WorkerType, worker: F) -> (WorkerType, CdcResult<()>)
where
    F: Future<Output = CdcResult<()>>,
{
    let result = AssertUnwindSafe(worker)
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(panic_error(worker_type, panic)));

    (worker_type, result)
}

fn panic_error(worker_type: WorkerType, panic: Box<dyn Any + Send>) -> CdcError {
    let message = panic
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "<non-string panic payload>".to_string());

    cdc_error!(
        worker_type.panic_error_kind(),
        "Pipeline worker panicked",
        format!("The {worker_type} worker panicked: {message}")
    )
}
