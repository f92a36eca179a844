use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::cdc_error;
use crate::concurrency::cancel::CancellationSignal;
use crate::concurrency::queue::{create_record_queue, default_queue_capacity};
use crate::error::{CdcError, CdcResult, ErrorKind};
use crate::sink::StreamSink;
use crate::source::StreamSource;
use crate::workers::base::{WorkerType, run_worker};
use crate::workers::sink::SinkWorker;
use crate::workers::source::SourceWorker;

/// Successful outcome of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The source was exhausted and every record was written to the sink.
    Completed,
    /// The pipeline was cancelled, either by the caller scope, an interrupt, or
    /// [`Pipeline::shutdown`]. Cancellation is not a failure.
    Cancelled,
}

/// Pipeline streaming records from a [`StreamSource`] to a [`StreamSink`].
///
/// Running the pipeline spawns a source worker and a sink worker which share a bounded record
/// queue and a [`CancellationSignal`]. The first worker error triggers the signal, so that the
/// other worker stops at its next suspension point, and becomes the result of the run. Any error
/// reported afterwards by the other worker is logged and discarded.
#[derive(Debug)]
pub struct Pipeline<S, K> {
    source: S,
    sink: K,
    queue_capacity: usize,
    cancellation: CancellationSignal,
}

impl<S, K> Pipeline<S, K>
where
    S: StreamSource + Send + 'static,
    K: StreamSink + Send + 'static,
{
    /// Creates a pipeline bound to the cancellation `scope` of the caller.
    ///
    /// The pipeline derives its own signal from `scope`: cancelling the scope cancels the
    /// pipeline, while a failing pipeline leaves the scope untouched.
    pub fn new(source: S, sink: K, scope: &CancellationSignal) -> Self {
        Self {
            source,
            sink,
            queue_capacity: default_queue_capacity(),
            cancellation: scope.child(),
        }
    }

    /// Overrides the capacity of the record queue, which defaults to the available parallelism.
    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// Returns the cancellation signal of this pipeline.
    pub fn cancellation_signal(&self) -> CancellationSignal {
        self.cancellation.clone()
    }

    /// Requests the pipeline to stop.
    ///
    /// Both workers return at their next suspension point and the run completes with
    /// [`PipelineOutcome::Cancelled`].
    pub fn shutdown(&self) {
        info!("trying to shut down the pipeline");

        if self.cancellation.trigger() {
            info!("shut down signal successfully sent to all workers");
        }
    }

    /// Runs the pipeline until both workers have returned.
    ///
    /// Returns the first error reported by either worker. Both workers are always awaited, no
    /// task is left running when this method returns.
    pub async fn run(self) -> CdcResult<PipelineOutcome> {
        let Self {
            source,
            sink,
            queue_capacity,
            cancellation,
        } = self;

        info!(
            source = S::name(),
            sink = K::name(),
            queue_capacity,
            "starting pipeline"
        );

        let (queue_tx, queue_rx) = create_record_queue(queue_capacity, cancellation.clone());

        let source_worker = SourceWorker::new(source, queue_tx, cancellation.clone());
        let sink_worker = SinkWorker::new(sink, queue_rx, cancellation.clone());

        let mut workers = JoinSet::new();
        workers.spawn(run_worker(WorkerType::Source, source_worker.run()));
        workers.spawn(run_worker(WorkerType::Sink, sink_worker.run()));

        let mut first_error: Option<CdcError> = None;
        while let Some(joined) = workers.join_next().await {
            let (worker_type, result) = match joined {
                Ok(joined) => joined,
                Err(join_err) => {
                    // Panics are caught inside the task, so this only happens if the runtime
                    // shuts down while the pipeline is running.
                    let err = cdc_error!(
                        ErrorKind::Unknown,
                        "Pipeline worker task failed",
                        join_err
                    );
                    record_error(&cancellation, &mut first_error, None, err);
                    continue;
                }
            };

            match result {
                Ok(()) => info!(%worker_type, "worker completed"),
                Err(err) => record_error(&cancellation, &mut first_error, Some(worker_type), err),
            }
        }

        if let Some(err) = first_error {
            error!(error = %err, "pipeline failed");
            return Err(err);
        }

        if cancellation.is_triggered() {
            info!("pipeline cancelled");
            return Ok(PipelineOutcome::Cancelled);
        }

        info!("pipeline completed");

        Ok(PipelineOutcome::Completed)
    }
}

/// Records `err` as the pipeline result if no error was recorded yet.
///
/// The first error cancels the pipeline so the other worker stops promptly. Later errors are
/// discarded, exactly one error is ever surfaced.
fn record_error(
    cancellation: &CancellationSignal,
    first_error: &mut Option<CdcError>,
    worker_type: Option<WorkerType>,
    err: CdcError,
) {
    let worker = worker_type.map_or_else(|| "unknown".to_string(), |wt| wt.to_string());

    if first_error.is_some() {
        warn!(%worker, error = %err, "worker failed after the pipeline already failed, discarding error");
        return;
    }

    error!(%worker, error = %err, "worker failed, cancelling the pipeline");
    cancellation.trigger();
    *first_error = Some(err);
}
