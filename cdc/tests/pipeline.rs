#![cfg(feature = "test-utils")]

use cdc::cdc_error;
use cdc::concurrency::cancel::CancellationSignal;
use cdc::error::ErrorKind;
use cdc::error::CdcResult;
use cdc::pipeline::{Pipeline, PipelineOutcome};
use cdc::sink::StreamSink;
use cdc::sink::memory::MemorySink;
use cdc::test_utils::sink::FailingSink;
use cdc::test_utils::source::{EndlessSource, ScriptStep, ScriptedSource};
use cdc::types::Record;
use cdc_telemetry::tracing::init_test_tracing;
use std::time::Duration;
use tokio::time::{sleep, timeout};

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Sink whose output device goes away once the pipeline is cancelled, like a closed pipe.
#[derive(Debug, Clone)]
struct ClosedOnCancelSink {
    scope: CancellationSignal,
}

impl StreamSink for ClosedOnCancelSink {
    fn name() -> &'static str {
        "closed_on_cancel"
    }

    async fn write_record(&mut self, _record: Record) -> CdcResult<()> {
        self.scope.cancelled().await;

        Err(cdc_error!(ErrorKind::SinkIoError, "Broken pipe"))
    }
}

fn connection_reset() -> ScriptStep {
    ScriptStep::Fail(cdc_error!(
        ErrorKind::SourceError,
        "Connection reset by the listener"
    ))
}

#[tokio::test(flavor = "multi_thread")]
async fn pipeline_writes_every_record_in_order() {
    init_test_tracing();

    let records: Vec<Record> = (0..500).map(|i| Record::from(format!("{i}\n"))).collect();
    let sink = MemorySink::new();

    let pipeline = Pipeline::new(
        ScriptedSource::from_records(records.clone()),
        sink.clone(),
        &CancellationSignal::new(),
    )
    .with_queue_capacity(3);

    let outcome = timeout(TEST_TIMEOUT, pipeline.run()).await.unwrap();

    assert_eq!(outcome.unwrap(), PipelineOutcome::Completed);
    assert_eq!(sink.records().await, records);
}

#[tokio::test(flavor = "multi_thread")]
async fn pipeline_with_empty_source_completes_without_writes() {
    init_test_tracing();

    let sink = MemorySink::new();
    let pipeline = Pipeline::new(
        ScriptedSource::from_records(Vec::<Record>::new()),
        sink.clone(),
        &CancellationSignal::new(),
    );

    let outcome = timeout(TEST_TIMEOUT, pipeline.run()).await.unwrap();

    assert_eq!(outcome.unwrap(), PipelineOutcome::Completed);
    assert!(sink.records().await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn pipeline_output_is_the_concatenation_of_records() {
    init_test_tracing();

    let sink = MemorySink::new();
    let pipeline = Pipeline::new(
        ScriptedSource::from_records(["a", "b", "c"]),
        sink.clone(),
        &CancellationSignal::new(),
    );

    let outcome = timeout(TEST_TIMEOUT, pipeline.run()).await.unwrap();

    assert_eq!(outcome.unwrap(), PipelineOutcome::Completed);
    assert_eq!(sink.output().await, b"abc");
}

#[tokio::test(flavor = "multi_thread")]
async fn source_failure_is_returned_after_earlier_records_are_written() {
    init_test_tracing();

    let sink = MemorySink::new();
    let pipeline = Pipeline::new(
        ScriptedSource::from_records(["a"]).then(connection_reset()),
        sink.clone(),
        &CancellationSignal::new(),
    );
    let cancellation = pipeline.cancellation_signal();

    let err = timeout(TEST_TIMEOUT, pipeline.run())
        .await
        .unwrap()
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SourceError);
    assert_eq!(err.description(), "Connection reset by the listener");
    assert_eq!(sink.output().await, b"a");
    assert!(cancellation.is_triggered());
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_pipeline_leaves_the_caller_scope_untouched() {
    init_test_tracing();

    let scope = CancellationSignal::new();
    let pipeline = Pipeline::new(
        ScriptedSource::new([connection_reset()]),
        MemorySink::new(),
        &scope,
    );

    let result = timeout(TEST_TIMEOUT, pipeline.run()).await.unwrap();

    assert!(result.is_err());
    assert!(!scope.is_triggered());
}

#[tokio::test(flavor = "multi_thread")]
async fn cancelling_the_scope_stops_a_blocked_source() {
    init_test_tracing();

    let scope = CancellationSignal::new();
    let sink = MemorySink::new();
    let pipeline = Pipeline::new(
        ScriptedSource::from_records(["a"]).then(ScriptStep::Pending),
        sink.clone(),
        &scope,
    );

    let run = tokio::spawn(pipeline.run());

    sink.wait_for_records(1).await;
    scope.trigger();

    let outcome = timeout(TEST_TIMEOUT, run).await.unwrap().unwrap();

    assert_eq!(outcome.unwrap(), PipelineOutcome::Cancelled);
    assert_eq!(sink.output().await, b"a");
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_stops_the_pipeline() {
    init_test_tracing();

    let pipeline = Pipeline::new(
        ScriptedSource::new([ScriptStep::Pending]),
        MemorySink::new(),
        &CancellationSignal::new(),
    );
    let cancellation = pipeline.cancellation_signal();

    pipeline.shutdown();

    let outcome = timeout(TEST_TIMEOUT, pipeline.run()).await.unwrap();

    assert_eq!(outcome.unwrap(), PipelineOutcome::Cancelled);
    assert!(cancellation.is_triggered());
}

#[tokio::test(flavor = "multi_thread")]
async fn sink_failure_unblocks_a_source_waiting_on_a_full_queue() {
    init_test_tracing();

    let source = EndlessSource::new();
    let sink = FailingSink::new(2);
    let written = sink.written();

    let pipeline =
        Pipeline::new(source.clone(), sink, &CancellationSignal::new()).with_queue_capacity(1);

    let err = timeout(TEST_TIMEOUT, pipeline.run())
        .await
        .expect("the pipeline must not deadlock")
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SinkError);
    assert_eq!(written.output().await, b"0\n1\n");
    // The source can't run far ahead of the sink with a single slot queue.
    assert!(source.produced() <= 5);
}

#[tokio::test(flavor = "multi_thread")]
async fn only_one_error_is_returned_when_both_workers_fail() {
    init_test_tracing();

    for _ in 0..20 {
        let pipeline = Pipeline::new(
            ScriptedSource::from_records(["a", "b"]).then(connection_reset()),
            FailingSink::new(0),
            &CancellationSignal::new(),
        )
        .with_queue_capacity(1);

        let err = timeout(TEST_TIMEOUT, pipeline.run())
            .await
            .unwrap()
            .unwrap_err();

        assert!(
            matches!(err.kind(), ErrorKind::SourceError | ErrorKind::SinkError),
            "unexpected error kind {:?}",
            err.kind()
        );
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn cancellation_before_any_record_is_not_an_error() {
    init_test_tracing();

    let scope = CancellationSignal::new();
    let pipeline = Pipeline::new(
        ScriptedSource::new([ScriptStep::Pending]),
        MemorySink::new(),
        &scope,
    );

    let run = tokio::spawn(pipeline.run());
    sleep(Duration::from_millis(20)).await;
    scope.trigger();

    let outcome = timeout(TEST_TIMEOUT, run).await.unwrap().unwrap();

    assert_eq!(outcome.unwrap(), PipelineOutcome::Cancelled);
}

#[tokio::test(flavor = "multi_thread")]
async fn sink_write_failing_after_cancellation_is_not_an_error() {
    init_test_tracing();

    let scope = CancellationSignal::new();
    let pipeline = Pipeline::new(
        ScriptedSource::from_records(["a"]).then(ScriptStep::Pending),
        ClosedOnCancelSink {
            scope: scope.clone(),
        },
        &scope,
    );

    let run = tokio::spawn(pipeline.run());
    sleep(Duration::from_millis(20)).await;
    scope.trigger();

    let outcome = timeout(TEST_TIMEOUT, run).await.unwrap().unwrap();

    assert_eq!(outcome.unwrap(), PipelineOutcome::Cancelled);
}
