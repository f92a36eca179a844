#![cfg(all(unix, feature = "test-utils"))]

use cdc::concurrency::cancel::CancellationSignal;
use cdc::concurrency::interrupt::spawn_interrupt_listener;
use cdc::pipeline::{Pipeline, PipelineOutcome};
use cdc::sink::memory::MemorySink;
use cdc::test_utils::source::{ScriptStep, ScriptedSource};
use cdc_telemetry::tracing::init_test_tracing;
use std::process::Command;
use std::time::Duration;
use tokio::time::timeout;

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Delivers SIGINT to the test process, as Ctrl+C in a terminal would.
fn send_sigint_to_self() {
    let status = Command::new("kill")
        .args(["-INT", &std::process::id().to_string()])
        .status()
        .expect("failed to run kill");

    assert!(status.success());
}

#[tokio::test(flavor = "multi_thread")]
async fn sigint_cancels_a_pipeline_blocked_on_its_source() {
    init_test_tracing();

    let scope = CancellationSignal::new();
    let listener = spawn_interrupt_listener(scope.clone());

    let sink = MemorySink::new();
    let pipeline = Pipeline::new(
        ScriptedSource::from_records(["a"]).then(ScriptStep::Pending),
        sink.clone(),
        &scope,
    );
    let run = tokio::spawn(pipeline.run());

    timeout(TEST_TIMEOUT, sink.wait_for_records(1)).await.unwrap();
    send_sigint_to_self();

    let outcome = timeout(TEST_TIMEOUT, run).await.unwrap().unwrap();

    assert_eq!(outcome.unwrap(), PipelineOutcome::Cancelled);
    assert_eq!(sink.output().await, b"a");
    assert!(scope.is_triggered());

    timeout(TEST_TIMEOUT, listener)
        .await
        .expect("the interrupt listener must return once it fired")
        .unwrap();
}
