use cdc::concurrency::cancel::CancellationSignal;
use cdc::error::CdcResult;
use cdc::pipeline::{Pipeline, PipelineOutcome};
use cdc::sink::writer::WriterSink;
use cdc::source::maxscale::MaxScaleSource;
use cdc_config::shared::{PrinterConfig, PrinterConfigWithoutSecrets};
use tracing::{debug, info};

/// Starts printing the change stream described by `printer_config` to stdout.
///
/// Runs until the listener closes the stream, the pipeline fails, or `scope` is cancelled.
pub async fn start_printer_with_config(
    printer_config: PrinterConfig,
    scope: &CancellationSignal,
) -> CdcResult<PipelineOutcome> {
    info!("starting cdc printer");

    log_config(&printer_config);

    let source = MaxScaleSource::new(printer_config.source);
    let sink = WriterSink::stdout();

    let mut pipeline = Pipeline::new(source, sink, scope);
    if let Some(queue_capacity) = printer_config.queue_capacity {
        pipeline = pipeline.with_queue_capacity(queue_capacity);
    }

    pipeline.run().await
}

fn log_config(config: &PrinterConfig) {
    let PrinterConfigWithoutSecrets {
        source,
        queue_capacity,
        sentry_enabled,
    } = config.clone().into();

    debug!(
        host = %source.host,
        port = source.port,
        username = %source.username,
        database = %source.database,
        table = %source.table,
        uuid = ?source.uuid,
        format = %source.format,
        gtid = ?source.gtid,
        "using maxscale source config"
    );
    debug!(?queue_capacity, sentry_enabled, "using printer config");
}
