//! `cdc-print` binary.
//!
//! Reads the change stream of one table from a MariaDB MaxScale CDC listener and prints every
//! record to stdout. Logs go to stderr. The process stops on SIGINT or SIGTERM, when the listener
//! closes the stream, or on the first failure, which is reported to Sentry when configured.

use std::process::ExitCode;

use cdc::concurrency::cancel::CancellationSignal;
use cdc::concurrency::interrupt::spawn_interrupt_listener;
use cdc::pipeline::PipelineOutcome;
use cdc_config::shared::PrinterConfig;
use cdc_telemetry::tracing::init_tracing;
use tracing::{error, info};

use crate::config::load_printer_config;
use crate::core::start_printer_with_config;
use crate::error::{PrinterError, PrinterResult};

mod config;
mod core;
mod error;
mod sentry;

/// The name of the environment variable which contains version information for this binary.
const APP_VERSION_ENV_NAME: &str = "APP_VERSION";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprint!("{}", err.render_report());
            ExitCode::FAILURE
        }
    }
}

/// Loads the configuration, initializes tracing and Sentry, and runs the printer on a
/// multi-threaded runtime.
fn run() -> PrinterResult<()> {
    let printer_config = load_printer_config()?;

    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME")).map_err(PrinterError::config)?;

    // Initialize Sentry before the async runtime starts
    let _sentry_guard = sentry::init(printer_config.sentry.as_ref())?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(printer_config))
}

async fn async_main(printer_config: PrinterConfig) -> PrinterResult<()> {
    info!("application started");

    let scope = CancellationSignal::new();
    let interrupt_listener = spawn_interrupt_listener(scope.clone());

    let result = start_printer_with_config(printer_config, &scope).await;

    // Stops the interrupt listener, whatever the outcome of the pipeline.
    scope.trigger();
    let _ = interrupt_listener.await;

    match result {
        Ok(PipelineOutcome::Completed) => info!("change stream ended, application finished"),
        Ok(PipelineOutcome::Cancelled) => info!("interrupted, application finished"),
        Err(err) => {
            let err = PrinterError::from(err);
            sentry::capture_error(&err);
            error!("{err}");

            return Err(err);
        }
    }

    Ok(())
}
