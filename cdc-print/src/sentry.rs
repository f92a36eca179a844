use cdc::error::CdcError;
use cdc_config::Environment;
use cdc_config::shared::SentryConfig;
use secrecy::ExposeSecret;
use sentry::protocol::{Event, Exception, Stacktrace};
use sentry::types::Uuid;
use std::backtrace::BacktraceStatus;
use std::sync::Arc;
use tracing::info;

use crate::APP_VERSION_ENV_NAME;
use crate::error::{PrinterError, PrinterResult};

/// Initializes Sentry error tracking.
///
/// Sets up the panic integration and tags all events with `service=cdc-print` and, when set, the
/// app version. Returns [`None`] when no Sentry config is supplied.
pub fn init(sentry_config: Option<&SentryConfig>) -> PrinterResult<Option<sentry::ClientInitGuard>> {
    let Some(sentry_config) = sentry_config else {
        info!("sentry will not be used since no dsn was supplied");
        return Ok(None);
    };

    info!("initializing sentry with supplied dsn");

    let environment = Environment::load().map_err(PrinterError::config)?;
    let dsn = sentry_config
        .dsn
        .expose_secret()
        .parse()
        .map_err(PrinterError::config)?;

    let guard = sentry::init(sentry::ClientOptions {
        dsn: Some(dsn),
        environment: Some(environment.to_string().into()),
        integrations: vec![Arc::new(
            sentry::integrations::panic::PanicIntegration::new(),
        )],
        attach_stacktrace: true,
        ..Default::default()
    });

    let version = std::env::var(APP_VERSION_ENV_NAME);

    sentry::configure_scope(|scope| {
        scope.set_tag("service", "cdc-print");
        if let Ok(version) = version {
            scope.set_tag("version", version);
        }
    });

    Ok(Some(guard))
}

/// Captures a [`PrinterError`] to Sentry and returns the event ID.
pub fn capture_error(err: &PrinterError) -> Uuid {
    sentry::capture_event(event_from_printer_error(err))
}

/// Converts a [`PrinterError`] into a Sentry [`Event`].
///
/// Pipeline errors use their [`cdc::error::ErrorKind`] as exception type. Other errors walk the
/// source chain, root cause first. The captured backtrace is attached to the first exception.
fn event_from_printer_error(err: &PrinterError) -> Event<'static> {
    let mut exceptions = match err {
        PrinterError::Cdc(cdc_err) => vec![cdc_exception(cdc_err)],
        _ => {
            let mut exceptions = Vec::new();
            let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
            while let Some(e) = current {
                exceptions.push(Exception {
                    ty: type_name_from_debug(e),
                    value: Some(e.to_string()),
                    ..Default::default()
                });
                current = e.source();
            }
            exceptions.reverse();
            exceptions
        }
    };

    if let Some(stacktrace) = captured_stacktrace(err)
        && let Some(exception) = exceptions.first_mut()
    {
        exception.stacktrace = Some(stacktrace);
    }

    Event {
        exception: exceptions.into(),
        level: sentry::Level::Error,
        ..Default::default()
    }
}

fn cdc_exception(err: &CdcError) -> Exception {
    Exception {
        ty: format!("{:?}", err.kind()),
        value: Some(err.to_string()),
        ..Default::default()
    }
}

/// Parses the backtrace of `err` for Sentry, if one was captured.
fn captured_stacktrace(err: &PrinterError) -> Option<Stacktrace> {
    let backtrace = err.backtrace();
    if backtrace.status() != BacktraceStatus::Captured {
        return None;
    }

    sentry::integrations::backtrace::parse_stacktrace(&backtrace.to_string())
}

/// Extracts the type name from the Debug output of an error, falling back to `"Error"`.
fn type_name_from_debug(err: &dyn std::error::Error) -> String {
    let debug = format!("{err:?}");
    debug
        .split(['{', '(', ' '])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("Error")
        .to_string()
}
