//! Bridges operating system interrupts into a [`CancellationSignal`].

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::concurrency::cancel::CancellationSignal;

/// Spawns a task which triggers `signal` on SIGINT (Ctrl+C) or, on unix, SIGTERM.
///
/// On unix the interrupt handlers are installed before this function returns, so an interrupt
/// delivered right after the call is never missed. Must be called from within a Tokio runtime.
///
/// The task exits as soon as `signal` is triggered for any other reason, so it never outlives
/// the scope it guards.
pub fn spawn_interrupt_listener(signal: CancellationSignal) -> JoinHandle<()> {
    let interrupts = Interrupts::register();

    tokio::spawn(async move {
        tokio::select! {
            _ = interrupts.recv() => {
                if signal.trigger() {
                    info!("interrupt received, cancelling the pipeline");
                }
            }
            _ = signal.cancelled() => {
                debug!("cancellation signal triggered, stopping interrupt listener");
            }
        }
    })
}

#[cfg(unix)]
struct Interrupts {
    sigint: Option<tokio::signal::unix::Signal>,
    // Sent by process supervisors before killing the process.
    sigterm: Option<tokio::signal::unix::Signal>,
}

#[cfg(unix)]
impl Interrupts {
    fn register() -> Self {
        use tokio::signal::unix::SignalKind;

        Self {
            sigint: register_handler(SignalKind::interrupt(), "sigint"),
            sigterm: register_handler(SignalKind::terminate(), "sigterm"),
        }
    }

    /// Waits for the first interrupt. Never resolves if no handler could be registered.
    async fn recv(mut self) {
        tokio::select! {
            _ = recv_or_pending(self.sigint.as_mut()) => info!("sigint (ctrl+c) received"),
            _ = recv_or_pending(self.sigterm.as_mut()) => info!("sigterm received"),
        }
    }
}

#[cfg(unix)]
fn register_handler(
    kind: tokio::signal::unix::SignalKind,
    name: &'static str,
) -> Option<tokio::signal::unix::Signal> {
    match tokio::signal::unix::signal(kind) {
        Ok(handler) => Some(handler),
        Err(err) => {
            tracing::warn!(error = %err, signal = name, "failed to register interrupt handler");
            None
        }
    }
}

#[cfg(unix)]
async fn recv_or_pending(handler: Option<&mut tokio::signal::unix::Signal>) {
    if let Some(handler) = handler {
        if handler.recv().await.is_some() {
            return;
        }
    }

    std::future::pending::<()>().await;
}

#[cfg(not(unix))]
struct Interrupts;

#[cfg(not(unix))]
impl Interrupts {
    fn register() -> Self {
        Self
    }

    /// Waits for Ctrl+C. Never resolves if the handler could not be registered.
    async fn recv(self) {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("sigint (ctrl+c) received"),
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for ctrl+c");
                std::future::pending::<()>().await;
            }
        }
    }
}
