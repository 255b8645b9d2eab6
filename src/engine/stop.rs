// src/engine/stop.rs

use std::io;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

/// Requests a graceful stop of the watch loop. Clone freely; any task may
/// call `stop`, any number of times.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

/// The loop's side of the stop channel.
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx }, StopSignal { rx })
}

impl StopHandle {
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }
}

impl StopSignal {
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once a stop was requested. If every handle is dropped
    /// without stopping, this never resolves.
    pub async fn stopped(&mut self) {
        let closed = self.rx.wait_for(|stopped| *stopped).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}

/// Request a stop on SIGINT or SIGTERM (Ctrl-C elsewhere).
///
/// On Unix the handlers are installed before this returns, so a signal
/// delivered right after the call is not lost. Must run inside a runtime.
#[cfg(unix)]
pub fn stop_on_signals(stop: StopHandle) -> io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    Ok(tokio::spawn(async move {
        let name = tokio::select! {
            _ = interrupt.recv() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
        };
        info!(signal = name, "shutdown signal received");
        stop.stop();
    }))
}

#[cfg(not(unix))]
pub fn stop_on_signals(stop: StopHandle) -> io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received");
                stop.stop();
            }
            Err(err) => tracing::warn!(error = %err, "failed to listen for Ctrl-C"),
        }
    }))
}
